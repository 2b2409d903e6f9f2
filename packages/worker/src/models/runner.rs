use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use common::store::TestCase;
use common::{Language, SubmissionStatus};
use tracing::{debug, warn};

use super::sandbox::{Sandbox, SandboxError};

/// Everything needed to adjudicate one submission.
pub struct CodeRunnerRequest {
    pub submission_id: i32,
    pub source_code: String,
    pub language: &'static Language,
    /// Test cases in execution order; the first failure wins.
    pub test_cases: Vec<TestCase>,
    pub system_code: String,
    pub import_code: String,
}

/// Terminal outcome of one adjudication.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionResult {
    pub status: SubmissionStatus,
    pub failed_test_id: Option<i32>,
    pub failed_output: Option<String>,
    pub execution_time: Duration,
}

/// Drives a single submission through the sandbox: assembles the source,
/// builds, runs every test case in order, and classifies the outcome.
///
/// User-code failures (build errors, wrong output, non-zero exits, timeouts)
/// come back as an `ExecutionResult`; only infrastructure failures are
/// errors.
pub struct CodeRunner<S: Sandbox> {
    sandbox: S,
    work_dir: PathBuf,
    run_timeout: Duration,
}

impl<S: Sandbox> CodeRunner<S> {
    pub fn new(
        sandbox: S,
        work_dir: impl Into<PathBuf>,
        run_timeout: Duration,
    ) -> std::io::Result<Self> {
        let work_dir = work_dir.into();
        std::fs::create_dir_all(&work_dir)?;

        Ok(Self {
            sandbox,
            work_dir,
            run_timeout,
        })
    }

    pub async fn execute(
        &self,
        request: &CodeRunnerRequest,
    ) -> Result<ExecutionResult, SandboxError> {
        let started = Instant::now();

        let scratch = ScratchDir::create(&self.work_dir, request.submission_id)
            .map_err(|e| SandboxError::Create(format!("failed to create execution directory: {e}")))?;

        let code_path = scratch.path().join(request.language.source_file_name());
        let full_code = assemble_source(
            &request.import_code,
            &request.source_code,
            &request.system_code,
        );
        tokio::fs::write(&code_path, full_code)
            .await
            .map_err(|e| SandboxError::Create(format!("failed to write code file: {e}")))?;

        let mut handle = match self.sandbox.prepare(&code_path, request.language).await {
            Ok(handle) => handle,
            Err(SandboxError::Compilation(output)) => {
                return Ok(ExecutionResult {
                    status: SubmissionStatus::CompilationError,
                    failed_test_id: None,
                    failed_output: Some(output),
                    execution_time: started.elapsed(),
                });
            }
            Err(other) => return Err(other),
        };

        for test_case in &request.test_cases {
            debug!(
                submission_id = request.submission_id,
                test_case_id = test_case.id,
                "executing test case"
            );

            let run = tokio::time::timeout(
                self.run_timeout,
                self.sandbox.run(&mut handle, request.language, &test_case.input),
            )
            .await;

            let output = match run {
                Ok(Ok(output)) => output,
                Ok(Err(e)) => {
                    // Infrastructure died mid-run; the submission cannot be
                    // judged and the error text is all we have to show.
                    warn!(
                        submission_id = request.submission_id,
                        test_case_id = test_case.id,
                        error = %e,
                        "test case execution failed"
                    );
                    self.sandbox.destroy(handle).await;
                    return Ok(ExecutionResult {
                        status: SubmissionStatus::CompilationError,
                        failed_test_id: Some(test_case.id),
                        failed_output: Some(e.to_string()),
                        execution_time: started.elapsed(),
                    });
                }
                Err(_) => {
                    self.sandbox.destroy(handle).await;
                    return Ok(ExecutionResult {
                        status: SubmissionStatus::WrongAnswer,
                        failed_test_id: Some(test_case.id),
                        failed_output: Some("time limit exceeded".to_string()),
                        execution_time: started.elapsed(),
                    });
                }
            };

            if !output.success() {
                self.sandbox.destroy(handle).await;
                return Ok(ExecutionResult {
                    status: SubmissionStatus::WrongAnswer,
                    failed_test_id: Some(test_case.id),
                    failed_output: Some(output.stderr),
                    execution_time: started.elapsed(),
                });
            }

            let actual = trim_output(&output.stdout);
            let expected = trim_output(&test_case.expected_output);
            if actual != expected {
                self.sandbox.destroy(handle).await;
                return Ok(ExecutionResult {
                    status: SubmissionStatus::WrongAnswer,
                    failed_test_id: Some(test_case.id),
                    failed_output: Some(actual.to_string()),
                    execution_time: started.elapsed(),
                });
            }
        }

        self.sandbox.destroy(handle).await;

        Ok(ExecutionResult {
            status: SubmissionStatus::Accepted,
            failed_test_id: None,
            failed_output: None,
            execution_time: started.elapsed(),
        })
    }
}

/// Concatenate the three code fragments into the final source file.
fn assemble_source(import_code: &str, solution: &str, system_code: &str) -> String {
    format!("{import_code}\n\n{solution}\n\n{system_code}")
}

/// Trim leading and trailing ASCII whitespace only; interior whitespace is
/// significant.
pub fn trim_output(s: &str) -> &str {
    s.trim_matches(|c: char| c.is_ascii_whitespace())
}

/// Per-submission scratch directory, removed on drop so every exit path of
/// the runner, including panics, releases it.
struct ScratchDir {
    path: PathBuf,
}

impl ScratchDir {
    fn create(root: &Path, submission_id: i32) -> std::io::Result<Self> {
        let path = root.join(format!("submission_{submission_id}"));
        std::fs::create_dir_all(&path)?;
        Ok(Self { path })
    }

    fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for ScratchDir {
    fn drop(&mut self) {
        if let Err(e) = std::fs::remove_dir_all(&self.path) {
            if e.kind() != std::io::ErrorKind::NotFound {
                warn!(path = %self.path.display(), error = %e, "failed to remove scratch directory");
            }
        }
    }
}
