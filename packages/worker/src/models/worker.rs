use std::sync::Arc;
use std::time::Duration;

use common::store::CodeStore;
use common::{Language, SubmissionStatus};
use mq::{StreamBroker, StreamMessage};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use super::runner::{CodeRunner, CodeRunnerRequest};
use super::sandbox::Sandbox;
use crate::error::Result;

/// How long one read blocks waiting for work; bounds shutdown latency.
const READ_BLOCK: Duration = Duration::from_secs(5);

/// A single consumer in the judging pool. Long-polls the stream, drives each
/// submission through the code runner, records the verdict, then
/// acknowledges the message.
///
/// The terminal write happens before the ack and only applies to rows still
/// in `PROCESSING`, so a redelivered message finds a terminal row and
/// no-ops.
pub struct CodeWorker<S: Sandbox> {
    id: String,
    broker: Arc<dyn StreamBroker>,
    store: Arc<dyn CodeStore>,
    runner: Arc<CodeRunner<S>>,
}

impl<S> CodeWorker<S>
where
    S: Sandbox + 'static,
    S::Handle: Send,
{
    pub fn new(
        id: String,
        broker: Arc<dyn StreamBroker>,
        store: Arc<dyn CodeStore>,
        runner: Arc<CodeRunner<S>>,
    ) -> Self {
        Self {
            id,
            broker,
            store,
            runner,
        }
    }

    pub async fn run(self, token: CancellationToken) {
        info!(worker_id = %self.id, "worker started");

        loop {
            tokio::select! {
                _ = token.cancelled() => {
                    info!(worker_id = %self.id, "worker received shutdown signal, stopping");
                    break;
                }

                read = self.broker.read_group(&self.id, READ_BLOCK, 1) => {
                    match read {
                        Ok(messages) => {
                            for message in messages {
                                self.process_message(message).await;
                            }
                        }
                        Err(e) => {
                            error!(worker_id = %self.id, error = %e, "failed to read from stream");
                            tokio::time::sleep(Duration::from_secs(1)).await;
                        }
                    }
                }
            }
        }

        info!(worker_id = %self.id, "worker shut down");
    }

    async fn process_message(&self, message: StreamMessage) {
        let Some(submission_id) = message.submission_id() else {
            error!(
                worker_id = %self.id,
                message_id = %message.id,
                fields = ?message.fields,
                "invalid submission id in message"
            );
            self.ack(&message.id).await;
            return;
        };

        info!(
            worker_id = %self.id,
            message_id = %message.id,
            submission_id,
            "processing code submission job"
        );

        self.adjudicate(submission_id).await;
        self.ack(&message.id).await;
    }

    async fn ack(&self, message_id: &str) {
        if let Err(e) = self.broker.ack(message_id).await {
            error!(
                worker_id = %self.id,
                message_id,
                error = %e,
                "failed to acknowledge message"
            );
        }
    }

    /// Drive one submission to a terminal status. Every failure mode that
    /// can still reach the store ends in a terminal write; a submission must
    /// not stay in `PROCESSING` because judging went wrong.
    async fn adjudicate(&self, submission_id: i32) {
        let submission = match self.store.get_submission(submission_id).await {
            Ok(submission) => submission,
            Err(e) => {
                error!(
                    worker_id = %self.id,
                    submission_id,
                    error = %e,
                    "failed to get submission"
                );
                return;
            }
        };

        if submission.status.is_terminal() {
            info!(
                worker_id = %self.id,
                submission_id,
                status = %submission.status,
                "submission already judged, skipping"
            );
            return;
        }

        let Some(language) = Language::from_id(submission.language_id) else {
            warn!(
                worker_id = %self.id,
                submission_id,
                language_id = submission.language_id,
                "unsupported language"
            );
            let message = format!("Unsupported language ID: {}", submission.language_id);
            self.finish(submission_id, SubmissionStatus::CompilationError, None, &message)
                .await;
            return;
        };

        let test_cases = match self.store.get_test_cases(submission.problem_id).await {
            Ok(test_cases) => test_cases,
            Err(e) => {
                error!(
                    worker_id = %self.id,
                    submission_id,
                    problem_id = submission.problem_id,
                    error = %e,
                    "failed to get test cases"
                );
                self.finish(
                    submission_id,
                    SubmissionStatus::CompilationError,
                    None,
                    "Failed to retrieve test cases",
                )
                .await;
                return;
            }
        };

        let system_code = match self
            .store
            .get_system_code(submission.problem_id, submission.language_id)
            .await
        {
            Ok(code) => code,
            Err(e) if e.is_not_found() => {
                warn!(
                    worker_id = %self.id,
                    submission_id,
                    problem_id = submission.problem_id,
                    language_id = submission.language_id,
                    "no system code for problem/language"
                );
                self.finish(
                    submission_id,
                    SubmissionStatus::CompilationError,
                    None,
                    "missing system code",
                )
                .await;
                return;
            }
            Err(e) => {
                error!(
                    worker_id = %self.id,
                    submission_id,
                    error = %e,
                    "failed to get system code"
                );
                self.finish(
                    submission_id,
                    SubmissionStatus::CompilationError,
                    None,
                    "Failed to retrieve system code",
                )
                .await;
                return;
            }
        };

        let import_code = match self
            .store
            .get_language_imports(submission.problem_id, submission.language_id)
            .await
        {
            Ok(code) => code,
            Err(e) => {
                error!(
                    worker_id = %self.id,
                    submission_id,
                    error = %e,
                    "failed to get language imports"
                );
                self.finish(
                    submission_id,
                    SubmissionStatus::CompilationError,
                    None,
                    "Failed to retrieve language imports",
                )
                .await;
                return;
            }
        };

        let request = CodeRunnerRequest {
            submission_id,
            source_code: submission.source_code,
            language,
            test_cases,
            system_code,
            import_code,
        };

        // Run on a separate task so a panic in the runner is contained to
        // this job instead of taking the worker down.
        let runner = Arc::clone(&self.runner);
        let outcome = tokio::spawn(async move { runner.execute(&request).await }).await;

        match outcome {
            Ok(Ok(result)) => {
                info!(
                    worker_id = %self.id,
                    submission_id,
                    status = %result.status,
                    execution_time_ms = result.execution_time.as_millis() as u64,
                    "finished processing code submission job"
                );
                match self
                    .store
                    .update_submission_status(
                        submission_id,
                        result.status,
                        result.failed_test_id,
                        result.failed_output.as_deref(),
                    )
                    .await
                {
                    Ok(true) => {}
                    Ok(false) => {
                        info!(
                            worker_id = %self.id,
                            submission_id,
                            "terminal status already recorded, update skipped"
                        );
                    }
                    Err(e) => {
                        error!(
                            worker_id = %self.id,
                            submission_id,
                            error = %e,
                            "failed to update submission status"
                        );
                    }
                }
            }
            Ok(Err(e)) => {
                error!(
                    worker_id = %self.id,
                    submission_id,
                    error = %e,
                    "code execution failed"
                );
                let message = format!("Execution error: {e}");
                self.finish(submission_id, SubmissionStatus::CompilationError, None, &message)
                    .await;
            }
            Err(e) => {
                error!(
                    worker_id = %self.id,
                    submission_id,
                    error = %e,
                    "code runner panicked"
                );
                self.finish(
                    submission_id,
                    SubmissionStatus::CompilationError,
                    None,
                    "internal error",
                )
                .await;
            }
        }
    }

    async fn finish(
        &self,
        submission_id: i32,
        status: SubmissionStatus,
        failed_test_id: Option<i32>,
        output: &str,
    ) {
        match self
            .store
            .update_submission_status(submission_id, status, failed_test_id, Some(output))
            .await
        {
            Ok(true) => {}
            Ok(false) => {
                info!(
                    worker_id = %self.id,
                    submission_id,
                    "terminal status already recorded, update skipped"
                );
            }
            Err(e) => {
                error!(
                    worker_id = %self.id,
                    submission_id,
                    error = %e,
                    "failed to update submission status"
                );
            }
        }
    }
}

/// Owns N workers sharing one consumer group.
pub struct CodeWorkerPool<S: Sandbox> {
    num_workers: usize,
    broker: Arc<dyn StreamBroker>,
    store: Arc<dyn CodeStore>,
    runner: Arc<CodeRunner<S>>,
    token: CancellationToken,
    handles: Vec<JoinHandle<()>>,
}

impl<S> CodeWorkerPool<S>
where
    S: Sandbox + 'static,
    S::Handle: Send,
{
    pub fn new(
        num_workers: usize,
        broker: Arc<dyn StreamBroker>,
        store: Arc<dyn CodeStore>,
        runner: CodeRunner<S>,
    ) -> Self {
        Self {
            num_workers,
            broker,
            store,
            runner: Arc::new(runner),
            token: CancellationToken::new(),
            handles: Vec::new(),
        }
    }

    /// Ensure the consumer group exists, then start every worker.
    pub async fn start(&mut self) -> Result<()> {
        self.broker.ensure_group().await?;

        for i in 0..self.num_workers {
            let worker = CodeWorker::new(
                format!("CodeWorker-{}", i + 1),
                Arc::clone(&self.broker),
                Arc::clone(&self.store),
                Arc::clone(&self.runner),
            );
            self.handles.push(tokio::spawn(worker.run(self.token.clone())));
        }

        info!(num_workers = self.num_workers, "code worker pool started");

        Ok(())
    }

    /// Signal every worker and wait for them to exit. Workers observe the
    /// signal within one read-block period.
    pub async fn stop(&mut self) {
        self.token.cancel();

        for handle in self.handles.drain(..) {
            if let Err(e) = handle.await {
                error!(error = %e, "worker task failed during shutdown");
            }
        }

        info!("code worker pool stopped");
    }
}
