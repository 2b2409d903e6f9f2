pub mod docker;
pub mod error;

use std::path::Path;

use async_trait::async_trait;
use common::Language;

pub use docker::{Container, DockerSandbox};
pub use error::SandboxError;

/// Captured output of one program run inside the sandbox. A non-zero exit is
/// data, not an error; only infrastructure failures surface as `SandboxError`.
#[derive(Debug, Clone, Default)]
pub struct RunOutput {
    pub stdout: String,
    pub stderr: String,
    pub exit_code: Option<i32>,
}

impl RunOutput {
    pub fn success(&self) -> bool {
        self.exit_code == Some(0)
    }
}

/// A disposable, isolated execution environment around one submission.
///
/// One environment per submission: state may leak between runs of the same
/// handle (a program can write files that later test cases see), but never
/// between submissions.
#[async_trait]
pub trait Sandbox: Send + Sync {
    type Handle: Send;

    /// Create the environment around the source file at `code_path` and run
    /// the build step for compiled languages. A failed build returns
    /// `SandboxError::Compilation` with the build output, and any partial
    /// environment is torn down before returning.
    async fn prepare(
        &self,
        code_path: &Path,
        language: &Language,
    ) -> Result<Self::Handle, SandboxError>;

    /// Execute the language's run command with `stdin` piped to the process.
    async fn run(
        &self,
        handle: &mut Self::Handle,
        language: &Language,
        stdin: &str,
    ) -> Result<RunOutput, SandboxError>;

    /// Tear the environment down. Idempotent, best-effort.
    async fn destroy(&self, handle: Self::Handle);
}
