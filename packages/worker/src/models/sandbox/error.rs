use thiserror::Error;

#[derive(Debug, Error)]
pub enum SandboxError {
    /// The build step exited non-zero; carries the combined build output.
    /// This is a user-code failure, not an infrastructure one.
    #[error("compilation error: {0}")]
    Compilation(String),

    #[error("failed to create container: {0}")]
    Create(String),

    #[error("execution error: {0}")]
    Execution(String),
}

impl SandboxError {
    pub fn is_compilation(&self) -> bool {
        matches!(self, Self::Compilation(_))
    }
}
