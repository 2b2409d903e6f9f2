use sea_orm::DbErr;
use thiserror::Error;

/// Errors surfaced by the submission store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The requested row does not exist.
    #[error("{0}")]
    NotFound(String),

    #[error("database error: {0}")]
    Database(#[from] DbErr),
}

impl StoreError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}
