//! The submission store: everything the adjudication pipeline reads and
//! writes about submissions, test cases, and per-problem code fragments.

pub mod cache;
pub mod db;
pub mod entity;
pub mod error;
pub mod sql;
pub mod traits;

pub use cache::{Cache, RedisCache};
pub use db::{init_db, init_db_with};
pub use error::StoreError;
pub use sql::SqlCodeStore;
pub use traits::{CodeStore, NewSubmission, SubmissionDetail, TestCase};
