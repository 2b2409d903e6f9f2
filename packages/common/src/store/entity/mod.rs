pub mod language_import;
pub mod problem;
pub mod submission;
pub mod system_code;
pub mod test_case;
pub mod user;
