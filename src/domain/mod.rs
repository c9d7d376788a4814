pub mod assignment;
pub mod errors;
pub mod grading;
pub mod peer_review;
pub mod rubric;
pub mod statistics;
pub mod submission;
pub mod types;

pub use errors::{DomainError, DomainResult, ErrorKind};
