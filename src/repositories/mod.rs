//! Persistence seam. Every lookup is scoped by tenant; implementations own
//! any locking needed to keep one mutation per entity id at a time.

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::assignment::Assignment;
use crate::domain::grading::Grade;
use crate::domain::peer_review::PeerReview;
use crate::domain::rubric::Rubric;
use crate::domain::submission::Submission;

pub mod memory;

pub use memory::InMemoryStorage;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("storage backend failure: {0}")]
    Backend(String),
    #[error("conflicting write for {entity} {id}")]
    Conflict { entity: &'static str, id: String },
}

#[async_trait]
pub trait Storage: Send + Sync {
    async fn get_assignment(
        &self,
        tenant_id: &str,
        assignment_id: &str,
    ) -> Result<Option<Assignment>, StorageError>;

    async fn save_assignment(&self, assignment: &Assignment) -> Result<(), StorageError>;

    async fn list_assignments_by_course(
        &self,
        tenant_id: &str,
        course_id: &str,
    ) -> Result<Vec<Assignment>, StorageError>;

    async fn get_submission(
        &self,
        tenant_id: &str,
        submission_id: &str,
    ) -> Result<Option<Submission>, StorageError>;

    /// The single submission record a student holds for an assignment.
    async fn find_submission(
        &self,
        tenant_id: &str,
        assignment_id: &str,
        student_id: &str,
    ) -> Result<Option<Submission>, StorageError>;

    async fn save_submission(&self, submission: &Submission) -> Result<(), StorageError>;

    /// Removes the submission together with its grades and peer reviews.
    async fn delete_submission(
        &self,
        tenant_id: &str,
        submission_id: &str,
    ) -> Result<bool, StorageError>;

    async fn list_submissions_by_assignment(
        &self,
        tenant_id: &str,
        assignment_id: &str,
    ) -> Result<Vec<Submission>, StorageError>;

    async fn list_submissions_by_student(
        &self,
        tenant_id: &str,
        student_id: &str,
    ) -> Result<Vec<Submission>, StorageError>;

    async fn get_rubric(
        &self,
        tenant_id: &str,
        rubric_id: &str,
    ) -> Result<Option<Rubric>, StorageError>;

    async fn save_rubric(&self, rubric: &Rubric) -> Result<(), StorageError>;

    /// Drops every stored grade of the submission and stores `grades` in one step.
    async fn replace_grades(
        &self,
        tenant_id: &str,
        submission_id: &str,
        grades: Vec<Grade>,
    ) -> Result<(), StorageError>;

    async fn list_grades(
        &self,
        tenant_id: &str,
        submission_id: &str,
    ) -> Result<Vec<Grade>, StorageError>;

    async fn get_peer_review(
        &self,
        tenant_id: &str,
        review_id: &str,
    ) -> Result<Option<PeerReview>, StorageError>;

    async fn save_peer_review(&self, review: &PeerReview) -> Result<(), StorageError>;

    async fn list_peer_reviews_by_submission(
        &self,
        tenant_id: &str,
        submission_id: &str,
    ) -> Result<Vec<PeerReview>, StorageError>;

    async fn list_peer_reviews_by_reviewer(
        &self,
        tenant_id: &str,
        assignment_id: &str,
        reviewer_id: &str,
    ) -> Result<Vec<PeerReview>, StorageError>;
}
