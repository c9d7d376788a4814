//! Tenant-scoped operations. Each call loads fresh entities through
//! [`Storage`](crate::repositories::Storage), runs the domain transition and
//! persists the result.

use crate::core::state::AppState;
use crate::domain::assignment::Assignment;
use crate::domain::peer_review::PeerReview;
use crate::domain::rubric::Rubric;
use crate::domain::submission::Submission;

pub mod assignments;
pub mod errors;
pub mod grading;
pub mod peer_reviews;
pub mod rubrics;
pub mod statistics;
pub mod submissions;

pub use errors::{ServiceError, ServiceResult};

pub(crate) async fn load_assignment(
    state: &AppState,
    tenant_id: &str,
    assignment_id: &str,
) -> ServiceResult<Assignment> {
    state
        .storage()
        .get_assignment(tenant_id, assignment_id)
        .await?
        .ok_or_else(|| ServiceError::not_found("assignment", assignment_id))
}

pub(crate) async fn load_submission(
    state: &AppState,
    tenant_id: &str,
    submission_id: &str,
) -> ServiceResult<Submission> {
    state
        .storage()
        .get_submission(tenant_id, submission_id)
        .await?
        .ok_or_else(|| ServiceError::not_found("submission", submission_id))
}

pub(crate) async fn load_rubric(
    state: &AppState,
    tenant_id: &str,
    rubric_id: &str,
) -> ServiceResult<Rubric> {
    state
        .storage()
        .get_rubric(tenant_id, rubric_id)
        .await?
        .ok_or_else(|| ServiceError::not_found("rubric", rubric_id))
}

pub(crate) async fn load_peer_review(
    state: &AppState,
    tenant_id: &str,
    review_id: &str,
) -> ServiceResult<PeerReview> {
    state
        .storage()
        .get_peer_review(tenant_id, review_id)
        .await?
        .ok_or_else(|| ServiceError::not_found("peer_review", review_id))
}
