use validator::Validate;

use crate::core::metrics;
use crate::core::state::AppState;
use crate::core::time::primitive_now_utc;
use crate::domain::peer_review::{
    check_reviewer_capacity, summarize, PeerReview, PeerReviewFeedback, PeerReviewSummary,
};
use crate::schemas::peer_review::{AssignReviewerRequest, PeerReviewScoresRequest};
use crate::services::{
    load_assignment, load_peer_review, load_submission, ServiceError, ServiceResult,
};

fn ensure_reviewer(review: &PeerReview, reviewer_id: &str) -> ServiceResult<()> {
    if review.reviewer_id == reviewer_id {
        Ok(())
    } else {
        Err(ServiceError::Forbidden("review is assigned to another reviewer"))
    }
}

pub async fn assign_reviewer(
    state: &AppState,
    tenant_id: &str,
    submission_id: &str,
    request: AssignReviewerRequest,
) -> ServiceResult<PeerReview> {
    request.validate()?;
    let submission = load_submission(state, tenant_id, submission_id).await?;
    let assignment = load_assignment(state, tenant_id, &submission.assignment_id).await?;
    let storage = state.storage();

    let existing = storage.list_peer_reviews_by_submission(tenant_id, submission_id).await?;
    let review = PeerReview::assign(
        &assignment,
        &submission,
        &request.reviewer_id,
        &existing,
        primitive_now_utc(),
    )?;

    let open = storage
        .list_peer_reviews_by_reviewer(tenant_id, &assignment.id, &request.reviewer_id)
        .await?
        .iter()
        .filter(|review| !review.is_completed)
        .count();
    check_reviewer_capacity(open, state.settings().peer_review().max_reviews_per_reviewer)?;

    storage.save_peer_review(&review).await?;

    metrics::record_peer_review("assigned");
    tracing::info!(
        tenant_id = %tenant_id,
        review_id = %review.id,
        submission_id = %submission_id,
        reviewer_id = %review.reviewer_id,
        "Peer reviewer assigned"
    );
    Ok(review)
}

pub async fn update_review(
    state: &AppState,
    tenant_id: &str,
    review_id: &str,
    reviewer_id: &str,
    request: PeerReviewScoresRequest,
) -> ServiceResult<PeerReview> {
    request.validate()?;
    let mut review = load_peer_review(state, tenant_id, review_id).await?;
    ensure_reviewer(&review, reviewer_id)?;

    review.update(request.feedback, request.scores, primitive_now_utc())?;
    state.storage().save_peer_review(&review).await?;

    tracing::debug!(tenant_id = %tenant_id, review_id = %review.id, "Peer review draft saved");
    Ok(review)
}

pub async fn submit_review(
    state: &AppState,
    tenant_id: &str,
    review_id: &str,
    reviewer_id: &str,
    request: PeerReviewScoresRequest,
) -> ServiceResult<PeerReview> {
    request.validate()?;
    let mut review = load_peer_review(state, tenant_id, review_id).await?;
    ensure_reviewer(&review, reviewer_id)?;

    review.submit(request.feedback, request.scores, primitive_now_utc())?;
    state.storage().save_peer_review(&review).await?;

    metrics::record_peer_review("completed");
    tracing::info!(
        tenant_id = %tenant_id,
        review_id = %review.id,
        submission_id = %review.submission_id,
        overall_score = review.overall_score,
        "Peer review submitted"
    );
    Ok(review)
}

pub async fn review_summary(
    state: &AppState,
    tenant_id: &str,
    submission_id: &str,
) -> ServiceResult<PeerReviewSummary> {
    let submission = load_submission(state, tenant_id, submission_id).await?;
    let assignment = load_assignment(state, tenant_id, &submission.assignment_id).await?;
    let reviews = state.storage().list_peer_reviews_by_submission(tenant_id, submission_id).await?;
    Ok(summarize(submission_id, &reviews, assignment.peer_review.reviews_required))
}

/// Completed reviews of the student's own submission, with reviewer identity
/// withheld on anonymous assignments.
pub async fn reviews_for_author(
    state: &AppState,
    tenant_id: &str,
    submission_id: &str,
    student_id: &str,
) -> ServiceResult<Vec<PeerReviewFeedback>> {
    let submission = load_submission(state, tenant_id, submission_id).await?;
    if submission.student_id != student_id {
        return Err(ServiceError::Forbidden("submission belongs to another student"));
    }
    let assignment = load_assignment(state, tenant_id, &submission.assignment_id).await?;
    let anonymous = assignment.peer_review.anonymous_grading;

    let reviews = state.storage().list_peer_reviews_by_submission(tenant_id, submission_id).await?;
    Ok(reviews
        .iter()
        .filter(|review| review.is_completed)
        .map(|review| review.for_author(anonymous))
        .collect())
}

pub async fn reviewer_queue(
    state: &AppState,
    tenant_id: &str,
    assignment_id: &str,
    reviewer_id: &str,
) -> ServiceResult<Vec<PeerReview>> {
    Ok(state.storage().list_peer_reviews_by_reviewer(tenant_id, assignment_id, reviewer_id).await?)
}
