use validator::Validate;

use crate::core::metrics;
use crate::core::state::AppState;
use crate::core::time::primitive_now_utc;
use crate::domain::errors::DomainError;
use crate::domain::statistics::grading_rollup;
use crate::domain::submission::{check_content_length, Submission};
use crate::domain::types::SubmissionStatus;
use crate::schemas::submission::{
    AttachFileRequest, PlagiarismScoreRequest, ResubmitRequest, ReturnSubmissionRequest,
    UpdateContentRequest,
};
use crate::services::{load_assignment, load_submission, ServiceError, ServiceResult};

fn ensure_owner(submission: &Submission, student_id: &str) -> ServiceResult<()> {
    if submission.student_id == student_id {
        Ok(())
    } else {
        Err(ServiceError::Forbidden("submission belongs to another student"))
    }
}

/// Returns the student's record for the assignment, creating the draft on
/// first contact.
pub async fn start_submission(
    state: &AppState,
    tenant_id: &str,
    assignment_id: &str,
    student_id: &str,
) -> ServiceResult<Submission> {
    if let Some(existing) =
        state.storage().find_submission(tenant_id, assignment_id, student_id).await?
    {
        return Ok(existing);
    }

    let assignment = load_assignment(state, tenant_id, assignment_id).await?;
    let now = primitive_now_utc();
    if !assignment.is_available(now) {
        return Err(ServiceError::AssignmentNotAvailable);
    }

    let submission = Submission::start(&assignment, student_id, now);
    state.storage().save_submission(&submission).await?;

    tracing::info!(
        tenant_id = %tenant_id,
        assignment_id = %assignment_id,
        submission_id = %submission.id,
        student_id = %student_id,
        "Submission draft started"
    );
    Ok(submission)
}

pub async fn get_submission(
    state: &AppState,
    tenant_id: &str,
    submission_id: &str,
) -> ServiceResult<Submission> {
    load_submission(state, tenant_id, submission_id).await
}

pub async fn update_content(
    state: &AppState,
    tenant_id: &str,
    submission_id: &str,
    student_id: &str,
    request: UpdateContentRequest,
) -> ServiceResult<Submission> {
    request.validate()?;
    let mut submission = load_submission(state, tenant_id, submission_id).await?;
    ensure_owner(&submission, student_id)?;

    let max = state.settings().submissions().max_content_length;
    check_content_length(request.content.as_deref(), max)?;
    submission.update_content(request.content, primitive_now_utc())?;
    state.storage().save_submission(&submission).await?;

    tracing::debug!(tenant_id = %tenant_id, submission_id = %submission.id, "Submission content saved");
    Ok(submission)
}

pub async fn attach_file(
    state: &AppState,
    tenant_id: &str,
    submission_id: &str,
    student_id: &str,
    request: AttachFileRequest,
) -> ServiceResult<Submission> {
    request.validate()?;
    let mut submission = load_submission(state, tenant_id, submission_id).await?;
    ensure_owner(&submission, student_id)?;
    let assignment = load_assignment(state, tenant_id, &submission.assignment_id).await?;

    submission.add_file(&request.file_id, &assignment, primitive_now_utc())?;
    state.storage().save_submission(&submission).await?;

    tracing::info!(
        tenant_id = %tenant_id,
        submission_id = %submission.id,
        file_id = %request.file_id,
        files = submission.file_ids.len(),
        "File attached to submission"
    );
    Ok(submission)
}

pub async fn detach_file(
    state: &AppState,
    tenant_id: &str,
    submission_id: &str,
    student_id: &str,
    file_id: &str,
) -> ServiceResult<Submission> {
    let mut submission = load_submission(state, tenant_id, submission_id).await?;
    ensure_owner(&submission, student_id)?;

    submission.remove_file(file_id, primitive_now_utc())?;
    state.storage().save_submission(&submission).await?;

    tracing::info!(
        tenant_id = %tenant_id,
        submission_id = %submission.id,
        file_id = %file_id,
        "File detached from submission"
    );
    Ok(submission)
}

/// Hands the draft in. Work past the due date is refused outright when the
/// assignment does not accept late submissions.
pub async fn submit_submission(
    state: &AppState,
    tenant_id: &str,
    submission_id: &str,
    student_id: &str,
) -> ServiceResult<Submission> {
    let mut submission = load_submission(state, tenant_id, submission_id).await?;
    ensure_owner(&submission, student_id)?;
    let mut assignment = load_assignment(state, tenant_id, &submission.assignment_id).await?;

    let now = primitive_now_utc();
    if !assignment.is_available(now) {
        return Err(ServiceError::AssignmentNotAvailable);
    }
    if assignment.is_overdue(now) && !assignment.submission.accept_late_submissions {
        return Err(ServiceError::DeadlinePassed);
    }

    let max = state.settings().submissions().max_content_length;
    check_content_length(submission.content.as_deref(), max)?;

    let first_cycle = submission.submission_number == 1;
    submission.submit(&assignment, now)?;
    state.storage().save_submission(&submission).await?;

    if first_cycle {
        assignment.record_first_submission(now);
        state.storage().save_assignment(&assignment).await?;
    }

    metrics::record_submission(submission.status.as_str());
    tracing::info!(
        tenant_id = %tenant_id,
        submission_id = %submission.id,
        assignment_id = %assignment.id,
        status = %submission.status,
        days_late = submission.days_late,
        penalty_percent = submission.penalty_applied,
        "Submission handed in"
    );
    Ok(submission)
}

pub async fn start_grading(
    state: &AppState,
    tenant_id: &str,
    submission_id: &str,
) -> ServiceResult<Submission> {
    let mut submission = load_submission(state, tenant_id, submission_id).await?;
    submission.start_grading(primitive_now_utc())?;
    state.storage().save_submission(&submission).await?;

    tracing::info!(tenant_id = %tenant_id, submission_id = %submission.id, "Submission under review");
    Ok(submission)
}

pub async fn return_submission(
    state: &AppState,
    tenant_id: &str,
    submission_id: &str,
    request: ReturnSubmissionRequest,
) -> ServiceResult<Submission> {
    request.validate()?;
    let mut submission = load_submission(state, tenant_id, submission_id).await?;
    submission.return_to_student(request.feedback, primitive_now_utc())?;
    state.storage().save_submission(&submission).await?;

    metrics::record_submission(submission.status.as_str());
    tracing::info!(tenant_id = %tenant_id, submission_id = %submission.id, "Submission returned");
    Ok(submission)
}

pub async fn resubmit(
    state: &AppState,
    tenant_id: &str,
    submission_id: &str,
    student_id: &str,
    request: ResubmitRequest,
) -> ServiceResult<Submission> {
    request.validate()?;
    let mut submission = load_submission(state, tenant_id, submission_id).await?;
    ensure_owner(&submission, student_id)?;
    let assignment = load_assignment(state, tenant_id, &submission.assignment_id).await?;

    let max = state.settings().submissions().max_content_length;
    check_content_length(request.content.as_deref(), max)?;
    submission.resubmit(request.content, &assignment, primitive_now_utc())?;
    state.storage().save_submission(&submission).await?;

    tracing::info!(
        tenant_id = %tenant_id,
        submission_id = %submission.id,
        submission_number = submission.submission_number,
        "Submission reopened for another attempt"
    );
    Ok(submission)
}

pub async fn record_plagiarism_score(
    state: &AppState,
    tenant_id: &str,
    submission_id: &str,
    request: PlagiarismScoreRequest,
) -> ServiceResult<Submission> {
    request.validate()?;
    let mut submission = load_submission(state, tenant_id, submission_id).await?;
    submission.record_plagiarism_score(request.score, primitive_now_utc())?;
    state.storage().save_submission(&submission).await?;

    tracing::info!(
        tenant_id = %tenant_id,
        submission_id = %submission.id,
        score = request.score,
        "Plagiarism score recorded"
    );
    Ok(submission)
}

/// Students may only discard their own first draft; admins may delete any
/// submission.
pub async fn delete_submission(
    state: &AppState,
    tenant_id: &str,
    submission_id: &str,
    requester_id: &str,
    is_admin: bool,
) -> ServiceResult<()> {
    let submission = load_submission(state, tenant_id, submission_id).await?;
    if !is_admin {
        ensure_owner(&submission, requester_id)?;
        let untouched_draft = submission.status == SubmissionStatus::InProgress
            && submission.submission_number == 1;
        if !untouched_draft {
            return Err(DomainError::CannotModifySubmittedSubmission.into());
        }
    }

    let mut assignment = load_assignment(state, tenant_id, &submission.assignment_id).await?;
    let storage = state.storage();
    if !storage.delete_submission(tenant_id, submission_id).await? {
        return Err(ServiceError::not_found("submission", submission_id));
    }

    if submission.was_handed_in() {
        let now = primitive_now_utc();
        assignment.record_removed_submission(now);
        let remaining = storage.list_submissions_by_assignment(tenant_id, &assignment.id).await?;
        let (graded_count, average_grade) = grading_rollup(&remaining);
        assignment.apply_grading_rollup(graded_count, average_grade, now);
        storage.save_assignment(&assignment).await?;
    }

    tracing::info!(
        tenant_id = %tenant_id,
        submission_id = %submission_id,
        requester_id = %requester_id,
        is_admin,
        "Submission deleted"
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::Duration;

    use crate::schemas::grading::{GradeInputRequest, GradeSubmissionRequest};
    use crate::schemas::peer_review::AssignReviewerRequest;
    use crate::services::assignments::{create_assignment, get_assignment, publish_assignment};
    use crate::services::grading::grade_submission;
    use crate::services::peer_reviews::assign_reviewer;
    use crate::test_support::{create_request, peer_review_request, test_state, TEACHER, TENANT};

    async fn published(state: &AppState, due_in: Option<Duration>) -> String {
        let assignment = create_assignment(state, TENANT, TEACHER, create_request(due_in))
            .await
            .expect("create");
        publish_assignment(state, TENANT, &assignment.id).await.expect("publish");
        assignment.id
    }

    async fn draft_with_text(state: &AppState, assignment_id: &str, student: &str) -> Submission {
        let submission =
            start_submission(state, TENANT, assignment_id, student).await.expect("start");
        update_content(
            state,
            TENANT,
            &submission.id,
            student,
            UpdateContentRequest { content: Some("My essay".to_string()) },
        )
        .await
        .expect("content")
    }

    #[tokio::test]
    async fn start_requires_published_assignment_and_is_idempotent() {
        let state = test_state();
        let assignment = create_assignment(&state, TENANT, TEACHER, create_request(None))
            .await
            .expect("create");

        let err = start_submission(&state, TENANT, &assignment.id, "student-1").await.unwrap_err();
        assert!(matches!(err, ServiceError::AssignmentNotAvailable));

        publish_assignment(&state, TENANT, &assignment.id).await.expect("publish");
        let first = start_submission(&state, TENANT, &assignment.id, "student-1").await.unwrap();
        let again = start_submission(&state, TENANT, &assignment.id, "student-1").await.unwrap();
        assert_eq!(first.id, again.id);
    }

    #[tokio::test]
    async fn on_time_submit_bumps_rollup_once() {
        let state = test_state();
        let assignment_id = published(&state, Some(Duration::days(7))).await;
        let draft = draft_with_text(&state, &assignment_id, "student-1").await;

        let submitted =
            submit_submission(&state, TENANT, &draft.id, "student-1").await.expect("submit");
        assert_eq!(submitted.status, SubmissionStatus::Submitted);
        assert!(!submitted.is_late);

        let err = submit_submission(&state, TENANT, &draft.id, "student-1").await.unwrap_err();
        assert!(matches!(err, ServiceError::Domain(DomainError::AlreadySubmitted)));

        let assignment = get_assignment(&state, TENANT, &assignment_id).await.unwrap();
        assert_eq!(assignment.rollup.submission_count, 1);
    }

    #[tokio::test]
    async fn late_submit_stores_penalty() {
        let state = test_state();
        let assignment_id = published(&state, Some(Duration::hours(-47))).await;
        let draft = draft_with_text(&state, &assignment_id, "student-1").await;

        let submitted =
            submit_submission(&state, TENANT, &draft.id, "student-1").await.expect("submit");
        assert_eq!(submitted.status, SubmissionStatus::LateSubmission);
        assert_eq!(submitted.days_late, 2);
        assert_eq!(submitted.penalty_applied, 20.0);
    }

    #[tokio::test]
    async fn deadline_is_enforced_without_late_policy() {
        let state = test_state();
        let mut request = create_request(Some(Duration::hours(-1)));
        request.accept_late_submissions = false;
        let assignment = create_assignment(&state, TENANT, TEACHER, request).await.unwrap();
        publish_assignment(&state, TENANT, &assignment.id).await.unwrap();
        let draft = draft_with_text(&state, &assignment.id, "student-1").await;

        let err = submit_submission(&state, TENANT, &draft.id, "student-1").await.unwrap_err();
        assert!(matches!(err, ServiceError::DeadlinePassed));
        assert_eq!(err.status_code(), 409);
    }

    #[tokio::test]
    async fn only_owner_edits_and_content_is_bounded() {
        let state = test_state();
        let assignment_id = published(&state, None).await;
        let draft = draft_with_text(&state, &assignment_id, "student-1").await;

        let err = update_content(
            &state,
            TENANT,
            &draft.id,
            "student-2",
            UpdateContentRequest { content: Some("hijack".to_string()) },
        )
        .await
        .unwrap_err();
        assert_eq!(err.status_code(), 403);

        let too_long = "x".repeat(state.settings().submissions().max_content_length + 1);
        let err = update_content(
            &state,
            TENANT,
            &draft.id,
            "student-1",
            UpdateContentRequest { content: Some(too_long) },
        )
        .await
        .unwrap_err();
        assert!(matches!(err, ServiceError::Domain(DomainError::ContentTooLong { .. })));
    }

    #[tokio::test]
    async fn files_attach_until_cap_and_lock_after_submit() {
        let state = test_state();
        let assignment_id = published(&state, None).await;
        let draft = start_submission(&state, TENANT, &assignment_id, "student-1").await.unwrap();

        for index in 0..3 {
            attach_file(
                &state,
                TENANT,
                &draft.id,
                "student-1",
                AttachFileRequest { file_id: format!("file-{index}") },
            )
            .await
            .expect("attach");
        }
        let err = attach_file(
            &state,
            TENANT,
            &draft.id,
            "student-1",
            AttachFileRequest { file_id: "file-3".to_string() },
        )
        .await
        .unwrap_err();
        assert!(matches!(err, ServiceError::Domain(DomainError::MaxFilesExceeded { max: 3 })));

        detach_file(&state, TENANT, &draft.id, "student-1", "file-0").await.expect("detach");
        submit_submission(&state, TENANT, &draft.id, "student-1").await.expect("submit files only");

        let err = detach_file(&state, TENANT, &draft.id, "student-1", "file-1").await.unwrap_err();
        assert!(matches!(
            err,
            ServiceError::Domain(DomainError::CannotModifySubmittedSubmission)
        ));
    }

    #[tokio::test]
    async fn return_and_resubmit_cycle() {
        let state = test_state();
        let assignment_id = published(&state, None).await;
        let draft = draft_with_text(&state, &assignment_id, "student-1").await;
        submit_submission(&state, TENANT, &draft.id, "student-1").await.unwrap();
        start_grading(&state, TENANT, &draft.id).await.expect("start grading");

        let returned = return_submission(
            &state,
            TENANT,
            &draft.id,
            ReturnSubmissionRequest { feedback: Some("Add sources".to_string()) },
        )
        .await
        .expect("return");
        assert_eq!(returned.status, SubmissionStatus::Returned);

        let reopened = resubmit(
            &state,
            TENANT,
            &draft.id,
            "student-1",
            ResubmitRequest { content: Some("With sources".to_string()) },
        )
        .await
        .expect("resubmit");
        assert_eq!(reopened.submission_number, 2);

        submit_submission(&state, TENANT, &draft.id, "student-1").await.expect("second submit");
        let assignment = get_assignment(&state, TENANT, &assignment_id).await.unwrap();
        assert_eq!(assignment.rollup.submission_count, 1);
    }

    #[tokio::test]
    async fn plagiarism_score_is_bounded() {
        let state = test_state();
        let assignment_id = published(&state, None).await;
        let draft = draft_with_text(&state, &assignment_id, "student-1").await;

        let err = record_plagiarism_score(
            &state,
            TENANT,
            &draft.id,
            PlagiarismScoreRequest { score: 140.0 },
        )
        .await
        .unwrap_err();
        assert!(matches!(
            err,
            ServiceError::Domain(DomainError::InvalidPlagiarismScore(score)) if score == 140.0
        ));
        assert_eq!(err.code(), "invalid_plagiarism_score");

        let scored =
            record_plagiarism_score(&state, TENANT, &draft.id, PlagiarismScoreRequest { score: 12.5 })
                .await
                .expect("score");
        assert_eq!(scored.plagiarism_score, Some(12.5));
    }

    #[tokio::test]
    async fn delete_rules_for_students_and_admins() {
        let state = test_state();
        let assignment_id = published(&state, None).await;
        let draft = draft_with_text(&state, &assignment_id, "student-1").await;

        let err =
            delete_submission(&state, TENANT, &draft.id, "student-2", false).await.unwrap_err();
        assert_eq!(err.status_code(), 403);

        submit_submission(&state, TENANT, &draft.id, "student-1").await.unwrap();
        let err =
            delete_submission(&state, TENANT, &draft.id, "student-1", false).await.unwrap_err();
        assert!(matches!(
            err,
            ServiceError::Domain(DomainError::CannotModifySubmittedSubmission)
        ));

        delete_submission(&state, TENANT, &draft.id, "admin-1", true).await.expect("admin delete");
        let err = get_submission(&state, TENANT, &draft.id).await.unwrap_err();
        assert_eq!(err.status_code(), 404);

        let other = draft_with_text(&state, &assignment_id, "student-3").await;
        delete_submission(&state, TENANT, &other.id, "student-3", false).await.expect("own draft");
    }

    #[tokio::test]
    async fn admin_delete_refreshes_rollup_and_drops_reviews() {
        let state = test_state();
        let mut request = create_request(None);
        request.peer_review = Some(peer_review_request(1, false));
        let assignment = create_assignment(&state, TENANT, TEACHER, request).await.expect("create");
        publish_assignment(&state, TENANT, &assignment.id).await.expect("publish");

        let draft = draft_with_text(&state, &assignment.id, "student-1").await;
        submit_submission(&state, TENANT, &draft.id, "student-1").await.expect("submit");
        assign_reviewer(
            &state,
            TENANT,
            &draft.id,
            AssignReviewerRequest { reviewer_id: "student-2".to_string() },
        )
        .await
        .expect("assign");
        grade_submission(
            &state,
            TENANT,
            &draft.id,
            TEACHER,
            GradeSubmissionRequest {
                grades: vec![GradeInputRequest {
                    criterion_id: None,
                    points_earned: 80.0,
                    points_possible: 100.0,
                    feedback: None,
                }],
                feedback: None,
            },
        )
        .await
        .expect("grade");

        let before = get_assignment(&state, TENANT, &assignment.id).await.unwrap();
        assert_eq!(before.rollup.submission_count, 1);
        assert_eq!(before.rollup.graded_count, 1);
        assert_eq!(before.rollup.average_grade, Some(80.0));

        delete_submission(&state, TENANT, &draft.id, "admin-1", true).await.expect("delete");

        let after = get_assignment(&state, TENANT, &assignment.id).await.unwrap();
        assert_eq!(after.rollup.submission_count, 0);
        assert_eq!(after.rollup.graded_count, 0);
        assert_eq!(after.rollup.average_grade, None);
        let reviews =
            state.storage().list_peer_reviews_by_submission(TENANT, &draft.id).await.unwrap();
        assert!(reviews.is_empty());
        assert!(state.storage().list_grades(TENANT, &draft.id).await.unwrap().is_empty());
    }
}
