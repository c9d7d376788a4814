use validator::Validate;

use crate::core::metrics;
use crate::core::state::AppState;
use crate::core::time::primitive_now_utc;
use crate::domain::assignment::Assignment;
use crate::domain::grading::{self as engine, Grade, GradeInput, GradingResult};
use crate::domain::rubric::Rubric;
use crate::domain::statistics::grading_rollup;
use crate::domain::submission::Submission;
use crate::schemas::grading::{GradeSubmissionRequest, RubricLevelGradeRequest};
use crate::services::{load_assignment, load_rubric, load_submission, ServiceError, ServiceResult};

/// Grades a submission from explicit point rows. Any earlier grade rows of the
/// submission are replaced.
pub async fn grade_submission(
    state: &AppState,
    tenant_id: &str,
    submission_id: &str,
    grader_id: &str,
    request: GradeSubmissionRequest,
) -> ServiceResult<GradingResult> {
    request.validate()?;
    let submission = load_submission(state, tenant_id, submission_id).await?;
    let assignment = load_assignment(state, tenant_id, &submission.assignment_id).await?;
    let rubric = match assignment.grading.rubric_id.as_deref() {
        Some(rubric_id) => Some(load_rubric(state, tenant_id, rubric_id).await?),
        None => None,
    };

    let inputs = request.grades.into_iter().map(GradeInput::from).collect();
    apply_grading(state, submission, assignment, rubric.as_ref(), inputs, request.feedback, grader_id)
        .await
}

/// Grades by picking one performance level per rubric criterion.
pub async fn grade_with_rubric_levels(
    state: &AppState,
    tenant_id: &str,
    submission_id: &str,
    grader_id: &str,
    request: RubricLevelGradeRequest,
) -> ServiceResult<GradingResult> {
    request.validate()?;
    if request.selections.is_empty() {
        return Err(ServiceError::InvalidRequest("select at least one level".to_string()));
    }

    let submission = load_submission(state, tenant_id, submission_id).await?;
    let assignment = load_assignment(state, tenant_id, &submission.assignment_id).await?;
    let Some(rubric_id) = assignment.grading.rubric_id.clone() else {
        return Err(ServiceError::InvalidRequest("assignment has no rubric".to_string()));
    };
    let rubric = load_rubric(state, tenant_id, &rubric_id).await?;

    let inputs = rubric.grades_from_levels(&request.selections)?;
    apply_grading(state, submission, assignment, Some(&rubric), inputs, request.feedback, grader_id)
        .await
}

pub async fn list_grades(
    state: &AppState,
    tenant_id: &str,
    submission_id: &str,
) -> ServiceResult<Vec<Grade>> {
    load_submission(state, tenant_id, submission_id).await?;
    Ok(state.storage().list_grades(tenant_id, submission_id).await?)
}

async fn apply_grading(
    state: &AppState,
    mut submission: Submission,
    mut assignment: Assignment,
    rubric: Option<&Rubric>,
    inputs: Vec<GradeInput>,
    feedback: Option<String>,
    grader_id: &str,
) -> ServiceResult<GradingResult> {
    let now = primitive_now_utc();
    let regrade = submission.is_graded();

    let result = match engine::grade_submission(
        &mut submission,
        &assignment,
        rubric,
        inputs,
        feedback,
        grader_id,
        now,
    ) {
        Ok(result) => result,
        Err(err) => {
            metrics::record_grading("rejected");
            tracing::warn!(
                tenant_id = %submission.tenant_id,
                submission_id = %submission.id,
                error = %err,
                "Grading rejected"
            );
            return Err(err.into());
        }
    };

    let storage = state.storage();
    storage.replace_grades(&submission.tenant_id, &submission.id, result.grades.clone()).await?;
    storage.save_submission(&submission).await?;

    let submissions =
        storage.list_submissions_by_assignment(&assignment.tenant_id, &assignment.id).await?;
    let (graded_count, average_grade) = grading_rollup(&submissions);
    assignment.apply_grading_rollup(graded_count, average_grade, now);
    storage.save_assignment(&assignment).await?;

    metrics::record_grading(if regrade { "regraded" } else { "graded" });
    metrics::record_grade_percentage(result.outcome.percentage);
    tracing::info!(
        tenant_id = %submission.tenant_id,
        submission_id = %submission.id,
        grader_id = %grader_id,
        final_points = result.outcome.final_points,
        percentage = result.outcome.percentage,
        letter_grade = %result.outcome.letter_grade,
        penalty_percent = result.outcome.penalty_percent,
        regrade,
        "Submission graded"
    );
    Ok(result)
}
