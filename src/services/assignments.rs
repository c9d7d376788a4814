use validator::Validate;

use crate::core::metrics;
use crate::core::state::AppState;
use crate::core::time::primitive_now_utc;
use crate::domain::assignment::Assignment;
use crate::schemas::assignment::{CreateAssignmentRequest, UpdateAssignmentRequest};
use crate::services::{load_assignment, load_rubric, ServiceResult};

pub async fn create_assignment(
    state: &AppState,
    tenant_id: &str,
    created_by: &str,
    request: CreateAssignmentRequest,
) -> ServiceResult<Assignment> {
    request.validate()?;
    if let Some(rubric_id) = request.rubric_id.as_deref() {
        load_rubric(state, tenant_id, rubric_id).await?;
    }

    let settings = state.settings();
    let course_id = request.course_id.clone();
    let config = request.into_config(settings.submissions(), settings.peer_review());
    let assignment = Assignment::new(tenant_id, &course_id, created_by, config, primitive_now_utc())?;
    state.storage().save_assignment(&assignment).await?;

    tracing::info!(
        tenant_id = %tenant_id,
        assignment_id = %assignment.id,
        course_id = %assignment.course_id,
        assignment_type = assignment.assignment_type.as_str(),
        "Assignment created"
    );
    Ok(assignment)
}

pub async fn get_assignment(
    state: &AppState,
    tenant_id: &str,
    assignment_id: &str,
) -> ServiceResult<Assignment> {
    load_assignment(state, tenant_id, assignment_id).await
}

pub async fn list_course_assignments(
    state: &AppState,
    tenant_id: &str,
    course_id: &str,
) -> ServiceResult<Vec<Assignment>> {
    Ok(state.storage().list_assignments_by_course(tenant_id, course_id).await?)
}

pub async fn update_assignment(
    state: &AppState,
    tenant_id: &str,
    assignment_id: &str,
    request: UpdateAssignmentRequest,
) -> ServiceResult<Assignment> {
    request.validate()?;
    if let Some(Some(rubric_id)) = request.rubric_id.as_ref() {
        load_rubric(state, tenant_id, rubric_id).await?;
    }

    let mut assignment = load_assignment(state, tenant_id, assignment_id).await?;
    assignment.update(request.into_update(state.settings().peer_review()), primitive_now_utc())?;
    state.storage().save_assignment(&assignment).await?;

    tracing::info!(tenant_id = %tenant_id, assignment_id = %assignment.id, "Assignment updated");
    Ok(assignment)
}

pub async fn publish_assignment(
    state: &AppState,
    tenant_id: &str,
    assignment_id: &str,
) -> ServiceResult<Assignment> {
    let mut assignment = load_assignment(state, tenant_id, assignment_id).await?;
    assignment.publish(primitive_now_utc())?;
    state.storage().save_assignment(&assignment).await?;

    metrics::record_publication();
    tracing::info!(tenant_id = %tenant_id, assignment_id = %assignment.id, "Assignment published");
    Ok(assignment)
}

pub async fn unpublish_assignment(
    state: &AppState,
    tenant_id: &str,
    assignment_id: &str,
) -> ServiceResult<Assignment> {
    let mut assignment = load_assignment(state, tenant_id, assignment_id).await?;
    assignment.unpublish(primitive_now_utc())?;
    state.storage().save_assignment(&assignment).await?;

    tracing::info!(tenant_id = %tenant_id, assignment_id = %assignment.id, "Assignment unpublished");
    Ok(assignment)
}
