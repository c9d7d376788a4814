use validator::Validate;

use crate::core::state::AppState;
use crate::core::time::primitive_now_utc;
use crate::domain::rubric::{Criterion, Rubric};
use crate::schemas::rubric::{AddCriterionRequest, CreateRubricRequest, RemoveCriterionRequest};
use crate::services::{load_rubric, ServiceResult};

pub async fn create_rubric(
    state: &AppState,
    tenant_id: &str,
    created_by: &str,
    request: CreateRubricRequest,
) -> ServiceResult<Rubric> {
    request.validate()?;
    let criteria: Vec<Criterion> =
        request.criteria.into_iter().map(|input| input.into_criterion()).collect();
    let rubric = Rubric::new(
        tenant_id,
        &request.title,
        request.description,
        criteria,
        created_by,
        primitive_now_utc(),
    )?;
    state.storage().save_rubric(&rubric).await?;

    tracing::info!(
        tenant_id = %tenant_id,
        rubric_id = %rubric.id,
        criteria = rubric.criteria.len(),
        total_points = rubric.total_points,
        "Rubric created"
    );
    Ok(rubric)
}

pub async fn get_rubric(state: &AppState, tenant_id: &str, rubric_id: &str) -> ServiceResult<Rubric> {
    load_rubric(state, tenant_id, rubric_id).await
}

/// Adds a criterion, rebalancing existing weights first. The stored rubric only
/// changes when the result validates.
pub async fn add_criterion(
    state: &AppState,
    tenant_id: &str,
    rubric_id: &str,
    request: AddCriterionRequest,
) -> ServiceResult<Rubric> {
    request.validate()?;
    let mut rubric = load_rubric(state, tenant_id, rubric_id).await?;
    let now = primitive_now_utc();

    rubric.set_weights(&request.reweight, now)?;
    rubric.add_criterion(request.criterion.into_criterion(), now)?;
    rubric.validate()?;
    state.storage().save_rubric(&rubric).await?;

    tracing::info!(
        tenant_id = %tenant_id,
        rubric_id = %rubric.id,
        criteria = rubric.criteria.len(),
        "Rubric criterion added"
    );
    Ok(rubric)
}

pub async fn remove_criterion(
    state: &AppState,
    tenant_id: &str,
    rubric_id: &str,
    request: RemoveCriterionRequest,
) -> ServiceResult<Rubric> {
    request.validate()?;
    let mut rubric = load_rubric(state, tenant_id, rubric_id).await?;
    let now = primitive_now_utc();

    let removed = rubric.remove_criterion(&request.criterion_id, now)?;
    rubric.set_weights(&request.reweight, now)?;
    rubric.validate()?;
    state.storage().save_rubric(&rubric).await?;

    tracing::info!(
        tenant_id = %tenant_id,
        rubric_id = %rubric.id,
        criterion_id = %removed.id,
        "Rubric criterion removed"
    );
    Ok(rubric)
}
