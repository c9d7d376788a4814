use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::domain::rubric::{Criterion, Level};

#[derive(Debug, Clone, Deserialize, Serialize, Validate)]
pub struct LevelInput {
    #[validate(length(min = 1, max = 200, message = "level title must be 1-200 characters"))]
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[validate(range(min = 0.0, message = "level points must be non-negative"))]
    pub points: f64,
}

#[derive(Debug, Clone, Deserialize, Serialize, Validate)]
pub struct CriterionInput {
    #[validate(length(min = 1, max = 200, message = "criterion title must be 1-200 characters"))]
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(alias = "maxPoints")]
    #[validate(range(exclusive_min = 0.0, message = "max_points must be positive"))]
    pub max_points: f64,
    #[validate(range(exclusive_min = 0.0, max = 1.0, message = "weight must be within (0, 1]"))]
    pub weight: f64,
    #[validate(length(min = 1, message = "a criterion needs at least one level"), nested)]
    pub levels: Vec<LevelInput>,
}

impl CriterionInput {
    pub fn into_criterion(self) -> Criterion {
        let levels = self
            .levels
            .into_iter()
            .map(|input| Level { description: input.description, ..Level::new(&input.title, input.points) })
            .collect();
        Criterion {
            description: self.description,
            ..Criterion::new(&self.title, self.max_points, self.weight, levels)
        }
    }
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateRubricRequest {
    #[validate(length(min = 1, max = 200, message = "title must be 1-200 characters"))]
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[validate(length(min = 1, message = "a rubric needs at least one criterion"), nested)]
    pub criteria: Vec<CriterionInput>,
}

/// Adds a criterion. Existing weights can be rebalanced in the same call so the
/// rubric still sums to 1.0 afterwards.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct AddCriterionRequest {
    #[validate(nested)]
    pub criterion: CriterionInput,
    #[serde(default)]
    pub reweight: BTreeMap<String, f64>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct RemoveCriterionRequest {
    #[serde(alias = "criterionId")]
    #[validate(length(min = 1, message = "criterion_id must not be empty"))]
    pub criterion_id: String,
    #[serde(default)]
    pub reweight: BTreeMap<String, f64>,
}
