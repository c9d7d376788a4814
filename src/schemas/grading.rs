use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::domain::grading::GradeInput;

#[derive(Debug, Clone, Deserialize, Serialize, Validate)]
pub struct GradeInputRequest {
    #[serde(default, alias = "criterionId")]
    pub criterion_id: Option<String>,
    #[serde(alias = "pointsEarned")]
    pub points_earned: f64,
    #[serde(alias = "pointsPossible")]
    pub points_possible: f64,
    #[serde(default)]
    pub feedback: Option<String>,
}

impl From<GradeInputRequest> for GradeInput {
    fn from(request: GradeInputRequest) -> Self {
        Self {
            criterion_id: request.criterion_id,
            points_earned: request.points_earned,
            points_possible: request.points_possible,
            feedback: request.feedback,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct GradeSubmissionRequest {
    #[validate(length(min = 1, message = "at least one grade is required"), nested)]
    pub grades: Vec<GradeInputRequest>,
    #[serde(default)]
    pub feedback: Option<String>,
}

/// Criterion id to the id of the selected performance level.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct RubricLevelGradeRequest {
    pub selections: BTreeMap<String, String>,
    #[serde(default)]
    pub feedback: Option<String>,
}
