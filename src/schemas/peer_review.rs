use std::collections::BTreeMap;

use serde::Deserialize;
use validator::Validate;

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct AssignReviewerRequest {
    #[serde(alias = "reviewerId")]
    #[validate(length(min = 1, message = "reviewer_id must not be empty"))]
    pub reviewer_id: String,
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct PeerReviewScoresRequest {
    #[serde(default)]
    #[validate(length(max = 10000, message = "feedback must be at most 10000 characters"))]
    pub feedback: Option<String>,
    #[serde(default)]
    pub scores: BTreeMap<String, f64>,
}
