use serde::Deserialize;
use time::OffsetDateTime;
use validator::Validate;

use crate::core::config::{PeerReviewSettings, SubmissionSettings};
use crate::core::time::to_primitive_utc;
use crate::domain::assignment::{
    AssignmentConfig, AssignmentUpdate, GradingPolicy, PeerReviewPolicy, SubmissionPolicy,
};
use crate::domain::types::AssignmentType;

const DEFAULT_MAX_POINTS: f64 = 100.0;
const DEFAULT_PASSING_RATIO: f64 = 0.6;

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct PeerReviewRequest {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default, alias = "reviewsRequired")]
    #[validate(range(min = 1, message = "reviews_required must be positive"))]
    pub reviews_required: Option<u32>,
    #[serde(default, alias = "anonymousGrading")]
    pub anonymous_grading: bool,
}

impl PeerReviewRequest {
    fn into_policy(self, defaults: &PeerReviewSettings) -> PeerReviewPolicy {
        PeerReviewPolicy {
            enabled: self.enabled,
            reviews_required: self.reviews_required.unwrap_or(defaults.default_reviews_required),
            anonymous_grading: self.anonymous_grading,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateAssignmentRequest {
    #[serde(alias = "courseId")]
    #[validate(length(min = 1, message = "course_id must not be empty"))]
    pub course_id: String,
    #[validate(length(min = 3, max = 200, message = "title must be between 3 and 200 characters"))]
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub instructions: Option<String>,
    #[serde(default = "default_assignment_type", alias = "assignmentType")]
    pub assignment_type: AssignmentType,
    #[serde(
        default,
        alias = "availableFrom",
        deserialize_with = "super::deserialize_option_datetime"
    )]
    pub available_from: Option<OffsetDateTime>,
    #[serde(default, alias = "dueDate", deserialize_with = "super::deserialize_option_datetime")]
    pub due_date: Option<OffsetDateTime>,
    #[serde(default, alias = "maxFileSizeMb")]
    #[validate(range(min = 1, message = "max_file_size_mb must be positive"))]
    pub max_file_size_mb: Option<u64>,
    #[serde(default, alias = "allowedFileTypes")]
    #[validate(length(min = 1, message = "allowed_file_types must not be empty"))]
    pub allowed_file_types: Option<Vec<String>>,
    #[serde(default, alias = "maxFiles")]
    #[validate(range(min = 1, message = "max_files must be positive"))]
    pub max_files: Option<u32>,
    #[serde(default, alias = "allowMultipleSubmissions")]
    pub allow_multiple_submissions: bool,
    #[serde(default = "default_true", alias = "acceptLateSubmissions")]
    pub accept_late_submissions: bool,
    #[serde(default, alias = "latePenaltyPerDay")]
    #[validate(range(min = 0.0, max = 100.0, message = "late_penalty_per_day must be within [0, 100]"))]
    pub late_penalty_per_day: f64,
    #[serde(default = "default_max_points", alias = "maxPoints")]
    #[validate(range(exclusive_min = 0.0, message = "max_points must be positive"))]
    pub max_points: f64,
    #[serde(default, alias = "passingScore")]
    #[validate(range(min = 0.0, message = "passing_score must be non-negative"))]
    pub passing_score: Option<f64>,
    #[serde(default, alias = "rubricId")]
    pub rubric_id: Option<String>,
    #[serde(default, alias = "peerReview")]
    #[validate(nested)]
    pub peer_review: Option<PeerReviewRequest>,
}

impl CreateAssignmentRequest {
    /// Fills the limits the request left out from the configured defaults.
    pub fn into_config(
        self,
        submissions: &SubmissionSettings,
        peer_review: &PeerReviewSettings,
    ) -> AssignmentConfig {
        let passing_score =
            self.passing_score.unwrap_or(self.max_points * DEFAULT_PASSING_RATIO);

        AssignmentConfig {
            title: self.title,
            description: self.description,
            instructions: self.instructions,
            assignment_type: self.assignment_type,
            available_from: self.available_from.map(to_primitive_utc),
            due_date: self.due_date.map(to_primitive_utc),
            submission: SubmissionPolicy {
                max_file_size_mb: self
                    .max_file_size_mb
                    .unwrap_or(submissions.default_max_file_size_mb),
                allowed_file_types: self
                    .allowed_file_types
                    .unwrap_or_else(|| submissions.default_allowed_file_types.clone()),
                max_files: self.max_files.unwrap_or(submissions.default_max_files),
                allow_multiple_submissions: self.allow_multiple_submissions,
                accept_late_submissions: self.accept_late_submissions,
                late_penalty_per_day: self.late_penalty_per_day,
            },
            grading: GradingPolicy {
                max_points: self.max_points,
                passing_score,
                rubric_id: self.rubric_id,
            },
            peer_review: self
                .peer_review
                .map(|request| request.into_policy(peer_review))
                .unwrap_or_default(),
        }
    }
}

/// Partial update. Absent fields are left alone; an explicit `null` clears the
/// optional ones.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateAssignmentRequest {
    #[serde(default)]
    #[validate(length(min = 3, max = 200, message = "title must be between 3 and 200 characters"))]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "super::deserialize_patch")]
    pub description: Option<Option<String>>,
    #[serde(default, deserialize_with = "super::deserialize_patch")]
    pub instructions: Option<Option<String>>,
    #[serde(default, alias = "assignmentType")]
    pub assignment_type: Option<AssignmentType>,
    #[serde(
        default,
        alias = "availableFrom",
        deserialize_with = "super::deserialize_patch_datetime"
    )]
    pub available_from: Option<Option<OffsetDateTime>>,
    #[serde(default, alias = "dueDate", deserialize_with = "super::deserialize_patch_datetime")]
    pub due_date: Option<Option<OffsetDateTime>>,
    #[serde(default, alias = "maxFileSizeMb")]
    #[validate(range(min = 1, message = "max_file_size_mb must be positive"))]
    pub max_file_size_mb: Option<u64>,
    #[serde(default, alias = "allowedFileTypes")]
    #[validate(length(min = 1, message = "allowed_file_types must not be empty"))]
    pub allowed_file_types: Option<Vec<String>>,
    #[serde(default, alias = "maxFiles")]
    #[validate(range(min = 1, message = "max_files must be positive"))]
    pub max_files: Option<u32>,
    #[serde(default, alias = "allowMultipleSubmissions")]
    pub allow_multiple_submissions: Option<bool>,
    #[serde(default, alias = "acceptLateSubmissions")]
    pub accept_late_submissions: Option<bool>,
    #[serde(default, alias = "latePenaltyPerDay")]
    #[validate(range(min = 0.0, max = 100.0, message = "late_penalty_per_day must be within [0, 100]"))]
    pub late_penalty_per_day: Option<f64>,
    #[serde(default, alias = "maxPoints")]
    #[validate(range(exclusive_min = 0.0, message = "max_points must be positive"))]
    pub max_points: Option<f64>,
    #[serde(default, alias = "passingScore")]
    #[validate(range(min = 0.0, message = "passing_score must be non-negative"))]
    pub passing_score: Option<f64>,
    #[serde(default, alias = "rubricId", deserialize_with = "super::deserialize_patch")]
    pub rubric_id: Option<Option<String>>,
    #[serde(default, alias = "peerReview")]
    #[validate(nested)]
    pub peer_review: Option<PeerReviewRequest>,
}

impl UpdateAssignmentRequest {
    pub fn into_update(self, peer_review: &PeerReviewSettings) -> AssignmentUpdate {
        AssignmentUpdate {
            title: self.title,
            description: self.description,
            instructions: self.instructions,
            assignment_type: self.assignment_type,
            available_from: self.available_from.map(|value| value.map(to_primitive_utc)),
            due_date: self.due_date.map(|value| value.map(to_primitive_utc)),
            max_file_size_mb: self.max_file_size_mb,
            allowed_file_types: self.allowed_file_types,
            max_files: self.max_files,
            allow_multiple_submissions: self.allow_multiple_submissions,
            accept_late_submissions: self.accept_late_submissions,
            late_penalty_per_day: self.late_penalty_per_day,
            max_points: self.max_points,
            passing_score: self.passing_score,
            rubric_id: self.rubric_id,
            peer_review: self.peer_review.map(|request| request.into_policy(peer_review)),
        }
    }
}

fn default_assignment_type() -> AssignmentType {
    AssignmentType::Essay
}

fn default_true() -> bool {
    true
}

fn default_max_points() -> f64 {
    DEFAULT_MAX_POINTS
}
