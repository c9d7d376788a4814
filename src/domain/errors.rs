use thiserror::Error;

use crate::domain::types::SubmissionStatus;

/// How a [`DomainError`] should be surfaced. Neither kind is retryable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Malformed entity state or input.
    Validation,
    /// The entity is in the wrong state for the requested action.
    StateGuard,
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum DomainError {
    #[error("title must be between 3 and 200 characters, got {0}")]
    InvalidTitle(usize),
    #[error("max_points must be positive, got {0}")]
    InvalidMaxPoints(f64),
    #[error("passing_score {passing_score} must be within [0, {max_points}]")]
    InvalidPassingScore { passing_score: f64, max_points: f64 },
    #[error("late_penalty_per_day must be within [0, 100], got {0}")]
    InvalidLatePenalty(f64),
    #[error("available_from must not be after due_date")]
    InvalidSchedule,
    #[error("reviews_required must be positive when peer review is enabled")]
    InvalidPeerReviewConfig,
    #[error("max_file_size_mb must be positive")]
    InvalidFileSizeLimit,
    #[error("assignment is already published")]
    AlreadyPublished,
    #[error("assignment is not published")]
    NotPublished,

    #[error("submission has already been submitted")]
    AlreadySubmitted,
    #[error("submission has no text content and no files")]
    SubmissionEmpty,
    #[error("submission content exceeds {max} characters")]
    ContentTooLong { max: usize },
    #[error("submitted work can no longer be modified")]
    CannotModifySubmittedSubmission,
    #[error("assignment allows at most {max} files")]
    MaxFilesExceeded { max: u32 },
    #[error("file {0} is already attached")]
    DuplicateFile(String),
    #[error("file {0} is not attached to this submission")]
    FileNotAttached(String),
    #[error("cannot {action} a submission in status {status}")]
    InvalidStatusTransition { action: &'static str, status: SubmissionStatus },
    #[error("assignment does not allow multiple submissions")]
    MultipleSubmissionsNotAllowed,
    #[error("plagiarism score must be within [0, 100], got {0}")]
    InvalidPlagiarismScore(f64),

    #[error("only submitted work can be graded")]
    CannotGradeUnsubmittedSubmission,
    #[error("invalid points: {0}")]
    InvalidPoints(String),
    #[error("criterion {0} is not part of the assignment rubric")]
    UnknownCriterion(String),
    #[error("criterion {0} is graded more than once")]
    DuplicateCriterionGrade(String),

    #[error("criterion weights must sum to 1.0, got {0:.2}")]
    InvalidTotalWeight(f64),
    #[error("criterion {criterion} has weight {weight} outside [0, 1]")]
    InvalidCriterionWeight { criterion: String, weight: f64 },
    #[error("criterion {0} must have a positive max_points")]
    InvalidCriterionMaxPoints(String),
    #[error("criterion {0} must define at least one performance level")]
    EmptyCriterionLevels(String),
    #[error("level of criterion {criterion} awards {points} points, above max {max_points}")]
    InvalidLevelPoints { criterion: String, points: f64, max_points: f64 },
    #[error("criterion {0} not found in rubric")]
    CriterionNotFound(String),
    #[error("criterion {0} already exists in rubric")]
    DuplicateCriterion(String),
    #[error("no performance level {level} in criterion {criterion}")]
    LevelNotFound { criterion: String, level: String },

    #[error("peer reviews are not enabled for this assignment")]
    PeerReviewsNotEnabled,
    #[error("students cannot review their own submission")]
    CannotReviewOwnSubmission,
    #[error("reviewer is already assigned to this submission")]
    PeerReviewAlreadyAssigned,
    #[error("only submitted work can be peer reviewed")]
    CannotReviewUnsubmittedSubmission,
    #[error("reviewer already has {max} open peer reviews for this assignment")]
    ReviewerAtCapacity { max: u32 },
    #[error("peer review scores must be non-empty, finite and non-negative")]
    InvalidPeerReviewScores,
    #[error("completed peer reviews cannot be updated")]
    CannotUpdateCompletedReview,
}

impl DomainError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::AlreadyPublished
            | Self::NotPublished
            | Self::AlreadySubmitted
            | Self::CannotModifySubmittedSubmission
            | Self::MaxFilesExceeded { .. }
            | Self::InvalidStatusTransition { .. }
            | Self::MultipleSubmissionsNotAllowed
            | Self::CannotGradeUnsubmittedSubmission
            | Self::PeerReviewsNotEnabled
            | Self::CannotReviewOwnSubmission
            | Self::PeerReviewAlreadyAssigned
            | Self::CannotReviewUnsubmittedSubmission
            | Self::ReviewerAtCapacity { .. }
            | Self::CannotUpdateCompletedReview => ErrorKind::StateGuard,
            _ => ErrorKind::Validation,
        }
    }

    /// Stable machine-readable identifier for callers that translate errors.
    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidTitle(_) => "invalid_title",
            Self::InvalidMaxPoints(_) => "invalid_max_points",
            Self::InvalidPassingScore { .. } => "invalid_passing_score",
            Self::InvalidLatePenalty(_) => "invalid_late_penalty",
            Self::InvalidSchedule => "invalid_schedule",
            Self::InvalidPeerReviewConfig => "invalid_peer_review_config",
            Self::InvalidFileSizeLimit => "invalid_file_size_limit",
            Self::AlreadyPublished => "already_published",
            Self::NotPublished => "not_published",
            Self::AlreadySubmitted => "already_submitted",
            Self::SubmissionEmpty => "submission_empty",
            Self::ContentTooLong { .. } => "content_too_long",
            Self::CannotModifySubmittedSubmission => "cannot_modify_submitted_submission",
            Self::MaxFilesExceeded { .. } => "max_files_exceeded",
            Self::DuplicateFile(_) => "duplicate_file",
            Self::FileNotAttached(_) => "file_not_attached",
            Self::InvalidStatusTransition { .. } => "invalid_status_transition",
            Self::MultipleSubmissionsNotAllowed => "multiple_submissions_not_allowed",
            Self::InvalidPlagiarismScore(_) => "invalid_plagiarism_score",
            Self::CannotGradeUnsubmittedSubmission => "cannot_grade_unsubmitted_submission",
            Self::InvalidPoints(_) => "invalid_points",
            Self::UnknownCriterion(_) => "unknown_criterion",
            Self::DuplicateCriterionGrade(_) => "duplicate_criterion_grade",
            Self::InvalidTotalWeight(_) => "invalid_total_weight",
            Self::InvalidCriterionWeight { .. } => "invalid_criterion_weight",
            Self::InvalidCriterionMaxPoints(_) => "invalid_criterion_max_points",
            Self::EmptyCriterionLevels(_) => "empty_criterion_levels",
            Self::InvalidLevelPoints { .. } => "invalid_level_points",
            Self::CriterionNotFound(_) => "criterion_not_found",
            Self::DuplicateCriterion(_) => "duplicate_criterion",
            Self::LevelNotFound { .. } => "level_not_found",
            Self::PeerReviewsNotEnabled => "peer_reviews_not_enabled",
            Self::CannotReviewOwnSubmission => "cannot_review_own_submission",
            Self::PeerReviewAlreadyAssigned => "peer_review_already_assigned",
            Self::CannotReviewUnsubmittedSubmission => "cannot_review_unsubmitted_submission",
            Self::ReviewerAtCapacity { .. } => "reviewer_at_capacity",
            Self::InvalidPeerReviewScores => "invalid_peer_review_scores",
            Self::CannotUpdateCompletedReview => "cannot_update_completed_review",
        }
    }
}

pub type DomainResult<T> = Result<T, DomainError>;
