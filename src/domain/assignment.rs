use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use time::{Duration, PrimitiveDateTime};
use uuid::Uuid;

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::types::AssignmentType;

pub const TITLE_MIN_LEN: usize = 3;
pub const TITLE_MAX_LEN: usize = 200;

const SECONDS_PER_DAY: f64 = 86_400.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubmissionPolicy {
    pub max_file_size_mb: u64,
    pub allowed_file_types: Vec<String>,
    pub max_files: u32,
    pub allow_multiple_submissions: bool,
    pub accept_late_submissions: bool,
    /// Percent deducted per started day late.
    pub late_penalty_per_day: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GradingPolicy {
    pub max_points: f64,
    pub passing_score: f64,
    pub rubric_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PeerReviewPolicy {
    pub enabled: bool,
    pub reviews_required: u32,
    pub anonymous_grading: bool,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct AssignmentRollup {
    pub submission_count: u32,
    pub graded_count: u32,
    pub average_grade: Option<f64>,
}

/// Instructor-supplied configuration for a new assignment.
#[derive(Debug, Clone, PartialEq)]
pub struct AssignmentConfig {
    pub title: String,
    pub description: Option<String>,
    pub instructions: Option<String>,
    pub assignment_type: AssignmentType,
    pub available_from: Option<PrimitiveDateTime>,
    pub due_date: Option<PrimitiveDateTime>,
    pub submission: SubmissionPolicy,
    pub grading: GradingPolicy,
    pub peer_review: PeerReviewPolicy,
}

/// Partial update; `None` leaves the field untouched. Nested options clear the
/// value when set to `Some(None)`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AssignmentUpdate {
    pub title: Option<String>,
    pub description: Option<Option<String>>,
    pub instructions: Option<Option<String>>,
    pub assignment_type: Option<AssignmentType>,
    pub available_from: Option<Option<PrimitiveDateTime>>,
    pub due_date: Option<Option<PrimitiveDateTime>>,
    pub max_file_size_mb: Option<u64>,
    pub allowed_file_types: Option<Vec<String>>,
    pub max_files: Option<u32>,
    pub allow_multiple_submissions: Option<bool>,
    pub accept_late_submissions: Option<bool>,
    pub late_penalty_per_day: Option<f64>,
    pub max_points: Option<f64>,
    pub passing_score: Option<f64>,
    pub rubric_id: Option<Option<String>>,
    pub peer_review: Option<PeerReviewPolicy>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LatePenalty {
    pub days_late: u32,
    pub percent: f64,
}

impl LatePenalty {
    pub const NONE: Self = Self { days_late: 0, percent: 0.0 };

    pub fn is_none(&self) -> bool {
        self.days_late == 0
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Assignment {
    pub id: String,
    pub tenant_id: String,
    pub course_id: String,
    pub title: String,
    pub description: Option<String>,
    pub instructions: Option<String>,
    pub assignment_type: AssignmentType,
    pub available_from: Option<PrimitiveDateTime>,
    pub due_date: Option<PrimitiveDateTime>,
    pub submission: SubmissionPolicy,
    pub grading: GradingPolicy,
    pub peer_review: PeerReviewPolicy,
    pub is_published: bool,
    pub published_at: Option<PrimitiveDateTime>,
    pub rollup: AssignmentRollup,
    pub created_by: String,
    pub created_at: PrimitiveDateTime,
    pub updated_at: PrimitiveDateTime,
}

impl Assignment {
    pub fn new(
        tenant_id: &str,
        course_id: &str,
        created_by: &str,
        config: AssignmentConfig,
        now: PrimitiveDateTime,
    ) -> DomainResult<Self> {
        let assignment = Self {
            id: Uuid::new_v4().to_string(),
            tenant_id: tenant_id.to_string(),
            course_id: course_id.to_string(),
            title: config.title.trim().to_string(),
            description: config.description,
            instructions: config.instructions,
            assignment_type: config.assignment_type,
            available_from: config.available_from,
            due_date: config.due_date,
            submission: SubmissionPolicy {
                allowed_file_types: normalize_file_types(config.submission.allowed_file_types),
                ..config.submission
            },
            grading: config.grading,
            peer_review: config.peer_review,
            is_published: false,
            published_at: None,
            rollup: AssignmentRollup::default(),
            created_by: created_by.to_string(),
            created_at: now,
            updated_at: now,
        };
        assignment.validate()?;
        Ok(assignment)
    }

    pub fn validate(&self) -> DomainResult<()> {
        let title_len = self.title.trim().chars().count();
        if !(TITLE_MIN_LEN..=TITLE_MAX_LEN).contains(&title_len) {
            return Err(DomainError::InvalidTitle(title_len));
        }

        let max_points = self.grading.max_points;
        if !max_points.is_finite() || max_points <= 0.0 {
            return Err(DomainError::InvalidMaxPoints(max_points));
        }

        let passing_score = self.grading.passing_score;
        if !passing_score.is_finite() || passing_score < 0.0 || passing_score > max_points {
            return Err(DomainError::InvalidPassingScore { passing_score, max_points });
        }

        let penalty = self.submission.late_penalty_per_day;
        if !penalty.is_finite() || !(0.0..=100.0).contains(&penalty) {
            return Err(DomainError::InvalidLatePenalty(penalty));
        }

        if let (Some(available_from), Some(due_date)) = (self.available_from, self.due_date) {
            if available_from > due_date {
                return Err(DomainError::InvalidSchedule);
            }
        }

        if self.peer_review.enabled && self.peer_review.reviews_required == 0 {
            return Err(DomainError::InvalidPeerReviewConfig);
        }

        if self.submission.max_file_size_mb == 0 {
            return Err(DomainError::InvalidFileSizeLimit);
        }

        Ok(())
    }

    /// Applies `update` atomically: on a validation failure `self` is unchanged.
    pub fn update(&mut self, update: AssignmentUpdate, now: PrimitiveDateTime) -> DomainResult<()> {
        let mut next = self.clone();

        if let Some(title) = update.title {
            next.title = title.trim().to_string();
        }
        if let Some(description) = update.description {
            next.description = description;
        }
        if let Some(instructions) = update.instructions {
            next.instructions = instructions;
        }
        if let Some(assignment_type) = update.assignment_type {
            next.assignment_type = assignment_type;
        }
        if let Some(available_from) = update.available_from {
            next.available_from = available_from;
        }
        if let Some(due_date) = update.due_date {
            next.due_date = due_date;
        }
        if let Some(max_file_size_mb) = update.max_file_size_mb {
            next.submission.max_file_size_mb = max_file_size_mb;
        }
        if let Some(allowed_file_types) = update.allowed_file_types {
            next.submission.allowed_file_types = normalize_file_types(allowed_file_types);
        }
        if let Some(max_files) = update.max_files {
            next.submission.max_files = max_files;
        }
        if let Some(allow) = update.allow_multiple_submissions {
            next.submission.allow_multiple_submissions = allow;
        }
        if let Some(accept) = update.accept_late_submissions {
            next.submission.accept_late_submissions = accept;
        }
        if let Some(penalty) = update.late_penalty_per_day {
            next.submission.late_penalty_per_day = penalty;
        }
        if let Some(max_points) = update.max_points {
            next.grading.max_points = max_points;
        }
        if let Some(passing_score) = update.passing_score {
            next.grading.passing_score = passing_score;
        }
        if let Some(rubric_id) = update.rubric_id {
            next.grading.rubric_id = rubric_id;
        }
        if let Some(peer_review) = update.peer_review {
            next.peer_review = peer_review;
        }

        next.validate()?;
        next.updated_at = now;
        *self = next;
        Ok(())
    }

    pub fn publish(&mut self, now: PrimitiveDateTime) -> DomainResult<()> {
        if self.is_published {
            return Err(DomainError::AlreadyPublished);
        }
        self.validate()?;
        self.is_published = true;
        self.published_at = Some(now);
        self.updated_at = now;
        Ok(())
    }

    pub fn unpublish(&mut self, now: PrimitiveDateTime) -> DomainResult<()> {
        if !self.is_published {
            return Err(DomainError::NotPublished);
        }
        self.is_published = false;
        self.updated_at = now;
        Ok(())
    }

    pub fn is_available(&self, now: PrimitiveDateTime) -> bool {
        self.is_published && self.available_from.map_or(true, |from| from <= now)
    }

    pub fn is_overdue(&self, now: PrimitiveDateTime) -> bool {
        self.due_date.is_some_and(|due| now > due)
    }

    /// Time left until the due date; `None` without a due date, zero once overdue.
    pub fn time_remaining(&self, now: PrimitiveDateTime) -> Option<Duration> {
        self.due_date.map(|due| if now >= due { Duration::ZERO } else { due - now })
    }

    /// Started days past the due date, regardless of the late policy.
    pub fn days_late(&self, submitted_at: PrimitiveDateTime) -> u32 {
        let Some(due_date) = self.due_date else {
            return 0;
        };
        if submitted_at <= due_date {
            return 0;
        }

        let seconds_late = (submitted_at - due_date).as_seconds_f64();
        let days = (seconds_late / SECONDS_PER_DAY).ceil().max(1.0);
        days.min(f64::from(u32::MAX)) as u32
    }

    /// Percentage reduction owed for a submission at `submitted_at`. Stored on the
    /// submission and only applied to points at grading time.
    pub fn calculate_late_penalty(&self, submitted_at: PrimitiveDateTime) -> LatePenalty {
        if !self.submission.accept_late_submissions {
            return LatePenalty::NONE;
        }

        let days_late = self.days_late(submitted_at);
        if days_late == 0 {
            return LatePenalty::NONE;
        }

        let percent = (f64::from(days_late) * self.submission.late_penalty_per_day).min(100.0);
        LatePenalty { days_late, percent }
    }

    pub fn has_rubric(&self) -> bool {
        self.grading.rubric_id.is_some()
    }

    pub(crate) fn record_first_submission(&mut self, now: PrimitiveDateTime) {
        self.rollup.submission_count = self.rollup.submission_count.saturating_add(1);
        self.updated_at = now;
    }

    pub(crate) fn record_removed_submission(&mut self, now: PrimitiveDateTime) {
        self.rollup.submission_count = self.rollup.submission_count.saturating_sub(1);
        self.updated_at = now;
    }

    pub(crate) fn apply_grading_rollup(
        &mut self,
        graded_count: u32,
        average_grade: Option<f64>,
        now: PrimitiveDateTime,
    ) {
        self.rollup.graded_count = graded_count;
        self.rollup.average_grade = average_grade;
        self.updated_at = now;
    }
}

/// Lowercased extensions without dots, first occurrence kept.
fn normalize_file_types(types: Vec<String>) -> Vec<String> {
    let mut seen = HashSet::new();
    types
        .into_iter()
        .map(|item| item.trim().trim_start_matches('.').to_ascii_lowercase())
        .filter(|item| !item.is_empty() && seen.insert(item.clone()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{assignment_config, at};

    fn assignment() -> Assignment {
        Assignment::new("tenant-1", "course-1", "teacher-1", assignment_config(), at(2024, 1, 1, 0))
            .expect("valid assignment")
    }

    #[test]
    fn new_assignment_starts_unpublished() {
        let assignment = assignment();
        assert!(!assignment.is_published);
        assert!(assignment.published_at.is_none());
        assert_eq!(assignment.rollup, AssignmentRollup::default());
    }

    #[test]
    fn file_types_are_deduplicated_in_order() {
        let mut config = assignment_config();
        config.submission.allowed_file_types =
            vec!["pdf".to_string(), ".MD".to_string(), " pdf".to_string(), "md".to_string()];
        let assignment = Assignment::new("t", "c", "u", config, at(2024, 1, 1, 0)).expect("assignment");
        assert_eq!(assignment.submission.allowed_file_types, vec!["pdf", "md"]);
    }

    #[test]
    fn title_length_is_enforced() {
        let mut config = assignment_config();
        config.title = "ab".to_string();
        let err = Assignment::new("t", "c", "u", config, at(2024, 1, 1, 0)).unwrap_err();
        assert_eq!(err, DomainError::InvalidTitle(2));

        let mut config = assignment_config();
        config.title = "x".repeat(201);
        let err = Assignment::new("t", "c", "u", config, at(2024, 1, 1, 0)).unwrap_err();
        assert_eq!(err, DomainError::InvalidTitle(201));
    }

    #[test]
    fn passing_score_must_fit_max_points() {
        let mut config = assignment_config();
        config.grading.passing_score = 101.0;
        let err = Assignment::new("t", "c", "u", config, at(2024, 1, 1, 0)).unwrap_err();
        assert!(matches!(err, DomainError::InvalidPassingScore { .. }));

        let mut config = assignment_config();
        config.grading.passing_score = -1.0;
        assert!(Assignment::new("t", "c", "u", config, at(2024, 1, 1, 0)).is_err());
    }

    #[test]
    fn late_penalty_range_is_enforced() {
        let mut config = assignment_config();
        config.submission.late_penalty_per_day = 100.5;
        let err = Assignment::new("t", "c", "u", config, at(2024, 1, 1, 0)).unwrap_err();
        assert_eq!(err, DomainError::InvalidLatePenalty(100.5));
    }

    #[test]
    fn schedule_must_be_ordered() {
        let mut config = assignment_config();
        config.available_from = Some(at(2024, 2, 1, 0));
        config.due_date = Some(at(2024, 1, 10, 0));
        let err = Assignment::new("t", "c", "u", config, at(2024, 1, 1, 0)).unwrap_err();
        assert_eq!(err, DomainError::InvalidSchedule);
    }

    #[test]
    fn enabled_peer_review_requires_reviews() {
        let mut config = assignment_config();
        config.peer_review = PeerReviewPolicy { enabled: true, ..PeerReviewPolicy::default() };
        let err = Assignment::new("t", "c", "u", config, at(2024, 1, 1, 0)).unwrap_err();
        assert_eq!(err, DomainError::InvalidPeerReviewConfig);
    }

    #[test]
    fn publish_and_unpublish_guard_state() {
        let mut assignment = assignment();
        assert_eq!(assignment.unpublish(at(2024, 1, 2, 0)), Err(DomainError::NotPublished));

        assignment.publish(at(2024, 1, 2, 0)).expect("publish");
        assert!(assignment.is_published);
        assert_eq!(assignment.published_at, Some(at(2024, 1, 2, 0)));
        assert_eq!(assignment.publish(at(2024, 1, 3, 0)), Err(DomainError::AlreadyPublished));

        assignment.unpublish(at(2024, 1, 4, 0)).expect("unpublish");
        assert!(!assignment.is_published);
    }

    #[test]
    fn publish_revalidates() {
        let mut assignment = assignment();
        assignment.grading.passing_score = 500.0;
        assert!(matches!(
            assignment.publish(at(2024, 1, 2, 0)),
            Err(DomainError::InvalidPassingScore { .. })
        ));
        assert!(!assignment.is_published);
    }

    #[test]
    fn availability_requires_publication_and_window() {
        let mut assignment = assignment();
        assignment.available_from = Some(at(2024, 1, 5, 0));
        assert!(!assignment.is_available(at(2024, 1, 6, 0)));

        assignment.publish(at(2024, 1, 2, 0)).expect("publish");
        assert!(!assignment.is_available(at(2024, 1, 4, 23)));
        assert!(assignment.is_available(at(2024, 1, 5, 0)));

        assignment.available_from = None;
        assert!(assignment.is_available(at(2023, 12, 1, 0)));
    }

    #[test]
    fn late_penalty_matches_started_days() {
        let mut assignment = assignment();
        assignment.due_date = Some(at(2024, 1, 10, 0));
        assignment.submission.accept_late_submissions = true;
        assignment.submission.late_penalty_per_day = 10.0;

        let penalty = assignment.calculate_late_penalty(at(2024, 1, 12, 13));
        assert_eq!(penalty, LatePenalty { days_late: 3, percent: 30.0 });

        let one_minute_late = at(2024, 1, 10, 0) + Duration::minutes(1);
        assert_eq!(assignment.calculate_late_penalty(one_minute_late).days_late, 1);
        assert!(assignment.calculate_late_penalty(at(2024, 1, 10, 0)).is_none());
        assert!(assignment.calculate_late_penalty(at(2024, 1, 9, 12)).is_none());
    }

    #[test]
    fn late_penalty_is_zero_without_due_date_or_late_policy() {
        let mut assignment = assignment();
        assignment.due_date = None;
        assignment.submission.accept_late_submissions = true;
        assert!(assignment.calculate_late_penalty(at(2030, 1, 1, 0)).is_none());

        assignment.due_date = Some(at(2024, 1, 10, 0));
        assignment.submission.accept_late_submissions = false;
        assert!(assignment.calculate_late_penalty(at(2024, 1, 20, 0)).is_none());
        assert_eq!(assignment.days_late(at(2024, 1, 20, 0)), 10);
    }

    #[test]
    fn late_penalty_is_monotonic_idempotent_and_capped() {
        let mut assignment = assignment();
        assignment.due_date = Some(at(2024, 1, 10, 0));
        assignment.submission.accept_late_submissions = true;
        assignment.submission.late_penalty_per_day = 15.0;

        let mut previous = 0.0;
        for hours in (1..=24 * 12).step_by(5) {
            let submitted_at = at(2024, 1, 10, 0) + Duration::hours(hours);
            let first = assignment.calculate_late_penalty(submitted_at);
            let second = assignment.calculate_late_penalty(submitted_at);
            assert_eq!(first, second);
            assert!(first.percent >= previous);
            assert!(first.percent <= 100.0);
            previous = first.percent;
        }
        assert_eq!(previous, 100.0);
    }

    #[test]
    fn update_is_all_or_nothing() {
        let mut assignment = assignment();
        let before = assignment.clone();

        let err = assignment
            .update(
                AssignmentUpdate {
                    title: Some("Renamed essay".to_string()),
                    passing_score: Some(150.0),
                    ..AssignmentUpdate::default()
                },
                at(2024, 1, 2, 0),
            )
            .unwrap_err();
        assert!(matches!(err, DomainError::InvalidPassingScore { .. }));
        assert_eq!(assignment, before);

        assignment
            .update(
                AssignmentUpdate {
                    title: Some("  Renamed essay ".to_string()),
                    allowed_file_types: Some(vec![".PDF".to_string(), " md".to_string()]),
                    ..AssignmentUpdate::default()
                },
                at(2024, 1, 2, 0),
            )
            .expect("update");
        assert_eq!(assignment.title, "Renamed essay");
        assert_eq!(assignment.submission.allowed_file_types, vec!["pdf", "md"]);
        assert_eq!(assignment.updated_at, at(2024, 1, 2, 0));
    }

    #[test]
    fn time_remaining_saturates_at_zero() {
        let mut assignment = assignment();
        assignment.due_date = Some(at(2024, 1, 10, 0));
        assert_eq!(assignment.time_remaining(at(2024, 1, 9, 0)), Some(Duration::days(1)));
        assert_eq!(assignment.time_remaining(at(2024, 1, 11, 0)), Some(Duration::ZERO));
        assert!(assignment.is_overdue(at(2024, 1, 11, 0)));
        assert!(!assignment.is_overdue(at(2024, 1, 10, 0)));
    }
}
