use std::sync::{Arc, OnceLock};

use time::{Date, Duration, Month, OffsetDateTime, PrimitiveDateTime, Time};
use tokio::sync::{Mutex, OwnedMutexGuard};

use crate::core::config::Settings;
use crate::core::state::AppState;
use crate::domain::assignment::{
    Assignment, AssignmentConfig, GradingPolicy, PeerReviewPolicy, SubmissionPolicy,
};
use crate::domain::rubric::{Criterion, Level, Rubric};
use crate::domain::types::AssignmentType;
use crate::repositories::InMemoryStorage;
use crate::schemas::assignment::{CreateAssignmentRequest, PeerReviewRequest};

pub(crate) const TENANT: &str = "tenant-1";
pub(crate) const COURSE: &str = "course-1";
pub(crate) const TEACHER: &str = "teacher-1";

pub(crate) async fn env_lock() -> OwnedMutexGuard<()> {
    static LOCK: OnceLock<Arc<Mutex<()>>> = OnceLock::new();
    let lock = LOCK.get_or_init(|| Arc::new(Mutex::new(()))).clone();
    lock.lock_owned().await
}

/// Whole-hour UTC timestamp.
pub(crate) fn at(year: i32, month: u8, day: u8, hour: u8) -> PrimitiveDateTime {
    let month = Month::try_from(month).expect("valid month");
    let date = Date::from_calendar_date(year, month, day).expect("valid date");
    let time = Time::from_hms(hour, 0, 0).expect("valid time");
    PrimitiveDateTime::new(date, time)
}

pub(crate) fn assignment_config() -> AssignmentConfig {
    AssignmentConfig {
        title: "Essay on ownership".to_string(),
        description: Some("Explain borrowing with examples".to_string()),
        instructions: None,
        assignment_type: AssignmentType::Essay,
        available_from: None,
        due_date: None,
        submission: SubmissionPolicy {
            max_file_size_mb: 10,
            allowed_file_types: vec!["pdf".to_string()],
            max_files: 3,
            allow_multiple_submissions: true,
            accept_late_submissions: true,
            late_penalty_per_day: 10.0,
        },
        grading: GradingPolicy { max_points: 100.0, passing_score: 60.0, rubric_id: None },
        peer_review: PeerReviewPolicy::default(),
    }
}

/// Published on 2024-01-01, due 2024-01-10 00:00, 10% per late day.
pub(crate) fn published_assignment() -> Assignment {
    let config = AssignmentConfig { due_date: Some(at(2024, 1, 10, 0)), ..assignment_config() };
    let mut assignment =
        Assignment::new(TENANT, COURSE, TEACHER, config, at(2024, 1, 1, 0)).expect("assignment");
    assignment.publish(at(2024, 1, 1, 0)).expect("publish");
    assignment
}

pub(crate) fn peer_review_assignment() -> Assignment {
    let mut assignment = published_assignment();
    assignment.peer_review =
        PeerReviewPolicy { enabled: true, reviews_required: 2, anonymous_grading: false };
    assignment
}

pub(crate) fn criterion(title: &str, max_points: f64, weight: f64) -> Criterion {
    Criterion::new(
        title,
        max_points,
        weight,
        vec![
            Level::new("Excellent", max_points),
            Level::new("Good", max_points * 0.7),
            Level::new("Poor", 0.0),
        ],
    )
}

pub(crate) fn sample_rubric() -> Rubric {
    Rubric::new(
        TENANT,
        "Essay rubric",
        None,
        vec![
            criterion("Thesis", 40.0, 0.5),
            criterion("Evidence", 30.0, 0.3),
            criterion("Style", 30.0, 0.2),
        ],
        TEACHER,
        at(2024, 1, 1, 0),
    )
    .expect("rubric")
}

pub(crate) fn test_state() -> AppState {
    AppState::new(Settings::default(), Arc::new(InMemoryStorage::new()))
}

/// Assignment request against the wall clock; `due_in` may be negative.
pub(crate) fn create_request(due_in: Option<Duration>) -> CreateAssignmentRequest {
    CreateAssignmentRequest {
        course_id: COURSE.to_string(),
        title: "Essay on ownership".to_string(),
        description: None,
        instructions: None,
        assignment_type: AssignmentType::Essay,
        available_from: None,
        due_date: due_in.map(|offset| OffsetDateTime::now_utc() + offset),
        max_file_size_mb: None,
        allowed_file_types: None,
        max_files: Some(3),
        allow_multiple_submissions: true,
        accept_late_submissions: true,
        late_penalty_per_day: 10.0,
        max_points: 100.0,
        passing_score: Some(60.0),
        rubric_id: None,
        peer_review: None,
    }
}

pub(crate) fn peer_review_request(reviews_required: u32, anonymous: bool) -> PeerReviewRequest {
    PeerReviewRequest {
        enabled: true,
        reviews_required: Some(reviews_required),
        anonymous_grading: anonymous,
    }
}
