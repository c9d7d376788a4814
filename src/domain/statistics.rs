use std::collections::BTreeMap;

use serde::Serialize;

use crate::domain::assignment::Assignment;
use crate::domain::grading::round2;
use crate::domain::submission::Submission;
use crate::domain::types::{LetterGrade, SubmissionStatus};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AssignmentStatistics {
    pub assignment_id: String,
    pub total_submissions: usize,
    pub in_progress: usize,
    pub awaiting_grading: usize,
    pub under_review: usize,
    pub graded: usize,
    pub returned: usize,
    pub late_submissions: usize,
    pub average_points: Option<f64>,
    pub average_percentage: Option<f64>,
    pub highest_percentage: Option<f64>,
    pub lowest_percentage: Option<f64>,
    pub pass_rate: Option<f64>,
    pub letter_distribution: BTreeMap<LetterGrade, usize>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CourseStatistics {
    pub course_id: String,
    pub assignment_count: usize,
    pub published_assignments: usize,
    pub total_submissions: usize,
    pub graded_submissions: usize,
    pub average_percentage: Option<f64>,
    pub pass_rate: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StudentStatistics {
    pub student_id: String,
    pub total_submissions: usize,
    pub graded_submissions: usize,
    pub late_submissions: usize,
    pub passed: usize,
    pub average_percentage: Option<f64>,
}

fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        None
    } else {
        Some(round2(values.iter().sum::<f64>() / values.len() as f64))
    }
}

fn rate(part: usize, whole: usize) -> Option<f64> {
    if whole == 0 {
        None
    } else {
        Some(round2(part as f64 * 100.0 / whole as f64))
    }
}

fn graded(submissions: &[Submission]) -> impl Iterator<Item = &Submission> {
    submissions.iter().filter(|submission| submission.is_graded())
}

/// Average percentage over graded submissions and how many there are; used for
/// the assignment rollup counters.
pub fn grading_rollup(submissions: &[Submission]) -> (u32, Option<f64>) {
    let percentages: Vec<f64> = graded(submissions).filter_map(|s| s.percentage).collect();
    (percentages.len() as u32, mean(&percentages))
}

pub fn assignment_statistics(
    assignment: &Assignment,
    submissions: &[Submission],
) -> AssignmentStatistics {
    let relevant: Vec<Submission> = submissions
        .iter()
        .filter(|submission| submission.assignment_id == assignment.id)
        .cloned()
        .collect();

    let count_status =
        |status: SubmissionStatus| relevant.iter().filter(|s| s.status == status).count();

    let percentages: Vec<f64> = graded(&relevant).filter_map(|s| s.percentage).collect();
    let points: Vec<f64> = graded(&relevant).filter_map(|s| s.points_earned).collect();
    let passed = graded(&relevant).filter(|s| s.is_passing == Some(true)).count();

    let mut letter_distribution = BTreeMap::new();
    for letter in graded(&relevant).filter_map(|s| s.letter_grade) {
        *letter_distribution.entry(letter).or_insert(0) += 1;
    }

    AssignmentStatistics {
        assignment_id: assignment.id.clone(),
        total_submissions: relevant.len(),
        in_progress: count_status(SubmissionStatus::InProgress),
        awaiting_grading: count_status(SubmissionStatus::Submitted)
            + count_status(SubmissionStatus::LateSubmission),
        under_review: count_status(SubmissionStatus::UnderReview),
        graded: count_status(SubmissionStatus::Graded),
        returned: count_status(SubmissionStatus::Returned),
        late_submissions: relevant.iter().filter(|s| s.is_late).count(),
        average_points: mean(&points),
        average_percentage: mean(&percentages),
        highest_percentage: percentages.iter().copied().reduce(f64::max),
        lowest_percentage: percentages.iter().copied().reduce(f64::min),
        pass_rate: rate(passed, percentages.len()),
        letter_distribution,
    }
}

pub fn course_statistics(
    course_id: &str,
    assignments: &[Assignment],
    submissions: &[Submission],
) -> CourseStatistics {
    let course_assignments: Vec<&Assignment> =
        assignments.iter().filter(|assignment| assignment.course_id == course_id).collect();
    let in_course: Vec<Submission> = submissions
        .iter()
        .filter(|submission| {
            course_assignments.iter().any(|assignment| assignment.id == submission.assignment_id)
        })
        .cloned()
        .collect();

    let percentages: Vec<f64> = graded(&in_course).filter_map(|s| s.percentage).collect();
    let passed = graded(&in_course).filter(|s| s.is_passing == Some(true)).count();

    CourseStatistics {
        course_id: course_id.to_string(),
        assignment_count: course_assignments.len(),
        published_assignments: course_assignments.iter().filter(|a| a.is_published).count(),
        total_submissions: in_course.len(),
        graded_submissions: percentages.len(),
        average_percentage: mean(&percentages),
        pass_rate: rate(passed, percentages.len()),
    }
}

pub fn student_statistics(student_id: &str, submissions: &[Submission]) -> StudentStatistics {
    let own: Vec<Submission> = submissions
        .iter()
        .filter(|submission| submission.student_id == student_id)
        .cloned()
        .collect();
    let percentages: Vec<f64> = graded(&own).filter_map(|s| s.percentage).collect();

    StudentStatistics {
        student_id: student_id.to_string(),
        total_submissions: own.len(),
        graded_submissions: percentages.len(),
        late_submissions: own.iter().filter(|s| s.is_late).count(),
        passed: graded(&own).filter(|s| s.is_passing == Some(true)).count(),
        average_percentage: mean(&percentages),
    }
}
