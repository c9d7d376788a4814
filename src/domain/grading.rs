use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use time::PrimitiveDateTime;
use uuid::Uuid;

use crate::domain::assignment::Assignment;
use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::rubric::Rubric;
use crate::domain::submission::Submission;
use crate::domain::types::LetterGrade;

/// Points awarded for one rubric criterion, or for the whole assignment when
/// `criterion_id` is `None`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GradeInput {
    pub criterion_id: Option<String>,
    pub points_earned: f64,
    pub points_possible: f64,
    pub feedback: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Grade {
    pub id: String,
    pub tenant_id: String,
    pub submission_id: String,
    pub criterion_id: Option<String>,
    pub points_earned: f64,
    pub points_possible: f64,
    pub feedback: Option<String>,
    pub graded_by: String,
    pub created_at: PrimitiveDateTime,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GradeOutcome {
    pub total_earned: f64,
    pub total_possible: f64,
    pub penalty_percent: f64,
    pub final_points: f64,
    pub percentage: f64,
    pub letter_grade: LetterGrade,
    pub is_passing: bool,
}

/// Grade rows to store in place of any previous set, plus the computed totals.
#[derive(Debug, Clone, PartialEq)]
pub struct GradingResult {
    pub grades: Vec<Grade>,
    pub outcome: GradeOutcome,
}

pub(crate) fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

fn validate_inputs(inputs: &[GradeInput]) -> DomainResult<()> {
    if inputs.is_empty() {
        return Err(DomainError::InvalidPoints("at least one grade is required".to_string()));
    }

    let mut seen = HashSet::new();
    for input in inputs {
        if let Some(criterion_id) = &input.criterion_id {
            if !seen.insert(criterion_id.as_str()) {
                return Err(DomainError::DuplicateCriterionGrade(criterion_id.clone()));
            }
        }
        if !input.points_earned.is_finite() || !input.points_possible.is_finite() {
            return Err(DomainError::InvalidPoints("points must be finite".to_string()));
        }
        if input.points_possible < 0.0 {
            return Err(DomainError::InvalidPoints(format!(
                "points_possible must be non-negative, got {}",
                input.points_possible
            )));
        }
        if input.points_earned < 0.0 || input.points_earned > input.points_possible {
            return Err(DomainError::InvalidPoints(format!(
                "points_earned {} must be within [0, {}]",
                input.points_earned, input.points_possible
            )));
        }
    }
    Ok(())
}

/// Criterion references must exist in the rubric and stay within its limits.
pub fn validate_against_rubric(inputs: &[GradeInput], rubric: &Rubric) -> DomainResult<()> {
    for input in inputs {
        let Some(criterion_id) = &input.criterion_id else {
            continue;
        };
        let criterion = rubric
            .criterion(criterion_id)
            .ok_or_else(|| DomainError::UnknownCriterion(criterion_id.clone()))?;
        if input.points_possible > criterion.max_points {
            return Err(DomainError::InvalidPoints(format!(
                "criterion {} allows at most {} points",
                criterion.title, criterion.max_points
            )));
        }
    }
    Ok(())
}

/// Sums the grade rows and applies the stored late penalty exactly once.
pub fn compute_outcome(
    inputs: &[GradeInput],
    penalty_percent: f64,
    passing_score: f64,
) -> DomainResult<GradeOutcome> {
    let total_earned: f64 = inputs.iter().map(|input| input.points_earned).sum();
    let total_possible: f64 = inputs.iter().map(|input| input.points_possible).sum();

    if total_possible <= 0.0 {
        return Err(DomainError::InvalidPoints("total possible points must be positive".into()));
    }
    if total_earned < 0.0 || total_earned > total_possible {
        return Err(DomainError::InvalidPoints(format!(
            "total earned {total_earned} must be within [0, {total_possible}]"
        )));
    }

    let final_points = if penalty_percent > 0.0 {
        (total_earned - total_earned * penalty_percent / 100.0).max(0.0)
    } else {
        total_earned
    };
    let percentage = final_points * 100.0 / total_possible;

    // Only the stored figures are rounded; bands and passing use exact values.
    Ok(GradeOutcome {
        total_earned,
        total_possible,
        penalty_percent,
        final_points: round2(final_points),
        percentage: round2(percentage),
        letter_grade: LetterGrade::from_percentage(percentage),
        is_passing: final_points >= passing_score,
    })
}

/// Grades `submission` and returns the full replacement set of grade rows.
/// Grading an already graded submission replaces its previous result.
pub fn grade_submission(
    submission: &mut Submission,
    assignment: &Assignment,
    rubric: Option<&Rubric>,
    inputs: Vec<GradeInput>,
    feedback: Option<String>,
    grader_id: &str,
    now: PrimitiveDateTime,
) -> DomainResult<GradingResult> {
    if !submission.can_be_graded() {
        return Err(DomainError::CannotGradeUnsubmittedSubmission);
    }

    validate_inputs(&inputs)?;
    if let Some(rubric) = rubric {
        validate_against_rubric(&inputs, rubric)?;
    }

    let penalty = if submission.is_late { submission.penalty_applied } else { 0.0 };
    let outcome = compute_outcome(&inputs, penalty, assignment.grading.passing_score)?;

    let grades = inputs
        .into_iter()
        .map(|input| Grade {
            id: Uuid::new_v4().to_string(),
            tenant_id: submission.tenant_id.clone(),
            submission_id: submission.id.clone(),
            criterion_id: input.criterion_id,
            points_earned: input.points_earned,
            points_possible: input.points_possible,
            feedback: input.feedback,
            graded_by: grader_id.to_string(),
            created_at: now,
        })
        .collect();

    submission.apply_grade(&outcome, feedback, grader_id, now);
    Ok(GradingResult { grades, outcome })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::types::{GradeStatus, SubmissionStatus};
    use crate::test_support::{at, published_assignment, sample_rubric};

    fn points(earned: f64, possible: f64) -> GradeInput {
        GradeInput { criterion_id: None, points_earned: earned, points_possible: possible, feedback: None }
    }

    fn submitted(assignment: &Assignment, submitted_at: PrimitiveDateTime) -> Submission {
        let mut submission = Submission::start(assignment, "student-1", at(2024, 1, 2, 0));
        submission.update_content(Some("essay".to_string()), at(2024, 1, 2, 0)).expect("content");
        submission.submit(assignment, submitted_at).expect("submit");
        submission
    }

    #[test]
    fn late_penalty_is_applied_once_at_grading() {
        let assignment = published_assignment();
        let mut submission = submitted(&assignment, at(2024, 1, 12, 13));
        assert_eq!(submission.penalty_applied, 30.0);

        let result = grade_submission(
            &mut submission,
            &assignment,
            None,
            vec![points(80.0, 100.0)],
            Some("Solid work".to_string()),
            "teacher-1",
            at(2024, 1, 13, 0),
        )
        .expect("grade");

        assert_eq!(result.outcome.final_points, 56.0);
        assert_eq!(result.outcome.percentage, 56.0);
        assert_eq!(result.outcome.letter_grade, LetterGrade::CMinus);
        assert!(!result.outcome.is_passing);
        assert_eq!(submission.points_earned, Some(56.0));
        assert_eq!(submission.status, SubmissionStatus::Graded);
        assert_eq!(submission.grade_status, GradeStatus::Completed);
        assert_eq!(submission.graded_at, Some(at(2024, 1, 13, 0)));
        assert_eq!(submission.penalty_applied, 30.0);
    }

    #[test]
    fn on_time_grade_has_no_penalty() {
        let assignment = published_assignment();
        let mut submission = submitted(&assignment, at(2024, 1, 9, 0));
        let result = grade_submission(
            &mut submission,
            &assignment,
            None,
            vec![points(45.0, 50.0), points(40.0, 50.0)],
            None,
            "teacher-1",
            at(2024, 1, 13, 0),
        )
        .expect("grade");

        assert_eq!(result.outcome.total_earned, 85.0);
        assert_eq!(result.outcome.final_points, 85.0);
        assert_eq!(result.outcome.letter_grade, LetterGrade::AMinus);
        assert!(result.outcome.is_passing);
        assert_eq!(result.grades.len(), 2);
        assert!(result.grades.iter().all(|grade| grade.submission_id == submission.id));
    }

    #[test]
    fn cannot_grade_a_draft() {
        let assignment = published_assignment();
        let mut submission = Submission::start(&assignment, "student-1", at(2024, 1, 2, 0));
        let err = grade_submission(
            &mut submission,
            &assignment,
            None,
            vec![points(10.0, 10.0)],
            None,
            "teacher-1",
            at(2024, 1, 3, 0),
        )
        .unwrap_err();
        assert_eq!(err, DomainError::CannotGradeUnsubmittedSubmission);
        assert_eq!(submission.status, SubmissionStatus::InProgress);
    }

    #[test]
    fn invalid_points_are_rejected() {
        let assignment = published_assignment();
        let mut submission = submitted(&assignment, at(2024, 1, 9, 0));

        for inputs in [
            vec![points(11.0, 10.0)],
            vec![points(-1.0, 10.0)],
            vec![points(0.0, 0.0)],
            vec![],
        ] {
            let err = grade_submission(
                &mut submission,
                &assignment,
                None,
                inputs,
                None,
                "teacher-1",
                at(2024, 1, 13, 0),
            )
            .unwrap_err();
            assert!(matches!(err, DomainError::InvalidPoints(_)), "got {err:?}");
        }
        assert_eq!(submission.status, SubmissionStatus::Submitted);
    }

    #[test]
    fn regrading_replaces_previous_totals() {
        let assignment = published_assignment();
        let mut submission = submitted(&assignment, at(2024, 1, 9, 0));
        grade_submission(
            &mut submission,
            &assignment,
            None,
            vec![points(30.0, 50.0), points(20.0, 50.0)],
            None,
            "teacher-1",
            at(2024, 1, 13, 0),
        )
        .expect("first grade");

        let second = grade_submission(
            &mut submission,
            &assignment,
            None,
            vec![points(90.0, 100.0)],
            Some("Regraded".to_string()),
            "teacher-2",
            at(2024, 1, 14, 0),
        )
        .expect("second grade");

        assert_eq!(second.grades.len(), 1);
        assert_eq!(second.outcome.total_earned, 90.0);
        assert_eq!(second.outcome.total_possible, 100.0);
        assert_eq!(submission.points_earned, Some(90.0));
        assert_eq!(submission.points_possible, Some(100.0));
        assert_eq!(submission.graded_by.as_deref(), Some("teacher-2"));
    }

    #[test]
    fn rubric_limits_criterion_grades() {
        let mut assignment = published_assignment();
        let rubric = sample_rubric();
        assignment.grading.rubric_id = Some(rubric.id.clone());
        let mut submission = submitted(&assignment, at(2024, 1, 9, 0));
        let thesis = &rubric.criteria[0];

        let unknown = GradeInput { criterion_id: Some("ghost".to_string()), ..points(1.0, 1.0) };
        let err = grade_submission(
            &mut submission,
            &assignment,
            Some(&rubric),
            vec![unknown],
            None,
            "teacher-1",
            at(2024, 1, 13, 0),
        )
        .unwrap_err();
        assert_eq!(err, DomainError::UnknownCriterion("ghost".to_string()));

        let too_large = GradeInput {
            criterion_id: Some(thesis.id.clone()),
            ..points(10.0, thesis.max_points + 1.0)
        };
        let err = grade_submission(
            &mut submission,
            &assignment,
            Some(&rubric),
            vec![too_large],
            None,
            "teacher-1",
            at(2024, 1, 13, 0),
        )
        .unwrap_err();
        assert!(matches!(err, DomainError::InvalidPoints(_)));

        let duplicate = GradeInput { criterion_id: Some(thesis.id.clone()), ..points(1.0, 2.0) };
        let err = grade_submission(
            &mut submission,
            &assignment,
            Some(&rubric),
            vec![duplicate.clone(), duplicate],
            None,
            "teacher-1",
            at(2024, 1, 13, 0),
        )
        .unwrap_err();
        assert_eq!(err, DomainError::DuplicateCriterionGrade(thesis.id.clone()));
    }

    #[test]
    fn full_penalty_floors_at_zero() {
        let outcome = compute_outcome(&[points(70.0, 100.0)], 100.0, 60.0).expect("outcome");
        assert_eq!(outcome.final_points, 0.0);
        assert_eq!(outcome.percentage, 0.0);
        assert_eq!(outcome.letter_grade, LetterGrade::F);
        assert!(!outcome.is_passing);
    }

    #[test]
    fn passing_compares_final_points_with_passing_score() {
        let outcome = compute_outcome(&[points(60.0, 100.0)], 0.0, 60.0).expect("outcome");
        assert!(outcome.is_passing);
        assert_eq!(outcome.letter_grade, LetterGrade::C);
    }

    #[test]
    fn rounding_does_not_lift_a_grade_across_a_boundary() {
        let outcome = compute_outcome(&[points(85.71, 100.0)], 30.0, 60.0).expect("outcome");
        assert_eq!(outcome.final_points, 60.0);
        assert_eq!(outcome.percentage, 60.0);
        assert!(!outcome.is_passing);
        assert_eq!(outcome.letter_grade, LetterGrade::CMinus);

        let outcome = compute_outcome(&[points(54.996, 100.0)], 0.0, 55.0).expect("outcome");
        assert_eq!(outcome.percentage, 55.0);
        assert_eq!(outcome.letter_grade, LetterGrade::D);
        assert!(!outcome.is_passing);
    }
}
