use serde::{Deserialize, Serialize};
use time::PrimitiveDateTime;
use uuid::Uuid;

use crate::domain::assignment::Assignment;
use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::grading::GradeOutcome;
use crate::domain::types::{GradeStatus, LetterGrade, SubmissionStatus};

/// One student's attempt at an assignment. Resubmission cycles reuse the same
/// record and bump `submission_number`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Submission {
    pub id: String,
    pub tenant_id: String,
    pub assignment_id: String,
    pub student_id: String,
    pub content: Option<String>,
    pub file_ids: Vec<String>,
    pub status: SubmissionStatus,
    pub submission_number: u32,
    pub grade_status: GradeStatus,
    pub is_final: bool,
    pub submitted_at: Option<PrimitiveDateTime>,
    pub graded_at: Option<PrimitiveDateTime>,
    pub returned_at: Option<PrimitiveDateTime>,
    pub points_earned: Option<f64>,
    pub points_possible: Option<f64>,
    pub percentage: Option<f64>,
    pub letter_grade: Option<LetterGrade>,
    pub is_passing: Option<bool>,
    pub is_late: bool,
    pub days_late: u32,
    /// Late penalty in percent, computed at submit time and applied at grading.
    pub penalty_applied: f64,
    pub feedback: Option<String>,
    pub graded_by: Option<String>,
    pub plagiarism_score: Option<f64>,
    pub created_at: PrimitiveDateTime,
    pub updated_at: PrimitiveDateTime,
}

impl Submission {
    /// Draft created on the student's first interaction with an assignment.
    pub fn start(assignment: &Assignment, student_id: &str, now: PrimitiveDateTime) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            tenant_id: assignment.tenant_id.clone(),
            assignment_id: assignment.id.clone(),
            student_id: student_id.to_string(),
            content: None,
            file_ids: Vec::new(),
            status: SubmissionStatus::InProgress,
            submission_number: 1,
            grade_status: GradeStatus::NotGraded,
            is_final: false,
            submitted_at: None,
            graded_at: None,
            returned_at: None,
            points_earned: None,
            points_possible: None,
            percentage: None,
            letter_grade: None,
            is_passing: None,
            is_late: false,
            days_late: 0,
            penalty_applied: 0.0,
            feedback: None,
            graded_by: None,
            plagiarism_score: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn has_content(&self) -> bool {
        let has_text = self.content.as_deref().is_some_and(|text| !text.trim().is_empty());
        has_text || !self.file_ids.is_empty()
    }

    pub fn is_graded(&self) -> bool {
        self.percentage.is_some()
    }

    /// Whether the record has been counted in the assignment's submission total.
    pub fn was_handed_in(&self) -> bool {
        self.submitted_at.is_some() || self.submission_number > 1
    }

    pub fn update_content(
        &mut self,
        content: Option<String>,
        now: PrimitiveDateTime,
    ) -> DomainResult<()> {
        self.ensure_editable()?;
        self.content = content;
        self.updated_at = now;
        Ok(())
    }

    pub fn add_file(
        &mut self,
        file_id: &str,
        assignment: &Assignment,
        now: PrimitiveDateTime,
    ) -> DomainResult<()> {
        self.ensure_editable()?;

        let max = assignment.submission.max_files;
        if self.file_ids.len() >= max as usize {
            return Err(DomainError::MaxFilesExceeded { max });
        }
        if self.file_ids.iter().any(|existing| existing == file_id) {
            return Err(DomainError::DuplicateFile(file_id.to_string()));
        }

        self.file_ids.push(file_id.to_string());
        self.updated_at = now;
        Ok(())
    }

    pub fn remove_file(&mut self, file_id: &str, now: PrimitiveDateTime) -> DomainResult<()> {
        self.ensure_editable()?;

        let position = self
            .file_ids
            .iter()
            .position(|existing| existing == file_id)
            .ok_or_else(|| DomainError::FileNotAttached(file_id.to_string()))?;
        self.file_ids.remove(position);
        self.updated_at = now;
        Ok(())
    }

    /// Hands the work in. Whether a late submission is acceptable at all is
    /// decided by the caller before reaching this point.
    pub fn submit(&mut self, assignment: &Assignment, now: PrimitiveDateTime) -> DomainResult<()> {
        match self.status {
            SubmissionStatus::InProgress => {}
            SubmissionStatus::Submitted
            | SubmissionStatus::LateSubmission
            | SubmissionStatus::UnderReview
            | SubmissionStatus::Graded => return Err(DomainError::AlreadySubmitted),
            SubmissionStatus::Returned => {
                return Err(DomainError::InvalidStatusTransition {
                    action: "submit",
                    status: self.status,
                })
            }
        }

        if !self.has_content() {
            return Err(DomainError::SubmissionEmpty);
        }

        let days_late = assignment.days_late(now);
        let penalty = assignment.calculate_late_penalty(now);

        self.is_final = true;
        self.submitted_at = Some(now);
        self.is_late = days_late > 0;
        self.days_late = days_late;
        if penalty.is_none() {
            self.status = SubmissionStatus::Submitted;
            self.penalty_applied = 0.0;
        } else {
            self.status = SubmissionStatus::LateSubmission;
            self.penalty_applied = penalty.percent;
        }
        self.updated_at = now;
        Ok(())
    }

    pub fn start_grading(&mut self, now: PrimitiveDateTime) -> DomainResult<()> {
        if !self.status.is_awaiting_grading() {
            return Err(DomainError::InvalidStatusTransition {
                action: "start grading",
                status: self.status,
            });
        }

        self.status = SubmissionStatus::UnderReview;
        self.grade_status = GradeStatus::InProgress;
        self.updated_at = now;
        Ok(())
    }

    pub fn can_be_graded(&self) -> bool {
        matches!(
            self.status,
            SubmissionStatus::Submitted
                | SubmissionStatus::LateSubmission
                | SubmissionStatus::UnderReview
                | SubmissionStatus::Graded
        )
    }

    pub(crate) fn apply_grade(
        &mut self,
        outcome: &GradeOutcome,
        feedback: Option<String>,
        grader_id: &str,
        now: PrimitiveDateTime,
    ) {
        self.points_earned = Some(outcome.final_points);
        self.points_possible = Some(outcome.total_possible);
        self.percentage = Some(outcome.percentage);
        self.letter_grade = Some(outcome.letter_grade);
        self.is_passing = Some(outcome.is_passing);
        self.feedback = feedback;
        self.graded_by = Some(grader_id.to_string());
        self.status = SubmissionStatus::Graded;
        self.grade_status = GradeStatus::Completed;
        self.graded_at = Some(now);
        self.updated_at = now;
    }

    pub fn return_to_student(
        &mut self,
        feedback: Option<String>,
        now: PrimitiveDateTime,
    ) -> DomainResult<()> {
        if !matches!(self.status, SubmissionStatus::UnderReview | SubmissionStatus::Graded) {
            return Err(DomainError::InvalidStatusTransition {
                action: "return",
                status: self.status,
            });
        }

        if feedback.is_some() {
            self.feedback = feedback;
        }
        self.status = SubmissionStatus::Returned;
        self.is_final = false;
        self.grade_status = GradeStatus::NeedsRevision;
        self.returned_at = Some(now);
        self.updated_at = now;
        Ok(())
    }

    /// Reopens returned work for another cycle. Grade and late fields from the
    /// previous cycle are cleared so no penalty carries over.
    pub fn resubmit(
        &mut self,
        content: Option<String>,
        assignment: &Assignment,
        now: PrimitiveDateTime,
    ) -> DomainResult<()> {
        if self.status != SubmissionStatus::Returned {
            return Err(DomainError::InvalidStatusTransition {
                action: "resubmit",
                status: self.status,
            });
        }
        if !assignment.submission.allow_multiple_submissions {
            return Err(DomainError::MultipleSubmissionsNotAllowed);
        }

        if content.is_some() {
            self.content = content;
        }
        self.submission_number += 1;
        self.status = SubmissionStatus::InProgress;
        self.grade_status = GradeStatus::NotGraded;
        self.is_final = false;
        self.submitted_at = None;
        self.graded_at = None;
        self.clear_grade();
        self.is_late = false;
        self.days_late = 0;
        self.penalty_applied = 0.0;
        self.updated_at = now;
        Ok(())
    }

    pub fn record_plagiarism_score(
        &mut self,
        score: f64,
        now: PrimitiveDateTime,
    ) -> DomainResult<()> {
        if !score.is_finite() || !(0.0..=100.0).contains(&score) {
            return Err(DomainError::InvalidPlagiarismScore(score));
        }
        self.plagiarism_score = Some(score);
        self.updated_at = now;
        Ok(())
    }

    fn ensure_editable(&self) -> DomainResult<()> {
        if self.status.is_editable() {
            Ok(())
        } else {
            Err(DomainError::CannotModifySubmittedSubmission)
        }
    }

    fn clear_grade(&mut self) {
        self.points_earned = None;
        self.points_possible = None;
        self.percentage = None;
        self.letter_grade = None;
        self.is_passing = None;
        self.feedback = None;
        self.graded_by = None;
    }
}

pub fn check_content_length(content: Option<&str>, max: usize) -> DomainResult<()> {
    match content {
        Some(text) if text.chars().count() > max => Err(DomainError::ContentTooLong { max }),
        _ => Ok(()),
    }
}
