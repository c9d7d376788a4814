use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use time::PrimitiveDateTime;
use uuid::Uuid;

use crate::domain::assignment::Assignment;
use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::grading::round2;
use crate::domain::submission::Submission;
use crate::domain::types::SubmissionStatus;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PeerReview {
    pub id: String,
    pub tenant_id: String,
    pub assignment_id: String,
    pub submission_id: String,
    pub reviewer_id: String,
    pub feedback: Option<String>,
    /// Criterion label to score.
    pub scores: BTreeMap<String, f64>,
    pub overall_score: Option<f64>,
    pub is_completed: bool,
    pub assigned_at: PrimitiveDateTime,
    pub submitted_at: Option<PrimitiveDateTime>,
    pub updated_at: PrimitiveDateTime,
}

impl PeerReview {
    /// `existing` holds the reviews already assigned for `submission`.
    pub fn assign(
        assignment: &Assignment,
        submission: &Submission,
        reviewer_id: &str,
        existing: &[PeerReview],
        now: PrimitiveDateTime,
    ) -> DomainResult<Self> {
        if !assignment.peer_review.enabled {
            return Err(DomainError::PeerReviewsNotEnabled);
        }
        if submission.student_id == reviewer_id {
            return Err(DomainError::CannotReviewOwnSubmission);
        }
        if existing
            .iter()
            .any(|review| review.submission_id == submission.id && review.reviewer_id == reviewer_id)
        {
            return Err(DomainError::PeerReviewAlreadyAssigned);
        }
        if matches!(submission.status, SubmissionStatus::InProgress) || submission.submitted_at.is_none()
        {
            return Err(DomainError::CannotReviewUnsubmittedSubmission);
        }

        Ok(Self {
            id: Uuid::new_v4().to_string(),
            tenant_id: submission.tenant_id.clone(),
            assignment_id: assignment.id.clone(),
            submission_id: submission.id.clone(),
            reviewer_id: reviewer_id.to_string(),
            feedback: None,
            scores: BTreeMap::new(),
            overall_score: None,
            is_completed: false,
            assigned_at: now,
            submitted_at: None,
            updated_at: now,
        })
    }

    /// Saves a draft of the review. Partial score sets are allowed here.
    pub fn update(
        &mut self,
        feedback: Option<String>,
        scores: BTreeMap<String, f64>,
        now: PrimitiveDateTime,
    ) -> DomainResult<()> {
        if self.is_completed {
            return Err(DomainError::CannotUpdateCompletedReview);
        }
        if scores.values().any(|score| !is_valid_score(*score)) {
            return Err(DomainError::InvalidPeerReviewScores);
        }

        self.feedback = feedback;
        self.scores = scores;
        self.updated_at = now;
        Ok(())
    }

    /// Completes the review. Irrevocable.
    pub fn submit(
        &mut self,
        feedback: Option<String>,
        scores: BTreeMap<String, f64>,
        now: PrimitiveDateTime,
    ) -> DomainResult<()> {
        if self.is_completed {
            return Err(DomainError::AlreadySubmitted);
        }
        if scores.is_empty() || scores.values().any(|score| !is_valid_score(*score)) {
            return Err(DomainError::InvalidPeerReviewScores);
        }

        let overall = scores.values().sum::<f64>() / scores.len() as f64;
        self.feedback = feedback;
        self.scores = scores;
        self.overall_score = Some(overall);
        self.is_completed = true;
        self.submitted_at = Some(now);
        self.updated_at = now;
        Ok(())
    }

    /// View handed to the submission's author; the reviewer stays hidden for
    /// anonymous assignments.
    pub fn for_author(&self, anonymous: bool) -> PeerReviewFeedback {
        PeerReviewFeedback {
            review_id: self.id.clone(),
            reviewer_id: if anonymous { None } else { Some(self.reviewer_id.clone()) },
            feedback: self.feedback.clone(),
            scores: self.scores.clone(),
            overall_score: self.overall_score,
            submitted_at: self.submitted_at,
        }
    }
}

fn is_valid_score(score: f64) -> bool {
    score.is_finite() && score >= 0.0
}

pub fn check_reviewer_capacity(open_reviews: usize, max: u32) -> DomainResult<()> {
    if open_reviews >= max as usize {
        return Err(DomainError::ReviewerAtCapacity { max });
    }
    Ok(())
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PeerReviewFeedback {
    pub review_id: String,
    pub reviewer_id: Option<String>,
    pub feedback: Option<String>,
    pub scores: BTreeMap<String, f64>,
    pub overall_score: Option<f64>,
    pub submitted_at: Option<PrimitiveDateTime>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PeerReviewSummary {
    pub submission_id: String,
    pub assigned_reviews: usize,
    pub completed_reviews: usize,
    pub required_reviews: u32,
    pub average_score: Option<f64>,
    pub is_satisfied: bool,
}

/// Aggregates the completed reviews of one submission.
pub fn summarize(
    submission_id: &str,
    reviews: &[PeerReview],
    required_reviews: u32,
) -> PeerReviewSummary {
    let relevant: Vec<&PeerReview> =
        reviews.iter().filter(|review| review.submission_id == submission_id).collect();
    let completed: Vec<f64> = relevant
        .iter()
        .filter(|review| review.is_completed)
        .filter_map(|review| review.overall_score)
        .collect();

    let average_score = if completed.is_empty() {
        None
    } else {
        Some(round2(completed.iter().sum::<f64>() / completed.len() as f64))
    };

    PeerReviewSummary {
        submission_id: submission_id.to_string(),
        assigned_reviews: relevant.len(),
        completed_reviews: completed.len(),
        required_reviews,
        average_score,
        is_satisfied: completed.len() >= required_reviews as usize,
    }
}
