use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::{Storage, StorageError};
use crate::domain::assignment::Assignment;
use crate::domain::grading::Grade;
use crate::domain::peer_review::PeerReview;
use crate::domain::rubric::Rubric;
use crate::domain::submission::Submission;

type Key = (String, String);

fn key(tenant_id: &str, id: &str) -> Key {
    (tenant_id.to_string(), id.to_string())
}

/// Process-local [`Storage`], suitable for embedding and tests.
#[derive(Debug, Default)]
pub struct InMemoryStorage {
    assignments: RwLock<HashMap<Key, Assignment>>,
    submissions: RwLock<HashMap<Key, Submission>>,
    rubrics: RwLock<HashMap<Key, Rubric>>,
    grades: RwLock<HashMap<Key, Vec<Grade>>>,
    peer_reviews: RwLock<HashMap<Key, PeerReview>>,
}

impl InMemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Storage for InMemoryStorage {
    async fn get_assignment(
        &self,
        tenant_id: &str,
        assignment_id: &str,
    ) -> Result<Option<Assignment>, StorageError> {
        Ok(self.assignments.read().await.get(&key(tenant_id, assignment_id)).cloned())
    }

    async fn save_assignment(&self, assignment: &Assignment) -> Result<(), StorageError> {
        self.assignments
            .write()
            .await
            .insert(key(&assignment.tenant_id, &assignment.id), assignment.clone());
        Ok(())
    }

    async fn list_assignments_by_course(
        &self,
        tenant_id: &str,
        course_id: &str,
    ) -> Result<Vec<Assignment>, StorageError> {
        let mut items: Vec<Assignment> = self
            .assignments
            .read()
            .await
            .values()
            .filter(|item| item.tenant_id == tenant_id && item.course_id == course_id)
            .cloned()
            .collect();
        items.sort_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.id.cmp(&b.id)));
        Ok(items)
    }

    async fn get_submission(
        &self,
        tenant_id: &str,
        submission_id: &str,
    ) -> Result<Option<Submission>, StorageError> {
        Ok(self.submissions.read().await.get(&key(tenant_id, submission_id)).cloned())
    }

    async fn find_submission(
        &self,
        tenant_id: &str,
        assignment_id: &str,
        student_id: &str,
    ) -> Result<Option<Submission>, StorageError> {
        Ok(self
            .submissions
            .read()
            .await
            .values()
            .find(|item| {
                item.tenant_id == tenant_id
                    && item.assignment_id == assignment_id
                    && item.student_id == student_id
            })
            .cloned())
    }

    async fn save_submission(&self, submission: &Submission) -> Result<(), StorageError> {
        let mut submissions = self.submissions.write().await;
        let clash = submissions.values().any(|item| {
            item.id != submission.id
                && item.tenant_id == submission.tenant_id
                && item.assignment_id == submission.assignment_id
                && item.student_id == submission.student_id
        });
        if clash {
            return Err(StorageError::Conflict { entity: "submission", id: submission.id.clone() });
        }
        submissions.insert(key(&submission.tenant_id, &submission.id), submission.clone());
        Ok(())
    }

    async fn delete_submission(
        &self,
        tenant_id: &str,
        submission_id: &str,
    ) -> Result<bool, StorageError> {
        let removed = self.submissions.write().await.remove(&key(tenant_id, submission_id));
        self.grades.write().await.remove(&key(tenant_id, submission_id));
        self.peer_reviews.write().await.retain(|_, review| {
            review.tenant_id != tenant_id || review.submission_id != submission_id
        });
        Ok(removed.is_some())
    }

    async fn list_submissions_by_assignment(
        &self,
        tenant_id: &str,
        assignment_id: &str,
    ) -> Result<Vec<Submission>, StorageError> {
        let mut items: Vec<Submission> = self
            .submissions
            .read()
            .await
            .values()
            .filter(|item| item.tenant_id == tenant_id && item.assignment_id == assignment_id)
            .cloned()
            .collect();
        items.sort_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.id.cmp(&b.id)));
        Ok(items)
    }

    async fn list_submissions_by_student(
        &self,
        tenant_id: &str,
        student_id: &str,
    ) -> Result<Vec<Submission>, StorageError> {
        let mut items: Vec<Submission> = self
            .submissions
            .read()
            .await
            .values()
            .filter(|item| item.tenant_id == tenant_id && item.student_id == student_id)
            .cloned()
            .collect();
        items.sort_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.id.cmp(&b.id)));
        Ok(items)
    }

    async fn get_rubric(
        &self,
        tenant_id: &str,
        rubric_id: &str,
    ) -> Result<Option<Rubric>, StorageError> {
        Ok(self.rubrics.read().await.get(&key(tenant_id, rubric_id)).cloned())
    }

    async fn save_rubric(&self, rubric: &Rubric) -> Result<(), StorageError> {
        self.rubrics.write().await.insert(key(&rubric.tenant_id, &rubric.id), rubric.clone());
        Ok(())
    }

    async fn replace_grades(
        &self,
        tenant_id: &str,
        submission_id: &str,
        grades: Vec<Grade>,
    ) -> Result<(), StorageError> {
        self.grades.write().await.insert(key(tenant_id, submission_id), grades);
        Ok(())
    }

    async fn list_grades(
        &self,
        tenant_id: &str,
        submission_id: &str,
    ) -> Result<Vec<Grade>, StorageError> {
        Ok(self.grades.read().await.get(&key(tenant_id, submission_id)).cloned().unwrap_or_default())
    }

    async fn get_peer_review(
        &self,
        tenant_id: &str,
        review_id: &str,
    ) -> Result<Option<PeerReview>, StorageError> {
        Ok(self.peer_reviews.read().await.get(&key(tenant_id, review_id)).cloned())
    }

    async fn save_peer_review(&self, review: &PeerReview) -> Result<(), StorageError> {
        self.peer_reviews.write().await.insert(key(&review.tenant_id, &review.id), review.clone());
        Ok(())
    }

    async fn list_peer_reviews_by_submission(
        &self,
        tenant_id: &str,
        submission_id: &str,
    ) -> Result<Vec<PeerReview>, StorageError> {
        let mut items: Vec<PeerReview> = self
            .peer_reviews
            .read()
            .await
            .values()
            .filter(|item| item.tenant_id == tenant_id && item.submission_id == submission_id)
            .cloned()
            .collect();
        items.sort_by(|a, b| a.assigned_at.cmp(&b.assigned_at).then_with(|| a.id.cmp(&b.id)));
        Ok(items)
    }

    async fn list_peer_reviews_by_reviewer(
        &self,
        tenant_id: &str,
        assignment_id: &str,
        reviewer_id: &str,
    ) -> Result<Vec<PeerReview>, StorageError> {
        let mut items: Vec<PeerReview> = self
            .peer_reviews
            .read()
            .await
            .values()
            .filter(|item| {
                item.tenant_id == tenant_id
                    && item.assignment_id == assignment_id
                    && item.reviewer_id == reviewer_id
            })
            .cloned()
            .collect();
        items.sort_by(|a, b| a.assigned_at.cmp(&b.assigned_at).then_with(|| a.id.cmp(&b.id)));
        Ok(items)
    }
}
