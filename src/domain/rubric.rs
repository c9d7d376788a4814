use std::collections::{BTreeMap, HashSet};

use serde::{Deserialize, Serialize};
use time::PrimitiveDateTime;
use uuid::Uuid;

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::grading::GradeInput;

pub const WEIGHT_TOLERANCE: f64 = 0.01;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Level {
    pub id: String,
    pub title: String,
    pub description: Option<String>,
    pub points: f64,
}

impl Level {
    pub fn new(title: &str, points: f64) -> Self {
        Self { id: Uuid::new_v4().to_string(), title: title.to_string(), description: None, points }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Criterion {
    pub id: String,
    pub title: String,
    pub description: Option<String>,
    pub max_points: f64,
    pub weight: f64,
    /// Position within the rubric, reassigned on every validation.
    pub order: u32,
    pub levels: Vec<Level>,
}

impl Criterion {
    pub fn new(title: &str, max_points: f64, weight: f64, levels: Vec<Level>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            title: title.to_string(),
            description: None,
            max_points,
            weight,
            order: 0,
            levels,
        }
    }

    fn validate(&self) -> DomainResult<()> {
        if !self.weight.is_finite() || !(0.0..=1.0).contains(&self.weight) {
            return Err(DomainError::InvalidCriterionWeight {
                criterion: self.title.clone(),
                weight: self.weight,
            });
        }
        if !self.max_points.is_finite() || self.max_points <= 0.0 {
            return Err(DomainError::InvalidCriterionMaxPoints(self.title.clone()));
        }
        if self.levels.is_empty() {
            return Err(DomainError::EmptyCriterionLevels(self.title.clone()));
        }
        for level in &self.levels {
            if !level.points.is_finite() || level.points < 0.0 || level.points > self.max_points {
                return Err(DomainError::InvalidLevelPoints {
                    criterion: self.title.clone(),
                    points: level.points,
                    max_points: self.max_points,
                });
            }
        }
        Ok(())
    }

    pub fn level(&self, level_id: &str) -> Option<&Level> {
        self.levels.iter().find(|level| level.id == level_id)
    }
}

/// Weighted scoring template. `total_points` is derived from the criteria and
/// kept current by every criteria mutation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rubric {
    pub id: String,
    pub tenant_id: String,
    pub title: String,
    pub description: Option<String>,
    pub criteria: Vec<Criterion>,
    pub total_points: f64,
    pub created_by: String,
    pub created_at: PrimitiveDateTime,
    pub updated_at: PrimitiveDateTime,
}

impl Rubric {
    pub fn new(
        tenant_id: &str,
        title: &str,
        description: Option<String>,
        criteria: Vec<Criterion>,
        created_by: &str,
        now: PrimitiveDateTime,
    ) -> DomainResult<Self> {
        let mut rubric = Self {
            id: Uuid::new_v4().to_string(),
            tenant_id: tenant_id.to_string(),
            title: title.trim().to_string(),
            description,
            criteria,
            total_points: 0.0,
            created_by: created_by.to_string(),
            created_at: now,
            updated_at: now,
        };
        rubric.recalculate_total_points();
        rubric.validate()?;
        Ok(rubric)
    }

    pub fn validate(&mut self) -> DomainResult<()> {
        for (index, criterion) in self.criteria.iter_mut().enumerate() {
            criterion.order = index as u32 + 1;
        }

        let mut seen = HashSet::new();
        for criterion in &self.criteria {
            if !seen.insert(criterion.id.as_str()) {
                return Err(DomainError::DuplicateCriterion(criterion.id.clone()));
            }
            criterion.validate()?;
        }

        let total_weight: f64 = self.criteria.iter().map(|criterion| criterion.weight).sum();
        if (total_weight - 1.0).abs() > WEIGHT_TOLERANCE {
            return Err(DomainError::InvalidTotalWeight(total_weight));
        }

        Ok(())
    }

    pub fn recalculate_total_points(&mut self) {
        self.total_points = self
            .criteria
            .iter()
            .map(|criterion| criterion.max_points * criterion.weight)
            .sum();
    }

    pub fn add_criterion(
        &mut self,
        criterion: Criterion,
        now: PrimitiveDateTime,
    ) -> DomainResult<()> {
        if self.criterion(&criterion.id).is_some() {
            return Err(DomainError::DuplicateCriterion(criterion.id));
        }
        self.criteria.push(criterion);
        self.recalculate_total_points();
        self.updated_at = now;
        Ok(())
    }

    pub fn remove_criterion(
        &mut self,
        criterion_id: &str,
        now: PrimitiveDateTime,
    ) -> DomainResult<Criterion> {
        let position = self
            .criteria
            .iter()
            .position(|criterion| criterion.id == criterion_id)
            .ok_or_else(|| DomainError::CriterionNotFound(criterion_id.to_string()))?;
        let removed = self.criteria.remove(position);
        self.recalculate_total_points();
        self.updated_at = now;
        Ok(removed)
    }

    pub fn criterion(&self, criterion_id: &str) -> Option<&Criterion> {
        self.criteria.iter().find(|criterion| criterion.id == criterion_id)
    }

    /// Overrides the weight of the named criteria. Unknown ids leave the rubric
    /// untouched.
    pub fn set_weights(
        &mut self,
        weights: &BTreeMap<String, f64>,
        now: PrimitiveDateTime,
    ) -> DomainResult<()> {
        if let Some(unknown) = weights.keys().find(|id| self.criterion(id).is_none()) {
            return Err(DomainError::CriterionNotFound(unknown.clone()));
        }
        if weights.is_empty() {
            return Ok(());
        }

        for criterion in &mut self.criteria {
            if let Some(weight) = weights.get(&criterion.id) {
                criterion.weight = *weight;
            }
        }
        self.recalculate_total_points();
        self.updated_at = now;
        Ok(())
    }

    /// Turns one selected performance level per criterion into grade inputs,
    /// in rubric order.
    pub fn grades_from_levels(
        &self,
        selections: &BTreeMap<String, String>,
    ) -> DomainResult<Vec<GradeInput>> {
        if let Some(unknown) = selections.keys().find(|id| self.criterion(id).is_none()) {
            return Err(DomainError::UnknownCriterion(unknown.clone()));
        }

        let mut grades = Vec::with_capacity(selections.len());
        for criterion in &self.criteria {
            let Some(level_id) = selections.get(&criterion.id) else {
                continue;
            };
            let level = criterion.level(level_id).ok_or_else(|| DomainError::LevelNotFound {
                criterion: criterion.id.clone(),
                level: level_id.clone(),
            })?;
            grades.push(GradeInput {
                criterion_id: Some(criterion.id.clone()),
                points_earned: level.points,
                points_possible: criterion.max_points,
                feedback: level.description.clone(),
            });
        }
        Ok(grades)
    }
}
