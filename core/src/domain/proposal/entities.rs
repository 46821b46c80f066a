use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::domain::{catalog::entities::Food, common::generate_timestamp};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ProposalKind {
    Edit,
    Deletion,
}

/// Every mutable field of a [`Food`], as proposed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct FoodSnapshot {
    pub restaurant_id: Uuid,
    pub name: String,
    pub macro_table: BTreeMap<String, f64>,
    pub serving_size: i32,
    pub is_organic: bool,
    pub is_gluten_free: bool,
    pub is_alcohol_free: bool,
    pub is_lactose_free: bool,
    pub image: Option<String>,
    pub ingredient_ids: Vec<Uuid>,
}

impl From<&Food> for FoodSnapshot {
    fn from(food: &Food) -> Self {
        Self {
            restaurant_id: food.restaurant_id,
            name: food.name.clone(),
            macro_table: food.macro_table.clone(),
            serving_size: food.serving_size,
            is_organic: food.is_organic,
            is_gluten_free: food.is_gluten_free,
            is_alcohol_free: food.is_alcohol_free,
            is_lactose_free: food.is_lactose_free,
            image: food.image.clone(),
            ingredient_ids: food.ingredient_ids.clone(),
        }
    }
}

impl FoodSnapshot {
    /// Overwrites the food's mutable fields. An empty proposed image keeps the
    /// current one. The derived hazard level is left for the aggregator.
    pub fn apply_to(&self, food: &mut Food) {
        food.restaurant_id = self.restaurant_id;
        food.name = self.name.clone();
        food.macro_table = self.macro_table.clone();
        food.serving_size = self.serving_size;
        food.is_organic = self.is_organic;
        food.is_gluten_free = self.is_gluten_free;
        food.is_alcohol_free = self.is_alcohol_free;
        food.is_lactose_free = self.is_lactose_free;
        if let Some(image) = &self.image {
            food.image = Some(image.clone());
        }
        food.ingredient_ids = self.ingredient_ids.clone();
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(tag = "kind", content = "snapshot", rename_all = "snake_case")]
pub enum ProposalChange {
    Edit(FoodSnapshot),
    Deletion(FoodSnapshot),
}

impl ProposalChange {
    pub fn kind(&self) -> ProposalKind {
        match self {
            ProposalChange::Edit(_) => ProposalKind::Edit,
            ProposalChange::Deletion(_) => ProposalKind::Deletion,
        }
    }

    pub fn is_deletion(&self) -> bool {
        matches!(self, ProposalChange::Deletion(_))
    }

    pub fn snapshot(&self) -> &FoodSnapshot {
        match self {
            ProposalChange::Edit(snapshot) | ProposalChange::Deletion(snapshot) => snapshot,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ProposalStatus {
    Pending,
    Applied,
    ApplyFailed,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ChangeProposal {
    pub id: Uuid,
    /// Targeted food; cleared by the store when the food is deleted.
    pub old_version: Option<Uuid>,
    pub change: ProposalChange,
    pub new_hazard_level: f64,
    pub approved_supervisors: Vec<Uuid>,
    pub new_is_approved: bool,
    pub reason: Option<String>,
    pub date: DateTime<Utc>,
    pub updated_by: Option<Uuid>,
    pub updated_date: DateTime<Utc>,
    pub applied_at: Option<DateTime<Utc>>,
    pub apply_error: Option<String>,
}

impl ChangeProposal {
    pub fn new(
        food_id: Uuid,
        change: ProposalChange,
        new_hazard_level: f64,
        reason: Option<String>,
        submitted_by: Uuid,
    ) -> Self {
        let (now, timestamp) = generate_timestamp();

        Self {
            id: Uuid::new_v7(timestamp),
            old_version: Some(food_id),
            change,
            new_hazard_level,
            approved_supervisors: Vec::new(),
            new_is_approved: false,
            reason,
            date: now,
            updated_by: Some(submitted_by),
            updated_date: now,
            applied_at: None,
            apply_error: None,
        }
    }

    pub fn kind(&self) -> ProposalKind {
        self.change.kind()
    }

    pub fn is_deletion(&self) -> bool {
        self.change.is_deletion()
    }

    pub fn vote_count(&self) -> usize {
        self.approved_supervisors.len()
    }

    pub fn status(&self) -> ProposalStatus {
        match (self.new_is_approved, &self.apply_error) {
            (false, _) => ProposalStatus::Pending,
            (true, None) => ProposalStatus::Applied,
            (true, Some(_)) => ProposalStatus::ApplyFailed,
        }
    }

    pub fn mark_approved(&mut self, approved_by: Uuid) {
        let (now, _) = generate_timestamp();
        self.new_is_approved = true;
        self.updated_by = Some(approved_by);
        self.updated_date = now;
    }

    pub fn mark_applied(&mut self) {
        let (now, _) = generate_timestamp();
        self.applied_at = Some(now);
        self.apply_error = None;
    }

    pub fn mark_apply_failed(&mut self, reason: impl Into<String>) {
        self.applied_at = None;
        self.apply_error = Some(reason.into());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::catalog::entities::{DEFAULT_SERVING_SIZE, FoodConfig};

    fn food() -> Food {
        Food::new(FoodConfig {
            restaurant_id: Uuid::new_v4(),
            name: "ramen".to_string(),
            macro_table: BTreeMap::from([("protein".to_string(), 12.5)]),
            serving_size: DEFAULT_SERVING_SIZE,
            is_organic: false,
            is_gluten_free: false,
            is_alcohol_free: true,
            is_lactose_free: true,
            image: Some("https://img.example/ramen.png".to_string()),
            ingredient_ids: vec![Uuid::new_v4()],
            created_by: None,
        })
    }

    #[test]
    fn snapshot_round_trips_food_fields() {
        let original = food();
        let mut target = food();

        FoodSnapshot::from(&original).apply_to(&mut target);

        assert_eq!(target.name, original.name);
        assert_eq!(target.restaurant_id, original.restaurant_id);
        assert_eq!(target.macro_table, original.macro_table);
        assert_eq!(target.ingredient_ids, original.ingredient_ids);
        assert_eq!(target.image, original.image);
    }

    #[test]
    fn missing_image_keeps_current_one() {
        let mut target = food();
        let mut snapshot = FoodSnapshot::from(&target);
        snapshot.image = None;
        snapshot.name = "shoyu ramen".to_string();

        snapshot.apply_to(&mut target);

        assert_eq!(target.name, "shoyu ramen");
        assert_eq!(target.image.as_deref(), Some("https://img.example/ramen.png"));
    }

    #[test]
    fn status_follows_approval_and_outcome() {
        let food = food();
        let mut proposal = ChangeProposal::new(
            food.id,
            ProposalChange::Deletion(FoodSnapshot::from(&food)),
            food.hazard_level,
            Some("recalled".to_string()),
            Uuid::new_v4(),
        );
        assert_eq!(proposal.status(), ProposalStatus::Pending);
        assert!(proposal.is_deletion());

        proposal.mark_approved(Uuid::new_v4());
        proposal.mark_applied();
        assert_eq!(proposal.status(), ProposalStatus::Applied);

        proposal.mark_apply_failed("target gone");
        assert_eq!(proposal.status(), ProposalStatus::ApplyFailed);
    }
}
