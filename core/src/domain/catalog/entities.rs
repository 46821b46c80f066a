use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::domain::common::{entities::app_errors::CoreError, generate_timestamp};

/// Highest ordinal hazard tier an ingredient can carry.
pub const MAX_INGREDIENT_HAZARD: i16 = 4;

pub const DEFAULT_SERVING_SIZE: i32 = 100;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub is_supervisor: bool,
    pub is_staff: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Ingredient {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub hazard_level: i16,
}

impl Ingredient {
    pub fn new(
        name: String,
        description: Option<String>,
        hazard_level: i16,
    ) -> Result<Self, CoreError> {
        if !(0..=MAX_INGREDIENT_HAZARD).contains(&hazard_level) {
            return Err(CoreError::Invalid(format!(
                "hazard level must be between 0 and {MAX_INGREDIENT_HAZARD}"
            )));
        }

        let (_, timestamp) = generate_timestamp();

        Ok(Self {
            id: Uuid::new_v7(timestamp),
            name,
            description,
            hazard_level,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Restaurant {
    pub id: Uuid,
    pub name: String,
    pub cuisine: Option<String>,
    pub description: Option<String>,
    pub image: Option<String>,
    pub hazard_level: f64,
}

impl Restaurant {
    pub fn new(
        name: String,
        cuisine: Option<String>,
        description: Option<String>,
        image: Option<String>,
    ) -> Self {
        let (_, timestamp) = generate_timestamp();

        Self {
            id: Uuid::new_v7(timestamp),
            name,
            cuisine,
            description,
            image,
            hazard_level: 0.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Food {
    pub id: Uuid,
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
    pub hazard_level: f64,
    pub is_approved: bool,
    pub approved_supervisors: Vec<Uuid>,
    pub created_by: Option<Uuid>,
    pub created_date: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct FoodConfig {
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
    pub created_by: Option<Uuid>,
}

impl Food {
    /// New foods start unpublished; hazard level is filled in by the aggregator.
    pub fn new(config: FoodConfig) -> Self {
        let (now, timestamp) = generate_timestamp();

        Self {
            id: Uuid::new_v7(timestamp),
            restaurant_id: config.restaurant_id,
            name: config.name,
            macro_table: config.macro_table,
            serving_size: config.serving_size,
            is_organic: config.is_organic,
            is_gluten_free: config.is_gluten_free,
            is_alcohol_free: config.is_alcohol_free,
            is_lactose_free: config.is_lactose_free,
            image: config.image,
            ingredient_ids: dedup_ids(config.ingredient_ids),
            hazard_level: 0.0,
            is_approved: false,
            approved_supervisors: Vec::new(),
            created_by: config.created_by,
            created_date: now,
        }
    }
}

/// Order-preserving dedup, used wherever an id list stands for a set.
pub fn dedup_ids(ids: Vec<Uuid>) -> Vec<Uuid> {
    let mut seen = std::collections::HashSet::with_capacity(ids.len());
    ids.into_iter().filter(|id| seen.insert(*id)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ingredient_rejects_out_of_range_hazard() {
        assert!(Ingredient::new("salt".to_string(), None, 5).is_err());
        assert!(Ingredient::new("salt".to_string(), None, -1).is_err());
        assert!(Ingredient::new("salt".to_string(), None, 4).is_ok());
    }

    #[test]
    fn food_ingredients_are_deduplicated() {
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        let food = Food::new(FoodConfig {
            restaurant_id: Uuid::new_v4(),
            name: "soup".to_string(),
            macro_table: BTreeMap::new(),
            serving_size: DEFAULT_SERVING_SIZE,
            is_organic: false,
            is_gluten_free: false,
            is_alcohol_free: true,
            is_lactose_free: false,
            image: None,
            ingredient_ids: vec![a, b, a],
            created_by: None,
        });

        assert_eq!(food.ingredient_ids, vec![a, b]);
        assert!(!food.is_approved);
        assert_eq!(food.hazard_level, 0.0);
    }
}
