use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::domain::catalog::entities::Food;

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CreateFoodInput {
    pub restaurant_id: Uuid,
    pub name: String,
    pub macro_table: BTreeMap<String, f64>,
    pub serving_size: Option<i32>,
    pub is_organic: bool,
    pub is_gluten_free: bool,
    pub is_alcohol_free: bool,
    pub is_lactose_free: bool,
    pub image: Option<String>,
    pub ingredient_ids: Vec<Uuid>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CreateRestaurantInput {
    pub name: String,
    pub cuisine: Option<String>,
    pub description: Option<String>,
    pub image: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CreateIngredientInput {
    pub name: String,
    pub description: Option<String>,
    pub hazard_level: i16,
}

#[derive(Debug, Clone, Default)]
pub struct FoodFilter {
    pub restaurant_id: Option<Uuid>,
    pub is_approved: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ApprovableFood {
    pub food: Food,
    pub restaurant_name: String,
    pub approved_supervisors_count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct FoodApproval {
    pub food_id: Uuid,
    pub approvals: usize,
    pub required: usize,
    pub published: bool,
}
