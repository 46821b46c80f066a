use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Serialize, Deserialize, Validate, ToSchema)]
pub struct CreateFoodValidator {
    pub restaurant_id: Uuid,

    #[validate(length(min = 1, max = 200, message = "name must be 1 to 200 characters"))]
    pub name: String,

    #[serde(default)]
    pub macro_table: BTreeMap<String, f64>,

    #[serde(default)]
    #[validate(range(min = 1, message = "serving size must be positive"))]
    pub serving_size: Option<i32>,

    #[serde(default)]
    pub is_organic: bool,

    #[serde(default)]
    pub is_gluten_free: bool,

    #[serde(default)]
    pub is_alcohol_free: bool,

    #[serde(default)]
    pub is_lactose_free: bool,

    #[serde(default)]
    #[validate(url(message = "image must be a URL"))]
    pub image: Option<String>,

    #[validate(length(min = 1, message = "at least one ingredient is required"))]
    pub ingredient_ids: Vec<Uuid>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn food_needs_a_name_and_ingredients() {
        let restaurant_id = Uuid::new_v4();
        let payload: CreateFoodValidator = serde_json::from_value(serde_json::json!({
            "restaurant_id": restaurant_id,
            "name": "",
            "ingredient_ids": [],
        }))
        .expect("json");

        let errors = payload.validate().expect_err("invalid payload");
        let fields = errors.field_errors();
        assert!(fields.contains_key("name"));
        assert!(fields.contains_key("ingredient_ids"));
    }
}
