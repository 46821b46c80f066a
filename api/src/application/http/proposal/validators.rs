use std::collections::BTreeMap;

use foodwatch_core::domain::proposal::value_objects::ProposedFoodFields;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Serialize, Deserialize, Validate, ToSchema)]
pub struct SubmitChangeValidator {
    #[serde(default)]
    pub restaurant_id: Option<Uuid>,

    #[serde(default)]
    #[validate(length(min = 1, max = 200, message = "name must be 1 to 200 characters"))]
    pub name: Option<String>,

    #[serde(default)]
    pub macro_table: Option<BTreeMap<String, f64>>,

    #[serde(default)]
    #[validate(range(min = 1, message = "serving size must be positive"))]
    pub serving_size: Option<i32>,

    #[serde(default)]
    pub is_organic: Option<bool>,

    #[serde(default)]
    pub is_gluten_free: Option<bool>,

    #[serde(default)]
    pub is_alcohol_free: Option<bool>,

    #[serde(default)]
    pub is_lactose_free: Option<bool>,

    #[serde(default)]
    #[validate(url(message = "image must be a URL"))]
    pub image: Option<String>,

    #[serde(default)]
    pub ingredient_ids: Option<Vec<Uuid>>,

    #[serde(default)]
    #[validate(length(max = 1000, message = "reason is limited to 1000 characters"))]
    pub reason: Option<String>,
}

impl SubmitChangeValidator {
    pub fn into_fields(self) -> (ProposedFoodFields, Option<String>) {
        let fields = ProposedFoodFields {
            restaurant_id: self.restaurant_id,
            name: self.name,
            macro_table: self.macro_table,
            serving_size: self.serving_size,
            is_organic: self.is_organic,
            is_gluten_free: self.is_gluten_free,
            is_alcohol_free: self.is_alcohol_free,
            is_lactose_free: self.is_lactose_free,
            image: self.image,
            ingredient_ids: self.ingredient_ids,
        };

        (fields, self.reason)
    }
}

#[derive(Debug, Serialize, Deserialize, Validate, ToSchema)]
pub struct SubmitRemovalValidator {
    #[serde(default)]
    #[validate(length(max = 1000, message = "reason is limited to 1000 characters"))]
    pub reason: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_change_body_is_valid() {
        let payload: SubmitChangeValidator = serde_json::from_str("{}").expect("json");

        assert!(payload.validate().is_ok());
        let (fields, reason) = payload.into_fields();
        assert!(fields.name.is_none());
        assert!(reason.is_none());
    }

    #[test]
    fn non_positive_serving_size_is_rejected() {
        let payload: SubmitChangeValidator =
            serde_json::from_str(r#"{"serving_size": 0}"#).expect("json");

        assert!(payload.validate().is_err());
    }

    #[test]
    fn blank_name_is_rejected() {
        let payload: SubmitChangeValidator =
            serde_json::from_str(r#"{"name": ""}"#).expect("json");

        assert!(payload.validate().is_err());
    }
}
