use foodwatch_core::domain::catalog::entities::MAX_INGREDIENT_HAZARD;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

#[derive(Debug, Serialize, Deserialize, Validate, ToSchema)]
pub struct CreateIngredientValidator {
    #[validate(length(min = 1, max = 200, message = "name must be 1 to 200 characters"))]
    pub name: String,

    #[serde(default)]
    pub description: Option<String>,

    /// Ordinal tier from 0 (harmless) to 4.
    #[validate(range(min = 0, max = MAX_INGREDIENT_HAZARD, message = "hazard level must be between 0 and 4"))]
    pub hazard_level: i16,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hazard_tier_is_bounded() {
        let valid: CreateIngredientValidator =
            serde_json::from_str(r#"{"name": "peanut", "hazard_level": 4}"#).expect("json");
        let invalid: CreateIngredientValidator =
            serde_json::from_str(r#"{"name": "peanut", "hazard_level": 5}"#).expect("json");

        assert!(valid.validate().is_ok());
        assert!(invalid.validate().is_err());
    }
}
