use std::collections::BTreeMap;

use chrono::Utc;
use tracing::error;
use uuid::Uuid;

use crate::domain::{
    catalog::entities::{Food, Ingredient, Restaurant, User},
    common::entities::app_errors::CoreError,
    proposal::entities::{ChangeProposal, FoodSnapshot, ProposalChange},
};
use crate::entity::{
    food_changes::Model as FoodChangeModel, foods::Model as FoodModel,
    ingredients::Model as IngredientModel, restaurants::Model as RestaurantModel,
    users::Model as UserModel,
};

impl From<UserModel> for User {
    fn from(model: UserModel) -> Self {
        User {
            id: model.id,
            username: model.username,
            is_supervisor: model.is_supervisor,
            is_staff: model.is_staff,
        }
    }
}

impl From<IngredientModel> for Ingredient {
    fn from(model: IngredientModel) -> Self {
        Ingredient {
            id: model.id,
            name: model.name,
            description: model.description,
            hazard_level: model.hazard_level,
        }
    }
}

impl From<RestaurantModel> for Restaurant {
    fn from(model: RestaurantModel) -> Self {
        Restaurant {
            id: model.id,
            name: model.name,
            cuisine: model.cuisine,
            description: model.description,
            image: model.image,
            hazard_level: model.hazard_level,
        }
    }
}

pub fn food_from_model(
    model: FoodModel,
    ingredient_ids: Vec<Uuid>,
    approved_supervisors: Vec<Uuid>,
) -> Result<Food, CoreError> {
    let macro_table: BTreeMap<String, f64> =
        serde_json::from_value(model.macro_table).map_err(|e| {
            error!("Failed to decode macro table of food {}: {}", model.id, e);
            CoreError::InternalServerError
        })?;

    Ok(Food {
        id: model.id,
        restaurant_id: model.restaurant_id,
        name: model.name,
        macro_table,
        serving_size: model.serving_size,
        is_organic: model.is_organic,
        is_gluten_free: model.is_gluten_free,
        is_alcohol_free: model.is_alcohol_free,
        is_lactose_free: model.is_lactose_free,
        image: model.image,
        ingredient_ids,
        hazard_level: model.hazard_level,
        is_approved: model.is_approved,
        approved_supervisors,
        created_by: model.created_by,
        created_date: model.created_date.with_timezone(&Utc),
    })
}

pub fn macro_table_to_json(macro_table: &BTreeMap<String, f64>) -> Result<serde_json::Value, CoreError> {
    serde_json::to_value(macro_table).map_err(|e| {
        error!("Failed to encode macro table: {}", e);
        CoreError::InternalServerError
    })
}

pub fn snapshot_to_json(snapshot: &FoodSnapshot) -> Result<serde_json::Value, CoreError> {
    serde_json::to_value(snapshot).map_err(|e| {
        error!("Failed to encode proposal snapshot: {}", e);
        CoreError::InternalServerError
    })
}

pub fn proposal_from_model(
    model: FoodChangeModel,
    approved_supervisors: Vec<Uuid>,
) -> Result<ChangeProposal, CoreError> {
    let snapshot: FoodSnapshot = serde_json::from_value(model.snapshot).map_err(|e| {
        error!("Failed to decode snapshot of proposal {}: {}", model.id, e);
        CoreError::InternalServerError
    })?;

    let change = if model.is_deletion {
        ProposalChange::Deletion(snapshot)
    } else {
        ProposalChange::Edit(snapshot)
    };

    Ok(ChangeProposal {
        id: model.id,
        old_version: model.old_version_id,
        change,
        new_hazard_level: model.new_hazard_level,
        approved_supervisors,
        new_is_approved: model.new_is_approved,
        reason: model.reason,
        date: model.date.with_timezone(&Utc),
        updated_by: model.updated_by,
        updated_date: model.updated_date.with_timezone(&Utc),
        applied_at: model.applied_at.map(|dt| dt.with_timezone(&Utc)),
        apply_error: model.apply_error,
    })
}

#[cfg(test)]
mod tests {
    use chrono::{FixedOffset, TimeZone};
    use serde_json::json;

    use super::*;

    fn change_model(is_deletion: bool) -> FoodChangeModel {
        let now = FixedOffset::east_opt(0)
            .and_then(|offset| offset.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).single())
            .expect("valid timestamp");

        FoodChangeModel {
            id: Uuid::new_v4(),
            old_version_id: Some(Uuid::new_v4()),
            is_deletion,
            snapshot: json!({
                "restaurant_id": Uuid::new_v4(),
                "name": "Pad Thai",
                "macro_table": { "protein": 12.5 },
                "serving_size": 250,
                "is_organic": false,
                "is_gluten_free": true,
                "is_alcohol_free": true,
                "is_lactose_free": true,
                "image": null,
                "ingredient_ids": []
            }),
            new_hazard_level: 1.5,
            new_is_approved: false,
            reason: None,
            date: now,
            updated_by: None,
            updated_date: now,
            applied_at: None,
            apply_error: None,
        }
    }

    #[test]
    fn deletion_flag_selects_change_kind() {
        let proposal = proposal_from_model(change_model(true), vec![]).expect("decodes");
        assert!(proposal.is_deletion());

        let proposal = proposal_from_model(change_model(false), vec![]).expect("decodes");
        assert!(!proposal.is_deletion());
        assert_eq!(proposal.change.snapshot().name, "Pad Thai");
    }

    #[test]
    fn malformed_snapshot_is_an_internal_error() {
        let mut model = change_model(false);
        model.snapshot = json!({ "name": 3 });

        assert_eq!(
            proposal_from_model(model, vec![]),
            Err(CoreError::InternalServerError)
        );
    }
}
