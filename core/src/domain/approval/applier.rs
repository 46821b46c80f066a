//! Writes an approved proposal into the catalog.
//!
//! Runs inside the transaction that approved the proposal; any error rolls
//! back the food mutation together with the vote that triggered it.

use tracing::info;
use uuid::Uuid;

use crate::domain::{
    catalog::ports::CatalogRepository,
    common::{entities::app_errors::CoreError, ports::SavepointScope},
    hazard::aggregator::{compute_food_hazard, recompute_restaurant_hazard},
    proposal::entities::{ChangeProposal, ProposalChange, ProposalKind},
};

#[derive(Debug, Clone, PartialEq)]
pub struct ApplyOutcome {
    pub food_id: Uuid,
    pub kind: ProposalKind,
    /// Restaurants whose hazard level was recomputed, with the new value.
    pub restaurant_hazards: Vec<(Uuid, f64)>,
}

pub async fn apply_proposal<T>(tx: &mut T, proposal: &ChangeProposal) -> Result<ApplyOutcome, CoreError>
where
    T: CatalogRepository + SavepointScope,
{
    let target = match proposal.old_version {
        Some(food_id) => tx.lock_food(food_id).await?,
        None => None,
    };
    let Some(mut food) = target else {
        return Err(CoreError::TargetGone {
            proposal_id: proposal.id,
        });
    };

    let food_id = food.id;
    let mut touched_restaurants = vec![food.restaurant_id];

    match &proposal.change {
        ProposalChange::Deletion(_) => {
            tx.delete_food(food_id).await?;
            info!(proposal_id = %proposal.id, food_id = %food_id, "food deleted by approved proposal");
        }
        ProposalChange::Edit(snapshot) => {
            snapshot.apply_to(&mut food);
            food.hazard_level = compute_food_hazard(tx, &food.ingredient_ids).await?;

            if !touched_restaurants.contains(&food.restaurant_id) {
                touched_restaurants.push(food.restaurant_id);
            }

            let hazard_level = food.hazard_level;
            tx.update_food(food).await?;
            info!(proposal_id = %proposal.id, food_id = %food_id, hazard_level, "food updated by approved proposal");
        }
    }

    let mut restaurant_hazards = Vec::with_capacity(touched_restaurants.len());
    for restaurant_id in touched_restaurants {
        if let Some(hazard_level) = recompute_restaurant_hazard(tx, restaurant_id).await? {
            restaurant_hazards.push((restaurant_id, hazard_level));
        }
    }

    Ok(ApplyOutcome {
        food_id,
        kind: proposal.kind(),
        restaurant_hazards,
    })
}
