//! Derived hazard levels.
//!
//! A food's level is the mean of its ingredients' tiers and a restaurant's
//! level is the mean over its approved foods, both rounded to one decimal.
//! Means are computed on integer tenths so the rounding is exact: halves round
//! up (values are never negative, so this is also half away from zero).

use tracing::{debug, error, warn};
use uuid::Uuid;

use crate::domain::{
    catalog::{ports::CatalogRepository, value_objects::FoodFilter},
    common::{entities::app_errors::CoreError, ports::SavepointScope},
};

pub fn food_hazard_level(ingredient_levels: &[i16]) -> f64 {
    mean_of_tenths(ingredient_levels.iter().map(|level| i64::from(*level) * 10))
}

pub fn restaurant_hazard_level(food_levels: &[f64]) -> f64 {
    mean_of_tenths(food_levels.iter().map(|level| to_tenths(*level)))
}

fn to_tenths(level: f64) -> i64 {
    (level * 10.0).round() as i64
}

fn mean_of_tenths(values: impl Iterator<Item = i64>) -> f64 {
    let (sum, count) = values.fold((0i64, 0i64), |(sum, count), v| (sum + v, count + 1));
    if count == 0 {
        return 0.0;
    }

    let rounded = (2 * sum + count).div_euclid(2 * count);
    rounded as f64 / 10.0
}

/// Hazard level for a set of ingredient ids as currently stored. Ids that do
/// not resolve are ignored; callers validate references beforehand.
pub async fn compute_food_hazard<T>(tx: &mut T, ingredient_ids: &[Uuid]) -> Result<f64, CoreError>
where
    T: CatalogRepository,
{
    if ingredient_ids.is_empty() {
        return Ok(0.0);
    }

    let levels = tx
        .get_ingredients(ingredient_ids)
        .await?
        .iter()
        .map(|ingredient| ingredient.hazard_level)
        .collect::<Vec<i16>>();

    Ok(food_hazard_level(&levels))
}

/// Re-derives and persists a food's hazard level. Returns `None` when the food
/// does not exist.
pub async fn recompute_food_hazard<T>(tx: &mut T, food_id: Uuid) -> Result<Option<f64>, CoreError>
where
    T: CatalogRepository,
{
    let Some(mut food) = tx.get_food(food_id).await? else {
        return Ok(None);
    };

    let hazard_level = compute_food_hazard(tx, &food.ingredient_ids).await?;
    if food.hazard_level != hazard_level {
        food.hazard_level = hazard_level;
        tx.update_food(food).await?;
    }

    debug!(food_id = %food_id, hazard_level, "food hazard recomputed");
    Ok(Some(hazard_level))
}

const HAZARD_SAVEPOINT: &str = "restaurant_hazard";

/// Re-derives and persists a restaurant's hazard level from its approved
/// foods.
///
/// This is a side effect of other operations: a missing restaurant or a
/// failed recompute is logged and reported as `Ok(None)`. The work runs in a
/// savepoint so a failed statement does not poison the caller's transaction.
/// Only an error from the savepoint itself, which leaves the transaction
/// unusable, is returned.
pub async fn recompute_restaurant_hazard<T>(
    tx: &mut T,
    restaurant_id: Uuid,
) -> Result<Option<f64>, CoreError>
where
    T: CatalogRepository + SavepointScope,
{
    tx.savepoint(HAZARD_SAVEPOINT).await?;

    match try_recompute_restaurant_hazard(tx, restaurant_id).await {
        Ok(Some(hazard_level)) => {
            tx.release_savepoint(HAZARD_SAVEPOINT).await?;
            debug!(restaurant_id = %restaurant_id, hazard_level, "restaurant hazard recomputed");
            Ok(Some(hazard_level))
        }
        Ok(None) => {
            tx.release_savepoint(HAZARD_SAVEPOINT).await?;
            warn!(restaurant_id = %restaurant_id, "restaurant vanished before hazard recompute");
            Ok(None)
        }
        Err(e) => {
            error!(restaurant_id = %restaurant_id, "failed to recompute restaurant hazard: {}", e);
            tx.rollback_to_savepoint(HAZARD_SAVEPOINT).await?;
            Ok(None)
        }
    }
}

async fn try_recompute_restaurant_hazard<T>(
    tx: &mut T,
    restaurant_id: Uuid,
) -> Result<Option<f64>, CoreError>
where
    T: CatalogRepository,
{
    let levels = tx
        .list_foods(FoodFilter {
            restaurant_id: Some(restaurant_id),
            is_approved: Some(true),
        })
        .await?
        .iter()
        .map(|food| food.hazard_level)
        .collect::<Vec<f64>>();

    let hazard_level = restaurant_hazard_level(&levels);
    let found = tx
        .set_restaurant_hazard_level(restaurant_id, hazard_level)
        .await?;

    Ok(found.then_some(hazard_level))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        domain::{
            catalog::entities::Restaurant,
            common::ports::{StoreTransaction, UnitOfWork},
        },
        infrastructure::memory::InMemoryStore,
    };

    #[test]
    fn food_level_is_mean_of_ingredients() {
        assert_eq!(food_hazard_level(&[4, 2, 0]), 2.0);
        assert_eq!(food_hazard_level(&[1, 3]), 2.0);
        assert_eq!(food_hazard_level(&[4, 4, 4]), 4.0);
        assert_eq!(food_hazard_level(&[1, 2]), 1.5);
    }

    #[test]
    fn food_without_ingredients_is_safe() {
        assert_eq!(food_hazard_level(&[]), 0.0);
    }

    #[test]
    fn food_level_rounds_to_one_decimal() {
        assert_eq!(food_hazard_level(&[1, 1, 2]), 1.3);
        assert_eq!(food_hazard_level(&[1, 2, 2]), 1.7);
    }

    #[test]
    fn halves_round_up() {
        assert_eq!(food_hazard_level(&[2, 2, 3, 2]), 2.3);
        assert_eq!(restaurant_hazard_level(&[2.3, 2.2]), 2.3);
    }

    #[test]
    fn restaurant_level_is_mean_of_food_levels() {
        assert_eq!(restaurant_hazard_level(&[2.0, 4.0]), 3.0);
        assert_eq!(restaurant_hazard_level(&[1.3, 1.7, 0.0]), 1.0);
        assert_eq!(restaurant_hazard_level(&[]), 0.0);
    }

    #[tokio::test]
    async fn missing_restaurant_is_skipped_without_error() {
        let store = InMemoryStore::new();
        let mut tx = store.begin().await.expect("transaction");

        assert_eq!(
            recompute_restaurant_hazard(&mut tx, Uuid::new_v4()).await,
            Ok(None)
        );
    }

    #[tokio::test]
    async fn failed_recompute_leaves_earlier_writes_committable() {
        let store = InMemoryStore::new();
        let restaurant = Restaurant::new("Bistro".to_string(), None, None, None);

        let mut tx = store.begin().await.expect("transaction");
        tx.insert_restaurant(restaurant.clone()).await.expect("insert");

        store.fail_hazard_writes(true);
        assert_eq!(
            recompute_restaurant_hazard(&mut tx, restaurant.id).await,
            Ok(None)
        );
        store.fail_hazard_writes(false);
        tx.commit().await.expect("commit");

        let mut tx = store.begin().await.expect("transaction");
        assert_eq!(tx.get_restaurant(restaurant.id).await, Ok(Some(restaurant)));
    }
}
