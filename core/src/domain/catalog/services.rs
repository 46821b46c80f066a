use std::collections::HashSet;

use tracing::{info, instrument};
use uuid::Uuid;

use crate::domain::{
    audit::{entities::AuditEvent, ports::AuditEventSink},
    authentication::value_objects::Identity,
    catalog::{
        entities::{DEFAULT_SERVING_SIZE, Food, FoodConfig, Ingredient, Restaurant, dedup_ids},
        ports::{CatalogRepository, CatalogService},
        value_objects::{
            ApprovableFood, CreateFoodInput, CreateIngredientInput, CreateRestaurantInput,
            FoodApproval, FoodFilter,
        },
    },
    common::{
        entities::app_errors::CoreError,
        policies::ensure_policy,
        ports::{StoreTransaction, UnitOfWork},
        services::Service,
    },
    hazard::aggregator::{compute_food_hazard, recompute_restaurant_hazard},
};

/// Fails with `InvalidIngredientReference` listing every id that does not
/// resolve, in input order.
pub(crate) async fn ensure_ingredients_exist<T>(tx: &mut T, ids: &[Uuid]) -> Result<(), CoreError>
where
    T: CatalogRepository,
{
    if ids.is_empty() {
        return Ok(());
    }

    let known = tx
        .get_ingredients(ids)
        .await?
        .into_iter()
        .map(|ingredient| ingredient.id)
        .collect::<HashSet<Uuid>>();

    let missing = ids
        .iter()
        .filter(|id| !known.contains(id))
        .copied()
        .collect::<Vec<Uuid>>();

    if missing.is_empty() {
        Ok(())
    } else {
        Err(CoreError::InvalidIngredientReference { ids: missing })
    }
}

/// Fails with `Conflict` when another food of the restaurant already uses
/// `name`. `except` names the food being renamed, which may keep its own name.
pub(crate) async fn ensure_food_name_free<T>(
    tx: &mut T,
    restaurant_id: Uuid,
    name: &str,
    except: Option<Uuid>,
) -> Result<(), CoreError>
where
    T: CatalogRepository,
{
    let name_taken = tx
        .list_foods(FoodFilter {
            restaurant_id: Some(restaurant_id),
            is_approved: None,
        })
        .await?
        .iter()
        .any(|food| food.name == name && Some(food.id) != except);

    if name_taken {
        return Err(CoreError::Conflict(format!(
            "a food named '{name}' already exists for this restaurant"
        )));
    }

    Ok(())
}

impl<S, A> CatalogService for Service<S, A>
where
    S: UnitOfWork,
    A: AuditEventSink,
{
    #[instrument(skip(self, identity, input), fields(user_id = %identity.id(), restaurant_id = %input.restaurant_id))]
    async fn create_food(&self, identity: Identity, input: CreateFoodInput) -> Result<Food, CoreError> {
        let name = input.name.trim().to_string();
        if name.is_empty() {
            return Err(CoreError::Invalid("food name is required".to_string()));
        }

        let mut tx = self.store.begin().await?;

        tx.get_restaurant(input.restaurant_id)
            .await?
            .ok_or(CoreError::NotFound)?;

        let ingredient_ids = dedup_ids(input.ingredient_ids);
        ensure_ingredients_exist(&mut tx, &ingredient_ids).await?;

        ensure_food_name_free(&mut tx, input.restaurant_id, &name, None).await?;

        let mut food = Food::new(FoodConfig {
            restaurant_id: input.restaurant_id,
            name,
            macro_table: input.macro_table,
            serving_size: input.serving_size.unwrap_or(DEFAULT_SERVING_SIZE),
            is_organic: input.is_organic,
            is_gluten_free: input.is_gluten_free,
            is_alcohol_free: input.is_alcohol_free,
            is_lactose_free: input.is_lactose_free,
            image: input.image,
            ingredient_ids,
            created_by: Some(identity.id()),
        });
        food.hazard_level = compute_food_hazard(&mut tx, &food.ingredient_ids).await?;

        if self.policy.can_approve_food(&identity)? {
            food.approved_supervisors.push(identity.id());
        }

        let food = tx.insert_food(food).await?;
        tx.commit().await?;

        info!(food_id = %food.id, hazard_level = food.hazard_level, "food created, awaiting publication");

        Ok(food)
    }

    #[instrument(skip(self, identity), fields(user_id = %identity.id()))]
    async fn approve_food(&self, identity: Identity, food_id: Uuid) -> Result<FoodApproval, CoreError> {
        ensure_policy(
            self.policy.can_approve_food(&identity),
            "only supervisors can approve food items",
        )?;

        let mut tx = self.store.begin().await?;

        let mut food = tx.lock_food(food_id).await?.ok_or(CoreError::NotFound)?;
        if food.is_approved {
            return Err(CoreError::AlreadyApplied);
        }

        let approvals = tx.add_food_approval(food_id, identity.id()).await?;
        let required = self.approval.required_food_approvals;
        let published = approvals >= required;

        let mut events = Vec::new();
        if published {
            let restaurant_id = food.restaurant_id;
            food.is_approved = true;
            tx.update_food(food).await?;

            events.push(AuditEvent::FoodPublished {
                food_id,
                restaurant_id,
            });
            if let Some(hazard_level) = recompute_restaurant_hazard(&mut tx, restaurant_id).await? {
                events.push(AuditEvent::HazardRecomputed {
                    restaurant_id,
                    hazard_level,
                });
            }
        }

        tx.commit().await?;

        for event in events {
            self.audit.publish(event);
        }

        info!(food_id = %food_id, approvals, required, published, "food approval recorded");

        Ok(FoodApproval {
            food_id,
            approvals,
            required,
            published,
        })
    }

    async fn list_approvable_foods(&self, identity: Identity) -> Result<Vec<ApprovableFood>, CoreError> {
        ensure_policy(
            self.policy.can_approve_food(&identity),
            "only supervisors can review unpublished foods",
        )?;

        let mut tx = self.store.begin().await?;

        let foods = tx
            .list_foods(FoodFilter {
                restaurant_id: None,
                is_approved: Some(false),
            })
            .await?;

        let mut approvable = Vec::with_capacity(foods.len());
        for food in foods {
            let restaurant_name = tx
                .get_restaurant(food.restaurant_id)
                .await?
                .map(|restaurant| restaurant.name)
                .unwrap_or_default();

            approvable.push(ApprovableFood {
                approved_supervisors_count: food.approved_supervisors.len(),
                restaurant_name,
                food,
            });
        }

        tx.rollback().await?;

        Ok(approvable)
    }

    async fn get_food(&self, food_id: Uuid) -> Result<Food, CoreError> {
        let mut tx = self.store.begin().await?;
        let food = tx.get_food(food_id).await?;
        tx.rollback().await?;

        food.ok_or(CoreError::NotFound)
    }

    async fn list_foods(&self, filter: FoodFilter) -> Result<Vec<Food>, CoreError> {
        let mut tx = self.store.begin().await?;
        let foods = tx.list_foods(filter).await?;
        tx.rollback().await?;

        Ok(foods)
    }

    async fn get_restaurant(&self, restaurant_id: Uuid) -> Result<Restaurant, CoreError> {
        let mut tx = self.store.begin().await?;
        let restaurant = tx.get_restaurant(restaurant_id).await?;
        tx.rollback().await?;

        restaurant.ok_or(CoreError::NotFound)
    }

    #[instrument(skip(self, identity, input), fields(user_id = %identity.id()))]
    async fn create_restaurant(
        &self,
        identity: Identity,
        input: CreateRestaurantInput,
    ) -> Result<Restaurant, CoreError> {
        ensure_policy(
            self.policy.can_manage_catalog(&identity),
            "only supervisors can add restaurants",
        )?;

        let name = input.name.trim().to_string();
        if name.is_empty() {
            return Err(CoreError::Invalid("restaurant name is required".to_string()));
        }

        let mut tx = self.store.begin().await?;

        if tx.find_restaurant_by_name(&name).await?.is_some() {
            return Err(CoreError::Conflict(format!(
                "a restaurant named '{name}' already exists"
            )));
        }

        let restaurant = tx
            .insert_restaurant(Restaurant::new(
                name,
                input.cuisine,
                input.description,
                input.image,
            ))
            .await?;
        tx.commit().await?;

        info!(restaurant_id = %restaurant.id, "restaurant created");

        Ok(restaurant)
    }

    async fn list_ingredients(&self) -> Result<Vec<Ingredient>, CoreError> {
        let mut tx = self.store.begin().await?;
        let ingredients = tx.list_ingredients().await?;
        tx.rollback().await?;

        Ok(ingredients)
    }

    #[instrument(skip(self, identity, input), fields(user_id = %identity.id()))]
    async fn create_ingredient(
        &self,
        identity: Identity,
        input: CreateIngredientInput,
    ) -> Result<Ingredient, CoreError> {
        ensure_policy(
            self.policy.can_manage_catalog(&identity),
            "only supervisors can add ingredients",
        )?;

        let ingredient = Ingredient::new(
            input.name.trim().to_string(),
            input.description,
            input.hazard_level,
        )?;
        if ingredient.name.is_empty() {
            return Err(CoreError::Invalid("ingredient name is required".to_string()));
        }

        let mut tx = self.store.begin().await?;

        if tx.find_ingredient_by_name(&ingredient.name).await?.is_some() {
            return Err(CoreError::Conflict(format!(
                "an ingredient named '{}' already exists",
                ingredient.name
            )));
        }

        let ingredient = tx.insert_ingredient(ingredient).await?;
        tx.commit().await?;

        Ok(ingredient)
    }
}
