use std::collections::HashMap;

use chrono::Utc;
use sea_orm::{
    ActiveValue::Set, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    QuerySelect,
    sea_query::{Expr, Func, OnConflict},
};
use uuid::Uuid;

use crate::domain::{
    catalog::{
        entities::{Food, Ingredient, Restaurant, User},
        ports::CatalogRepository,
        value_objects::FoodFilter,
    },
    common::entities::app_errors::CoreError,
};
use crate::entity::{
    food_approvals::{
        ActiveModel as FoodApprovalActiveModel, Column as FoodApprovalColumn,
        Entity as FoodApprovalEntity,
    },
    food_ingredients::{
        ActiveModel as FoodIngredientActiveModel, Column as FoodIngredientColumn,
        Entity as FoodIngredientEntity,
    },
    foods::{
        ActiveModel as FoodActiveModel, Column as FoodColumn, Entity as FoodEntity,
        Model as FoodModel,
    },
    ingredients::{
        ActiveModel as IngredientActiveModel, Column as IngredientColumn,
        Entity as IngredientEntity,
    },
    restaurants::{
        ActiveModel as RestaurantActiveModel, Column as RestaurantColumn,
        Entity as RestaurantEntity,
    },
    users::{ActiveModel as UserActiveModel, Entity as UserEntity},
};

use super::{
    PostgresTransaction, db_error,
    mappers::{food_from_model, macro_table_to_json},
};

impl PostgresTransaction {
    /// Loads ingredient links and approvals for `models` and builds the foods,
    /// keeping the order of `models`.
    async fn hydrate_foods(&self, models: Vec<FoodModel>) -> Result<Vec<Food>, CoreError> {
        if models.is_empty() {
            return Ok(Vec::new());
        }

        let food_ids = models.iter().map(|model| model.id).collect::<Vec<Uuid>>();

        let mut ingredients: HashMap<Uuid, Vec<Uuid>> = HashMap::new();
        for link in FoodIngredientEntity::find()
            .filter(FoodIngredientColumn::FoodId.is_in(food_ids.clone()))
            .order_by_asc(FoodIngredientColumn::Position)
            .all(&self.txn)
            .await
            .map_err(db_error("load food ingredients"))?
        {
            ingredients
                .entry(link.food_id)
                .or_default()
                .push(link.ingredient_id);
        }

        let mut approvals: HashMap<Uuid, Vec<Uuid>> = HashMap::new();
        for approval in FoodApprovalEntity::find()
            .filter(FoodApprovalColumn::FoodId.is_in(food_ids))
            .order_by_asc(FoodApprovalColumn::ApprovedAt)
            .all(&self.txn)
            .await
            .map_err(db_error("load food approvals"))?
        {
            approvals
                .entry(approval.food_id)
                .or_default()
                .push(approval.user_id);
        }

        models
            .into_iter()
            .map(|model| {
                let ingredient_ids = ingredients.remove(&model.id).unwrap_or_default();
                let approved = approvals.remove(&model.id).unwrap_or_default();
                food_from_model(model, ingredient_ids, approved)
            })
            .collect()
    }

    async fn load_food(&self, food_id: Uuid, lock: bool) -> Result<Option<Food>, CoreError> {
        let mut query = FoodEntity::find_by_id(food_id);
        if lock {
            query = query.lock_exclusive();
        }

        let Some(model) = query
            .one(&self.txn)
            .await
            .map_err(db_error("fetch food"))?
        else {
            return Ok(None);
        };

        Ok(self.hydrate_foods(vec![model]).await?.pop())
    }

    async fn replace_food_ingredients(
        &self,
        food_id: Uuid,
        ingredient_ids: &[Uuid],
    ) -> Result<(), CoreError> {
        FoodIngredientEntity::delete_many()
            .filter(FoodIngredientColumn::FoodId.eq(food_id))
            .exec(&self.txn)
            .await
            .map_err(db_error("clear food ingredients"))?;

        if ingredient_ids.is_empty() {
            return Ok(());
        }

        let links = ingredient_ids
            .iter()
            .enumerate()
            .map(|(position, ingredient_id)| FoodIngredientActiveModel {
                food_id: Set(food_id),
                ingredient_id: Set(*ingredient_id),
                position: Set(position as i32),
            });

        FoodIngredientEntity::insert_many(links)
            .exec_without_returning(&self.txn)
            .await
            .map_err(db_error("link food ingredients"))?;

        Ok(())
    }

    fn food_active_model(food: &Food) -> Result<FoodActiveModel, CoreError> {
        Ok(FoodActiveModel {
            id: Set(food.id),
            restaurant_id: Set(food.restaurant_id),
            name: Set(food.name.clone()),
            macro_table: Set(macro_table_to_json(&food.macro_table)?),
            serving_size: Set(food.serving_size),
            is_organic: Set(food.is_organic),
            is_gluten_free: Set(food.is_gluten_free),
            is_alcohol_free: Set(food.is_alcohol_free),
            is_lactose_free: Set(food.is_lactose_free),
            image: Set(food.image.clone()),
            hazard_level: Set(food.hazard_level),
            is_approved: Set(food.is_approved),
            created_by: Set(food.created_by),
            created_date: Set(food.created_date.fixed_offset()),
        })
    }
}

impl CatalogRepository for PostgresTransaction {
    async fn get_user(&mut self, user_id: Uuid) -> Result<Option<User>, CoreError> {
        let user = UserEntity::find_by_id(user_id)
            .one(&self.txn)
            .await
            .map_err(db_error("fetch user"))?
            .map(User::from);

        Ok(user)
    }

    async fn insert_user(&mut self, user: User) -> Result<User, CoreError> {
        let user = UserEntity::insert(UserActiveModel {
            id: Set(user.id),
            username: Set(user.username),
            is_supervisor: Set(user.is_supervisor),
            is_staff: Set(user.is_staff),
        })
        .exec_with_returning(&self.txn)
        .await
        .map(User::from)
        .map_err(db_error("create user"))?;

        Ok(user)
    }

    async fn get_restaurant(&mut self, restaurant_id: Uuid) -> Result<Option<Restaurant>, CoreError> {
        let restaurant = RestaurantEntity::find_by_id(restaurant_id)
            .one(&self.txn)
            .await
            .map_err(db_error("fetch restaurant"))?
            .map(Restaurant::from);

        Ok(restaurant)
    }

    async fn find_restaurant_by_name(&mut self, name: &str) -> Result<Option<Restaurant>, CoreError> {
        let restaurant = RestaurantEntity::find()
            .filter(Expr::expr(Func::lower(Expr::col(RestaurantColumn::Name))).eq(name.to_lowercase()))
            .one(&self.txn)
            .await
            .map_err(db_error("fetch restaurant by name"))?
            .map(Restaurant::from);

        Ok(restaurant)
    }

    async fn insert_restaurant(&mut self, restaurant: Restaurant) -> Result<Restaurant, CoreError> {
        let restaurant = RestaurantEntity::insert(RestaurantActiveModel {
            id: Set(restaurant.id),
            name: Set(restaurant.name),
            cuisine: Set(restaurant.cuisine),
            description: Set(restaurant.description),
            image: Set(restaurant.image),
            hazard_level: Set(restaurant.hazard_level),
        })
        .exec_with_returning(&self.txn)
        .await
        .map(Restaurant::from)
        .map_err(db_error("create restaurant"))?;

        Ok(restaurant)
    }

    async fn list_restaurant_ids(&mut self) -> Result<Vec<Uuid>, CoreError> {
        RestaurantEntity::find()
            .select_only()
            .column(RestaurantColumn::Id)
            .order_by_asc(RestaurantColumn::Id)
            .into_tuple::<Uuid>()
            .all(&self.txn)
            .await
            .map_err(db_error("list restaurants"))
    }

    async fn set_restaurant_hazard_level(
        &mut self,
        restaurant_id: Uuid,
        hazard_level: f64,
    ) -> Result<bool, CoreError> {
        let result = RestaurantEntity::update_many()
            .col_expr(RestaurantColumn::HazardLevel, Expr::value(hazard_level))
            .filter(RestaurantColumn::Id.eq(restaurant_id))
            .exec(&self.txn)
            .await
            .map_err(db_error("update restaurant hazard level"))?;

        Ok(result.rows_affected > 0)
    }

    async fn get_ingredients(&mut self, ids: &[Uuid]) -> Result<Vec<Ingredient>, CoreError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let ingredients = IngredientEntity::find()
            .filter(IngredientColumn::Id.is_in(ids.iter().copied()))
            .all(&self.txn)
            .await
            .map_err(db_error("fetch ingredients"))?
            .into_iter()
            .map(Ingredient::from)
            .collect();

        Ok(ingredients)
    }

    async fn list_ingredients(&mut self) -> Result<Vec<Ingredient>, CoreError> {
        let ingredients = IngredientEntity::find()
            .order_by_asc(IngredientColumn::Name)
            .all(&self.txn)
            .await
            .map_err(db_error("list ingredients"))?
            .into_iter()
            .map(Ingredient::from)
            .collect();

        Ok(ingredients)
    }

    async fn find_ingredient_by_name(&mut self, name: &str) -> Result<Option<Ingredient>, CoreError> {
        let ingredient = IngredientEntity::find()
            .filter(IngredientColumn::Name.eq(name))
            .one(&self.txn)
            .await
            .map_err(db_error("fetch ingredient by name"))?
            .map(Ingredient::from);

        Ok(ingredient)
    }

    async fn insert_ingredient(&mut self, ingredient: Ingredient) -> Result<Ingredient, CoreError> {
        let ingredient = IngredientEntity::insert(IngredientActiveModel {
            id: Set(ingredient.id),
            name: Set(ingredient.name),
            description: Set(ingredient.description),
            hazard_level: Set(ingredient.hazard_level),
        })
        .exec_with_returning(&self.txn)
        .await
        .map(Ingredient::from)
        .map_err(db_error("create ingredient"))?;

        Ok(ingredient)
    }

    async fn get_food(&mut self, food_id: Uuid) -> Result<Option<Food>, CoreError> {
        self.load_food(food_id, false).await
    }

    async fn lock_food(&mut self, food_id: Uuid) -> Result<Option<Food>, CoreError> {
        self.load_food(food_id, true).await
    }

    async fn list_foods(&mut self, filter: FoodFilter) -> Result<Vec<Food>, CoreError> {
        let mut query = FoodEntity::find();

        if let Some(restaurant_id) = filter.restaurant_id {
            query = query.filter(FoodColumn::RestaurantId.eq(restaurant_id));
        }

        if let Some(is_approved) = filter.is_approved {
            query = query.filter(FoodColumn::IsApproved.eq(is_approved));
        }

        let models = query
            .order_by_asc(FoodColumn::CreatedDate)
            .order_by_asc(FoodColumn::Id)
            .all(&self.txn)
            .await
            .map_err(db_error("list foods"))?;

        self.hydrate_foods(models).await
    }

    async fn insert_food(&mut self, food: Food) -> Result<Food, CoreError> {
        FoodEntity::insert(Self::food_active_model(&food)?)
            .exec_without_returning(&self.txn)
            .await
            .map_err(db_error("create food"))?;

        self.replace_food_ingredients(food.id, &food.ingredient_ids)
            .await?;

        if !food.approved_supervisors.is_empty() {
            let now = Utc::now().fixed_offset();
            let approvals = food
                .approved_supervisors
                .iter()
                .map(|user_id| FoodApprovalActiveModel {
                    food_id: Set(food.id),
                    user_id: Set(*user_id),
                    approved_at: Set(now),
                });

            FoodApprovalEntity::insert_many(approvals)
                .exec_without_returning(&self.txn)
                .await
                .map_err(db_error("record food approvals"))?;
        }

        Ok(food)
    }

    async fn update_food(&mut self, food: Food) -> Result<Food, CoreError> {
        let result = FoodEntity::update_many()
            .set(Self::food_active_model(&food)?)
            .filter(FoodColumn::Id.eq(food.id))
            .exec(&self.txn)
            .await
            .map_err(db_error("update food"))?;

        if result.rows_affected == 0 {
            return Err(CoreError::NotFound);
        }

        self.replace_food_ingredients(food.id, &food.ingredient_ids)
            .await?;

        Ok(food)
    }

    async fn delete_food(&mut self, food_id: Uuid) -> Result<(), CoreError> {
        FoodEntity::delete_by_id(food_id)
            .exec(&self.txn)
            .await
            .map_err(db_error("delete food"))?;

        Ok(())
    }

    async fn add_food_approval(&mut self, food_id: Uuid, user_id: Uuid) -> Result<usize, CoreError> {
        FoodApprovalEntity::insert(FoodApprovalActiveModel {
            food_id: Set(food_id),
            user_id: Set(user_id),
            approved_at: Set(Utc::now().fixed_offset()),
        })
        .on_conflict(
            OnConflict::columns([FoodApprovalColumn::FoodId, FoodApprovalColumn::UserId])
                .do_nothing()
                .to_owned(),
        )
        .exec_without_returning(&self.txn)
        .await
        .map_err(db_error("record food approval"))?;

        let approvals = FoodApprovalEntity::find()
            .filter(FoodApprovalColumn::FoodId.eq(food_id))
            .count(&self.txn)
            .await
            .map_err(db_error("count food approvals"))?;

        Ok(approvals as usize)
    }
}
