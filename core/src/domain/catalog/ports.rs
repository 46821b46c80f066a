use std::future::Future;

use uuid::Uuid;

use crate::domain::{
    authentication::value_objects::Identity,
    catalog::{
        entities::{Food, Ingredient, Restaurant, User},
        value_objects::{
            ApprovableFood, CreateFoodInput, CreateIngredientInput, CreateRestaurantInput,
            FoodApproval, FoodFilter,
        },
    },
    common::entities::app_errors::CoreError,
};

/// Catalog side of a store transaction.
///
/// Every method runs inside the transaction that owns `self`; nothing is
/// visible to other transactions until the surrounding
/// [`StoreTransaction`](crate::domain::common::ports::StoreTransaction) commits.
pub trait CatalogRepository: Send {
    fn get_user(
        &mut self,
        user_id: Uuid,
    ) -> impl Future<Output = Result<Option<User>, CoreError>> + Send;

    fn insert_user(&mut self, user: User) -> impl Future<Output = Result<User, CoreError>> + Send;

    fn get_restaurant(
        &mut self,
        restaurant_id: Uuid,
    ) -> impl Future<Output = Result<Option<Restaurant>, CoreError>> + Send;

    /// Case-insensitive lookup by name.
    fn find_restaurant_by_name(
        &mut self,
        name: &str,
    ) -> impl Future<Output = Result<Option<Restaurant>, CoreError>> + Send;

    fn insert_restaurant(
        &mut self,
        restaurant: Restaurant,
    ) -> impl Future<Output = Result<Restaurant, CoreError>> + Send;

    fn list_restaurant_ids(&mut self) -> impl Future<Output = Result<Vec<Uuid>, CoreError>> + Send;

    /// Returns `false` when the restaurant does not exist.
    fn set_restaurant_hazard_level(
        &mut self,
        restaurant_id: Uuid,
        hazard_level: f64,
    ) -> impl Future<Output = Result<bool, CoreError>> + Send;

    /// Returns the ingredients among `ids` that exist; unknown ids are skipped.
    fn get_ingredients(
        &mut self,
        ids: &[Uuid],
    ) -> impl Future<Output = Result<Vec<Ingredient>, CoreError>> + Send;

    fn list_ingredients(&mut self)
    -> impl Future<Output = Result<Vec<Ingredient>, CoreError>> + Send;

    fn find_ingredient_by_name(
        &mut self,
        name: &str,
    ) -> impl Future<Output = Result<Option<Ingredient>, CoreError>> + Send;

    fn insert_ingredient(
        &mut self,
        ingredient: Ingredient,
    ) -> impl Future<Output = Result<Ingredient, CoreError>> + Send;

    fn get_food(
        &mut self,
        food_id: Uuid,
    ) -> impl Future<Output = Result<Option<Food>, CoreError>> + Send;

    /// Like [`get_food`](Self::get_food) but holds a write lock on the row
    /// until the transaction ends.
    fn lock_food(
        &mut self,
        food_id: Uuid,
    ) -> impl Future<Output = Result<Option<Food>, CoreError>> + Send;

    fn list_foods(
        &mut self,
        filter: FoodFilter,
    ) -> impl Future<Output = Result<Vec<Food>, CoreError>> + Send;

    fn insert_food(&mut self, food: Food) -> impl Future<Output = Result<Food, CoreError>> + Send;

    /// Overwrites every column of the food and replaces its ingredient links.
    /// Supervisor approvals are left untouched.
    fn update_food(&mut self, food: Food) -> impl Future<Output = Result<Food, CoreError>> + Send;

    /// Deletes the food together with its ingredient links and approvals.
    fn delete_food(&mut self, food_id: Uuid) -> impl Future<Output = Result<(), CoreError>> + Send;

    /// Adds a supervisor approval and returns the number of distinct approvals.
    fn add_food_approval(
        &mut self,
        food_id: Uuid,
        user_id: Uuid,
    ) -> impl Future<Output = Result<usize, CoreError>> + Send;
}

pub trait CatalogService: Send + Sync {
    fn create_food(
        &self,
        identity: Identity,
        input: CreateFoodInput,
    ) -> impl Future<Output = Result<Food, CoreError>> + Send;

    fn approve_food(
        &self,
        identity: Identity,
        food_id: Uuid,
    ) -> impl Future<Output = Result<FoodApproval, CoreError>> + Send;

    fn list_approvable_foods(
        &self,
        identity: Identity,
    ) -> impl Future<Output = Result<Vec<ApprovableFood>, CoreError>> + Send;

    fn get_food(&self, food_id: Uuid) -> impl Future<Output = Result<Food, CoreError>> + Send;

    fn list_foods(
        &self,
        filter: FoodFilter,
    ) -> impl Future<Output = Result<Vec<Food>, CoreError>> + Send;

    fn get_restaurant(
        &self,
        restaurant_id: Uuid,
    ) -> impl Future<Output = Result<Restaurant, CoreError>> + Send;

    fn create_restaurant(
        &self,
        identity: Identity,
        input: CreateRestaurantInput,
    ) -> impl Future<Output = Result<Restaurant, CoreError>> + Send;

    fn list_ingredients(&self) -> impl Future<Output = Result<Vec<Ingredient>, CoreError>> + Send;

    fn create_ingredient(
        &self,
        identity: Identity,
        input: CreateIngredientInput,
    ) -> impl Future<Output = Result<Ingredient, CoreError>> + Send;
}
