use uuid::Uuid;

use crate::domain::{
    catalog::{
        entities::{Food, Ingredient, Restaurant, User},
        ports::CatalogRepository,
        value_objects::FoodFilter,
    },
    common::entities::app_errors::CoreError,
};

use super::{Faults, InMemoryTransaction};

impl CatalogRepository for InMemoryTransaction {
    async fn get_user(&mut self, user_id: Uuid) -> Result<Option<User>, CoreError> {
        Ok(self.staged.users.get(&user_id).cloned())
    }

    async fn insert_user(&mut self, user: User) -> Result<User, CoreError> {
        if self
            .staged
            .users
            .values()
            .any(|existing| existing.username == user.username)
        {
            return Err(CoreError::Conflict(format!(
                "username '{}' is taken",
                user.username
            )));
        }

        self.staged.users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn get_restaurant(&mut self, restaurant_id: Uuid) -> Result<Option<Restaurant>, CoreError> {
        Ok(self.staged.restaurants.get(&restaurant_id).cloned())
    }

    async fn find_restaurant_by_name(&mut self, name: &str) -> Result<Option<Restaurant>, CoreError> {
        let name = name.to_lowercase();

        Ok(self
            .staged
            .restaurants
            .values()
            .find(|restaurant| restaurant.name.to_lowercase() == name)
            .cloned())
    }

    async fn insert_restaurant(&mut self, restaurant: Restaurant) -> Result<Restaurant, CoreError> {
        if self.find_restaurant_by_name(&restaurant.name).await?.is_some() {
            return Err(CoreError::Conflict(format!(
                "restaurant '{}' already exists",
                restaurant.name
            )));
        }

        self.staged
            .restaurants
            .insert(restaurant.id, restaurant.clone());
        Ok(restaurant)
    }

    async fn list_restaurant_ids(&mut self) -> Result<Vec<Uuid>, CoreError> {
        let mut ids = self.staged.restaurants.keys().copied().collect::<Vec<Uuid>>();
        ids.sort();
        Ok(ids)
    }

    async fn set_restaurant_hazard_level(
        &mut self,
        restaurant_id: Uuid,
        hazard_level: f64,
    ) -> Result<bool, CoreError> {
        self.check_fault(Faults::check_hazard_write)?;

        match self.staged.restaurants.get_mut(&restaurant_id) {
            Some(restaurant) => {
                restaurant.hazard_level = hazard_level;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn get_ingredients(&mut self, ids: &[Uuid]) -> Result<Vec<Ingredient>, CoreError> {
        Ok(ids
            .iter()
            .filter_map(|id| self.staged.ingredients.get(id).cloned())
            .collect())
    }

    async fn list_ingredients(&mut self) -> Result<Vec<Ingredient>, CoreError> {
        let mut ingredients = self
            .staged
            .ingredients
            .values()
            .cloned()
            .collect::<Vec<Ingredient>>();
        ingredients.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(ingredients)
    }

    async fn find_ingredient_by_name(&mut self, name: &str) -> Result<Option<Ingredient>, CoreError> {
        Ok(self
            .staged
            .ingredients
            .values()
            .find(|ingredient| ingredient.name == name)
            .cloned())
    }

    async fn insert_ingredient(&mut self, ingredient: Ingredient) -> Result<Ingredient, CoreError> {
        if self.find_ingredient_by_name(&ingredient.name).await?.is_some() {
            return Err(CoreError::Conflict(format!(
                "ingredient '{}' already exists",
                ingredient.name
            )));
        }

        self.staged
            .ingredients
            .insert(ingredient.id, ingredient.clone());
        Ok(ingredient)
    }

    async fn get_food(&mut self, food_id: Uuid) -> Result<Option<Food>, CoreError> {
        Ok(self.staged.foods.get(&food_id).cloned())
    }

    async fn lock_food(&mut self, food_id: Uuid) -> Result<Option<Food>, CoreError> {
        self.get_food(food_id).await
    }

    async fn list_foods(&mut self, filter: FoodFilter) -> Result<Vec<Food>, CoreError> {
        let mut foods = self
            .staged
            .foods
            .values()
            .filter(|food| {
                filter
                    .restaurant_id
                    .is_none_or(|restaurant_id| food.restaurant_id == restaurant_id)
            })
            .filter(|food| {
                filter
                    .is_approved
                    .is_none_or(|is_approved| food.is_approved == is_approved)
            })
            .cloned()
            .collect::<Vec<Food>>();

        foods.sort_by(|a, b| {
            a.created_date
                .cmp(&b.created_date)
                .then_with(|| a.id.cmp(&b.id))
        });
        Ok(foods)
    }

    async fn insert_food(&mut self, food: Food) -> Result<Food, CoreError> {
        if !self.staged.restaurants.contains_key(&food.restaurant_id) {
            return Err(CoreError::NotFound);
        }

        if self
            .staged
            .foods
            .values()
            .any(|existing| existing.restaurant_id == food.restaurant_id && existing.name == food.name)
        {
            return Err(CoreError::Conflict(format!(
                "food '{}' already exists for this restaurant",
                food.name
            )));
        }

        self.staged.foods.insert(food.id, food.clone());
        Ok(food)
    }

    async fn update_food(&mut self, mut food: Food) -> Result<Food, CoreError> {
        self.check_fault(Faults::check_food_write)?;

        let Some(current) = self.staged.foods.get(&food.id) else {
            return Err(CoreError::NotFound);
        };
        let approved_supervisors = current.approved_supervisors.clone();

        if !self.staged.restaurants.contains_key(&food.restaurant_id) {
            return Err(CoreError::NotFound);
        }

        if self.staged.foods.values().any(|existing| {
            existing.id != food.id
                && existing.restaurant_id == food.restaurant_id
                && existing.name == food.name
        }) {
            return Err(CoreError::Conflict(format!(
                "food '{}' already exists for this restaurant",
                food.name
            )));
        }

        food.approved_supervisors = approved_supervisors;

        self.staged.foods.insert(food.id, food.clone());
        Ok(food)
    }

    async fn delete_food(&mut self, food_id: Uuid) -> Result<(), CoreError> {
        self.check_fault(Faults::check_food_write)?;

        if self.staged.foods.remove(&food_id).is_some() {
            for proposal in self.staged.proposals.values_mut() {
                if proposal.old_version == Some(food_id) {
                    proposal.old_version = None;
                }
            }
        }

        Ok(())
    }

    async fn add_food_approval(&mut self, food_id: Uuid, user_id: Uuid) -> Result<usize, CoreError> {
        let food = self
            .staged
            .foods
            .get_mut(&food_id)
            .ok_or(CoreError::NotFound)?;

        if !food.approved_supervisors.contains(&user_id) {
            food.approved_supervisors.push(user_id);
        }

        Ok(food.approved_supervisors.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        domain::common::ports::UnitOfWork,
        infrastructure::memory::InMemoryStore,
        test_support::{seed_food, seed_restaurant},
    };

    #[tokio::test]
    async fn update_food_requires_an_existing_restaurant() {
        let store = InMemoryStore::new();
        let restaurant = seed_restaurant(&store, "Chez A").await;
        let mut food = seed_food(&store, restaurant.id, "Fries", vec![], true).await;

        food.restaurant_id = Uuid::new_v4();
        let mut tx = store.begin().await.expect("begin");
        assert_eq!(tx.update_food(food).await, Err(CoreError::NotFound));
    }

    #[tokio::test]
    async fn update_food_rejects_a_name_taken_in_the_restaurant() {
        let store = InMemoryStore::new();
        let restaurant = seed_restaurant(&store, "Chez A").await;
        seed_food(&store, restaurant.id, "Burger", vec![], true).await;
        let mut fries = seed_food(&store, restaurant.id, "Fries", vec![], true).await;

        let mut tx = store.begin().await.expect("begin");
        fries.serving_size = 250;
        tx.update_food(fries.clone())
            .await
            .expect("keeping its own name is allowed");

        fries.name = "Burger".to_string();
        assert!(matches!(
            tx.update_food(fries).await,
            Err(CoreError::Conflict(_))
        ));
    }
}
