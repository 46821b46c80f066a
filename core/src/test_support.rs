//! Fixtures shared by the service tests: an in-memory store seeded through the
//! repository ports and an audit sink that records what it receives.

use std::{
    collections::BTreeMap,
    sync::{Arc, Mutex},
};

use uuid::Uuid;

use crate::{
    domain::{
        audit::{entities::AuditEvent, ports::AuditEventSink},
        authentication::value_objects::Identity,
        catalog::{
            entities::{Food, FoodConfig, Ingredient, Restaurant, User},
            ports::CatalogRepository,
        },
        common::{
            ApprovalConfig, generate_uuid_v7,
            ports::{StoreTransaction, UnitOfWork},
            services::Service,
        },
        hazard::aggregator::{compute_food_hazard, recompute_restaurant_hazard},
    },
    infrastructure::memory::InMemoryStore,
};

#[derive(Clone, Debug, Default)]
pub(crate) struct RecordingAuditSink {
    events: Arc<Mutex<Vec<AuditEvent>>>,
}

impl RecordingAuditSink {
    pub(crate) fn events(&self) -> Vec<AuditEvent> {
        self.events.lock().map(|events| events.clone()).unwrap_or_default()
    }

    pub(crate) fn count(&self, predicate: impl Fn(&AuditEvent) -> bool) -> usize {
        self.events().iter().filter(|event| predicate(event)).count()
    }
}

impl AuditEventSink for RecordingAuditSink {
    fn publish(&self, event: AuditEvent) {
        if let Ok(mut events) = self.events.lock() {
            events.push(event);
        }
    }
}

pub(crate) fn service_with<A>(store: &InMemoryStore, audit: A) -> Service<InMemoryStore, A> {
    Service::new(store.clone(), audit, ApprovalConfig::default())
}

pub(crate) fn recording_service(
    store: &InMemoryStore,
) -> (Service<InMemoryStore, RecordingAuditSink>, RecordingAuditSink) {
    let audit = RecordingAuditSink::default();
    (service_with(store, audit.clone()), audit)
}

pub(crate) async fn seed_user(store: &InMemoryStore, username: &str, is_supervisor: bool) -> Identity {
    let mut tx = store.begin().await.expect("begin");
    let user = tx
        .insert_user(User {
            id: generate_uuid_v7(),
            username: username.to_string(),
            is_supervisor,
            is_staff: false,
        })
        .await
        .expect("insert user");
    tx.commit().await.expect("commit");

    Identity::from(&user)
}

pub(crate) async fn seed_restaurant(store: &InMemoryStore, name: &str) -> Restaurant {
    let mut tx = store.begin().await.expect("begin");
    let restaurant = tx
        .insert_restaurant(Restaurant::new(name.to_string(), None, None, None))
        .await
        .expect("insert restaurant");
    tx.commit().await.expect("commit");

    restaurant
}

pub(crate) async fn seed_ingredient(store: &InMemoryStore, name: &str, hazard_level: i16) -> Ingredient {
    let mut tx = store.begin().await.expect("begin");
    let ingredient = tx
        .insert_ingredient(Ingredient::new(name.to_string(), None, hazard_level).expect("valid hazard"))
        .await
        .expect("insert ingredient");
    tx.commit().await.expect("commit");

    ingredient
}

/// Inserts a food with a consistent hazard level and, when `approved`,
/// refreshes the restaurant aggregate the way publication does.
pub(crate) async fn seed_food(
    store: &InMemoryStore,
    restaurant_id: Uuid,
    name: &str,
    ingredient_ids: Vec<Uuid>,
    approved: bool,
) -> Food {
    let mut tx = store.begin().await.expect("begin");

    let mut food = Food::new(FoodConfig {
        restaurant_id,
        name: name.to_string(),
        macro_table: BTreeMap::from([("protein".to_string(), 10.0)]),
        serving_size: 100,
        is_organic: false,
        is_gluten_free: false,
        is_alcohol_free: true,
        is_lactose_free: false,
        image: None,
        ingredient_ids,
        created_by: None,
    });
    food.hazard_level = compute_food_hazard(&mut tx, &food.ingredient_ids)
        .await
        .expect("hazard");
    food.is_approved = approved;

    let food = tx.insert_food(food).await.expect("insert food");
    if approved {
        recompute_restaurant_hazard(&mut tx, restaurant_id)
            .await
            .expect("restaurant hazard");
    }
    tx.commit().await.expect("commit");

    food
}

pub(crate) async fn load_food(store: &InMemoryStore, food_id: Uuid) -> Option<Food> {
    let mut tx = store.begin().await.expect("begin");
    let food = tx.get_food(food_id).await.expect("get food");
    tx.rollback().await.expect("rollback");
    food
}

pub(crate) async fn load_restaurant(store: &InMemoryStore, restaurant_id: Uuid) -> Restaurant {
    let mut tx = store.begin().await.expect("begin");
    let restaurant = tx
        .get_restaurant(restaurant_id)
        .await
        .expect("get restaurant")
        .expect("restaurant exists");
    tx.rollback().await.expect("rollback");
    restaurant
}
