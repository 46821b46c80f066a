use tracing::{info, instrument};

use crate::domain::{
    audit::{entities::AuditEvent, ports::AuditEventSink},
    authentication::value_objects::Identity,
    catalog::{ports::CatalogRepository, value_objects::FoodFilter},
    common::{
        entities::app_errors::CoreError,
        policies::ensure_policy,
        ports::{StoreTransaction, UnitOfWork},
        services::Service,
    },
    hazard::{
        aggregator::{recompute_food_hazard, recompute_restaurant_hazard},
        ports::{HazardReport, HazardService},
    },
};

impl<S, A> HazardService for Service<S, A>
where
    S: UnitOfWork,
    A: AuditEventSink,
{
    #[instrument(skip(self, identity), fields(user_id = %identity.id()))]
    async fn recalculate_all_hazards(&self, identity: Identity) -> Result<HazardReport, CoreError> {
        ensure_policy(
            self.policy.can_run_maintenance(&identity),
            "only supervisors can recalculate hazard levels",
        )?;

        let mut tx = self.store.begin().await?;

        let foods = tx.list_foods(FoodFilter::default()).await?;
        let mut foods_recomputed = 0;
        for food in &foods {
            if recompute_food_hazard(&mut tx, food.id).await?.is_some() {
                foods_recomputed += 1;
            }
        }

        let mut events = Vec::new();
        for restaurant_id in tx.list_restaurant_ids().await? {
            if let Some(hazard_level) = recompute_restaurant_hazard(&mut tx, restaurant_id).await? {
                events.push(AuditEvent::HazardRecomputed {
                    restaurant_id,
                    hazard_level,
                });
            }
        }

        tx.commit().await?;

        let report = HazardReport {
            foods_recomputed,
            restaurants_recomputed: events.len(),
        };
        for event in events {
            self.audit.publish(event);
        }

        info!(
            foods = report.foods_recomputed,
            restaurants = report.restaurants_recomputed,
            "hazard levels recalculated"
        );

        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        infrastructure::memory::InMemoryStore,
        test_support::{
            load_food, load_restaurant, recording_service, seed_food, seed_ingredient,
            seed_restaurant, seed_user,
        },
    };

    #[tokio::test]
    async fn recalculation_repairs_stale_levels() {
        let store = InMemoryStore::new();
        let alice = seed_user(&store, "alice", true).await;
        let restaurant = seed_restaurant(&store, "Taqueria").await;
        let onion = seed_ingredient(&store, "onion", 0).await;
        let lard = seed_ingredient(&store, "lard", 2).await;
        let habanero = seed_ingredient(&store, "habanero", 4).await;
        let food = seed_food(
            &store,
            restaurant.id,
            "Taco",
            vec![habanero.id, lard.id, onion.id],
            true,
        )
        .await;
        assert_eq!(food.hazard_level, 2.0);

        let mut tx = store.begin().await.expect("begin");
        let mut stale = food.clone();
        stale.hazard_level = 0.0;
        tx.update_food(stale).await.expect("update");
        tx.set_restaurant_hazard_level(restaurant.id, 3.9)
            .await
            .expect("set");
        tx.commit().await.expect("commit");

        let (service, audit) = recording_service(&store);
        let report = service
            .recalculate_all_hazards(alice)
            .await
            .expect("recalculated");

        assert_eq!(
            report,
            HazardReport {
                foods_recomputed: 1,
                restaurants_recomputed: 1,
            }
        );
        assert_eq!(load_food(&store, food.id).await.map(|f| f.hazard_level), Some(2.0));
        assert_eq!(load_restaurant(&store, restaurant.id).await.hazard_level, 2.0);
        assert_eq!(
            audit.events(),
            vec![AuditEvent::HazardRecomputed {
                restaurant_id: restaurant.id,
                hazard_level: 2.0,
            }]
        );
    }

    #[tokio::test]
    async fn recalculation_requires_a_supervisor() {
        let store = InMemoryStore::new();
        let member = seed_user(&store, "member", false).await;
        let (service, _) = recording_service(&store);

        assert!(matches!(
            service.recalculate_all_hazards(member).await,
            Err(CoreError::Forbidden(_))
        ));
    }
}
