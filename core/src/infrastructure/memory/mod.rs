//! In-process [`UnitOfWork`] used by tests and local runs without Postgres.
//!
//! A transaction holds the store mutex for its whole lifetime and stages its
//! writes on a private copy, so transactions are fully serialised and a
//! dropped transaction leaves no trace.
//!
//! An injected fault poisons the transaction the way a failed statement does
//! in Postgres: unless the caller rolls back to an earlier savepoint, the
//! commit succeeds but discards every staged write.

use std::{
    collections::HashMap,
    sync::{
        Arc,
        atomic::{AtomicBool, AtomicU32, Ordering},
    },
};

use tokio::sync::{Mutex, OwnedMutexGuard};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::domain::{
    catalog::entities::{Food, Ingredient, Restaurant, User},
    common::{
        entities::app_errors::CoreError,
        ports::{SavepointScope, StoreTransaction, UnitOfWork},
    },
    proposal::entities::ChangeProposal,
};

mod catalog_repository;
mod proposal_repository;

#[derive(Clone, Debug, Default)]
pub(crate) struct MemoryState {
    pub(crate) users: HashMap<Uuid, User>,
    pub(crate) restaurants: HashMap<Uuid, Restaurant>,
    pub(crate) ingredients: HashMap<Uuid, Ingredient>,
    pub(crate) foods: HashMap<Uuid, Food>,
    pub(crate) proposals: HashMap<Uuid, ChangeProposal>,
}

#[derive(Debug, Default)]
pub(crate) struct Faults {
    pub(crate) fail_food_writes: AtomicBool,
    pub(crate) fail_hazard_writes: AtomicBool,
    pub(crate) vote_conflicts: AtomicU32,
}

impl Faults {
    pub(crate) fn check_food_write(&self) -> Result<(), CoreError> {
        if self.fail_food_writes.load(Ordering::SeqCst) {
            return Err(CoreError::InternalServerError);
        }
        Ok(())
    }

    pub(crate) fn check_hazard_write(&self) -> Result<(), CoreError> {
        if self.fail_hazard_writes.load(Ordering::SeqCst) {
            return Err(CoreError::InternalServerError);
        }
        Ok(())
    }

    pub(crate) fn check_vote(&self) -> Result<(), CoreError> {
        let injected = self
            .vote_conflicts
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1));

        match injected {
            Ok(_) => Err(CoreError::TransactionConflict),
            Err(_) => Ok(()),
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct InMemoryStore {
    state: Arc<Mutex<MemoryState>>,
    faults: Arc<Faults>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every food update and deletion fail with `InternalServerError`.
    pub fn fail_food_writes(&self, fail: bool) {
        self.faults.fail_food_writes.store(fail, Ordering::SeqCst);
    }

    /// Makes every restaurant hazard update fail with `InternalServerError`.
    pub fn fail_hazard_writes(&self, fail: bool) {
        self.faults.fail_hazard_writes.store(fail, Ordering::SeqCst);
    }

    /// The next `count` proposal votes fail with `TransactionConflict`.
    pub fn inject_vote_conflicts(&self, count: u32) {
        self.faults.vote_conflicts.store(count, Ordering::SeqCst);
    }
}

impl UnitOfWork for InMemoryStore {
    type Transaction = InMemoryTransaction;

    async fn begin(&self) -> Result<InMemoryTransaction, CoreError> {
        let guard = self.state.clone().lock_owned().await;
        let staged = guard.clone();

        Ok(InMemoryTransaction {
            guard,
            staged,
            savepoints: Vec::new(),
            aborted: false,
            faults: self.faults.clone(),
        })
    }

    async fn ping(&self) -> Result<(), CoreError> {
        Ok(())
    }
}

pub struct InMemoryTransaction {
    guard: OwnedMutexGuard<MemoryState>,
    pub(crate) staged: MemoryState,
    savepoints: Vec<Savepoint>,
    aborted: bool,
    faults: Arc<Faults>,
}

struct Savepoint {
    name: &'static str,
    staged: MemoryState,
}

impl InMemoryTransaction {
    /// Runs an injected fault check, poisoning the transaction when it fires.
    pub(crate) fn check_fault(
        &mut self,
        check: fn(&Faults) -> Result<(), CoreError>,
    ) -> Result<(), CoreError> {
        let result = check(&self.faults);
        if result.is_err() {
            self.aborted = true;
        }
        result
    }

    fn savepoint_position(&self, name: &'static str) -> Result<usize, CoreError> {
        self.savepoints
            .iter()
            .rposition(|savepoint| savepoint.name == name)
            .ok_or_else(|| CoreError::Invalid(format!("no savepoint named '{name}'")))
    }
}

impl SavepointScope for InMemoryTransaction {
    async fn savepoint(&mut self, name: &'static str) -> Result<(), CoreError> {
        if self.aborted {
            return Err(CoreError::InternalServerError);
        }

        self.savepoints.push(Savepoint {
            name,
            staged: self.staged.clone(),
        });
        Ok(())
    }

    async fn release_savepoint(&mut self, name: &'static str) -> Result<(), CoreError> {
        if self.aborted {
            return Err(CoreError::InternalServerError);
        }

        let position = self.savepoint_position(name)?;
        self.savepoints.truncate(position);
        Ok(())
    }

    async fn rollback_to_savepoint(&mut self, name: &'static str) -> Result<(), CoreError> {
        let position = self.savepoint_position(name)?;
        if let Some(savepoint) = self.savepoints.drain(position..).next() {
            self.staged = savepoint.staged;
            self.aborted = false;
        }
        Ok(())
    }
}

impl StoreTransaction for InMemoryTransaction {
    async fn commit(mut self) -> Result<(), CoreError> {
        if self.aborted {
            warn!("in-memory transaction was aborted, commit discards its writes");
            return Ok(());
        }

        *self.guard = self.staged;
        Ok(())
    }

    async fn rollback(self) -> Result<(), CoreError> {
        debug!("in-memory transaction rolled back");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::catalog::ports::CatalogRepository;

    async fn restaurant_count(store: &InMemoryStore) -> usize {
        let mut tx = store.begin().await.expect("begin");
        tx.list_restaurant_ids().await.expect("list").len()
    }

    #[tokio::test]
    async fn dropped_transaction_discards_writes() {
        let store = InMemoryStore::new();
        let restaurant = Restaurant::new("Bistro".to_string(), None, None, None);

        {
            let mut tx = store.begin().await.expect("begin");
            tx.insert_restaurant(restaurant.clone()).await.expect("insert");
        }

        let mut tx = store.begin().await.expect("begin");
        assert_eq!(tx.get_restaurant(restaurant.id).await, Ok(None));

        tx.insert_restaurant(restaurant.clone()).await.expect("insert");
        tx.commit().await.expect("commit");

        let mut tx = store.begin().await.expect("begin");
        assert_eq!(tx.get_restaurant(restaurant.id).await, Ok(Some(restaurant)));
    }

    #[tokio::test]
    async fn rollback_to_savepoint_restores_a_committable_transaction() {
        let store = InMemoryStore::new();
        let kept = Restaurant::new("Kept".to_string(), None, None, None);
        let undone = Restaurant::new("Undone".to_string(), None, None, None);

        let mut tx = store.begin().await.expect("begin");
        tx.insert_restaurant(kept.clone()).await.expect("insert");
        tx.savepoint("partial").await.expect("savepoint");
        tx.insert_restaurant(undone.clone()).await.expect("insert");

        store.fail_hazard_writes(true);
        let failed = tx.set_restaurant_hazard_level(kept.id, 3.0).await;
        assert_eq!(failed, Err(CoreError::InternalServerError));
        store.fail_hazard_writes(false);

        tx.rollback_to_savepoint("partial").await.expect("rollback to savepoint");
        tx.commit().await.expect("commit");

        let mut tx = store.begin().await.expect("begin");
        assert_eq!(tx.get_restaurant(kept.id).await, Ok(Some(kept)));
        assert_eq!(tx.get_restaurant(undone.id).await, Ok(None));
    }

    #[tokio::test]
    async fn failed_statement_without_savepoint_discards_the_commit() {
        let store = InMemoryStore::new();
        let restaurant = Restaurant::new("Bistro".to_string(), None, None, None);

        let mut tx = store.begin().await.expect("begin");
        tx.insert_restaurant(restaurant.clone()).await.expect("insert");

        store.fail_hazard_writes(true);
        assert!(tx.set_restaurant_hazard_level(restaurant.id, 1.0).await.is_err());
        assert_eq!(
            tx.savepoint("late").await,
            Err(CoreError::InternalServerError)
        );

        tx.commit().await.expect("commit reports success");
        assert_eq!(restaurant_count(&store).await, 0);
    }

    #[tokio::test]
    async fn unknown_savepoint_is_rejected() {
        let store = InMemoryStore::new();
        let mut tx = store.begin().await.expect("begin");

        assert!(matches!(
            tx.release_savepoint("missing").await,
            Err(CoreError::Invalid(_))
        ));
    }
}
