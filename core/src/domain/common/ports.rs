use std::future::Future;

use crate::domain::{
    catalog::ports::CatalogRepository, common::entities::app_errors::CoreError,
    proposal::ports::ProposalRepository,
};

/// Named savepoints inside an open transaction.
///
/// A statement that fails inside a transaction poisons it: every later
/// statement fails and the final commit discards everything. Rolling back to
/// a savepoint taken before the failure makes the transaction usable again.
pub trait SavepointScope: Send {
    fn savepoint(&mut self, name: &'static str) -> impl Future<Output = Result<(), CoreError>> + Send;

    fn release_savepoint(
        &mut self,
        name: &'static str,
    ) -> impl Future<Output = Result<(), CoreError>> + Send;

    /// Undoes every write made since the savepoint and drops it.
    fn rollback_to_savepoint(
        &mut self,
        name: &'static str,
    ) -> impl Future<Output = Result<(), CoreError>> + Send;
}

/// One atomic unit of work spanning the catalog and the proposal ledger.
///
/// Dropping a transaction without calling [`commit`](Self::commit) discards
/// every write made through it.
pub trait StoreTransaction:
    CatalogRepository + ProposalRepository + SavepointScope + Send + Sized
{
    fn commit(self) -> impl Future<Output = Result<(), CoreError>> + Send;

    fn rollback(self) -> impl Future<Output = Result<(), CoreError>> + Send;
}

pub trait UnitOfWork: Send + Sync {
    type Transaction: StoreTransaction + 'static;

    fn begin(&self) -> impl Future<Output = Result<Self::Transaction, CoreError>> + Send;

    /// Cheap round trip used by readiness checks.
    fn ping(&self) -> impl Future<Output = Result<(), CoreError>> + Send;
}
