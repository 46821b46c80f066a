use std::future::Future;

use uuid::Uuid;

use crate::domain::{
    authentication::value_objects::Identity,
    common::entities::app_errors::CoreError,
    proposal::{
        entities::ChangeProposal,
        value_objects::{PendingProposalFilter, ProposalView, SubmitChangeInput, SubmitRemovalInput},
    },
};

/// Proposal ledger side of a store transaction.
pub trait ProposalRepository: Send {
    /// Stores the proposal together with its initial vote set.
    fn insert_proposal(
        &mut self,
        proposal: ChangeProposal,
    ) -> impl Future<Output = Result<ChangeProposal, CoreError>> + Send;

    fn get_proposal(
        &mut self,
        proposal_id: Uuid,
    ) -> impl Future<Output = Result<Option<ChangeProposal>, CoreError>> + Send;

    /// Loads the proposal and holds a write lock on it until the transaction
    /// ends, so concurrent voters on the same proposal run one after another.
    fn lock_proposal(
        &mut self,
        proposal_id: Uuid,
    ) -> impl Future<Output = Result<Option<ChangeProposal>, CoreError>> + Send;

    /// The non-approved deletion proposal targeting `food_id`, if any.
    fn find_active_removal(
        &mut self,
        food_id: Uuid,
    ) -> impl Future<Output = Result<Option<ChangeProposal>, CoreError>> + Send;

    /// Adds `user_id` to the vote set and returns the number of distinct
    /// voters. Voting twice leaves the set unchanged.
    fn add_proposal_vote(
        &mut self,
        proposal_id: Uuid,
        user_id: Uuid,
    ) -> impl Future<Output = Result<usize, CoreError>> + Send;

    /// Persists approval state: `new_is_approved`, `updated_by`,
    /// `updated_date`, `applied_at` and `apply_error`.
    fn update_proposal_state(
        &mut self,
        proposal: &ChangeProposal,
    ) -> impl Future<Output = Result<(), CoreError>> + Send;

    /// Non-approved proposals, oldest first.
    fn list_pending_proposals(
        &mut self,
        filter: PendingProposalFilter,
    ) -> impl Future<Output = Result<Vec<ChangeProposal>, CoreError>> + Send;
}

pub trait ProposalService: Send + Sync {
    fn submit_change(
        &self,
        identity: Identity,
        input: SubmitChangeInput,
    ) -> impl Future<Output = Result<ChangeProposal, CoreError>> + Send;

    fn submit_removal(
        &self,
        identity: Identity,
        input: SubmitRemovalInput,
    ) -> impl Future<Output = Result<ChangeProposal, CoreError>> + Send;

    fn list_pending(
        &self,
        filter: PendingProposalFilter,
    ) -> impl Future<Output = Result<Vec<ProposalView>, CoreError>> + Send;

    fn get_proposal(
        &self,
        proposal_id: Uuid,
    ) -> impl Future<Output = Result<ProposalView, CoreError>> + Send;
}
