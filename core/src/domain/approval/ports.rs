use std::future::Future;

use uuid::Uuid;

use crate::domain::{
    approval::value_objects::{PendingChangesReport, VoteResult},
    authentication::value_objects::Identity,
    common::entities::app_errors::CoreError,
};

pub trait ApprovalService: Send + Sync {
    /// Records a supervisor vote and applies the proposal once quorum is
    /// reached. Either the vote is stored and the proposal is still pending,
    /// or the proposal is approved and applied; a failed application leaves
    /// no trace of the vote.
    fn cast_vote(
        &self,
        identity: Identity,
        proposal_id: Uuid,
    ) -> impl Future<Output = Result<VoteResult, CoreError>> + Send;

    /// Applies pending proposals whose vote count already meets the current
    /// quorum.
    fn process_pending_changes(
        &self,
        identity: Identity,
    ) -> impl Future<Output = Result<PendingChangesReport, CoreError>> + Send;
}
