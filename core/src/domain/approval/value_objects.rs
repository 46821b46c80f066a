use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::domain::proposal::entities::ProposalKind;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum VoteResult {
    /// The vote was stored; the proposal is still pending.
    Recorded {
        proposal_id: Uuid,
        votes: usize,
        required: usize,
    },
    /// This vote reached quorum and the proposal has been applied.
    Applied {
        proposal_id: Uuid,
        votes: usize,
        kind: ProposalKind,
    },
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct PendingChangesReport {
    pub applied: usize,
    pub failed: usize,
}
