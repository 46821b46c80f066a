use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::proposal::entities::ProposalKind;

/// Structured events emitted for observability once the transaction that
/// produced them has committed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AuditEvent {
    ProposalSubmitted {
        proposal_id: Uuid,
        food_id: Uuid,
        kind: ProposalKind,
        submitted_by: Uuid,
    },
    VoteRecorded {
        proposal_id: Uuid,
        voter: Uuid,
        votes: usize,
        required: usize,
    },
    ProposalApproved {
        proposal_id: Uuid,
        food_id: Uuid,
        kind: ProposalKind,
    },
    ApplyFailed {
        proposal_id: Uuid,
        food_id: Option<Uuid>,
        reason: String,
    },
    FoodPublished {
        food_id: Uuid,
        restaurant_id: Uuid,
    },
    HazardRecomputed {
        restaurant_id: Uuid,
        hazard_level: f64,
    },
}
