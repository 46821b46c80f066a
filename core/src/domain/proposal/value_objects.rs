use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::domain::proposal::entities::{ChangeProposal, ProposalKind, ProposalStatus};

/// Fields an edit proposal may set. Anything left `None` keeps the food's
/// current value.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct ProposedFoodFields {
    pub restaurant_id: Option<Uuid>,
    pub name: Option<String>,
    pub macro_table: Option<BTreeMap<String, f64>>,
    pub serving_size: Option<i32>,
    pub is_organic: Option<bool>,
    pub is_gluten_free: Option<bool>,
    pub is_alcohol_free: Option<bool>,
    pub is_lactose_free: Option<bool>,
    pub image: Option<String>,
    pub ingredient_ids: Option<Vec<Uuid>>,
}

#[derive(Debug, Clone)]
pub struct SubmitChangeInput {
    pub food_id: Uuid,
    pub fields: ProposedFoodFields,
    pub reason: Option<String>,
}

#[derive(Debug, Clone)]
pub struct SubmitRemovalInput {
    pub food_id: Uuid,
    pub reason: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct PendingProposalFilter {
    pub kind: Option<ProposalKind>,
    pub offset: Option<u32>,
    pub limit: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ProposalView {
    pub proposal: ChangeProposal,
    pub approved_supervisors_count: usize,
    pub status: ProposalStatus,
}

impl From<ChangeProposal> for ProposalView {
    fn from(proposal: ChangeProposal) -> Self {
        Self {
            approved_supervisors_count: proposal.vote_count(),
            status: proposal.status(),
            proposal,
        }
    }
}
