use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CoreError {
    #[error("Not found")]
    NotFound,

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Unknown ingredient ids: {}", format_ids(.ids))]
    InvalidIngredientReference { ids: Vec<Uuid> },

    #[error("A removal proposal is already active for this food ({existing})")]
    DuplicateProposal { existing: Uuid },

    #[error("Proposal has already been approved")]
    AlreadyApplied,

    #[error("Proposal {proposal_id} was approved but its target food no longer exists")]
    TargetGone { proposal_id: Uuid },

    #[error("Invalid input: {0}")]
    Invalid(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Transaction conflict")]
    TransactionConflict,

    #[error("Internal server error")]
    InternalServerError,
}

impl CoreError {
    /// Errors worth another attempt at the transaction boundary.
    pub fn is_transient(&self) -> bool {
        matches!(self, CoreError::TransactionConflict)
    }
}

fn format_ids(ids: &[Uuid]) -> String {
    ids.iter()
        .map(Uuid::to_string)
        .collect::<Vec<String>>()
        .join(", ")
}
