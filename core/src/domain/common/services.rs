use crate::domain::common::{ApprovalConfig, policies::FoodwatchPolicy};

/// Entry point of the domain: every `*Service` port is implemented on this
/// type, generic over the store and the audit sink.
#[derive(Clone)]
pub struct Service<S, A> {
    pub(crate) store: S,
    pub(crate) audit: A,
    pub(crate) policy: FoodwatchPolicy,
    pub(crate) approval: ApprovalConfig,
}

impl<S, A> Service<S, A> {
    pub fn new(store: S, audit: A, approval: ApprovalConfig) -> Self {
        Self {
            store,
            audit,
            policy: FoodwatchPolicy,
            approval,
        }
    }

    pub fn approval_config(&self) -> ApprovalConfig {
        self.approval
    }
}
