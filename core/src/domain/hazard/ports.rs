use std::future::Future;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::{
    authentication::value_objects::Identity, common::entities::app_errors::CoreError,
};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct HazardReport {
    pub foods_recomputed: usize,
    pub restaurants_recomputed: usize,
}

pub trait HazardService: Send + Sync {
    /// Recomputes every food and restaurant hazard level in one transaction.
    fn recalculate_all_hazards(
        &self,
        identity: Identity,
    ) -> impl Future<Output = Result<HazardReport, CoreError>> + Send;
}
