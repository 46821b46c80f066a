use std::future::Future;

use uuid::Uuid;

use crate::domain::{
    authentication::value_objects::Identity, common::entities::app_errors::CoreError,
};

pub trait IdentityService: Send + Sync {
    /// Resolves a user id to an [`Identity`]; unknown users yield `None`.
    fn resolve_identity(
        &self,
        user_id: Uuid,
    ) -> impl Future<Output = Result<Option<Identity>, CoreError>> + Send;
}
