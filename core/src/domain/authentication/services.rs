use uuid::Uuid;

use crate::domain::{
    audit::ports::AuditEventSink,
    authentication::{ports::IdentityService, value_objects::Identity},
    catalog::ports::CatalogRepository,
    common::{
        entities::app_errors::CoreError,
        ports::{StoreTransaction, UnitOfWork},
        services::Service,
    },
};

impl<S, A> IdentityService for Service<S, A>
where
    S: UnitOfWork,
    A: AuditEventSink,
{
    async fn resolve_identity(&self, user_id: Uuid) -> Result<Option<Identity>, CoreError> {
        let mut tx = self.store.begin().await?;
        let user = tx.get_user(user_id).await?;
        tx.rollback().await?;

        Ok(user.as_ref().map(Identity::from))
    }
}
