use std::time::Instant;

use tracing::error;

use crate::domain::{
    audit::ports::AuditEventSink,
    common::{entities::app_errors::CoreError, ports::UnitOfWork, services::Service},
    health::{entities::DatabaseHealthStatus, ports::HealthCheckService},
};

impl<S, A> HealthCheckService for Service<S, A>
where
    S: UnitOfWork,
    A: AuditEventSink,
{
    async fn readiness(&self) -> Result<DatabaseHealthStatus, CoreError> {
        let start = Instant::now();

        self.store.ping().await.map_err(|e| {
            error!("Database readiness check failed: {}", e);
            e
        })?;

        Ok(DatabaseHealthStatus {
            status: "UP".to_string(),
            response_time_ms: start.elapsed().as_millis() as u64,
        })
    }
}
