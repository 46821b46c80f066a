use crate::{
    domain::common::{FoodwatchConfig, services::Service},
    infrastructure::{
        audit::TracingAuditSink,
        postgres::{Postgres, PostgresConfig, PostgresStore},
    },
};

pub type FoodwatchService = Service<PostgresStore, TracingAuditSink>;

pub async fn create_service(config: FoodwatchConfig) -> Result<FoodwatchService, anyhow::Error> {
    let postgres = Postgres::new(PostgresConfig {
        database_url: config.database.url(),
        run_migrations: config.database.run_migrations,
    })
    .await?;

    Ok(Service::new(
        PostgresStore::new(postgres.get_db()),
        TracingAuditSink,
        config.approval,
    ))
}
