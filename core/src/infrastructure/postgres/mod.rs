use sea_orm::{
    ConnectOptions, ConnectionTrait, Database, DatabaseConnection, DatabaseTransaction,
    TransactionTrait,
};
use tracing::{error, info};

use crate::domain::common::{
    entities::app_errors::CoreError,
    ports::{SavepointScope, StoreTransaction, UnitOfWork},
};

mod catalog_repository;
mod errors;
pub mod mappers;
mod proposal_repository;

pub(crate) use errors::db_error;

#[derive(Clone, Debug)]
pub struct PostgresConfig {
    pub database_url: String,
    pub run_migrations: bool,
}

#[derive(Clone)]
pub struct Postgres {
    db: DatabaseConnection,
}

impl Postgres {
    pub async fn new(config: PostgresConfig) -> Result<Self, anyhow::Error> {
        let mut options = ConnectOptions::new(config.database_url);
        options.sqlx_logging(false);

        let db = Database::connect(options).await?;

        if config.run_migrations {
            sqlx::migrate!("./migrations")
                .run(db.get_postgres_connection_pool())
                .await?;
            info!("database migrations applied");
        }

        Ok(Self { db })
    }

    pub fn get_db(&self) -> DatabaseConnection {
        self.db.clone()
    }
}

/// [`UnitOfWork`] backed by Postgres transactions.
#[derive(Clone, Debug)]
pub struct PostgresStore {
    db: DatabaseConnection,
}

impl PostgresStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

impl UnitOfWork for PostgresStore {
    type Transaction = PostgresTransaction;

    async fn begin(&self) -> Result<PostgresTransaction, CoreError> {
        let txn = self.db.begin().await.map_err(db_error("begin transaction"))?;

        Ok(PostgresTransaction { txn })
    }

    async fn ping(&self) -> Result<(), CoreError> {
        self.db.ping().await.map_err(|e| {
            error!("Database ping failed: {}", e);
            CoreError::InternalServerError
        })
    }
}

/// Open database transaction. Row locks taken through it are held until
/// commit or rollback; dropping it rolls back.
pub struct PostgresTransaction {
    pub(crate) txn: DatabaseTransaction,
}

impl SavepointScope for PostgresTransaction {
    async fn savepoint(&mut self, name: &'static str) -> Result<(), CoreError> {
        self.txn
            .execute_unprepared(&format!("SAVEPOINT {name}"))
            .await
            .map_err(db_error("create savepoint"))?;
        Ok(())
    }

    async fn release_savepoint(&mut self, name: &'static str) -> Result<(), CoreError> {
        self.txn
            .execute_unprepared(&format!("RELEASE SAVEPOINT {name}"))
            .await
            .map_err(db_error("release savepoint"))?;
        Ok(())
    }

    async fn rollback_to_savepoint(&mut self, name: &'static str) -> Result<(), CoreError> {
        self.txn
            .execute_unprepared(&format!("ROLLBACK TO SAVEPOINT {name}"))
            .await
            .map_err(db_error("roll back to savepoint"))?;
        self.release_savepoint(name).await
    }
}

impl StoreTransaction for PostgresTransaction {
    async fn commit(self) -> Result<(), CoreError> {
        self.txn.commit().await.map_err(db_error("commit transaction"))
    }

    async fn rollback(self) -> Result<(), CoreError> {
        self.txn
            .rollback()
            .await
            .map_err(db_error("rollback transaction"))
    }
}
