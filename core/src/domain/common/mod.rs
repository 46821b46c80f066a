use chrono::{DateTime, Utc};
use uuid::{NoContext, Timestamp, Uuid};

pub mod entities;
pub mod policies;
pub mod ports;
pub mod services;

/// Number of distinct supervisor votes that approves a change proposal.
pub const DEFAULT_REQUIRED_APPROVALS: usize = 2;

/// Number of distinct supervisor approvals that publishes a newly created food.
pub const DEFAULT_REQUIRED_FOOD_APPROVALS: usize = 2;

/// Attempts made by `cast_vote` when the store reports a transaction conflict.
pub const DEFAULT_VOTE_ATTEMPTS: u32 = 3;

#[derive(Clone, Debug)]
pub struct FoodwatchConfig {
    pub database: DatabaseConfig,
    pub approval: ApprovalConfig,
}

#[derive(Clone, Debug)]
pub struct DatabaseConfig {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: String,
    pub name: String,
    pub run_migrations: bool,
}

impl DatabaseConfig {
    pub fn url(&self) -> String {
        format!(
            "postgres://{}:{}@{}:{}/{}",
            self.username, self.password, self.host, self.port, self.name
        )
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ApprovalConfig {
    pub required_approvals: usize,
    pub required_food_approvals: usize,
    pub vote_attempts: u32,
}

impl Default for ApprovalConfig {
    fn default() -> Self {
        Self {
            required_approvals: DEFAULT_REQUIRED_APPROVALS,
            required_food_approvals: DEFAULT_REQUIRED_FOOD_APPROVALS,
            vote_attempts: DEFAULT_VOTE_ATTEMPTS,
        }
    }
}

pub fn generate_timestamp() -> (DateTime<Utc>, Timestamp) {
    let now = Utc::now();
    let seconds = now.timestamp().try_into().unwrap_or(0);
    let timestamp = Timestamp::from_unix(NoContext, seconds, now.timestamp_subsec_nanos());

    (now, timestamp)
}

pub fn generate_uuid_v7() -> Uuid {
    let (_, timestamp) = generate_timestamp();
    Uuid::new_v7(timestamp)
}
