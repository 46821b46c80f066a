use clap::{ArgAction, Parser, builder::RangedU64ValueParser};
use foodwatch_core::domain::common::{
    ApprovalConfig, DEFAULT_REQUIRED_APPROVALS, DEFAULT_REQUIRED_FOOD_APPROVALS,
    DEFAULT_VOTE_ATTEMPTS, DatabaseConfig, FoodwatchConfig,
};

#[derive(Debug, Clone, Parser)]
#[command(name = "foodwatch", version, about = "Crowd-moderated food and restaurant directory")]
pub struct Args {
    #[command(flatten)]
    pub server: ServerArgs,

    #[command(flatten)]
    pub db: DatabaseArgs,

    #[command(flatten)]
    pub approval: ApprovalArgs,

    #[command(flatten)]
    pub log: LogArgs,
}

#[derive(Debug, Clone, clap::Args)]
pub struct ServerArgs {
    #[arg(long = "server-host", env = "SERVER_HOST", default_value = "0.0.0.0")]
    pub host: String,

    #[arg(long = "server-port", env = "SERVER_PORT", default_value_t = 3333)]
    pub port: u16,

    /// Prefix for every route, e.g. `/api`.
    #[arg(long = "server-root-path", env = "SERVER_ROOT_PATH", default_value = "")]
    pub root_path: String,

    #[arg(
        long = "allowed-origins",
        env = "ALLOWED_ORIGINS",
        value_delimiter = ',',
        default_value = "http://localhost:5173"
    )]
    pub allowed_origins: Vec<String>,
}

#[derive(Debug, Clone, clap::Args)]
pub struct DatabaseArgs {
    #[arg(id = "database_host", long = "database-host", env = "DATABASE_HOST", default_value = "localhost")]
    pub host: String,

    #[arg(id = "database_port", long = "database-port", env = "DATABASE_PORT", default_value_t = 5432)]
    pub port: u16,

    #[arg(long = "database-user", env = "DATABASE_USER", default_value = "foodwatch")]
    pub user: String,

    #[arg(long = "database-password", env = "DATABASE_PASSWORD", default_value = "foodwatch")]
    pub password: String,

    #[arg(long = "database-name", env = "DATABASE_NAME", default_value = "foodwatch")]
    pub name: String,

    #[arg(
        long = "database-run-migrations",
        env = "DATABASE_RUN_MIGRATIONS",
        action = ArgAction::Set,
        default_value_t = true
    )]
    pub run_migrations: bool,
}

#[derive(Debug, Clone, clap::Args)]
pub struct ApprovalArgs {
    /// Distinct supervisor votes that approve a change proposal.
    #[arg(
        long = "required-approvals",
        env = "REQUIRED_APPROVALS",
        default_value_t = DEFAULT_REQUIRED_APPROVALS,
        value_parser = RangedU64ValueParser::<usize>::new().range(1..)
    )]
    pub required_approvals: usize,

    /// Distinct supervisor approvals that publish a new food.
    #[arg(
        long = "required-food-approvals",
        env = "REQUIRED_FOOD_APPROVALS",
        default_value_t = DEFAULT_REQUIRED_FOOD_APPROVALS,
        value_parser = RangedU64ValueParser::<usize>::new().range(1..)
    )]
    pub required_food_approvals: usize,

    #[arg(
        long = "vote-attempts",
        env = "VOTE_ATTEMPTS",
        default_value_t = DEFAULT_VOTE_ATTEMPTS,
        value_parser = clap::value_parser!(u32).range(1..)
    )]
    pub vote_attempts: u32,
}

#[derive(Debug, Clone, clap::Args)]
pub struct LogArgs {
    #[arg(long = "log-filter", env = "LOG_FILTER", default_value = "info")]
    pub filter: String,

    #[arg(long = "log-json", env = "LOG_JSON", default_value_t = false)]
    pub json: bool,
}

impl From<Args> for FoodwatchConfig {
    fn from(args: Args) -> Self {
        FoodwatchConfig {
            database: DatabaseConfig {
                host: args.db.host,
                port: args.db.port,
                username: args.db.user,
                password: args.db.password,
                name: args.db.name,
                run_migrations: args.db.run_migrations,
            },
            approval: ApprovalConfig {
                required_approvals: args.approval.required_approvals,
                required_food_approvals: args.approval.required_food_approvals,
                vote_attempts: args.approval.vote_attempts,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn approval_policy_comes_from_flags() {
        let args = Args::try_parse_from([
            "foodwatch",
            "--required-approvals",
            "3",
            "--database-run-migrations",
            "false",
            "--allowed-origins",
            "https://a.example,https://b.example",
        ])
        .expect("valid arguments");

        assert_eq!(
            args.server.allowed_origins,
            vec!["https://a.example", "https://b.example"]
        );

        let config = FoodwatchConfig::from(args);
        assert_eq!(config.approval.required_approvals, 3);
        assert!(!config.database.run_migrations);
    }

    #[test]
    fn zero_quorums_are_rejected() {
        for flag in ["--required-approvals", "--required-food-approvals", "--vote-attempts"] {
            assert!(
                Args::try_parse_from(["foodwatch", flag, "0"]).is_err(),
                "{flag} accepted 0"
            );
        }

        let args = Args::try_parse_from(["foodwatch", "--required-food-approvals", "1"])
            .expect("valid arguments");
        assert_eq!(args.approval.required_food_approvals, 1);
    }
}
