use sea_orm::{DbErr, RuntimeErr};
use tracing::{error, warn};

use crate::domain::common::entities::app_errors::CoreError;

const SERIALIZATION_FAILURE: &str = "40001";
const DEADLOCK_DETECTED: &str = "40P01";
const UNIQUE_VIOLATION: &str = "23505";

fn sqlstate(e: &DbErr) -> Option<String> {
    let runtime = match e {
        DbErr::Exec(runtime) | DbErr::Query(runtime) | DbErr::Conn(runtime) => runtime,
        _ => return None,
    };

    match runtime {
        RuntimeErr::SqlxError(err) => err
            .as_database_error()
            .and_then(|db| db.code())
            .map(|code| code.into_owned()),
        _ => None,
    }
}

/// Logs a database failure and converts it into a [`CoreError`].
///
/// Serialization failures, deadlocks and pool exhaustion become
/// `TransactionConflict` so callers may retry; unique violations become
/// `Conflict`.
pub(crate) fn db_error(context: &'static str) -> impl FnOnce(DbErr) -> CoreError {
    move |e| {
        if matches!(e, DbErr::ConnectionAcquire(_)) {
            warn!("Failed to {}: connection pool exhausted: {}", context, e);
            return CoreError::TransactionConflict;
        }

        match sqlstate(&e).as_deref() {
            Some(SERIALIZATION_FAILURE) | Some(DEADLOCK_DETECTED) => {
                warn!("Failed to {}: transaction conflict: {}", context, e);
                CoreError::TransactionConflict
            }
            Some(UNIQUE_VIOLATION) => {
                warn!("Failed to {}: unique constraint violated: {}", context, e);
                CoreError::Conflict(format!("could not {context}: record already exists"))
            }
            _ => {
                error!("Failed to {}: {}", context, e);
                CoreError::InternalServerError
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_errors_are_internal() {
        let err = db_error("load food")(DbErr::Custom("boom".to_string()));
        assert_eq!(err, CoreError::InternalServerError);
    }

    #[test]
    fn record_not_found_is_internal() {
        let err = db_error("update food")(DbErr::RecordNotFound("foods".to_string()));
        assert_eq!(err, CoreError::InternalServerError);
    }
}
