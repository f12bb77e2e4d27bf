//! Shared Diesel error mapping for the repositories.
//!
//! Each repository supplies constructors for its own port error; the helpers
//! decide which one applies and log the underlying cause at debug level.

use diesel::result::{DatabaseErrorInformation, DatabaseErrorKind, Error as DieselError};
use tracing::debug;

use crate::domain::ports::UserPersistenceError;

use super::pool::PoolError;

/// Map pool errors into a repository-specific connection error constructor.
pub(super) fn map_pool_error<E, C>(error: PoolError, connection: C) -> E
where
    C: FnOnce(String) -> E,
{
    let message = match error {
        PoolError::Checkout { message } | PoolError::Build { message } => message,
    };
    connection(message)
}

fn log_diesel_error(error: &DieselError) {
    match error {
        DieselError::DatabaseError(kind, info) => {
            debug!(
                ?kind,
                message = info.message(),
                constraint = info.constraint_name(),
                "diesel operation failed"
            );
        }
        _ => debug!(
            error_type = %std::any::type_name_of_val(error),
            %error,
            "diesel operation failed"
        ),
    }
}

/// Map Diesel errors into query/connection constructors.
pub(super) fn map_diesel_error<E, Q, C>(error: DieselError, query: Q, connection: C) -> E
where
    Q: Fn(&'static str) -> E,
    C: Fn(&'static str) -> E,
{
    log_diesel_error(&error);
    match error {
        DieselError::NotFound => query("record not found"),
        DieselError::QueryBuilderError(_) => query("database query error"),
        DieselError::DatabaseError(DatabaseErrorKind::ClosedConnection, _) => {
            connection("database connection error")
        }
        _ => query("database error"),
    }
}

/// Account field guarded by a unique constraint.
fn duplicate_user_field(info: &dyn DatabaseErrorInformation) -> Option<&'static str> {
    let constraint = info.constraint_name().unwrap_or_default();
    if constraint.contains("email") {
        Some("email")
    } else if constraint.contains("username") {
        Some("username")
    } else {
        None
    }
}

/// Map Diesel errors for the users table, recognising duplicate accounts.
pub(super) fn map_user_diesel_error(error: DieselError) -> UserPersistenceError {
    if let DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, info) = &error {
        if let Some(field) = duplicate_user_field(info.as_ref()) {
            log_diesel_error(&error);
            return UserPersistenceError::duplicate(field);
        }
    }
    map_diesel_error(
        error,
        UserPersistenceError::query,
        UserPersistenceError::connection,
    )
}
