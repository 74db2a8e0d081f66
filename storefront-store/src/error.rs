use storefront_core::CoreError;

/// Maps driver failures onto the domain taxonomy. Constraint violations
/// become `Conflict`; everything else is internal.
pub fn db_error(err: sqlx::Error) -> CoreError {
    match &err {
        sqlx::Error::Database(db_err) if db_err.is_unique_violation() => CoreError::Conflict(
            "Integrity error (duplicate or constraint violation).".to_string(),
        ),
        sqlx::Error::Database(db_err) if db_err.is_foreign_key_violation() => {
            CoreError::Conflict("Integrity error (referenced row is missing).".to_string())
        }
        sqlx::Error::Database(db_err) if db_err.is_check_violation() => {
            CoreError::Validation(format!("Constraint check failed: {}", db_err.message()))
        }
        _ => {
            tracing::error!("Database error: {}", err);
            CoreError::Internal(err.to_string())
        }
    }
}

/// Like [`db_error`] but with a caller-chosen error for unique violations.
pub fn db_error_on_unique(err: sqlx::Error, on_unique: CoreError) -> CoreError {
    match &err {
        sqlx::Error::Database(db_err) if db_err.is_unique_violation() => on_unique,
        _ => db_error(err),
    }
}
