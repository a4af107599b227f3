//! Translation of `sqlx` failures into store errors.

use domain::StoreError;

/// SQLSTATE codes that indicate a retryable conflict.
const SERIALIZATION_FAILURE: &str = "40001";
const DEADLOCK_DETECTED: &str = "40P01";
const UNIQUE_VIOLATION: &str = "23505";

/// Maps a `sqlx::Error` onto the store error kinds the engine understands.
pub fn map_sqlx_error(err: sqlx::Error) -> StoreError {
    match err {
        sqlx::Error::Database(db_err) => match db_err.code().as_deref() {
            Some(UNIQUE_VIOLATION) => StoreError::UniqueViolation(
                db_err
                    .constraint()
                    .map(str::to_string)
                    .unwrap_or_else(|| db_err.message().to_string()),
            ),
            Some(SERIALIZATION_FAILURE) | Some(DEADLOCK_DETECTED) => {
                StoreError::Transient(db_err.message().to_string())
            }
            _ => StoreError::Database(db_err.to_string()),
        },
        sqlx::Error::Io(e) => StoreError::Transient(e.to_string()),
        sqlx::Error::PoolTimedOut => StoreError::Transient("connection pool timed out".into()),
        other => StoreError::Database(other.to_string()),
    }
}

/// Wraps a failed `COMMIT`.
///
/// An error the server reported means the transaction rolled back and is
/// passed through. Anything else (a dropped connection, a pool or protocol
/// failure) leaves the outcome unknown: the server may have committed. Such
/// errors become non-transient so the whole transaction is never re-run.
pub fn commit_error(err: sqlx::Error) -> sqlx::Error {
    match err {
        db @ sqlx::Error::Database(_) => db,
        other => sqlx::Error::Protocol(format!("commit outcome unknown: {other}")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pool_timeout_is_transient() {
        assert!(map_sqlx_error(sqlx::Error::PoolTimedOut).is_transient());
    }

    #[test]
    fn test_io_error_is_transient() {
        let io = std::io::Error::new(std::io::ErrorKind::ConnectionReset, "reset by peer");
        assert!(map_sqlx_error(sqlx::Error::Io(io)).is_transient());
    }

    #[test]
    fn test_row_not_found_is_not_transient() {
        let err = map_sqlx_error(sqlx::Error::RowNotFound);
        assert!(matches!(err, StoreError::Database(_)));
    }

    #[test]
    fn test_commit_io_error_is_not_transient() {
        let io = std::io::Error::new(std::io::ErrorKind::ConnectionReset, "reset by peer");
        let err = map_sqlx_error(commit_error(sqlx::Error::Io(io)));
        assert!(!err.is_transient());
        assert!(matches!(
            err,
            StoreError::Database(ref msg) if msg.contains("commit outcome unknown")
        ));
    }

    #[test]
    fn test_commit_pool_timeout_is_not_transient() {
        assert!(!map_sqlx_error(commit_error(sqlx::Error::PoolTimedOut)).is_transient());
    }
}
