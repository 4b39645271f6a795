/// Errors raised while establishing or probing a database connection
#[derive(Debug, thiserror::Error)]
pub enum DatabaseError {
    #[cfg(feature = "mongodb")]
    #[error("MongoDB error: {0}")]
    Mongo(#[from] mongodb::error::Error),

    /// Connection failed after retries
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

#[cfg(feature = "config")]
impl From<core_config::ConfigError> for DatabaseError {
    fn from(err: core_config::ConfigError) -> Self {
        DatabaseError::ConfigError(err.to_string())
    }
}

pub type DatabaseResult<T> = Result<T, DatabaseError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_connection_failed_message() {
        let err = DatabaseError::ConnectionFailed("no reachable servers".to_string());
        assert_eq!(err.to_string(), "Connection failed: no reachable servers");
    }

    #[cfg(feature = "config")]
    #[test]
    fn test_config_error_is_wrapped() {
        let err: DatabaseError = core_config::ConfigError::MissingEnvVar("MONGODB_URL".into()).into();
        assert!(matches!(err, DatabaseError::ConfigError(ref msg) if msg.contains("MONGODB_URL")));
    }
}
