//! Error types for pgopt

use thiserror::Error;

/// Error type for everything around the analyzer: configuration, connection, execution
#[derive(Error, Debug)]
pub enum PgoptError {
    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Query error: {0}")]
    Query(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Config parse error: {0}")]
    Toml(#[from] toml::de::Error),
}

/// Result type alias for pgopt operations
pub type Result<T> = std::result::Result<T, PgoptError>;

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn parse_toml(content: &str) -> Result<toml::Value> {
        Ok(toml::from_str(content)?)
    }

    #[test]
    fn test_display_prefixes() {
        assert_eq!(
            PgoptError::Connection("refused".to_string()).to_string(),
            "Connection error: refused"
        );
        assert_eq!(
            PgoptError::Query("syntax".to_string()).to_string(),
            "Query error: syntax"
        );
        assert_eq!(
            PgoptError::Configuration("no url".to_string()).to_string(),
            "Configuration error: no url"
        );
    }

    #[test]
    fn test_toml_errors_convert() {
        let err = parse_toml("[db").unwrap_err();

        assert!(matches!(err, PgoptError::Toml(_)));
        assert!(err.to_string().starts_with("Config parse error: "));
    }
}
