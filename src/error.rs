// ABOUTME: Error types with structured exit codes for CLI
// ABOUTME: Maps configuration, transport, validation and conversion failures to exit codes

use crate::issue::Issues;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("API error {status} on {endpoint}: {message}")]
    Api {
        endpoint: String,
        status: u16,
        message: String,
    },

    #[error("GraphQL error: {0}")]
    GraphQl(String),

    #[error("Parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Validation failed: {0}")]
    Validation(#[from] Issues),

    #[error("Conversion error: {0}")]
    Invariant(String),

    #[error("Filesystem error: {0}")]
    Filesystem(#[from] std::io::Error),
}

impl Error {
    pub fn exit_code(&self) -> i32 {
        match self {
            Error::Network(_)
            | Error::Api { .. }
            | Error::GraphQl(_)
            | Error::Parse(_)
            | Error::Validation(_) => 1,
            Error::Config(_) => 2,
            Error::Invariant(_) => 3,
            Error::Filesystem(_) => 4,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::issue::Path;

    #[test]
    fn test_error_exit_codes() {
        assert_eq!(Error::Config("test".into()).exit_code(), 2);
        assert_eq!(
            Error::Api {
                endpoint: "test".into(),
                status: 404,
                message: "not found".into()
            }
            .exit_code(),
            1
        );
        assert_eq!(Error::GraphQl("boom".into()).exit_code(), 1);
        assert_eq!(Error::Invariant("test".into()).exit_code(), 3);
    }

    #[test]
    fn test_validation_error_lists_issues() {
        let mut issues = Issues::new();
        issues.push(&Path::root().key("data"), "expected a non-empty array");
        let err = Error::from(issues);

        assert_eq!(err.exit_code(), 1);
        assert!(err.to_string().contains("data: expected a non-empty array"));
    }
}
