use std::time::Duration;
use thiserror::Error;

/// Failures surfaced by the harness.
///
/// Only [`HarnessError::Auth`] ends a suite; every other variant is caught at
/// scenario granularity and recorded in that scenario's report.
#[derive(Debug, Error)]
pub enum HarnessError {
    #[error("authentication failed: {0}")]
    Auth(String),

    #[error("{target} answered with status {status}")]
    Status { target: String, status: u16 },

    #[error("field '{field}' missing from {target} response")]
    MissingField { target: String, field: String },

    #[error("could not parse {target} response: {reason}")]
    Parse { target: String, reason: String },

    #[error("{target} timed out after {}s", .after.as_secs())]
    Timeout { target: String, after: Duration },

    #[error("request to {target} failed: {reason}")]
    Transport { target: String, reason: String },

    #[error("no control matched {0}")]
    ElementNotFound(String),

    #[error("browser error: {0}")]
    Browser(String),
}

impl HarnessError {
    pub fn is_fatal(&self) -> bool {
        matches!(self, HarnessError::Auth(_))
    }

    pub(crate) fn browser(err: anyhow::Error) -> Self {
        HarnessError::Browser(format!("{:#}", err))
    }
}

pub type HarnessResult<T> = std::result::Result<T, HarnessError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_auth_is_fatal() {
        assert!(HarnessError::Auth("bad password".into()).is_fatal());
        assert!(!HarnessError::Status {
            target: "frappe.client.insert".into(),
            status: 500
        }
        .is_fatal());
        assert!(!HarnessError::ElementNotFound("button 'New'".into()).is_fatal());
    }

    #[test]
    fn test_timeout_message() {
        let err = HarnessError::Timeout {
            target: "/crm".into(),
            after: Duration::from_secs(30),
        };
        assert_eq!(err.to_string(), "/crm timed out after 30s");
    }
}
