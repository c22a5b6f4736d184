//! error.rs
//! Error taxonomy for the acquisition core.
//!
//! Only a failure to open the source is fatal. Read timeouts, undecodable bytes and
//! unparseable tokens never surface here; they are counted and skipped by the acquirer.

use thiserror::Error;

pub type AcquireResult<T> = Result<T, AcquireError>;

#[derive(Debug, Error)]
pub enum AcquireError {
    /// Transport could not be opened (bad path, permission, busy, driver absent).
    #[error("Failed to open {address}: {reason}")]
    Connection { address: String, reason: String },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Acquirer already started")]
    AlreadyStarted,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl AcquireError {
    pub fn connection(address: &str, reason: impl ToString) -> Self {
        AcquireError::Connection {
            address: address.to_string(),
            reason: reason.to_string(),
        }
    }

    pub fn is_connection(&self) -> bool {
        matches!(self, AcquireError::Connection { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn connection_error_names_the_address() {
        let err = AcquireError::connection("/dev/ttyUSB9", "No such file or directory");
        assert!(err.is_connection());
        assert_eq!(
            err.to_string(),
            "Failed to open /dev/ttyUSB9: No such file or directory"
        );
    }

    #[test]
    fn config_error_is_not_a_connection_error() {
        let err = AcquireError::InvalidConfig("channels must be >= 1".into());
        assert!(!err.is_connection());
    }
}
