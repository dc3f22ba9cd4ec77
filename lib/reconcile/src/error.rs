//! Error types for ticketing-API calls and reconciliation.

use std::fmt;

/// Failures from the ticketing API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TicketingError {
    /// Client construction failed.
    Configuration(String),
    /// The account already exists. Not a terminal error: it triggers
    /// the login fallback chain.
    Conflict { message: String },
    /// Non-conflict upstream rejection.
    Api { status: u16, message: String },
    /// Network-level failure or timeout.
    Transport(String),
    /// The upstream response parsed but lacked a required field.
    MalformedResponse { missing: &'static str },
}

impl fmt::Display for TicketingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Configuration(msg) => write!(f, "ticketing client configuration error: {msg}"),
            Self::Conflict { message } => write!(f, "account already exists: {message}"),
            Self::Api { status, message } => {
                write!(f, "ticketing API error (status {status}): {message}")
            }
            Self::Transport(msg) => write!(f, "ticketing API unreachable: {msg}"),
            Self::MalformedResponse { missing } => {
                write!(f, "malformed ticketing API response: missing {missing}")
            }
        }
    }
}

impl std::error::Error for TicketingError {}

/// Hard failure of the reconciliation state machine.
///
/// Only a non-conflict registration failure terminates the machine with
/// an error; everything downstream degrades to the next fallback and
/// ultimately to a limited session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReconcileError {
    /// Initial registration failed for a reason other than conflict.
    Registration(TicketingError),
}

impl fmt::Display for ReconcileError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Registration(source) => write!(f, "ticketing registration failed: {source}"),
        }
    }
}

impl std::error::Error for ReconcileError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Registration(source) => Some(source),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn conflict_display_carries_upstream_message() {
        let err = TicketingError::Conflict {
            message: "cet utilisateur existe déjà".to_string(),
        };
        assert!(err.to_string().contains("existe déjà"));
    }

    #[test]
    fn malformed_response_names_missing_field() {
        let err = TicketingError::MalformedResponse {
            missing: "access_token",
        };
        assert!(err.to_string().contains("access_token"));
    }

    #[test]
    fn reconcile_error_exposes_source() {
        use std::error::Error as _;
        let err = ReconcileError::Registration(TicketingError::Api {
            status: 500,
            message: "boom".to_string(),
        });
        assert!(err.source().is_some());
        assert!(err.to_string().contains("registration failed"));
    }
}
