//! Transient user-facing notifications

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NoticeKind {
    Success,
    Error,
}

/// A toast shown after an action succeeds or fails
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notice {
    pub kind: NoticeKind,
    pub message: String,
}

impl Notice {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Success,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Error,
            message: message.into(),
        }
    }

    /// The provider's message when the error carries one, else `fallback`
    pub fn from_error(err: &CoreError, fallback: &str) -> Self {
        Self::error(err.provider_message().unwrap_or(fallback))
    }

    /// Same rule for errors that only exist as a (possibly empty) message
    pub fn from_message(message: Option<&str>, fallback: &str) -> Self {
        Self::error(message.filter(|m| !m.trim().is_empty()).unwrap_or(fallback))
    }

    pub const fn is_error(&self) -> bool {
        matches!(self.kind, NoticeKind::Error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_message_wins() {
        let err = CoreError::Auth("Invalid login credentials".into());
        let notice = Notice::from_error(&err, "Failed to login");
        assert!(notice.is_error());
        assert_eq!(notice.message, "Invalid login credentials");
    }

    #[test]
    fn test_fallback_message() {
        let err = CoreError::AuthUnavailable("connection refused".into());
        assert_eq!(Notice::from_error(&err, "Failed to login").message, "Failed to login");
        assert_eq!(
            Notice::from_message(Some("  "), "Something went wrong").message,
            "Something went wrong"
        );
    }
}
