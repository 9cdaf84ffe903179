//! User-visible messages shown on the pages and returned by the JSON API

use serde::{Deserialize, Serialize};

/// How prominently a notice is shown
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum NoticeLevel {
    Success,
    Warning,
    Error,
}

/// A user-visible message attached to a rendered page or API response
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

impl Notice {
    pub fn new(level: NoticeLevel, message: impl Into<String>) -> Self {
        Self {
            level,
            message: message.into(),
        }
    }

    pub fn success(message: impl Into<String>) -> Self {
        Self::new(NoticeLevel::Success, message)
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self::new(NoticeLevel::Warning, message)
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::new(NoticeLevel::Error, message)
    }

    /// Warning shown when the red-flag scan matches
    pub fn urgent_care() -> Self {
        Self::error("⚠️ Your symptoms may be serious. Please seek urgent medical care.")
    }
}

impl From<crate::IntakeError> for Notice {
    fn from(err: crate::IntakeError) -> Self {
        Notice::warning(format!("⚠️ {err}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn level_serializes_lowercase() {
        let json = serde_json::to_value(Notice::warning("careful")).unwrap();
        assert_eq!(json["level"], "warning");
        assert_eq!(json["message"], "careful");
    }

    #[test]
    fn intake_error_becomes_warning() {
        let notice = Notice::from(crate::IntakeError::EmptySymptoms);
        assert_eq!(notice.level, NoticeLevel::Warning);
        assert!(notice.message.contains("describe your symptoms"));
    }
}
