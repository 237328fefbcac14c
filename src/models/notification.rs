use chrono::{DateTime, Duration, Utc};
use serde::Serialize;

/// How long a notification stays on screen
pub const NOTIFICATION_DURATION_MS: u64 = 3000;

/// Transient, informational message shown after a user action
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Notification {
    pub title: String,
    pub description: String,
    pub duration_ms: u64,
    pub created_at: DateTime<Utc>,
}

impl Notification {
    fn new(title: &str, description: &str) -> Self {
        Self {
            title: title.to_string(),
            description: description.to_string(),
            duration_ms: NOTIFICATION_DURATION_MS,
            created_at: Utc::now(),
        }
    }

    pub fn favorite_added() -> Self {
        Self::new("Added to favorites", "Assessment saved for future reference")
    }

    pub fn favorite_removed() -> Self {
        Self::new(
            "Removed from favorites",
            "Assessment removed from your saved list",
        )
    }

    /// Moment after which the notification should no longer be shown
    pub fn expires_at(&self) -> DateTime<Utc> {
        self.created_at + Duration::milliseconds(self.duration_ms as i64)
    }
}
