use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Identity and attributes of the authenticated principal.
///
/// `id` and `username` are assigned together by the server at registration
/// and never change afterwards; the remaining fields are mutable through
/// profile updates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: i64,
    pub username: String,
    pub email: String,
    #[serde(rename = "displayName")]
    pub display_name: Option<String>,
    #[serde(rename = "deviceToken")]
    pub device_token: Option<String>,
    /// Server-supplied timestamp of when the current session began.
    /// Display/audit only - the client never enforces expiry from it.
    #[serde(rename = "sessionStartedAt")]
    pub session_started_at: Option<DateTime<Utc>>,
}

impl UserProfile {
    pub fn new(id: i64, username: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            id,
            username: username.into(),
            email: email.into(),
            display_name: None,
            device_token: None,
            session_started_at: None,
        }
    }

    /// One-line summary for logs and status displays.
    pub fn summary(&self) -> String {
        format!(
            "id={} username={} email={} name={}",
            self.id,
            self.username,
            self.email,
            self.display_name.as_deref().unwrap_or("-")
        )
    }
}

/// The profile fields a user may edit. `id` and `username` never change
/// after registration, so they have no variant here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EditableField {
    Email,
    DisplayName,
    DeviceToken,
}

impl EditableField {
    /// The key this field uses on the wire (the update endpoint's JSON body).
    pub fn wire_name(&self) -> &'static str {
        match self {
            EditableField::Email => "email",
            EditableField::DisplayName => "name",
            EditableField::DeviceToken => "deviceToken",
        }
    }
}

impl std::fmt::Display for EditableField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.wire_name())
    }
}
