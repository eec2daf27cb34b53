//! In-memory cache of the authenticated user's profile and unsaved edits.
//!
//! The cache distinguishes two ways of merging a server profile back in:
//! a save-merge ([`ProfileCache::apply_server_profile`]) clears pending
//! edits because the server has confirmed them, while a refresh-merge
//! ([`ProfileCache::refresh`]) keeps them - a background refresh must never
//! discard input the user is still editing.

use std::collections::HashMap;

use tracing::debug;

use crate::models::{EditableField, UserProfile};

/// Holds the authoritative profile plus any uncommitted field edits.
#[derive(Debug, Default)]
pub struct ProfileCache {
    profile: Option<UserProfile>,
    pending: HashMap<EditableField, String>,
}

impl ProfileCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// The authoritative profile, if a session is active.
    pub fn profile(&self) -> Option<&UserProfile> {
        self.profile.as_ref()
    }

    /// Record a proposed edit. The last write for a field wins; untouched
    /// fields never appear in the pending set.
    pub fn record_edit(&mut self, field: EditableField, value: impl Into<String>) {
        let value = value.into();
        debug!(%field, "profile edit recorded");
        self.pending.insert(field, value);
    }

    pub fn has_pending_edits(&self) -> bool {
        !self.pending.is_empty()
    }

    /// The pending value for a field, if one was recorded.
    pub fn pending_edit(&self, field: EditableField) -> Option<&str> {
        self.pending.get(&field).map(String::as_str)
    }

    /// Snapshot the pending edits as a wire-keyed map for the update call.
    pub fn snapshot_for_save(&self) -> HashMap<String, String> {
        self.pending
            .iter()
            .map(|(field, value)| (field.wire_name().to_string(), value.clone()))
            .collect()
    }

    /// Save-merge: the server confirmed the edits, so the returned profile
    /// becomes authoritative and the pending set is cleared atomically.
    pub fn apply_server_profile(&mut self, profile: UserProfile) {
        debug!(user_id = profile.id, "applying server profile, clearing pending edits");
        self.profile = Some(profile);
        self.pending.clear();
    }

    /// Refresh-merge: replace the authoritative profile from a plain fetch.
    /// Pending edits are left intact - the user may be mid-edit.
    pub fn refresh(&mut self, profile: UserProfile) {
        debug!(user_id = profile.id, "refreshing profile, keeping pending edits");
        self.profile = Some(profile);
    }

    /// Drop everything on logout.
    pub fn clear(&mut self) {
        self.profile = None;
        self.pending.clear();
    }
}
