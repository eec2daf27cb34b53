//! Data models for the authenticated principal.

pub mod user;

pub use user::{EditableField, UserProfile};
