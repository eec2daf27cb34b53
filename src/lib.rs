//! Client-side authentication and session lifecycle management.
//!
//! This crate keeps a user signed in to an HTTP authentication service:
//! registration, login, silent resume from a stored credential, profile
//! edits gated by step-up verification, and logout.
//!
//! The moving parts:
//!
//! - [`SessionManager`] - the state machine. Owns the [`SessionState`],
//!   enforces local validation and the single-flight guard, and publishes
//!   every transition on a `tokio::sync::watch` channel.
//! - [`HttpTransport`] - the [`AuthTransport`] implementation speaking the
//!   service's JSON envelope over reqwest.
//! - [`KeyringStore`] - [`CredentialStore`] backed by the platform keyring;
//!   [`MemoryStore`] is available for tests and headless use.
//! - [`StepUpVerifier`] - hook for an extra verification prompt before
//!   sensitive profile mutations.
//!
//! ```no_run
//! use authkeep::{HttpTransport, KeyringStore, SessionManager, StepUpUnsupported};
//!
//! # async fn run() -> anyhow::Result<()> {
//! let transport = HttpTransport::new("https://auth.example.com")?;
//! let mut session = SessionManager::new(transport, KeyringStore::new(), StepUpUnsupported)
//!     .with_step_up_required(false);
//!
//! if session.start().await.is_err() {
//!     session.submit_login("User12", "Secr3t!").await?;
//! }
//! # Ok(())
//! # }
//! ```

pub mod api;
pub mod auth;
pub mod config;
pub mod error;
pub mod models;
pub mod profile;
pub mod validate;

pub use api::{AuthOutcome, AuthTransport, HttpTransport};
pub use auth::{
    Credential, CredentialStore, KeyringStore, MemoryStore, Registration, SessionManager,
    SessionState, StepUpUnsupported, StepUpVerifier,
};
pub use config::Config;
pub use error::{AuthError, StoreError};
pub use models::{EditableField, UserProfile};
pub use profile::ProfileCache;
pub use validate::{Field, Reason, ValidationError};
