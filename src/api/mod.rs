//! Network transport for the authentication service.
//!
//! The session manager consumes the [`AuthTransport`] trait rather than a
//! concrete client, so tests inject fakes and the HTTP layer stays swappable.
//! [`HttpTransport`] is the production reqwest implementation.

pub mod client;

pub use client::HttpTransport;

use crate::auth::Credential;
use crate::error::AuthError;
use crate::models::UserProfile;

/// Result of a successful register or login call: the authenticated profile
/// plus the credential proving the new session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthOutcome {
    pub profile: UserProfile,
    pub credential: Credential,
}

/// The authentication service operations the core depends on.
///
/// All calls are asynchronous and return a normalized [`AuthError`] on
/// failure - implementations map their own error types into the taxonomy at
/// this boundary. `logout` is fire-and-forget: it takes the credential, must
/// never block the caller, and its outcome is not consumed.
#[allow(async_fn_in_trait)]
pub trait AuthTransport {
    async fn register(
        &self,
        username: &str,
        password: &str,
        email: &str,
    ) -> Result<AuthOutcome, AuthError>;

    async fn login(&self, username: &str, password: &str) -> Result<AuthOutcome, AuthError>;

    async fn fetch_profile(&self, credential: &Credential) -> Result<UserProfile, AuthError>;

    async fn update_profile(
        &self,
        edits: &std::collections::HashMap<String, String>,
        credential: &Credential,
    ) -> Result<UserProfile, AuthError>;

    /// Best-effort server-side session teardown. No retry, no result.
    fn logout(&self, credential: Credential);
}
