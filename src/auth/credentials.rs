//! Session credential and its secure storage.
//!
//! The credential is an opaque Basic-auth-style token owned by a
//! [`CredentialStore`]. The session manager only ever holds a transient
//! in-memory copy for the duration of a request. [`KeyringStore`] persists
//! the credential in the OS keychain; [`MemoryStore`] backs tests and
//! headless environments.

use std::sync::{Arc, Mutex};

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use keyring::Entry;
use tracing::debug;

use crate::error::{AuthError, StoreError};

/// Keychain service name for stored credentials
const SERVICE_NAME: &str = "authkeep";

/// Fixed account key for the session credential - one session per process
const SESSION_KEY: &str = "LoginKey";

/// Opaque secret proving an authenticated session.
///
/// Everything outside the transport treats this as a blob. `Debug` redacts
/// the token so credentials never leak into logs.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential(String);

impl Credential {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// Encode an API key/secret pair as a Basic authorization value.
    pub fn from_key_pair(api_key: &str, api_secret: &str) -> Self {
        let encoded = STANDARD.encode(format!("{}:{}", api_key, api_secret));
        Self(format!("Basic {}", encoded))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Debug for Credential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("Credential(<redacted>)")
    }
}

/// Secure storage for the session credential.
///
/// Implementations may be gated by a platform step-up prompt (biometric or
/// passcode); a denied prompt surfaces as [`StoreError::AccessDenied`], which
/// is distinct from a server-side credential rejection and never clears the
/// stored value. Clearing an already-empty store is not an error.
pub trait CredentialStore {
    fn read(&self) -> Result<Option<Credential>, StoreError>;
    fn write(&self, credential: &Credential) -> Result<(), StoreError>;
    fn clear(&self) -> Result<(), StoreError>;
}

/// Credential storage backed by the OS keychain.
pub struct KeyringStore {
    service: String,
}

impl KeyringStore {
    pub fn new() -> Self {
        Self {
            service: SERVICE_NAME.to_string(),
        }
    }

    /// Use a custom keychain service name (e.g. per-environment isolation).
    pub fn with_service(service: impl Into<String>) -> Self {
        Self {
            service: service.into(),
        }
    }

    fn entry(&self) -> Result<Entry, StoreError> {
        Entry::new(&self.service, SESSION_KEY).map_err(map_keyring_error)
    }
}

impl Default for KeyringStore {
    fn default() -> Self {
        Self::new()
    }
}

impl CredentialStore for KeyringStore {
    fn read(&self) -> Result<Option<Credential>, StoreError> {
        match self.entry()?.get_password() {
            Ok(token) => Ok(Some(Credential::new(token))),
            Err(keyring::Error::NoEntry) => Ok(None),
            Err(e) => Err(map_keyring_error(e)),
        }
    }

    fn write(&self, credential: &Credential) -> Result<(), StoreError> {
        self.entry()?
            .set_password(credential.as_str())
            .map_err(map_keyring_error)?;
        debug!("credential saved to keychain");
        Ok(())
    }

    fn clear(&self) -> Result<(), StoreError> {
        match self.entry()?.delete_credential() {
            Ok(()) | Err(keyring::Error::NoEntry) => Ok(()),
            Err(e) => Err(map_keyring_error(e)),
        }
    }
}

fn map_keyring_error(err: keyring::Error) -> StoreError {
    match err {
        keyring::Error::NoStorageAccess(e) => {
            debug!(error = %e, "keychain access denied");
            StoreError::AccessDenied
        }
        keyring::Error::PlatformFailure(e) => StoreError::Unavailable(e.to_string()),
        other => StoreError::Backend(other.to_string()),
    }
}

/// In-memory credential store for tests and headless environments.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    inner: Arc<Mutex<Option<Credential>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl CredentialStore for MemoryStore {
    fn read(&self) -> Result<Option<Credential>, StoreError> {
        Ok(self.inner.lock().expect("store lock poisoned").clone())
    }

    fn write(&self, credential: &Credential) -> Result<(), StoreError> {
        *self.inner.lock().expect("store lock poisoned") = Some(credential.clone());
        Ok(())
    }

    fn clear(&self) -> Result<(), StoreError> {
        *self.inner.lock().expect("store lock poisoned") = None;
        Ok(())
    }
}

/// Local step-up (biometric/passcode) verification, required before
/// sensitive mutations when the session manager's policy demands it.
#[allow(async_fn_in_trait)]
pub trait StepUpVerifier {
    /// Resolve to `Ok(())` on successful verification, or
    /// [`AuthError::StepUpCancelled`] / [`AuthError::StepUpUnavailable`].
    async fn verify(&self) -> Result<(), AuthError>;
}

/// Stand-in verifier for platforms without a local authentication facility.
/// Always reports step-up as unavailable.
#[derive(Debug, Clone, Copy, Default)]
pub struct StepUpUnsupported;

impl StepUpVerifier for StepUpUnsupported {
    async fn verify(&self) -> Result<(), AuthError> {
        Err(AuthError::StepUpUnavailable)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_credential_debug_is_redacted() {
        let credential = Credential::new("Basic c2VjcmV0");
        assert_eq!(format!("{:?}", credential), "Credential(<redacted>)");
    }

    #[test]
    fn test_from_key_pair_encoding() {
        let credential = Credential::from_key_pair("key", "secret");
        assert_eq!(credential.as_str(), "Basic a2V5OnNlY3JldA==");
    }

    #[test]
    fn test_memory_store_roundtrip_and_idempotent_clear() {
        let store = MemoryStore::new();
        assert_eq!(store.read().unwrap(), None);

        let credential = Credential::new("tok");
        store.write(&credential).unwrap();
        assert_eq!(store.read().unwrap(), Some(credential));

        store.clear().unwrap();
        assert_eq!(store.read().unwrap(), None);
        // Clearing an empty store is not an error
        store.clear().unwrap();
    }
}
