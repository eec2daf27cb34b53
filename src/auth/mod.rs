//! Session lifecycle and credential handling.

pub mod credentials;
pub mod session;

pub use credentials::{
    Credential, CredentialStore, KeyringStore, MemoryStore, StepUpUnsupported, StepUpVerifier,
};
pub use session::{Registration, SessionManager, SessionState};
