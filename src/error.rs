//! Error taxonomy for the authentication core.
//!
//! Every failure the session manager can surface is one of the `AuthError`
//! kinds below. Transport and store errors are mapped into this taxonomy at
//! the boundary, so callers never see a raw reqwest or keyring error.

use thiserror::Error;

use crate::validate::ValidationError;

/// Maximum length for server-provided messages carried in errors
const MAX_ERROR_MESSAGE_LENGTH: usize = 500;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    /// A field failed local validation. Never reaches the transport.
    #[error("validation failed: {0}")]
    ValidationFailed(#[from] ValidationError),

    /// The request could not reach the server (connect failure, timeout).
    #[error("network unreachable")]
    NetworkUnreachable,

    /// The response did not match the expected shape.
    #[error("malformed response from server")]
    MalformedResponse,

    /// The server explicitly rejected the request with a message.
    #[error("server rejected request: {0}")]
    ServerRejected(String),

    /// The server rejected the session credential. The session manager
    /// responds by clearing the stored credential and resetting to
    /// `Unauthenticated`.
    #[error("credential rejected by server")]
    CredentialRejected,

    /// No credential is stored; silent re-authentication is not possible.
    #[error("no stored credential")]
    CredentialMissing,

    /// Another authentication-affecting request is already in flight,
    /// or the operation is not valid in the current state.
    #[error("operation already in progress")]
    OperationInProgress,

    /// The user cancelled the step-up (biometric/passcode) prompt.
    #[error("step-up verification cancelled")]
    StepUpCancelled,

    /// Step-up verification is not available on this device.
    #[error("step-up verification unavailable")]
    StepUpUnavailable,

    /// The credential store failed.
    #[error("credential store failure: {0}")]
    StoreFailure(String),
}

impl AuthError {
    /// Truncate a server message to avoid carrying excessive data around.
    /// The message is untrusted input, so the cut must land on a char
    /// boundary rather than a raw byte index.
    pub(crate) fn truncate_message(message: &str) -> String {
        if message.len() <= MAX_ERROR_MESSAGE_LENGTH {
            return message.to_string();
        }
        let mut cut = MAX_ERROR_MESSAGE_LENGTH;
        while !message.is_char_boundary(cut) {
            cut -= 1;
        }
        format!(
            "{}... (truncated, {} total bytes)",
            &message[..cut],
            message.len()
        )
    }

    pub(crate) fn server_rejected(message: &str) -> Self {
        AuthError::ServerRejected(Self::truncate_message(message))
    }
}

impl From<StoreError> for AuthError {
    fn from(err: StoreError) -> Self {
        match err {
            // A denied keychain prompt is a user decision, not a server
            // rejection; it must never trigger a forced credential clear.
            StoreError::AccessDenied => AuthError::StepUpCancelled,
            StoreError::Unavailable(msg) | StoreError::Backend(msg) => {
                AuthError::StoreFailure(msg)
            }
        }
    }
}

/// Errors from the credential store collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// Access to the secure store was denied or the prompt was cancelled.
    #[error("access to the secure store was denied")]
    AccessDenied,

    /// No secure store is available on this platform.
    #[error("secure store unavailable: {0}")]
    Unavailable(String),

    /// The store backend failed.
    #[error("secure store operation failed: {0}")]
    Backend(String),
}
