//! The session lifecycle state machine.
//!
//! [`SessionManager`] owns the current [`SessionState`] and is the only
//! place it changes. It validates input locally, drives the transport and
//! credential store, and publishes every transition on a watch channel for
//! the UI layer. At most one authentication-affecting request is in flight
//! at a time; a second attempt fails with
//! [`AuthError::OperationInProgress`] instead of being queued.

use tokio::sync::watch;
use tracing::{debug, error, info, warn};

use crate::api::{AuthOutcome, AuthTransport};
use crate::auth::{Credential, CredentialStore, StepUpVerifier};
use crate::error::AuthError;
use crate::models::{EditableField, UserProfile};
use crate::profile::ProfileCache;
use crate::validate::{self, Field, Reason, ValidationError};

/// The phase the session is in. Exactly one is active at a time, owned by
/// [`SessionManager`] and mutated only through its transition function.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionState {
    /// No session. The resting state at startup and after logout.
    Unauthenticated,
    /// An authentication-affecting request is in flight.
    Authenticating,
    /// A session is active for the given profile.
    Authenticated(UserProfile),
    /// Step-up verification is in progress before a sensitive mutation.
    ReAuthenticating,
    /// An interactive attempt failed. Resting state, equivalent to
    /// `Unauthenticated` for guard purposes; carries the surfaced error.
    Failed(AuthError),
}

impl SessionState {
    pub fn is_authenticated(&self) -> bool {
        matches!(self, SessionState::Authenticated(_))
    }

    /// True while a request or step-up prompt is in flight.
    pub fn is_busy(&self) -> bool {
        matches!(
            self,
            SessionState::Authenticating | SessionState::ReAuthenticating
        )
    }

    fn name(&self) -> &'static str {
        match self {
            SessionState::Unauthenticated => "unauthenticated",
            SessionState::Authenticating => "authenticating",
            SessionState::Authenticated(_) => "authenticated",
            SessionState::ReAuthenticating => "re-authenticating",
            SessionState::Failed(_) => "failed",
        }
    }
}

/// Input for [`SessionManager::submit_registration`].
#[derive(Debug, Clone)]
pub struct Registration {
    pub username: String,
    pub email: String,
    pub password: String,
    pub confirm_password: String,
}

/// Drives the authentication/session lifecycle.
///
/// Collaborators are injected at construction, so tests run against fake
/// transports and stores. All entry points funnel through the internal
/// transition function; the state guard replaces any locking.
pub struct SessionManager<T, S, V> {
    transport: T,
    store: S,
    step_up: V,
    /// When set, profile saves are gated behind step-up verification.
    require_step_up: bool,
    state: SessionState,
    cache: ProfileCache,
    state_tx: watch::Sender<SessionState>,
}

impl<T, S, V> SessionManager<T, S, V>
where
    T: AuthTransport,
    S: CredentialStore,
    V: StepUpVerifier,
{
    pub fn new(transport: T, store: S, step_up: V) -> Self {
        let (state_tx, _) = watch::channel(SessionState::Unauthenticated);
        Self {
            transport,
            store,
            step_up,
            require_step_up: true,
            state: SessionState::Unauthenticated,
            cache: ProfileCache::new(),
            state_tx,
        }
    }

    /// Disable or re-enable the step-up gate on profile saves.
    pub fn with_step_up_required(mut self, required: bool) -> Self {
        self.require_step_up = required;
        self
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    /// Subscribe to state changes. The receiver always holds the current
    /// state and sees every subsequent transition.
    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.state_tx.subscribe()
    }

    pub fn has_pending_edits(&self) -> bool {
        self.cache.has_pending_edits()
    }

    fn transition(&mut self, next: SessionState) {
        debug!(prev = self.state.name(), next = next.name(), "session transition");
        self.state = next.clone();
        self.state_tx.send_replace(next);
    }

    /// Reject entry points that require a signed-out resting state.
    fn ensure_signed_out(&self) -> Result<(), AuthError> {
        match self.state {
            SessionState::Unauthenticated | SessionState::Failed(_) => Ok(()),
            _ => Err(AuthError::OperationInProgress),
        }
    }

    /// Reject entry points that require an active session, returning the
    /// current profile for restoration on failure.
    fn ensure_authenticated(&self) -> Result<UserProfile, AuthError> {
        match &self.state {
            SessionState::Authenticated(profile) => Ok(profile.clone()),
            _ => Err(AuthError::OperationInProgress),
        }
    }

    /// Attempt silent re-authentication from a stored credential.
    ///
    /// Call once at application start. With no stored credential this is a
    /// no-op failing with [`AuthError::CredentialMissing`]; with one, the
    /// profile is fetched and the session resumes without user interaction.
    pub async fn start(&mut self) -> Result<UserProfile, AuthError> {
        self.ensure_signed_out()?;

        let credential = match self.store.read() {
            Ok(Some(credential)) => credential,
            Ok(None) => {
                debug!("no stored credential, silent sign-in skipped");
                return Err(AuthError::CredentialMissing);
            }
            Err(e) => {
                warn!(error = %e, "could not read stored credential");
                return Err(e.into());
            }
        };

        self.transition(SessionState::Authenticating);

        match self.transport.fetch_profile(&credential).await {
            Ok(profile) => {
                info!(user_id = profile.id, "silent sign-in succeeded");
                Ok(self.enter_session(profile))
            }
            Err(e) => {
                warn!(error = %e, "silent sign-in failed");
                if e == AuthError::CredentialRejected {
                    self.clear_stored_credential();
                }
                self.cache.clear();
                self.transition(SessionState::Unauthenticated);
                Err(e)
            }
        }
    }

    /// Authenticate with a username and password.
    pub async fn submit_login(
        &mut self,
        username: &str,
        password: &str,
    ) -> Result<UserProfile, AuthError> {
        self.ensure_signed_out()?;
        validate::check(Field::Username, username)?;
        validate::check(Field::Password, password)?;

        self.transition(SessionState::Authenticating);

        match self.transport.login(username, password).await {
            Ok(outcome) => {
                info!(username, "login succeeded");
                Ok(self.complete_sign_in(outcome))
            }
            Err(e) => {
                error!(error = %e, "login failed");
                self.transition(SessionState::Failed(e.clone()));
                Err(e)
            }
        }
    }

    /// Register a new account and open a session for it.
    pub async fn submit_registration(
        &mut self,
        registration: &Registration,
    ) -> Result<UserProfile, AuthError> {
        self.ensure_signed_out()?;
        validate::check(Field::Username, &registration.username)?;
        validate::check(Field::Email, &registration.email)?;
        validate::check(Field::Password, &registration.password)?;
        if registration.password != registration.confirm_password {
            return Err(ValidationError::new(Field::Password, Reason::ConfirmationMismatch).into());
        }

        self.transition(SessionState::Authenticating);

        match self
            .transport
            .register(
                &registration.username,
                &registration.password,
                &registration.email,
            )
            .await
        {
            Ok(outcome) => {
                info!(username = %registration.username, "registration succeeded");
                Ok(self.complete_sign_in(outcome))
            }
            Err(e) => {
                error!(error = %e, "registration failed");
                self.transition(SessionState::Failed(e.clone()));
                Err(e)
            }
        }
    }

    /// Record a proposed profile edit. Only valid while authenticated.
    pub fn record_field_edit(
        &mut self,
        field: EditableField,
        value: impl Into<String>,
    ) -> Result<(), AuthError> {
        self.ensure_authenticated()?;
        self.cache.record_edit(field, value);
        Ok(())
    }

    /// Push pending profile edits to the server, gated by step-up
    /// verification when required. On success the server's merged profile
    /// becomes authoritative and the pending edits are cleared; on failure
    /// the edits stay intact for retry.
    pub async fn save_edits(&mut self) -> Result<UserProfile, AuthError> {
        let previous = self.ensure_authenticated()?;

        if !self.cache.has_pending_edits() {
            debug!("no pending edits to save");
            return Ok(previous);
        }

        if let Some(email) = self.cache.pending_edit(EditableField::Email) {
            validate::check(Field::Email, email)?;
        }

        if self.require_step_up {
            self.transition(SessionState::ReAuthenticating);
            if let Err(e) = self.step_up.verify().await {
                warn!(error = %e, "step-up verification failed, edits not applied");
                self.transition(SessionState::Authenticated(previous));
                return Err(e);
            }
        }

        let credential = match self.read_credential_for_request() {
            Ok(credential) => credential,
            Err(e) => {
                self.transition(SessionState::Authenticated(previous));
                return Err(e);
            }
        };

        self.transition(SessionState::Authenticating);

        let edits = self.cache.snapshot_for_save();
        match self.transport.update_profile(&edits, &credential).await {
            Ok(profile) => {
                info!(user_id = profile.id, "profile update saved");
                self.cache.apply_server_profile(profile.clone());
                self.transition(SessionState::Authenticated(profile.clone()));
                Ok(profile)
            }
            Err(AuthError::CredentialRejected) => {
                warn!("credential rejected during profile update, forcing sign-out");
                self.force_sign_out();
                Err(AuthError::CredentialRejected)
            }
            Err(e) => {
                error!(error = %e, "profile update failed, keeping pending edits");
                self.transition(SessionState::Authenticated(previous));
                Err(e)
            }
        }
    }

    /// Re-fetch the profile from the server. Pending edits survive - a
    /// background refresh must never discard unsaved input.
    pub async fn refresh_profile(&mut self) -> Result<UserProfile, AuthError> {
        let previous = self.ensure_authenticated()?;

        let credential = match self.read_credential_for_request() {
            Ok(credential) => credential,
            Err(e) => return Err(e),
        };

        self.transition(SessionState::Authenticating);

        match self.transport.fetch_profile(&credential).await {
            Ok(profile) => {
                debug!(user_id = profile.id, "profile refreshed");
                self.cache.refresh(profile.clone());
                self.transition(SessionState::Authenticated(profile.clone()));
                Ok(profile)
            }
            Err(AuthError::CredentialRejected) => {
                warn!("credential rejected during refresh, forcing sign-out");
                self.force_sign_out();
                Err(AuthError::CredentialRejected)
            }
            Err(e) => {
                warn!(error = %e, "profile refresh failed");
                self.transition(SessionState::Authenticated(previous));
                Err(e)
            }
        }
    }

    /// End the session. The server is notified best-effort (no retry, not
    /// surfaced); the local credential clear and transition to
    /// `Unauthenticated` are never blocked on it. Idempotent from any
    /// resting state.
    pub fn logout(&mut self) -> Result<(), AuthError> {
        if self.state.is_busy() {
            return Err(AuthError::OperationInProgress);
        }

        match self.store.read() {
            Ok(Some(credential)) => self.transport.logout(credential),
            Ok(None) => {}
            Err(e) => debug!(error = %e, "skipping logout notification, credential unreadable"),
        }

        self.force_sign_out();
        info!("logged out");
        Ok(())
    }

    /// Read the stored credential for an in-flight request. The copy is
    /// transient; the store remains the owner.
    fn read_credential_for_request(&self) -> Result<Credential, AuthError> {
        match self.store.read() {
            Ok(Some(credential)) => Ok(credential),
            Ok(None) => {
                warn!("no stored credential for authenticated request");
                Err(AuthError::CredentialMissing)
            }
            Err(e) => {
                warn!(error = %e, "could not read credential");
                Err(e.into())
            }
        }
    }

    fn complete_sign_in(&mut self, outcome: AuthOutcome) -> UserProfile {
        if let Err(e) = self.store.write(&outcome.credential) {
            // Keep the session usable in-memory; only silent resume is lost
            warn!(error = %e, "failed to persist credential");
        }
        self.enter_session(outcome.profile)
    }

    fn enter_session(&mut self, profile: UserProfile) -> UserProfile {
        self.cache.apply_server_profile(profile.clone());
        self.transition(SessionState::Authenticated(profile.clone()));
        profile
    }

    /// The single mechanism for ending a session locally: clear the stored
    /// credential (idempotent), drop cached profile data, reset state.
    fn force_sign_out(&mut self) {
        self.clear_stored_credential();
        self.cache.clear();
        self.transition(SessionState::Unauthenticated);
    }

    fn clear_stored_credential(&mut self) {
        if let Err(e) = self.store.clear() {
            warn!(error = %e, "failed to clear stored credential");
        }
    }
}
