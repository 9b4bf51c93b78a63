//! Session state machine.
//!
//! `SessionManager` owns the bearer token and the current identity. It is
//! the only writer of the `CredentialStore` and publishes every state change
//! on a watch channel so views and the access guard can follow along.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::sync::watch;
use tracing::{debug, info, warn};

use super::{AuthFailure, Authenticator, CredentialStore, IdentityResolver, ResolveError};
use crate::models::{Token, User};
use crate::utils::is_valid_email;

/// Identity lookups a single bootstrap makes before giving up on a stored
/// token that keeps being replaced
const MAX_BOOTSTRAP_LOOKUPS: usize = 3;

#[derive(Debug, Clone, PartialEq)]
pub enum SessionState {
    Unauthenticated,
    /// A token exists and its identity is being resolved
    Bootstrapping,
    Authenticated(User),
    AuthError(AuthFailure),
}

impl SessionState {
    /// False only while an identity lookup is outstanding.
    pub fn is_settled(&self) -> bool {
        !matches!(self, SessionState::Bootstrapping)
    }

    pub fn user(&self) -> Option<&User> {
        match self {
            SessionState::Authenticated(user) => Some(user),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            SessionState::Unauthenticated => "unauthenticated",
            SessionState::Bootstrapping => "bootstrapping",
            SessionState::Authenticated(_) => "authenticated",
            SessionState::AuthError(_) => "auth-error",
        }
    }
}

/// Bookkeeping that must change atomically with respect to `logout`.
struct Inner {
    /// Bumped by every logout; in-flight work captured at start is stale once it moves.
    epoch: u64,
    /// Token backing the current `Authenticated` state.
    token: Option<Token>,
}

pub struct SessionManager {
    authenticator: Arc<dyn Authenticator>,
    resolver: Arc<dyn IdentityResolver>,
    store: Arc<dyn CredentialStore>,
    inner: Mutex<Inner>,
    state: watch::Sender<SessionState>,
    in_flight: tokio::sync::Mutex<()>,
}

impl SessionManager {
    /// Build a manager. Starts in `Bootstrapping` if the store already holds a
    /// token, otherwise `Unauthenticated`; call `bootstrap` to settle.
    pub fn new(
        authenticator: Arc<dyn Authenticator>,
        resolver: Arc<dyn IdentityResolver>,
        store: Arc<dyn CredentialStore>,
    ) -> Self {
        let initial = match read_stored_token(store.as_ref()) {
            Some(_) => SessionState::Bootstrapping,
            None => SessionState::Unauthenticated,
        };
        debug!(state = initial.label(), "Session manager created");
        let (state, _) = watch::channel(initial);

        Self {
            authenticator,
            resolver,
            store,
            inner: Mutex::new(Inner {
                epoch: 0,
                token: None,
            }),
            state,
            in_flight: tokio::sync::Mutex::new(()),
        }
    }

    // =========================================================================
    // Observation
    // =========================================================================

    pub fn state(&self) -> SessionState {
        self.state.borrow().clone()
    }

    pub fn current_user(&self) -> Option<User> {
        self.state.borrow().user().cloned()
    }

    pub fn is_authenticated(&self) -> bool {
        matches!(*self.state.borrow(), SessionState::Authenticated(_))
    }

    /// Bearer for collaborator calls; `None` unless authenticated.
    pub fn bearer(&self) -> Option<Token> {
        if !self.is_authenticated() {
            return None;
        }
        self.lock_inner().token.clone()
    }

    /// Receive every state transition from now on.
    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.state.subscribe()
    }

    /// Wait until no identity lookup is outstanding and return that state.
    pub async fn settled(&self) -> SessionState {
        let mut rx = self.state.subscribe();
        let settled = match rx.wait_for(SessionState::is_settled).await {
            Ok(state) => state.clone(),
            Err(_) => self.state(),
        };
        settled
    }

    // =========================================================================
    // Operations
    // =========================================================================

    /// Restore a session from the credential store. A stored token the
    /// backend will not resolve is purged and the session drops to
    /// `Unauthenticated`; this never ends in `AuthError`.
    pub async fn bootstrap(&self) -> SessionState {
        let Ok(_latch) = self.in_flight.try_lock() else {
            debug!("Bootstrap skipped, another session operation is in flight");
            return self.state();
        };
        let epoch = self.lock_inner().epoch;

        let Some(mut token) = read_stored_token(self.store.as_ref()) else {
            self.transition_if_current(epoch, SessionState::Unauthenticated);
            info!("No stored token, starting signed out");
            return self.state();
        };

        if !self.transition_if_current(epoch, SessionState::Bootstrapping) {
            return self.state();
        }

        for _ in 0..MAX_BOOTSTRAP_LOOKUPS {
            let resolved = self.resolver.resolve(&token).await;
            match self.commit_bootstrap(epoch, &token, resolved) {
                Some(replacement) => token = replacement,
                None => return self.state(),
            }
        }

        // The stored token kept changing under us
        warn!("Stored token changed repeatedly during bootstrap, starting signed out");
        let mut inner = self.lock_inner();
        if inner.epoch == epoch {
            inner.token = None;
            self.state.send_replace(SessionState::Unauthenticated);
        }
        drop(inner);
        self.state()
    }

    /// Settle a bootstrap lookup for `token`. Returns the newly stored token
    /// when another writer replaced it during the lookup; the caller resolves
    /// that one instead. Every other outcome leaves the session settled.
    fn commit_bootstrap(
        &self,
        epoch: u64,
        token: &Token,
        resolved: Result<User, ResolveError>,
    ) -> Option<Token> {
        let mut inner = self.lock_inner();
        if inner.epoch != epoch {
            debug!("Discarding bootstrap result after logout");
            return None;
        }

        match read_stored_token(self.store.as_ref()) {
            Some(current) if &current == token => {}
            Some(current) => {
                debug!("Stored token replaced during bootstrap, resolving the new one");
                return Some(current);
            }
            None => {
                info!("Stored token no longer readable, starting signed out");
                inner.token = None;
                self.state.send_replace(SessionState::Unauthenticated);
                return None;
            }
        }

        match resolved {
            Ok(user) => {
                info!(username = %user.username, "Session restored");
                inner.token = Some(token.clone());
                self.state.send_replace(SessionState::Authenticated(user));
            }
            Err(e) => {
                warn!(error = %e, "Stored token rejected, signing out");
                inner.token = None;
                if let Err(e) = self.store.clear() {
                    warn!(error = %e, "Failed to purge stored token");
                }
                self.state.send_replace(SessionState::Unauthenticated);
            }
        }
        None
    }

    /// Sign in with a username and password.
    pub async fn login(&self, username: &str, password: &str) -> Result<User, AuthFailure> {
        validate_login(username, password)?;
        let _latch = self
            .in_flight
            .try_lock()
            .map_err(|_| AuthFailure::OperationInProgress)?;
        let epoch = self.lock_inner().epoch;

        match self.sign_in(epoch, username, password).await {
            Ok(user) => Ok(user),
            Err(failure) => Err(self.fail(epoch, failure)),
        }
    }

    /// Create an account, then sign in with the same credentials.
    ///
    /// Password confirmation is the caller's job.
    pub async fn register(
        &self,
        username: &str,
        email: &str,
        password: &str,
    ) -> Result<User, AuthFailure> {
        validate_registration(username, email, password)?;
        let _latch = self
            .in_flight
            .try_lock()
            .map_err(|_| AuthFailure::OperationInProgress)?;
        let epoch = self.lock_inner().epoch;

        info!(username = username, "Registering account");
        if let Err(failure) = self.authenticator.register(username, email, password).await {
            return Err(self.fail(epoch, failure));
        }

        match self.sign_in(epoch, username, password).await {
            Ok(user) => Ok(user),
            Err(AuthFailure::Superseded) => Err(AuthFailure::Superseded),
            Err(cause) => {
                warn!(error = %cause, "Account created but follow-up login failed");
                Err(self.fail(
                    epoch,
                    AuthFailure::RegistrationThenLoginMismatch(Box::new(cause)),
                ))
            }
        }
    }

    /// Forget the session. No network call; safe to repeat from any state.
    pub fn logout(&self) {
        let mut inner = self.lock_inner();
        inner.epoch += 1;
        inner.token = None;
        if let Err(e) = self.store.clear() {
            warn!(error = %e, "Failed to clear stored token");
        }
        self.state.send_replace(SessionState::Unauthenticated);
        drop(inner);
        info!("Signed out");
    }

    // =========================================================================
    // Internals
    // =========================================================================

    /// Token request plus identity lookup. Leaves failure transitions to the caller.
    async fn sign_in(&self, epoch: u64, username: &str, password: &str) -> Result<User, AuthFailure> {
        info!(username = username, "Signing in");
        let token = self.authenticator.request_token(username, password).await?;

        if !self.transition_if_current(epoch, SessionState::Bootstrapping) {
            return Err(AuthFailure::Superseded);
        }

        let user = self
            .resolver
            .resolve(&token)
            .await
            .map_err(login_resolve_failure)?;

        let mut inner = self.lock_inner();
        if inner.epoch != epoch {
            debug!("Discarding login result after logout");
            return Err(AuthFailure::Superseded);
        }
        if let Err(e) = self.store.set(&token) {
            warn!(error = %e, "Failed to persist token");
        }
        inner.token = Some(token);
        self.state.send_replace(SessionState::Authenticated(user.clone()));
        drop(inner);

        info!(username = %user.username, "Login successful");
        Ok(user)
    }

    /// Record a failed explicit operation, unless a logout has since superseded it.
    fn fail(&self, epoch: u64, failure: AuthFailure) -> AuthFailure {
        let mut inner = self.lock_inner();
        if inner.epoch != epoch {
            return AuthFailure::Superseded;
        }
        inner.token = None;
        self.state.send_replace(SessionState::AuthError(failure.clone()));
        drop(inner);
        warn!(error = %failure, "Authentication failed");
        failure
    }

    fn transition_if_current(&self, epoch: u64, next: SessionState) -> bool {
        let inner = self.lock_inner();
        if inner.epoch != epoch {
            return false;
        }
        self.state.send_replace(next);
        true
    }

    fn lock_inner(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Unreadable storage counts as "no token"
fn read_stored_token(store: &dyn CredentialStore) -> Option<Token> {
    match store.get() {
        Ok(token) => token.filter(|t| !t.is_empty()),
        Err(e) => {
            warn!(error = %e, "Failed to read stored token");
            None
        }
    }
}

fn login_resolve_failure(err: ResolveError) -> AuthFailure {
    match err {
        ResolveError::Unauthorized => {
            AuthFailure::ServerError("issued token was rejected by /users/me".to_string())
        }
        ResolveError::NetworkFailure(reason) => AuthFailure::NetworkFailure(reason),
        ResolveError::MalformedResponse(reason) => AuthFailure::ServerError(reason),
    }
}

fn validate_login(username: &str, password: &str) -> Result<(), AuthFailure> {
    if username.trim().is_empty() || password.is_empty() {
        return Err(AuthFailure::InvalidInput(
            "Username and password required".to_string(),
        ));
    }
    Ok(())
}

fn validate_registration(username: &str, email: &str, password: &str) -> Result<(), AuthFailure> {
    validate_login(username, password)?;
    if !is_valid_email(email) {
        return Err(AuthFailure::InvalidInput(format!(
            "'{}' is not a valid email address",
            email
        )));
    }
    Ok(())
}

// ============================================================================
// Tests
// ============================================================================
