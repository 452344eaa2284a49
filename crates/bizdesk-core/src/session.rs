//! Session Provider contract and a local implementation.
//!
//! View-models read the current identity at the start of every operation;
//! they never cache it. Shells subscribe to [`AuthState`] changes to reload
//! or clear their view-models when the account changes.

use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

use crate::model::OwnerId;

/// The signed-in account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub id: OwnerId,
    pub email: String,
}

impl Identity {
    pub fn new(id: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            id: OwnerId::new(id),
            email: email.into(),
        }
    }

    /// Local part of the email, used as a display name in chat.
    #[must_use]
    pub fn handle(&self) -> &str {
        self.email.split('@').next().unwrap_or(&self.email)
    }
}

/// Authentication state as observed by subscribers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthState {
    Loading,
    SignedIn(Identity),
    SignedOut,
}

impl AuthState {
    #[must_use]
    pub const fn identity(&self) -> Option<&Identity> {
        match self {
            Self::SignedIn(identity) => Some(identity),
            Self::Loading | Self::SignedOut => None,
        }
    }
}

/// Callback invoked on every auth state change.
pub type AuthCallback = Arc<dyn Fn(&AuthState) + Send + Sync>;

/// Handle returned by [`SessionProvider::on_change`]. Dropping it, or
/// calling [`Subscription::unsubscribe`], stops further callbacks.
pub struct Subscription {
    cancel: Option<Box<dyn FnOnce() + Send>>,
}

impl Subscription {
    pub fn new(cancel: impl FnOnce() + Send + 'static) -> Self {
        Self {
            cancel: Some(Box::new(cancel)),
        }
    }

    pub fn unsubscribe(mut self) {
        self.cancel_now();
    }

    fn cancel_now(&mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel();
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.cancel_now();
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("active", &self.cancel.is_some())
            .finish()
    }
}

/// Source of the current identity.
pub trait SessionProvider: Send + Sync {
    /// The signed-in identity, if any.
    fn current_identity(&self) -> Option<Identity>;

    /// Register for auth state changes.
    fn on_change(&self, callback: AuthCallback) -> Subscription;
}

#[derive(Default)]
struct Listeners {
    next_id: u64,
    entries: Vec<(u64, AuthCallback)>,
}

struct SessionState {
    auth: AuthState,
    listeners: Listeners,
}

/// In-process session driven by explicit sign-in and sign-out calls.
pub struct LocalSession {
    state: Arc<Mutex<SessionState>>,
}

impl LocalSession {
    /// A session with no signed-in account.
    #[must_use]
    pub fn signed_out() -> Self {
        Self::with_state(AuthState::SignedOut)
    }

    /// A session already signed in as `identity`.
    #[must_use]
    pub fn signed_in(identity: Identity) -> Self {
        Self::with_state(AuthState::SignedIn(identity))
    }

    fn with_state(auth: AuthState) -> Self {
        Self {
            state: Arc::new(Mutex::new(SessionState {
                auth,
                listeners: Listeners::default(),
            })),
        }
    }

    fn lock(&self) -> MutexGuard<'_, SessionState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    #[must_use]
    pub fn auth_state(&self) -> AuthState {
        self.lock().auth.clone()
    }

    pub fn sign_in(&self, identity: Identity) {
        self.transition(AuthState::SignedIn(identity));
    }

    pub fn sign_out(&self) {
        self.transition(AuthState::SignedOut);
    }

    pub fn set_loading(&self) {
        self.transition(AuthState::Loading);
    }

    fn transition(&self, next: AuthState) {
        let callbacks: Vec<AuthCallback> = {
            let mut state = self.lock();
            if state.auth == next {
                return;
            }
            state.auth = next.clone();
            state
                .listeners
                .entries
                .iter()
                .map(|(_, callback)| Arc::clone(callback))
                .collect()
        };
        tracing::debug!(state = ?next, "auth state changed");
        for callback in callbacks {
            callback(&next);
        }
    }
}

impl SessionProvider for LocalSession {
    fn current_identity(&self) -> Option<Identity> {
        self.lock().auth.identity().cloned()
    }

    fn on_change(&self, callback: AuthCallback) -> Subscription {
        let id = {
            let mut state = self.lock();
            let id = state.listeners.next_id;
            state.listeners.next_id += 1;
            state.listeners.entries.push((id, callback));
            id
        };
        let weak: Weak<Mutex<SessionState>> = Arc::downgrade(&self.state);
        Subscription::new(move || {
            if let Some(state) = weak.upgrade() {
                state
                    .lock()
                    .unwrap_or_else(PoisonError::into_inner)
                    .listeners
                    .entries
                    .retain(|(entry, _)| *entry != id);
            }
        })
    }
}

impl fmt::Debug for LocalSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.lock();
        f.debug_struct("LocalSession")
            .field("auth", &state.auth)
            .field("listeners", &state.listeners.entries.len())
            .finish()
    }
}
