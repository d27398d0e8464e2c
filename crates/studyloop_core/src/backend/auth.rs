//! Identity provider contract and in-process implementation.
//!
//! # Responsibility
//! - Define the sign-in/sign-out capability and identity record.
//! - Provide a configurable in-process provider for tests and local runs.
//!
//! # Invariants
//! - Auth-state handlers receive the current state immediately on
//!   registration and again on every sign-in/sign-out.

use crate::backend::{AuthHandler, Subscription};
use log::info;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

/// A signed-in user as reported by the identity provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Identity {
    pub uid: String,
    pub display_name: String,
    #[serde(rename = "photoURL")]
    pub photo_url: String,
}

/// Failure from the identity provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    /// The user dismissed the provider's sign-in flow.
    UserCancelled,
    /// The provider rejected or failed the request.
    Provider(String),
}

impl Display for AuthError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UserCancelled => write!(f, "sign-in was cancelled"),
            Self::Provider(message) => write!(f, "identity provider failure: {message}"),
        }
    }
}

impl Error for AuthError {}

/// Identity capability consumed by the session layer.
pub trait IdentityProvider: Send + Sync {
    fn sign_in(&self) -> Result<Identity, AuthError>;
    fn sign_out(&self);
    fn on_auth_state_change(&self, handler: AuthHandler) -> Subscription;
}

struct AuthWatcher {
    active: Arc<AtomicBool>,
    handler: AuthHandler,
}

#[derive(Default)]
struct AuthState {
    current: Option<Identity>,
    sign_in_failure: Option<AuthError>,
}

/// In-process identity provider with one configured account.
///
/// `sign_in` returns the configured identity (or an injected failure) and
/// fires auth-state handlers, mirroring a popup-based provider flow.
pub struct StaticIdentityProvider {
    account: Identity,
    state: Mutex<AuthState>,
    watchers: Mutex<Vec<AuthWatcher>>,
}

impl StaticIdentityProvider {
    pub fn new(account: Identity) -> Arc<StaticIdentityProvider> {
        Arc::new(StaticIdentityProvider {
            account,
            state: Mutex::new(AuthState::default()),
            watchers: Mutex::new(Vec::new()),
        })
    }

    /// Makes the next `sign_in` calls fail with the given error.
    pub fn set_sign_in_failure(&self, failure: Option<AuthError>) {
        self.lock_state().sign_in_failure = failure;
    }

    pub fn current_identity(&self) -> Option<Identity> {
        self.lock_state().current.clone()
    }

    fn lock_state(&self) -> MutexGuard<'_, AuthState> {
        match self.state.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    fn lock_watchers(&self) -> MutexGuard<'_, Vec<AuthWatcher>> {
        match self.watchers.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    fn notify_watchers(&self, identity: Option<&Identity>) {
        let mut dispatched = std::mem::take(&mut *self.lock_watchers());
        for watcher in dispatched.iter_mut() {
            if watcher.active.load(Ordering::SeqCst) {
                (watcher.handler)(identity.cloned());
            }
        }

        let mut guard = self.lock_watchers();
        dispatched.extend(guard.drain(..));
        dispatched.retain(|watcher| watcher.active.load(Ordering::SeqCst));
        *guard = dispatched;
    }
}

impl IdentityProvider for StaticIdentityProvider {
    fn sign_in(&self) -> Result<Identity, AuthError> {
        {
            let mut state = self.lock_state();
            if let Some(failure) = state.sign_in_failure.clone() {
                return Err(failure);
            }
            state.current = Some(self.account.clone());
        }
        info!(
            "event=auth_sign_in module=backend status=ok uid={}",
            self.account.uid
        );
        self.notify_watchers(Some(&self.account));
        Ok(self.account.clone())
    }

    fn sign_out(&self) {
        self.lock_state().current = None;
        info!("event=auth_sign_out module=backend status=ok");
        self.notify_watchers(None);
    }

    fn on_auth_state_change(&self, mut handler: AuthHandler) -> Subscription {
        handler(self.current_identity());

        let active = Arc::new(AtomicBool::new(true));
        self.lock_watchers().push(AuthWatcher {
            active: Arc::clone(&active),
            handler,
        });

        Subscription::new(move || {
            active.store(false, Ordering::SeqCst);
        })
    }
}
