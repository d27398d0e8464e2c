//! Backend capability seams for persistence and identity.
//!
//! # Responsibility
//! - Define the traits the core calls into for local storage, the synced
//!   remote store, and the identity provider.
//! - Provide the cancellable subscription guard shared by all live feeds.
//!
//! # Invariants
//! - `LocalStore` operations never fail at the trait surface; adapter
//!   failures degrade to logged no-ops.
//! - Every live subscription is represented by a `Subscription` whose drop
//!   or explicit cancel stops further deliveries.

pub mod auth;
pub mod local;
pub mod remote;

pub use auth::{AuthError, Identity, IdentityProvider, StaticIdentityProvider};
pub use local::{MemoryLocalStore, SqliteLocalStore, LOCAL_STORAGE_KEY};
pub use remote::{MemoryRemoteStore, RemoteError};

use serde_json::Value;

/// Callback receiving the current remote value, `None` when absent/removed.
pub type SnapshotHandler = Box<dyn FnMut(Option<Value>) + Send>;

/// Callback receiving the current identity, `None` when signed out.
pub type AuthHandler = Box<dyn FnMut(Option<Identity>) + Send>;

/// Synchronous key-value storage capability (browser local storage shaped).
pub trait LocalStore: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: &str);
    fn remove(&self, key: &str);
}

/// Synced remote document store capability.
///
/// `subscribe` delivers the current value immediately and again on every
/// remote change until the returned subscription is cancelled.
pub trait RemoteStore: Send + Sync {
    fn write(&self, path: &str, document: &Value) -> Result<(), RemoteError>;
    fn read_once(&self, path: &str) -> Result<Option<Value>, RemoteError>;
    fn delete(&self, path: &str) -> Result<(), RemoteError>;
    fn subscribe(&self, path: &str, handler: SnapshotHandler) -> Subscription;
}

/// Guard for a live callback registration.
///
/// Cancelling (or dropping) tears the registration down so no further
/// callbacks fire. Teardown must run at most once.
pub struct Subscription {
    cancel: Option<Box<dyn FnOnce() + Send>>,
}

impl Subscription {
    pub fn new(cancel: impl FnOnce() + Send + 'static) -> Subscription {
        Subscription {
            cancel: Some(Box::new(cancel)),
        }
    }

    /// A subscription with no teardown work, for adapters that deliver a
    /// single synchronous snapshot only.
    pub fn noop() -> Subscription {
        Subscription { cancel: None }
    }

    pub fn cancel(mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel();
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel();
        }
    }
}

/// Remote path for one user's planner document.
pub fn user_doc_path(uid: &str) -> String {
    format!("users/{uid}")
}

/// Root of the public leaderboard collection.
pub const LEADERBOARD_ROOT: &str = "leaderboard";

/// Remote path for one user's public leaderboard projection.
pub fn leaderboard_path(uid: &str) -> String {
    format!("{LEADERBOARD_ROOT}/{uid}")
}

/// Remote path for the invitation record addressed to one user.
pub fn invites_path(uid: &str) -> String {
    format!("invites/{uid}")
}
