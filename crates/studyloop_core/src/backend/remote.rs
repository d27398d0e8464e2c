//! Synced remote store contract and in-memory implementation.
//!
//! # Responsibility
//! - Define remote write/read/subscribe error semantics.
//! - Provide an in-process `RemoteStore` used by tests and offline sessions.
//!
//! # Invariants
//! - `subscribe` delivers the current value synchronously before returning.
//! - Cancelled subscriptions receive no further deliveries.
//! - Handlers must not call back into the same store synchronously.

use crate::backend::{RemoteStore, SnapshotHandler, Subscription};
use log::debug;
use serde_json::Value;
use std::collections::BTreeMap;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

/// Failure writing to or reading from the remote store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RemoteError {
    Network(String),
    PermissionDenied(String),
}

impl Display for RemoteError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Network(message) => write!(f, "remote network failure: {message}"),
            Self::PermissionDenied(message) => write!(f, "remote write rejected: {message}"),
        }
    }
}

impl Error for RemoteError {}

struct Subscriber {
    path: String,
    active: Arc<AtomicBool>,
    handler: SnapshotHandler,
}

#[derive(Default)]
struct RemoteState {
    documents: BTreeMap<String, Value>,
    fail_writes: Option<RemoteError>,
}

/// In-memory remote store with live subscriptions.
///
/// Doubles as the test fixture for every remote-backed flow and as an
/// offline stand-in when no real backend adapter is wired.
#[derive(Default)]
pub struct MemoryRemoteStore {
    state: Mutex<RemoteState>,
    subscribers: Mutex<Vec<Subscriber>>,
}

impl MemoryRemoteStore {
    pub fn new() -> Arc<MemoryRemoteStore> {
        Arc::new(MemoryRemoteStore::default())
    }

    /// Makes every subsequent write/delete fail with the given error.
    /// Pass `None` to restore normal behavior.
    pub fn set_fail_writes(&self, failure: Option<RemoteError>) {
        self.lock_state().fail_writes = failure;
    }

    /// Snapshot of one stored document, bypassing error injection.
    pub fn document(&self, path: &str) -> Option<Value> {
        self.lock_state().documents.get(path).cloned()
    }

    fn lock_state(&self) -> MutexGuard<'_, RemoteState> {
        match self.state.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    fn lock_subscribers(&self) -> MutexGuard<'_, Vec<Subscriber>> {
        match self.subscribers.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    fn notify(&self, path: &str, value: Option<&Value>) {
        // Subscribers are taken out of the lock for dispatch so a handler
        // registering a new subscription does not deadlock.
        let mut dispatched = std::mem::take(&mut *self.lock_subscribers());
        for subscriber in dispatched.iter_mut() {
            if subscriber.path == path && subscriber.active.load(Ordering::SeqCst) {
                (subscriber.handler)(value.cloned());
            }
        }

        let mut guard = self.lock_subscribers();
        dispatched.extend(guard.drain(..));
        dispatched.retain(|subscriber| subscriber.active.load(Ordering::SeqCst));
        *guard = dispatched;
    }
}

impl RemoteStore for MemoryRemoteStore {
    fn write(&self, path: &str, document: &Value) -> Result<(), RemoteError> {
        {
            let mut state = self.lock_state();
            if let Some(failure) = state.fail_writes.clone() {
                return Err(failure);
            }
            state.documents.insert(path.to_string(), document.clone());
        }
        debug!("event=remote_write module=backend status=ok path={path}");
        self.notify(path, Some(document));
        Ok(())
    }

    fn read_once(&self, path: &str) -> Result<Option<Value>, RemoteError> {
        let state = self.lock_state();
        if let Some(document) = state.documents.get(path) {
            return Ok(Some(document.clone()));
        }
        // Reading a collection root folds its children into one object
        // keyed by the remainder of the path.
        let prefix = format!("{path}/");
        let children: serde_json::Map<String, Value> = state
            .documents
            .range(prefix.clone()..)
            .take_while(|(key, _)| key.starts_with(&prefix))
            .map(|(key, value)| (key[prefix.len()..].to_string(), value.clone()))
            .collect();
        if children.is_empty() {
            Ok(None)
        } else {
            Ok(Some(Value::Object(children)))
        }
    }

    fn delete(&self, path: &str) -> Result<(), RemoteError> {
        {
            let mut state = self.lock_state();
            if let Some(failure) = state.fail_writes.clone() {
                return Err(failure);
            }
            state.documents.remove(path);
        }
        debug!("event=remote_delete module=backend status=ok path={path}");
        self.notify(path, None);
        Ok(())
    }

    fn subscribe(&self, path: &str, mut handler: SnapshotHandler) -> Subscription {
        let current = self.lock_state().documents.get(path).cloned();
        handler(current);

        let active = Arc::new(AtomicBool::new(true));
        self.lock_subscribers().push(Subscriber {
            path: path.to_string(),
            active: Arc::clone(&active),
            handler,
        });

        Subscription::new(move || {
            active.store(false, Ordering::SeqCst);
        })
    }
}

#[cfg(test)]
mod tests {
    use super::{MemoryRemoteStore, RemoteError};
    use crate::backend::RemoteStore;
    use serde_json::json;
    use std::sync::mpsc;

    #[test]
    fn subscribe_delivers_current_value_then_updates() {
        let remote = MemoryRemoteStore::new();
        remote.write("users/u1", &json!({"points": 1})).unwrap();

        let (sender, receiver) = mpsc::channel();
        let _subscription = remote.subscribe(
            "users/u1",
            Box::new(move |value| {
                let _ = sender.send(value);
            }),
        );

        assert_eq!(receiver.recv().unwrap(), Some(json!({"points": 1})));

        remote.write("users/u1", &json!({"points": 2})).unwrap();
        assert_eq!(receiver.recv().unwrap(), Some(json!({"points": 2})));
    }

    #[test]
    fn cancelled_subscription_stops_deliveries() {
        let remote = MemoryRemoteStore::new();
        let (sender, receiver) = mpsc::channel();
        let subscription = remote.subscribe(
            "invites/u2",
            Box::new(move |value| {
                let _ = sender.send(value);
            }),
        );
        assert_eq!(receiver.recv().unwrap(), None);

        subscription.cancel();
        remote.write("invites/u2", &json!({"roomLink": "x"})).unwrap();
        assert!(receiver.try_recv().is_err());
    }

    #[test]
    fn delete_notifies_subscribers_with_none() {
        let remote = MemoryRemoteStore::new();
        remote.write("invites/u3", &json!({"roomLink": "y"})).unwrap();

        let (sender, receiver) = mpsc::channel();
        let _subscription = remote.subscribe(
            "invites/u3",
            Box::new(move |value| {
                let _ = sender.send(value);
            }),
        );
        assert!(receiver.recv().unwrap().is_some());

        remote.delete("invites/u3").unwrap();
        assert_eq!(receiver.recv().unwrap(), None);
    }

    #[test]
    fn collection_root_read_folds_children() {
        let remote = MemoryRemoteStore::new();
        remote
            .write("leaderboard/u1", &json!({"points": 40}))
            .unwrap();
        remote
            .write("leaderboard/u2", &json!({"points": 90}))
            .unwrap();

        let folded = remote.read_once("leaderboard").unwrap().unwrap();
        assert_eq!(
            folded,
            json!({"u1": {"points": 40}, "u2": {"points": 90}})
        );
        assert_eq!(remote.read_once("rooms").unwrap(), None);
    }

    #[test]
    fn injected_failure_blocks_writes_until_cleared() {
        let remote = MemoryRemoteStore::new();
        remote.set_fail_writes(Some(RemoteError::Network("offline".to_string())));

        let err = remote.write("users/u4", &json!({})).unwrap_err();
        assert!(matches!(err, RemoteError::Network(_)));
        assert_eq!(remote.document("users/u4"), None);

        remote.set_fail_writes(None);
        remote.write("users/u4", &json!({})).unwrap();
        assert!(remote.document("users/u4").is_some());
    }
}
