//! Event-driven session loop wiring identity, remote feeds and controller.
//!
//! # Responsibility
//! - Bridge backend callbacks onto a single event queue and apply them on
//!   the session thread via [`PlannerSession::pump`].
//! - Manage the sign-in/sign-out lifecycle: remote binding, the live data
//!   and invitation subscriptions, and their teardown.
//!
//! # Invariants
//! - Backend callbacks never touch session state directly; they only
//!   enqueue events.
//! - Sign-out cancels every live subscription before falling back to local
//!   data, so no stale delivery is applied afterwards.

use crate::backend::{
    invites_path, user_doc_path, Identity, IdentityProvider, RemoteStore, Subscription,
};
use crate::controller::{PlannerController, RoomInvite};
use crate::present::{Notice, PresentationPort};
use crate::store::PlannerError;
use log::{info, warn};
use serde_json::Value;
use std::sync::mpsc::{Receiver, Sender};
use std::sync::Arc;

/// One backend callback delivery, applied on the session thread.
#[derive(Debug)]
pub enum SessionEvent {
    AuthChanged(Option<Identity>),
    RemoteSnapshot(Option<Value>),
    InviteDelivered(Option<Value>),
}

/// Owns the controller plus the live backend subscriptions for one session.
pub struct PlannerSession<P: PresentationPort> {
    controller: PlannerController<P>,
    identity_provider: Arc<dyn IdentityProvider>,
    remote: Arc<dyn RemoteStore>,
    sender: Sender<SessionEvent>,
    receiver: Receiver<SessionEvent>,
    _auth_watch: Subscription,
    data_watch: Option<Subscription>,
    invite_watch: Option<Subscription>,
}

impl<P: PresentationPort> PlannerSession<P> {
    /// Starts a session: boots the local view and begins watching the
    /// identity provider. Call [`PlannerSession::pump`] after each external
    /// stimulus to apply queued events.
    pub fn start(
        mut controller: PlannerController<P>,
        identity_provider: Arc<dyn IdentityProvider>,
        remote: Arc<dyn RemoteStore>,
    ) -> PlannerSession<P> {
        controller.start_local_session();

        let (sender, receiver) = std::sync::mpsc::channel();
        let auth_sender = sender.clone();
        let auth_watch = identity_provider.on_auth_state_change(Box::new(move |identity| {
            let _ = auth_sender.send(SessionEvent::AuthChanged(identity));
        }));

        PlannerSession {
            controller,
            identity_provider,
            remote,
            sender,
            receiver,
            _auth_watch: auth_watch,
            data_watch: None,
            invite_watch: None,
        }
    }

    pub fn controller(&self) -> &PlannerController<P> {
        &self.controller
    }

    pub fn controller_mut(&mut self) -> &mut PlannerController<P> {
        &mut self.controller
    }

    /// Asks the identity provider to sign in; the state change arrives as
    /// an event, so callers should pump afterwards.
    pub fn sign_in(&mut self) -> Result<(), PlannerError> {
        if let Err(err) = self.identity_provider.sign_in() {
            warn!("event=sign_in module=session status=error error={err}");
            self.controller
                .store()
                .notifier()
                .notify(Notice::error(format!("Sign-in failed: {err}")));
            return Err(err.into());
        }
        Ok(())
    }

    pub fn sign_out(&mut self) {
        self.identity_provider.sign_out();
    }

    /// Applies every queued event in order. Returns the number applied.
    pub fn pump(&mut self) -> usize {
        let mut applied = 0;
        while let Ok(event) = self.receiver.try_recv() {
            self.apply(event);
            applied += 1;
        }
        applied
    }

    fn apply(&mut self, event: SessionEvent) {
        match event {
            SessionEvent::AuthChanged(Some(identity)) => self.on_signed_in(identity),
            SessionEvent::AuthChanged(None) => self.on_signed_out(),
            // Deliveries can still be sitting in the queue after sign-out
            // cancelled their subscription; those are dropped here.
            SessionEvent::RemoteSnapshot(_) if self.data_watch.is_none() => {}
            SessionEvent::RemoteSnapshot(snapshot) => {
                self.controller.on_remote_snapshot(snapshot);
            }
            SessionEvent::InviteDelivered(_) if self.invite_watch.is_none() => {}
            SessionEvent::InviteDelivered(Some(document)) => {
                match serde_json::from_value::<RoomInvite>(document) {
                    Ok(invite) => {
                        self.controller.handle_invite(invite);
                    }
                    Err(err) => {
                        warn!(
                            "event=invite_decode module=session status=error error={err}"
                        );
                    }
                }
            }
            SessionEvent::InviteDelivered(None) => {}
        }
    }

    fn on_signed_in(&mut self, identity: Identity) {
        info!(
            "event=session_sign_in module=session status=ok uid={}",
            identity.uid
        );
        self.controller
            .store_mut()
            .connect_remote(Arc::clone(&self.remote), identity.clone());

        let data_sender = self.sender.clone();
        self.data_watch = Some(self.remote.subscribe(
            &user_doc_path(&identity.uid),
            Box::new(move |snapshot| {
                let _ = data_sender.send(SessionEvent::RemoteSnapshot(snapshot));
            }),
        ));

        let invite_sender = self.sender.clone();
        self.invite_watch = Some(self.remote.subscribe(
            &invites_path(&identity.uid),
            Box::new(move |document| {
                let _ = invite_sender.send(SessionEvent::InviteDelivered(document));
            }),
        ));
    }

    fn on_signed_out(&mut self) {
        info!("event=session_sign_out module=session status=ok");
        if let Some(watch) = self.data_watch.take() {
            watch.cancel();
        }
        if let Some(watch) = self.invite_watch.take() {
            watch.cancel();
        }
        self.controller.clear_room();
        self.controller.store_mut().disconnect_remote();
        self.controller.apply_theme();
        self.controller.rerender();
    }
}
