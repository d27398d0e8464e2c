//! Study-room invitation records.
//!
//! # Responsibility
//! - Define the invitation document published to `invites/<invitee>`.
//!
//! # Invariants
//! - Invitations are session-scoped: accepting or declining clears the
//!   record; nothing about rooms is ever written into the aggregate.

use crate::backend::Identity;
use serde::{Deserialize, Serialize};

/// Points awarded when the user ends an active study-room session.
pub const ROOM_COMPLETION_POINTS: i64 = 20;

/// An invitation addressed to one user, published by the inviting session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomInvite {
    pub from_uid: String,
    pub from_name: String,
    /// External meeting link for the active room.
    pub room_link: String,
    /// Unix epoch milliseconds at publish time.
    pub sent_at_ms: i64,
}

impl RoomInvite {
    /// Builds an invitation from the sender's identity and active room link.
    pub fn new(sender: &Identity, room_link: impl Into<String>) -> RoomInvite {
        RoomInvite {
            from_uid: sender.uid.clone(),
            from_name: sender.display_name.clone(),
            room_link: room_link.into(),
            sent_at_ms: chrono::Utc::now().timestamp_millis(),
        }
    }
}
