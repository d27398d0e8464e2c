//! Presentation port: the seam between the core and any UI.
//!
//! # Responsibility
//! - Define the re-render / notification / cue / prompt surface the
//!   controller pushes into.
//! - Provide a recording implementation for tests.
//!
//! # Invariants
//! - The core never renders anything itself; it only hands snapshots and
//!   notices to this port.
//! - Notices are transient: the port decides how long to show them.

use crate::controller::rooms::RoomInvite;
use crate::model::aggregate::PlannerAggregate;
use std::sync::{Mutex, MutexGuard};

/// Navigable application section.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Section {
    Dashboard,
    Subjects,
    Schedule,
    Tasks,
    Analytics,
    Shop,
    Leaderboard,
    Rooms,
}

impl Section {
    pub fn title(self) -> &'static str {
        match self {
            Section::Dashboard => "Dashboard",
            Section::Subjects => "Subjects",
            Section::Schedule => "Schedule",
            Section::Tasks => "Tasks",
            Section::Analytics => "Analytics",
            Section::Shop => "Shop",
            Section::Leaderboard => "Leaderboard",
            Section::Rooms => "Study Rooms",
        }
    }
}

/// Severity of a transient user-visible notice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    Info,
    Success,
    Error,
}

/// One transient user-visible message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub kind: NoticeKind,
    pub message: String,
}

impl Notice {
    pub fn info(message: impl Into<String>) -> Notice {
        Notice {
            kind: NoticeKind::Info,
            message: message.into(),
        }
    }

    pub fn success(message: impl Into<String>) -> Notice {
        Notice {
            kind: NoticeKind::Success,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Notice {
        Notice {
            kind: NoticeKind::Error,
            message: message.into(),
        }
    }
}

/// Feedback sound requested by the core. The port resolves the actual audio
/// using the equipped sound item from the snapshot it renders.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SoundCue {
    TaskComplete,
    FocusComplete,
    Purchase,
}

/// User's answer to a study-room invitation prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InviteResponse {
    Accepted,
    Declined,
}

/// Transient-notification capability, held by the store for save/points
/// feedback.
pub trait Notifier: Send + Sync {
    fn notify(&self, notice: Notice);
}

/// Full presentation capability consumed by the controller.
pub trait PresentationPort: Notifier {
    /// Re-renders one section with the current aggregate snapshot.
    fn render(&self, section: Section, snapshot: &PlannerAggregate);
    /// Plays a feedback cue.
    fn play_cue(&self, cue: SoundCue);
    /// Applies the effective theme to the chrome.
    fn apply_theme(&self, theme: &str);
    /// Presents an accept/decline prompt for a received invitation.
    fn prompt_invite(&self, invite: &RoomInvite) -> InviteResponse;
}

/// Presentation double that records every interaction.
pub struct RecordingPresenter {
    notices: Mutex<Vec<Notice>>,
    renders: Mutex<Vec<Section>>,
    cues: Mutex<Vec<SoundCue>>,
    themes: Mutex<Vec<String>>,
    invites: Mutex<Vec<RoomInvite>>,
    invite_response: Mutex<InviteResponse>,
}

impl Default for RecordingPresenter {
    fn default() -> RecordingPresenter {
        RecordingPresenter {
            notices: Mutex::new(Vec::new()),
            renders: Mutex::new(Vec::new()),
            cues: Mutex::new(Vec::new()),
            themes: Mutex::new(Vec::new()),
            invites: Mutex::new(Vec::new()),
            invite_response: Mutex::new(InviteResponse::Declined),
        }
    }
}

impl RecordingPresenter {
    pub fn new() -> RecordingPresenter {
        RecordingPresenter::default()
    }

    /// Sets the answer returned from subsequent invitation prompts.
    pub fn set_invite_response(&self, response: InviteResponse) {
        *lock(&self.invite_response) = response;
    }

    pub fn notices(&self) -> Vec<Notice> {
        lock(&self.notices).clone()
    }

    pub fn renders(&self) -> Vec<Section> {
        lock(&self.renders).clone()
    }

    pub fn cues(&self) -> Vec<SoundCue> {
        lock(&self.cues).clone()
    }

    pub fn applied_themes(&self) -> Vec<String> {
        lock(&self.themes).clone()
    }

    pub fn prompted_invites(&self) -> Vec<RoomInvite> {
        lock(&self.invites).clone()
    }

    pub fn last_notice(&self) -> Option<Notice> {
        lock(&self.notices).last().cloned()
    }
}

impl Notifier for RecordingPresenter {
    fn notify(&self, notice: Notice) {
        lock(&self.notices).push(notice);
    }
}

impl PresentationPort for RecordingPresenter {
    fn render(&self, section: Section, _snapshot: &PlannerAggregate) {
        lock(&self.renders).push(section);
    }

    fn play_cue(&self, cue: SoundCue) {
        lock(&self.cues).push(cue);
    }

    fn apply_theme(&self, theme: &str) {
        lock(&self.themes).push(theme.to_string());
    }

    fn prompt_invite(&self, invite: &RoomInvite) -> InviteResponse {
        lock(&self.invites).push(invite.clone());
        *lock(&self.invite_response)
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    match mutex.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}
