//! Core domain logic for StudyLoop, a gamified personal study planner.
//! This crate is the single source of truth for planner invariants.

pub mod backend;
pub mod controller;
pub mod logging;
pub mod model;
pub mod present;
pub mod session;
pub mod store;

pub use backend::{
    Identity, IdentityProvider, LocalStore, MemoryLocalStore, MemoryRemoteStore, RemoteError,
    RemoteStore, SqliteLocalStore, StaticIdentityProvider, Subscription,
};
pub use controller::{
    FocusTimer, PlannerController, RoomInvite, SlotForm, SubjectForm, TaskForm, TimerTick,
};
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::aggregate::{LeaderboardEntry, PlannerAggregate};
pub use model::entities::{ClockTime, Day, EntryId, Priority, ScheduleSlot, Subject, Task, TaskKind};
pub use present::{
    InviteResponse, Notice, NoticeKind, PresentationPort, RecordingPresenter, Section, SoundCue,
};
pub use session::PlannerSession;
pub use store::{PlannerError, PlannerStore, ValidationError};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::core_version;

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
