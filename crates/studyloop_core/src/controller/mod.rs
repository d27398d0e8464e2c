//! Planner controller layer: user-intent orchestration.
//!
//! # Responsibility
//! - Translate presentation intents (forms, clicks, navigation) into store
//!   operations and re-render requests.
//! - Host the derived views, the focus timer and the study-room flow.
//!
//! # Invariants
//! - The controller never touches the persisted representation; every
//!   mutation goes through the store's operation set.

pub mod core;
pub mod rooms;
pub mod timer;
pub mod views;

pub use core::{PlannerController, SlotForm, SubjectForm, TaskForm};
pub use rooms::{RoomInvite, ROOM_COMPLETION_POINTS};
pub use timer::{FocusTimer, TimerTick, FOCUS_COMPLETION_POINTS, FOCUS_SESSION_SECS};
pub use views::{
    analytics, dashboard_summary, filter_tasks, rank_leaderboard, schedule_by_day, subject_label,
    today_agenda, AnalyticsSummary, DashboardSummary, SubjectBar, TaskFilter, FALLBACK_COLOR,
};
