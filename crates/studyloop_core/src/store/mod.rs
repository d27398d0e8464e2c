//! Planner store layer: aggregate ownership and persistence.
//!
//! # Responsibility
//! - Define the error taxonomy for planner operations.
//! - Host the store that owns the aggregate and funnels every mutation.
//!
//! # Invariants
//! - Aggregate invariants (non-empty names, slot overlap freedom, shop
//!   ownership rules) are enforced here, in one place, not in callers.
//! - A failed validation leaves the aggregate untouched.

pub mod planner_store;

pub use planner_store::{
    PlannerStore, SnapshotOutcome, ToggleOutcome, HIGH_PRIORITY_TASK_POINTS,
    STANDARD_TASK_POINTS,
};

use crate::backend::{AuthError, RemoteError};
use crate::model::catalog::ItemCategory;
use crate::model::entities::{ClockTimeParseError, Day, EntryId};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Rejected user input. The aggregate is unchanged when one of these is
/// returned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// A required form field is missing or blank.
    MissingField(&'static str),
    /// A time-of-day field did not parse as `"HH:MM"`.
    InvalidTime(ClockTimeParseError),
    /// A due-date field did not parse as a calendar date.
    InvalidDueDate(String),
    /// Slot start is not strictly before its end.
    InvalidTimeRange,
    /// The candidate slot overlaps an existing slot on the same day.
    ScheduleConflict { day: Day },
    /// No entity with this id exists in the aggregate.
    EntryNotFound(EntryId),
    /// No such item in the category's catalog.
    UnknownItem {
        category: ItemCategory,
        item_id: String,
    },
    /// The item is already in the inventory.
    ItemAlreadyOwned { item_id: String },
    /// Equip attempted on an item that was never bought.
    ItemNotOwned { item_id: String },
    /// Buying requires `points >= price`.
    InsufficientPoints { price: i64, points: i64 },
    /// The operation requires a signed-in session.
    NotSignedIn,
    /// Only one study room may be active per session.
    RoomAlreadyActive,
    /// No study room is currently active.
    NoActiveRoom,
}

impl Display for ValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingField(field) => write!(f, "please provide a {field}"),
            Self::InvalidTime(err) => write!(f, "{err}"),
            Self::InvalidDueDate(value) => write!(f, "invalid due date `{value}`"),
            Self::InvalidTimeRange => write!(f, "start time must be before end time"),
            Self::ScheduleConflict { day } => {
                write!(f, "time conflict with an existing class on {day}")
            }
            Self::EntryNotFound(id) => write!(f, "entry not found: {id}"),
            Self::UnknownItem { category, item_id } => {
                write!(f, "unknown {category} item: {item_id}")
            }
            Self::ItemAlreadyOwned { item_id } => write!(f, "item already owned: {item_id}"),
            Self::ItemNotOwned { item_id } => {
                write!(f, "item must be bought before equipping: {item_id}")
            }
            Self::InsufficientPoints { price, points } => {
                write!(f, "not enough points: need {price}, have {points}")
            }
            Self::NotSignedIn => write!(f, "sign in to use this feature"),
            Self::RoomAlreadyActive => write!(f, "a study room is already active"),
            Self::NoActiveRoom => write!(f, "no study room is active"),
        }
    }
}

impl Error for ValidationError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::InvalidTime(err) => Some(err),
            _ => None,
        }
    }
}

impl From<ClockTimeParseError> for ValidationError {
    fn from(value: ClockTimeParseError) -> Self {
        Self::InvalidTime(value)
    }
}

/// Unified error for callers that cross layer boundaries.
#[derive(Debug)]
pub enum PlannerError {
    Validation(ValidationError),
    BackendWrite(RemoteError),
    Auth(AuthError),
}

impl Display for PlannerError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::BackendWrite(err) => write!(f, "{err}"),
            Self::Auth(err) => write!(f, "{err}"),
        }
    }
}

impl Error for PlannerError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::BackendWrite(err) => Some(err),
            Self::Auth(err) => Some(err),
        }
    }
}

impl From<ValidationError> for PlannerError {
    fn from(value: ValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<RemoteError> for PlannerError {
    fn from(value: RemoteError) -> Self {
        Self::BackendWrite(value)
    }
}

impl From<AuthError> for PlannerError {
    fn from(value: AuthError) -> Self {
        Self::Auth(value)
    }
}
