//! Planner entities: subjects, schedule slots, tasks.
//!
//! # Responsibility
//! - Define the records stored inside the planner aggregate.
//! - Provide the time-of-day type and the slot overlap predicate.
//!
//! # Invariants
//! - Serialized field names match the persisted document shape
//!   (`subjectId`, `dueDate`, `isCompleted`, full weekday names).
//! - `ScheduleSlot` intervals are half-open: a slot ending at 10:00 does not
//!   overlap one starting at 10:00.

use chrono::{NaiveDate, Weekday};
use serde::de::Error as DeError;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::str::FromStr;
use uuid::Uuid;

/// Stable identifier for subjects, slots and tasks.
pub type EntryId = Uuid;

/// Subject priority, which drives task completion awards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Priority {
    High,
    Medium,
    Low,
}

/// Day of the weekly schedule, serialized as the full English name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Day {
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
    Sunday,
}

impl Day {
    /// All days in schedule display order, Monday first.
    pub const ALL: [Day; 7] = [
        Day::Monday,
        Day::Tuesday,
        Day::Wednesday,
        Day::Thursday,
        Day::Friday,
        Day::Saturday,
        Day::Sunday,
    ];

    /// Maps a calendar date to its schedule day.
    pub fn from_date(date: NaiveDate) -> Day {
        match chrono::Datelike::weekday(&date) {
            Weekday::Mon => Day::Monday,
            Weekday::Tue => Day::Tuesday,
            Weekday::Wed => Day::Wednesday,
            Weekday::Thu => Day::Thursday,
            Weekday::Fri => Day::Friday,
            Weekday::Sat => Day::Saturday,
            Weekday::Sun => Day::Sunday,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Day::Monday => "Monday",
            Day::Tuesday => "Tuesday",
            Day::Wednesday => "Wednesday",
            Day::Thursday => "Thursday",
            Day::Friday => "Friday",
            Day::Saturday => "Saturday",
            Day::Sunday => "Sunday",
        }
    }
}

impl Display for Day {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Error for malformed `"HH:MM"` time-of-day input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClockTimeParseError {
    pub input: String,
}

impl Display for ClockTimeParseError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "invalid time of day `{}`; expected HH:MM", self.input)
    }
}

impl Error for ClockTimeParseError {}

/// Time of day with minute resolution, stored as minutes since midnight.
///
/// Serialized as zero-padded 24h `"HH:MM"`, so lexicographic order on the
/// persisted form agrees with the numeric order used here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ClockTime(u16);

impl ClockTime {
    /// Builds a time from hour and minute components.
    ///
    /// Returns `None` when `hour > 23` or `minute > 59`.
    pub fn new(hour: u16, minute: u16) -> Option<ClockTime> {
        if hour > 23 || minute > 59 {
            return None;
        }
        Some(ClockTime(hour * 60 + minute))
    }

    pub fn hour(self) -> u16 {
        self.0 / 60
    }

    pub fn minute(self) -> u16 {
        self.0 % 60
    }

    /// Minutes since midnight.
    pub fn total_minutes(self) -> u16 {
        self.0
    }

    /// Presentation form with a 12-hour clock, e.g. `"1:05 PM"`.
    pub fn format_12h(self) -> String {
        let hour = self.hour();
        let meridiem = if hour >= 12 { "PM" } else { "AM" };
        let hour_12 = match hour % 12 {
            0 => 12,
            other => other,
        };
        format!("{hour_12}:{:02} {meridiem}", self.minute())
    }
}

impl Display for ClockTime {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:02}:{:02}", self.hour(), self.minute())
    }
}

impl FromStr for ClockTime {
    type Err = ClockTimeParseError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let parse_error = || ClockTimeParseError {
            input: value.to_string(),
        };
        let (hour_text, minute_text) = value.trim().split_once(':').ok_or_else(parse_error)?;
        let hour: u16 = hour_text.parse().map_err(|_| parse_error())?;
        let minute: u16 = minute_text.parse().map_err(|_| parse_error())?;
        ClockTime::new(hour, minute).ok_or_else(parse_error)
    }
}

impl Serialize for ClockTime {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for ClockTime {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        text.parse().map_err(|err: ClockTimeParseError| {
            D::Error::custom(format!("{err}"))
        })
    }
}

/// A course of study the user is planning around.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subject {
    pub id: EntryId,
    /// Non-empty display name.
    pub name: String,
    pub priority: Priority,
    /// Display hex color, e.g. `"#6366f1"`. Not validated beyond presence.
    pub color: String,
}

impl Subject {
    pub fn new(name: impl Into<String>, priority: Priority, color: impl Into<String>) -> Subject {
        Subject {
            id: Uuid::new_v4(),
            name: name.into(),
            priority,
            color: color.into(),
        }
    }
}

/// A recurring weekly class/study block tied to a subject.
///
/// `subject_id` may dangle after the subject is deleted; views render a
/// fallback label in that case.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleSlot {
    pub id: EntryId,
    pub subject_id: EntryId,
    pub day: Day,
    pub start: ClockTime,
    pub end: ClockTime,
}

impl ScheduleSlot {
    pub fn new(subject_id: EntryId, day: Day, start: ClockTime, end: ClockTime) -> ScheduleSlot {
        ScheduleSlot {
            id: Uuid::new_v4(),
            subject_id,
            day,
            start,
            end,
        }
    }

    /// Half-open interval overlap test against another slot on the same day.
    ///
    /// Slots on different days never overlap. Touching boundaries
    /// (`self.end == other.start`) do not count as overlap.
    pub fn overlaps(&self, other: &ScheduleSlot) -> bool {
        self.day == other.day && self.start < other.end && other.start < self.end
    }
}

/// Category of a task, used for dashboard exam counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TaskKind {
    Assignment,
    Exam,
    Project,
    Review,
}

/// A dated piece of work tied to a subject.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: EntryId,
    /// Non-empty title.
    pub title: String,
    pub subject_id: EntryId,
    #[serde(rename = "type")]
    pub kind: TaskKind,
    pub due_date: NaiveDate,
    pub is_completed: bool,
}

impl Task {
    pub fn new(
        title: impl Into<String>,
        subject_id: EntryId,
        kind: TaskKind,
        due_date: NaiveDate,
    ) -> Task {
        Task {
            id: Uuid::new_v4(),
            title: title.into(),
            subject_id,
            kind,
            due_date,
            is_completed: false,
        }
    }

    /// A task is overdue when it is incomplete and due strictly before today.
    pub fn is_overdue(&self, today: NaiveDate) -> bool {
        !self.is_completed && self.due_date < today
    }
}
