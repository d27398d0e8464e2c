//! The planner aggregate: one persisted document per user.
//!
//! # Responsibility
//! - Hold every entity collection plus preferences and gamification state.
//! - Convert to/from the persisted JSON document, repairing partial shapes.
//!
//! # Invariants
//! - `from_document` never fails: any missing or malformed top-level field is
//!   replaced with its documented default, and a non-numeric `points` value is
//!   coerced to an integer or zero.
//! - The aggregate is persisted whole; there is no partial save shape.

use crate::model::catalog::ItemCategory;
use crate::model::entities::{ScheduleSlot, Subject, Task};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeSet;

/// Theme applied when nothing is equipped and no preference is stored.
pub const DEFAULT_THEME: &str = "light";

/// User preferences stored alongside entity data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Preferences {
    pub theme: String,
}

impl Default for Preferences {
    fn default() -> Preferences {
        Preferences {
            theme: DEFAULT_THEME.to_string(),
        }
    }
}

/// Currently equipped cosmetic item per category.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Equipped {
    pub theme: Option<String>,
    pub border: Option<String>,
    pub sound: Option<String>,
}

impl Equipped {
    pub fn get(&self, category: ItemCategory) -> Option<&str> {
        match category {
            ItemCategory::Theme => self.theme.as_deref(),
            ItemCategory::Border => self.border.as_deref(),
            ItemCategory::Sound => self.sound.as_deref(),
        }
    }

    pub fn set(&mut self, category: ItemCategory, item_id: Option<String>) {
        match category {
            ItemCategory::Theme => self.theme = item_id,
            ItemCategory::Border => self.border = item_id,
            ItemCategory::Sound => self.sound = item_id,
        }
    }
}

/// The whole persisted planner document for one user.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlannerAggregate {
    pub subjects: Vec<Subject>,
    pub schedule: Vec<ScheduleSlot>,
    pub tasks: Vec<Task>,
    pub preferences: Preferences,
    /// Owned cosmetic item ids across all categories.
    pub inventory: BTreeSet<String>,
    pub equipped: Equipped,
    /// Gamification balance. May go negative on revokes; never clamped.
    pub points: i64,
}

impl PlannerAggregate {
    /// Rebuilds an aggregate from a persisted document, repairing shape drift.
    ///
    /// Each top-level field is decoded independently; a field that is missing
    /// or fails to decode falls back to its default instead of failing the
    /// whole load. `points` additionally accepts numeric strings and
    /// fractional numbers from older documents.
    pub fn from_document(document: &Value) -> PlannerAggregate {
        let mut aggregate = PlannerAggregate::default();
        let Some(fields) = document.as_object() else {
            return aggregate;
        };

        if let Some(subjects) = decode_field(fields.get("subjects")) {
            aggregate.subjects = subjects;
        }
        if let Some(schedule) = decode_field(fields.get("schedule")) {
            aggregate.schedule = schedule;
        }
        if let Some(tasks) = decode_field(fields.get("tasks")) {
            aggregate.tasks = tasks;
        }
        if let Some(preferences) = decode_field(fields.get("preferences")) {
            aggregate.preferences = preferences;
        }
        if let Some(inventory) = decode_field(fields.get("inventory")) {
            aggregate.inventory = inventory;
        }
        if let Some(equipped) = decode_field(fields.get("equipped")) {
            aggregate.equipped = equipped;
        }
        aggregate.points = coerce_points(fields.get("points"));

        aggregate
    }

    /// Serializes the whole aggregate as the persisted document.
    pub fn to_document(&self) -> Value {
        // Serialization of this shape cannot fail; every field is a plain
        // collection, string, option or integer.
        serde_json::to_value(self).unwrap_or(Value::Null)
    }

    pub fn find_subject(&self, id: crate::model::entities::EntryId) -> Option<&Subject> {
        self.subjects.iter().find(|subject| subject.id == id)
    }

    pub fn find_task(&self, id: crate::model::entities::EntryId) -> Option<&Task> {
        self.tasks.iter().find(|task| task.id == id)
    }

    pub fn owns_item(&self, item_id: &str) -> bool {
        self.inventory.contains(item_id)
    }
}

/// Public leaderboard projection, republished on every save while signed in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaderboardEntry {
    pub uid: String,
    pub display_name: String,
    #[serde(rename = "photoURL")]
    pub photo_url: String,
    pub points: i64,
    /// Equipped border item id, if any.
    pub border: Option<String>,
}

fn decode_field<T: serde::de::DeserializeOwned>(value: Option<&Value>) -> Option<T> {
    serde_json::from_value(value?.clone()).ok()
}

fn coerce_points(value: Option<&Value>) -> i64 {
    match value {
        Some(Value::Number(number)) => number
            .as_i64()
            .or_else(|| number.as_f64().map(|float| float as i64))
            .unwrap_or(0),
        Some(Value::String(text)) => text.trim().parse().unwrap_or(0),
        _ => 0,
    }
}
