//! The planner store: owns the aggregate and its persistence.
//!
//! # Responsibility
//! - Load the aggregate from the active backend and repair its shape.
//! - Funnel every entity, points and shop mutation through one operation set.
//! - Persist the whole document after each mutation, mirroring locally and
//!   republishing the leaderboard projection while signed in.
//!
//! # Invariants
//! - Saves always write the entire aggregate, never a partial document.
//! - Remote write failures are reported and logged but never block the
//!   local mirror write, and are never rolled back.
//! - Deleting a subject does not cascade; dependent slots/tasks keep their
//!   dangling `subject_id`.

use crate::backend::{
    leaderboard_path, user_doc_path, Identity, LocalStore, RemoteStore, LOCAL_STORAGE_KEY,
};
use crate::model::aggregate::{LeaderboardEntry, PlannerAggregate, DEFAULT_THEME};
use crate::model::catalog::{find_item, ItemCategory, ShopItem};
use crate::model::entities::{
    ClockTime, Day, EntryId, Priority, ScheduleSlot, Subject, Task, TaskKind,
};
use crate::present::{Notice, Notifier};
use crate::store::ValidationError;
use chrono::NaiveDate;
use log::{error, info, warn};
use serde_json::Value;
use std::sync::Arc;

/// Points awarded for completing a task whose subject priority is High.
pub const HIGH_PRIORITY_TASK_POINTS: i64 = 20;
/// Points awarded for completing any other task.
pub const STANDARD_TASK_POINTS: i64 = 10;

/// How a remote snapshot delivery was handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SnapshotOutcome {
    /// The remote record was empty: it was seeded from the local backup
    /// (or a fresh default) and written back.
    Seeded,
    /// An existing remote document was adopted after the repair pass.
    Adopted,
}

/// Result of toggling a task's completion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ToggleOutcome {
    pub is_completed: bool,
    /// Signed points change applied to the balance.
    pub points_delta: i64,
}

struct RemoteBinding {
    store: Arc<dyn RemoteStore>,
    identity: Identity,
}

/// Owner of the planner aggregate and its persistence.
pub struct PlannerStore {
    local: Arc<dyn LocalStore>,
    remote: Option<RemoteBinding>,
    notifier: Arc<dyn Notifier>,
    aggregate: PlannerAggregate,
}

impl PlannerStore {
    pub fn new(local: Arc<dyn LocalStore>, notifier: Arc<dyn Notifier>) -> PlannerStore {
        PlannerStore {
            local,
            remote: None,
            notifier,
            aggregate: PlannerAggregate::default(),
        }
    }

    pub fn aggregate(&self) -> &PlannerAggregate {
        &self.aggregate
    }

    pub fn identity(&self) -> Option<&Identity> {
        self.remote.as_ref().map(|binding| &binding.identity)
    }

    /// Loads the aggregate from local storage (the anonymous/local case).
    pub fn load_local(&mut self) {
        self.aggregate = self
            .read_local_backup()
            .unwrap_or_default();
        info!(
            "event=planner_load module=store status=ok mode=local subjects={} tasks={}",
            self.aggregate.subjects.len(),
            self.aggregate.tasks.len()
        );
    }

    /// Binds the store to a signed-in identity's remote record.
    ///
    /// The caller is responsible for subscribing to the record and feeding
    /// deliveries into [`PlannerStore::apply_remote_snapshot`].
    pub fn connect_remote(&mut self, store: Arc<dyn RemoteStore>, identity: Identity) {
        info!(
            "event=planner_connect module=store status=ok uid={}",
            identity.uid
        );
        self.remote = Some(RemoteBinding { store, identity });
    }

    /// Detaches from the remote record and falls back to local data.
    pub fn disconnect_remote(&mut self) {
        if self.remote.take().is_some() {
            info!("event=planner_disconnect module=store status=ok");
        }
        self.load_local();
    }

    /// Applies one delivery from the live remote subscription.
    ///
    /// The subscription fires on subscribe and on every remote change; each
    /// delivery re-runs the repair pass. An absent remote value triggers the
    /// one-time seeding behavior.
    pub fn apply_remote_snapshot(&mut self, snapshot: Option<Value>) -> SnapshotOutcome {
        match snapshot {
            Some(document) => {
                self.aggregate = PlannerAggregate::from_document(&document);
                info!("event=remote_snapshot module=store status=ok outcome=adopted");
                SnapshotOutcome::Adopted
            }
            None => {
                self.aggregate = self.read_local_backup().unwrap_or_default();
                info!("event=remote_snapshot module=store status=ok outcome=seeded");
                self.save();
                SnapshotOutcome::Seeded
            }
        }
    }

    /// Persists the whole aggregate to the active backend.
    ///
    /// While signed in this writes the remote record, always writes the
    /// local mirror, and republishes the leaderboard projection. Remote
    /// failures are logged and surfaced as notices only.
    pub fn save(&mut self) {
        let document = self.aggregate.to_document();
        let text = document.to_string();

        if let Some(binding) = &self.remote {
            let doc_path = user_doc_path(&binding.identity.uid);
            if let Err(err) = binding.store.write(&doc_path, &document) {
                error!("event=planner_save module=store status=error path={doc_path} error={err}");
                self.notifier
                    .notify(Notice::error(format!("Could not sync your data: {err}")));
            } else {
                info!("event=planner_save module=store status=ok mode=remote path={doc_path}");
            }

            // Lightweight local mirror for resilience; written even when the
            // remote write failed.
            self.local.set(LOCAL_STORAGE_KEY, &text);
            self.publish_leaderboard_entry();
        } else {
            self.local.set(LOCAL_STORAGE_KEY, &text);
            info!("event=planner_save module=store status=ok mode=local");
        }
    }

    /// The public projection republished on every signed-in save.
    pub fn leaderboard_entry(&self) -> Option<LeaderboardEntry> {
        let binding = self.remote.as_ref()?;
        Some(LeaderboardEntry {
            uid: binding.identity.uid.clone(),
            display_name: binding.identity.display_name.clone(),
            photo_url: binding.identity.photo_url.clone(),
            points: self.aggregate.points,
            border: self.aggregate.equipped.border.clone(),
        })
    }

    /// Adds `delta` to the points balance, persists, and signals a notice.
    pub fn update_points(&mut self, delta: i64) {
        self.aggregate.points += delta;
        self.save();
        let message = if delta >= 0 {
            format!("+{delta} points")
        } else {
            format!("{delta} points")
        };
        self.notifier.notify(Notice::success(message));
    }

    /// Replaces the aggregate with a fresh default and persists it.
    pub fn reset(&mut self) {
        self.aggregate = PlannerAggregate::default();
        warn!("event=planner_reset module=store status=ok");
        self.save();
    }

    /// Resolves the effective theme: equipped theme, then the stored
    /// preference, then the default.
    pub fn effective_theme(&self) -> String {
        if let Some(theme) = &self.aggregate.equipped.theme {
            return theme.clone();
        }
        let preference = self.aggregate.preferences.theme.trim();
        if preference.is_empty() {
            DEFAULT_THEME.to_string()
        } else {
            preference.to_string()
        }
    }

    /// Stores a theme preference directly (the non-shop theme toggle).
    ///
    /// An equipped theme item still takes precedence when resolving the
    /// effective theme.
    pub fn set_theme(&mut self, theme: &str) {
        self.aggregate.preferences.theme = theme.to_string();
        self.save();
    }

    /// Notification sink shared with the presentation layer.
    pub fn notifier(&self) -> &dyn Notifier {
        self.notifier.as_ref()
    }

    /// Handle to the bound remote store while signed in.
    pub fn remote_store(&self) -> Option<Arc<dyn RemoteStore>> {
        self.remote.as_ref().map(|binding| Arc::clone(&binding.store))
    }

    /// Pretty-printed aggregate document for the export/download flow.
    pub fn export_json(&self) -> String {
        serde_json::to_string_pretty(&self.aggregate.to_document())
            .unwrap_or_else(|_| "{}".to_string())
    }

    // --- entity operations -------------------------------------------------

    pub fn add_subject(
        &mut self,
        name: &str,
        priority: Priority,
        color: &str,
    ) -> Result<EntryId, ValidationError> {
        let name = non_blank(name, "subject name")?;
        let subject = Subject::new(name, priority, color);
        let id = subject.id;
        self.aggregate.subjects.push(subject);
        self.save();
        Ok(id)
    }

    pub fn update_subject(
        &mut self,
        id: EntryId,
        name: &str,
        priority: Priority,
        color: &str,
    ) -> Result<(), ValidationError> {
        let name = non_blank(name, "subject name")?;
        let subject = self
            .aggregate
            .subjects
            .iter_mut()
            .find(|subject| subject.id == id)
            .ok_or(ValidationError::EntryNotFound(id))?;
        subject.name = name;
        subject.priority = priority;
        subject.color = color.to_string();
        self.save();
        Ok(())
    }

    /// Deletes one subject. Dependent slots and tasks are left in place with
    /// a dangling `subject_id`.
    pub fn delete_subject(&mut self, id: EntryId) -> Result<(), ValidationError> {
        let before = self.aggregate.subjects.len();
        self.aggregate.subjects.retain(|subject| subject.id != id);
        if self.aggregate.subjects.len() == before {
            return Err(ValidationError::EntryNotFound(id));
        }
        self.save();
        Ok(())
    }

    pub fn add_slot(
        &mut self,
        subject_id: EntryId,
        day: Day,
        start: ClockTime,
        end: ClockTime,
    ) -> Result<EntryId, ValidationError> {
        if start >= end {
            return Err(ValidationError::InvalidTimeRange);
        }
        let candidate = ScheduleSlot::new(subject_id, day, start, end);
        if self
            .aggregate
            .schedule
            .iter()
            .any(|slot| slot.overlaps(&candidate))
        {
            return Err(ValidationError::ScheduleConflict { day });
        }
        let id = candidate.id;
        self.aggregate.schedule.push(candidate);
        self.save();
        Ok(id)
    }

    pub fn delete_slot(&mut self, id: EntryId) -> Result<(), ValidationError> {
        let before = self.aggregate.schedule.len();
        self.aggregate.schedule.retain(|slot| slot.id != id);
        if self.aggregate.schedule.len() == before {
            return Err(ValidationError::EntryNotFound(id));
        }
        self.save();
        Ok(())
    }

    pub fn add_task(
        &mut self,
        title: &str,
        subject_id: EntryId,
        kind: TaskKind,
        due_date: NaiveDate,
    ) -> Result<EntryId, ValidationError> {
        let title = non_blank(title, "task title")?;
        let task = Task::new(title, subject_id, kind, due_date);
        let id = task.id;
        self.aggregate.tasks.push(task);
        self.save();
        Ok(id)
    }

    pub fn delete_task(&mut self, id: EntryId) -> Result<(), ValidationError> {
        let before = self.aggregate.tasks.len();
        self.aggregate.tasks.retain(|task| task.id != id);
        if self.aggregate.tasks.len() == before {
            return Err(ValidationError::EntryNotFound(id));
        }
        self.save();
        Ok(())
    }

    /// Flips a task's completion and adjusts points: +award on completion,
    /// -award on un-completion, so an even number of toggles is neutral.
    pub fn toggle_task(&mut self, id: EntryId) -> Result<ToggleOutcome, ValidationError> {
        let task = self
            .aggregate
            .tasks
            .iter_mut()
            .find(|task| task.id == id)
            .ok_or(ValidationError::EntryNotFound(id))?;
        task.is_completed = !task.is_completed;
        let is_completed = task.is_completed;
        let subject_id = task.subject_id;

        let award = match self.aggregate.find_subject(subject_id) {
            Some(subject) if subject.priority == Priority::High => HIGH_PRIORITY_TASK_POINTS,
            _ => STANDARD_TASK_POINTS,
        };
        let points_delta = if is_completed { award } else { -award };
        self.aggregate.points += points_delta;
        self.save();

        Ok(ToggleOutcome {
            is_completed,
            points_delta,
        })
    }

    // --- shop operations ---------------------------------------------------

    /// Buys a catalog item: requires `points >= price`, deducts the price
    /// and adds the item to the inventory. Prices are never refunded.
    pub fn buy_item(
        &mut self,
        category: ItemCategory,
        item_id: &str,
    ) -> Result<&'static ShopItem, ValidationError> {
        let item = find_item(category, item_id).ok_or_else(|| ValidationError::UnknownItem {
            category,
            item_id: item_id.to_string(),
        })?;
        if self.aggregate.owns_item(item.id) {
            return Err(ValidationError::ItemAlreadyOwned {
                item_id: item_id.to_string(),
            });
        }
        if self.aggregate.points < item.price {
            return Err(ValidationError::InsufficientPoints {
                price: item.price,
                points: self.aggregate.points,
            });
        }
        self.aggregate.points -= item.price;
        self.aggregate.inventory.insert(item.id.to_string());
        info!(
            "event=shop_buy module=store status=ok item={} price={}",
            item.id, item.price
        );
        self.save();
        Ok(item)
    }

    /// Equips an owned item. Equipping is exclusive per category; equipping
    /// a theme also updates the stored theme preference.
    pub fn equip_item(
        &mut self,
        category: ItemCategory,
        item_id: &str,
    ) -> Result<(), ValidationError> {
        let item = find_item(category, item_id).ok_or_else(|| ValidationError::UnknownItem {
            category,
            item_id: item_id.to_string(),
        })?;
        if !self.aggregate.owns_item(item.id) {
            return Err(ValidationError::ItemNotOwned {
                item_id: item_id.to_string(),
            });
        }
        self.aggregate.equipped.set(category, Some(item.id.to_string()));
        if category == ItemCategory::Theme {
            self.aggregate.preferences.theme = item.id.to_string();
        }
        info!(
            "event=shop_equip module=store status=ok category={category} item={}",
            item.id
        );
        self.save();
        Ok(())
    }

    // --- helpers -----------------------------------------------------------

    fn read_local_backup(&self) -> Option<PlannerAggregate> {
        let text = self.local.get(LOCAL_STORAGE_KEY)?;
        let document: Value = match serde_json::from_str(&text) {
            Ok(document) => document,
            Err(err) => {
                warn!("event=planner_load module=store status=repair error={err}");
                return None;
            }
        };
        Some(PlannerAggregate::from_document(&document))
    }

    fn publish_leaderboard_entry(&self) {
        let Some(binding) = &self.remote else {
            return;
        };
        let Some(entry) = self.leaderboard_entry() else {
            return;
        };
        let path = leaderboard_path(&binding.identity.uid);
        let document = match serde_json::to_value(&entry) {
            Ok(document) => document,
            Err(err) => {
                error!("event=leaderboard_publish module=store status=error error={err}");
                return;
            }
        };
        if let Err(err) = binding.store.write(&path, &document) {
            error!("event=leaderboard_publish module=store status=error path={path} error={err}");
            self.notifier.notify(Notice::error(format!(
                "Could not update the leaderboard: {err}"
            )));
        }
    }
}

fn non_blank(value: &str, field: &'static str) -> Result<String, ValidationError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::MissingField(field));
    }
    Ok(trimmed.to_string())
}
