//! Planner controller: user intents in, store operations and renders out.
//!
//! # Responsibility
//! - Validate and parse form input, invoke store operations, and push
//!   notices, cues and re-renders to the presentation port.
//! - Own the session-scoped focus timer and study-room state.
//!
//! # Invariants
//! - A rejected operation surfaces a notice and leaves the aggregate
//!   untouched; only successful operations trigger a re-render.
//! - At most one study room is active per session.

use crate::backend::{invites_path, LEADERBOARD_ROOT};
use crate::controller::rooms::{RoomInvite, ROOM_COMPLETION_POINTS};
use crate::controller::timer::{FocusTimer, TimerTick, FOCUS_COMPLETION_POINTS};
use crate::model::aggregate::LeaderboardEntry;
use crate::model::catalog::ItemCategory;
use crate::model::entities::{ClockTime, Day, EntryId, Priority, TaskKind};
use crate::present::{InviteResponse, Notice, PresentationPort, Section, SoundCue};
use crate::store::{PlannerError, PlannerStore, ValidationError};
use chrono::NaiveDate;
use log::{info, warn};
use serde_json::Value;
use std::sync::Arc;

/// Subject create/edit form payload.
#[derive(Debug, Clone)]
pub struct SubjectForm {
    pub name: String,
    pub priority: Priority,
    pub color: String,
}

/// Schedule slot form payload; times arrive as `"HH:MM"` field values.
#[derive(Debug, Clone)]
pub struct SlotForm {
    pub subject_id: EntryId,
    pub day: Day,
    pub start: String,
    pub end: String,
}

/// Task form payload; the due date arrives as a `"YYYY-MM-DD"` field value.
#[derive(Debug, Clone)]
pub struct TaskForm {
    pub title: String,
    pub subject_id: EntryId,
    pub kind: TaskKind,
    pub due_date: String,
}

/// Orchestrates every user intent against the store and presentation port.
pub struct PlannerController<P: PresentationPort> {
    store: PlannerStore,
    presenter: Arc<P>,
    section: Section,
    timer: FocusTimer,
    active_room: Option<String>,
}

impl<P: PresentationPort> PlannerController<P> {
    pub fn new(store: PlannerStore, presenter: Arc<P>) -> PlannerController<P> {
        PlannerController {
            store,
            presenter,
            section: Section::Dashboard,
            timer: FocusTimer::new(),
            active_room: None,
        }
    }

    pub fn store(&self) -> &PlannerStore {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut PlannerStore {
        &mut self.store
    }

    pub fn section(&self) -> Section {
        self.section
    }

    pub fn timer(&self) -> &FocusTimer {
        &self.timer
    }

    pub fn active_room(&self) -> Option<&str> {
        self.active_room.as_deref()
    }

    /// Boots a local (signed-out) session: load, theme, first render.
    pub fn start_local_session(&mut self) {
        self.store.load_local();
        self.apply_theme();
        self.navigate(Section::Dashboard);
    }

    /// Switches the visible section and re-renders it.
    pub fn navigate(&mut self, section: Section) {
        self.section = section;
        self.render(section);
    }

    /// Re-renders the current section with the latest snapshot.
    pub fn rerender(&self) {
        self.render(self.section);
    }

    /// Pushes the effective theme to the presentation chrome.
    pub fn apply_theme(&self) {
        self.presenter.apply_theme(&self.store.effective_theme());
    }

    /// Applies one remote subscription delivery: repair, theme, re-render.
    pub fn on_remote_snapshot(&mut self, snapshot: Option<Value>) {
        self.store.apply_remote_snapshot(snapshot);
        self.apply_theme();
        self.rerender();
    }

    // --- subjects ----------------------------------------------------------

    pub fn submit_subject(&mut self, form: SubjectForm) -> Result<EntryId, ValidationError> {
        let result = self
            .store
            .add_subject(&form.name, form.priority, &form.color);
        let id = self.checked(result)?;
        self.render(Section::Subjects);
        Ok(id)
    }

    pub fn submit_subject_edit(
        &mut self,
        id: EntryId,
        form: SubjectForm,
    ) -> Result<(), ValidationError> {
        let result = self
            .store
            .update_subject(id, &form.name, form.priority, &form.color);
        self.checked(result)?;
        self.render(Section::Subjects);
        Ok(())
    }

    pub fn remove_subject(&mut self, id: EntryId) -> Result<(), ValidationError> {
        let result = self.store.delete_subject(id);
        self.checked(result)?;
        self.render(Section::Subjects);
        Ok(())
    }

    // --- schedule ----------------------------------------------------------

    pub fn submit_slot(&mut self, form: SlotForm) -> Result<EntryId, ValidationError> {
        let result = parse_slot_times(&form).and_then(|(start, end)| {
            self.store.add_slot(form.subject_id, form.day, start, end)
        });
        let id = self.checked(result)?;
        self.render(Section::Schedule);
        Ok(id)
    }

    pub fn remove_slot(&mut self, id: EntryId) -> Result<(), ValidationError> {
        let result = self.store.delete_slot(id);
        self.checked(result)?;
        self.render(Section::Schedule);
        Ok(())
    }

    // --- tasks -------------------------------------------------------------

    pub fn submit_task(&mut self, form: TaskForm) -> Result<EntryId, ValidationError> {
        let result = parse_due_date(&form.due_date).and_then(|due_date| {
            self.store
                .add_task(&form.title, form.subject_id, form.kind, due_date)
        });
        let id = self.checked(result)?;
        self.render(Section::Tasks);
        Ok(id)
    }

    pub fn remove_task(&mut self, id: EntryId) -> Result<(), ValidationError> {
        let result = self.store.delete_task(id);
        self.checked(result)?;
        self.render(Section::Tasks);
        Ok(())
    }

    /// Toggles completion, announces the points change, and plays the
    /// completion cue when a task transitions to done.
    pub fn toggle_task(&mut self, id: EntryId) -> Result<(), ValidationError> {
        let result = self.store.toggle_task(id);
        let outcome = self.checked(result)?;
        if outcome.is_completed {
            self.presenter.notify(Notice::success(format!(
                "Task completed! +{} points",
                outcome.points_delta
            )));
            self.presenter.play_cue(SoundCue::TaskComplete);
        } else {
            self.presenter.notify(Notice::info(format!(
                "Task reopened. {} points",
                outcome.points_delta
            )));
        }
        self.render(Section::Tasks);
        Ok(())
    }

    // --- preferences and data ----------------------------------------------

    pub fn set_theme_preference(&mut self, theme: &str) {
        self.store.set_theme(theme);
        self.apply_theme();
    }

    /// Serialized aggregate handed to the presentation layer for download.
    pub fn export_data(&self) -> String {
        self.store.export_json()
    }

    /// Destructive full reset; the presentation layer is expected to have
    /// confirmed with the user before calling this.
    pub fn reset_data(&mut self) {
        self.store.reset();
        self.apply_theme();
        self.navigate(Section::Dashboard);
    }

    // --- shop --------------------------------------------------------------

    pub fn buy_item(
        &mut self,
        category: ItemCategory,
        item_id: &str,
    ) -> Result<(), ValidationError> {
        let result = self.store.buy_item(category, item_id);
        let item = self.checked(result)?;
        self.presenter
            .notify(Notice::success(format!("Purchased {}!", item.name)));
        self.presenter.play_cue(SoundCue::Purchase);
        self.render(Section::Shop);
        Ok(())
    }

    pub fn equip_item(
        &mut self,
        category: ItemCategory,
        item_id: &str,
    ) -> Result<(), ValidationError> {
        let result = self.store.equip_item(category, item_id);
        self.checked(result)?;
        if category == ItemCategory::Theme {
            self.apply_theme();
        }
        self.render(Section::Shop);
        Ok(())
    }

    // --- leaderboard -------------------------------------------------------

    /// Reads every published leaderboard projection, ranked by points.
    pub fn leaderboard(&self) -> Result<Vec<LeaderboardEntry>, PlannerError> {
        let remote = self
            .store
            .remote_store()
            .ok_or(ValidationError::NotSignedIn)?;
        let document = remote.read_once(LEADERBOARD_ROOT)?;
        Ok(crate::controller::views::rank_leaderboard(
            collect_leaderboard_entries(document),
        ))
    }

    // --- focus timer -------------------------------------------------------

    pub fn start_focus(&mut self) {
        self.timer.start();
    }

    pub fn pause_focus(&mut self) {
        self.timer.pause();
    }

    pub fn reset_focus(&mut self) {
        self.timer.reset();
    }

    /// Advances the focus timer by one second; on completion awards the
    /// fixed bonus and plays the completion cue.
    pub fn tick_focus(&mut self) -> TimerTick {
        let tick = self.timer.tick();
        if tick == TimerTick::Completed {
            info!("event=focus_complete module=controller status=ok");
            self.presenter
                .notify(Notice::success("Focus session complete!"));
            self.presenter.play_cue(SoundCue::FocusComplete);
            self.store.update_points(FOCUS_COMPLETION_POINTS);
        }
        tick
    }

    // --- study rooms -------------------------------------------------------

    /// Records an external meeting link as this session's active room.
    pub fn open_room(&mut self, link: &str) -> Result<(), ValidationError> {
        let result = if self.store.identity().is_none() {
            Err(ValidationError::NotSignedIn)
        } else if self.active_room.is_some() {
            Err(ValidationError::RoomAlreadyActive)
        } else if link.trim().is_empty() {
            Err(ValidationError::MissingField("room link"))
        } else {
            Ok(link.trim().to_string())
        };
        let link = self.checked(result)?;
        info!("event=room_open module=controller status=ok");
        self.active_room = Some(link);
        self.render(Section::Rooms);
        Ok(())
    }

    /// Publishes an invitation for the active room to another user.
    pub fn send_invite(&mut self, invitee_uid: &str) -> Result<(), PlannerError> {
        let (identity, remote) = match (self.store.identity(), self.store.remote_store()) {
            (Some(identity), Some(remote)) => (identity.clone(), remote),
            _ => {
                let err = ValidationError::NotSignedIn;
                self.presenter.notify(Notice::error(err.to_string()));
                return Err(err.into());
            }
        };
        let Some(link) = self.active_room.clone() else {
            let err = ValidationError::NoActiveRoom;
            self.presenter.notify(Notice::error(err.to_string()));
            return Err(err.into());
        };

        let invite = RoomInvite::new(&identity, link);
        // RoomInvite is a plain struct of strings and one integer; its
        // serialization cannot fail.
        let document = serde_json::to_value(&invite).unwrap_or(Value::Null);
        if let Err(err) = remote.write(&invites_path(invitee_uid), &document) {
            warn!("event=room_invite module=controller status=error error={err}");
            self.presenter
                .notify(Notice::error(format!("Could not send the invite: {err}")));
            return Err(err.into());
        }
        info!("event=room_invite module=controller status=ok invitee={invitee_uid}");
        self.presenter.notify(Notice::success("Invite sent!"));
        Ok(())
    }

    /// Presents a received invitation and clears its record regardless of
    /// the answer. Returns the user's response.
    pub fn handle_invite(&mut self, invite: RoomInvite) -> InviteResponse {
        let response = self.presenter.prompt_invite(&invite);
        if let (Some(identity), Some(remote)) = (self.store.identity(), self.store.remote_store())
        {
            let path = invites_path(&identity.uid);
            if let Err(err) = remote.delete(&path) {
                warn!("event=room_invite_clear module=controller status=error error={err}");
            }
        }
        if response == InviteResponse::Accepted {
            self.presenter.notify(Notice::info(format!(
                "Joining {}'s room",
                invite.from_name
            )));
        }
        response
    }

    /// Ends the active room session and awards the fixed bonus.
    pub fn end_room(&mut self) -> Result<(), ValidationError> {
        if self.active_room.take().is_none() {
            let err = ValidationError::NoActiveRoom;
            self.presenter.notify(Notice::error(err.to_string()));
            return Err(err);
        }
        info!("event=room_end module=controller status=ok");
        self.presenter
            .notify(Notice::success("Study session finished!"));
        self.store.update_points(ROOM_COMPLETION_POINTS);
        self.render(Section::Rooms);
        Ok(())
    }

    /// Drops room state without a bonus, used on sign-out teardown.
    pub fn clear_room(&mut self) {
        self.active_room = None;
    }

    // --- helpers -----------------------------------------------------------

    fn render(&self, section: Section) {
        self.presenter.render(section, self.store.aggregate());
    }

    /// Reports a validation failure as a notice and passes the result on.
    fn checked<T>(&self, result: Result<T, ValidationError>) -> Result<T, ValidationError> {
        if let Err(err) = &result {
            self.presenter.notify(Notice::error(err.to_string()));
        }
        result
    }
}

fn parse_slot_times(form: &SlotForm) -> Result<(ClockTime, ClockTime), ValidationError> {
    if form.start.trim().is_empty() {
        return Err(ValidationError::MissingField("start time"));
    }
    if form.end.trim().is_empty() {
        return Err(ValidationError::MissingField("end time"));
    }
    let start: ClockTime = form.start.parse()?;
    let end: ClockTime = form.end.parse()?;
    Ok((start, end))
}

fn parse_due_date(value: &str) -> Result<NaiveDate, ValidationError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::MissingField("due date"));
    }
    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
        .map_err(|_| ValidationError::InvalidDueDate(trimmed.to_string()))
}

fn collect_leaderboard_entries(document: Option<Value>) -> Vec<LeaderboardEntry> {
    let Some(Value::Object(children)) = document else {
        return Vec::new();
    };
    children
        .into_iter()
        .filter_map(|(_, child)| serde_json::from_value(child).ok())
        .collect()
}
