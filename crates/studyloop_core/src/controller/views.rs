//! Derived read-only views over the planner aggregate.
//!
//! # Responsibility
//! - Compute the agenda, filtered task lists, analytics aggregates,
//!   dashboard counters, and leaderboard ranking as pure functions.
//!
//! # Invariants
//! - Views never mutate the aggregate.
//! - A dangling `subject_id` renders a fallback label instead of failing:
//!   "Unknown" for schedule rows, "General" for task rows.

use crate::model::aggregate::{LeaderboardEntry, PlannerAggregate};
use crate::model::entities::{Day, EntryId, ScheduleSlot, Task};
use chrono::NaiveDate;

/// Placeholder color for rows whose subject no longer exists.
pub const FALLBACK_COLOR: &str = "#ccc";

/// Task list filter variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskFilter {
    All,
    Pending,
    Completed,
}

/// Dashboard counters plus today's slot list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DashboardSummary {
    pub subject_count: usize,
    pub pending_tasks: usize,
    /// Incomplete tasks of kind `Exam`.
    pub upcoming_exams: usize,
    pub today: Vec<ScheduleSlot>,
}

/// One bar of the per-subject task distribution chart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubjectBar {
    pub subject_id: EntryId,
    pub label: String,
    pub color: String,
    pub count: usize,
    /// Height normalized to the largest bar, in percent (the largest bar
    /// is always 100).
    pub height_percent: u32,
}

/// Aggregated task-completion analytics.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalyticsSummary {
    pub total_tasks: usize,
    pub completed_tasks: usize,
    /// `round(100 * completed / total)`, zero when there are no tasks.
    pub completion_percent: u32,
    pub bars: Vec<SubjectBar>,
}

/// Resolves a subject's display name and color with a fallback label for
/// dangling references.
pub fn subject_label<'a>(
    aggregate: &'a PlannerAggregate,
    subject_id: EntryId,
    fallback: &'a str,
) -> (&'a str, &'a str) {
    match aggregate.find_subject(subject_id) {
        Some(subject) => (subject.name.as_str(), subject.color.as_str()),
        None => (fallback, FALLBACK_COLOR),
    }
}

/// Slots for one day, ordered by start time ascending.
pub fn today_agenda(aggregate: &PlannerAggregate, day: Day) -> Vec<&ScheduleSlot> {
    let mut slots: Vec<&ScheduleSlot> = aggregate
        .schedule
        .iter()
        .filter(|slot| slot.day == day)
        .collect();
    slots.sort_by_key(|slot| slot.start);
    slots
}

/// The weekly schedule grouped by day in display order, optionally
/// restricted to a single day. Days without slots are omitted.
pub fn schedule_by_day(
    aggregate: &PlannerAggregate,
    filter: Option<Day>,
) -> Vec<(Day, Vec<&ScheduleSlot>)> {
    Day::ALL
        .into_iter()
        .filter(|day| filter.map_or(true, |wanted| wanted == *day))
        .filter_map(|day| {
            let slots = today_agenda(aggregate, day);
            if slots.is_empty() {
                None
            } else {
                Some((day, slots))
            }
        })
        .collect()
}

/// Tasks matching the filter, ordered by due date ascending.
pub fn filter_tasks(aggregate: &PlannerAggregate, filter: TaskFilter) -> Vec<&Task> {
    let mut tasks: Vec<&Task> = aggregate
        .tasks
        .iter()
        .filter(|task| match filter {
            TaskFilter::All => true,
            TaskFilter::Pending => !task.is_completed,
            TaskFilter::Completed => task.is_completed,
        })
        .collect();
    tasks.sort_by_key(|task| task.due_date);
    tasks
}

/// Dashboard counters for the given calendar date.
pub fn dashboard_summary(aggregate: &PlannerAggregate, today: NaiveDate) -> DashboardSummary {
    let day = Day::from_date(today);
    DashboardSummary {
        subject_count: aggregate.subjects.len(),
        pending_tasks: aggregate
            .tasks
            .iter()
            .filter(|task| !task.is_completed)
            .count(),
        upcoming_exams: aggregate
            .tasks
            .iter()
            .filter(|task| {
                task.kind == crate::model::entities::TaskKind::Exam && !task.is_completed
            })
            .count(),
        today: today_agenda(aggregate, day).into_iter().cloned().collect(),
    }
}

/// Completion percentage and per-subject distribution.
pub fn analytics(aggregate: &PlannerAggregate) -> AnalyticsSummary {
    let total_tasks = aggregate.tasks.len();
    let completed_tasks = aggregate
        .tasks
        .iter()
        .filter(|task| task.is_completed)
        .count();
    let completion_percent = if total_tasks == 0 {
        0
    } else {
        (100.0 * completed_tasks as f64 / total_tasks as f64).round() as u32
    };

    // Count tasks per subject in first-seen order so the chart is stable
    // across renders of the same aggregate.
    let mut counts: Vec<(EntryId, usize)> = Vec::new();
    for task in &aggregate.tasks {
        match counts.iter_mut().find(|(id, _)| *id == task.subject_id) {
            Some((_, count)) => *count += 1,
            None => counts.push((task.subject_id, 1)),
        }
    }
    let max_count = counts.iter().map(|(_, count)| *count).max().unwrap_or(0);

    let bars = counts
        .into_iter()
        .map(|(subject_id, count)| {
            let (label, color) = subject_label(aggregate, subject_id, "Unknown");
            SubjectBar {
                subject_id,
                label: label.to_string(),
                color: color.to_string(),
                count,
                height_percent: (100.0 * count as f64 / max_count as f64).round() as u32,
            }
        })
        .collect();

    AnalyticsSummary {
        total_tasks,
        completed_tasks,
        completion_percent,
        bars,
    }
}

/// Leaderboard entries ordered by points descending. The sort is stable, so
/// ties keep the order the entries arrived in.
pub fn rank_leaderboard(mut entries: Vec<LeaderboardEntry>) -> Vec<LeaderboardEntry> {
    entries.sort_by_key(|entry| std::cmp::Reverse(entry.points));
    entries
}
