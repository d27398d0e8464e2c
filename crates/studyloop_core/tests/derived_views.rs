use chrono::NaiveDate;
use std::sync::Arc;
use studyloop_core::backend::MemoryLocalStore;
use studyloop_core::controller::{
    dashboard_summary, filter_tasks, subject_label, TaskFilter, FALLBACK_COLOR,
};
use studyloop_core::store::PlannerStore;
use studyloop_core::{ClockTime, Day, Priority, RecordingPresenter, TaskKind};
use uuid::Uuid;

fn store() -> PlannerStore {
    PlannerStore::new(
        Arc::new(MemoryLocalStore::default()),
        Arc::new(RecordingPresenter::new()),
    )
}

fn date(day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 9, day).unwrap()
}

#[test]
fn dashboard_counts_pending_work_and_todays_slots() {
    let mut store = store();
    let math = store
        .add_subject("Math", Priority::High, "#6366f1")
        .unwrap();
    let history = store
        .add_subject("History", Priority::Low, "#f59e0b")
        .unwrap();

    // 2026-09-07 is a Monday.
    let monday = date(7);
    store
        .add_slot(
            math,
            Day::Monday,
            ClockTime::new(9, 0).unwrap(),
            ClockTime::new(10, 0).unwrap(),
        )
        .unwrap();
    store
        .add_slot(
            history,
            Day::Tuesday,
            ClockTime::new(9, 0).unwrap(),
            ClockTime::new(10, 0).unwrap(),
        )
        .unwrap();

    let exam = store
        .add_task("Midterm", math, TaskKind::Exam, date(14))
        .unwrap();
    store
        .add_task("Reading", history, TaskKind::Review, date(9))
        .unwrap();
    let done = store
        .add_task("Quiz prep", math, TaskKind::Exam, date(8))
        .unwrap();
    store.toggle_task(done).unwrap();

    let summary = dashboard_summary(store.aggregate(), monday);
    assert_eq!(summary.subject_count, 2);
    assert_eq!(summary.pending_tasks, 2);
    // Completed exams do not count as upcoming.
    assert_eq!(summary.upcoming_exams, 1);
    assert_eq!(summary.today.len(), 1);
    assert_eq!(summary.today[0].subject_id, math);

    let _ = exam;
}

#[test]
fn task_filters_split_by_completion_and_sort_by_due_date() {
    let mut store = store();
    let subject = store
        .add_subject("Math", Priority::Medium, "#6366f1")
        .unwrap();
    store
        .add_task("Later", subject, TaskKind::Assignment, date(20))
        .unwrap();
    store
        .add_task("Sooner", subject, TaskKind::Assignment, date(5))
        .unwrap();
    let done = store
        .add_task("Done", subject, TaskKind::Review, date(10))
        .unwrap();
    store.toggle_task(done).unwrap();

    let all = filter_tasks(store.aggregate(), TaskFilter::All);
    assert_eq!(all.len(), 3);
    assert_eq!(all[0].title, "Sooner");
    assert_eq!(all[2].title, "Later");

    let pending = filter_tasks(store.aggregate(), TaskFilter::Pending);
    assert_eq!(pending.len(), 2);
    assert!(pending.iter().all(|task| !task.is_completed));

    let completed = filter_tasks(store.aggregate(), TaskFilter::Completed);
    assert_eq!(completed.len(), 1);
    assert_eq!(completed[0].title, "Done");
}

#[test]
fn overdue_applies_to_pending_tasks_strictly_before_today() {
    let mut store = store();
    let subject = store
        .add_subject("Math", Priority::Medium, "#6366f1")
        .unwrap();
    let late = store
        .add_task("Late", subject, TaskKind::Assignment, date(10))
        .unwrap();
    let today_task = store
        .add_task("Today", subject, TaskKind::Assignment, date(11))
        .unwrap();

    let today = date(11);
    let aggregate = store.aggregate();
    assert!(aggregate.find_task(late).unwrap().is_overdue(today));
    assert!(!aggregate.find_task(today_task).unwrap().is_overdue(today));

    // Completing clears the overdue state.
    store.toggle_task(late).unwrap();
    assert!(!store.aggregate().find_task(late).unwrap().is_overdue(today));
}

#[test]
fn dangling_subject_references_use_fallback_labels() {
    let mut store = store();
    let subject = store
        .add_subject("Math", Priority::Medium, "#6366f1")
        .unwrap();
    store
        .add_task("Orphan", subject, TaskKind::Assignment, date(3))
        .unwrap();
    store.delete_subject(subject).unwrap();

    let (label, color) = subject_label(store.aggregate(), subject, "General");
    assert_eq!(label, "General");
    assert_eq!(color, FALLBACK_COLOR);

    let (label, _) = subject_label(store.aggregate(), Uuid::new_v4(), "Unknown");
    assert_eq!(label, "Unknown");
}
