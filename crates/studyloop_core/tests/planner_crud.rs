use chrono::NaiveDate;
use std::sync::Arc;
use studyloop_core::backend::MemoryLocalStore;
use studyloop_core::store::{
    PlannerStore, ValidationError, HIGH_PRIORITY_TASK_POINTS, STANDARD_TASK_POINTS,
};
use studyloop_core::{Priority, RecordingPresenter, TaskKind};
use uuid::Uuid;

fn store() -> PlannerStore {
    PlannerStore::new(
        Arc::new(MemoryLocalStore::default()),
        Arc::new(RecordingPresenter::new()),
    )
}

fn due(day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 9, day).unwrap()
}

#[test]
fn add_and_update_subject() {
    let mut store = store();
    let id = store
        .add_subject("  Mathematics ", Priority::High, "#6366f1")
        .unwrap();

    let subject = store.aggregate().find_subject(id).unwrap();
    assert_eq!(subject.name, "Mathematics");
    assert_eq!(subject.priority, Priority::High);

    store
        .update_subject(id, "Maths", Priority::Low, "#22c55e")
        .unwrap();
    let subject = store.aggregate().find_subject(id).unwrap();
    assert_eq!(subject.name, "Maths");
    assert_eq!(subject.priority, Priority::Low);
    assert_eq!(subject.color, "#22c55e");
}

#[test]
fn blank_subject_name_is_rejected() {
    let mut store = store();
    let err = store
        .add_subject("   ", Priority::Medium, "#fff")
        .unwrap_err();
    assert_eq!(err, ValidationError::MissingField("subject name"));
    assert!(store.aggregate().subjects.is_empty());
}

#[test]
fn deleting_a_subject_keeps_dependent_tasks() {
    let mut store = store();
    let subject = store
        .add_subject("History", Priority::Medium, "#f59e0b")
        .unwrap();
    let task = store
        .add_task("Essay", subject, TaskKind::Assignment, due(10))
        .unwrap();

    store.delete_subject(subject).unwrap();
    assert!(store.aggregate().find_subject(subject).is_none());

    // The task survives with a dangling subject reference.
    let task = store.aggregate().find_task(task).unwrap();
    assert_eq!(task.subject_id, subject);
}

#[test]
fn delete_unknown_entries_reports_not_found() {
    let mut store = store();
    let missing = Uuid::new_v4();
    assert_eq!(
        store.delete_subject(missing).unwrap_err(),
        ValidationError::EntryNotFound(missing)
    );
    assert_eq!(
        store.delete_task(missing).unwrap_err(),
        ValidationError::EntryNotFound(missing)
    );
    assert_eq!(
        store.delete_slot(missing).unwrap_err(),
        ValidationError::EntryNotFound(missing)
    );
}

#[test]
fn toggle_awards_high_priority_points_and_reverses() {
    let mut store = store();
    let subject = store
        .add_subject("Physics", Priority::High, "#ef4444")
        .unwrap();
    let task = store
        .add_task("Problem set", subject, TaskKind::Assignment, due(5))
        .unwrap();

    let outcome = store.toggle_task(task).unwrap();
    assert!(outcome.is_completed);
    assert_eq!(outcome.points_delta, HIGH_PRIORITY_TASK_POINTS);
    assert_eq!(store.aggregate().points, HIGH_PRIORITY_TASK_POINTS);

    let outcome = store.toggle_task(task).unwrap();
    assert!(!outcome.is_completed);
    assert_eq!(outcome.points_delta, -HIGH_PRIORITY_TASK_POINTS);
    assert_eq!(store.aggregate().points, 0);
}

#[test]
fn toggle_uses_standard_points_for_other_priorities() {
    let mut store = store();
    let subject = store
        .add_subject("Art", Priority::Low, "#a855f7")
        .unwrap();
    let task = store
        .add_task("Sketch", subject, TaskKind::Review, due(7))
        .unwrap();

    let outcome = store.toggle_task(task).unwrap();
    assert_eq!(outcome.points_delta, STANDARD_TASK_POINTS);
}

#[test]
fn toggle_on_dangling_subject_falls_back_to_standard_points() {
    let mut store = store();
    let subject = store
        .add_subject("Chemistry", Priority::High, "#0ea5e9")
        .unwrap();
    let task = store
        .add_task("Lab report", subject, TaskKind::Project, due(12))
        .unwrap();
    store.delete_subject(subject).unwrap();

    let outcome = store.toggle_task(task).unwrap();
    assert_eq!(outcome.points_delta, STANDARD_TASK_POINTS);
}

#[test]
fn points_can_go_negative_and_stay_consistent() {
    let mut store = store();
    let subject = store
        .add_subject("Music", Priority::Medium, "#14b8a6")
        .unwrap();
    let task = store
        .add_task("Practice", subject, TaskKind::Review, due(3))
        .unwrap();

    store.toggle_task(task).unwrap();
    store.update_points(-15);
    store.toggle_task(task).unwrap();
    assert_eq!(store.aggregate().points, -15);
}
