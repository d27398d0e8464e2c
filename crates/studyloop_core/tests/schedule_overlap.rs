use std::sync::Arc;
use studyloop_core::backend::MemoryLocalStore;
use studyloop_core::controller::{schedule_by_day, today_agenda};
use studyloop_core::store::{PlannerStore, ValidationError};
use studyloop_core::{ClockTime, Day, EntryId, Priority, RecordingPresenter};

fn store_with_subject() -> (PlannerStore, EntryId) {
    let mut store = PlannerStore::new(
        Arc::new(MemoryLocalStore::default()),
        Arc::new(RecordingPresenter::new()),
    );
    let subject = store
        .add_subject("Biology", Priority::Medium, "#10b981")
        .unwrap();
    (store, subject)
}

fn at(hour: u16, minute: u16) -> ClockTime {
    ClockTime::new(hour, minute).unwrap()
}

#[test]
fn adjacent_slots_on_one_day_do_not_conflict() {
    let (mut store, subject) = store_with_subject();
    store
        .add_slot(subject, Day::Monday, at(9, 0), at(10, 0))
        .unwrap();
    // Touching boundaries are allowed.
    store
        .add_slot(subject, Day::Monday, at(10, 0), at(11, 0))
        .unwrap();
    assert_eq!(store.aggregate().schedule.len(), 2);
}

#[test]
fn overlapping_slot_on_same_day_is_rejected() {
    let (mut store, subject) = store_with_subject();
    store
        .add_slot(subject, Day::Monday, at(9, 0), at(10, 0))
        .unwrap();

    let err = store
        .add_slot(subject, Day::Monday, at(9, 30), at(10, 30))
        .unwrap_err();
    assert_eq!(err, ValidationError::ScheduleConflict { day: Day::Monday });
    assert_eq!(store.aggregate().schedule.len(), 1);
}

#[test]
fn containment_and_exact_duplicates_are_conflicts() {
    let (mut store, subject) = store_with_subject();
    store
        .add_slot(subject, Day::Friday, at(13, 0), at(15, 0))
        .unwrap();

    assert!(store
        .add_slot(subject, Day::Friday, at(13, 30), at(14, 0))
        .is_err());
    assert!(store
        .add_slot(subject, Day::Friday, at(12, 0), at(16, 0))
        .is_err());
    assert!(store
        .add_slot(subject, Day::Friday, at(13, 0), at(15, 0))
        .is_err());
}

#[test]
fn same_time_on_another_day_is_fine() {
    let (mut store, subject) = store_with_subject();
    store
        .add_slot(subject, Day::Tuesday, at(9, 0), at(10, 0))
        .unwrap();
    store
        .add_slot(subject, Day::Wednesday, at(9, 0), at(10, 0))
        .unwrap();
    assert_eq!(store.aggregate().schedule.len(), 2);
}

#[test]
fn inverted_or_empty_range_is_rejected() {
    let (mut store, subject) = store_with_subject();
    assert_eq!(
        store
            .add_slot(subject, Day::Monday, at(10, 0), at(9, 0))
            .unwrap_err(),
        ValidationError::InvalidTimeRange
    );
    assert_eq!(
        store
            .add_slot(subject, Day::Monday, at(10, 0), at(10, 0))
            .unwrap_err(),
        ValidationError::InvalidTimeRange
    );
}

#[test]
fn deleting_a_slot_frees_its_window() {
    let (mut store, subject) = store_with_subject();
    let slot = store
        .add_slot(subject, Day::Thursday, at(9, 0), at(10, 0))
        .unwrap();
    store.delete_slot(slot).unwrap();
    store
        .add_slot(subject, Day::Thursday, at(9, 0), at(10, 0))
        .unwrap();
}

#[test]
fn agenda_sorts_by_start_and_grouping_skips_empty_days() {
    let (mut store, subject) = store_with_subject();
    store
        .add_slot(subject, Day::Monday, at(14, 0), at(15, 0))
        .unwrap();
    store
        .add_slot(subject, Day::Monday, at(8, 0), at(9, 0))
        .unwrap();
    store
        .add_slot(subject, Day::Sunday, at(10, 0), at(11, 0))
        .unwrap();

    let monday = today_agenda(store.aggregate(), Day::Monday);
    assert_eq!(monday.len(), 2);
    assert!(monday[0].start < monday[1].start);

    let grouped = schedule_by_day(store.aggregate(), None);
    let days: Vec<Day> = grouped.iter().map(|(day, _)| *day).collect();
    assert_eq!(days, vec![Day::Monday, Day::Sunday]);

    let only_sunday = schedule_by_day(store.aggregate(), Some(Day::Sunday));
    assert_eq!(only_sunday.len(), 1);
    assert_eq!(only_sunday[0].0, Day::Sunday);
}
