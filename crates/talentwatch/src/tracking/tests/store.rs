use std::sync::Arc;

use super::common::*;
use crate::tracking::domain::{AlertLevel, PersonId, Signal, TrackingStatus};
use crate::tracking::repository::{DepartureRepository, RepositoryError, RosterRepository};
use crate::tracking::roster::TrackingRoster;
use crate::tracking::store::DepartureStore;

fn build_store() -> (
    DepartureStore<MemoryRoster, MemoryDepartures>,
    TrackingRoster<MemoryRoster>,
    Arc<MemoryRoster>,
    Arc<MemoryDepartures>,
) {
    let roster_repo = Arc::new(MemoryRoster::default());
    let departures = Arc::new(MemoryDepartures::default());
    let store = DepartureStore::new(roster_repo.clone(), departures.clone());
    let roster = TrackingRoster::new(roster_repo.clone());
    (store, roster, roster_repo, departures)
}

fn seed_person(roster: &TrackingRoster<MemoryRoster>, id: &str) -> PersonId {
    let person = roster
        .add("OpenAI", enriched(id, "Ada Lovelace", "OpenAI"), at(2025, 6, 1))
        .expect("person added");
    person.id
}

#[test]
fn record_is_idempotent_for_open_transitions() {
    let (store, roster, _, departures) = build_store();
    let person_id = seed_person(&roster, "pdl-1");

    let first = store
        .record(&person_id, draft_to("Anthropic", Some("MTS"), at(2025, 7, 1)))
        .expect("first record");
    let second = store
        .record(&person_id, draft_to("  anthropic ", Some("MTS"), at(2025, 7, 2)))
        .expect("second record");

    assert_eq!(first.id, second.id);
    assert_eq!(departures.for_person(&person_id).expect("fetch").len(), 1);
}

#[test]
fn record_creates_new_departure_after_notification() {
    let (store, roster, _, departures) = build_store();
    let person_id = seed_person(&roster, "pdl-2");

    let first = store
        .record(&person_id, draft_to("Anthropic", None, at(2025, 7, 1)))
        .expect("first record");
    store.mark_notified(&first.id).expect("mark notified");

    let second = store
        .record(&person_id, draft_to("Anthropic", None, at(2025, 8, 1)))
        .expect("second record");

    assert_ne!(first.id, second.id);
    assert_eq!(departures.for_person(&person_id).expect("fetch").len(), 2);
}

#[test]
fn record_distinguishes_destinations() {
    let (store, roster, _, departures) = build_store();
    let person_id = seed_person(&roster, "pdl-3");

    store
        .record(&person_id, draft_to("Anthropic", None, at(2025, 7, 1)))
        .expect("first record");
    store
        .record(&person_id, draft_to("Mistral", None, at(2025, 7, 2)))
        .expect("second record");

    assert_eq!(departures.for_person(&person_id).expect("fetch").len(), 2);
}

#[test]
fn mark_notified_is_idempotent_and_checks_existence() {
    let (store, roster, _, _) = build_store();
    let person_id = seed_person(&roster, "pdl-4");

    let departure = store
        .record(&person_id, draft_to("Anthropic", None, at(2025, 7, 1)))
        .expect("record");

    store.mark_notified(&departure.id).expect("first mark");
    store.mark_notified(&departure.id).expect("second mark is a no-op");

    match store.mark_notified(&crate::tracking::domain::DepartureId("dep-missing".to_string())) {
        Err(RepositoryError::NotFound) => {}
        other => panic!("expected not found, got {other:?}"),
    }
}

#[test]
fn list_by_level_filters_and_orders_newest_first() {
    let (store, roster, _, _) = build_store();
    let alice = seed_person(&roster, "pdl-5");
    let bob = seed_person(&roster, "pdl-6");

    let mut early = draft_to("Anthropic", None, at(2025, 7, 1));
    early.alert_level = AlertLevel::Critical;
    early.signals = vec![Signal::FounderTitle];
    store.record(&alice, early).expect("record early");

    let mut late = draft_to("Mistral", None, at(2025, 7, 5));
    late.alert_level = AlertLevel::Watch;
    late.signals = vec![Signal::BuildingLanguage];
    store.record(&bob, late).expect("record late");

    let all = store.list_by_level(AlertLevel::Standard).expect("list");
    assert_eq!(all.len(), 2);
    assert!(all[0].detected_at > all[1].detected_at);

    let critical_only = store.list_by_level(AlertLevel::Critical).expect("list");
    assert_eq!(critical_only.len(), 1);
    assert_eq!(critical_only[0].alert_level, AlertLevel::Critical);
}

#[test]
fn reconcile_status_tracks_departure_existence() {
    let (store, roster, roster_repo, _) = build_store();
    let person_id = seed_person(&roster, "pdl-7");

    assert_eq!(
        store.reconcile_status(&person_id).expect("reconcile"),
        TrackingStatus::Active
    );

    store
        .record(&person_id, draft_to("Anthropic", None, at(2025, 7, 1)))
        .expect("record");

    assert_eq!(
        store.reconcile_status(&person_id).expect("reconcile"),
        TrackingStatus::Departed
    );
    let stored = roster_repo
        .fetch(&person_id)
        .expect("fetch")
        .expect("person present");
    assert_eq!(stored.status, TrackingStatus::Departed);

    // Running the repair again must not flap.
    assert_eq!(
        store.reconcile_status(&person_id).expect("reconcile"),
        TrackingStatus::Departed
    );
}

#[test]
fn reconcile_status_repairs_drift() {
    let (store, roster, roster_repo, _) = build_store();
    let person_id = seed_person(&roster, "pdl-8");

    // Simulate a partial write: status says departed but no departure exists.
    let mut person = roster_repo
        .fetch(&person_id)
        .expect("fetch")
        .expect("person present");
    person.status = TrackingStatus::Departed;
    roster_repo.upsert(person).expect("upsert drifted person");

    assert_eq!(
        store.reconcile_status(&person_id).expect("reconcile"),
        TrackingStatus::Active
    );
}

#[test]
fn remove_person_leaves_no_orphan_departures() {
    let (store, roster, roster_repo, departures) = build_store();
    let person_id = seed_person(&roster, "pdl-9");

    store
        .record(&person_id, draft_to("Anthropic", None, at(2025, 7, 1)))
        .expect("record");
    store
        .record(&person_id, draft_to("Mistral", None, at(2025, 7, 2)))
        .expect("record");

    store.remove_person(&person_id).expect("remove");

    assert!(roster_repo.fetch(&person_id).expect("fetch").is_none());
    assert!(departures.for_person(&person_id).expect("fetch").is_empty());
}
