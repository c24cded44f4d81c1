use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};

use chrono::{DateTime, TimeZone, Utc};

use crate::tracking::classify::{ClassifierConfig, DepartureClassifier};
use crate::tracking::config::TrackingConfig;
use crate::tracking::dispatch::{AlertNotice, AlertNotifier, NotifyError};
use crate::tracking::domain::{
    AlertLevel, Departure, DepartureDraft, DepartureId, EmploymentSnapshot, EnrichedPerson,
    PersonId, Signal, TrackedPerson,
};
use crate::tracking::repository::{
    DepartureRepository, RepositoryError, RosterRepository,
};
use crate::tracking::service::{FetchError, SnapshotFetcher, TrackingService};

pub(super) fn at(year: i32, month: u32, day: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(year, month, day, 12, 0, 0)
        .single()
        .expect("valid timestamp")
}

pub(super) fn classifier_config() -> ClassifierConfig {
    ClassifierConfig::default()
}

pub(super) fn classifier() -> DepartureClassifier {
    DepartureClassifier::new(classifier_config())
}

pub(super) fn tracking_config(min_alert_level: AlertLevel) -> TrackingConfig {
    TrackingConfig {
        classifier: classifier_config(),
        min_alert_level,
        notify_as_test: true,
    }
}

pub(super) fn snapshot(company: &str) -> EmploymentSnapshot {
    EmploymentSnapshot {
        company: if company.trim().is_empty() {
            None
        } else {
            Some(company.to_string())
        },
        ..EmploymentSnapshot::default()
    }
}

pub(super) fn snapshot_with_title(company: &str, title: &str) -> EmploymentSnapshot {
    EmploymentSnapshot {
        title: Some(title.to_string()),
        ..snapshot(company)
    }
}

pub(super) fn stealth_founder_snapshot() -> EmploymentSnapshot {
    EmploymentSnapshot {
        company: None,
        title: Some("Founder".to_string()),
        headline: Some("Building in stealth".to_string()),
        ..EmploymentSnapshot::default()
    }
}

pub(super) fn enriched(id: &str, name: &str, company: &str) -> EnrichedPerson {
    EnrichedPerson {
        id: PersonId(id.to_string()),
        name: name.to_string(),
        snapshot: snapshot(company),
    }
}

pub(super) fn draft_to(company: &str, title: Option<&str>, detected_at: DateTime<Utc>) -> DepartureDraft {
    DepartureDraft {
        old_company: "OpenAI".to_string(),
        old_title: Some("Research Engineer".to_string()),
        new_company: if company.trim().is_empty() {
            None
        } else {
            Some(company.to_string())
        },
        new_title: title.map(str::to_string),
        departure_date: None,
        detected_at,
        alert_level: AlertLevel::Standard,
        signals: vec![Signal::StandardDeparture],
    }
}

pub(super) fn departure(
    id: &str,
    person: &str,
    old_company: &str,
    level: AlertLevel,
) -> Departure {
    Departure {
        id: DepartureId(id.to_string()),
        person_id: PersonId(person.to_string()),
        old_company: old_company.to_string(),
        old_title: None,
        new_company: Some("Somewhere Else".to_string()),
        new_title: None,
        departure_date: None,
        detected_at: at(2025, 7, 1),
        alert_level: level,
        signals: vec![Signal::StandardDeparture],
        notified: false,
    }
}

#[derive(Default, Clone)]
pub(super) struct MemoryRoster {
    pub(super) records: Arc<Mutex<HashMap<PersonId, TrackedPerson>>>,
}

impl RosterRepository for MemoryRoster {
    fn upsert(&self, person: TrackedPerson) -> Result<TrackedPerson, RepositoryError> {
        let mut guard = self.records.lock().expect("roster mutex poisoned");
        guard.insert(person.id.clone(), person.clone());
        Ok(person)
    }

    fn fetch(&self, id: &PersonId) -> Result<Option<TrackedPerson>, RepositoryError> {
        let guard = self.records.lock().expect("roster mutex poisoned");
        Ok(guard.get(id).cloned())
    }

    fn list(&self) -> Result<Vec<TrackedPerson>, RepositoryError> {
        let guard = self.records.lock().expect("roster mutex poisoned");
        let mut people: Vec<TrackedPerson> = guard.values().cloned().collect();
        people.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(people)
    }

    fn remove(&self, id: &PersonId) -> Result<(), RepositoryError> {
        let mut guard = self.records.lock().expect("roster mutex poisoned");
        guard.remove(id).map(|_| ()).ok_or(RepositoryError::NotFound)
    }
}

#[derive(Default, Clone)]
pub(super) struct MemoryDepartures {
    pub(super) records: Arc<Mutex<Vec<Departure>>>,
}

impl DepartureRepository for MemoryDepartures {
    fn insert(&self, departure: Departure) -> Result<Departure, RepositoryError> {
        let mut guard = self.records.lock().expect("departure mutex poisoned");
        if guard.iter().any(|existing| existing.id == departure.id) {
            return Err(RepositoryError::Conflict);
        }
        guard.push(departure.clone());
        Ok(departure)
    }

    fn update(&self, departure: Departure) -> Result<(), RepositoryError> {
        let mut guard = self.records.lock().expect("departure mutex poisoned");
        match guard.iter_mut().find(|existing| existing.id == departure.id) {
            Some(existing) => {
                *existing = departure;
                Ok(())
            }
            None => Err(RepositoryError::NotFound),
        }
    }

    fn fetch(&self, id: &DepartureId) -> Result<Option<Departure>, RepositoryError> {
        let guard = self.records.lock().expect("departure mutex poisoned");
        Ok(guard.iter().find(|existing| &existing.id == id).cloned())
    }

    fn for_person(&self, person_id: &PersonId) -> Result<Vec<Departure>, RepositoryError> {
        let guard = self.records.lock().expect("departure mutex poisoned");
        Ok(guard
            .iter()
            .filter(|existing| &existing.person_id == person_id)
            .cloned()
            .collect())
    }

    fn by_min_level(&self, min_level: AlertLevel) -> Result<Vec<Departure>, RepositoryError> {
        let guard = self.records.lock().expect("departure mutex poisoned");
        Ok(guard
            .iter()
            .filter(|existing| existing.alert_level >= min_level)
            .cloned()
            .collect())
    }

    fn delete_for_person(&self, person_id: &PersonId) -> Result<usize, RepositoryError> {
        let mut guard = self.records.lock().expect("departure mutex poisoned");
        let before = guard.len();
        guard.retain(|existing| &existing.person_id != person_id);
        Ok(before - guard.len())
    }
}

/// Test fetcher fed with queued snapshots per person; an empty queue reads as
/// "provider has nothing new".
#[derive(Default, Clone)]
pub(super) struct ScriptedFetcher {
    queues: Arc<Mutex<HashMap<PersonId, VecDeque<EmploymentSnapshot>>>>,
}

impl ScriptedFetcher {
    pub(super) fn push(&self, person_id: &PersonId, snapshot: EmploymentSnapshot) {
        self.queues
            .lock()
            .expect("fetcher mutex poisoned")
            .entry(person_id.clone())
            .or_default()
            .push_back(snapshot);
    }
}

impl SnapshotFetcher for ScriptedFetcher {
    fn fetch(&self, person_id: &PersonId) -> Result<EmploymentSnapshot, FetchError> {
        self.queues
            .lock()
            .expect("fetcher mutex poisoned")
            .get_mut(person_id)
            .and_then(VecDeque::pop_front)
            .ok_or(FetchError::NoRecord)
    }
}

/// Test notifier capturing notices; optionally fails for one company so
/// failure isolation can be asserted.
#[derive(Default, Clone)]
pub(super) struct RecordingNotifier {
    notices: Arc<Mutex<Vec<AlertNotice>>>,
    pub(super) fail_for_company: Arc<Mutex<Option<String>>>,
}

impl RecordingNotifier {
    pub(super) fn notices(&self) -> Vec<AlertNotice> {
        self.notices.lock().expect("notifier mutex poisoned").clone()
    }

    pub(super) fn fail_company(&self, company: &str) {
        *self.fail_for_company.lock().expect("notifier mutex poisoned") =
            Some(company.to_string());
    }
}

impl AlertNotifier for RecordingNotifier {
    fn send(&self, notice: &AlertNotice) -> Result<(), NotifyError> {
        let failing = self
            .fail_for_company
            .lock()
            .expect("notifier mutex poisoned")
            .clone();
        if let (Some(failing), Some(company)) = (failing, notice.company.as_deref()) {
            if failing == company {
                return Err(NotifyError::Transport("scripted failure".to_string()));
            }
        }

        self.notices
            .lock()
            .expect("notifier mutex poisoned")
            .push(notice.clone());
        Ok(())
    }
}

pub(super) type TestService =
    TrackingService<MemoryRoster, MemoryDepartures, ScriptedFetcher, RecordingNotifier>;

pub(super) fn build_service(
    min_alert_level: AlertLevel,
) -> (
    TestService,
    Arc<MemoryRoster>,
    Arc<MemoryDepartures>,
    Arc<ScriptedFetcher>,
    Arc<RecordingNotifier>,
) {
    let roster = Arc::new(MemoryRoster::default());
    let departures = Arc::new(MemoryDepartures::default());
    let fetcher = Arc::new(ScriptedFetcher::default());
    let notifier = Arc::new(RecordingNotifier::default());
    let service = TrackingService::new(
        roster.clone(),
        departures.clone(),
        fetcher.clone(),
        notifier.clone(),
        tracking_config(min_alert_level),
    );
    (service, roster, departures, fetcher, notifier)
}
