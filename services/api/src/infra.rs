use std::collections::{HashMap, VecDeque};
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex};

use metrics_exporter_prometheus::PrometheusHandle;
use talentwatch::tracking::{
    AlertLevel, AlertNotice, AlertNotifier, Departure, DepartureId, DepartureRepository,
    EmploymentSnapshot, FetchError, NotifyError, PersonId, RepositoryError, RosterRepository,
    SnapshotFetcher, TrackedPerson, TrackingConfig, TrackingService,
};
use tracing::info;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

pub(crate) type ApiService = TrackingService<
    InMemoryRosterRepository,
    InMemoryDepartureRepository,
    QueuedSnapshotFetcher,
    LogNotifier,
>;

pub(crate) struct ServiceHandles {
    pub(crate) service: Arc<ApiService>,
    pub(crate) fetcher: Arc<QueuedSnapshotFetcher>,
}

pub(crate) fn build_service(config: TrackingConfig) -> ServiceHandles {
    let roster = Arc::new(InMemoryRosterRepository::default());
    let departures = Arc::new(InMemoryDepartureRepository::default());
    let fetcher = Arc::new(QueuedSnapshotFetcher::default());
    let notifier = Arc::new(LogNotifier);
    let service = Arc::new(TrackingService::new(
        roster,
        departures,
        fetcher.clone(),
        notifier,
        config,
    ));
    ServiceHandles { service, fetcher }
}

#[derive(Default, Clone)]
pub(crate) struct InMemoryRosterRepository {
    records: Arc<Mutex<HashMap<PersonId, TrackedPerson>>>,
}

impl RosterRepository for InMemoryRosterRepository {
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
pub(crate) struct InMemoryDepartureRepository {
    records: Arc<Mutex<Vec<Departure>>>,
}

impl DepartureRepository for InMemoryDepartureRepository {
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

/// Fetcher backed by operator-pushed snapshots.
///
/// The enrichment integration lives outside this service; an upstream job (or
/// an operator) pushes fresh snapshots over HTTP and a check consumes the
/// oldest one per person. An empty queue reads as "no update this cycle".
#[derive(Default, Clone)]
pub(crate) struct QueuedSnapshotFetcher {
    queues: Arc<Mutex<HashMap<PersonId, VecDeque<EmploymentSnapshot>>>>,
}

impl QueuedSnapshotFetcher {
    pub(crate) fn push(&self, person_id: &PersonId, snapshot: EmploymentSnapshot) {
        self.queues
            .lock()
            .expect("fetcher mutex poisoned")
            .entry(person_id.clone())
            .or_default()
            .push_back(snapshot);
    }
}

impl SnapshotFetcher for QueuedSnapshotFetcher {
    fn fetch(&self, person_id: &PersonId) -> Result<EmploymentSnapshot, FetchError> {
        self.queues
            .lock()
            .expect("fetcher mutex poisoned")
            .get_mut(person_id)
            .and_then(VecDeque::pop_front)
            .ok_or(FetchError::NoRecord)
    }
}

/// Notifier that writes alert notices to the service log.
///
/// Stands in for the real e-mail/chat transport; swapping in a transport
/// adapter does not touch the dispatch pipeline.
pub(crate) struct LogNotifier;

impl AlertNotifier for LogNotifier {
    fn send(&self, notice: &AlertNotice) -> Result<(), NotifyError> {
        for departure in &notice.departures {
            info!(
                mode = if notice.is_test { "test" } else { "live" },
                level = notice.level.label(),
                company = notice.company.as_deref().unwrap_or("all companies"),
                person = %departure.person_id.0,
                from = %departure.old_company,
                to = %departure.destination_label(),
                signals = ?departure.signal_labels(),
                "departure alert"
            );
        }
        Ok(())
    }
}
