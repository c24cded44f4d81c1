use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{info, warn};

use super::classify::DepartureClassifier;
use super::config::TrackingConfig;
use super::dispatch::{AlertDispatcher, AlertNotifier, DispatchReport};
use super::domain::{
    AlertLevel, Departure, EmploymentSnapshot, EnrichedPerson, PersonId, TrackedPerson,
};
use super::repository::{DepartureRepository, RepositoryError, RosterRepository};
use super::roster::{RosterError, TrackingRoster};
use super::store::DepartureStore;

/// Supplies a fresh employment snapshot for a tracked person on demand.
///
/// Implementations wrap the enrichment provider; a failure means "no update
/// this cycle", never a departure.
pub trait SnapshotFetcher: Send + Sync {
    fn fetch(&self, person_id: &PersonId) -> Result<EmploymentSnapshot, FetchError>;
}

/// Enrichment fetch failure.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("enrichment provider unavailable: {0}")]
    Unavailable(String),
    #[error("enrichment provider has no record for this person")]
    NoRecord,
    #[error("enrichment credits exhausted")]
    CreditsExhausted,
}

/// Error raised by the tracking service facade.
#[derive(Debug, thiserror::Error)]
pub enum TrackingServiceError {
    #[error(transparent)]
    Roster(#[from] RosterError),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
    #[error("snapshot fetch failed: {0}")]
    Fetch(#[from] FetchError),
}

/// A person skipped during a batch check, with the reason.
#[derive(Debug, Clone, Serialize)]
pub struct SkippedCheck {
    pub person_id: PersonId,
    pub reason: String,
}

/// Explicit record of one batch-check run.
///
/// Returned to the caller instead of being tracked in shared mutable state, so
/// schedulers and operators own their own run bookkeeping.
#[derive(Debug, Clone, Serialize)]
pub struct CheckRunReport {
    pub started_at: DateTime<Utc>,
    pub people_checked: usize,
    pub departures: Vec<Departure>,
    pub skipped: Vec<SkippedCheck>,
}

/// Service composing the roster, classifier, departure store, and alert
/// dispatcher around the external fetch collaborator.
pub struct TrackingService<R, D, F, N> {
    roster: TrackingRoster<R>,
    store: DepartureStore<R, D>,
    classifier: DepartureClassifier,
    dispatcher: AlertDispatcher<N>,
    fetcher: Arc<F>,
}

impl<R, D, F, N> TrackingService<R, D, F, N>
where
    R: RosterRepository + 'static,
    D: DepartureRepository + 'static,
    F: SnapshotFetcher + 'static,
    N: AlertNotifier + 'static,
{
    pub fn new(
        roster_repository: Arc<R>,
        departure_repository: Arc<D>,
        fetcher: Arc<F>,
        notifier: Arc<N>,
        config: TrackingConfig,
    ) -> Self {
        let roster = TrackingRoster::new(roster_repository.clone());
        let store = DepartureStore::new(roster_repository, departure_repository);
        let classifier = DepartureClassifier::new(config.classifier);
        let dispatcher = AlertDispatcher::new(notifier, config.min_alert_level, config.notify_as_test);

        Self {
            roster,
            store,
            classifier,
            dispatcher,
            fetcher,
        }
    }

    /// Put a person on the roster for the given company (upsert by external id).
    pub fn track(
        &self,
        original_company: &str,
        person: EnrichedPerson,
    ) -> Result<TrackedPerson, TrackingServiceError> {
        let tracked = self.roster.add(original_company, person, Utc::now())?;
        info!(person = %tracked.id.0, company = %tracked.original_company, "person added to tracking roster");
        Ok(tracked)
    }

    pub fn person(&self, person_id: &PersonId) -> Result<Option<TrackedPerson>, TrackingServiceError> {
        Ok(self.roster.fetch(person_id)?)
    }

    pub fn roster(&self) -> Result<Vec<TrackedPerson>, TrackingServiceError> {
        Ok(self.roster.list()?)
    }

    /// Run one check for a single person: fetch, swap the snapshot, classify
    /// old-versus-new, persist, reconcile. For an explicit single check a
    /// fetch failure is surfaced to the caller.
    pub fn check(&self, person_id: &PersonId) -> Result<Option<Departure>, TrackingServiceError> {
        self.check_at(person_id, Utc::now())
    }

    pub fn check_at(
        &self,
        person_id: &PersonId,
        now: DateTime<Utc>,
    ) -> Result<Option<Departure>, TrackingServiceError> {
        let snapshot = self.fetcher.fetch(person_id)?;
        self.apply_snapshot(person_id, snapshot, now)
    }

    /// Classify an already-fetched snapshot. Shared by check paths and by
    /// operator surfaces that push snapshots instead of pulling them.
    pub fn apply_snapshot(
        &self,
        person_id: &PersonId,
        snapshot: EmploymentSnapshot,
        now: DateTime<Utc>,
    ) -> Result<Option<Departure>, TrackingServiceError> {
        let (previous, _updated) = self.roster.refresh(person_id, snapshot.clone(), now)?;

        let draft = match self.classifier.classify(
            &previous.company,
            previous.title.as_deref(),
            &snapshot,
            now,
        ) {
            Some(draft) => draft,
            None => return Ok(None),
        };

        let departure = self.store.record(person_id, draft)?;
        self.store.reconcile_status(person_id)?;

        info!(
            person = %person_id.0,
            from = %departure.old_company,
            to = %departure.destination_label(),
            level = departure.alert_level.value(),
            "departure detected"
        );

        Ok(Some(departure))
    }

    /// Check every tracked person. A failed fetch skips that person for this
    /// cycle and is retried on the next run; the returned report is the job
    /// record for the whole pass.
    pub fn check_all(&self) -> Result<CheckRunReport, TrackingServiceError> {
        self.check_all_at(Utc::now())
    }

    pub fn check_all_at(&self, now: DateTime<Utc>) -> Result<CheckRunReport, TrackingServiceError> {
        let people = self.roster.list()?;
        let mut departures = Vec::new();
        let mut skipped = Vec::new();
        let mut people_checked = 0;

        for person in people {
            let snapshot = match self.fetcher.fetch(&person.id) {
                Ok(snapshot) => snapshot,
                Err(err) => {
                    warn!(person = %person.id.0, error = %err, "snapshot fetch failed; skipping this cycle");
                    skipped.push(SkippedCheck {
                        person_id: person.id,
                        reason: err.to_string(),
                    });
                    continue;
                }
            };

            people_checked += 1;
            if let Some(departure) = self.apply_snapshot(&person.id, snapshot, now)? {
                departures.push(departure);
            }
        }

        Ok(CheckRunReport {
            started_at: now,
            people_checked,
            departures,
            skipped,
        })
    }

    /// Departures at or above `min_level`, newest first.
    pub fn list_alerts(&self, min_level: AlertLevel) -> Result<Vec<Departure>, TrackingServiceError> {
        Ok(self.store.list_by_level(min_level)?)
    }

    /// Undo tracking-derived state for a person: drop their departures, reset
    /// them to the originally tracked employer, and reconcile. Unknown ids
    /// fail fast.
    pub fn revert(&self, person_id: &PersonId) -> Result<TrackedPerson, TrackingServiceError> {
        if self.roster.fetch(person_id)?.is_none() {
            return Err(RosterError::UnknownPerson(person_id.clone()).into());
        }

        self.store.delete_for_person(person_id)?;
        let person = self.roster.revert(person_id)?;
        self.store.reconcile_status(person_id)?;

        info!(person = %person_id.0, "tracking state reverted");
        Ok(person)
    }

    /// Remove a person and, with them, every departure they own.
    pub fn untrack(&self, person_id: &PersonId) -> Result<(), TrackingServiceError> {
        if self.roster.fetch(person_id)?.is_none() {
            return Err(RosterError::UnknownPerson(person_id.clone()).into());
        }
        self.store.remove_person(person_id)?;
        Ok(())
    }

    /// Send alerts for every un-notified departure at or above the configured
    /// threshold. Departures covered by a delivered notice are marked
    /// notified; failed groups stay un-notified so the next run retries them.
    pub fn dispatch_alerts(&self) -> Result<DispatchReport, TrackingServiceError> {
        let batch = self.store.unnotified(self.dispatcher.min_level())?;
        let report = self.dispatcher.dispatch(&batch);

        for id in report.delivered_departure_ids() {
            self.store.mark_notified(&id)?;
        }

        info!(
            attempted = report.notices_attempted(),
            failed = report.notices_failed(),
            critical = report.critical,
            watch = report.watch,
            standard = report.standard,
            "alert dispatch pass complete"
        );

        Ok(report)
    }

    /// Repair hook: re-derive a person's status from stored departures.
    pub fn reconcile(&self, person_id: &PersonId) -> Result<(), TrackingServiceError> {
        self.store.reconcile_status(person_id)?;
        Ok(())
    }
}
