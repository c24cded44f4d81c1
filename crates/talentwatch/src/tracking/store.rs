use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use super::domain::{
    normalize_company, AlertLevel, Departure, DepartureDraft, DepartureId, PersonId,
    TrackingStatus,
};
use super::repository::{DepartureRepository, RepositoryError, RosterRepository};

static DEPARTURE_SEQUENCE: AtomicU64 = AtomicU64::new(1);

fn next_departure_id() -> DepartureId {
    let id = DEPARTURE_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    DepartureId(format!("dep-{id:06}"))
}

/// Invariant layer over the departure and roster repositories.
///
/// The write path serializes per person id so that the idempotent-insert and
/// status-reconciliation guarantees hold even when different people are
/// checked concurrently.
pub struct DepartureStore<P, D> {
    roster: Arc<P>,
    departures: Arc<D>,
    person_locks: Mutex<HashMap<PersonId, Arc<Mutex<()>>>>,
}

impl<P, D> DepartureStore<P, D>
where
    P: RosterRepository,
    D: DepartureRepository,
{
    pub fn new(roster: Arc<P>, departures: Arc<D>) -> Self {
        Self {
            roster,
            departures,
            person_locks: Mutex::new(HashMap::new()),
        }
    }

    fn lock_for(&self, person_id: &PersonId) -> Arc<Mutex<()>> {
        let mut registry = self.person_locks.lock().expect("lock registry poisoned");
        registry
            .entry(person_id.clone())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }

    /// Persist a classified departure.
    ///
    /// Idempotent: when an un-notified departure already exists for the same
    /// person and the same normalized destination `(new_company, new_title)`,
    /// the existing record is returned instead of a duplicate, so repeated
    /// checks before notification cannot multiply alerts.
    pub fn record(
        &self,
        person_id: &PersonId,
        draft: DepartureDraft,
    ) -> Result<Departure, RepositoryError> {
        let guard = self.lock_for(person_id);
        let _held = guard.lock().expect("person lock poisoned");

        if let Some(existing) = self.find_open(person_id, &draft)? {
            return Ok(existing);
        }

        let departure = Departure::from_draft(next_departure_id(), person_id.clone(), draft);
        self.departures.insert(departure)
    }

    fn find_open(
        &self,
        person_id: &PersonId,
        draft: &DepartureDraft,
    ) -> Result<Option<Departure>, RepositoryError> {
        let open = self
            .departures
            .for_person(person_id)?
            .into_iter()
            .find(|existing| !existing.notified && same_transition(existing, draft));
        Ok(open)
    }

    /// Flag a departure as alerted. Safe to call repeatedly.
    pub fn mark_notified(&self, id: &DepartureId) -> Result<(), RepositoryError> {
        let mut departure = self
            .departures
            .fetch(id)?
            .ok_or(RepositoryError::NotFound)?;

        if departure.notified {
            return Ok(());
        }

        departure.notified = true;
        self.departures.update(departure)
    }

    /// Departures at or above `min_level`, newest first.
    pub fn list_by_level(&self, min_level: AlertLevel) -> Result<Vec<Departure>, RepositoryError> {
        let mut departures = self.departures.by_min_level(min_level)?;
        sort_newest_first(&mut departures);
        Ok(departures)
    }

    /// Un-notified departures at or above `min_level`, newest first. This is
    /// the dispatcher's input.
    pub fn unnotified(&self, min_level: AlertLevel) -> Result<Vec<Departure>, RepositoryError> {
        let mut departures = self
            .departures
            .by_min_level(min_level)?
            .into_iter()
            .filter(|departure| !departure.notified)
            .collect::<Vec<_>>();
        sort_newest_first(&mut departures);
        Ok(departures)
    }

    pub fn for_person(&self, person_id: &PersonId) -> Result<Vec<Departure>, RepositoryError> {
        self.departures.for_person(person_id)
    }

    /// Align the person's status with the existence of departures.
    ///
    /// Doubles as a repair operation: drift introduced by a partial write is
    /// fixed on the next invocation, and running it repeatedly is harmless.
    pub fn reconcile_status(
        &self,
        person_id: &PersonId,
    ) -> Result<TrackingStatus, RepositoryError> {
        let guard = self.lock_for(person_id);
        let _held = guard.lock().expect("person lock poisoned");

        let mut person = self
            .roster
            .fetch(person_id)?
            .ok_or(RepositoryError::NotFound)?;

        let expected = if self.departures.for_person(person_id)?.is_empty() {
            TrackingStatus::Active
        } else {
            TrackingStatus::Departed
        };

        if person.status != expected {
            person.status = expected;
            self.roster.upsert(person)?;
        }

        Ok(expected)
    }

    /// Drop all departures for a person. Used by revert.
    pub fn delete_for_person(&self, person_id: &PersonId) -> Result<usize, RepositoryError> {
        let guard = self.lock_for(person_id);
        let _held = guard.lock().expect("person lock poisoned");
        self.departures.delete_for_person(person_id)
    }

    /// Remove a person and every departure they own, atomically with respect
    /// to other writers for the same person. No orphan departures survive.
    pub fn remove_person(&self, person_id: &PersonId) -> Result<(), RepositoryError> {
        let guard = self.lock_for(person_id);
        let _held = guard.lock().expect("person lock poisoned");

        self.departures.delete_for_person(person_id)?;
        self.roster.remove(person_id)
    }
}

fn same_transition(existing: &Departure, draft: &DepartureDraft) -> bool {
    normalized_opt(existing.new_company.as_deref()) == normalized_opt(draft.new_company.as_deref())
        && trimmed_opt(existing.new_title.as_deref()) == trimmed_opt(draft.new_title.as_deref())
}

fn normalized_opt(value: Option<&str>) -> Option<String> {
    value
        .map(normalize_company)
        .filter(|normalized| !normalized.is_empty())
}

fn trimmed_opt(value: Option<&str>) -> Option<String> {
    value
        .map(|title| title.trim().to_lowercase())
        .filter(|title| !title.is_empty())
}

fn sort_newest_first(departures: &mut [Departure]) {
    departures.sort_by(|a, b| {
        b.detected_at
            .cmp(&a.detected_at)
            .then_with(|| b.id.cmp(&a.id))
    });
}
