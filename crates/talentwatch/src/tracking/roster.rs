use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};

use super::domain::{
    EmploymentSnapshot, EnrichedPerson, PersonId, TrackedPerson, TrackingStatus,
};
use super::repository::{RepositoryError, RosterRepository};

/// Errors raised by roster operations.
#[derive(Debug, thiserror::Error)]
pub enum RosterError {
    /// Caller passed an id that was never tracked. Not recoverable at runtime;
    /// surfaced loudly instead of being swallowed.
    #[error("person {0:?} is not on the tracking roster")]
    UnknownPerson(PersonId),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

/// The employment state a person had before a refresh replaced it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreviousEmployment {
    pub company: String,
    pub title: Option<String>,
    pub snapshot: EmploymentSnapshot,
}

/// The set of currently tracked people, one entry per person, keyed by the
/// enrichment provider's external id.
pub struct TrackingRoster<R> {
    repository: Arc<R>,
    person_locks: Mutex<HashMap<PersonId, Arc<Mutex<()>>>>,
}

impl<R> TrackingRoster<R>
where
    R: RosterRepository,
{
    pub fn new(repository: Arc<R>) -> Self {
        Self {
            repository,
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

    /// Put a person on the roster, or refresh their mutable fields if the
    /// external id is already tracked. `tracking_started` survives updates.
    pub fn add(
        &self,
        original_company: &str,
        person: EnrichedPerson,
        now: DateTime<Utc>,
    ) -> Result<TrackedPerson, RosterError> {
        let guard = self.lock_for(&person.id);
        let _held = guard.lock().expect("person lock poisoned");

        let existing = self.repository.fetch(&person.id)?;
        let tracking_started = existing
            .as_ref()
            .map(|current| current.tracking_started)
            .unwrap_or(now);
        let status = existing
            .as_ref()
            .map(|current| current.status)
            .unwrap_or(TrackingStatus::Active);

        let tracked = TrackedPerson {
            id: person.id,
            name: person.name,
            original_company: original_company.to_string(),
            current_company: person.snapshot.company.clone(),
            title: person.snapshot.title.clone(),
            status,
            tracking_started,
            last_checked: None,
            snapshot: person.snapshot,
        };

        Ok(self.repository.upsert(tracked)?)
    }

    pub fn fetch(&self, person_id: &PersonId) -> Result<Option<TrackedPerson>, RosterError> {
        Ok(self.repository.fetch(person_id)?)
    }

    pub fn list(&self) -> Result<Vec<TrackedPerson>, RosterError> {
        Ok(self.repository.list()?)
    }

    /// Swap in a fresh snapshot and hand back the employment state it
    /// replaced.
    ///
    /// The read-old/write-new pair runs under the person's lock, so a caller
    /// classifying old-versus-new never races a concurrent refresh for the
    /// same person.
    pub fn refresh(
        &self,
        person_id: &PersonId,
        new_snapshot: EmploymentSnapshot,
        now: DateTime<Utc>,
    ) -> Result<(PreviousEmployment, TrackedPerson), RosterError> {
        let guard = self.lock_for(person_id);
        let _held = guard.lock().expect("person lock poisoned");

        let mut person = self
            .repository
            .fetch(person_id)?
            .ok_or_else(|| RosterError::UnknownPerson(person_id.clone()))?;

        // Baseline for the old-versus-new comparison. A person already
        // observed with a blank employer is genuinely in a stealth/unknown
        // state and must compare as blank, or every later refresh would
        // re-detect the same departure; only a person never refreshed falls
        // back to the company they were tracked for.
        let previous_company = match (&person.current_company, person.last_checked) {
            (Some(company), _) => company.clone(),
            (None, Some(_)) => String::new(),
            (None, None) => person.original_company.clone(),
        };

        let previous = PreviousEmployment {
            company: previous_company,
            title: person.title.clone(),
            snapshot: person.snapshot.clone(),
        };

        person.current_company = new_snapshot.company.clone();
        person.title = new_snapshot.title.clone();
        person.snapshot = new_snapshot;
        person.last_checked = Some(now);

        let updated = self.repository.upsert(person)?;
        Ok((previous, updated))
    }

    /// Reset a person to their originally tracked employer and clear
    /// snapshot-derived fields. Departure cleanup is the caller's side of the
    /// bargain (see the tracking service's revert).
    pub fn revert(&self, person_id: &PersonId) -> Result<TrackedPerson, RosterError> {
        let guard = self.lock_for(person_id);
        let _held = guard.lock().expect("person lock poisoned");

        let mut person = self
            .repository
            .fetch(person_id)?
            .ok_or_else(|| RosterError::UnknownPerson(person_id.clone()))?;

        person.current_company = Some(person.original_company.clone());
        person.title = None;
        person.status = TrackingStatus::Active;
        person.last_checked = None;
        person.snapshot = EmploymentSnapshot {
            company: Some(person.original_company.clone()),
            ..EmploymentSnapshot::default()
        };

        Ok(self.repository.upsert(person)?)
    }
}
