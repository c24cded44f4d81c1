use super::domain::{AlertLevel, Departure, DepartureId, PersonId, TrackedPerson};

/// Error enumeration for persistence failures.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("record already exists")]
    Conflict,
    #[error("record not found")]
    NotFound,
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}

/// Storage abstraction for the tracking roster so the service and store can be
/// exercised in isolation.
pub trait RosterRepository: Send + Sync {
    /// Insert or replace a person keyed by their external id.
    fn upsert(&self, person: TrackedPerson) -> Result<TrackedPerson, RepositoryError>;
    fn fetch(&self, id: &PersonId) -> Result<Option<TrackedPerson>, RepositoryError>;
    fn list(&self) -> Result<Vec<TrackedPerson>, RepositoryError>;
    fn remove(&self, id: &PersonId) -> Result<(), RepositoryError>;
}

/// Storage abstraction for detected departures.
///
/// Implementations only provide durable CRUD; the invariants (idempotent
/// insert per open transition, cascade on person removal, status
/// reconciliation) are enforced one layer up by the departure store.
pub trait DepartureRepository: Send + Sync {
    fn insert(&self, departure: Departure) -> Result<Departure, RepositoryError>;
    fn update(&self, departure: Departure) -> Result<(), RepositoryError>;
    fn fetch(&self, id: &DepartureId) -> Result<Option<Departure>, RepositoryError>;
    fn for_person(&self, person_id: &PersonId) -> Result<Vec<Departure>, RepositoryError>;
    fn by_min_level(&self, min_level: AlertLevel) -> Result<Vec<Departure>, RepositoryError>;
    /// Remove every departure owned by the person, returning how many were
    /// deleted.
    fn delete_for_person(&self, person_id: &PersonId) -> Result<usize, RepositoryError>;
}
