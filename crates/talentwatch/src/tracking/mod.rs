//! Departure tracking: roster, classification, persistence, and alerting.
//!
//! The pipeline runs fetch → roster refresh → classification → departure
//! store → alert dispatch. Everything upstream of the store is pure; the
//! store and dispatcher are the only stateful edges.

pub mod classify;
pub mod config;
pub mod dispatch;
pub mod domain;
pub mod import;
pub mod repository;
pub mod roster;
pub mod router;
pub mod service;
pub mod store;

#[cfg(test)]
mod tests;

pub use classify::{ClassifierConfig, DepartureClassifier, SignalSet};
pub use config::TrackingConfig;
pub use dispatch::{
    AlertDispatcher, AlertNotice, AlertNotifier, DispatchReport, NoticeOutcome, NotifyError,
};
pub use domain::{
    AlertLevel, Departure, DepartureDraft, DepartureId, EmploymentSnapshot, EnrichedPerson,
    PersonId, PersonStatusView, Signal, TrackedPerson, TrackingStatus,
};
pub use import::{RosterCsvImporter, RosterImport, RosterImportError, RosterImportRecord};
pub use repository::{DepartureRepository, RepositoryError, RosterRepository};
pub use roster::{PreviousEmployment, RosterError, TrackingRoster};
pub use router::tracking_router;
pub use service::{
    CheckRunReport, FetchError, SkippedCheck, SnapshotFetcher, TrackingService,
    TrackingServiceError,
};
pub use store::DepartureStore;
