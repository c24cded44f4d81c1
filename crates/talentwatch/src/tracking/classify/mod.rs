mod config;
mod policy;
mod signals;

pub use config::ClassifierConfig;
pub use signals::SignalSet;

use chrono::{DateTime, NaiveDate, Utc};

use crate::tracking::domain::{DepartureDraft, EmploymentSnapshot};

/// Stateless classifier that compares a tracked person's last-known employer
/// against a fresh snapshot.
pub struct DepartureClassifier {
    config: ClassifierConfig,
}

impl DepartureClassifier {
    pub fn new(config: ClassifierConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ClassifierConfig {
        &self.config
    }

    /// Decide whether `snapshot` represents a departure from `old_company`.
    ///
    /// Returns `None` when the snapshot still shows the same employer
    /// (case- and whitespace-insensitive). Pure: the observation instant is an
    /// explicit parameter, and bad upstream data degrades to unknown signals
    /// rather than an error.
    pub fn classify(
        &self,
        old_company: &str,
        old_title: Option<&str>,
        snapshot: &EmploymentSnapshot,
        observed_at: DateTime<Utc>,
    ) -> Option<DepartureDraft> {
        if snapshot.matches_company(old_company) {
            return None;
        }

        let signals = signals::extract(snapshot, &self.config, observed_at.date_naive());
        let (alert_level, tags) = policy::decide(&signals, snapshot.company_is_blank());

        Some(DepartureDraft {
            old_company: old_company.to_string(),
            old_title: old_title.map(str::to_string),
            new_company: snapshot
                .company
                .as_deref()
                .map(str::trim)
                .filter(|company| !company.is_empty())
                .map(str::to_string),
            new_title: snapshot.title.clone(),
            departure_date: snapshot.started_on.as_deref().and_then(parse_departure_date),
            detected_at: observed_at,
            alert_level,
            signals: tags,
        })
    }

    /// Signal extraction alone, for audit surfaces that want the evidence
    /// without a classification decision.
    pub fn signals_for(&self, snapshot: &EmploymentSnapshot, today: NaiveDate) -> SignalSet {
        signals::extract(snapshot, &self.config, today)
    }
}

/// Best-effort parse of a provider date string: full date, year-month, or
/// bare year. Anything else is unknown.
fn parse_departure_date(value: &str) -> Option<NaiveDate> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }

    if let Ok(date) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
        return Some(date);
    }

    if let Some((year, month)) = trimmed.split_once('-') {
        if let (Ok(year), Ok(month)) = (year.parse::<i32>(), month.parse::<u32>()) {
            if let Some(date) = NaiveDate::from_ymd_opt(year, month, 1) {
                return Some(date);
            }
        }
    }

    trimmed
        .parse::<i32>()
        .ok()
        .and_then(|year| NaiveDate::from_ymd_opt(year, 1, 1))
}

#[cfg(test)]
pub(crate) fn parse_departure_date_for_tests(value: &str) -> Option<NaiveDate> {
    parse_departure_date(value)
}

#[cfg(test)]
pub(crate) fn parse_size_upper_bound_for_tests(bucket: &str) -> Option<u32> {
    signals::parse_size_upper_bound(bucket)
}
