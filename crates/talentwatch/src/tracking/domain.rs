use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// Identifier wrapper for tracked people, carrying the enrichment provider's
/// stable external id.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PersonId(pub String);

/// Identifier wrapper for stored departures.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct DepartureId(pub String);

/// Whether a tracked person is still at the company they were tracked for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TrackingStatus {
    Active,
    Departed,
}

impl TrackingStatus {
    pub const fn label(self) -> &'static str {
        match self {
            TrackingStatus::Active => "active",
            TrackingStatus::Departed => "departed",
        }
    }
}

/// Severity tier attached to a classified departure.
///
/// Standard is a move to an established employer, Watch is ambiguous
/// building-something language, Critical is a confirmed startup, founder, or
/// stealth destination.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertLevel {
    Standard,
    Watch,
    Critical,
}

impl AlertLevel {
    pub const fn value(self) -> u8 {
        match self {
            AlertLevel::Standard => 1,
            AlertLevel::Watch => 2,
            AlertLevel::Critical => 3,
        }
    }

    pub const fn from_value(value: u8) -> Option<Self> {
        match value {
            1 => Some(AlertLevel::Standard),
            2 => Some(AlertLevel::Watch),
            3 => Some(AlertLevel::Critical),
            _ => None,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            AlertLevel::Standard => "standard",
            AlertLevel::Watch => "watch",
            AlertLevel::Critical => "critical",
        }
    }
}

/// One piece of evidence attached to a classification, surfaced in alerts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Signal {
    Stealth,
    FounderTitle,
    SmallAndRecent,
    BuildingLanguage,
    StandardDeparture,
}

impl Signal {
    pub const fn label(self) -> &'static str {
        match self {
            Signal::Stealth => "stealth",
            Signal::FounderTitle => "founder_title",
            Signal::SmallAndRecent => "small_and_recent",
            Signal::BuildingLanguage => "building_language",
            Signal::StandardDeparture => "standard_departure",
        }
    }
}

/// Point-in-time employment record for a person, as supplied by the external
/// enrichment source.
///
/// Every field is optional: provider records are unreliable and missing data
/// must degrade to "unknown" rather than fail deserialization. Validation and
/// defaulting happen once here, at the fetch boundary, so the classifier
/// operates on a typed value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmploymentSnapshot {
    #[serde(default)]
    pub company: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    /// Headcount bucket string as reported upstream, e.g. `"1-10"` or `"10000+"`.
    #[serde(default)]
    pub company_size: Option<String>,
    /// Founding year; providers send this as a number or a numeric string.
    #[serde(default, deserialize_with = "lenient_year")]
    pub company_founded: Option<i32>,
    #[serde(default)]
    pub industry: Option<String>,
    #[serde(default)]
    pub headline: Option<String>,
    #[serde(default)]
    pub summary: Option<String>,
    /// Raw date-like string for when the current role started; parsed
    /// best-effort during classification.
    #[serde(default)]
    pub started_on: Option<String>,
}

impl EmploymentSnapshot {
    pub fn company_is_blank(&self) -> bool {
        self.company
            .as_deref()
            .map(|value| value.trim().is_empty())
            .unwrap_or(true)
    }

    /// Case- and whitespace-insensitive comparison against another company name.
    pub fn matches_company(&self, other: &str) -> bool {
        match self.company.as_deref() {
            Some(company) => normalize_company(company) == normalize_company(other),
            None => other.trim().is_empty(),
        }
    }
}

/// Canonical form used for company equality and idempotency keys.
pub(crate) fn normalize_company(value: &str) -> String {
    value
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

fn lenient_year<'de, D>(deserializer: D) -> Result<Option<i32>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(value.and_then(|value| match value {
        serde_json::Value::Number(number) => number.as_i64().map(|year| year as i32),
        serde_json::Value::String(raw) => raw.trim().parse::<i32>().ok(),
        _ => None,
    }))
}

/// Fetch-boundary record pairing a person's identity with their employment
/// snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnrichedPerson {
    pub id: PersonId,
    pub name: String,
    #[serde(default)]
    pub snapshot: EmploymentSnapshot,
}

/// A person on the tracking roster, with their last-known employment record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackedPerson {
    pub id: PersonId,
    pub name: String,
    pub original_company: String,
    pub current_company: Option<String>,
    pub title: Option<String>,
    pub status: TrackingStatus,
    pub tracking_started: DateTime<Utc>,
    pub last_checked: Option<DateTime<Utc>>,
    pub snapshot: EmploymentSnapshot,
}

impl TrackedPerson {
    pub fn status_view(&self) -> PersonStatusView {
        PersonStatusView {
            person_id: self.id.clone(),
            name: self.name.clone(),
            original_company: self.original_company.clone(),
            current_company: self.current_company.clone(),
            title: self.title.clone(),
            status: self.status.label(),
            tracking_started: self.tracking_started,
            last_checked: self.last_checked,
        }
    }
}

/// Sanitized representation of a tracked person's exposed state.
#[derive(Debug, Clone, Serialize)]
pub struct PersonStatusView {
    pub person_id: PersonId,
    pub name: String,
    pub original_company: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_company: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    pub status: &'static str,
    pub tracking_started: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_checked: Option<DateTime<Utc>>,
}

/// Classifier output before persistence assigns an id and dedupes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DepartureDraft {
    pub old_company: String,
    pub old_title: Option<String>,
    pub new_company: Option<String>,
    pub new_title: Option<String>,
    pub departure_date: Option<NaiveDate>,
    pub detected_at: DateTime<Utc>,
    pub alert_level: AlertLevel,
    pub signals: Vec<Signal>,
}

/// A detected change of employer for a tracked person.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Departure {
    pub id: DepartureId,
    pub person_id: PersonId,
    pub old_company: String,
    pub old_title: Option<String>,
    pub new_company: Option<String>,
    pub new_title: Option<String>,
    pub departure_date: Option<NaiveDate>,
    pub detected_at: DateTime<Utc>,
    pub alert_level: AlertLevel,
    pub signals: Vec<Signal>,
    pub notified: bool,
}

impl Departure {
    pub fn from_draft(id: DepartureId, person_id: PersonId, draft: DepartureDraft) -> Self {
        Self {
            id,
            person_id,
            old_company: draft.old_company,
            old_title: draft.old_title,
            new_company: draft.new_company,
            new_title: draft.new_title,
            departure_date: draft.departure_date,
            detected_at: draft.detected_at,
            alert_level: draft.alert_level,
            signals: draft.signals,
            notified: false,
        }
    }

    /// Display name for the destination employer.
    pub fn destination_label(&self) -> &str {
        match self.new_company.as_deref() {
            Some(company) if !company.trim().is_empty() => company,
            _ => "unknown/stealth",
        }
    }

    pub fn signal_labels(&self) -> Vec<&'static str> {
        self.signals.iter().map(|signal| signal.label()).collect()
    }
}
