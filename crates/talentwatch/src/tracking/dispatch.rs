use std::sync::Arc;

use serde::Serialize;

use super::domain::{AlertLevel, Departure, DepartureId};

/// Trait describing the outbound notification hook (e-mail, chat, webhook).
///
/// Implementations own their transport timeout; the dispatcher only cares
/// whether a send succeeded.
pub trait AlertNotifier: Send + Sync {
    fn send(&self, notice: &AlertNotice) -> Result<(), NotifyError>;
}

/// Notification delivery error.
#[derive(Debug, thiserror::Error)]
pub enum NotifyError {
    #[error("notification transport unavailable: {0}")]
    Transport(String),
    #[error("notification timed out after {0} ms")]
    Timeout(u64),
}

/// One outbound message covering a group of departures.
///
/// `company` is the tracked (old) employer the group belongs to; `None` marks
/// the cross-company standard-level digest.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AlertNotice {
    pub company: Option<String>,
    pub level: AlertLevel,
    pub departures: Vec<Departure>,
    pub is_test: bool,
}

/// Result of sending one planned notice.
#[derive(Debug, Clone, Serialize)]
pub struct NoticeOutcome {
    pub notice: AlertNotice,
    pub delivered: bool,
}

/// Summary of one dispatch pass, with per-level departure counts for
/// observability.
#[derive(Debug, Clone, Serialize)]
pub struct DispatchReport {
    pub outcomes: Vec<NoticeOutcome>,
    pub all_sent: bool,
    pub critical: usize,
    pub watch: usize,
    pub standard: usize,
}

impl DispatchReport {
    /// Ids of every departure covered by a successfully delivered notice.
    pub fn delivered_departure_ids(&self) -> Vec<DepartureId> {
        self.outcomes
            .iter()
            .filter(|outcome| outcome.delivered)
            .flat_map(|outcome| outcome.notice.departures.iter().map(|dep| dep.id.clone()))
            .collect()
    }

    pub fn notices_attempted(&self) -> usize {
        self.outcomes.len()
    }

    pub fn notices_failed(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|outcome| !outcome.delivered)
            .count()
    }
}

/// Groups classified departures into notices and pushes them through the
/// notification collaborator.
pub struct AlertDispatcher<N> {
    notifier: Arc<N>,
    min_level: AlertLevel,
    is_test: bool,
}

impl<N> AlertDispatcher<N>
where
    N: AlertNotifier,
{
    pub fn new(notifier: Arc<N>, min_level: AlertLevel, is_test: bool) -> Self {
        Self {
            notifier,
            min_level,
            is_test,
        }
    }

    pub fn min_level(&self) -> AlertLevel {
        self.min_level
    }

    /// Pure grouping step, separated out so the batching rules stay testable
    /// without a transport:
    /// critical departures go out one notice per person, watch departures are
    /// grouped per tracked company, and standard departures collapse into a
    /// single digest that only exists when the threshold admits level 1.
    pub fn plan(&self, batch: &[Departure]) -> Vec<AlertNotice> {
        let mut notices = Vec::new();

        for departure in batch {
            if departure.alert_level == AlertLevel::Critical
                && departure.alert_level >= self.min_level
            {
                notices.push(AlertNotice {
                    company: Some(departure.old_company.clone()),
                    level: AlertLevel::Critical,
                    departures: vec![departure.clone()],
                    is_test: self.is_test,
                });
            }
        }

        let mut watch_companies: Vec<String> = Vec::new();
        for departure in batch {
            if departure.alert_level == AlertLevel::Watch && departure.alert_level >= self.min_level
            {
                if !watch_companies.contains(&departure.old_company) {
                    watch_companies.push(departure.old_company.clone());
                }
            }
        }
        for company in watch_companies {
            let grouped: Vec<Departure> = batch
                .iter()
                .filter(|departure| {
                    departure.alert_level == AlertLevel::Watch && departure.old_company == company
                })
                .cloned()
                .collect();
            notices.push(AlertNotice {
                company: Some(company),
                level: AlertLevel::Watch,
                departures: grouped,
                is_test: self.is_test,
            });
        }

        if self.min_level <= AlertLevel::Standard {
            let standard: Vec<Departure> = batch
                .iter()
                .filter(|departure| departure.alert_level == AlertLevel::Standard)
                .cloned()
                .collect();
            if !standard.is_empty() {
                notices.push(AlertNotice {
                    company: None,
                    level: AlertLevel::Standard,
                    departures: standard,
                    is_test: self.is_test,
                });
            }
        }

        notices
    }

    /// Send every planned notice. A failed send is logged and isolated to its
    /// group; the caller decides what "notified" means (delivery here is
    /// at-least-once, never silently dropped).
    pub fn dispatch(&self, batch: &[Departure]) -> DispatchReport {
        let notices = self.plan(batch);

        let mut critical = 0;
        let mut watch = 0;
        let mut standard = 0;
        let mut outcomes = Vec::with_capacity(notices.len());

        for notice in notices {
            match notice.level {
                AlertLevel::Critical => critical += notice.departures.len(),
                AlertLevel::Watch => watch += notice.departures.len(),
                AlertLevel::Standard => standard += notice.departures.len(),
            }

            let delivered = match self.notifier.send(&notice) {
                Ok(()) => true,
                Err(err) => {
                    tracing::warn!(
                        level = notice.level.label(),
                        company = notice.company.as_deref().unwrap_or("-"),
                        error = %err,
                        "alert notice delivery failed; will retry next cycle"
                    );
                    false
                }
            };

            outcomes.push(NoticeOutcome { notice, delivered });
        }

        let all_sent = outcomes.iter().all(|outcome| outcome.delivered);

        DispatchReport {
            outcomes,
            all_sent,
            critical,
            watch,
            standard,
        }
    }
}
