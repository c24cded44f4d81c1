use serde::{Deserialize, Serialize};

use super::classify::ClassifierConfig;
use super::domain::AlertLevel;

/// Tunables for one tracking pipeline instance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackingConfig {
    pub classifier: ClassifierConfig,
    /// Departures below this level are stored but never dispatched.
    pub min_alert_level: AlertLevel,
    /// Marks every outbound notice as a test message.
    pub notify_as_test: bool,
}

impl Default for TrackingConfig {
    fn default() -> Self {
        Self {
            classifier: ClassifierConfig::default(),
            min_alert_level: AlertLevel::Watch,
            notify_as_test: false,
        }
    }
}
