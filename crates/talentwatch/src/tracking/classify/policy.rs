use super::signals::SignalSet;
use crate::tracking::domain::{AlertLevel, Signal};

/// Map a signal set onto an alert level plus the signals that justify it.
///
/// Precedence is fixed and first-match-wins: a confirmed startup/stealth
/// destination (Critical) always beats ambiguous building language (Watch),
/// which beats a standard move. Signals are collected in evaluation order with
/// duplicates suppressed so alert text stays deterministic.
pub(crate) fn decide(signals: &SignalSet, company_blank: bool) -> (AlertLevel, Vec<Signal>) {
    let mut collected = Vec::new();

    if signals.is_stealth {
        push_unique(&mut collected, Signal::Stealth);
    }
    if signals.is_small_company && signals.is_recently_founded {
        push_unique(&mut collected, Signal::SmallAndRecent);
    }
    if signals.is_founder_title {
        push_unique(&mut collected, Signal::FounderTitle);
    }
    if !collected.is_empty() {
        return (AlertLevel::Critical, collected);
    }

    if signals.is_building_language || company_blank {
        return (AlertLevel::Watch, vec![Signal::BuildingLanguage]);
    }

    (AlertLevel::Standard, vec![Signal::StandardDeparture])
}

fn push_unique(signals: &mut Vec<Signal>, signal: Signal) {
    if !signals.contains(&signal) {
        signals.push(signal);
    }
}
