use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use super::config::ClassifierConfig;
use crate::tracking::domain::EmploymentSnapshot;

/// Boolean/categorical evidence derived from one employment snapshot.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignalSet {
    pub is_small_company: bool,
    pub is_recently_founded: bool,
    pub is_stealth: bool,
    pub is_founder_title: bool,
    pub is_building_language: bool,
    /// Literal phrase-table entries that matched, in detection order.
    pub matched_phrases: Vec<String>,
}

/// Derive signals from a snapshot. Pure: missing or malformed fields read as
/// "unknown" and produce false, never an error.
pub(crate) fn extract(
    snapshot: &EmploymentSnapshot,
    config: &ClassifierConfig,
    today: NaiveDate,
) -> SignalSet {
    let is_small_company = snapshot
        .company_size
        .as_deref()
        .and_then(parse_size_upper_bound)
        .map(|upper| upper <= config.small_company_max_headcount)
        .unwrap_or(false);

    let is_recently_founded = snapshot
        .company_founded
        .map(|year| year >= today.year() - config.recent_founding_window_years)
        .unwrap_or(false);

    let is_founder_title = snapshot
        .title
        .as_deref()
        .map(|title| contains_keyword(title, &config.founder_title_keywords))
        .unwrap_or(false);

    let free_text = free_text_of(snapshot);
    let mut matched_phrases = Vec::new();
    let stealth_phrase_hit = collect_matches(&free_text, &config.stealth_phrases, &mut matched_phrases);
    let is_building_language =
        collect_matches(&free_text, &config.building_phrases, &mut matched_phrases);

    let is_stealth = snapshot.company_is_blank() && (is_founder_title || stealth_phrase_hit);

    SignalSet {
        is_small_company,
        is_recently_founded,
        is_stealth,
        is_founder_title,
        is_building_language,
        matched_phrases,
    }
}

/// Upper bound of a headcount bucket string.
///
/// Grammar observed upstream: `"A-B"` (bound is B), `"N+"` (unbounded, None),
/// bare `"N"` (bound is N). Thousands separators and stray whitespace are
/// tolerated; anything else is unknown.
pub(crate) fn parse_size_upper_bound(bucket: &str) -> Option<u32> {
    let cleaned: String = bucket
        .chars()
        .filter(|ch| !ch.is_whitespace() && *ch != ',')
        .collect();
    if cleaned.is_empty() || cleaned.ends_with('+') {
        return None;
    }

    let upper = match cleaned.split_once('-') {
        Some((_, upper)) => upper,
        None => cleaned.as_str(),
    };
    upper.parse::<u32>().ok()
}

fn free_text_of(snapshot: &EmploymentSnapshot) -> String {
    let mut text = String::new();
    for field in [snapshot.headline.as_deref(), snapshot.summary.as_deref()] {
        if let Some(value) = field {
            text.push_str(&value.to_lowercase());
            text.push(' ');
        }
    }
    text
}

fn contains_keyword(value: &str, keywords: &[String]) -> bool {
    let haystack = value.to_lowercase();
    keywords
        .iter()
        .any(|keyword| haystack.contains(&keyword.to_lowercase()))
}

/// Append every phrase found in `haystack` to `matched` (skipping entries
/// already recorded) and report whether anything from this table hit.
fn collect_matches(haystack: &str, phrases: &[String], matched: &mut Vec<String>) -> bool {
    let mut any = false;
    for phrase in phrases {
        if haystack.contains(&phrase.to_lowercase()) {
            any = true;
            if !matched.iter().any(|seen| seen == phrase) {
                matched.push(phrase.clone());
            }
        }
    }
    any
}
