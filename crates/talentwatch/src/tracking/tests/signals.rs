use chrono::NaiveDate;

use super::common::*;
use crate::tracking::classify::parse_size_upper_bound_for_tests as parse_size;
use crate::tracking::domain::EmploymentSnapshot;

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 7, 1).expect("valid date")
}

#[test]
fn size_buckets_parse_to_upper_bounds() {
    assert_eq!(parse_size("1-10"), Some(10));
    assert_eq!(parse_size("11-50"), Some(50));
    assert_eq!(parse_size("51-200"), Some(200));
    assert_eq!(parse_size("5,001-10,000"), Some(10_000));
    assert_eq!(parse_size("25"), Some(25));
    assert_eq!(parse_size(" 1 - 10 "), Some(10));
    assert_eq!(parse_size("10000+"), None);
    assert_eq!(parse_size(""), None);
    assert_eq!(parse_size("lots"), None);
}

#[test]
fn small_company_flag_respects_threshold() {
    let engine = classifier();

    let small = EmploymentSnapshot {
        company_size: Some("1-10".to_string()),
        ..snapshot("Acme")
    };
    assert!(engine.signals_for(&small, today()).is_small_company);

    let mid = EmploymentSnapshot {
        company_size: Some("51-200".to_string()),
        ..snapshot("Acme")
    };
    assert!(!engine.signals_for(&mid, today()).is_small_company);

    let unbounded = EmploymentSnapshot {
        company_size: Some("10000+".to_string()),
        ..snapshot("Acme")
    };
    assert!(!engine.signals_for(&unbounded, today()).is_small_company);
}

#[test]
fn recently_founded_uses_observation_year() {
    let engine = classifier();
    let founded = |year: i32| EmploymentSnapshot {
        company_founded: Some(year),
        ..snapshot("Acme")
    };

    assert!(engine.signals_for(&founded(2025), today()).is_recently_founded);
    assert!(engine.signals_for(&founded(2023), today()).is_recently_founded);
    assert!(!engine.signals_for(&founded(2022), today()).is_recently_founded);
}

#[test]
fn founder_titles_match_case_insensitively() {
    let engine = classifier();

    for title in ["Founder", "Co-Founder & CEO", "cto", "Chief Executive Officer", "Owner"] {
        let snap = snapshot_with_title("Acme", title);
        assert!(
            engine.signals_for(&snap, today()).is_founder_title,
            "expected founder title for {title}"
        );
    }

    let snap = snapshot_with_title("Acme", "Staff Engineer");
    assert!(!engine.signals_for(&snap, today()).is_founder_title);
}

#[test]
fn building_language_matches_headline_and_summary() {
    let engine = classifier();

    let headline = EmploymentSnapshot {
        headline: Some("Excited to announce my next chapter".to_string()),
        ..snapshot("Acme")
    };
    let signals = engine.signals_for(&headline, today());
    assert!(signals.is_building_language);
    assert!(signals
        .matched_phrases
        .iter()
        .any(|phrase| phrase == "excited to announce"));

    let summary = EmploymentSnapshot {
        summary: Some("Heads down BUILDING something new".to_string()),
        ..snapshot("Acme")
    };
    let signals = engine.signals_for(&summary, today());
    assert!(signals.is_building_language);
    assert!(signals.matched_phrases.iter().any(|phrase| phrase == "building"));
    assert!(signals
        .matched_phrases
        .iter()
        .any(|phrase| phrase == "something new"));
}

#[test]
fn stealth_requires_blank_company() {
    let engine = classifier();

    let blank_with_founder = stealth_founder_snapshot();
    assert!(engine.signals_for(&blank_with_founder, today()).is_stealth);

    let blank_with_phrase = EmploymentSnapshot {
        company: None,
        headline: Some("working on something new".to_string()),
        ..EmploymentSnapshot::default()
    };
    assert!(engine.signals_for(&blank_with_phrase, today()).is_stealth);

    // A named employer defeats the stealth signal even with founder evidence.
    let named = EmploymentSnapshot {
        company: Some("Acme".to_string()),
        title: Some("Founder".to_string()),
        headline: Some("stealth".to_string()),
        ..EmploymentSnapshot::default()
    };
    assert!(!engine.signals_for(&named, today()).is_stealth);

    // Blank company alone is not stealth.
    let blank_only = snapshot("");
    assert!(!engine.signals_for(&blank_only, today()).is_stealth);
}

#[test]
fn missing_fields_degrade_to_false() {
    let engine = classifier();
    let signals = engine.signals_for(&EmploymentSnapshot::default(), today());

    assert!(!signals.is_small_company);
    assert!(!signals.is_recently_founded);
    assert!(!signals.is_stealth);
    assert!(!signals.is_founder_title);
    assert!(!signals.is_building_language);
    assert!(signals.matched_phrases.is_empty());
}

#[test]
fn malformed_provider_payload_still_deserializes() {
    let snapshot: EmploymentSnapshot = serde_json::from_str(
        r#"{"company": "Acme", "company_founded": "2024", "company_size": null}"#,
    )
    .expect("lenient deserialization");

    assert_eq!(snapshot.company_founded, Some(2024));
    assert_eq!(snapshot.company_size, None);

    let engine = classifier();
    assert!(engine.signals_for(&snapshot, today()).is_recently_founded);

    // A founding year of an unexpected shape degrades to unknown.
    let snapshot: EmploymentSnapshot =
        serde_json::from_str(r#"{"company": "Acme", "company_founded": [2024]}"#)
            .expect("lenient deserialization");
    assert_eq!(snapshot.company_founded, None);
}
