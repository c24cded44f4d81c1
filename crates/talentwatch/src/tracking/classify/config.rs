use serde::{Deserialize, Serialize};

/// Data-driven classification thresholds and phrase tables.
///
/// Keyword and phrase lists are configuration rather than control flow so they
/// can be extended (or tested) without touching the classifier itself.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassifierConfig {
    /// Upper bound (inclusive) on the parsed headcount bucket for a company to
    /// count as small.
    pub small_company_max_headcount: u32,
    /// A company founded within this many years of the observation date counts
    /// as recently founded.
    pub recent_founding_window_years: i32,
    /// Case-insensitive substrings that mark a leadership/founder title.
    pub founder_title_keywords: Vec<String>,
    /// Phrases in headline/summary that mark a stealth venture.
    pub stealth_phrases: Vec<String>,
    /// Phrases in headline/summary that mark ambiguous "building something"
    /// activity short of a confirmed startup.
    pub building_phrases: Vec<String>,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            small_company_max_headcount: 50,
            recent_founding_window_years: 2,
            founder_title_keywords: [
                "founder",
                "co-founder",
                "cofounder",
                "ceo",
                "cto",
                "chief executive",
                "chief technology",
                "owner",
            ]
            .into_iter()
            .map(str::to_string)
            .collect(),
            stealth_phrases: ["stealth", "building something new", "working on something new"]
                .into_iter()
                .map(str::to_string)
                .collect(),
            building_phrases: [
                "building",
                "stealth mode",
                "something new",
                "excited to announce",
            ]
            .into_iter()
            .map(str::to_string)
            .collect(),
        }
    }
}
