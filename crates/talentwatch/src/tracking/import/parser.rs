use serde::{Deserialize, Deserializer};
use std::io::Read;

use super::normalizer::{normalize_field, normalize_optional};
use crate::tracking::domain::{EmploymentSnapshot, EnrichedPerson, PersonId};

/// One parsed export row: the company the person is tracked for plus their
/// enrichment record. Rows without a person id parse to `None`.
#[derive(Debug)]
pub(crate) struct RosterRow {
    pub(crate) tracked_company: String,
    pub(crate) person: EnrichedPerson,
}

pub(crate) fn parse_rows<R: Read>(reader: R) -> Result<Vec<Option<RosterRow>>, csv::Error> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);
    let mut rows = Vec::new();

    for record in csv_reader.deserialize::<ExportRow>() {
        rows.push(record?.into_roster_row());
    }

    Ok(rows)
}

#[derive(Debug, Deserialize)]
struct ExportRow {
    #[serde(rename = "Person Id", default, deserialize_with = "empty_string_as_none")]
    person_id: Option<String>,
    #[serde(rename = "Name", default, deserialize_with = "empty_string_as_none")]
    name: Option<String>,
    #[serde(
        rename = "Tracked Company",
        default,
        deserialize_with = "empty_string_as_none"
    )]
    tracked_company: Option<String>,
    #[serde(rename = "Company", default, deserialize_with = "empty_string_as_none")]
    company: Option<String>,
    #[serde(rename = "Title", default, deserialize_with = "empty_string_as_none")]
    title: Option<String>,
    #[serde(
        rename = "Company Size",
        default,
        deserialize_with = "empty_string_as_none"
    )]
    company_size: Option<String>,
    #[serde(
        rename = "Company Founded",
        default,
        deserialize_with = "empty_string_as_none"
    )]
    company_founded: Option<String>,
    #[serde(rename = "Industry", default, deserialize_with = "empty_string_as_none")]
    industry: Option<String>,
    #[serde(rename = "Headline", default, deserialize_with = "empty_string_as_none")]
    headline: Option<String>,
    #[serde(rename = "Summary", default, deserialize_with = "empty_string_as_none")]
    summary: Option<String>,
    #[serde(
        rename = "Started On",
        default,
        deserialize_with = "empty_string_as_none"
    )]
    started_on: Option<String>,
}

impl ExportRow {
    fn into_roster_row(self) -> Option<RosterRow> {
        let person_id = normalize_optional(self.person_id.as_deref())?;
        let tracked_company = normalize_optional(self.tracked_company.as_deref())
            .or_else(|| normalize_optional(self.company.as_deref()))?;

        let snapshot = EmploymentSnapshot {
            company: normalize_optional(self.company.as_deref()),
            title: normalize_optional(self.title.as_deref()),
            company_size: normalize_optional(self.company_size.as_deref()),
            company_founded: self
                .company_founded
                .as_deref()
                .and_then(|raw| raw.trim().parse::<i32>().ok()),
            industry: normalize_optional(self.industry.as_deref()),
            headline: self.headline.map(|value| normalize_field(&value)),
            summary: self.summary.map(|value| normalize_field(&value)),
            started_on: normalize_optional(self.started_on.as_deref()),
        };

        Some(RosterRow {
            tracked_company,
            person: EnrichedPerson {
                id: PersonId(person_id),
                name: normalize_optional(self.name.as_deref())
                    .unwrap_or_else(|| "Unknown".to_string()),
                snapshot,
            },
        })
    }
}

fn empty_string_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let opt = Option::<String>::deserialize(deserializer)?;
    Ok(opt.filter(|value| !value.trim().is_empty()))
}
