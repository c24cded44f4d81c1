/// Clean a provider-exported text field: strip BOM and zero-width characters,
/// collapse runs of whitespace.
pub(crate) fn normalize_field(value: &str) -> String {
    let cleaned = value.replace(['\u{feff}', '\u{200b}'], "");
    cleaned.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// As `normalize_field`, but empty results become `None`.
pub(crate) fn normalize_optional(value: Option<&str>) -> Option<String> {
    value
        .map(normalize_field)
        .filter(|normalized| !normalized.is_empty())
}

#[cfg(test)]
pub(crate) fn normalize_for_tests(value: &str) -> String {
    normalize_field(value)
}
