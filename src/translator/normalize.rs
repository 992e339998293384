//! Question normalization

/// Trims and lower-cases a question.
///
/// Absent or blank input becomes the empty string, which no rule matches.
pub fn normalize<'a>(raw: impl Into<Option<&'a str>>) -> String {
    raw.into()
        .map(|text| text.trim().to_lowercase())
        .unwrap_or_default()
}
