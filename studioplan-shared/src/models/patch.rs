/// Serde helpers for partial updates
///
/// Update payloads distinguish three states per nullable field:
///
/// ```text
/// field absent        -> None           (leave column untouched)
/// field: null or ""   -> Some(None)     (clear column)
/// field: value        -> Some(Some(v))  (set column)
/// ```
///
/// Non-nullable columns with an empty value (note content, tag lists) use
/// [`null_as_default`] instead, so `null` sets them to that empty value.
///
/// Absent fields rely on `#[serde(default)]`; the deserializers here only run
/// when the key is present, which is what makes the distinction possible.

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer};

/// Present-but-null becomes `Some(None)`
pub fn double_option<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// Present-but-null becomes `Some(T::default())`
pub fn null_as_default<'de, T, D>(deserializer: D) -> Result<Option<T>, D::Error>
where
    T: Deserialize<'de> + Default,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(|value| Some(value.unwrap_or_default()))
}

/// Nullable date patch; `null` and `""` both clear
pub fn nullable_date<'de, D>(deserializer: D) -> Result<Option<Option<NaiveDate>>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    match raw {
        None => Ok(Some(None)),
        Some(value) => parse_date(&value)
            .map(Some)
            .map_err(serde::de::Error::custom),
    }
}

/// Optional date on create payloads; `""` counts as absent
pub fn lenient_date<'de, D>(deserializer: D) -> Result<Option<NaiveDate>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    match raw {
        None => Ok(None),
        Some(value) => parse_date(&value).map_err(serde::de::Error::custom),
    }
}

/// Parses `YYYY-MM-DD`, also accepting a full timestamp and keeping its date
pub fn parse_date(value: &str) -> Result<Option<NaiveDate>, String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }

    let date_part = trimmed.get(..10).unwrap_or(trimmed);
    NaiveDate::parse_from_str(date_part, "%Y-%m-%d")
        .map(Some)
        .map_err(|_| format!("invalid date '{}', expected YYYY-MM-DD", trimmed))
}

/// Trims optional text, mapping blank to `None`
pub fn clean_text(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Applies `clean_text` inside a nullable patch
pub fn clean_patch_text(value: Option<Option<String>>) -> Option<Option<String>> {
    value.map(clean_text)
}

/// Maps `""` to `None` without trimming (free-form bodies keep whitespace)
pub fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

/// True when the string has visible characters
pub fn is_blank(value: &str) -> bool {
    value.trim().is_empty()
}
