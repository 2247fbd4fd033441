//! Typed views of the Varbi API payloads.
//!
//! Every upstream response is wrapped in an envelope object carrying a
//! `data` key. Once `data` is present, each record is decoded strictly: a
//! missing field is reported as [`AppError::MalformedPayload`]. Text fields
//! that are present may hold a string, a number or `null`.

use serde::Deserialize;
use serde_json::Value;

use crate::error::{Absent, AppError};

/// Extract the `data` member from a fetch result.
///
/// Returns `None` when the fetch failed, when the body is not a JSON object,
/// or when the object has no `data` key. A `data` key holding `null` is
/// still returned; the record decoders reject it.
pub fn envelope_data(response: Result<Value, Absent>) -> Option<Value> {
    match response {
        Ok(Value::Object(mut envelope)) => envelope.remove("data"),
        _ => None,
    }
}

/// A label from the occupation-field taxonomy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Category {
    pub id: String,
    pub name: String,
}

/// One job offer as returned by the job search endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobSummary {
    pub id: String,
    pub title: String,
    pub deadline: String,
    /// Application form URL, absent for offers without an online form.
    pub apply_link: Option<String>,
}

/// The advertisement text of a single job offer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobDescription {
    /// Combined description, raw HTML.
    pub html: String,
}

impl Category {
    pub fn from_record(record: Value) -> Result<Self, AppError> {
        let raw: CategoryRecord = decode(record)?;
        Ok(Self {
            id: raw.id.into(),
            name: raw.attributes.name.into(),
        })
    }
}

impl JobSummary {
    pub fn from_record(record: Value) -> Result<Self, AppError> {
        let raw: JobRecord = decode(record)?;
        Ok(Self {
            id: raw.id.into(),
            title: raw.attributes.translations.texts.title.into(),
            deadline: raw.attributes.dates.deadline.into(),
            apply_link: raw.links.and_then(|links| links.apply),
        })
    }
}

impl JobDescription {
    pub fn from_record(record: Value) -> Result<Self, AppError> {
        let raw: AdRecord = decode(record)?;
        Ok(Self {
            html: raw.attributes.texts.descriptions.combined,
        })
    }
}

/// Decode every element of a `data` array, keeping upstream order.
///
/// The error names the offending index so a bad record can be located in
/// the upstream response.
pub fn decode_list<T>(
    data: Value,
    decode_one: impl Fn(Value) -> Result<T, AppError>,
) -> Result<Vec<T>, AppError> {
    let Value::Array(records) = data else {
        return Err(AppError::MalformedPayload(format!(
            "expected `data` to be an array, got {}",
            kind_of(&data)
        )));
    };

    records
        .into_iter()
        .enumerate()
        .map(|(index, record)| {
            decode_one(record).map_err(|e| match e {
                AppError::MalformedPayload(msg) => {
                    AppError::MalformedPayload(format!("data[{index}]: {msg}"))
                }
                other => other,
            })
        })
        .collect()
}

fn decode<T: serde::de::DeserializeOwned>(record: Value) -> Result<T, AppError> {
    serde_json::from_value(record).map_err(|e| AppError::MalformedPayload(e.to_string()))
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

// ---- Wire types ----

/// Rendered in place of a field that is present but `null`.
pub const NULL_TEXT: &str = "None";

/// A scalar rendered as text. Upstream identifiers show up both as strings
/// and as bare numbers, and dates or names may be `null`. The field itself
/// must still be present.
#[derive(Deserialize)]
#[serde(untagged)]
enum WireText {
    Text(String),
    Number(serde_json::Number),
    Null,
}

impl From<WireText> for String {
    fn from(value: WireText) -> Self {
        match value {
            WireText::Text(s) => s,
            WireText::Number(n) => n.to_string(),
            WireText::Null => NULL_TEXT.to_string(),
        }
    }
}

#[derive(Deserialize)]
struct CategoryRecord {
    id: WireText,
    attributes: CategoryAttributes,
}

#[derive(Deserialize)]
struct CategoryAttributes {
    name: WireText,
}

#[derive(Deserialize)]
struct JobRecord {
    id: WireText,
    attributes: JobAttributes,
    #[serde(default)]
    links: Option<JobLinks>,
}

#[derive(Deserialize)]
struct JobAttributes {
    translations: JobTranslations,
    dates: JobDates,
}

#[derive(Deserialize)]
struct JobTranslations {
    texts: JobTexts,
}

#[derive(Deserialize)]
struct JobTexts {
    title: WireText,
}

#[derive(Deserialize)]
struct JobDates {
    deadline: WireText,
}

#[derive(Deserialize)]
struct JobLinks {
    #[serde(default)]
    apply: Option<String>,
}

#[derive(Deserialize)]
struct AdRecord {
    attributes: AdAttributes,
}

#[derive(Deserialize)]
struct AdAttributes {
    texts: AdTexts,
}

#[derive(Deserialize)]
struct AdTexts {
    descriptions: AdDescriptions,
}

#[derive(Deserialize)]
struct AdDescriptions {
    combined: String,
}
