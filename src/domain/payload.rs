use serde_json::{Map, Value};
use url::Url;

use crate::domain::ticket::TicketDetails;
use crate::error::{AppError, AppResult};

pub const ATTR_DATE_TIME: &str = "date_time";
pub const ATTR_SEVERITY: &str = "severity";
pub const ATTR_SENDER: &str = "sender";
pub const ATTR_LINK: &str = "link";
pub const ATTR_IDENTIFIER: &str = "identifier";

/// Validates the notification data payload.
///
/// The payload is an object or a list of objects whose keys are limited to
/// the optional ticket fields. A missing or `null` payload is empty.
pub fn parse_details(data: Option<&Value>) -> AppResult<TicketDetails> {
    let entries = match data {
        None | Some(Value::Null) => return Ok(TicketDetails::default()),
        Some(Value::Array(items)) => items.iter().collect::<Vec<_>>(),
        Some(other) => vec![other],
    };

    let mut details = TicketDetails::default();
    for (index, entry) in entries.into_iter().enumerate() {
        let object = entry.as_object().ok_or_else(|| {
            AppError::Validation(format!("expected a dictionary @ data[{index}]"))
        })?;
        details.merge(parse_entry(index, object)?);
    }
    Ok(details)
}

fn parse_entry(index: usize, object: &Map<String, Value>) -> AppResult<TicketDetails> {
    let mut details = TicketDetails::default();
    for (key, value) in object {
        let invalid = |expected: &str| {
            AppError::Validation(format!(
                "expected {expected} for dictionary value @ data[{index}]['{key}']"
            ))
        };
        match key.as_str() {
            ATTR_DATE_TIME => {
                let date_time = integer_field(value).ok_or_else(|| invalid("int"))?;
                details.date_time = Some(date_time).filter(|stamp| *stamp != 0);
            }
            ATTR_SEVERITY => {
                details.severity = string_field(value).ok_or_else(|| invalid("str"))?;
            }
            ATTR_SENDER => {
                details.sender = string_field(value).ok_or_else(|| invalid("str"))?;
            }
            ATTR_IDENTIFIER => {
                details.identifier = string_field(value).ok_or_else(|| invalid("str"))?;
            }
            ATTR_LINK => {
                let text = value.as_str().ok_or_else(|| invalid("a URL"))?;
                details.link = Some(validate_url(text).ok_or_else(|| invalid("a URL"))?);
            }
            _ => {
                return Err(AppError::Validation(format!(
                    "extra keys not allowed @ data[{index}]['{key}']"
                )));
            }
        }
    }
    Ok(details)
}

fn integer_field(value: &Value) -> Option<i64> {
    match value {
        Value::Bool(flag) => Some(i64::from(*flag)),
        other => other.as_i64(),
    }
}

/// Outer `None` rejects the value; inner `None` is a falsy value left off the ticket.
fn string_field(value: &Value) -> Option<Option<String>> {
    match value {
        Value::String(text) => Some(Some(text.clone()).filter(|text| !text.is_empty())),
        Value::Number(number) if number.as_f64() == Some(0.0) => Some(None),
        Value::Number(number) => Some(Some(number.to_string())),
        Value::Bool(true) => Some(Some("True".to_string())),
        Value::Bool(false) => Some(None),
        _ => None,
    }
}

fn validate_url(text: &str) -> Option<String> {
    let url = Url::parse(text.trim()).ok()?;
    let web = matches!(url.scheme(), "http" | "https");
    if web && url.host_str().is_some_and(|host| !host.is_empty()) {
        Some(text.trim().to_string())
    } else {
        None
    }
}
