use serde::{Deserialize, Serialize};

/// Optional ticket metadata taken from the message data payload.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TicketDetails {
    pub date_time: Option<i64>,
    pub severity: Option<String>,
    pub sender: Option<String>,
    pub link: Option<String>,
    pub identifier: Option<String>,
}

impl TicketDetails {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Fields set in `other` replace the ones already present.
    pub fn merge(&mut self, other: TicketDetails) {
        if other.date_time.is_some() {
            self.date_time = other.date_time;
        }
        if other.severity.is_some() {
            self.severity = other.severity;
        }
        if other.sender.is_some() {
            self.sender = other.sender;
        }
        if other.link.is_some() {
            self.link = other.link;
        }
        if other.identifier.is_some() {
            self.identifier = other.identifier;
        }
    }
}

/// The record posted to DutyCalls for one notification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Ticket {
    pub title: String,
    pub body: String,
    #[serde(rename = "dateTime", skip_serializing_if = "Option::is_none")]
    pub date_time: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub severity: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sender: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub identifier: Option<String>,
}

impl Ticket {
    /// Builds a ticket, dropping falsy details (empty text, zero timestamp).
    pub fn new(title: &str, body: &str, details: TicketDetails) -> Self {
        Self {
            title: title.to_string(),
            body: body.to_string(),
            date_time: details.date_time.filter(|value| *value != 0),
            severity: non_empty(details.severity),
            sender: non_empty(details.sender),
            link: non_empty(details.link),
            identifier: non_empty(details.identifier),
        }
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CreatedTicket {
    pub sid: String,
    #[serde(default)]
    pub channel: Option<String>,
}
