//! Monitoring event types consumed by the relay.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::error::ConfigError;

/// Severity levels, used to pick an accent colour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Service is healthy again
    Recovered,
    /// Something needs attention
    Warning,
    /// Service is down
    Critical,
}

impl Severity {
    /// Get the Slack attachment colour for this severity.
    #[must_use]
    pub const fn color(&self) -> &'static str {
        match self {
            Self::Recovered => "#2eb886", // Green
            Self::Warning => "#f39c12",   // Orange
            Self::Critical => "#e74c3c",  // Red
        }
    }
}

/// The closed set of events the monitoring engine emits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EventKind {
    /// Response time crossed the warning threshold
    LatencyWarning,
    /// A service just went down
    NewOutage,
    /// A service is still down on a later check
    CurrentOutage,
    /// A previously down service is reachable again
    ServiceBack,
    /// The check itself failed
    ServiceError,
    /// A routine successful check
    ServiceOk,
}

impl EventKind {
    /// Every event kind, in the order the monitoring engine documents them.
    pub const ALL: [Self; 6] = [
        Self::LatencyWarning,
        Self::NewOutage,
        Self::CurrentOutage,
        Self::ServiceBack,
        Self::ServiceError,
        Self::ServiceOk,
    ];

    /// Wire name of the event (`new-outage`, ...).
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::LatencyWarning => "latency-warning",
            Self::NewOutage => "new-outage",
            Self::CurrentOutage => "current-outage",
            Self::ServiceBack => "service-back",
            Self::ServiceError => "service-error",
            Self::ServiceOk => "service-ok",
        }
    }

    /// Friendly label used as a message header.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::LatencyWarning => "Latency Warning",
            Self::NewOutage => "New Outages",
            Self::CurrentOutage => "Current Outage",
            Self::ServiceBack => "Services Back",
            Self::ServiceError => "Service Error",
            Self::ServiceOk => "Service OK",
        }
    }

    /// Get the severity/color for this event.
    #[must_use]
    pub const fn severity(&self) -> Severity {
        match self {
            Self::ServiceBack | Self::ServiceOk => Severity::Recovered,
            Self::LatencyWarning => Severity::Warning,
            Self::NewOutage | Self::CurrentOutage | Self::ServiceError => Severity::Critical,
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EventKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.trim();
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str().eq_ignore_ascii_case(name))
            .ok_or_else(|| ConfigError::UnknownEventKind(name.to_string()))
    }
}

/// A monitored service, as supplied by the monitoring engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Service {
    /// Opaque identifier. Numeric ids are normalised to their decimal form.
    #[serde(deserialize_with = "deserialize_id")]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub url: String,
}

impl Service {
    #[must_use]
    pub fn new(id: impl Into<String>, name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            url: url.into(),
        }
    }
}

fn deserialize_id<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawId {
        Text(String),
        Number(serde_json::Number),
    }

    Ok(match RawId::deserialize(deserializer)? {
        RawId::Text(id) => id,
        RawId::Number(id) => id.to_string(),
    })
}

/// Opaque event payload.
///
/// The relay reads `timestamp`, plus `elapsedTime` and `error` when present;
/// everything else is carried through untouched.
///
/// For `service-back` the payload describes the outage that just ended, so
/// its timestamp marks the start of the downtime.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EventData(Value);

impl EventData {
    /// Payload carrying only a timestamp.
    #[must_use]
    pub fn at(timestamp: DateTime<Utc>) -> Self {
        Self(serde_json::json!({ "timestamp": timestamp.timestamp_millis() }))
    }

    /// Raw JSON payload.
    #[must_use]
    pub const fn as_value(&self) -> &Value {
        &self.0
    }

    /// Response time of the check that produced the event, in milliseconds.
    #[must_use]
    pub fn elapsed_ms(&self) -> Option<u64> {
        self.0.get("elapsedTime")?.as_u64()
    }

    /// Error message attached by the monitoring engine.
    #[must_use]
    pub fn error(&self) -> Option<&str> {
        self.0
            .get("error")?
            .as_str()
            .filter(|message| !message.trim().is_empty())
    }

    /// Timestamp of the event, if present and well formed.
    ///
    /// Accepts epoch milliseconds (as a number or numeric string) and
    /// RFC 3339 strings.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn timestamp(&self) -> Option<DateTime<Utc>> {
        match self.0.get("timestamp")? {
            Value::Number(millis) => millis
                .as_i64()
                .or_else(|| millis.as_f64().map(|f| f as i64))
                .and_then(DateTime::from_timestamp_millis),
            Value::String(raw) => raw
                .parse::<i64>()
                .ok()
                .and_then(DateTime::from_timestamp_millis)
                .or_else(|| {
                    DateTime::parse_from_rfc3339(raw)
                        .ok()
                        .map(|ts| ts.with_timezone(&Utc))
                }),
            _ => None,
        }
    }
}

impl From<Value> for EventData {
    fn from(value: Value) -> Self {
        Self(value)
    }
}

/// One event occurrence as delivered by the monitoring engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonitorEvent {
    pub event: EventKind,
    pub service: Service,
    #[serde(default)]
    pub data: EventData,
}

impl MonitorEvent {
    #[must_use]
    pub const fn new(event: EventKind, service: Service, data: EventData) -> Self {
        Self {
            event,
            service,
            data,
        }
    }
}
