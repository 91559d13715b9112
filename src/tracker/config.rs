use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use crate::logger::Logger;
use crate::tracker::api::LOGGER;
use crate::tracker::constants::DEFAULT_EVENTS;
use crate::tracker::error::{invalid_argument, TrackerResult};

/// Payload forwarded to the sink together with the event name.
pub type EventData = BTreeMap<String, Value>;

/// Analytics pipeline that receives the tracked events.
///
/// Unknown method names are kept as [`TrackingMethod::Unsupported`] rather than rejected, so a
/// misconfigured tracker still probes and only warns when it tries to dispatch.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum TrackingMethod {
    #[default]
    DataLayer,
    Gtag,
    Unsupported(String),
}

impl TrackingMethod {
    pub fn as_str(&self) -> &str {
        match self {
            TrackingMethod::DataLayer => "dataLayer",
            TrackingMethod::Gtag => "gtag",
            TrackingMethod::Unsupported(name) => name,
        }
    }
}

impl From<String> for TrackingMethod {
    fn from(value: String) -> Self {
        match value.as_str() {
            "dataLayer" => TrackingMethod::DataLayer,
            "gtag" => TrackingMethod::Gtag,
            _ => TrackingMethod::Unsupported(value),
        }
    }
}

impl From<&str> for TrackingMethod {
    fn from(value: &str) -> Self {
        TrackingMethod::from(value.to_string())
    }
}

impl From<TrackingMethod> for String {
    fn from(value: TrackingMethod) -> Self {
        value.as_str().to_string()
    }
}

impl fmt::Display for TrackingMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Event emitted for a single HTTP status code.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventSpec {
    #[serde(default)]
    pub event_name: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub data: EventData,
}

impl EventSpec {
    pub fn new(event_name: impl Into<String>) -> Self {
        Self {
            event_name: event_name.into(),
            data: EventData::new(),
        }
    }

    pub fn with_data(mut self, data: EventData) -> Self {
        self.data = data;
        self
    }

    pub fn with_param(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.data.insert(key.into(), value.into());
        self
    }
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<EventData, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<EventData>::deserialize(deserializer)?.unwrap_or_default())
}

/// How user supplied `events` combine with the default mapping.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum EventsMerge {
    /// Supplied events replace the whole default mapping.
    #[default]
    Replace,
    /// Supplied events override defaults status by status; other defaults are kept.
    ByStatus,
}

/// User facing options. Every field left unset keeps its default.
///
/// Also built from the JSON shape accepted by the browser build. That parse is lenient like
/// the JS object it mirrors: entries it cannot use are dropped with a warning.
///
/// ```
/// use erralytics::tracker::{TrackerOptions, TrackingMethod};
///
/// let options = TrackerOptions::from_json_str(
///     r#"{"trackingMethod":"gtag","events":{"404":{"eventName":"pagina_nao_encontrada"}}}"#,
/// )
/// .unwrap();
/// assert_eq!(options.tracking_method, Some(TrackingMethod::Gtag));
/// assert!(options.events.unwrap().contains_key(&404));
/// ```
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TrackerOptions {
    pub tracking_method: Option<TrackingMethod>,
    pub events: Option<BTreeMap<u16, EventSpec>>,
    pub events_merge: EventsMerge,
}

impl TrackerOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_tracking_method(mut self, method: impl Into<TrackingMethod>) -> Self {
        self.tracking_method = Some(method.into());
        self
    }

    pub fn with_events(mut self, events: BTreeMap<u16, EventSpec>) -> Self {
        self.events = Some(events);
        self
    }

    /// Adds one entry to the supplied events, creating the mapping when needed.
    pub fn with_event(mut self, status: u16, event: EventSpec) -> Self {
        self.events
            .get_or_insert_with(BTreeMap::new)
            .insert(status, event);
        self
    }

    pub fn with_events_merge(mut self, merge: EventsMerge) -> Self {
        self.events_merge = merge;
        self
    }

    /// Parses options from JSON text. Only malformed JSON is an error; see
    /// [`from_json_value`](Self::from_json_value) for how the content is read.
    pub fn from_json_str(raw: &str) -> TrackerResult<Self> {
        let value: Value = serde_json::from_str(raw).map_err(|err| {
            invalid_argument(format!("tracker options are not valid JSON: {err}"))
        })?;
        Ok(Self::from_json_value(value))
    }

    /// Reads options from a JSON value, warning through the tracker logger about every part
    /// that cannot be used.
    pub fn from_json_value(value: Value) -> Self {
        Self::from_json_value_with_logger(value, &LOGGER)
    }

    /// Same as [`from_json_value`](Self::from_json_value) with warnings sent to `logger`.
    ///
    /// * `null` or a non-object yields the defaults.
    /// * A non-string `trackingMethod` becomes [`TrackingMethod::Unsupported`].
    /// * `events` entries with a non-numeric key or a non-object value are skipped.
    /// * A missing `eventName` is read as an empty name, a missing or `null` `data` as no data.
    /// * An unknown `eventsMerge` keeps [`EventsMerge::Replace`].
    pub fn from_json_value_with_logger(value: Value, logger: &Logger) -> Self {
        let mut fields = match value {
            Value::Object(fields) => fields,
            Value::Null => return Self::default(),
            other => {
                logger.warn(format!(
                    "tracker options should be an object, got {other}; using defaults"
                ));
                return Self::default();
            }
        };

        let tracking_method = match fields.remove("trackingMethod") {
            None => None,
            Some(Value::String(name)) => Some(TrackingMethod::from(name)),
            Some(other) => {
                logger.warn(format!("trackingMethod should be a string, got {other}"));
                Some(TrackingMethod::Unsupported(other.to_string()))
            }
        };

        let events = fields
            .remove("events")
            .map(|events| parse_events(events, logger));

        let events_merge = match fields.remove("eventsMerge") {
            None | Some(Value::Null) => EventsMerge::default(),
            Some(raw) => serde_json::from_value(raw.clone()).unwrap_or_else(|_| {
                logger.warn(format!(
                    "eventsMerge should be \"replace\" or \"byStatus\", got {raw}"
                ));
                EventsMerge::default()
            }),
        };

        Self {
            tracking_method,
            events,
            events_merge,
        }
    }
}

fn parse_events(value: Value, logger: &Logger) -> BTreeMap<u16, EventSpec> {
    let entries = match value {
        Value::Object(entries) => entries,
        other => {
            logger.warn(format!(
                "events should be an object keyed by status code, got {other}"
            ));
            return BTreeMap::new();
        }
    };

    entries
        .into_iter()
        .filter_map(|(key, entry)| {
            let Ok(status) = key.trim().parse::<u16>() else {
                logger.warn(format!("ignoring event for non-numeric status \"{key}\""));
                return None;
            };
            parse_event(status, entry, logger).map(|event| (status, event))
        })
        .collect()
}

fn parse_event(status: u16, entry: Value, logger: &Logger) -> Option<EventSpec> {
    let mut fields: Map<String, Value> = match entry {
        Value::Object(fields) => fields,
        other => {
            logger.warn(format!(
                "ignoring event for status {status}: expected an object, got {other}"
            ));
            return None;
        }
    };

    let event_name = match fields.remove("eventName") {
        Some(Value::String(name)) => name,
        None | Some(Value::Null) => {
            logger.warn(format!("event for status {status} has no eventName"));
            String::new()
        }
        Some(other) => {
            logger.warn(format!(
                "eventName for status {status} should be a string, got {other}"
            ));
            other.to_string()
        }
    };

    let data = match fields.remove("data") {
        None | Some(Value::Null) => EventData::new(),
        Some(Value::Object(data)) => data.into_iter().collect(),
        Some(other) => {
            logger.warn(format!(
                "data for status {status} should be an object, got {other}; ignoring it"
            ));
            EventData::new()
        }
    };

    Some(EventSpec { event_name, data })
}

/// Effective configuration of a tracker. Read-only once the tracker is built.
#[derive(Clone, Debug, PartialEq)]
pub struct TrackerConfig {
    tracking_method: TrackingMethod,
    events: BTreeMap<u16, EventSpec>,
}

impl TrackerConfig {
    /// Default configuration: dataLayer dispatch and the built-in status mapping.
    pub fn defaults(page_path: &str) -> Self {
        Self {
            tracking_method: TrackingMethod::default(),
            events: default_events(page_path),
        }
    }

    /// Overlays `options` on top of the defaults.
    pub fn resolve(options: TrackerOptions, page_path: &str) -> Self {
        let mut config = Self::defaults(page_path);
        if let Some(method) = options.tracking_method {
            config.tracking_method = method;
        }
        if let Some(events) = options.events {
            match options.events_merge {
                EventsMerge::Replace => config.events = events,
                EventsMerge::ByStatus => config.events.extend(events),
            }
        }
        config
    }

    pub fn tracking_method(&self) -> &TrackingMethod {
        &self.tracking_method
    }

    pub fn events(&self) -> &BTreeMap<u16, EventSpec> {
        &self.events
    }

    pub fn event_for(&self, status: u16) -> Option<&EventSpec> {
        self.events.get(&status)
    }
}

fn default_events(page_path: &str) -> BTreeMap<u16, EventSpec> {
    DEFAULT_EVENTS
        .iter()
        .map(|(status, name, message)| {
            let event = match message {
                Some(message) => EventSpec::new(*name).with_param("message", *message),
                None => EventSpec::new(*name).with_param("invalid_path", page_path),
            };
            (*status, event)
        })
        .collect()
}
