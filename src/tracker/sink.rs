//! Analytics sinks that receive tracked events.
//!
//! In the browser the two pipelines are the page globals `window.gtag` and `window.dataLayer`.
//! Here they are explicit capabilities handed to the tracker, so hosts decide where events go
//! and tests can observe them without a page. [`WindowGtag`] and [`WindowDataLayer`] bridge to
//! the real globals on `wasm32` builds with the `wasm-web` feature.

use std::sync::{Arc, Mutex};

use serde_json::{Map, Value};

use crate::tracker::config::EventData;
use crate::tracker::constants::DATA_LAYER_EVENT_KEY;
use crate::tracker::error::TrackerResult;

/// Record appended to a data layer.
pub type DataLayerRecord = Map<String, Value>;

/// gtag-style callable: `gtag(command, event_name, params)`.
///
/// Returning an error means the sink could not take the call (for example the global is not
/// defined on the page); the tracker downgrades it to a warning.
pub trait GtagSink: Send + Sync {
    fn call(&self, command: &str, event_name: &str, params: &EventData) -> TrackerResult<()>;
}

/// dataLayer-style appendable sequence.
pub trait DataLayerSink: Send + Sync {
    fn push(&self, record: DataLayerRecord) -> TrackerResult<()>;
}

/// Builds the record pushed to a data layer: the event name first, then every data entry.
///
/// Data entries are written last, so a data key named `event` replaces the event name.
pub fn data_layer_record(event_name: &str, data: &EventData) -> DataLayerRecord {
    let mut record = Map::new();
    record.insert(
        DATA_LAYER_EVENT_KEY.to_string(),
        Value::String(event_name.to_string()),
    );
    for (key, value) in data {
        record.insert(key.clone(), value.clone());
    }
    record
}

/// A single gtag invocation captured by [`RecordingGtag`].
#[derive(Clone, Debug, PartialEq)]
pub struct GtagCall {
    pub command: String,
    pub event_name: String,
    pub params: EventData,
}

/// In-memory gtag that records every call.
#[derive(Clone, Debug, Default)]
pub struct RecordingGtag {
    calls: Arc<Mutex<Vec<GtagCall>>>,
}

impl RecordingGtag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> Vec<GtagCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn clear(&self) {
        self.calls.lock().unwrap().clear();
    }
}

impl GtagSink for RecordingGtag {
    fn call(&self, command: &str, event_name: &str, params: &EventData) -> TrackerResult<()> {
        self.calls.lock().unwrap().push(GtagCall {
            command: command.to_string(),
            event_name: event_name.to_string(),
            params: params.clone(),
        });
        Ok(())
    }
}

/// In-memory data layer. Clones share the same underlying sequence.
#[derive(Clone, Debug, Default)]
pub struct InMemoryDataLayer {
    records: Arc<Mutex<Vec<DataLayerRecord>>>,
}

impl InMemoryDataLayer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn records(&self) -> Vec<DataLayerRecord> {
        self.records.lock().unwrap().clone()
    }

    pub fn len(&self) -> usize {
        self.records.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl DataLayerSink for InMemoryDataLayer {
    fn push(&self, record: DataLayerRecord) -> TrackerResult<()> {
        self.records.lock().unwrap().push(record);
        Ok(())
    }
}

#[cfg(all(feature = "wasm-web", target_arch = "wasm32"))]
pub use window::{WindowDataLayer, WindowGtag};

#[cfg(all(feature = "wasm-web", target_arch = "wasm32"))]
mod window {
    use js_sys::{Function, Reflect};
    use serde::Serialize;
    use wasm_bindgen::{JsCast, JsValue};

    use super::{DataLayerRecord, DataLayerSink, GtagSink};
    use crate::tracker::config::EventData;
    use crate::tracker::error::{internal_error, sink_unavailable, TrackerResult};

    fn window_property(name: &str) -> TrackerResult<JsValue> {
        let window = web_sys::window().ok_or_else(|| sink_unavailable("window is not available"))?;
        let value = Reflect::get(&JsValue::from(window), &JsValue::from_str(name))
            .map_err(|_| sink_unavailable(format!("{name} is not defined")))?;
        if value.is_undefined() || value.is_null() {
            return Err(sink_unavailable(format!("{name} is not defined")));
        }
        Ok(value)
    }

    fn to_js<T: Serialize>(value: &T) -> TrackerResult<JsValue> {
        value
            .serialize(&serde_wasm_bindgen::Serializer::json_compatible())
            .map_err(|err| internal_error(format!("failed to convert event payload: {err}")))
    }

    fn describe(err: JsValue) -> String {
        err.as_string().unwrap_or_else(|| format!("{err:?}"))
    }

    /// Forwards calls to `window.gtag`, looked up at every call.
    #[derive(Clone, Copy, Debug, Default)]
    pub struct WindowGtag;

    impl GtagSink for WindowGtag {
        fn call(&self, command: &str, event_name: &str, params: &EventData) -> TrackerResult<()> {
            let gtag = window_property("gtag")?
                .dyn_into::<Function>()
                .map_err(|_| sink_unavailable("gtag is not a function"))?;
            let params = to_js(params)?;
            gtag.call3(
                &JsValue::NULL,
                &JsValue::from_str(command),
                &JsValue::from_str(event_name),
                &params,
            )
            .map(|_| ())
            .map_err(|err| internal_error(format!("gtag call failed: {}", describe(err))))
        }
    }

    /// Appends to `window.dataLayer` through its own `push`, so tag managers that wrap the
    /// array still observe the record.
    #[derive(Clone, Copy, Debug, Default)]
    pub struct WindowDataLayer;

    impl DataLayerSink for WindowDataLayer {
        fn push(&self, record: DataLayerRecord) -> TrackerResult<()> {
            let data_layer = window_property("dataLayer")?;
            let push = Reflect::get(&data_layer, &JsValue::from_str("push"))
                .ok()
                .and_then(|value| value.dyn_into::<Function>().ok())
                .ok_or_else(|| sink_unavailable("dataLayer has no push method"))?;
            let record = to_js(&record)?;
            push.call1(&data_layer, &record)
                .map(|_| ())
                .map_err(|err| internal_error(format!("dataLayer push failed: {}", describe(err))))
        }
    }
}
