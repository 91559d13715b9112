//! JavaScript binding exported as the `ErrAlytics` class.
//!
//! ```js
//! const errAlytics = new ErrAlytics({
//!   trackingMethod: "gtag",
//!   events: { 404: { eventName: "pagina_nao_encontrada", data: { caminho_invalido: location.pathname } } },
//! });
//! errAlytics.track().then((status) => console.log(status));
//! ```

use js_sys::Promise;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::future_to_promise;

use crate::tracker::api::{StatusEventTracker, LOGGER};
use crate::tracker::config::TrackerOptions;

#[wasm_bindgen]
pub struct ErrAlytics {
    tracker: StatusEventTracker,
}

#[wasm_bindgen]
impl ErrAlytics {
    /// Accepts `{ trackingMethod, events, eventsMerge }`; `undefined` keeps every default.
    /// Parts of the config that cannot be used are logged and ignored, never thrown.
    #[wasm_bindgen(constructor)]
    pub fn new(config: JsValue) -> Result<ErrAlytics, JsValue> {
        let options = if config.is_undefined() || config.is_null() {
            TrackerOptions::default()
        } else {
            match serde_wasm_bindgen::from_value::<serde_json::Value>(config) {
                Ok(value) => TrackerOptions::from_json_value(value),
                Err(err) => {
                    LOGGER.warn(format!("ErrAlytics config is unreadable, using defaults: {err}"));
                    TrackerOptions::default()
                }
            }
        };
        let tracker = StatusEventTracker::new(options)
            .map_err(|err| JsValue::from_str(&err.to_string()))?;
        Ok(ErrAlytics { tracker })
    }

    /// Probes `url` (the current page when omitted). The promise never rejects: it resolves to
    /// the response status, or to `undefined` when the probe failed.
    pub fn track(&self, url: Option<String>) -> Promise {
        let tracker = self.tracker.clone();
        future_to_promise(async move {
            let outcome = tracker.track(url.as_deref()).await;
            Ok(outcome
                .status()
                .map(|status| JsValue::from(status))
                .unwrap_or(JsValue::UNDEFINED))
        })
    }
}
