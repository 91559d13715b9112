use std::fmt;
use std::sync::{Arc, LazyLock};

use crate::logger::{log_arg, Logger};
use crate::platform::environment::{current_page_location, PageLocation};
use crate::platform::runtime::spawn_detached;
use crate::tracker::config::{EventSpec, TrackerConfig, TrackerOptions, TrackingMethod};
use crate::tracker::constants::{FALLBACK_PAGE_PATH, GTAG_EVENT_COMMAND, TRACKER_LOGGER_NAME};
use crate::tracker::error::{
    invalid_argument, sink_unavailable, TrackerError, TrackerErrorCode, TrackerResult,
};
use crate::tracker::probe::{HttpProbe, Probe, ProbeResponse};
use crate::tracker::sink::{data_layer_record, DataLayerSink, GtagSink};

pub static LOGGER: LazyLock<Logger> = LazyLock::new(|| Logger::new(TRACKER_LOGGER_NAME));

/// Why a probe that got an answer did not produce an event.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SkipReason {
    /// The status code has no entry in the event mapping.
    UnmappedStatus,
    /// The configured sink is not present.
    SinkUnavailable(TrackingMethod),
    /// The configured tracking method is neither `gtag` nor `dataLayer`.
    UnsupportedMethod(String),
}

/// Result of a [`StatusEventTracker::track`] call.
///
/// `track` never fails; probe errors and sinks that fail while taking an event are reported
/// here instead.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TrackOutcome {
    Dispatched {
        response: ProbeResponse,
        event_name: String,
    },
    Skipped {
        response: ProbeResponse,
        reason: SkipReason,
    },
    Failed(TrackerError),
}

impl TrackOutcome {
    /// The probe response, absent when tracking failed.
    pub fn response(&self) -> Option<&ProbeResponse> {
        match self {
            TrackOutcome::Dispatched { response, .. } | TrackOutcome::Skipped { response, .. } => {
                Some(response)
            }
            TrackOutcome::Failed(_) => None,
        }
    }

    pub fn status(&self) -> Option<u16> {
        self.response().map(|response| response.status)
    }

    pub fn is_dispatched(&self) -> bool {
        matches!(self, TrackOutcome::Dispatched { .. })
    }

    pub fn error(&self) -> Option<&TrackerError> {
        match self {
            TrackOutcome::Failed(err) => Some(err),
            _ => None,
        }
    }
}

/// Probes URLs and reports their HTTP error statuses as analytics events.
///
/// ```
/// use erralytics::tracker::{InMemoryDataLayer, ProbeResponse, StatusEventTracker, TrackerOptions};
///
/// let data_layer = InMemoryDataLayer::new();
/// let tracker = StatusEventTracker::builder()
///     .options(TrackerOptions::default())
///     .data_layer(data_layer.clone())
///     .build()
///     .unwrap();
///
/// let outcome = tracker.dispatch_response(ProbeResponse::new("https://shop.example/", 503));
/// assert!(outcome.is_dispatched());
/// assert_eq!(data_layer.records()[0]["event"], "service_unavailable");
/// ```
#[derive(Clone)]
pub struct StatusEventTracker {
    inner: Arc<TrackerInner>,
}

struct TrackerInner {
    config: TrackerConfig,
    probe: Arc<dyn Probe>,
    gtag: Option<Arc<dyn GtagSink>>,
    data_layer: Option<Arc<dyn DataLayerSink>>,
    page: Option<PageLocation>,
    logger: Logger,
}

impl fmt::Debug for StatusEventTracker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StatusEventTracker")
            .field("config", &self.inner.config)
            .field("gtag", &self.inner.gtag.is_some())
            .field("data_layer", &self.inner.data_layer.is_some())
            .field("page", &self.inner.page)
            .finish()
    }
}

impl StatusEventTracker {
    /// Builds a tracker from `options` with the platform's default probe, sinks and page.
    pub fn new(options: TrackerOptions) -> TrackerResult<Self> {
        Self::builder().options(options).build()
    }

    pub fn builder() -> StatusEventTrackerBuilder {
        StatusEventTrackerBuilder::default()
    }

    pub fn config(&self) -> &TrackerConfig {
        &self.inner.config
    }

    pub fn page_location(&self) -> Option<&PageLocation> {
        self.inner.page.as_ref()
    }

    pub fn logger(&self) -> &Logger {
        &self.inner.logger
    }

    /// Sends a HEAD request to `url` (the current page when `None`) and reports the status.
    /// Relative URLs are resolved against the page location, as `fetch` does in a browser.
    ///
    /// Failures are logged and returned as [`TrackOutcome::Failed`]; this never panics or
    /// returns an error to the caller.
    pub async fn track(&self, url: Option<&str>) -> TrackOutcome {
        let page = self.inner.page.as_ref();
        let url = match (url, page) {
            (Some(url), Some(page)) => page.resolve(url).unwrap_or_else(|| url.to_string()),
            (Some(url), None) => url.to_string(),
            (None, Some(page)) => page.href().to_string(),
            (None, None) => {
                return self.fail(invalid_argument(
                    "no URL was given and the current page location is unknown",
                ))
            }
        };

        match self.inner.probe.head(&url).await {
            Ok(response) => self.dispatch_response(response),
            Err(err) => self.fail(err),
        }
    }

    /// Starts [`track`](Self::track) without waiting for it.
    pub fn track_in_background(&self, url: Option<String>) {
        let tracker = self.clone();
        spawn_detached(async move {
            tracker.track(url.as_deref()).await;
        });
    }

    /// Maps an already obtained response to its event and hands it to the configured sink.
    pub fn dispatch_response(&self, response: ProbeResponse) -> TrackOutcome {
        let Some(event) = self.inner.config.event_for(response.status) else {
            return TrackOutcome::Skipped {
                response,
                reason: SkipReason::UnmappedStatus,
            };
        };

        let method = self.inner.config.tracking_method();
        let delivered = match method {
            TrackingMethod::Gtag => self.call_gtag(event),
            TrackingMethod::DataLayer => self.push_data_layer(event),
            TrackingMethod::Unsupported(name) => {
                self.inner
                    .logger
                    .warn(format!("tracking method \"{name}\" is not supported"));
                return TrackOutcome::Skipped {
                    response,
                    reason: SkipReason::UnsupportedMethod(name.clone()),
                };
            }
        };

        match delivered {
            Ok(()) => {
                log::debug!(
                    "status {} of {} tracked as `{}` via {method}",
                    response.status,
                    response.url,
                    event.event_name
                );
                TrackOutcome::Dispatched {
                    event_name: event.event_name.clone(),
                    response,
                }
            }
            Err(err) if err.code == TrackerErrorCode::SinkUnavailable => {
                self.inner.logger.warn(err.message().to_string());
                TrackOutcome::Skipped {
                    response,
                    reason: SkipReason::SinkUnavailable(method.clone()),
                }
            }
            Err(err) => self.fail(err),
        }
    }

    fn call_gtag(&self, event: &EventSpec) -> TrackerResult<()> {
        self.inner
            .gtag
            .as_ref()
            .ok_or_else(|| sink_unavailable("gtag is not defined"))?
            .call(GTAG_EVENT_COMMAND, &event.event_name, &event.data)
    }

    fn push_data_layer(&self, event: &EventSpec) -> TrackerResult<()> {
        self.inner
            .data_layer
            .as_ref()
            .ok_or_else(|| sink_unavailable("dataLayer is not defined"))?
            .push(data_layer_record(&event.event_name, &event.data))
    }

    fn fail(&self, err: TrackerError) -> TrackOutcome {
        self.inner
            .logger
            .error_with([log_arg("failed to track URL:"), log_arg(err.to_string())]);
        TrackOutcome::Failed(err)
    }
}

/// Assembles a [`StatusEventTracker`]. Collaborators that are not set use platform defaults:
/// [`HttpProbe`], the browser's `gtag` / `dataLayer` globals (`wasm-web` only), the current
/// page location and the crate [`LOGGER`].
#[derive(Default)]
pub struct StatusEventTrackerBuilder {
    options: TrackerOptions,
    probe: Option<Arc<dyn Probe>>,
    gtag: Option<Arc<dyn GtagSink>>,
    data_layer: Option<Arc<dyn DataLayerSink>>,
    page: Option<PageLocation>,
    logger: Option<Logger>,
}

impl StatusEventTrackerBuilder {
    pub fn options(mut self, options: TrackerOptions) -> Self {
        self.options = options;
        self
    }

    pub fn probe(mut self, probe: impl Probe + 'static) -> Self {
        self.probe = Some(Arc::new(probe));
        self
    }

    pub fn gtag(mut self, sink: impl GtagSink + 'static) -> Self {
        self.gtag = Some(Arc::new(sink));
        self
    }

    pub fn data_layer(mut self, sink: impl DataLayerSink + 'static) -> Self {
        self.data_layer = Some(Arc::new(sink));
        self
    }

    pub fn page_location(mut self, page: PageLocation) -> Self {
        self.page = Some(page);
        self
    }

    pub fn logger(mut self, logger: Logger) -> Self {
        self.logger = Some(logger);
        self
    }

    pub fn build(self) -> TrackerResult<StatusEventTracker> {
        let page = self.page.or_else(current_page_location);
        let page_path = page
            .as_ref()
            .map(|page| page.pathname().to_string())
            .unwrap_or_else(|| FALLBACK_PAGE_PATH.to_string());
        let config = TrackerConfig::resolve(self.options, &page_path);

        let probe: Arc<dyn Probe> = match self.probe {
            Some(probe) => probe,
            None => Arc::new(HttpProbe::new()?),
        };

        let inner = TrackerInner {
            config,
            probe,
            gtag: self.gtag.or_else(default_gtag),
            data_layer: self.data_layer.or_else(default_data_layer),
            page,
            logger: self.logger.unwrap_or_else(|| LOGGER.clone()),
        };
        Ok(StatusEventTracker {
            inner: Arc::new(inner),
        })
    }
}

#[cfg(all(feature = "wasm-web", target_arch = "wasm32"))]
fn default_gtag() -> Option<Arc<dyn GtagSink>> {
    Some(Arc::new(crate::tracker::sink::WindowGtag))
}

#[cfg(not(all(feature = "wasm-web", target_arch = "wasm32")))]
fn default_gtag() -> Option<Arc<dyn GtagSink>> {
    None
}

#[cfg(all(feature = "wasm-web", target_arch = "wasm32"))]
fn default_data_layer() -> Option<Arc<dyn DataLayerSink>> {
    Some(Arc::new(crate::tracker::sink::WindowDataLayer))
}

#[cfg(not(all(feature = "wasm-web", target_arch = "wasm32")))]
fn default_data_layer() -> Option<Arc<dyn DataLayerSink>> {
    None
}

#[cfg(all(test, not(target_arch = "wasm32")))]
mod tests {
    use super::*;
    use crate::logger::LogLevel;
    use crate::test_support::{capture_logger, ScriptedProbe};
    use crate::tracker::config::EventData;
    use crate::tracker::error::{internal_error, network_error};
    use crate::tracker::sink::{GtagCall, InMemoryDataLayer, RecordingGtag};
    use serde_json::{json, Value};
    use std::time::Duration;

    const DEFAULT_STATUSES: [(u16, &str); 10] = [
        (400, "bad_request"),
        (401, "unauthorized"),
        (403, "forbidden"),
        (404, "page_not_found"),
        (408, "request_timeout"),
        (429, "too_many_requests"),
        (500, "server_error"),
        (502, "bad_gateway"),
        (503, "service_unavailable"),
        (504, "gateway_timeout"),
    ];

    fn shop_page() -> PageLocation {
        PageLocation::from_href("https://shop.example/produtos/antigo").unwrap()
    }

    #[tokio::test(flavor = "current_thread")]
    async fn default_statuses_reach_the_data_layer_once() {
        for (status, event_name) in DEFAULT_STATUSES {
            let data_layer = InMemoryDataLayer::new();
            let tracker = StatusEventTracker::builder()
                .probe(ScriptedProbe::status(status))
                .data_layer(data_layer.clone())
                .page_location(shop_page())
                .build()
                .unwrap();

            let outcome = tracker.track(Some("https://shop.example/api")).await;

            assert!(outcome.is_dispatched(), "status {status}: {outcome:?}");
            let records = data_layer.records();
            assert_eq!(records.len(), 1, "status {status}");
            assert_eq!(records[0]["event"], event_name);
        }
    }

    #[tokio::test(flavor = "current_thread")]
    async fn default_statuses_reach_gtag_once() {
        for (status, event_name) in DEFAULT_STATUSES {
            let gtag = RecordingGtag::new();
            let tracker = StatusEventTracker::builder()
                .options(TrackerOptions::new().with_tracking_method("gtag"))
                .probe(ScriptedProbe::status(status))
                .gtag(gtag.clone())
                .page_location(shop_page())
                .build()
                .unwrap();

            tracker.track(Some("https://shop.example/api")).await;

            let calls = gtag.calls();
            assert_eq!(calls.len(), 1, "status {status}");
            assert_eq!(calls[0].command, "event");
            assert_eq!(calls[0].event_name, event_name);
        }
    }

    #[tokio::test(flavor = "current_thread")]
    async fn unmapped_statuses_are_skipped_silently() {
        for method in ["dataLayer", "gtag"] {
            for status in [200u16, 301] {
                let (logger, records) = capture_logger();
                let gtag = RecordingGtag::new();
                let data_layer = InMemoryDataLayer::new();
                let tracker = StatusEventTracker::builder()
                    .options(TrackerOptions::new().with_tracking_method(method))
                    .probe(ScriptedProbe::status(status))
                    .gtag(gtag.clone())
                    .data_layer(data_layer.clone())
                    .logger(logger)
                    .build()
                    .unwrap();

                let outcome = tracker.track(Some("https://shop.example/")).await;

                assert_eq!(
                    outcome,
                    TrackOutcome::Skipped {
                        response: ProbeResponse::new("https://shop.example/", status),
                        reason: SkipReason::UnmappedStatus,
                    }
                );
                assert!(gtag.calls().is_empty());
                assert!(data_layer.is_empty());
                assert!(records.lock().unwrap().is_empty());
            }
        }
    }

    #[tokio::test(flavor = "current_thread")]
    async fn unmapped_status_without_sinks_is_skipped() {
        let (logger, records) = capture_logger();
        let tracker = StatusEventTracker::builder()
            .options(TrackerOptions::new().with_tracking_method("gtag"))
            .probe(ScriptedProbe::status(200))
            .logger(logger)
            .build()
            .unwrap();

        let outcome = tracker.track(Some("https://shop.example/")).await;

        assert_eq!(outcome.status(), Some(200));
        assert!(!outcome.is_dispatched());
        assert!(records.lock().unwrap().is_empty());
    }

    #[tokio::test(flavor = "current_thread")]
    async fn missing_gtag_warns_once() {
        let (logger, records) = capture_logger();
        let tracker = StatusEventTracker::builder()
            .options(TrackerOptions::new().with_tracking_method("gtag"))
            .probe(ScriptedProbe::status(500))
            .data_layer(InMemoryDataLayer::new())
            .logger(logger)
            .build()
            .unwrap();

        let outcome = tracker.track(Some("https://shop.example/")).await;

        assert_eq!(
            outcome,
            TrackOutcome::Skipped {
                response: ProbeResponse::new("https://shop.example/", 500),
                reason: SkipReason::SinkUnavailable(TrackingMethod::Gtag),
            }
        );
        let records = records.lock().unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].0, LogLevel::Warn);
        assert_eq!(records[0].1, "gtag is not defined");
    }

    #[tokio::test(flavor = "current_thread")]
    async fn missing_data_layer_warns_once() {
        let (logger, records) = capture_logger();
        let gtag = RecordingGtag::new();
        let tracker = StatusEventTracker::builder()
            .probe(ScriptedProbe::status(404))
            .gtag(gtag.clone())
            .logger(logger)
            .build()
            .unwrap();

        let outcome = tracker.track(Some("https://shop.example/")).await;

        assert!(matches!(
            outcome,
            TrackOutcome::Skipped {
                reason: SkipReason::SinkUnavailable(TrackingMethod::DataLayer),
                ..
            }
        ));
        assert!(gtag.calls().is_empty());
        let records = records.lock().unwrap();
        assert_eq!(
            records.as_slice(),
            &[(LogLevel::Warn, "dataLayer is not defined".to_string())]
        );
    }

    #[tokio::test(flavor = "current_thread")]
    async fn unsupported_method_warns_and_skips() {
        let (logger, records) = capture_logger();
        let gtag = RecordingGtag::new();
        let data_layer = InMemoryDataLayer::new();
        let tracker = StatusEventTracker::builder()
            .options(TrackerOptions::new().with_tracking_method("segment"))
            .probe(ScriptedProbe::status(503))
            .gtag(gtag.clone())
            .data_layer(data_layer.clone())
            .logger(logger)
            .build()
            .unwrap();

        let outcome = tracker.track(Some("https://shop.example/")).await;

        assert!(matches!(
            outcome,
            TrackOutcome::Skipped {
                reason: SkipReason::UnsupportedMethod(ref name),
                ..
            } if name == "segment"
        ));
        assert!(gtag.calls().is_empty());
        assert!(data_layer.is_empty());
        let records = records.lock().unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].0, LogLevel::Warn);
        assert!(records[0].1.contains("\"segment\""));
    }

    struct ThrowingGtag;

    impl GtagSink for ThrowingGtag {
        fn call(
            &self,
            _command: &str,
            _event_name: &str,
            _params: &EventData,
        ) -> TrackerResult<()> {
            Err(internal_error("gtag call failed: TypeError: l is not iterable"))
        }
    }

    #[tokio::test(flavor = "current_thread")]
    async fn throwing_sink_is_logged_as_error_and_fails() {
        let (logger, records) = capture_logger();
        let tracker = StatusEventTracker::builder()
            .options(TrackerOptions::new().with_tracking_method("gtag"))
            .probe(ScriptedProbe::status(500))
            .gtag(ThrowingGtag)
            .logger(logger)
            .build()
            .unwrap();

        let outcome = tracker.track(Some("https://shop.example/")).await;

        assert_eq!(outcome.response(), None);
        assert_eq!(outcome.error().unwrap().code_str(), "erralytics/internal");
        let records = records.lock().unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].0, LogLevel::Error);
        assert!(records[0].1.contains("gtag call failed"));
    }

    #[tokio::test(flavor = "current_thread")]
    async fn request_failure_is_logged_and_contained() {
        let (logger, records) = capture_logger();
        let data_layer = InMemoryDataLayer::new();
        let tracker = StatusEventTracker::builder()
            .probe(ScriptedProbe::failing(network_error("connection refused")))
            .data_layer(data_layer.clone())
            .logger(logger)
            .build()
            .unwrap();

        let outcome = tracker.track(Some("https://down.example/")).await;

        assert_eq!(outcome.response(), None);
        assert_eq!(outcome.error().unwrap().code_str(), "erralytics/network");
        assert!(data_layer.is_empty());
        let records = records.lock().unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].0, LogLevel::Error);
        assert!(records[0].1.starts_with("failed to track URL: connection refused"));
    }

    #[tokio::test(flavor = "current_thread")]
    async fn not_found_record_carries_page_path() {
        let data_layer = InMemoryDataLayer::new();
        let tracker = StatusEventTracker::builder()
            .probe(ScriptedProbe::status(404))
            .data_layer(data_layer.clone())
            .page_location(shop_page())
            .build()
            .unwrap();

        tracker.track(None).await;

        let records = data_layer.records();
        assert_eq!(records.len(), 1);
        assert_eq!(
            Value::Object(records[0].clone()),
            json!({"event": "page_not_found", "invalid_path": "/produtos/antigo"})
        );
    }

    #[tokio::test(flavor = "current_thread")]
    async fn custom_gtag_event_is_forwarded_verbatim() {
        let gtag = RecordingGtag::new();
        let options = TrackerOptions::new().with_tracking_method("gtag").with_event(
            404,
            EventSpec::new("pagina_nao_encontrada").with_param("caminho_invalido", "/x"),
        );
        let tracker = StatusEventTracker::builder()
            .options(options)
            .probe(ScriptedProbe::status(404))
            .gtag(gtag.clone())
            .build()
            .unwrap();

        let outcome = tracker.track(Some("https://shop.example/x")).await;

        assert_eq!(
            outcome,
            TrackOutcome::Dispatched {
                response: ProbeResponse::new("https://shop.example/x", 404),
                event_name: "pagina_nao_encontrada".to_string(),
            }
        );
        assert_eq!(
            gtag.calls(),
            vec![GtagCall {
                command: "event".to_string(),
                event_name: "pagina_nao_encontrada".to_string(),
                params: [("caminho_invalido".to_string(), json!("/x"))].into(),
            }]
        );
        assert_eq!(tracker.config().events().len(), 1);
    }

    #[tokio::test(flavor = "current_thread")]
    async fn event_without_data_pushes_only_the_name() {
        let data_layer = InMemoryDataLayer::new();
        let tracker = StatusEventTracker::builder()
            .options(TrackerOptions::new().with_event(410, EventSpec::new("gone")))
            .probe(ScriptedProbe::status(410))
            .data_layer(data_layer.clone())
            .build()
            .unwrap();

        tracker.track(Some("https://shop.example/old")).await;

        assert_eq!(
            Value::Object(data_layer.records()[0].clone()),
            json!({"event": "gone"})
        );
    }

    #[tokio::test(flavor = "current_thread")]
    async fn defaults_to_the_current_page_url() {
        let probe = ScriptedProbe::status(200);
        let requested = probe.requested();
        let tracker = StatusEventTracker::builder()
            .probe(probe)
            .page_location(shop_page())
            .build()
            .unwrap();

        tracker.track(None).await;

        assert_eq!(
            requested.lock().unwrap().as_slice(),
            &["https://shop.example/produtos/antigo".to_string()]
        );
    }

    #[tokio::test(flavor = "current_thread")]
    async fn relative_url_resolves_against_the_page() {
        let probe = ScriptedProbe::status(404);
        let requested = probe.requested();
        let data_layer = InMemoryDataLayer::new();
        let tracker = StatusEventTracker::builder()
            .probe(probe)
            .data_layer(data_layer.clone())
            .page_location(shop_page())
            .build()
            .unwrap();

        let outcome = tracker.track(Some("/missing")).await;

        assert!(outcome.is_dispatched(), "{outcome:?}");
        assert_eq!(
            requested.lock().unwrap().as_slice(),
            &["https://shop.example/missing".to_string()]
        );
        assert_eq!(data_layer.records()[0]["event"], "page_not_found");
    }

    #[tokio::test(flavor = "current_thread")]
    async fn missing_url_and_page_fails_without_probing() {
        let (logger, records) = capture_logger();
        let probe = ScriptedProbe::status(404);
        let requested = probe.requested();
        let tracker = StatusEventTracker::builder()
            .probe(probe)
            .logger(logger)
            .build()
            .unwrap();

        let outcome = tracker.track(None).await;

        assert_eq!(
            outcome.error().unwrap().code_str(),
            "erralytics/invalid-argument"
        );
        assert!(requested.lock().unwrap().is_empty());
        assert_eq!(records.lock().unwrap().len(), 1);
        assert_eq!(
            tracker.config().event_for(404).unwrap().data["invalid_path"],
            "/"
        );
    }

    #[tokio::test(flavor = "current_thread")]
    async fn concurrent_tracks_are_independent() {
        let data_layer = InMemoryDataLayer::new();
        let not_found = StatusEventTracker::builder()
            .probe(ScriptedProbe::status(404).with_delay(Duration::from_millis(20)))
            .data_layer(data_layer.clone())
            .build()
            .unwrap();
        let unavailable = StatusEventTracker::builder()
            .probe(ScriptedProbe::status(503))
            .data_layer(data_layer.clone())
            .build()
            .unwrap();

        let (first, second) = tokio::join!(
            not_found.track(Some("https://shop.example/a")),
            unavailable.track(Some("https://shop.example/b"))
        );

        assert_eq!(first.status(), Some(404));
        assert_eq!(second.status(), Some(503));
        let events: Vec<Value> = data_layer
            .records()
            .into_iter()
            .map(|record| record["event"].clone())
            .collect();
        assert_eq!(events, [json!("service_unavailable"), json!("page_not_found")]);
    }

    #[tokio::test(flavor = "current_thread")]
    async fn background_track_eventually_dispatches() {
        let data_layer = InMemoryDataLayer::new();
        let tracker = StatusEventTracker::builder()
            .probe(ScriptedProbe::status(502))
            .data_layer(data_layer.clone())
            .build()
            .unwrap();

        tracker.track_in_background(Some("https://shop.example/".to_string()));

        for _ in 0..50 {
            if !data_layer.is_empty() {
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        assert_eq!(data_layer.records()[0]["event"], "bad_gateway");
    }

    #[test]
    fn background_track_without_a_runtime_dispatches() {
        let data_layer = InMemoryDataLayer::new();
        let tracker = StatusEventTracker::builder()
            .probe(ScriptedProbe::status(429).with_delay(Duration::from_millis(5)))
            .data_layer(data_layer.clone())
            .build()
            .unwrap();

        assert!(tokio::runtime::Handle::try_current().is_err());
        tracker.track_in_background(Some("https://shop.example/".to_string()));

        for _ in 0..200 {
            if !data_layer.is_empty() {
                break;
            }
            std::thread::sleep(Duration::from_millis(10));
        }
        assert_eq!(data_layer.records()[0]["event"], "too_many_requests");
    }
}
