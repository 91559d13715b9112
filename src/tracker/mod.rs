//! Probe a URL and report its HTTP error status as an analytics event.
//!
//! A [`StatusEventTracker`] sends a HEAD request, looks the status code up in its event mapping
//! and hands the matching event to a gtag-style or dataLayer-style sink. Every failure stays
//! inside [`StatusEventTracker::track`], which resolves to a [`TrackOutcome`].

mod api;
mod config;
pub(crate) mod constants;
pub mod error;
mod probe;
mod sink;
#[cfg(all(feature = "wasm-web", target_arch = "wasm32"))]
mod wasm;

pub use api::{SkipReason, StatusEventTracker, StatusEventTrackerBuilder, TrackOutcome, LOGGER};
pub use config::{EventData, EventSpec, EventsMerge, TrackerConfig, TrackerOptions, TrackingMethod};
pub use probe::{HttpProbe, Probe, ProbeResponse};
pub use sink::{
    data_layer_record, DataLayerRecord, DataLayerSink, GtagCall, GtagSink, InMemoryDataLayer,
    RecordingGtag,
};
#[cfg(all(feature = "wasm-web", target_arch = "wasm32"))]
pub use sink::{WindowDataLayer, WindowGtag};
#[cfg(all(feature = "wasm-web", target_arch = "wasm32"))]
pub use wasm::ErrAlytics;
