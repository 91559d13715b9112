//! Probes a URL and prints the event that would be pushed to a data layer.
//!
//! Usage: `cargo run --example track_status -- https://httpbin.org/status/404`

use erralytics::logger::{set_log_level, LogLevel};
use erralytics::platform::environment::PageLocation;
use erralytics::tracker::{InMemoryDataLayer, StatusEventTracker, TrackOutcome, TrackerOptions};

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    set_log_level(LogLevel::Debug)?;

    let url = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "https://httpbin.org/status/404".to_string());
    let page = PageLocation::from_href(&url).ok_or("expected an absolute URL")?;

    let data_layer = InMemoryDataLayer::new();
    let tracker = StatusEventTracker::builder()
        .options(TrackerOptions::default())
        .data_layer(data_layer.clone())
        .page_location(page)
        .build()?;

    match tracker.track(None).await {
        TrackOutcome::Dispatched { response, event_name } => {
            println!("{} answered {}, tracked as `{event_name}`", response.url, response.status);
        }
        TrackOutcome::Skipped { response, reason } => {
            println!("{} answered {}, skipped: {reason:?}", response.url, response.status);
        }
        TrackOutcome::Failed(err) => println!("probe failed: {err}"),
    }

    for record in data_layer.records() {
        println!("dataLayer <- {}", serde_json::Value::Object(record));
    }

    Ok(())
}
