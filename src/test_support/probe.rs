use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;

use crate::tracker::error::{TrackerError, TrackerResult};
use crate::tracker::{Probe, ProbeResponse};

/// Probe that answers every request with a fixed status or error and remembers the URLs.
pub struct ScriptedProbe {
    result: Result<u16, TrackerError>,
    delay: Duration,
    requested: Arc<Mutex<Vec<String>>>,
}

impl ScriptedProbe {
    pub fn status(status: u16) -> Self {
        Self::with_result(Ok(status))
    }

    pub fn failing(error: TrackerError) -> Self {
        Self::with_result(Err(error))
    }

    fn with_result(result: Result<u16, TrackerError>) -> Self {
        Self {
            result,
            delay: Duration::ZERO,
            requested: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn requested(&self) -> Arc<Mutex<Vec<String>>> {
        Arc::clone(&self.requested)
    }
}

#[async_trait]
impl Probe for ScriptedProbe {
    async fn head(&self, url: &str) -> TrackerResult<ProbeResponse> {
        self.requested.lock().unwrap().push(url.to_string());
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        self.result
            .clone()
            .map(|status| ProbeResponse::new(url, status))
    }
}
