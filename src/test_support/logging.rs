use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use crate::logger::{build_message, LogLevel, Logger};

pub type CapturedLogs = Arc<Mutex<Vec<(LogLevel, String)>>>;

/// Build a uniquely named logger whose handler records every message, whatever its level.
pub fn capture_logger() -> (Logger, CapturedLogs) {
    static COUNTER: AtomicUsize = AtomicUsize::new(0);
    let logger = Logger::new(format!(
        "@erralytics/test-{}",
        COUNTER.fetch_add(1, Ordering::SeqCst)
    ));
    let records: CapturedLogs = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&records);
    logger.set_log_handler(move |_, level, args| {
        sink.lock().unwrap().push((level, build_message(args)));
    });
    (logger, records)
}
