//! Logging backend that forwards `log` records to the host platform
//!
//! Android routes these into `android.util.Log` so Rust stage transitions
//! show up in logcat next to the app's own output.

use std::sync::{OnceLock, RwLock};

use log::{LevelFilter, Log, Metadata, Record};

use super::types::{FfiLogLevel, LogCallback};

static CALLBACK_LOGGER: OnceLock<CallbackLogger> = OnceLock::new();

struct CallbackLogger {
    callback: RwLock<Option<Box<dyn LogCallback>>>,
    max_level: RwLock<LevelFilter>,
}

impl CallbackLogger {
    fn new(max_level: LevelFilter) -> Self {
        Self {
            callback: RwLock::new(None),
            max_level: RwLock::new(max_level),
        }
    }

    fn set_callback(&self, callback: Box<dyn LogCallback>) {
        if let Ok(mut guard) = self.callback.write() {
            *guard = Some(callback);
        }
    }

    fn set_max_level(&self, level: LevelFilter) {
        if let Ok(mut guard) = self.max_level.write() {
            *guard = level;
        }
    }

    fn max_level(&self) -> LevelFilter {
        self.max_level.read().map(|l| *l).unwrap_or(LevelFilter::Info)
    }
}

impl Log for CallbackLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.max_level()
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }

        if let Ok(guard) = self.callback.read()
            && let Some(callback) = guard.as_ref()
        {
            callback.on_log(
                FfiLogLevel::from(record.level()),
                record.target().to_string(),
                record.args().to_string(),
            );
        }
    }

    fn flush(&self) {}
}

/// Route Rust logs to `callback`
///
/// Call once at startup. Calling again replaces the callback and level.
/// Returns `false` if another logger was installed first, in which case the
/// callback receives nothing.
#[uniffi::export]
pub fn init_logging(callback: Box<dyn LogCallback>, max_level: FfiLogLevel) -> bool {
    let level = LevelFilter::from(max_level);
    let mut fresh = false;
    let logger = CALLBACK_LOGGER.get_or_init(|| {
        fresh = true;
        CallbackLogger::new(level)
    });

    logger.set_callback(callback);
    logger.set_max_level(level);

    if fresh && log::set_logger(logger).is_err() {
        return false;
    }
    log::set_max_level(level);
    true
}

/// Change the maximum forwarded level
#[uniffi::export]
pub fn set_log_level(level: FfiLogLevel) {
    if let Some(logger) = CALLBACK_LOGGER.get() {
        let level = LevelFilter::from(level);
        logger.set_max_level(level);
        log::set_max_level(level);
    }
}
