//! Minimal logger.
//!
//! Prints `[LEVEL +elapsed target] message` to stderr. The elapsed-time
//! prefix makes frame-rate hiccups visible when reading tracker logs.

use std::io::Write;
use std::sync::OnceLock;
use std::time::Instant;

use log::{LevelFilter, Log, Metadata, Record};

struct TrackerLogger {
    level: LevelFilter,
    started: Instant,
}

impl Log for TrackerLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }

        let elapsed = self.started.elapsed().as_secs_f64();
        let _ = writeln!(
            std::io::stderr(),
            "[{:5} +{:.3}s {}] {}",
            record.level(),
            elapsed,
            record.target(),
            record.args()
        );
    }

    fn flush(&self) {}
}

static LOGGER: OnceLock<TrackerLogger> = OnceLock::new();

/// Install the logger with the provided level filter.
///
/// Calling this more than once is a no-op after the first successful
/// initialization. The `HEAD_TRACK_LOG` environment variable overrides
/// `level` when it parses as a level filter (`error` .. `trace`).
pub fn init_with_level(level: LevelFilter) -> Result<(), log::SetLoggerError> {
    let level = std::env::var("HEAD_TRACK_LOG")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(level);

    if LOGGER.get().is_none() {
        let logger = LOGGER.get_or_init(|| TrackerLogger {
            level,
            started: Instant::now(),
        });
        log::set_logger(logger)?;
        log::set_max_level(level);
    }
    Ok(())
}
