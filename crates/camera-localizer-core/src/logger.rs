//! Logging setup shared by the plugin and its inspector.
//!
//! Compositing hosts rarely route plugin output anywhere useful, so records
//! go to stderr as `[elapsed LEVEL target] message`. With the `tracing`
//! feature the same `log` records are forwarded into a `tracing-subscriber`
//! formatter, so spans from instrumented calls show up alongside them.

use std::io::Write;
use std::sync::OnceLock;
use std::time::Instant;

use log::{LevelFilter, Log, Metadata, Record};

struct StderrLogger {
    level: LevelFilter,
    started: Instant,
}

impl Log for StderrLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let mut stderr = std::io::stderr().lock();
        let _ = writeln!(
            stderr,
            "[{:7.3}s {:>5} {}] {}",
            self.started.elapsed().as_secs_f64(),
            record.level(),
            record.target(),
            record.args()
        );
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

static LOGGER: OnceLock<StderrLogger> = OnceLock::new();

/// Install the stderr logger. Later calls keep the first level.
pub fn init_with_level(level: LevelFilter) -> Result<(), log::SetLoggerError> {
    if LOGGER.get().is_none() {
        let logger = LOGGER.get_or_init(|| StderrLogger {
            level,
            started: Instant::now(),
        });
        log::set_logger(logger)?;
        log::set_max_level(level);
    }
    Ok(())
}

/// Map a `-v` repetition count onto a level filter.
pub fn level_from_verbosity(verbosity: u8) -> LevelFilter {
    match verbosity {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    }
}

/// Install logging for a `-v` count and return the level in effect.
///
/// Without the `tracing` feature this is the stderr logger. With it, `log`
/// records are bridged into a `tracing` formatter whose filter defaults to
/// the same level; `RUST_LOG` overrides it.
pub fn init_from_verbosity(verbosity: u8) -> LevelFilter {
    let level = level_from_verbosity(verbosity);
    #[cfg(feature = "tracing")]
    init_tracing(level);
    #[cfg(not(feature = "tracing"))]
    if let Err(err) = init_with_level(level) {
        eprintln!("logger already installed: {err}");
    }
    level
}

/// Forward `log` records into a stderr `tracing` subscriber.
#[cfg(feature = "tracing")]
pub fn init_tracing(level: LevelFilter) {
    use tracing_subscriber::fmt::format::FmtSpan;
    use tracing_subscriber::EnvFilter;

    let _ = tracing_log::LogTracer::init();
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level.as_str().to_lowercase()));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_span_events(FmtSpan::CLOSE)
        .with_writer(std::io::stderr)
        .try_init();
}
