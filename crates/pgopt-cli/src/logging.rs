//! Logging setup for the `pgopt` binary
//!
//! Logs always go to stderr so stdout carries nothing but the report. An
//! optional JSON log file can be added for bug reports. `RUST_LOG` takes
//! precedence over the filter derived from `-v`.

use clap::ValueEnum;
use std::path::PathBuf;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{
    EnvFilter, Layer,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

/// Console log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum LogFormat {
    /// Multi-line human-readable output
    Pretty,
    /// One line per event
    #[default]
    Compact,
    /// Newline-delimited JSON
    Json,
}

/// Logging configuration
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    /// Console output format
    pub format: LogFormat,

    /// Additional JSON log file, appended to daily
    pub log_file: Option<PathBuf>,

    /// Whether to include file/line information in logs
    pub include_location: bool,

    /// Whether to log span open/close (for timing connector calls)
    pub enable_spans: bool,

    /// Filter used when RUST_LOG is unset
    pub default_filter: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self::from_verbosity(0)
    }
}

impl LoggingConfig {
    /// Configuration for a `-v` count
    pub fn from_verbosity(verbosity: u8) -> Self {
        Self {
            format: LogFormat::default(),
            log_file: None,
            include_location: verbosity >= 3,
            enable_spans: verbosity >= 2,
            default_filter: verbosity_filter(verbosity).to_string(),
        }
    }
}

fn verbosity_filter(verbosity: u8) -> &'static str {
    match verbosity {
        0 => "warn",
        1 => "warn,pgopt_cli=info,pgopt_core=info,pgopt_driver_postgres=info",
        2 => "info,pgopt_cli=debug,pgopt_core=debug,pgopt_driver_postgres=debug",
        _ => "debug,pgopt_cli=trace,pgopt_core=trace,pgopt_driver_postgres=trace",
    }
}

/// Initialize the logging system with the given configuration.
///
/// The returned guard flushes the log file; keep it alive until exit.
pub fn init(config: LoggingConfig) -> anyhow::Result<Option<WorkerGuard>> {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.default_filter));

    // NEW fires once per span; ENTER would repeat on every poll of an awaited future
    let span_events = if config.enable_spans {
        FmtSpan::NEW | FmtSpan::CLOSE
    } else {
        FmtSpan::NONE
    };

    let mut layers = Vec::new();

    let console_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_file(config.include_location)
        .with_line_number(config.include_location)
        .with_span_events(span_events.clone());

    let console_layer = match config.format {
        LogFormat::Pretty => console_layer
            .pretty()
            .with_filter(env_filter.clone())
            .boxed(),
        LogFormat::Compact => console_layer
            .compact()
            .with_filter(env_filter.clone())
            .boxed(),
        LogFormat::Json => console_layer
            .with_ansi(false)
            .json()
            .with_current_span(true)
            .with_filter(env_filter.clone())
            .boxed(),
    };
    layers.push(console_layer);

    let guard = match &config.log_file {
        Some(path) => {
            let directory = path
                .parent()
                .filter(|p| !p.as_os_str().is_empty())
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("."));
            let file_name = path
                .file_name()
                .ok_or_else(|| anyhow::anyhow!("Log file path has no file name: {}", path.display()))?;
            std::fs::create_dir_all(&directory)?;

            let file_appender = tracing_appender::rolling::daily(&directory, file_name);
            let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

            let json_layer = fmt::layer()
                .with_target(true)
                .with_thread_ids(true)
                .with_file(true)
                .with_line_number(true)
                .with_span_events(span_events)
                .with_ansi(false)
                .json()
                .with_current_span(true)
                .with_span_list(true)
                .with_writer(non_blocking)
                .with_filter(env_filter)
                .boxed();
            layers.push(json_layer);

            Some(guard)
        }
        None => None,
    };

    tracing_subscriber::registry().with(layers).try_init()?;

    tracing::debug!(
        format = ?config.format,
        log_file = ?config.log_file,
        "Logging system initialized"
    );

    Ok(guard)
}
