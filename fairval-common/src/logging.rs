//! Logging setup for fairval.
//!
//! Logs always go to stderr: stdout carries the JSON valuation report and
//! must stay machine-readable.

use std::io::IsTerminal;

use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::prelude::*;
use tracing_subscriber::EnvFilter;

use crate::config::ObservabilityConfig;

/// Output format for log lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    /// One JSON object per event, with the enclosing span (request id)
    Json,
    /// Human-readable, colored when stderr is a terminal
    Pretty,
}

impl LogFormat {
    /// Parse a configured format name. Unknown names fall back to pretty;
    /// config validation rejects them before this point.
    pub fn from_name(name: &str) -> Self {
        if name.eq_ignore_ascii_case("json") {
            Self::Json
        } else {
            Self::Pretty
        }
    }
}

/// Filter directives for a base level with some targets held at `warn`.
fn filter_directives(log_level: &str, excluded_targets: &[String]) -> String {
    std::iter::once(log_level.to_lowercase())
        .chain(excluded_targets.iter().map(|t| format!("{}=warn", t)))
        .collect::<Vec<_>>()
        .join(",")
}

/// `RUST_LOG` wins when set; otherwise the configured directives apply.
fn build_filter(log_level: &str, excluded_targets: &[String]) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(filter_directives(log_level, excluded_targets)))
}

/// Initialize logging from an [`ObservabilityConfig`].
pub fn init_from_config(config: &ObservabilityConfig) {
    init_logging_with_exclusions(
        &config.log_level,
        &config.log_format,
        &config.excluded_targets,
    );
}

/// Initialize logging, holding `excluded_targets` at `warn`.
///
/// Only the first call installs a subscriber; later calls are no-ops.
pub fn init_logging_with_exclusions(
    log_level: &str,
    log_format: &str,
    excluded_targets: &[String],
) {
    let format = LogFormat::from_name(log_format);
    let registry = tracing_subscriber::registry().with(build_filter(log_level, excluded_targets));

    let installed = match format {
        LogFormat::Json => registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(std::io::stderr)
                    .with_current_span(true)
                    .with_span_events(FmtSpan::CLOSE)
                    .with_target(true),
            )
            .try_init(),
        LogFormat::Pretty => registry
            .with(
                tracing_subscriber::fmt::layer()
                    .with_writer(std::io::stderr)
                    .with_ansi(std::io::stderr().is_terminal())
                    .with_target(false),
            )
            .try_init(),
    };

    if installed.is_ok() {
        tracing::debug!(level = %log_level, ?format, "Logging initialized");
    }
}

/// New request id for tagging one valuation run.
pub fn generate_request_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_ids_are_unique() {
        let a = generate_request_id();
        let b = generate_request_id();
        assert_ne!(a, b);
        assert_eq!(a.len(), 36);
    }

    #[test]
    fn test_format_names() {
        assert_eq!(LogFormat::from_name("json"), LogFormat::Json);
        assert_eq!(LogFormat::from_name("JSON"), LogFormat::Json);
        assert_eq!(LogFormat::from_name("pretty"), LogFormat::Pretty);
        assert_eq!(LogFormat::from_name("anything"), LogFormat::Pretty);
    }

    #[test]
    fn test_filter_directives() {
        assert_eq!(filter_directives("INFO", &[]), "info");
        assert_eq!(
            filter_directives("debug", &["rayon".to_string(), "fairval_common".to_string()]),
            "debug,rayon=warn,fairval_common=warn"
        );
    }

    #[test]
    fn test_second_init_is_ignored() {
        init_logging_with_exclusions("debug", "pretty", &[]);
        init_from_config(&ObservabilityConfig::default());
        tracing::info!("still logging");
    }
}
