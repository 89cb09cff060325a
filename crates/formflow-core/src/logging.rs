//! Logging integration for formflow.
//!
//! Provides helpers for configuring [`tracing`]-based logging from
//! [`Settings`](crate::settings::Settings) and for creating per-request spans.

use tracing_subscriber::EnvFilter;

use crate::settings::Settings;

/// Installs the global tracing subscriber for the given settings.
///
/// Events are filtered by `settings.log_level`, falling back to `info` when
/// the directive does not parse. Debug settings print pretty, source-located
/// output; otherwise each event is one JSON line. Only the first call in a
/// process installs anything.
pub fn setup_logging(settings: &Settings) {
    use tracing_subscriber::prelude::*;
    use tracing_subscriber::{fmt, registry};

    let (filter, rejected) = log_filter(&settings.log_level);

    let output = if settings.debug {
        fmt::layer()
            .pretty()
            .with_file(true)
            .with_line_number(true)
            .boxed()
    } else {
        fmt::layer().json().with_current_span(true).boxed()
    };

    if registry().with(output).with(filter).try_init().is_ok() {
        if let Some(directive) = rejected {
            tracing::warn!(%directive, "invalid log_level, logging at info");
        }
    }
}

/// Parses a log directive, returning the `info` filter and the rejected
/// directive when it is invalid.
fn log_filter(directive: &str) -> (EnvFilter, Option<String>) {
    match EnvFilter::try_new(directive) {
        Ok(filter) => (filter, None),
        Err(_) => (EnvFilter::new("info"), Some(directive.to_string())),
    }
}

/// Creates a tracing span for one form submission.
///
/// # Examples
///
/// ```
/// use formflow_core::logging::request_span;
///
/// let span = request_span("abc-123");
/// let _guard = span.enter();
/// tracing::info!("processing form");
/// ```
pub fn request_span(request_id: &str) -> tracing::Span {
    tracing::info_span!("form_request", id = request_id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_setup_logging_twice_is_harmless() {
        let settings = Settings {
            log_level: "formflow=loud".to_string(),
            ..Settings::default()
        };
        setup_logging(&settings);
        setup_logging(&settings);
    }

    #[test]
    fn test_log_filter() {
        use tracing_subscriber::filter::LevelFilter;

        let (filter, rejected) = log_filter("formflow_forms=debug,warn");
        assert!(rejected.is_none());
        assert_eq!(filter.max_level_hint(), Some(LevelFilter::DEBUG));

        let (filter, rejected) = log_filter("formflow=loud");
        assert_eq!(rejected.as_deref(), Some("formflow=loud"));
        assert_eq!(filter.max_level_hint(), Some(LevelFilter::INFO));
    }

    #[test]
    fn test_request_span_enters() {
        let span = request_span("req-1");
        let _guard = span.enter();
        tracing::debug!("inside span");
    }
}
