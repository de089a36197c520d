//! Tracing subscriber setup shared by the backend and dashboard binaries.

use std::env;

use is_terminal::IsTerminal;
use tracing_subscriber::filter::EnvFilter;
use tracing_subscriber::fmt::format::FmtSpan;

// ---

/// Initialize the global tracing subscriber for structured logging.
///
/// This function configures the [`tracing_subscriber`] with:
/// - Log target, file, and line number output enabled
/// - Color output controlled by TTY detection and `FORCE_COLOR` env var:
///   - `FORCE_COLOR=1|true|yes`: force colors on
///   - `FORCE_COLOR=0|false|no`: force colors off
///   - unset or other values: auto-detect TTY
/// - Span event emission mode controlled by the `AXUM_SPAN_EVENTS` env var:
///   - `"full"`       : emit ENTER, EXIT, and CLOSE events with timing
///   - `"enter_exit"` : emit ENTER and EXIT only
///   - unset or other values: emit CLOSE events only (default)
/// - Log level controlled by `RUST_LOG`, falling back to `AXUM_LOG_LEVEL`
///   and then to `default_level`
///
/// Call once per process before any logging macros are invoked.
pub fn init_tracing(default_level: &str) {
    // ---
    let span_events = match env::var("AXUM_SPAN_EVENTS").as_deref() {
        Ok("full") => FmtSpan::FULL,
        Ok("enter_exit") => FmtSpan::ENTER | FmtSpan::EXIT,
        _ => FmtSpan::CLOSE,
    };

    let use_color = match env::var("FORCE_COLOR").as_deref() {
        Ok("1") | Ok("true") | Ok("yes") => true,
        Ok("0") | Ok("false") | Ok("no") => false,
        _ => std::io::stdout().is_terminal(),
    };

    let env_filter = if env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else {
        let requested = env::var("AXUM_LOG_LEVEL").ok();
        let level = level_or_default(requested.as_deref(), default_level);
        EnvFilter::new(format!("{level},sqlx::query=warn,rumqttc=info,hyper=info"))
    };

    tracing_subscriber::fmt()
        .with_target(true)
        .with_file(true)
        .with_line_number(true)
        .with_span_events(span_events)
        .with_env_filter(env_filter)
        .with_ansi(use_color)
        .compact()
        .init();
}

fn level_or_default<'a>(requested: Option<&'a str>, default_level: &'a str) -> &'a str {
    // ---
    match requested {
        Some(level @ ("trace" | "debug" | "info" | "warn" | "error")) => level,
        _ => default_level,
    }
}

#[cfg(test)]
mod tests {
    // ---
    use super::*;

    #[test]
    fn unknown_level_falls_back_to_default() {
        // ---
        assert_eq!(level_or_default(Some("verbose"), "info"), "info");
        assert_eq!(level_or_default(None, "debug"), "debug");
        assert_eq!(level_or_default(Some("warn"), "debug"), "warn");
    }
}
