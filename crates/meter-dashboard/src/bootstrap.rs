use tracing_subscriber::{fmt, prelude::*, EnvFilter};

// ── Logging bootstrap ──────────────────────────────────────────────────────────

/// Map a `--log-level` name onto an [`EnvFilter`] directive.
///
/// Unknown names pass through lowercased so `RUST_LOG`-style directives
/// such as `meter_data=trace` keep working.
pub fn level_directive(log_level: &str) -> String {
    match log_level.to_uppercase().as_str() {
        "DEBUG" => "debug".to_string(),
        "INFO" => "info".to_string(),
        "WARNING" | "WARN" => "warn".to_string(),
        "ERROR" | "CRITICAL" => "error".to_string(),
        _ => log_level.to_lowercase(),
    }
}

/// Initialise the global `tracing` subscriber.
///
/// Output goes to stderr so that stdout carries only the report (text or
/// JSON). Falls back to `"warn"` if the directive does not parse.
pub fn setup_logging(log_level: &str) -> anyhow::Result<()> {
    let filter =
        EnvFilter::try_new(level_directive(log_level)).unwrap_or_else(|_| EnvFilter::new("warn"));

    let subscriber = fmt::layer()
        .with_target(false)
        .with_thread_ids(false)
        .with_writer(std::io::stderr);

    tracing_subscriber::registry()
        .with(filter)
        .with(subscriber)
        .try_init()?;

    Ok(())
}

// ── Tests ──────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_directive_maps_cli_names() {
        assert_eq!(level_directive("DEBUG"), "debug");
        assert_eq!(level_directive("INFO"), "info");
        assert_eq!(level_directive("WARNING"), "warn");
        assert_eq!(level_directive("ERROR"), "error");
    }

    #[test]
    fn test_level_directive_is_case_insensitive() {
        assert_eq!(level_directive("warning"), "warn");
        assert_eq!(level_directive("Info"), "info");
    }

    #[test]
    fn test_level_directive_passes_through_unknown() {
        assert_eq!(level_directive("meter_data=TRACE"), "meter_data=trace");
        assert!(EnvFilter::try_new(level_directive("meter_data=TRACE")).is_ok());
    }
}
