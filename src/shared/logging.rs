use tracing_subscriber::EnvFilter;

/// Filter for the crate's diagnostics. A valid `RUST_LOG` wins; otherwise
/// `-v` count maps warn → info → debug → trace.
pub fn log_filter(verbose: u8, rust_log: Option<&str>) -> EnvFilter {
    if let Some(directives) = rust_log.filter(|d| !d.trim().is_empty())
        && let Ok(filter) = EnvFilter::try_new(directives)
    {
        return filter;
    }
    EnvFilter::new(match verbose {
        0 => "wbs_tracker=warn",
        1 => "wbs_tracker=info",
        2 => "wbs_tracker=debug",
        _ => "wbs_tracker=trace",
    })
}

/// Install the stderr subscriber, so JSON on stdout stays pipeable.
pub fn init(verbose: u8) {
    let rust_log = std::env::var(EnvFilter::DEFAULT_ENV).ok();
    tracing_subscriber::fmt()
        .with_env_filter(log_filter(verbose, rust_log.as_deref()))
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;
    use tracing::level_filters::LevelFilter;

    #[test]
    fn test_default_is_warn() {
        assert_eq!(log_filter(0, None).max_level_hint(), Some(LevelFilter::WARN));
    }

    #[test]
    fn test_verbosity_raises_level() {
        assert_eq!(log_filter(1, None).max_level_hint(), Some(LevelFilter::INFO));
        assert_eq!(log_filter(2, None).max_level_hint(), Some(LevelFilter::DEBUG));
        assert_eq!(log_filter(5, None).max_level_hint(), Some(LevelFilter::TRACE));
    }

    #[test]
    fn test_rust_log_overrides_verbosity() {
        let filter = log_filter(0, Some("wbs_tracker=debug"));
        assert_eq!(filter.max_level_hint(), Some(LevelFilter::DEBUG));
    }

    #[test]
    fn test_blank_rust_log_ignored() {
        assert_eq!(log_filter(1, Some("  ")).max_level_hint(), Some(LevelFilter::INFO));
    }
}
