use crate::config::Config;
use log::LevelFilter;
use simplelog::{self, ConfigBuilder};

/// Dependencies whose logs are dropped below Trace; they drown out the
/// server's own request and ingest logs.
const FILTERED_MODULES: &[&str] = &[
    "mongodb", "tower", "tracing", "hyper", "axum", "reqwest", "rustls",
];

pub struct Logger {}

impl Logger {
    /// Initializes the global logger at the level configured for the process.
    pub fn init_logger(config: &Config) {
        Self::init_with_level(config.log_level_filter);
    }

    /// Initializes the global logger at `level`. A second call is ignored
    /// with a warning, since the logger is process-global.
    pub fn init_with_level(level: LevelFilter) {
        if let Err(e) = simplelog::TermLogger::init(
            level,
            Self::build_log_config(level),
            simplelog::TerminalMode::Mixed,
            simplelog::ColorChoice::Auto,
        ) {
            log::warn!("Logger already initialized: {e}");
        }
    }

    /// Modules whose records are ignored at `level`. Trace shows everything.
    fn ignored_modules(level: LevelFilter) -> &'static [&'static str] {
        if level == LevelFilter::Trace {
            &[]
        } else {
            FILTERED_MODULES
        }
    }

    fn build_log_config(level: LevelFilter) -> simplelog::Config {
        let mut builder = ConfigBuilder::new();
        builder.set_time_format_rfc3339();

        for module in Self::ignored_modules(level) {
            builder.add_filter_ignore_str(module);
        }

        builder.build()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_driver_and_http_client_logs_are_ignored_below_trace() {
        for level in [LevelFilter::Error, LevelFilter::Info, LevelFilter::Debug] {
            let ignored = Logger::ignored_modules(level);
            assert!(ignored.contains(&"mongodb"), "mongodb at {level}");
            assert!(ignored.contains(&"reqwest"), "reqwest at {level}");
        }
    }

    #[test]
    fn test_trace_ignores_nothing() {
        assert!(Logger::ignored_modules(LevelFilter::Trace).is_empty());
    }

    #[test]
    fn test_second_init_is_ignored() {
        Logger::init_with_level(LevelFilter::Warn);
        Logger::init_with_level(LevelFilter::Debug);

        // The first logger stays installed
        assert_eq!(log::max_level(), LevelFilter::Warn);
    }
}
