//! Logger setup for front-ends embedding the library.

use log::LevelFilter;

/// Map a `-v` count to a log level: 0 → warn, 1 → info, 2 → debug, 3+ → trace.
pub fn level_for_verbosity(verbosity: u8) -> LevelFilter {
    match verbosity {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    }
}

/// Initialize `env_logger` for the given verbosity.
///
/// `RUST_LOG` still overrides the computed level. Calling this twice is
/// harmless; the second call is ignored.
pub fn init_logging(verbosity: u8) {
    let _ = env_logger::Builder::new()
        .filter_level(level_for_verbosity(verbosity))
        .parse_default_env()
        .format_timestamp(None)
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_for_verbosity() {
        assert_eq!(level_for_verbosity(0), LevelFilter::Warn);
        assert_eq!(level_for_verbosity(2), LevelFilter::Debug);
        assert_eq!(level_for_verbosity(9), LevelFilter::Trace);
    }

    #[test]
    fn test_init_logging_twice_is_harmless() {
        init_logging(1);
        init_logging(3);
    }
}
