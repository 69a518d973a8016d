use tracing_subscriber::EnvFilter;

/// Installs the process-wide diagnostic sink.
///
/// `RUST_LOG` wins when set. Otherwise the level is `debug` in verbose mode and
/// `info` when not. Calling this more than once is harmless: later calls keep
/// the subscriber that is already installed and return `false`.
pub fn init(verbose: bool) -> bool {
    let default_level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt().with_env_filter(filter).with_target(false).try_init().is_ok()
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_init_twice_does_not_panic() {
        init(false);
        assert!(!init(true), "Second initialisation should keep the existing subscriber");
    }
}
