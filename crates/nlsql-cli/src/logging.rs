// Logging setup for the binary

use tracing::Level;
use tracing_subscriber::fmt;

/// Parse a level name, defaulting to `warn`
pub fn parse_level(name: &str) -> Level {
    match name.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" | "warning" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::WARN,
    }
}

/// Pick the effective level: `--quiet` beats `--verbose` beats the config file
pub fn resolve_level(verbose: bool, quiet: bool, configured: Option<&str>) -> Level {
    if quiet {
        Level::ERROR
    } else if verbose {
        Level::DEBUG
    } else {
        configured.map(parse_level).unwrap_or(Level::WARN)
    }
}

/// Install the stderr subscriber
pub fn init_logging(verbose: bool, quiet: bool, configured: Option<&str>) {
    let level = resolve_level(verbose, quiet, configured);

    // A second call (e.g. from tests) keeps the first subscriber
    let _ = fmt()
        .with_max_level(level)
        .with_target(verbose)
        .with_writer(std::io::stderr)
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_level() {
        assert_eq!(resolve_level(false, false, None), Level::WARN);
        assert_eq!(resolve_level(false, false, Some("info")), Level::INFO);
        assert_eq!(resolve_level(true, false, Some("error")), Level::DEBUG);
        assert_eq!(resolve_level(true, true, None), Level::ERROR);
    }

    #[test]
    fn test_unknown_level_defaults_to_warn() {
        assert_eq!(parse_level("loud"), Level::WARN);
        assert_eq!(parse_level("TRACE"), Level::TRACE);
    }
}
