//! Diagnostic logging setup.

use tracing_subscriber::EnvFilter;

/// How chatty the tool is on stderr.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Verbosity {
    Quiet,
    #[default]
    Normal,
    Verbose,
}

impl Verbosity {
    /// Default filter directive when `RUST_LOG` is unset.
    pub fn directive(self) -> &'static str {
        match self {
            Verbosity::Quiet => "clicksift=error",
            Verbosity::Normal => "clicksift=info",
            Verbosity::Verbose => "clicksift=debug",
        }
    }
}

fn filter(verbosity: Verbosity) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(verbosity.directive()))
}

/// Install the global subscriber. Later calls are no-ops.
pub fn init(verbosity: Verbosity) {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter(verbosity))
        .with_writer(std::io::stderr)
        .with_ansi(atty::is(atty::Stream::Stderr))
        .with_target(false)
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn directives_follow_verbosity() {
        assert_eq!(Verbosity::default(), Verbosity::Normal);
        assert_eq!(Verbosity::Quiet.directive(), "clicksift=error");
        assert_eq!(Verbosity::Verbose.directive(), "clicksift=debug");
    }

    #[test]
    fn init_is_idempotent() {
        init(Verbosity::Verbose);
        init(Verbosity::Quiet);
    }
}
