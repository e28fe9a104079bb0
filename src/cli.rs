use clap::Parser;

use crate::config::DEFAULT_OUTPUT;
use crate::logging::Verbosity;
use crate::records::DEFAULT_IDENTITY_COLUMN;

/// Command-line interface definition.
///
/// Verbosity:
/// - `--quiet`: errors only
/// - default: per-stage progress
/// - `--verbose`: per-row detail (excluded IPs and so on)
#[derive(Parser, Debug, Clone)]
#[command(
    name = "clicksift",
    author,
    version,
    about = "Clean phishing-simulation click exports: drop scanner and relay hits, collapse repeated clicks"
)]
pub struct Cli {
    /// Input CSV export. Prompted for on stdin when omitted.
    #[arg(short = 'f', long = "file", value_name = "PATH")]
    pub file: Option<String>,

    /// Output CSV path
    #[arg(short = 'o', long, value_name = "PATH", default_value = DEFAULT_OUTPUT)]
    pub output: String,

    /// Debug logging
    #[arg(short = 'v', long, conflicts_with = "quiet")]
    pub verbose: bool,

    /// Only log errors
    #[arg(short = 'q', long)]
    pub quiet: bool,

    /// JSON configuration file with extra IPs to exclude
    #[arg(short = 'c', long, value_name = "PATH")]
    pub config: Option<String>,

    /// Column used to group clicks per person
    #[arg(long = "identity-column", value_name = "NAME", default_value = DEFAULT_IDENTITY_COLUMN)]
    pub identity_column: String,

    /// Do not print the startup banner
    #[arg(long = "no-banner")]
    pub no_banner: bool,

    /// Print the JSON Schema of the configuration file and exit
    #[arg(long = "generate-schema")]
    pub generate_schema: bool,
}

impl Cli {
    /// Parse CLI arguments from process args.
    pub fn from_args() -> Self {
        Self::parse()
    }

    pub fn verbosity(&self) -> Verbosity {
        if self.quiet {
            Verbosity::Quiet
        } else if self.verbose {
            Verbosity::Verbose
        } else {
            Verbosity::Normal
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let cli = Cli::try_parse_from(["clicksift"]).unwrap();
        assert_eq!(cli.file, None);
        assert_eq!(cli.output, "filtered_phishing_results.csv");
        assert_eq!(cli.identity_column, "email");
        assert_eq!(cli.verbosity(), Verbosity::Normal);
        assert!(!cli.generate_schema);
    }

    #[test]
    fn short_flags() {
        let cli = Cli::try_parse_from([
            "clicksift", "-f", "in.csv", "-o", "out.csv", "-c", "cfg.json", "-v",
        ])
        .unwrap();
        assert_eq!(cli.file.as_deref(), Some("in.csv"));
        assert_eq!(cli.output, "out.csv");
        assert_eq!(cli.config.as_deref(), Some("cfg.json"));
        assert_eq!(cli.verbosity(), Verbosity::Verbose);
    }

    #[test]
    fn quiet_conflicts_with_verbose() {
        assert!(Cli::try_parse_from(["clicksift", "-q", "-v"]).is_err());
        let cli = Cli::try_parse_from(["clicksift", "--quiet"]).unwrap();
        assert_eq!(cli.verbosity(), Verbosity::Quiet);
    }
}
