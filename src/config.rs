//! Configuration management for clicksift.
//!
//! Settings come from four layers, later ones winning:
//!
//! 1. built-in defaults
//! 2. the optional JSON file given with `--config`
//! 3. the `CLICKSIFT_ADDITIONAL_IPS` environment variable (appended)
//! 4. command-line flags

use std::fs;
use std::path::{Path, PathBuf};

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::classify::InfrastructureIpSet;
use crate::cli::Cli;
use crate::errors::{ClickSiftError, Result};
use crate::records::DEFAULT_IDENTITY_COLUMN;

/// Default output path.
pub const DEFAULT_OUTPUT: &str = "filtered_phishing_results.csv";

/// Comma-separated IPs added to the exclusion set.
pub const ENV_ADDITIONAL_IPS: &str = "CLICKSIFT_ADDITIONAL_IPS";

/// Shape of the JSON configuration file. Unknown keys are ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize, JsonSchema)]
#[serde(default)]
pub struct FileConfig {
    /// Extra IP addresses to treat as infrastructure, matched exactly.
    pub additional_ips: Vec<String>,
}

impl FileConfig {
    /// Read and parse a configuration file. A missing file is an error.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let shown = path.as_ref().display().to_string();
        let content =
            fs::read_to_string(&path).map_err(|e| ClickSiftError::config_read(&shown, e))?;
        Self::from_json(&content).map_err(|e| ClickSiftError::config_parse(&shown, e))
    }

    /// Parse configuration from a JSON string.
    pub fn from_json(content: &str) -> serde_json::Result<Self> {
        serde_json::from_str(content)
    }

    /// Pretty-printed JSON Schema of the file format.
    pub fn json_schema() -> Result<String> {
        let schema = schemars::schema_for!(FileConfig);
        serde_json::to_string_pretty(&schema)
            .map_err(|e| ClickSiftError::internal(format!("schema serialization failed: {e}")))
    }
}

/// Resolved runtime settings.
#[derive(Debug, Clone)]
pub struct Config {
    pub input: Option<PathBuf>,
    pub output: PathBuf,
    pub identity_column: String,
    pub additional_ips: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            input: None,
            output: PathBuf::from(DEFAULT_OUTPUT),
            identity_column: DEFAULT_IDENTITY_COLUMN.to_string(),
            additional_ips: Vec::new(),
        }
    }
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the full configuration for a CLI invocation: file, then
    /// environment, then flags.
    pub fn load(cli: &Cli) -> Result<Self> {
        let mut config = Self::new();
        if let Some(ref path) = cli.config {
            config.merge_file(FileConfig::from_file(path)?);
        }
        config.merge_env();
        config.merge_with_cli(cli);
        Ok(config)
    }

    pub fn merge_file(&mut self, file: FileConfig) {
        self.additional_ips.extend(file.additional_ips);
    }

    /// Append addresses from `CLICKSIFT_ADDITIONAL_IPS`.
    pub fn merge_env(&mut self) {
        if let Ok(value) = std::env::var(ENV_ADDITIONAL_IPS) {
            self.additional_ips.extend(parse_ip_list(&value));
        }
    }

    /// Merge with CLI arguments, giving CLI precedence.
    pub fn merge_with_cli(&mut self, cli: &Cli) {
        if let Some(ref file) = cli.file {
            self.input = Some(PathBuf::from(file));
        }
        self.output = PathBuf::from(&cli.output);
        self.identity_column = cli.identity_column.clone();
    }

    /// Validate configuration values.
    pub fn validate(&self) -> Result<()> {
        if self.identity_column.trim().is_empty() {
            return Err(ClickSiftError::configuration(
                "Identity column name must not be empty",
            ));
        }

        if self.output.as_os_str().is_empty() {
            return Err(ClickSiftError::configuration("Output path must not be empty"));
        }

        if let Some(ref input) = self.input
            && same_file(input, &self.output)
        {
            return Err(ClickSiftError::configuration(format!(
                "Output path '{}' would overwrite the input file",
                self.output.display()
            )));
        }

        Ok(())
    }

    /// The exclusion set: built-in addresses plus everything configured.
    pub fn infrastructure(&self) -> InfrastructureIpSet {
        InfrastructureIpSet::with_additional(&self.additional_ips)
    }
}

/// Split a comma-separated list, dropping empty pieces.
pub fn parse_ip_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

fn same_file(a: &Path, b: &Path) -> bool {
    match (fs::canonicalize(a), fs::canonicalize(b)) {
        (Ok(a), Ok(b)) => a == b,
        _ => a == b,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use std::env;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn cli(args: &[&str]) -> Cli {
        let mut argv = vec!["clicksift"];
        argv.extend_from_slice(args);
        Cli::try_parse_from(argv).unwrap()
    }

    fn config_file(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file.flush().unwrap();
        file
    }

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.output, PathBuf::from("filtered_phishing_results.csv"));
        assert_eq!(config.identity_column, "email");
        assert!(config.additional_ips.is_empty());
    }

    #[test]
    fn test_file_config() {
        let file = config_file(r#"{"additional_ips": ["9.9.9.9", "1.2.3.4"], "other": 1}"#);
        let parsed = FileConfig::from_file(file.path()).unwrap();
        assert_eq!(parsed.additional_ips, vec!["9.9.9.9", "1.2.3.4"]);

        assert_eq!(FileConfig::from_json("{}").unwrap(), FileConfig::default());
    }

    #[test]
    fn test_file_config_errors() {
        let missing = FileConfig::from_file("/no/such/config.json").unwrap_err();
        assert!(matches!(missing, ClickSiftError::ConfigRead { .. }));

        let file = config_file("{ not json");
        let bad = FileConfig::from_file(file.path()).unwrap_err();
        match bad {
            ClickSiftError::ConfigParse { path, .. } => {
                assert_eq!(path, file.path().display().to_string())
            }
            other => panic!("unexpected error: {other:?}"),
        }

        let wrong_type = FileConfig::from_json(r#"{"additional_ips": "9.9.9.9"}"#);
        assert!(wrong_type.is_err());
    }

    #[test]
    fn test_cli_precedence() {
        let file = config_file(r#"{"additional_ips": ["9.9.9.9"]}"#);
        let path = file.path().display().to_string();
        let config = Config::load(&cli(&[
            "-c",
            &path,
            "-f",
            "in.csv",
            "-o",
            "out.csv",
            "--identity-column",
            "user",
            "--no-banner",
            "-q",
        ]))
        .unwrap();
        assert!(config.additional_ips.contains(&"9.9.9.9".to_string()));
        assert_eq!(config.input, Some(PathBuf::from("in.csv")));
        assert_eq!(config.output, PathBuf::from("out.csv"));
        assert_eq!(config.identity_column, "user");
        assert!(config.infrastructure().is_excluded("9.9.9.9"));
    }

    #[test]
    fn test_config_validation() {
        let mut config = Config::default();
        assert!(config.validate().is_ok());

        config.identity_column = "  ".to_string();
        assert!(config.validate().is_err());

        config.identity_column = "email".to_string();
        config.input = Some(PathBuf::from("same.csv"));
        config.output = PathBuf::from("same.csv");
        assert!(matches!(
            config.validate(),
            Err(ClickSiftError::Configuration { .. })
        ));
    }

    #[test]
    fn test_ip_list_parsing() {
        assert_eq!(parse_ip_list(" 1.1.1.1, ,2.2.2.2,"), vec!["1.1.1.1", "2.2.2.2"]);
        assert!(parse_ip_list("").is_empty());
    }

    #[test]
    fn test_env_loading() {
        unsafe {
            env::set_var(ENV_ADDITIONAL_IPS, "7.7.7.7, 6.6.6.6");
        }

        let mut config = Config::new();
        config.merge_file(FileConfig {
            additional_ips: vec!["9.9.9.9".to_string()],
        });
        config.merge_env();
        assert_eq!(config.additional_ips, vec!["9.9.9.9", "7.7.7.7", "6.6.6.6"]);

        // Clean up
        unsafe {
            env::remove_var(ENV_ADDITIONAL_IPS);
        }
    }

    #[test]
    fn test_schema_mentions_field() {
        let schema = FileConfig::json_schema().unwrap();
        assert!(schema.contains("additional_ips"));
    }
}
