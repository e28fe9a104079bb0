//! High-level application orchestration layer.
//!
//! This module provides the CLI-facing `App` façade. Major steps in
//! `App::run`:
//!   1. Schema generation early-exit
//!   2. Banner
//!   3. Input resolution (flag or interactive prompt)
//!   4. Config load / validation
//!   5. Load, clean and write the export
//!
//! Nothing is written to the output path unless every earlier step
//! succeeded.

use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use std::time::Instant;

use tracing::{debug, info, warn};

use crate::banner::Banner;
use crate::cli::Cli;
use crate::config::{Config, FileConfig};
use crate::errors::{ClickSiftError, IoResultExt, Result};
use crate::loader::load_records;
use crate::pipeline;
use crate::writer::write_records;

const INPUT_PROMPT: &str = "Please enter the path to the phishing test results CSV file: ";

/// Application façade.
pub struct App;

impl App {
    /// Execute the end-to-end cleaning workflow.
    ///
    /// Returns: intended process exit code (0 = success).
    pub fn run(cli: &Cli) -> Result<i32> {
        if Self::maybe_print_schema(cli)? {
            return Ok(0);
        }

        if !cli.no_banner
            && let Err(e) = Banner::new().print()
        {
            warn!("Could not print banner: {e}");
        }

        let input = Self::resolve_input(cli.file.as_deref())?;

        let mut config = Config::load(cli)?;
        config.input = Some(input.clone());
        config.validate()?;

        let infra = config.infrastructure();
        debug!(
            exclusions = infra.len(),
            configured = infra.configured_len(),
            "Built infrastructure IP set"
        );

        let start = Instant::now();
        let table = load_records(&input, &config.identity_column)?;
        let cleaned = pipeline::run(table, &infra)?;
        write_records(&config.output, &cleaned)?;

        debug!(elapsed = ?start.elapsed(), "Run complete");
        info!("Filtered data saved to {}", config.output.display());
        Ok(0)
    }

    /// Print the configuration schema to stdout if requested.
    fn maybe_print_schema(cli: &Cli) -> Result<bool> {
        if !cli.generate_schema {
            return Ok(false);
        }
        let schema = FileConfig::json_schema()?;
        let mut stdout = io::stdout().lock();
        writeln!(stdout, "{schema}").with_path("<stdout>", "write schema")?;
        Ok(true)
    }

    /// Use the `--file` value, or ask for one on stdin, then check it exists.
    fn resolve_input(file: Option<&str>) -> Result<PathBuf> {
        let path = match file {
            Some(f) => PathBuf::from(f),
            None => {
                let stdin = io::stdin();
                let mut stderr = io::stderr();
                prompt_for_input(&mut stdin.lock(), &mut stderr)?
            }
        };
        ensure_input_file(&path)?;
        Ok(path)
    }
}

/// Ask for the input path. An empty answer (or closed stdin) is an input
/// error.
pub fn prompt_for_input<R: BufRead, W: Write>(input: &mut R, prompt: &mut W) -> Result<PathBuf> {
    write!(prompt, "{INPUT_PROMPT}").with_path("<stderr>", "write prompt")?;
    prompt.flush().with_path("<stderr>", "flush prompt")?;

    let mut line = String::new();
    input.read_line(&mut line).with_path("<stdin>", "read input path")?;
    let answer = line.trim();
    if answer.is_empty() {
        return Err(ClickSiftError::NoInput);
    }
    Ok(PathBuf::from(answer))
}

/// The input must be an existing regular file.
pub fn ensure_input_file(path: &Path) -> Result<()> {
    if path.is_file() {
        Ok(())
    } else {
        Err(ClickSiftError::input_not_found(path.display().to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;
    use tempfile::NamedTempFile;

    #[test]
    fn prompt_reads_trimmed_path() {
        let mut input = Cursor::new("  results.csv \n");
        let mut prompt = Vec::new();
        let path = prompt_for_input(&mut input, &mut prompt).unwrap();
        assert_eq!(path, PathBuf::from("results.csv"));
        assert_eq!(String::from_utf8(prompt).unwrap(), INPUT_PROMPT);
    }

    #[test]
    fn empty_answer_is_rejected() {
        let mut prompt = Vec::new();
        let err = prompt_for_input(&mut Cursor::new("\n"), &mut prompt).unwrap_err();
        assert!(matches!(err, ClickSiftError::NoInput));
        let err = prompt_for_input(&mut Cursor::new(""), &mut prompt).unwrap_err();
        assert!(matches!(err, ClickSiftError::NoInput));
    }

    #[test]
    fn input_must_exist_and_be_a_file() {
        let file = NamedTempFile::new().unwrap();
        assert!(ensure_input_file(file.path()).is_ok());
        assert!(ensure_input_file(Path::new("/no/such/export.csv")).is_err());
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            ensure_input_file(dir.path()),
            Err(ClickSiftError::InputNotFound { .. })
        ));
    }
}
