//! Startup banner using anstyle.
//!
//! Written to stderr so stdout stays free for `--generate-schema` output.

use anstyle::{AnsiColor, Color, Style};
use std::fmt::Write;
use std::io::{self, Write as IoWrite};

/// Style definitions for banner elements
pub struct Styles {
    pub title: Style,
    pub version: Style,
    pub heading: Style,
    pub flag: Style,
    pub muted: Style,
}

impl Default for Styles {
    fn default() -> Self {
        Self {
            title: Style::new()
                .bold()
                .fg_color(Some(Color::Ansi(AnsiColor::Blue))),
            version: Style::new().fg_color(Some(Color::Ansi(AnsiColor::Cyan))),
            heading: Style::new()
                .bold()
                .fg_color(Some(Color::Ansi(AnsiColor::Cyan))),
            flag: Style::new()
                .bold()
                .fg_color(Some(Color::Ansi(AnsiColor::Green))),
            muted: Style::new().fg_color(Some(Color::Ansi(AnsiColor::BrightBlack))),
        }
    }
}

const RULE: &str = "━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━";

pub struct Banner {
    styles: Styles,
    use_colors: bool,
}

impl Banner {
    pub fn new() -> Self {
        Self {
            styles: Styles::default(),
            use_colors: Self::should_use_colors(),
        }
    }

    /// Plain text banner (for non-interactive use)
    pub fn without_colors() -> Self {
        Self {
            styles: Styles::default(),
            use_colors: false,
        }
    }

    fn should_use_colors() -> bool {
        atty::is(atty::Stream::Stderr) && std::env::var("NO_COLOR").is_err()
    }

    fn styled(&self, text: &str, style: &Style) -> String {
        if self.use_colors {
            format!("{}{}{}", style.render(), text, style.render_reset())
        } else {
            text.to_string()
        }
    }

    /// Render the banner.
    pub fn render(&self) -> Result<String, std::fmt::Error> {
        let mut out = String::new();
        writeln!(out)?;
        writeln!(out, "{}", self.styled(RULE, &self.styles.muted))?;
        writeln!(
            out,
            "  {} {}",
            self.styled(crate::NAME, &self.styles.title),
            self.styled(&format!("v{}", crate::VERSION), &self.styles.version)
        )?;
        writeln!(out, "  Cleaning phishing-simulation click exports")?;
        writeln!(out, "{}", self.styled(RULE, &self.styles.muted))?;
        writeln!(out, "  {}", self.styled("Instructions:", &self.styles.heading))?;
        writeln!(
            out,
            "  1. Use {} to give the phishing results CSV export.",
            self.styled("--file/-f", &self.styles.flag)
        )?;
        writeln!(
            out,
            "  2. Optionally use {} to name the output file.",
            self.styled("--output/-o", &self.styles.flag)
        )?;
        writeln!(
            out,
            "  3. Use {} to exclude more IPs from a JSON file.",
            self.styled("--config/-c", &self.styles.flag)
        )?;
        writeln!(
            out,
            "  4. Use {} for detailed output.",
            self.styled("--verbose/-v", &self.styles.flag)
        )?;
        writeln!(out)?;
        writeln!(out, "  {}", self.styled("Usage:", &self.styles.heading))?;
        writeln!(
            out,
            "  {}",
            self.styled(
                "clicksift --file phishing_results.csv --output filtered_results.csv --verbose",
                &self.styles.muted
            )
        )?;
        writeln!(out)?;
        Ok(out)
    }

    /// Print the banner to stderr.
    pub fn print(&self) -> io::Result<()> {
        let text = self
            .render()
            .map_err(|e| io::Error::other(format!("banner formatting failed: {e}")))?;
        let mut stderr = io::stderr().lock();
        stderr.write_all(text.as_bytes())?;
        stderr.flush()
    }
}

impl Default for Banner {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_banner_creation() {
        let banner = Banner::new();
        assert!(banner.use_colors || !atty::is(atty::Stream::Stderr));
    }

    #[test]
    fn test_plain_banner_content() {
        let text = Banner::without_colors().render().unwrap();
        assert!(text.contains(crate::VERSION));
        assert!(text.contains("--file/-f"));
        assert!(text.contains("Usage:"));
        assert!(!text.contains('\u{1b}'));
    }

    #[test]
    fn test_colored_banner_has_escapes() {
        let banner = Banner {
            styles: Styles::default(),
            use_colors: true,
        };
        assert!(banner.render().unwrap().contains('\u{1b}'));
    }
}
