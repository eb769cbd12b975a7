//! Output mode routing logic.

use crate::errors::CliError;

/// Output mode determines how results are formatted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputMode {
    /// Machine-readable JSON only
    Json,
    /// Stable `key=value` and space-separated lines for scripts
    #[default]
    Plain,
    /// Tables and badges for a terminal
    Pretty,
}

impl OutputMode {
    /// Pick the mode from `--json`, `--format`, and whether stdout is a TTY.
    ///
    /// `--json` wins. `--format plain` and `TERM=dumb` force plain. `--format
    /// table` only asks for pretty output; pipes still get plain.
    pub fn resolve(
        json_flag: bool,
        format_flag: Option<&str>,
        is_tty: bool,
        term_is_dumb: bool,
    ) -> anyhow::Result<Self> {
        if json_flag {
            return Ok(Self::Json);
        }

        match format_flag {
            None | Some("table") => {}
            Some("plain") => return Ok(Self::Plain),
            Some("json") => return Ok(Self::Json),
            Some(other) => {
                return Err(CliError::invalid_input(format!(
                    "Unsupported format: {} (use table, plain, or json)",
                    other
                ))
                .into())
            }
        }

        Ok(if is_tty && !term_is_dumb {
            Self::Pretty
        } else {
            Self::Plain
        })
    }

    pub fn is_json(&self) -> bool {
        matches!(self, Self::Json)
    }

    pub fn is_pretty(&self) -> bool {
        matches!(self, Self::Pretty)
    }
}
