//! UI context for environment detection.

use std::io::IsTerminal;

use super::mode::OutputMode;

/// Terminal and environment context for UI decisions.
#[derive(Debug, Clone)]
pub struct UiContext {
    /// Whether color output is enabled
    pub color: bool,
    /// Whether unicode symbols are enabled
    pub unicode: bool,
    /// Terminal width (columns)
    pub width: usize,
    /// Resolved output mode
    pub mode: OutputMode,
}

impl UiContext {
    /// Create context from environment and output flags.
    pub fn from_env(json_flag: bool, format_flag: Option<&str>) -> anyhow::Result<Self> {
        let is_tty = std::io::stdout().is_terminal();
        let term_is_dumb = std::env::var("TERM").map(|v| v == "dumb").unwrap_or(false);
        let no_color_env = std::env::var("NO_COLOR").is_ok();

        let mode = OutputMode::resolve(json_flag, format_flag, is_tty, term_is_dumb)?;

        Ok(Self {
            color: is_tty && !no_color_env && !term_is_dumb,
            unicode: !term_is_dumb,
            width: terminal_width().unwrap_or(80),
            mode,
        })
    }

    /// Plain, colorless context for errors raised before flags are known.
    pub fn plain() -> Self {
        Self {
            color: false,
            unicode: false,
            width: 80,
            mode: OutputMode::Plain,
        }
    }
}

fn terminal_width() -> Option<usize> {
    std::env::var("COLUMNS")
        .ok()
        .and_then(|cols| cols.parse::<usize>().ok())
        .filter(|width| *width > 0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_json_mode_from_flag() {
        let ctx = UiContext::from_env(true, None).unwrap();
        assert_eq!(ctx.mode, OutputMode::Json);
    }

    #[test]
    fn test_width_has_default() {
        let ctx = UiContext::from_env(false, None).unwrap();
        assert!(ctx.width > 0);
    }

    #[test]
    fn test_plain_context() {
        let ctx = UiContext::plain();
        assert!(!ctx.color);
        assert_eq!(ctx.mode, OutputMode::Plain);
    }
}
