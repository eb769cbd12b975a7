//! UI primitives for the Fortress CLI.
//!
//! - **Context**: environment detection (TTY, width, color, unicode)
//! - **Mode**: output mode resolution (json, plain, pretty)
//! - **Theme**: badges and styles
//! - **Render**: headers, tables, receipts, hints, errors
//! - **Format**: string helpers

mod context;
pub mod format;
mod mode;
pub mod render;
pub mod theme;

pub use context::UiContext;
pub use mode::OutputMode;
pub use theme::Badge;

pub use render::{badge, header, hint, kv, print, print_error, receipt, simple_table};

pub use format::{format_datetime, preview, short_id, truncate};
