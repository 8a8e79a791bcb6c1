//! # CLI Behavior
//!
//! This is **one possible client** for typeshelf, not the application itself.
//! The CLI is the only place that knows about terminal I/O, exit codes and
//! output formatting.
//!
//! ## Startup
//!
//! Every invocation opens the shelf and runs startup reconciliation once
//! before dispatching. `typeshelf doctor` runs nothing else and prints what
//! reconciliation found (purged fonts, imported or unreadable template files).
//!
//! ## Output
//!
//! Terminal output is styled with `console`. `--json` prints the command's
//! `CmdResult` as JSON instead, which is what scripts should consume.
//!
//! ## Logging
//!
//! Library events go to stderr through `tracing-subscriber`. The filter is
//! read from `TYPESHELF_LOG`; without it `-v` means info and `-vv` debug.
//!
//! ## Module Structure
//!
//! - `setup`: argument parsing via clap
//! - `commands`: dispatch of parsed commands to the API
//! - `render`: terminal and JSON output
//! - `styles`: terminal styling

mod commands;
mod render;
pub mod setup;
mod styles;

pub use commands::run;
