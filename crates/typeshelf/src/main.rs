//! # Typeshelf CLI
//!
//! The binary is thin: the CLI lives in `src/cli/`, this file only invokes
//! `cli::run()` and handles process termination.
//!
//! ## Layering
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │  CLI Layer (crates/typeshelf/src/cli/)                      │
//! │  - clap argument parsing (setup.rs)                         │
//! │  - logging, context wiring and dispatch (commands.rs)       │
//! │  - terminal and JSON rendering (render.rs, styles.rs)       │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  API Layer (crates/typeshelfapp/src/api.rs)                 │
//! │  - One method per operation, returns `CmdResult`            │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Registries + Store (crates/typeshelfapp/src/registry, ...) │
//! │  - No knowledge of stdout/stderr or process exits           │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! Errors that come from the library keep their kind on the way out, so a
//! failed command prints `Error [not_found]: ...` and exits with status 1.

mod cli;

use typeshelfapp::error::ShelfError;

fn main() {
    if let Err(e) = cli::run() {
        match e.downcast_ref::<ShelfError>() {
            Some(err) => eprintln!("Error [{}]: {}", err.kind(), err),
            None => eprintln!("Error: {:#}", e),
        }
        std::process::exit(1);
    }
}
