//! # Typeshelf
//!
//! Typeshelf keeps two registries for a reporting service: **fonts** (static
//! font families the renderer may embed) and **report templates** (JRXML
//! documents). Each registry holds the same records in up to three places:
//!
//! - a SQLite table, which is the source of truth,
//! - a concurrent in-memory cache that serves reads,
//! - for templates, one mirror file per record in a directory that external
//!   tooling reads and writes.
//!
//! A fourth consumer, the font notifier, is told about the full font set
//! after every change so it can regenerate derived engine configuration.
//!
//! ## Architecture
//!
//! Layered the same way from the top down:
//!
//! 1. **API** ([`api`]): thin facade, one method per operation.
//! 2. **Commands** ([`commands`]): typed requests in, `CmdResult` out.
//! 3. **Registries** ([`registry`]): the mutation protocol and startup
//!    reconciliation.
//! 4. **Store** ([`store`]): tables, cache and mirror backends.
//!
//! Cross-cutting: [`validation`] (admission rules), [`notifier`],
//! [`blobs`] (uploaded font files), [`config`], [`error`].
//!
//! ## Quick Start
//!
//! ```ignore
//! use typeshelfapp::init::initialize;
//! use typeshelfapp::commands::fonts::RegisterFontRequest;
//!
//! let ctx = initialize(None)?;
//! ctx.api.startup()?;
//! ctx.api.register_font(RegisterFontRequest::new("Acme", "/fonts/acme.ttf"))?;
//! let path = ctx.api.font_path("Acme", "bold")?;
//! ```
//!
//! ## Failure Contract
//!
//! Validation runs before anything is written. A failed table write aborts
//! the whole operation with no cache, mirror or notifier change. Mirror and
//! notifier failures after a committed write are logged with `tracing` and do
//! not fail the operation. Every error carries an
//! [`ErrorKind`](error::ErrorKind).

pub mod api;
pub mod blobs;
pub mod commands;
pub mod config;
pub mod error;
pub mod init;
pub mod model;
pub mod notifier;
pub mod registry;
pub mod store;
pub mod validation;

#[cfg(any(test, feature = "test_utils"))]
pub mod test_utils;
