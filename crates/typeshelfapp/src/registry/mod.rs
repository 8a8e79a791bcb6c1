//! # Registries
//!
//! [`FontRegistry`] and [`TemplateManager`] share one mutation protocol:
//!
//! 1. Validate the input. A rejection changes nothing.
//! 2. Write the table. A failure aborts here and is reported as a
//!    persistence error; cache, mirror and notifier are untouched.
//! 3. Write the cache.
//! 4. Templates: rewrite the mirror file. Fonts: hand the full set to the
//!    notifier. Both are best-effort and only logged on failure.
//!
//! Deletion runs the same steps against the table first; when the table
//! reports no such row the operation returns `false` with no side effects.
//!
//! Each registry serializes its mutations behind a write lock covering all
//! four steps, so concurrent saves of one name leave the cache holding the
//! same record as the table. Reads never take the lock, except a template
//! cache miss, which reads the table under it before filling the cache.
//!
//! ## Startup Reconciliation
//!
//! `init` runs once per instance:
//!
//! - Fonts: load every row, keep rows whose files still validate, delete the
//!   rest from the table, then notify once if anything survived.
//! - Templates: load every row into the cache and rewrite its mirror file
//!   (the table wins over whatever is on disk), then adopt any mirror file
//!   that has no row, as if it had been saved with the description
//!   "Imported from file system".
//!
//! The reconciler is also the recovery path for a crash between protocol
//! steps: the next boot realigns cache and mirror with the table.

pub mod fonts;
pub mod reconcile;
pub mod templates;

pub use fonts::FontRegistry;
pub use reconcile::{
    FontReconcileReport, ReconcileIssue, StartupReport, TemplateReconcileReport,
};
pub use templates::{TemplateManager, TemplateStatistics};
