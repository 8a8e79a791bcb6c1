//! # Storage Layer
//!
//! Each registry keeps three representations of the same entity:
//!
//! 1. **Truth**: rows in a relational table ([`Table`], SQLite in production).
//! 2. **Cache**: a concurrent name → record map ([`cache::RecordCache`]) that
//!    serves reads.
//! 3. **Mirror** (templates only): one file per record in a directory
//!    ([`mirror::Mirror`]), rewritten on every save for external tooling.
//!
//! The table is authoritative. The cache never holds a record that was not
//! written to (or read from) the table, and the mirror is a best-effort
//! projection of the cache.
//!
//! ## Table Contract
//!
//! Every [`Table`] operation is one atomic unit; there are no multi-record
//! transactions. Failure is reported as `Err`, distinct from "not found":
//!
//! - `get` → `Ok(None)` when absent
//! - `delete` → `Ok(false)` when no row was removed
//!
//! `upsert` is keyed by name and resolves concurrent writers to the same name
//! last-writer-wins: the final row is exactly one of the submitted records,
//! never a mix of two.
//!
//! ## Implementations
//!
//! - [`sqlite::SqliteTable`]: production table, one connection per operation.
//! - [`memory::MemTable`]: for testing registry logic without a database,
//!   with write/read failure simulation.
//! - [`mirror::FsMirror`] / [`memory::MemMirror`]: the same split for the
//!   template mirror.
//!
//! ## Storage Layout
//!
//! ```text
//! <data_dir>/
//! ├── typeshelf.db            # registered_fonts + templates tables
//! ├── typeshelf.toml          # optional configuration
//! ├── templates/
//! │   ├── <name>.jrxml        # mirror of each cached template
//! │   └── <name>.jasper       # compiled artifact, removed with the template
//! ├── fonts/                  # uploaded font files
//! └── font-extensions/
//!     └── fonts.json          # derived font manifest
//! ```

use crate::error::Result;
use crate::model::Record;

pub mod cache;
pub mod memory;
pub mod mirror;
pub mod sqlite;

/// Durable, name-keyed storage for one record type.
pub trait Table<R: Record>: Send + Sync {
    /// Creates the backing table if needed. Idempotent.
    fn ensure_schema(&self) -> Result<()>;

    /// Inserts or replaces the record with the same name, returning the row
    /// as stored (immutable columns of an existing row are kept).
    fn upsert(&self, record: &R) -> Result<R>;

    fn get(&self, name: &str) -> Result<Option<R>>;

    /// All rows, ordered by name.
    fn list_all(&self) -> Result<Vec<R>>;

    fn exists(&self, name: &str) -> Result<bool>;

    fn count(&self) -> Result<u64>;

    /// Returns true iff a row was removed.
    fn delete(&self, name: &str) -> Result<bool>;

    /// Removes every row, returning how many were removed.
    fn delete_all(&self) -> Result<u64>;
}
