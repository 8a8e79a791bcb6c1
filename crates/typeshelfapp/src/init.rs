//! # Service Wiring
//!
//! A [`Shelf`] is the one explicit service instance a process builds at
//! startup and shares (by `Arc` or by reference) with everything that serves
//! requests. There is no global registry state: tests build fresh instances.
//!
//! Backends are chosen per [`ShelfBackend`]:
//!
//! - [`SqliteBackend`]: SQLite tables, directory mirror, `fonts.json` manifest.
//! - [`MemoryBackend`]: in-memory tables and mirror with a recording notifier,
//!   for exercising the protocol without a database.
//!
//! ## Opening
//!
//! [`Shelf::open`] only wires components and opens the database file. It
//! does not reconcile; call [`Shelf::init`] (or the API's `startup`) once
//! before serving requests.
//!
//! [`initialize`] is the CLI entry point: it loads [`ShelfConfig`], opens the
//! SQLite shelf and wraps it in a [`ShelfApi`].

use crate::api::ShelfApi;
use crate::blobs::FontBlobStore;
use crate::config::ShelfConfig;
use crate::error::Result;
use crate::model::{FontRecord, TemplateRecord};
use crate::notifier::{FontSetNotifier, ManifestNotifier, RecordingNotifier};
use crate::registry::{FontRegistry, StartupReport, TemplateManager};
use crate::store::memory::{MemMirror, MemTable};
use crate::store::mirror::{FsMirror, Mirror};
use crate::store::sqlite::{SqliteDb, SqliteTable};
use crate::store::Table;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::debug;

/// The component types one shelf is assembled from.
pub trait ShelfBackend: 'static {
    type FontTable: Table<FontRecord>;
    type Notifier: FontSetNotifier;
    type TemplateTable: Table<TemplateRecord>;
    type Mirror: Mirror;
}

pub struct SqliteBackend;

impl ShelfBackend for SqliteBackend {
    type FontTable = SqliteTable<FontRecord>;
    type Notifier = ManifestNotifier;
    type TemplateTable = SqliteTable<TemplateRecord>;
    type Mirror = FsMirror;
}

pub struct MemoryBackend;

impl ShelfBackend for MemoryBackend {
    type FontTable = MemTable<FontRecord>;
    type Notifier = RecordingNotifier;
    type TemplateTable = MemTable<TemplateRecord>;
    type Mirror = MemMirror;
}

pub type Fonts<B> =
    FontRegistry<<B as ShelfBackend>::FontTable, <B as ShelfBackend>::Notifier>;
pub type Templates<B> =
    TemplateManager<<B as ShelfBackend>::TemplateTable, <B as ShelfBackend>::Mirror>;

pub struct Shelf<B: ShelfBackend> {
    fonts: Arc<Fonts<B>>,
    templates: Arc<Templates<B>>,
    blobs: FontBlobStore,
}

impl<B: ShelfBackend> Clone for Shelf<B> {
    fn clone(&self) -> Self {
        Self {
            fonts: Arc::clone(&self.fonts),
            templates: Arc::clone(&self.templates),
            blobs: self.blobs.clone(),
        }
    }
}

impl<B: ShelfBackend> Shelf<B> {
    pub fn new(fonts: Fonts<B>, templates: Templates<B>, blobs: FontBlobStore) -> Self {
        Self {
            fonts: Arc::new(fonts),
            templates: Arc::new(templates),
            blobs,
        }
    }

    pub fn fonts(&self) -> &Fonts<B> {
        &self.fonts
    }

    pub fn templates(&self) -> &Templates<B> {
        &self.templates
    }

    pub fn blobs(&self) -> &FontBlobStore {
        &self.blobs
    }

    /// Reconciles fonts, then templates. Each registry only does so once.
    pub fn init(&self) -> Result<StartupReport> {
        let fonts = self.fonts.init()?;
        let templates = self.templates.init()?;
        Ok(StartupReport { fonts, templates })
    }
}

impl Shelf<SqliteBackend> {
    /// Wires the production backends from resolved configuration.
    pub fn open(config: &ShelfConfig) -> Result<Self> {
        let db = SqliteDb::open(config.database_path(), config.busy_timeout())?;
        debug!(db = %db.path().display(), "opening shelf");

        let mirror = FsMirror::new(config.templates_path())
            .with_extension(&config.template_extension)
            .with_compiled_extension(&config.compiled_extension);
        let fonts = FontRegistry::new(
            db.table::<FontRecord>(),
            ManifestNotifier::new(config.extensions_path()),
        );
        let templates = TemplateManager::new(db.table::<TemplateRecord>(), mirror);

        Ok(Self::new(fonts, templates, FontBlobStore::new(config.fonts_path())))
    }
}

impl Shelf<MemoryBackend> {
    /// An in-memory shelf. Uploaded font files still land in `blob_root`.
    pub fn in_memory(blob_root: impl Into<PathBuf>) -> Self {
        Self::new(
            FontRegistry::new(MemTable::new(), RecordingNotifier::new()),
            TemplateManager::new(MemTable::new(), MemMirror::new()),
            FontBlobStore::new(blob_root),
        )
    }
}

pub struct ShelfContext {
    pub api: ShelfApi<SqliteBackend>,
    pub config: ShelfConfig,
}

/// Loads configuration and opens the SQLite-backed shelf.
///
/// `data_dir` overrides every configured data directory (CLI `--data-dir`).
pub fn initialize(data_dir: Option<&Path>) -> Result<ShelfContext> {
    let config = ShelfConfig::load(data_dir)?;
    let shelf = Shelf::open(&config)?;
    Ok(ShelfContext {
        api: ShelfApi::new(shelf),
        config,
    })
}
