//! # Configuration
//!
//! Typeshelf configuration is loaded with [`confique`] from, in priority order:
//!
//! 1. **Environment variables**: `TYPESHELF_DATA_DIR`, `TYPESHELF_SQLITE_BUSY_MS`, etc.
//! 2. **Data directory config**: `<data_dir>/typeshelf.toml`.
//! 3. **Compiled defaults**: `#[config(default = ...)]`.
//!
//! An explicit data directory passed to [`ShelfConfig::load`] (the CLI's
//! `--data-dir`) beats all three.
//!
//! ## Available Settings
//!
//! | Key | Default | Description |
//! |-----|---------|-------------|
//! | `data_dir` | OS data dir, else `./data` | Root for everything below |
//! | `database_file` | `typeshelf.db` | SQLite database |
//! | `templates_dir` | `templates` | Template mirror directory |
//! | `fonts_dir` | `fonts` | Uploaded font files |
//! | `extensions_dir` | `font-extensions` | Derived font manifest |
//! | `template_extension` | `jrxml` | Mirror file extension |
//! | `compiled_extension` | `jasper` | Compiled artifact removed with a template |
//! | `sqlite_busy_ms` | `5000` | How long a writer waits for the database lock |
//!
//! Relative paths resolve against `data_dir`. Components never read the
//! environment themselves; they receive resolved values from this struct.

use crate::error::{Result, ShelfError};
use confique::Config;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const CONFIG_FILE_NAME: &str = "typeshelf.toml";

#[derive(Config, Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct ShelfConfig {
    /// Root directory for the database, mirror and font files.
    #[config(env = "TYPESHELF_DATA_DIR")]
    pub data_dir: Option<PathBuf>,

    #[config(env = "TYPESHELF_DATABASE_FILE", default = "typeshelf.db")]
    pub database_file: PathBuf,

    #[config(env = "TYPESHELF_TEMPLATES_DIR", default = "templates")]
    pub templates_dir: PathBuf,

    #[config(env = "TYPESHELF_FONTS_DIR", default = "fonts")]
    pub fonts_dir: PathBuf,

    #[config(env = "TYPESHELF_EXTENSIONS_DIR", default = "font-extensions")]
    pub extensions_dir: PathBuf,

    #[config(env = "TYPESHELF_TEMPLATE_EXTENSION", default = "jrxml")]
    pub template_extension: String,

    #[config(env = "TYPESHELF_COMPILED_EXTENSION", default = "jasper")]
    pub compiled_extension: String,

    #[config(env = "TYPESHELF_SQLITE_BUSY_MS", default = 5000)]
    pub sqlite_busy_ms: u64,
}

impl Default for ShelfConfig {
    fn default() -> Self {
        Self {
            data_dir: None,
            database_file: PathBuf::from("typeshelf.db"),
            templates_dir: PathBuf::from("templates"),
            fonts_dir: PathBuf::from("fonts"),
            extensions_dir: PathBuf::from("font-extensions"),
            template_extension: "jrxml".to_string(),
            compiled_extension: "jasper".to_string(),
            sqlite_busy_ms: 5000,
        }
    }
}

/// OS-appropriate data directory, or `./data` when none can be determined.
pub fn default_data_dir() -> PathBuf {
    ProjectDirs::from("com", "typeshelf", "typeshelf")
        .map(|dirs| dirs.data_dir().to_path_buf())
        .unwrap_or_else(|| PathBuf::from("data"))
}

impl ShelfConfig {
    /// Defaults rooted at `data_dir`, ignoring environment and files.
    pub fn for_data_dir(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: Some(data_dir.into()),
            ..Default::default()
        }
    }

    /// Loads layered configuration. `data_dir_override` wins over every layer.
    pub fn load(data_dir_override: Option<&Path>) -> Result<Self> {
        let data_dir = match data_dir_override {
            Some(dir) => dir.to_path_buf(),
            None => Self::builder()
                .env()
                .load()
                .map_err(|e| ShelfError::Config(e.to_string()))?
                .data_dir
                .unwrap_or_else(default_data_dir),
        };

        let mut config = Self::builder()
            .env()
            .file(data_dir.join(CONFIG_FILE_NAME))
            .load()
            .map_err(|e| ShelfError::Config(e.to_string()))?;

        if data_dir_override.is_some() || config.data_dir.is_none() {
            config.data_dir = Some(data_dir);
        }
        Ok(config)
    }

    pub fn data_dir(&self) -> PathBuf {
        self.data_dir.clone().unwrap_or_else(default_data_dir)
    }

    fn resolve(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.data_dir().join(path)
        }
    }

    pub fn database_path(&self) -> PathBuf {
        self.resolve(&self.database_file)
    }

    pub fn templates_path(&self) -> PathBuf {
        self.resolve(&self.templates_dir)
    }

    pub fn fonts_path(&self) -> PathBuf {
        self.resolve(&self.fonts_dir)
    }

    pub fn extensions_path(&self) -> PathBuf {
        self.resolve(&self.extensions_dir)
    }

    pub fn busy_timeout(&self) -> Duration {
        Duration::from_millis(self.sqlite_busy_ms)
    }
}
