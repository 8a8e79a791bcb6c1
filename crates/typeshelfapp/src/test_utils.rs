use crate::config::ShelfConfig;
use crate::error::Result;
use crate::init::{Shelf, SqliteBackend};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// A minimal document that passes template validation.
pub const SAMPLE_TEMPLATE: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<jasperReport name="sample" pageWidth="595" pageHeight="842">
  <title><band height="40"/></title>
</jasperReport>
"#;

/// A throwaway data directory with helpers for placing fixture files.
pub struct TestEnv {
    // Held so the directory outlives the test.
    pub _temp_dir: TempDir,
    pub root: PathBuf,
    pub config: ShelfConfig,
}

impl Default for TestEnv {
    fn default() -> Self {
        Self::new()
    }
}

impl TestEnv {
    pub fn new() -> Self {
        let temp_dir = tempfile::tempdir().expect("failed to create temp dir");
        let root = temp_dir.path().to_path_buf();
        let config = ShelfConfig::for_data_dir(&root);
        Self {
            _temp_dir: temp_dir,
            root,
            config,
        }
    }

    /// Opens a fresh SQLite-backed shelf over this directory. Each call is a
    /// new "process": caches start empty and reconciliation has not run.
    pub fn open(&self) -> Result<Shelf<SqliteBackend>> {
        Shelf::open(&self.config)
    }

    /// Writes a fake font file under `<root>/source-fonts/` and returns its
    /// path as a string, ready for a font record.
    pub fn font_file(&self, file_name: &str) -> String {
        let dir = self.root.join("source-fonts");
        fs::create_dir_all(&dir).expect("failed to create font fixture dir");
        let path = dir.join(file_name);
        fs::write(&path, b"\x00\x01\x00\x00fixture").expect("failed to write font fixture");
        path.to_string_lossy().into_owned()
    }

    /// Drops a file straight into the template mirror directory, the way an
    /// external tool would.
    pub fn place_template_file(&self, name: &str, content: &str) -> PathBuf {
        let dir = self.config.templates_path();
        fs::create_dir_all(&dir).expect("failed to create templates dir");
        let path = dir.join(format!("{}.{}", name, self.config.template_extension));
        fs::write(&path, content).expect("failed to write template fixture");
        path
    }

    pub fn template_path(&self, name: &str) -> PathBuf {
        self.config
            .templates_path()
            .join(format!("{}.{}", name, self.config.template_extension))
    }

    pub fn path(&self, relative: impl AsRef<Path>) -> PathBuf {
        self.root.join(relative)
    }
}
