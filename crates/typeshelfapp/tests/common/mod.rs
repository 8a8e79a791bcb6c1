#![allow(dead_code)]

use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;
use typeshelfapp::config::ShelfConfig;
use typeshelfapp::init::{Shelf, SqliteBackend};

pub const TEMPLATE: &str = "<jasperReport name=\"t\"><title/></jasperReport>";

pub struct Fixture {
    pub dir: TempDir,
    pub config: ShelfConfig,
}

impl Fixture {
    pub fn new() -> Self {
        let dir = TempDir::new().unwrap();
        let config = ShelfConfig::for_data_dir(dir.path());
        Self { dir, config }
    }

    /// A new shelf over the same data directory, as a restarted process sees it.
    pub fn boot(&self) -> Shelf<SqliteBackend> {
        let shelf = Shelf::open(&self.config).unwrap();
        shelf.init().unwrap();
        shelf
    }

    pub fn font_file(&self, name: &str) -> String {
        let dir = self.dir.path().join("src-fonts");
        fs::create_dir_all(&dir).unwrap();
        let path = dir.join(name);
        fs::write(&path, b"\x00\x01\x00\x00").unwrap();
        path.to_string_lossy().into_owned()
    }

    pub fn template_file(&self, name: &str) -> PathBuf {
        self.config.templates_path().join(format!("{}.jrxml", name))
    }
}
