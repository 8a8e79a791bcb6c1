//! # API Facade
//!
//! [`ShelfApi`] is the single entry point for front ends. It dispatches to
//! the command layer and returns `Result<CmdResult>`; it holds no logic of
//! its own beyond picking the right registry.
//!
//! ## Generic Over the Backend
//!
//! `ShelfApi<B: ShelfBackend>`:
//! - Production: `ShelfApi<SqliteBackend>`
//! - Testing: `ShelfApi<MemoryBackend>`
//!
//! ## Errors
//!
//! Failures come back as [`ShelfError`](crate::error::ShelfError); callers
//! branch on [`ShelfError::kind`](crate::error::ShelfError::kind) rather than
//! on message text.

use crate::commands::{self, CmdResult};
use crate::commands::fonts::RegisterFontRequest;
use crate::commands::templates::{SaveTemplateRequest, UpdateTemplateRequest};
use crate::error::Result;
use crate::init::{Shelf, ShelfBackend};
use crate::model::FontStyle;

pub struct ShelfApi<B: ShelfBackend> {
    shelf: Shelf<B>,
}

impl<B: ShelfBackend> Clone for ShelfApi<B> {
    fn clone(&self) -> Self {
        Self {
            shelf: self.shelf.clone(),
        }
    }
}

impl<B: ShelfBackend> ShelfApi<B> {
    pub fn new(shelf: Shelf<B>) -> Self {
        Self { shelf }
    }

    pub fn shelf(&self) -> &Shelf<B> {
        &self.shelf
    }

    /// Runs startup reconciliation (once per process) and reports on it.
    pub fn startup(&self) -> Result<CmdResult> {
        let report = self.shelf.init()?;
        Ok(commands::doctor::summarize(report))
    }

    // --- Fonts ---

    pub fn list_fonts(&self) -> Result<CmdResult> {
        Ok(commands::fonts::list(self.shelf.fonts()))
    }

    pub fn get_font(&self, name: &str) -> Result<CmdResult> {
        commands::fonts::show(self.shelf.fonts(), name)
    }

    pub fn register_font(&self, request: RegisterFontRequest) -> Result<CmdResult> {
        commands::fonts::register(self.shelf.fonts(), self.shelf.blobs(), request)
    }

    pub fn remove_font(&self, name: &str) -> Result<CmdResult> {
        commands::fonts::remove(self.shelf.fonts(), name)
    }

    pub fn clear_fonts(&self, purge_files: bool) -> Result<CmdResult> {
        commands::fonts::clear(self.shelf.fonts(), self.shelf.blobs(), purge_files)
    }

    /// Style names are parsed leniently; unknown styles mean normal.
    pub fn font_path(&self, name: &str, style: &str) -> Result<CmdResult> {
        commands::fonts::path(self.shelf.fonts(), name, FontStyle::parse_lossy(style))
    }

    // --- Templates ---

    pub fn list_templates(&self) -> Result<CmdResult> {
        Ok(commands::templates::list(self.shelf.templates(), None))
    }

    pub fn templates_by_category(&self, category: &str) -> Result<CmdResult> {
        Ok(commands::templates::list(
            self.shelf.templates(),
            Some(category),
        ))
    }

    pub fn get_template(&self, name: &str) -> Result<CmdResult> {
        commands::templates::show(self.shelf.templates(), name)
    }

    pub fn create_template(&self, request: SaveTemplateRequest) -> Result<CmdResult> {
        commands::templates::create(self.shelf.templates(), request)
    }

    pub fn update_template(&self, name: &str, request: UpdateTemplateRequest) -> Result<CmdResult> {
        commands::templates::update(self.shelf.templates(), name, request)
    }

    pub fn save_template(&self, request: SaveTemplateRequest) -> Result<CmdResult> {
        commands::templates::save(self.shelf.templates(), request)
    }

    pub fn delete_template(&self, name: &str) -> Result<CmdResult> {
        commands::templates::delete(self.shelf.templates(), name)
    }

    pub fn template_categories(&self) -> Result<CmdResult> {
        Ok(commands::templates::categories(self.shelf.templates()))
    }

    pub fn template_statistics(&self) -> Result<CmdResult> {
        Ok(commands::templates::statistics(self.shelf.templates()))
    }

    pub fn reload_templates(&self) -> Result<CmdResult> {
        commands::templates::reload(self.shelf.templates())
    }

    pub fn clear_templates(&self) -> Result<CmdResult> {
        commands::templates::clear(self.shelf.templates())
    }
}
