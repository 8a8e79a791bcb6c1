use crate::blobs::FontBlobStore;
use crate::commands::{CmdMessage, CmdResult};
use crate::error::{Result, ShelfError};
use crate::model::{FontRecord, FontStyle};
use crate::notifier::FontSetNotifier;
use crate::registry::FontRegistry;
use crate::store::Table;
use crate::validation::validate_font_record;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// A font registration as received from a client.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterFontRequest {
    pub name: String,
    pub normal_path: String,
    #[serde(default)]
    pub bold_path: Option<String>,
    #[serde(default)]
    pub italic_path: Option<String>,
    #[serde(default)]
    pub bold_italic_path: Option<String>,
    #[serde(default)]
    pub pdf_encoding: Option<String>,
    #[serde(default)]
    pub pdf_embedded: Option<bool>,
    /// Copy the files into the font store and register the copies.
    #[serde(default)]
    pub copy_to_store: bool,
}

impl RegisterFontRequest {
    pub fn new(name: impl Into<String>, normal_path: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            normal_path: normal_path.into(),
            ..Default::default()
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(ShelfError::Validation("font name is required".into()));
        }
        if self.normal_path.trim().is_empty() {
            return Err(ShelfError::Validation("normal font path is required".into()));
        }
        let optional = [
            (FontStyle::Bold, &self.bold_path),
            (FontStyle::Italic, &self.italic_path),
            (FontStyle::BoldItalic, &self.bold_italic_path),
        ];
        for (style, path) in optional {
            if path.as_deref().is_some_and(|p| p.trim().is_empty()) {
                return Err(ShelfError::Validation(format!(
                    "{} font path cannot be blank",
                    style
                )));
            }
        }
        if self
            .pdf_encoding
            .as_deref()
            .is_some_and(|e| e.trim().is_empty())
        {
            return Err(ShelfError::Validation("pdf encoding cannot be blank".into()));
        }
        Ok(())
    }

    pub fn into_record(self) -> FontRecord {
        let mut font = FontRecord::new(self.name, self.normal_path);
        font.bold_path = self.bold_path;
        font.italic_path = self.italic_path;
        font.bold_italic_path = self.bold_italic_path;
        if let Some(encoding) = self.pdf_encoding {
            font.pdf_encoding = encoding;
        }
        if let Some(embedded) = self.pdf_embedded {
            font.pdf_embedded = embedded;
        }
        font
    }
}

pub fn list<T: Table<FontRecord>, N: FontSetNotifier>(fonts: &FontRegistry<T, N>) -> CmdResult {
    let listed = fonts.list_all();
    let mut result = CmdResult::default();
    if listed.is_empty() {
        result.add_message(CmdMessage::info("No fonts registered."));
    }
    result.with_fonts(listed)
}

pub fn show<T: Table<FontRecord>, N: FontSetNotifier>(
    fonts: &FontRegistry<T, N>,
    name: &str,
) -> Result<CmdResult> {
    let font = fonts
        .get(name)
        .ok_or_else(|| ShelfError::NotFound(format!("font '{}'", name)))?;
    Ok(CmdResult::default().with_fonts(vec![font]))
}

pub fn register<T: Table<FontRecord>, N: FontSetNotifier>(
    fonts: &FontRegistry<T, N>,
    blobs: &FontBlobStore,
    request: RegisterFontRequest,
) -> Result<CmdResult> {
    request.validate()?;
    let copy = request.copy_to_store;
    let mut font = request.into_record();

    if copy {
        // Refuse before copying so rejected files never land in the store.
        validate_font_record(&font)?;
        font = copy_into_store(blobs, font)?;
    }

    let replaced = fonts.is_registered(&font.name);
    let stored = fonts.save(font)?;
    let verb = if replaced { "Updated" } else { "Registered" };
    let message = CmdMessage::success(format!("{} font '{}'.", verb, stored.name));
    Ok(CmdResult::default()
        .with_fonts(vec![stored])
        .with_message(message))
}

fn copy_into_store(blobs: &FontBlobStore, mut font: FontRecord) -> Result<FontRecord> {
    font.normal_path = stored_path(blobs, &font.normal_path)?;
    for slot in [
        &mut font.bold_path,
        &mut font.italic_path,
        &mut font.bold_italic_path,
    ] {
        if let Some(path) = slot.as_mut() {
            *path = stored_path(blobs, path)?;
        }
    }
    Ok(font)
}

fn stored_path(blobs: &FontBlobStore, source: &str) -> Result<String> {
    let stored = blobs.import(Path::new(source))?;
    Ok(stored.to_string_lossy().into_owned())
}

pub fn remove<T: Table<FontRecord>, N: FontSetNotifier>(
    fonts: &FontRegistry<T, N>,
    name: &str,
) -> Result<CmdResult> {
    if !fonts.delete(name)? {
        return Err(ShelfError::NotFound(format!("font '{}'", name)));
    }
    Ok(CmdResult::default().with_message(CmdMessage::success(format!(
        "Removed font '{}'.",
        name
    ))))
}

/// Removes every font. With `purge_files`, uploaded font files go too.
pub fn clear<T: Table<FontRecord>, N: FontSetNotifier>(
    fonts: &FontRegistry<T, N>,
    blobs: &FontBlobStore,
    purge_files: bool,
) -> Result<CmdResult> {
    let removed = fonts.clear_all()?;
    let mut result = CmdResult::default().with_message(CmdMessage::success(format!(
        "Cleared {} font(s).",
        removed
    )));
    if purge_files {
        let files = blobs.clear()?;
        result.add_message(CmdMessage::info(format!(
            "Deleted {} stored font file(s).",
            files
        )));
    }
    Ok(result)
}

pub fn path<T: Table<FontRecord>, N: FontSetNotifier>(
    fonts: &FontRegistry<T, N>,
    name: &str,
    style: FontStyle,
) -> Result<CmdResult> {
    let path = fonts
        .file_path(name, style)
        .ok_or_else(|| ShelfError::NotFound(format!("font '{}'", name)))?;
    Ok(CmdResult::default().with_paths(vec![PathBuf::from(path)]))
}
