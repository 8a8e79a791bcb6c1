//! # Domain Model: Fonts and Report Templates
//!
//! Two record types live in the shelf, both keyed by a unique `name`:
//!
//! - [`FontRecord`]: a font family made of up to four static font files
//!   (normal, bold, italic, bold-italic) plus the PDF embedding options the
//!   reporting engine needs.
//! - [`TemplateRecord`]: a report-definition document (JRXML) with optional
//!   description/category and creation/update timestamps.
//!
//! ## Style Fallback
//!
//! Only `normal_path` is mandatory. Rendering asks for a specific style and
//! gets the normal file whenever that style was not registered:
//!
//! ```text
//! bold        -> bold_path        ?? normal_path
//! italic      -> italic_path      ?? normal_path
//! bold-italic -> bold_italic_path ?? normal_path
//! ```
//!
//! ## Timestamps
//!
//! `created_at` is set by the first save of a name and never changes;
//! `updated_at` is refreshed by every save. The persistent store owns this
//! rule (see [`Record::merge_existing`]).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Encoding applied to fonts registered without an explicit one.
pub const DEFAULT_PDF_ENCODING: &str = "Identity-H";

/// Description given to templates adopted from the mirror directory.
pub const IMPORTED_DESCRIPTION: &str = "Imported from file system";

/// Anything the shelf can persist, cache, and reconcile.
pub trait Record: Clone + Send + Sync + 'static {
    /// The unique key of the record.
    fn name(&self) -> &str;

    /// Called on upsert when a row with the same name already exists, so
    /// immutable fields (e.g. creation time) survive the replacement.
    fn merge_existing(&mut self, _existing: &Self) {}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FontStyle {
    Normal,
    Bold,
    Italic,
    BoldItalic,
}

impl FontStyle {
    pub const ALL: [FontStyle; 4] = [
        FontStyle::Normal,
        FontStyle::Bold,
        FontStyle::Italic,
        FontStyle::BoldItalic,
    ];

    /// Parses a style name leniently. Unknown names resolve to `Normal`,
    /// matching how renderers ask for "regular", "plain" and friends.
    pub fn parse_lossy(input: &str) -> FontStyle {
        match input.trim().to_ascii_lowercase().as_str() {
            "bold" => FontStyle::Bold,
            "italic" => FontStyle::Italic,
            "bolditalic" | "bold-italic" | "bold_italic" => FontStyle::BoldItalic,
            _ => FontStyle::Normal,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            FontStyle::Normal => "Normal",
            FontStyle::Bold => "Bold",
            FontStyle::Italic => "Italic",
            FontStyle::BoldItalic => "Bold Italic",
        }
    }
}

impl fmt::Display for FontStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FontRecord {
    pub name: String,
    pub normal_path: String,
    pub bold_path: Option<String>,
    pub italic_path: Option<String>,
    pub bold_italic_path: Option<String>,
    pub pdf_encoding: String,
    pub pdf_embedded: bool,
}

impl FontRecord {
    pub fn new(name: impl Into<String>, normal_path: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            normal_path: normal_path.into(),
            bold_path: None,
            italic_path: None,
            bold_italic_path: None,
            pdf_encoding: DEFAULT_PDF_ENCODING.to_string(),
            pdf_embedded: true,
        }
    }

    pub fn with_bold(mut self, path: impl Into<String>) -> Self {
        self.bold_path = Some(path.into());
        self
    }

    pub fn with_italic(mut self, path: impl Into<String>) -> Self {
        self.italic_path = Some(path.into());
        self
    }

    pub fn with_bold_italic(mut self, path: impl Into<String>) -> Self {
        self.bold_italic_path = Some(path.into());
        self
    }

    pub fn with_encoding(mut self, encoding: impl Into<String>) -> Self {
        self.pdf_encoding = encoding.into();
        self
    }

    pub fn with_embedded(mut self, embedded: bool) -> Self {
        self.pdf_embedded = embedded;
        self
    }

    /// The path registered for exactly this style, without fallback.
    pub fn declared_path(&self, style: FontStyle) -> Option<&str> {
        match style {
            FontStyle::Normal => Some(self.normal_path.as_str()),
            FontStyle::Bold => self.bold_path.as_deref(),
            FontStyle::Italic => self.italic_path.as_deref(),
            FontStyle::BoldItalic => self.bold_italic_path.as_deref(),
        }
    }

    /// Every (style, path) pair this record declares, normal first.
    pub fn declared_paths(&self) -> Vec<(FontStyle, &str)> {
        FontStyle::ALL
            .iter()
            .filter_map(|style| self.declared_path(*style).map(|p| (*style, p)))
            .collect()
    }

    /// The path a renderer should use for `style`, falling back to normal.
    pub fn path_for(&self, style: FontStyle) -> &str {
        self.declared_path(style).unwrap_or(&self.normal_path)
    }
}

impl Record for FontRecord {
    fn name(&self) -> &str {
        &self.name
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplateRecord {
    pub name: String,
    pub content: String,
    pub description: Option<String>,
    pub category: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TemplateRecord {
    pub fn new(name: impl Into<String>, content: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            name: name.into(),
            content: content.into(),
            description: None,
            category: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }
}

impl Record for TemplateRecord {
    fn name(&self) -> &str {
        &self.name
    }

    fn merge_existing(&mut self, existing: &Self) {
        self.created_at = existing.created_at;
    }
}

/// The mutable part of a template, as supplied by a caller.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TemplateDraft {
    pub name: String,
    pub content: String,
    pub description: Option<String>,
    pub category: Option<String>,
}

impl TemplateDraft {
    pub fn new(name: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            content: content.into(),
            ..Default::default()
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    /// Stamps the draft. Both timestamps start at `now`; the store keeps the
    /// original `created_at` when the name already exists.
    pub fn into_record(self, now: DateTime<Utc>) -> TemplateRecord {
        TemplateRecord {
            name: self.name,
            content: self.content,
            description: self.description,
            category: self.category,
            created_at: now,
            updated_at: now,
        }
    }
}
