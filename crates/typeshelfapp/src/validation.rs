//! Admission rules run before any mutation reaches the store.
//!
//! ## Fonts
//!
//! Every declared font file must:
//! - exist and be a readable regular file
//! - carry one of the [`FONT_EXTENSIONS`] (case-insensitive)
//! - not contain `[` or `]` in its file name. Variable fonts ship as
//!   `Family[wght].ttf`, and the rendering engine only handles static files.
//!
//! A single failing style rejects the whole registration.
//!
//! ## Templates
//!
//! Template content is checked for the presence of the opening and closing
//! `jasperReport` root markers. This is a presence check only: it does not
//! parse the document, so malformed XML between the markers passes.
//!
//! ## Names
//!
//! Template names become file names in the mirror directory, so they may not
//! contain path separators or parent references, and are capped at
//! [`MAX_TEMPLATE_NAME_BYTES`] bytes. Font names are free-form but must not be
//! blank.

use crate::model::{FontRecord, FontStyle};
use std::fmt;
use std::fs::File;
use std::path::{Path, PathBuf};

pub const FONT_EXTENSIONS: &[&str] = &["ttf", "otf", "ttc"];

pub const TEMPLATE_OPEN_MARKER: &str = "<jasperReport";
pub const TEMPLATE_CLOSE_MARKER: &str = "</jasperReport>";

/// Column width of the `name` primary key in both tables.
pub const MAX_NAME_LEN: usize = 255;

/// Byte budget for a template name. A mirror file is `<name>.<extension>`
/// and most file systems cap a file name at 255 bytes, so this leaves room
/// for an extension of up to 14 bytes.
pub const MAX_TEMPLATE_NAME_BYTES: usize = 240;

/// Why a single font file was refused.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FontFileError {
    Missing(PathBuf),
    NotAFile(PathBuf),
    Unreadable(PathBuf),
    UnsupportedExtension { path: PathBuf, extension: String },
    VariableFont(PathBuf),
}

impl fmt::Display for FontFileError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FontFileError::Missing(p) => write!(f, "font file not found: {}", p.display()),
            FontFileError::NotAFile(p) => write!(f, "not a regular file: {}", p.display()),
            FontFileError::Unreadable(p) => {
                write!(f, "font file is not readable: {}", p.display())
            }
            FontFileError::UnsupportedExtension { extension, .. } => write!(
                f,
                "invalid font file type: '{}' (must be .ttf, .otf, or .ttc)",
                extension
            ),
            FontFileError::VariableFont(p) => write!(
                f,
                "variable fonts are not supported, use static font files: {}",
                p.file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_else(|| p.display().to_string())
            ),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FontValidationError {
    BlankPath(FontStyle),
    File {
        style: FontStyle,
        error: FontFileError,
    },
}

impl fmt::Display for FontValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FontValidationError::BlankPath(style) => {
                write!(f, "{} font: path cannot be blank", style)
            }
            FontValidationError::File { style, error } => write!(f, "{} font: {}", style, error),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TemplateValidationError {
    MissingOpenMarker,
    MissingCloseMarker,
}

impl fmt::Display for TemplateValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TemplateValidationError::MissingOpenMarker => {
                write!(f, "invalid JRXML content: missing {}", TEMPLATE_OPEN_MARKER)
            }
            TemplateValidationError::MissingCloseMarker => {
                write!(f, "invalid JRXML content: missing {}", TEMPLATE_CLOSE_MARKER)
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NameValidationError {
    Blank,
    TooLong(usize),
    TooManyBytes(usize),
    PathSeparator(char),
    ParentReference,
    Hidden,
}

impl fmt::Display for NameValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NameValidationError::Blank => write!(f, "name cannot be blank"),
            NameValidationError::TooLong(len) => {
                write!(f, "name is {} characters long (max {})", len, MAX_NAME_LEN)
            }
            NameValidationError::TooManyBytes(len) => write!(
                f,
                "name is {} bytes long (max {} for a template file name)",
                len, MAX_TEMPLATE_NAME_BYTES
            ),
            NameValidationError::PathSeparator(c) => {
                write!(f, "name cannot contain path separator '{}'", c)
            }
            NameValidationError::ParentReference => write!(f, "name cannot contain '..'"),
            NameValidationError::Hidden => write!(f, "name cannot start with '.'"),
        }
    }
}

/// True when the file name does not carry variable-axis brackets.
pub fn is_static_font(path: &Path) -> bool {
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    !file_name.contains('[') && !file_name.contains(']')
}

/// Checks one font file on disk.
pub fn validate_font_file(path: &Path) -> Result<(), FontFileError> {
    let meta = match std::fs::metadata(path) {
        Ok(meta) => meta,
        Err(_) => return Err(FontFileError::Missing(path.to_path_buf())),
    };
    if !meta.is_file() {
        return Err(FontFileError::NotAFile(path.to_path_buf()));
    }
    if File::open(path).is_err() {
        return Err(FontFileError::Unreadable(path.to_path_buf()));
    }

    let extension = path
        .extension()
        .map(|e| e.to_string_lossy().to_ascii_lowercase())
        .unwrap_or_default();
    if !FONT_EXTENSIONS.contains(&extension.as_str()) {
        return Err(FontFileError::UnsupportedExtension {
            path: path.to_path_buf(),
            extension,
        });
    }

    if !is_static_font(path) {
        return Err(FontFileError::VariableFont(path.to_path_buf()));
    }

    Ok(())
}

/// Checks every file a font record declares. The first failure wins.
pub fn validate_font_record(font: &FontRecord) -> Result<(), FontValidationError> {
    for (style, path) in font.declared_paths() {
        if path.trim().is_empty() {
            return Err(FontValidationError::BlankPath(style));
        }
        validate_font_file(Path::new(path))
            .map_err(|error| FontValidationError::File { style, error })?;
    }
    Ok(())
}

pub fn validate_template_content(content: &str) -> Result<(), TemplateValidationError> {
    if !content.contains(TEMPLATE_OPEN_MARKER) {
        return Err(TemplateValidationError::MissingOpenMarker);
    }
    if !content.contains(TEMPLATE_CLOSE_MARKER) {
        return Err(TemplateValidationError::MissingCloseMarker);
    }
    Ok(())
}

pub fn validate_font_name(name: &str) -> Result<(), NameValidationError> {
    if name.trim().is_empty() {
        return Err(NameValidationError::Blank);
    }
    let len = name.chars().count();
    if len > MAX_NAME_LEN {
        return Err(NameValidationError::TooLong(len));
    }
    Ok(())
}

/// Template names map 1:1 to files in the mirror directory.
pub fn validate_template_name(name: &str) -> Result<(), NameValidationError> {
    validate_font_name(name)?;
    if name.len() > MAX_TEMPLATE_NAME_BYTES {
        return Err(NameValidationError::TooManyBytes(name.len()));
    }
    if let Some(c) = name.chars().find(|c| matches!(c, '/' | '\\')) {
        return Err(NameValidationError::PathSeparator(c));
    }
    if name.contains("..") {
        return Err(NameValidationError::ParentReference);
    }
    if name.starts_with('.') {
        return Err(NameValidationError::Hidden);
    }
    Ok(())
}
