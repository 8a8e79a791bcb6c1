//! # Command Layer
//!
//! Each command is a plain function over a registry that returns a
//! [`CmdResult`]. Commands never print, parse arguments or pick exit codes;
//! the CLI (or any other front end) decides how to render what they return.
//!
//! Typed requests ([`fonts::RegisterFontRequest`],
//! [`templates::SaveTemplateRequest`], [`templates::UpdateTemplateRequest`])
//! are checked with `validate()` before any registry call, so blank fields
//! never reach the core.
//!
//! ## Command Modules
//!
//! - [`fonts`]: list, show, register, remove, clear, path
//! - [`templates`]: list, show, create, update, save, delete, categories,
//!   statistics, reload, clear
//! - [`doctor`]: startup reconciliation and its report

use crate::model::{FontRecord, TemplateRecord};
use crate::registry::{StartupReport, TemplateStatistics};
use serde::Serialize;
use std::path::PathBuf;

pub mod doctor;
pub mod fonts;
pub mod templates;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageLevel {
    Info,
    Success,
    Warning,
    Error,
}

#[derive(Debug, Clone, Serialize)]
pub struct CmdMessage {
    pub level: MessageLevel,
    pub content: String,
}

impl CmdMessage {
    pub fn info(content: impl Into<String>) -> Self {
        Self {
            level: MessageLevel::Info,
            content: content.into(),
        }
    }

    pub fn success(content: impl Into<String>) -> Self {
        Self {
            level: MessageLevel::Success,
            content: content.into(),
        }
    }

    pub fn warning(content: impl Into<String>) -> Self {
        Self {
            level: MessageLevel::Warning,
            content: content.into(),
        }
    }

    pub fn error(content: impl Into<String>) -> Self {
        Self {
            level: MessageLevel::Error,
            content: content.into(),
        }
    }
}

#[derive(Debug, Default, Serialize)]
pub struct CmdResult {
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub fonts: Vec<FontRecord>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub templates: Vec<TemplateRecord>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub paths: Vec<PathBuf>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub categories: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub statistics: Option<TemplateStatistics>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub report: Option<StartupReport>,
    pub messages: Vec<CmdMessage>,
}

impl CmdResult {
    pub fn add_message(&mut self, message: CmdMessage) {
        self.messages.push(message);
    }

    pub fn with_fonts(mut self, fonts: Vec<FontRecord>) -> Self {
        self.fonts = fonts;
        self
    }

    pub fn with_templates(mut self, templates: Vec<TemplateRecord>) -> Self {
        self.templates = templates;
        self
    }

    pub fn with_paths(mut self, paths: Vec<PathBuf>) -> Self {
        self.paths = paths;
        self
    }

    pub fn with_categories(mut self, categories: Vec<String>) -> Self {
        self.categories = categories;
        self
    }

    pub fn with_message(mut self, message: CmdMessage) -> Self {
        self.messages.push(message);
        self
    }
}
