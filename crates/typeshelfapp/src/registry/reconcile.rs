//! Reports produced by the startup reconciliation of each registry.

use serde::Serialize;

/// A record the reconciler could not keep, and why.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReconcileIssue {
    pub name: String,
    pub reason: String,
}

impl ReconcileIssue {
    pub fn new(name: impl Into<String>, reason: impl ToString) -> Self {
        Self {
            name: name.into(),
            reason: reason.to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FontReconcileReport {
    /// Fonts that passed validation and are now cached.
    pub loaded: usize,
    /// Fonts deleted from the store because their files no longer validate.
    pub purged: Vec<ReconcileIssue>,
    /// Whether the notifier accepted the surviving set.
    pub notified: bool,
}

impl FontReconcileReport {
    pub fn is_clean(&self) -> bool {
        self.purged.is_empty()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TemplateReconcileReport {
    /// Rows loaded from the store into the cache.
    pub loaded: usize,
    /// Mirror files rewritten from stored rows.
    pub mirrored: usize,
    pub mirror_failures: Vec<ReconcileIssue>,
    /// Stored rows left uncached because their names cannot be mirror files.
    pub skipped: Vec<ReconcileIssue>,
    /// Names adopted from files that had no stored row.
    pub imported: Vec<String>,
    pub import_failures: Vec<ReconcileIssue>,
}

impl TemplateReconcileReport {
    pub fn is_clean(&self) -> bool {
        self.imported.is_empty()
            && self.mirror_failures.is_empty()
            && self.import_failures.is_empty()
            && self.skipped.is_empty()
    }
}

/// Both registries' reconciliation results. `None` means that registry had
/// already been initialized by this process.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct StartupReport {
    pub fonts: Option<FontReconcileReport>,
    pub templates: Option<TemplateReconcileReport>,
}

impl StartupReport {
    pub fn already_initialized(&self) -> bool {
        self.fonts.is_none() && self.templates.is_none()
    }

    pub fn is_clean(&self) -> bool {
        self.fonts.as_ref().map_or(true, FontReconcileReport::is_clean)
            && self
                .templates
                .as_ref()
                .map_or(true, TemplateReconcileReport::is_clean)
    }
}
