use super::reconcile::{ReconcileIssue, TemplateReconcileReport};
use crate::error::{Result, ShelfError};
use crate::model::{TemplateDraft, TemplateRecord, IMPORTED_DESCRIPTION};
use crate::store::cache::RecordCache;
use crate::store::mirror::Mirror;
use crate::store::Table;
use crate::validation::{validate_template_content, validate_template_name};
use chrono::Utc;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use std::path::PathBuf;
use std::sync::{Mutex, MutexGuard};
use tracing::{debug, info, warn};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplateStatistics {
    pub total_templates: usize,
    pub categories: usize,
    pub category_counts: BTreeMap<String, usize>,
}

/// Report templates held in the table, the cache and the mirror directory.
///
/// The mirror file for a name exists exactly when the cache holds that name.
/// Mirror writes are best-effort: a failure is logged and never rolls back
/// the table and cache writes that preceded it.
///
/// Stored rows whose names fail template name validation (rows added to the
/// table by hand) are never cached and never touch the mirror.
pub struct TemplateManager<T, M> {
    table: T,
    cache: RecordCache<TemplateRecord>,
    mirror: M,
    write_lock: Mutex<()>,
    initialized: Mutex<bool>,
}

impl<T: Table<TemplateRecord>, M: Mirror> TemplateManager<T, M> {
    pub fn new(table: T, mirror: M) -> Self {
        Self {
            table,
            cache: RecordCache::new(),
            mirror,
            write_lock: Mutex::new(()),
            initialized: Mutex::new(false),
        }
    }

    pub fn table(&self) -> &T {
        &self.table
    }

    pub fn mirror(&self) -> &M {
        &self.mirror
    }

    fn lock_writes(&self) -> MutexGuard<'_, ()> {
        self.write_lock.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Runs startup reconciliation once. Later calls return `Ok(None)`.
    pub fn init(&self) -> Result<Option<TemplateReconcileReport>> {
        let mut initialized = self.initialized.lock().unwrap_or_else(|e| e.into_inner());
        if *initialized {
            return Ok(None);
        }
        let report = self.reconcile()?;
        *initialized = true;
        Ok(Some(report))
    }

    pub fn is_initialized(&self) -> bool {
        *self.initialized.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn reconcile(&self) -> Result<TemplateReconcileReport> {
        let _guard = self.lock_writes();
        self.table.ensure_schema()?;
        if let Err(e) = self.mirror.ensure_root() {
            warn!(error = %e, "cannot create template mirror directory");
        }

        let mut report = TemplateReconcileReport::default();

        // Store is authoritative: every mirrorable row is cached and its file rewritten.
        for template in self.table.list_all()? {
            if let Err(e) = validate_template_name(&template.name) {
                warn!(template = %template.name, error = %e, "skipping stored template");
                report.skipped.push(ReconcileIssue::new(template.name, e));
                continue;
            }
            report.loaded += 1;
            match self.mirror.write(&template.name, &template.content) {
                Ok(()) => report.mirrored += 1,
                Err(e) => {
                    warn!(template = %template.name, error = %e, "failed to mirror template");
                    report
                        .mirror_failures
                        .push(ReconcileIssue::new(template.name.clone(), e));
                }
            }
            debug!(template = %template.name, "loaded template");
            self.cache.insert(template);
        }

        // Files with no row are adopted through the normal save path.
        let names = match self.mirror.list_names() {
            Ok(names) => names,
            Err(e) => {
                warn!(error = %e, "cannot scan template mirror directory");
                Vec::new()
            }
        };
        for name in names {
            if self.cache.contains(&name) {
                continue;
            }
            match self.import_locked(&name) {
                Ok(true) => {
                    info!(template = %name, "imported template from file system");
                    report.imported.push(name);
                }
                Ok(false) => {}
                Err(e) => {
                    warn!(template = %name, error = %e, "failed to import template");
                    report.import_failures.push(ReconcileIssue::new(name, e));
                }
            }
        }

        info!(
            loaded = report.loaded,
            imported = report.imported.len(),
            cached = self.cache.len(),
            "template manager initialized"
        );
        Ok(report)
    }

    fn import_locked(&self, name: &str) -> Result<bool> {
        let Some(content) = self.mirror.read(name)? else {
            return Ok(false);
        };
        let draft = TemplateDraft::new(name, content).with_description(IMPORTED_DESCRIPTION);
        validate_draft(&draft)?;
        self.save_locked(draft)?;
        Ok(true)
    }

    /// Stores a new template. Fails with `Conflict` when the name is taken.
    pub fn create(&self, draft: TemplateDraft) -> Result<TemplateRecord> {
        validate_draft(&draft)?;
        let _guard = self.lock_writes();
        if self.table.exists(&draft.name)? {
            return Err(ShelfError::Conflict(format!("template '{}'", draft.name)));
        }
        self.save_locked(draft)
    }

    /// Overwrites a stored template. Fails with `NotFound` when absent.
    pub fn replace(&self, draft: TemplateDraft) -> Result<TemplateRecord> {
        validate_draft(&draft)?;
        let _guard = self.lock_writes();
        if !self.table.exists(&draft.name)? {
            return Err(ShelfError::NotFound(format!("template '{}'", draft.name)));
        }
        self.save_locked(draft)
    }

    /// Validates and upserts a template, returning it as stored.
    pub fn save(&self, draft: TemplateDraft) -> Result<TemplateRecord> {
        validate_draft(&draft)?;
        let _guard = self.lock_writes();
        self.save_locked(draft)
    }

    fn save_locked(&self, draft: TemplateDraft) -> Result<TemplateRecord> {
        let stored = self.table.upsert(&draft.into_record(Utc::now()))?;
        self.cache.insert(stored.clone());
        self.write_mirror(&stored);
        info!(template = %stored.name, "saved template");
        Ok(stored)
    }

    fn write_mirror(&self, template: &TemplateRecord) {
        if let Err(e) = self.mirror.write(&template.name, &template.content) {
            warn!(template = %template.name, error = %e, "failed to mirror template");
        }
    }

    fn remove_mirror(&self, name: &str) {
        if validate_template_name(name).is_err() {
            return;
        }
        if let Err(e) = self.mirror.remove(name) {
            warn!(template = %name, error = %e, "failed to remove template mirror file");
        }
    }

    /// Looks a template up in the cache, falling back to the table. A row
    /// found only in the table is cached and mirrored on the way out, unless
    /// its name is not a valid template name.
    pub fn get(&self, name: &str) -> Result<Option<TemplateRecord>> {
        if let Some(template) = self.cache.get(name) {
            return Ok(Some(template));
        }

        let _guard = self.lock_writes();
        if let Some(template) = self.cache.get(name) {
            return Ok(Some(template));
        }
        let Some(template) = self.table.get(name)? else {
            return Ok(None);
        };
        if let Err(e) = validate_template_name(&template.name) {
            warn!(template = %name, error = %e, "ignoring stored template");
            return Ok(None);
        }
        debug!(template = %name, "filled template cache from store");
        self.cache.insert(template.clone());
        self.write_mirror(&template);
        Ok(Some(template))
    }

    pub fn content(&self, name: &str) -> Result<Option<String>> {
        Ok(self.get(name)?.map(|t| t.content))
    }

    /// Path of the mirror file for `name`, if that file currently exists.
    pub fn mirror_path(&self, name: &str) -> Option<PathBuf> {
        if self.mirror.contains(name) {
            Some(self.mirror.path_of(name))
        } else {
            None
        }
    }

    /// All cached templates, ordered by name.
    pub fn list_all(&self) -> Vec<TemplateRecord> {
        self.cache.values()
    }

    pub fn list_by_category(&self, category: &str) -> Vec<TemplateRecord> {
        self.cache
            .values()
            .into_iter()
            .filter(|t| t.category.as_deref() == Some(category))
            .collect()
    }

    /// Distinct categories in use, sorted.
    pub fn categories(&self) -> Vec<String> {
        self.cache
            .values()
            .into_iter()
            .filter_map(|t| t.category)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    pub fn statistics(&self) -> TemplateStatistics {
        let templates = self.cache.values();
        let mut category_counts = BTreeMap::new();
        for category in templates.iter().filter_map(|t| t.category.as_ref()) {
            *category_counts.entry(category.clone()).or_insert(0) += 1;
        }
        TemplateStatistics {
            total_templates: templates.len(),
            categories: category_counts.len(),
            category_counts,
        }
    }

    pub fn exists(&self, name: &str) -> Result<bool> {
        if self.cache.contains(name) {
            return Ok(true);
        }
        self.table.exists(name)
    }

    pub fn count(&self) -> usize {
        self.cache.len()
    }

    /// Deletes a template, its mirror file and any compiled artifact.
    /// Returns false, with no side effects, when the table has no such row.
    pub fn delete(&self, name: &str) -> Result<bool> {
        let _guard = self.lock_writes();
        if !self.table.delete(name)? {
            return Ok(false);
        }
        self.cache.remove(name);
        self.remove_mirror(name);
        info!(template = %name, "deleted template");
        Ok(true)
    }

    /// Rebuilds the cache from the table and rewrites every mirror file.
    /// Files of names no longer stored are removed. Returns how many
    /// templates were loaded.
    pub fn reload(&self) -> Result<usize> {
        let _guard = self.lock_writes();
        let templates: Vec<TemplateRecord> = self
            .table
            .list_all()?
            .into_iter()
            .filter(|t| match validate_template_name(&t.name) {
                Ok(()) => true,
                Err(e) => {
                    warn!(template = %t.name, error = %e, "skipping stored template");
                    false
                }
            })
            .collect();
        let stored: BTreeSet<&str> = templates.iter().map(|t| t.name.as_str()).collect();

        for stale in self.cache.names() {
            if !stored.contains(stale.as_str()) {
                self.remove_mirror(&stale);
            }
        }

        self.cache.clear();
        for template in &templates {
            self.cache.insert(template.clone());
            self.write_mirror(template);
        }
        info!(count = templates.len(), "reloaded templates");
        Ok(templates.len())
    }

    /// Removes every template, returning how many rows were deleted.
    pub fn clear_all(&self) -> Result<u64> {
        let _guard = self.lock_writes();
        let removed = self.table.delete_all()?;
        for name in self.cache.names() {
            self.remove_mirror(&name);
        }
        self.cache.clear();
        info!(removed, "cleared all templates");
        Ok(removed)
    }
}

fn validate_draft(draft: &TemplateDraft) -> Result<()> {
    validate_template_name(&draft.name)?;
    validate_template_content(&draft.content)?;
    Ok(())
}
