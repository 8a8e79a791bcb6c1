use super::reconcile::{FontReconcileReport, ReconcileIssue};
use crate::error::Result;
use crate::model::{FontRecord, FontStyle};
use crate::notifier::FontSetNotifier;
use crate::store::cache::RecordCache;
use crate::store::Table;
use crate::validation::{validate_font_name, validate_font_record};
use std::sync::{Mutex, MutexGuard};
use tracing::{debug, info, warn};

/// Registered font families.
///
/// After [`init`](Self::init) the cache is authoritative for reads: there is
/// no read-through to the table. Every mutation runs validate → table →
/// cache → notifier while holding the registry's write lock, so the cache and
/// the notifier always observe mutations in the order the table applied them.
pub struct FontRegistry<T, N> {
    table: T,
    cache: RecordCache<FontRecord>,
    notifier: N,
    write_lock: Mutex<()>,
    initialized: Mutex<bool>,
}

impl<T: Table<FontRecord>, N: FontSetNotifier> FontRegistry<T, N> {
    pub fn new(table: T, notifier: N) -> Self {
        Self {
            table,
            cache: RecordCache::new(),
            notifier,
            write_lock: Mutex::new(()),
            initialized: Mutex::new(false),
        }
    }

    pub fn table(&self) -> &T {
        &self.table
    }

    pub fn notifier(&self) -> &N {
        &self.notifier
    }

    fn lock_writes(&self) -> MutexGuard<'_, ()> {
        self.write_lock.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Runs startup reconciliation once. Later calls return `Ok(None)`.
    ///
    /// A failed reconciliation leaves the registry uninitialized so that a
    /// retry runs it again.
    pub fn init(&self) -> Result<Option<FontReconcileReport>> {
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

    fn reconcile(&self) -> Result<FontReconcileReport> {
        let _guard = self.lock_writes();
        self.table.ensure_schema()?;
        let rows = self.table.list_all()?;
        debug!(rows = rows.len(), "loading persisted fonts");

        let mut report = FontReconcileReport::default();
        for font in rows {
            match validate_font_record(&font) {
                Ok(()) => {
                    debug!(font = %font.name, "loaded font");
                    self.cache.insert(font);
                    report.loaded += 1;
                }
                Err(reason) => {
                    warn!(font = %font.name, %reason, "purging font with invalid files");
                    if let Err(e) = self.table.delete(&font.name) {
                        warn!(font = %font.name, error = %e, "failed to purge font row");
                    }
                    report.purged.push(ReconcileIssue::new(font.name, reason));
                }
            }
        }

        if !self.cache.is_empty() {
            report.notified = self.notify_current();
        }
        info!(
            loaded = report.loaded,
            purged = report.purged.len(),
            "font registry initialized"
        );
        Ok(report)
    }

    /// Validates and upserts a font, returning it as stored.
    pub fn save(&self, font: FontRecord) -> Result<FontRecord> {
        validate_font_name(&font.name)?;
        validate_font_record(&font)?;

        let _guard = self.lock_writes();
        let stored = self.table.upsert(&font)?;
        self.cache.insert(stored.clone());
        self.notify_current();
        info!(font = %stored.name, "registered font");
        Ok(stored)
    }

    pub fn get(&self, name: &str) -> Option<FontRecord> {
        self.cache.get(name)
    }

    /// All cached fonts, ordered by name.
    pub fn list_all(&self) -> Vec<FontRecord> {
        self.cache.values()
    }

    pub fn is_registered(&self, name: &str) -> bool {
        self.cache.contains(name)
    }

    pub fn count(&self) -> usize {
        self.cache.len()
    }

    /// Deletes a font. Returns false, with no side effects, when the table
    /// has no such row.
    pub fn delete(&self, name: &str) -> Result<bool> {
        let _guard = self.lock_writes();
        if !self.table.delete(name)? {
            return Ok(false);
        }
        self.cache.remove(name);
        self.notify_current();
        info!(font = %name, "removed font");
        Ok(true)
    }

    /// Removes every font, returning how many rows were deleted.
    pub fn clear_all(&self) -> Result<u64> {
        let _guard = self.lock_writes();
        let removed = self.table.delete_all()?;
        self.cache.clear();
        if let Err(e) = self.notifier.remove_all() {
            warn!(error = %e, "font notifier failed to remove artifacts");
        }
        info!(removed, "cleared all fonts");
        Ok(removed)
    }

    /// The file a renderer should load for `style`, falling back to the
    /// normal file for styles the font does not declare.
    pub fn file_path(&self, name: &str, style: FontStyle) -> Option<String> {
        self.cache
            .get(name)
            .map(|font| font.path_for(style).to_string())
    }

    /// Hands the current set to the notifier. Must be called with the write
    /// lock held. Returns whether the notifier succeeded.
    fn notify_current(&self) -> bool {
        let fonts = self.cache.values();
        let outcome = if fonts.is_empty() {
            self.notifier.remove_all()
        } else {
            self.notifier.regenerate(&fonts)
        };
        match outcome {
            Ok(()) => true,
            Err(e) => {
                warn!(error = %e, fonts = fonts.len(), "font notifier failed");
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::notifier::{NotifierCall, RecordingNotifier};
    use crate::store::memory::MemTable;
    use std::fs;
    use std::path::Path;
    use tempfile::TempDir;

    type TestRegistry = FontRegistry<MemTable<FontRecord>, RecordingNotifier>;

    fn font_file(dir: &Path, name: &str) -> String {
        let path = dir.join(name);
        fs::write(&path, b"\x00\x01\x00\x00").unwrap();
        path.to_string_lossy().into_owned()
    }

    fn registry() -> TestRegistry {
        let registry = FontRegistry::new(MemTable::new(), RecordingNotifier::new());
        registry.init().unwrap();
        registry
    }

    #[test]
    fn save_then_get_returns_equal_record() {
        let dir = TempDir::new().unwrap();
        let registry = registry();
        let font = FontRecord::new("Acme", font_file(dir.path(), "acme.ttf"));

        let stored = registry.save(font.clone()).unwrap();

        assert_eq!(stored, font);
        assert_eq!(registry.get("Acme"), Some(font.clone()));
        assert_eq!(registry.table().get("Acme").unwrap(), Some(font));
        assert_eq!(registry.get("Acme").unwrap().pdf_encoding, "Identity-H");
    }

    #[test]
    fn save_twice_keeps_one_record_with_latest_paths() {
        let dir = TempDir::new().unwrap();
        let registry = registry();
        let a = font_file(dir.path(), "a.ttf");
        let b = font_file(dir.path(), "b.ttf");

        registry.save(FontRecord::new("Acme", &a)).unwrap();
        let before = registry.count();
        registry.save(FontRecord::new("Acme", &b)).unwrap();

        assert_eq!(registry.count(), before);
        assert_eq!(registry.table().count().unwrap(), 1);
        assert_eq!(registry.get("Acme").unwrap().normal_path, b);
    }

    #[test]
    fn variable_font_is_rejected_without_side_effects() {
        let dir = TempDir::new().unwrap();
        let registry = registry();
        let path = font_file(dir.path(), "Foo[wght].ttf");

        let err = registry.save(FontRecord::new("Foo", path)).unwrap_err();

        assert_eq!(err.kind(), ErrorKind::Validation);
        assert!(registry.get("Foo").is_none());
        assert_eq!(registry.table().count().unwrap(), 0);
        assert!(registry.notifier().calls().is_empty());
    }

    #[test]
    fn bad_style_file_rejects_whole_registration() {
        let dir = TempDir::new().unwrap();
        let registry = registry();
        let font = FontRecord::new("Acme", font_file(dir.path(), "acme.ttf"))
            .with_italic(dir.path().join("gone.ttf").to_string_lossy());

        let err = registry.save(font).unwrap_err();
        assert!(err.to_string().contains("Italic font"));
        assert!(!registry.is_registered("Acme"));
    }

    #[test]
    fn persistence_failure_aborts_before_cache_and_notifier() {
        let dir = TempDir::new().unwrap();
        let registry = registry();
        registry.table().set_simulate_write_error(true);

        let err = registry
            .save(FontRecord::new("Acme", font_file(dir.path(), "acme.ttf")))
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::Persistence);
        assert!(registry.get("Acme").is_none());
        assert!(registry.notifier().calls().is_empty());
    }

    #[test]
    fn delete_unknown_is_false_without_notification() {
        let registry = registry();
        assert!(!registry.delete("nope").unwrap());
        assert!(registry.notifier().calls().is_empty());
    }

    #[test]
    fn delete_last_font_switches_notifier_to_remove_all() {
        let dir = TempDir::new().unwrap();
        let registry = registry();
        registry
            .save(FontRecord::new("Acme", font_file(dir.path(), "a.ttf")))
            .unwrap();
        registry
            .save(FontRecord::new("Beta", font_file(dir.path(), "b.ttf")))
            .unwrap();

        assert!(registry.delete("Acme").unwrap());
        assert_eq!(
            registry.notifier().last(),
            Some(NotifierCall::Regenerate(vec!["Beta".to_string()]))
        );

        assert!(registry.delete("Beta").unwrap());
        assert_eq!(registry.notifier().last(), Some(NotifierCall::RemoveAll));
        assert!(registry.get("Beta").is_none());
    }

    #[test]
    fn delete_persistence_failure_keeps_cache() {
        let dir = TempDir::new().unwrap();
        let registry = registry();
        registry
            .save(FontRecord::new("Acme", font_file(dir.path(), "a.ttf")))
            .unwrap();
        registry.table().set_simulate_write_error(true);

        assert!(registry.delete("Acme").is_err());
        assert!(registry.is_registered("Acme"));
    }

    #[test]
    fn notifier_failure_does_not_fail_save() {
        let dir = TempDir::new().unwrap();
        let registry = registry();
        registry.notifier().set_simulate_error(true);

        registry
            .save(FontRecord::new("Acme", font_file(dir.path(), "a.ttf")))
            .unwrap();
        assert!(registry.is_registered("Acme"));
        assert_eq!(registry.notifier().calls().len(), 1);
    }

    #[test]
    fn file_path_falls_back_to_normal() {
        let dir = TempDir::new().unwrap();
        let registry = registry();
        let normal = font_file(dir.path(), "n.ttf");
        let bold = font_file(dir.path(), "b.ttf");
        registry
            .save(FontRecord::new("Acme", &normal).with_bold(&bold))
            .unwrap();

        assert_eq!(registry.file_path("Acme", FontStyle::Bold), Some(bold));
        assert_eq!(
            registry.file_path("Acme", FontStyle::Italic),
            Some(normal.clone())
        );
        assert_eq!(
            registry.file_path("Acme", FontStyle::parse_lossy("bolditalic")),
            Some(normal)
        );
        assert_eq!(registry.file_path("Other", FontStyle::Normal), None);
    }

    #[test]
    fn clear_all_empties_everything() {
        let dir = TempDir::new().unwrap();
        let registry = registry();
        for name in ["A", "B"] {
            registry
                .save(FontRecord::new(name, font_file(dir.path(), &format!("{name}.ttf"))))
                .unwrap();
        }

        assert_eq!(registry.clear_all().unwrap(), 2);
        assert_eq!(registry.count(), 0);
        assert_eq!(registry.table().count().unwrap(), 0);
        assert_eq!(registry.notifier().last(), Some(NotifierCall::RemoveAll));
    }

    #[test]
    fn init_purges_rows_whose_files_vanished() {
        let dir = TempDir::new().unwrap();
        let table = MemTable::new();
        let kept = font_file(dir.path(), "kept.ttf");
        let gone = font_file(dir.path(), "gone.ttf");
        table.insert_raw(FontRecord::new("Kept", &kept));
        table.insert_raw(FontRecord::new("Gone", &gone));
        fs::remove_file(&gone).unwrap();

        let registry = FontRegistry::new(table, RecordingNotifier::new());
        let report = registry.init().unwrap().unwrap();

        assert_eq!(report.loaded, 1);
        assert_eq!(report.purged.len(), 1);
        assert_eq!(report.purged[0].name, "Gone");
        assert!(report.notified);
        assert!(registry.get("Gone").is_none());
        assert!(!registry.table().exists("Gone").unwrap());
        assert_eq!(
            registry.notifier().calls(),
            vec![NotifierCall::Regenerate(vec!["Kept".to_string()])]
        );
    }

    #[test]
    fn init_with_no_surviving_fonts_does_not_notify() {
        let registry = FontRegistry::new(MemTable::new(), RecordingNotifier::new());
        let report = registry.init().unwrap().unwrap();
        assert!(!report.notified);
        assert!(registry.notifier().calls().is_empty());
    }

    #[test]
    fn init_runs_once() {
        let registry = FontRegistry::new(MemTable::new(), RecordingNotifier::new());
        assert!(registry.init().unwrap().is_some());
        assert!(registry.init().unwrap().is_none());
        assert!(registry.is_initialized());
    }

    #[test]
    fn failed_init_can_be_retried() {
        let table = MemTable::<FontRecord>::new();
        table.set_simulate_read_error(true);
        let registry = FontRegistry::new(table, RecordingNotifier::new());

        assert!(registry.init().is_err());
        assert!(!registry.is_initialized());

        registry.table().set_simulate_read_error(false);
        assert!(registry.init().unwrap().is_some());
    }

    #[test]
    fn list_all_is_sorted() {
        let dir = TempDir::new().unwrap();
        let registry = registry();
        for name in ["Zed", "Alpha"] {
            registry
                .save(FontRecord::new(name, font_file(dir.path(), &format!("{name}.otf"))))
                .unwrap();
        }
        let names: Vec<_> = registry.list_all().into_iter().map(|f| f.name).collect();
        assert_eq!(names, vec!["Alpha", "Zed"]);
    }
}
