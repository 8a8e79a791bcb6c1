use super::mirror::Mirror;
use super::Table;
use crate::error::{Result, ShelfError};
use crate::model::Record;
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, RwLock};

fn simulated(what: &str) -> ShelfError {
    ShelfError::Persistence(format!("Simulated {} error", what))
}

fn poisoned() -> ShelfError {
    ShelfError::Persistence("memory store lock poisoned".to_string())
}

/// In-memory table for testing registry logic without a database.
///
/// Behaves like the SQLite table: name-keyed upsert that keeps immutable
/// columns of an existing row, rows listed in name order.
pub struct MemTable<R> {
    rows: RwLock<BTreeMap<String, R>>,
    fail_writes: AtomicBool,
    fail_reads: AtomicBool,
}

impl<R> Default for MemTable<R> {
    fn default() -> Self {
        Self {
            rows: RwLock::new(BTreeMap::new()),
            fail_writes: AtomicBool::new(false),
            fail_reads: AtomicBool::new(false),
        }
    }
}

impl<R: Record> MemTable<R> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Enable write error simulation for testing abort paths.
    pub fn set_simulate_write_error(&self, simulate: bool) {
        self.fail_writes.store(simulate, Ordering::SeqCst);
    }

    pub fn set_simulate_read_error(&self, simulate: bool) {
        self.fail_reads.store(simulate, Ordering::SeqCst);
    }

    /// Inserts a row directly, bypassing validation (a row "added by hand").
    pub fn insert_raw(&self, record: R) {
        if let Ok(mut rows) = self.rows.write() {
            rows.insert(record.name().to_string(), record);
        }
    }

    fn check_write(&self) -> Result<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(simulated("write"));
        }
        Ok(())
    }

    fn check_read(&self) -> Result<()> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(simulated("read"));
        }
        Ok(())
    }
}

impl<R: Record> Table<R> for MemTable<R> {
    fn ensure_schema(&self) -> Result<()> {
        self.check_write()
    }

    fn upsert(&self, record: &R) -> Result<R> {
        self.check_write()?;
        let mut rows = self.rows.write().map_err(|_| poisoned())?;
        let mut stored = record.clone();
        if let Some(existing) = rows.get(record.name()) {
            stored.merge_existing(existing);
        }
        rows.insert(stored.name().to_string(), stored.clone());
        Ok(stored)
    }

    fn get(&self, name: &str) -> Result<Option<R>> {
        self.check_read()?;
        let rows = self.rows.read().map_err(|_| poisoned())?;
        Ok(rows.get(name).cloned())
    }

    fn list_all(&self) -> Result<Vec<R>> {
        self.check_read()?;
        let rows = self.rows.read().map_err(|_| poisoned())?;
        Ok(rows.values().cloned().collect())
    }

    fn exists(&self, name: &str) -> Result<bool> {
        self.check_read()?;
        let rows = self.rows.read().map_err(|_| poisoned())?;
        Ok(rows.contains_key(name))
    }

    fn count(&self) -> Result<u64> {
        self.check_read()?;
        let rows = self.rows.read().map_err(|_| poisoned())?;
        Ok(rows.len() as u64)
    }

    fn delete(&self, name: &str) -> Result<bool> {
        self.check_write()?;
        let mut rows = self.rows.write().map_err(|_| poisoned())?;
        Ok(rows.remove(name).is_some())
    }

    fn delete_all(&self) -> Result<u64> {
        self.check_write()?;
        let mut rows = self.rows.write().map_err(|_| poisoned())?;
        let removed = rows.len() as u64;
        rows.clear();
        Ok(removed)
    }
}

/// In-memory mirror. Paths are synthetic (`memory://templates/<name>`).
#[derive(Default)]
pub struct MemMirror {
    files: Mutex<BTreeMap<String, String>>,
    fail_writes: AtomicBool,
}

impl MemMirror {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_simulate_write_error(&self, simulate: bool) {
        self.fail_writes.store(simulate, Ordering::SeqCst);
    }

    /// Places a file directly, as an external tool dropping it in would.
    pub fn insert_raw(&self, name: &str, content: &str) {
        if let Ok(mut files) = self.files.lock() {
            files.insert(name.to_string(), content.to_string());
        }
    }

    fn check_write(&self) -> Result<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(ShelfError::Io(std::io::Error::other(
                "Simulated mirror write error",
            )));
        }
        Ok(())
    }
}

impl Mirror for MemMirror {
    fn ensure_root(&self) -> Result<()> {
        Ok(())
    }

    fn write(&self, name: &str, content: &str) -> Result<()> {
        self.check_write()?;
        let mut files = self.files.lock().map_err(|_| poisoned())?;
        files.insert(name.to_string(), content.to_string());
        Ok(())
    }

    fn read(&self, name: &str) -> Result<Option<String>> {
        let files = self.files.lock().map_err(|_| poisoned())?;
        Ok(files.get(name).cloned())
    }

    fn remove(&self, name: &str) -> Result<bool> {
        self.check_write()?;
        let mut files = self.files.lock().map_err(|_| poisoned())?;
        Ok(files.remove(name).is_some())
    }

    fn list_names(&self) -> Result<Vec<String>> {
        let files = self.files.lock().map_err(|_| poisoned())?;
        Ok(files.keys().cloned().collect())
    }

    fn path_of(&self, name: &str) -> PathBuf {
        PathBuf::from(format!("memory://templates/{}", name))
    }

    fn contains(&self, name: &str) -> bool {
        self.files
            .lock()
            .map(|files| files.contains_key(name))
            .unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::model::{FontRecord, TemplateDraft, TemplateRecord};
    use chrono::{Duration, Utc};

    #[test]
    fn upsert_replaces_by_name() {
        let table = MemTable::<FontRecord>::new();
        table.upsert(&FontRecord::new("Acme", "/a.ttf")).unwrap();
        table.upsert(&FontRecord::new("Acme", "/b.ttf")).unwrap();

        assert_eq!(table.count().unwrap(), 1);
        assert_eq!(table.get("Acme").unwrap().unwrap().normal_path, "/b.ttf");
    }

    #[test]
    fn upsert_keeps_template_created_at() {
        let table = MemTable::<TemplateRecord>::new();
        let t0 = Utc::now() - Duration::minutes(5);
        table
            .upsert(&TemplateDraft::new("r", "v1").into_record(t0))
            .unwrap();
        let stored = table
            .upsert(&TemplateDraft::new("r", "v2").into_record(Utc::now()))
            .unwrap();

        assert_eq!(stored.created_at, t0);
        assert_eq!(stored.content, "v2");
    }

    #[test]
    fn simulated_write_error_leaves_rows_untouched() {
        let table = MemTable::<FontRecord>::new();
        table.upsert(&FontRecord::new("Acme", "/a.ttf")).unwrap();
        table.set_simulate_write_error(true);

        let err = table.upsert(&FontRecord::new("Acme", "/b.ttf")).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Persistence);
        assert!(table.delete("Acme").is_err());
        assert_eq!(table.get("Acme").unwrap().unwrap().normal_path, "/a.ttf");
    }

    #[test]
    fn simulated_read_error() {
        let table = MemTable::<FontRecord>::new();
        table.set_simulate_read_error(true);
        assert!(table.list_all().is_err());
        assert!(table.get("x").is_err());
    }

    #[test]
    fn mem_mirror_tracks_files() {
        let mirror = MemMirror::new();
        mirror.write("b", "2").unwrap();
        mirror.insert_raw("a", "1");

        assert_eq!(mirror.list_names().unwrap(), vec!["a", "b"]);
        assert!(mirror.remove("a").unwrap());
        assert!(!mirror.contains("a"));

        mirror.set_simulate_write_error(true);
        assert_eq!(mirror.write("c", "3").unwrap_err().kind(), ErrorKind::Io);
    }
}
