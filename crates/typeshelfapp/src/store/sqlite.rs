use super::Table;
use crate::error::Result;
use crate::model::{FontRecord, Record, TemplateRecord};
use rusqlite::{params, Connection, OptionalExtension, Row, ToSql};
use std::fs;
use std::marker::PhantomData;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;

/// Maps a record type onto one SQLite table.
///
/// `COLUMNS` is the select list shared by reads and `RETURNING`, and
/// `from_row` reads columns positionally in that order.
pub trait SqlRecord: Record {
    const TABLE: &'static str;
    const SCHEMA: &'static str;
    const COLUMNS: &'static str;
    /// Single-statement upsert ending in `RETURNING {COLUMNS}`.
    const UPSERT: &'static str;

    fn upsert_params(&self) -> Vec<&dyn ToSql>;

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self>;
}

impl SqlRecord for FontRecord {
    const TABLE: &'static str = "registered_fonts";
    const SCHEMA: &'static str = "
        CREATE TABLE IF NOT EXISTS registered_fonts (
            name VARCHAR(255) PRIMARY KEY NOT NULL,
            normal_path VARCHAR(1024) NOT NULL,
            bold_path VARCHAR(1024),
            italic_path VARCHAR(1024),
            bold_italic_path VARCHAR(1024),
            pdf_encoding VARCHAR(50) NOT NULL DEFAULT 'Identity-H',
            pdf_embedded BOOLEAN NOT NULL DEFAULT 1
        );";
    const COLUMNS: &'static str =
        "name, normal_path, bold_path, italic_path, bold_italic_path, pdf_encoding, pdf_embedded";
    const UPSERT: &'static str = "
        INSERT INTO registered_fonts
            (name, normal_path, bold_path, italic_path, bold_italic_path, pdf_encoding, pdf_embedded)
        VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
        ON CONFLICT(name) DO UPDATE SET
            normal_path = excluded.normal_path,
            bold_path = excluded.bold_path,
            italic_path = excluded.italic_path,
            bold_italic_path = excluded.bold_italic_path,
            pdf_encoding = excluded.pdf_encoding,
            pdf_embedded = excluded.pdf_embedded
        RETURNING name, normal_path, bold_path, italic_path, bold_italic_path, pdf_encoding, pdf_embedded";

    fn upsert_params(&self) -> Vec<&dyn ToSql> {
        vec![
            &self.name,
            &self.normal_path,
            &self.bold_path,
            &self.italic_path,
            &self.bold_italic_path,
            &self.pdf_encoding,
            &self.pdf_embedded,
        ]
    }

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(FontRecord {
            name: row.get(0)?,
            normal_path: row.get(1)?,
            bold_path: row.get(2)?,
            italic_path: row.get(3)?,
            bold_italic_path: row.get(4)?,
            pdf_encoding: row.get(5)?,
            pdf_embedded: row.get(6)?,
        })
    }
}

impl SqlRecord for TemplateRecord {
    const TABLE: &'static str = "templates";
    const SCHEMA: &'static str = "
        CREATE TABLE IF NOT EXISTS templates (
            name VARCHAR(255) PRIMARY KEY NOT NULL,
            content TEXT NOT NULL,
            description VARCHAR(500),
            category VARCHAR(100),
            created_at TIMESTAMP NOT NULL,
            updated_at TIMESTAMP NOT NULL
        );
        CREATE INDEX IF NOT EXISTS idx_templates_category ON templates(category);";
    const COLUMNS: &'static str = "name, content, description, category, created_at, updated_at";
    // created_at is deliberately absent from the update list.
    const UPSERT: &'static str = "
        INSERT INTO templates (name, content, description, category, created_at, updated_at)
        VALUES (?1, ?2, ?3, ?4, ?5, ?6)
        ON CONFLICT(name) DO UPDATE SET
            content = excluded.content,
            description = excluded.description,
            category = excluded.category,
            updated_at = excluded.updated_at
        RETURNING name, content, description, category, created_at, updated_at";

    fn upsert_params(&self) -> Vec<&dyn ToSql> {
        vec![
            &self.name,
            &self.content,
            &self.description,
            &self.category,
            &self.created_at,
            &self.updated_at,
        ]
    }

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(TemplateRecord {
            name: row.get(0)?,
            content: row.get(1)?,
            description: row.get(2)?,
            category: row.get(3)?,
            created_at: row.get(4)?,
            updated_at: row.get(5)?,
        })
    }
}

/// Handle to the SQLite database file shared by both tables.
///
/// Holds only the path: each operation opens its own connection, so handles
/// are cheap to clone and safe to use from any thread. WAL mode plus the busy
/// timeout lets concurrent writers queue instead of failing.
#[derive(Debug, Clone)]
pub struct SqliteDb {
    path: PathBuf,
    busy_timeout: Duration,
}

impl SqliteDb {
    pub fn open(path: impl Into<PathBuf>, busy_timeout: Duration) -> Result<Self> {
        let path = path.into();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent)?;
            }
        }
        let db = Self { path, busy_timeout };
        let conn = db.conn()?;
        let mode: String =
            conn.pragma_update_and_check(None, "journal_mode", "WAL", |row| row.get(0))?;
        debug!(path = %db.path.display(), journal_mode = %mode, "opened database");
        Ok(db)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn table<R: SqlRecord>(&self) -> SqliteTable<R> {
        SqliteTable {
            db: self.clone(),
            _record: PhantomData,
        }
    }

    fn conn(&self) -> Result<Connection> {
        let conn = Connection::open(&self.path)?;
        conn.busy_timeout(self.busy_timeout)?;
        conn.pragma_update(None, "synchronous", "NORMAL")?;
        Ok(conn)
    }
}

pub struct SqliteTable<R> {
    db: SqliteDb,
    _record: PhantomData<fn() -> R>,
}

impl<R> Clone for SqliteTable<R> {
    fn clone(&self) -> Self {
        Self {
            db: self.db.clone(),
            _record: PhantomData,
        }
    }
}

impl<R: SqlRecord> Table<R> for SqliteTable<R> {
    fn ensure_schema(&self) -> Result<()> {
        self.db.conn()?.execute_batch(R::SCHEMA)?;
        Ok(())
    }

    fn upsert(&self, record: &R) -> Result<R> {
        let conn = self.db.conn()?;
        let params = record.upsert_params();
        let stored = conn.query_row(R::UPSERT, &params[..], R::from_row)?;
        Ok(stored)
    }

    fn get(&self, name: &str) -> Result<Option<R>> {
        let conn = self.db.conn()?;
        let sql = format!("SELECT {} FROM {} WHERE name = ?1", R::COLUMNS, R::TABLE);
        let row = conn.query_row(&sql, params![name], R::from_row).optional()?;
        Ok(row)
    }

    fn list_all(&self) -> Result<Vec<R>> {
        let conn = self.db.conn()?;
        let sql = format!("SELECT {} FROM {} ORDER BY name", R::COLUMNS, R::TABLE);
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt.query_map([], R::from_row)?;
        let mut records = Vec::new();
        for row in rows {
            records.push(row?);
        }
        Ok(records)
    }

    fn exists(&self, name: &str) -> Result<bool> {
        let conn = self.db.conn()?;
        let sql = format!("SELECT EXISTS(SELECT 1 FROM {} WHERE name = ?1)", R::TABLE);
        let found: bool = conn.query_row(&sql, params![name], |row| row.get(0))?;
        Ok(found)
    }

    fn count(&self) -> Result<u64> {
        let conn = self.db.conn()?;
        let sql = format!("SELECT COUNT(*) FROM {}", R::TABLE);
        let count: i64 = conn.query_row(&sql, [], |row| row.get(0))?;
        Ok(count.max(0) as u64)
    }

    fn delete(&self, name: &str) -> Result<bool> {
        let conn = self.db.conn()?;
        let sql = format!("DELETE FROM {} WHERE name = ?1", R::TABLE);
        let removed = conn.execute(&sql, params![name])?;
        Ok(removed > 0)
    }

    fn delete_all(&self) -> Result<u64> {
        let conn = self.db.conn()?;
        let sql = format!("DELETE FROM {}", R::TABLE);
        let removed = conn.execute(&sql, [])?;
        Ok(removed as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::TemplateDraft;
    use chrono::{Duration as ChronoDuration, Utc};
    use tempfile::TempDir;

    fn open_db() -> (TempDir, SqliteDb) {
        let dir = TempDir::new().unwrap();
        let db = SqliteDb::open(dir.path().join("nested").join("shelf.db"), Duration::from_secs(5))
            .unwrap();
        (dir, db)
    }

    fn font_table(db: &SqliteDb) -> SqliteTable<FontRecord> {
        let table = db.table::<FontRecord>();
        table.ensure_schema().unwrap();
        table
    }

    #[test]
    fn open_creates_parent_directories() {
        let (_dir, db) = open_db();
        assert!(db.path().exists());
    }

    #[test]
    fn ensure_schema_is_idempotent() {
        let (_dir, db) = open_db();
        let table = db.table::<FontRecord>();
        table.ensure_schema().unwrap();
        table.ensure_schema().unwrap();
        assert_eq!(table.count().unwrap(), 0);
    }

    #[test]
    fn font_upsert_round_trips() {
        let (_dir, db) = open_db();
        let table = font_table(&db);
        let font = FontRecord::new("Acme", "/fonts/acme.ttf")
            .with_bold("/fonts/acme-bold.ttf")
            .with_embedded(false);

        let stored = table.upsert(&font).unwrap();
        assert_eq!(stored, font);
        assert_eq!(table.get("Acme").unwrap(), Some(font));
        assert!(table.exists("Acme").unwrap());
        assert!(!table.exists("Other").unwrap());
    }

    #[test]
    fn font_upsert_replaces_in_place() {
        let (_dir, db) = open_db();
        let table = font_table(&db);
        table.upsert(&FontRecord::new("Acme", "/a.ttf")).unwrap();
        table
            .upsert(&FontRecord::new("Acme", "/b.ttf").with_italic("/bi.ttf"))
            .unwrap();

        assert_eq!(table.count().unwrap(), 1);
        let row = table.get("Acme").unwrap().unwrap();
        assert_eq!(row.normal_path, "/b.ttf");
        assert_eq!(row.italic_path.as_deref(), Some("/bi.ttf"));
    }

    #[test]
    fn column_defaults_apply_to_hand_inserted_rows() {
        let (_dir, db) = open_db();
        let table = font_table(&db);
        db.conn()
            .unwrap()
            .execute(
                "INSERT INTO registered_fonts (name, normal_path) VALUES ('Manual', '/m.ttf')",
                [],
            )
            .unwrap();

        let row = table.get("Manual").unwrap().unwrap();
        assert_eq!(row.pdf_encoding, "Identity-H");
        assert!(row.pdf_embedded);
    }

    #[test]
    fn template_upsert_keeps_created_at() {
        let (_dir, db) = open_db();
        let table = db.table::<TemplateRecord>();
        table.ensure_schema().unwrap();

        let first_at = Utc::now() - ChronoDuration::hours(2);
        let first = TemplateDraft::new("invoice", "<jasperReport>v1</jasperReport>")
            .into_record(first_at);
        let stored_first = table.upsert(&first).unwrap();
        assert_eq!(stored_first.created_at, first_at);

        let second_at = Utc::now();
        let second = TemplateDraft::new("invoice", "<jasperReport>v2</jasperReport>")
            .with_category("billing")
            .into_record(second_at);
        let stored_second = table.upsert(&second).unwrap();

        assert_eq!(stored_second.created_at, first_at);
        assert_eq!(stored_second.updated_at, second_at);
        assert_eq!(stored_second.category.as_deref(), Some("billing"));
        assert_eq!(table.get("invoice").unwrap(), Some(stored_second));
    }

    #[test]
    fn delete_reports_whether_a_row_was_removed() {
        let (_dir, db) = open_db();
        let table = font_table(&db);
        table.upsert(&FontRecord::new("Acme", "/a.ttf")).unwrap();

        assert!(table.delete("Acme").unwrap());
        assert!(!table.delete("Acme").unwrap());
        assert_eq!(table.get("Acme").unwrap(), None);
    }

    #[test]
    fn delete_all_reports_removed_rows() {
        let (_dir, db) = open_db();
        let table = font_table(&db);
        for name in ["A", "B", "C"] {
            table.upsert(&FontRecord::new(name, "/x.ttf")).unwrap();
        }
        assert_eq!(table.delete_all().unwrap(), 3);
        assert_eq!(table.count().unwrap(), 0);
        assert!(table.list_all().unwrap().is_empty());
    }

    #[test]
    fn list_all_is_ordered_by_name() {
        let (_dir, db) = open_db();
        let table = font_table(&db);
        for name in ["Zeta", "Alpha", "Mid"] {
            table.upsert(&FontRecord::new(name, "/x.ttf")).unwrap();
        }
        let names: Vec<String> = table
            .list_all()
            .unwrap()
            .into_iter()
            .map(|f| f.name)
            .collect();
        assert_eq!(names, vec!["Alpha", "Mid", "Zeta"]);
    }

    #[test]
    fn operations_before_schema_fail_as_persistence_errors() {
        let (_dir, db) = open_db();
        let table = db.table::<FontRecord>();
        let err = table.upsert(&FontRecord::new("Acme", "/a.ttf")).unwrap_err();
        assert_eq!(err.kind(), crate::error::ErrorKind::Persistence);
    }
}
