use crate::error::{Result, ShelfError};
use std::fs;
use std::io;
use std::path::{Component, Path, PathBuf};
use uuid::Uuid;

/// Directory of uploaded font files.
///
/// Files are write-once from the registry's point of view: `put` hands back
/// an absolute path that a [`FontRecord`](crate::model::FontRecord) can
/// reference.
#[derive(Debug, Clone)]
pub struct FontBlobStore {
    root: PathBuf,
}

impl FontBlobStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Stores `bytes` as `<root>/<file_name>`, replacing any file of that name.
    pub fn put(&self, file_name: &str, bytes: &[u8]) -> Result<PathBuf> {
        let file_name = Self::plain_file_name(file_name)?;
        fs::create_dir_all(&self.root)?;
        let target = self.root.join(file_name);

        // Atomic write
        let tmp_file = self.root.join(format!(".upload-{}.tmp", Uuid::new_v4()));
        fs::write(&tmp_file, bytes)?;
        if let Err(e) = fs::rename(&tmp_file, &target) {
            let _ = fs::remove_file(&tmp_file);
            return Err(e.into());
        }

        Ok(fs::canonicalize(&target)?)
    }

    /// Copies an existing file into the store under its own file name.
    pub fn import(&self, source: &Path) -> Result<PathBuf> {
        let file_name = source
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .ok_or_else(|| {
                ShelfError::Validation(format!("not a file path: {}", source.display()))
            })?;
        let bytes = fs::read(source)?;
        self.put(&file_name, &bytes)
    }

    /// Stored files, sorted by path.
    pub fn list(&self) -> Result<Vec<PathBuf>> {
        let entries = match fs::read_dir(&self.root) {
            Ok(entries) => entries,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };
        let mut files = Vec::new();
        for entry in entries {
            let path = entry?.path();
            let hidden = path
                .file_name()
                .map(|n| n.to_string_lossy().starts_with('.'))
                .unwrap_or(true);
            if path.is_file() && !hidden {
                files.push(path);
            }
        }
        files.sort();
        Ok(files)
    }

    /// Removes every stored file, returning how many were removed.
    pub fn clear(&self) -> Result<usize> {
        let files = self.list()?;
        for file in &files {
            fs::remove_file(file)?;
        }
        Ok(files.len())
    }

    fn plain_file_name(file_name: &str) -> Result<&str> {
        let mut components = Path::new(file_name).components();
        match (components.next(), components.next()) {
            (Some(Component::Normal(_)), None) if !file_name.starts_with('.') => Ok(file_name),
            _ => Err(ShelfError::Validation(format!(
                "invalid upload file name: '{}'",
                file_name
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn put_returns_absolute_path() {
        let dir = TempDir::new().unwrap();
        let store = FontBlobStore::new(dir.path().join("fonts"));

        let path = store.put("acme.ttf", b"font-bytes").unwrap();
        assert!(path.is_absolute());
        assert!(path.ends_with("fonts/acme.ttf"));
        assert_eq!(fs::read(&path).unwrap(), b"font-bytes");
    }

    #[test]
    fn put_rejects_path_components() {
        let dir = TempDir::new().unwrap();
        let store = FontBlobStore::new(dir.path());
        for bad in ["../evil.ttf", "a/b.ttf", "/abs.ttf", "", ".hidden.ttf", ".."] {
            assert!(store.put(bad, b"x").is_err(), "{bad:?} should be rejected");
        }
    }

    #[test]
    fn import_copies_by_file_name() {
        let dir = TempDir::new().unwrap();
        let source = dir.path().join("Acme-Bold.otf");
        fs::write(&source, b"otf").unwrap();
        let store = FontBlobStore::new(dir.path().join("store"));

        let stored = store.import(&source).unwrap();
        assert!(stored.ends_with("store/Acme-Bold.otf"));
        assert!(source.exists());
    }

    #[test]
    fn list_and_clear() {
        let dir = TempDir::new().unwrap();
        let store = FontBlobStore::new(dir.path());
        assert!(store.list().unwrap().is_empty());

        store.put("b.ttf", b"b").unwrap();
        store.put("a.ttf", b"a").unwrap();
        let names: Vec<_> = store
            .list()
            .unwrap()
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["a.ttf", "b.ttf"]);

        assert_eq!(store.clear().unwrap(), 2);
        assert!(store.list().unwrap().is_empty());
    }

    #[test]
    fn list_on_missing_root_is_empty() {
        let dir = TempDir::new().unwrap();
        let store = FontBlobStore::new(dir.path().join("absent"));
        assert!(store.list().unwrap().is_empty());
    }
}
