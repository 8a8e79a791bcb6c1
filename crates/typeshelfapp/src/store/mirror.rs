use crate::error::Result;
use crate::validation::validate_template_name;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use uuid::Uuid;

/// One file per template, kept in lock-step with the template cache.
pub trait Mirror: Send + Sync {
    /// Creates the mirror directory if needed.
    fn ensure_root(&self) -> Result<()>;

    /// Writes `content` as the file for `name`, replacing any prior content.
    fn write(&self, name: &str, content: &str) -> Result<()>;

    fn read(&self, name: &str) -> Result<Option<String>>;

    /// Removes the file for `name` and any compiled artifact derived from it.
    /// Returns true if the source file existed.
    fn remove(&self, name: &str) -> Result<bool>;

    /// Names of every mirror file currently present, sorted.
    fn list_names(&self) -> Result<Vec<String>>;

    /// Where the file for `name` lives (whether or not it exists). Callers
    /// must not touch this path for names that fail template name validation.
    fn path_of(&self, name: &str) -> PathBuf;

    fn contains(&self, name: &str) -> bool;
}

/// Directory-backed mirror: `<root>/<name>.<extension>`.
///
/// Every file operation refuses names that fail [`validate_template_name`],
/// so a row added to the table by hand can never reach outside `root`.
pub struct FsMirror {
    root: PathBuf,
    extension: String,
    compiled_extension: String,
}

impl FsMirror {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            extension: "jrxml".to_string(),
            compiled_extension: "jasper".to_string(),
        }
    }

    pub fn with_extension(mut self, ext: &str) -> Self {
        self.extension = ext.trim_start_matches('.').to_string();
        self
    }

    pub fn with_compiled_extension(mut self, ext: &str) -> Self {
        self.compiled_extension = ext.trim_start_matches('.').to_string();
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn checked_path(&self, name: &str) -> Result<PathBuf> {
        validate_template_name(name)?;
        Ok(self.path_of(name))
    }

    fn compiled_path(&self, name: &str) -> PathBuf {
        self.root.join(format!("{}.{}", name, self.compiled_extension))
    }

    fn remove_if_present(path: &Path) -> Result<bool> {
        match fs::remove_file(path) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }
}

impl Mirror for FsMirror {
    fn ensure_root(&self) -> Result<()> {
        if !self.root.exists() {
            fs::create_dir_all(&self.root)?;
        }
        Ok(())
    }

    fn write(&self, name: &str, content: &str) -> Result<()> {
        let target = self.checked_path(name)?;
        self.ensure_root()?;

        // Atomic write. The temp name must not grow with `name`.
        let tmp_file = self.root.join(format!(".{}.tmp", Uuid::new_v4()));
        fs::write(&tmp_file, content)?;
        if let Err(e) = fs::rename(&tmp_file, &target) {
            let _ = fs::remove_file(&tmp_file);
            return Err(e.into());
        }
        Ok(())
    }

    fn read(&self, name: &str) -> Result<Option<String>> {
        match fs::read_to_string(self.checked_path(name)?) {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn remove(&self, name: &str) -> Result<bool> {
        let removed = Self::remove_if_present(&self.checked_path(name)?)?;
        Self::remove_if_present(&self.compiled_path(name))?;
        Ok(removed)
    }

    fn list_names(&self) -> Result<Vec<String>> {
        if !self.root.exists() {
            return Ok(Vec::new());
        }
        let mut names = Vec::new();
        for entry in fs::read_dir(&self.root)? {
            let path = entry?.path();
            if !path.is_file() {
                continue;
            }
            let matches_ext = path
                .extension()
                .map(|e| e.to_string_lossy() == self.extension.as_str())
                .unwrap_or(false);
            if !matches_ext {
                continue;
            }
            if let Some(stem) = path.file_stem().map(|s| s.to_string_lossy().into_owned()) {
                // Skip in-flight temp files and dotfiles
                if !stem.starts_with('.') {
                    names.push(stem);
                }
            }
        }
        names.sort();
        Ok(names)
    }

    fn path_of(&self, name: &str) -> PathBuf {
        self.root.join(format!("{}.{}", name, self.extension))
    }

    fn contains(&self, name: &str) -> bool {
        self.checked_path(name).map_or(false, |path| path.is_file())
    }
}
