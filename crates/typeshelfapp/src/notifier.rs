//! The derived-artifact boundary.
//!
//! After every successful font mutation the registry hands the full, settled
//! font set to a [`FontSetNotifier`], which regenerates whatever engine
//! configuration depends on it. `remove_all` is used instead when the set
//! becomes empty. Failures here never fail the mutation; the registry logs
//! them.

use crate::error::Result;
use crate::model::FontRecord;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;
use uuid::Uuid;

pub trait FontSetNotifier: Send + Sync {
    fn regenerate(&self, fonts: &[FontRecord]) -> Result<()>;
    fn remove_all(&self) -> Result<()>;
}

pub struct NoopNotifier;

impl FontSetNotifier for NoopNotifier {
    fn regenerate(&self, _fonts: &[FontRecord]) -> Result<()> {
        Ok(())
    }

    fn remove_all(&self) -> Result<()> {
        Ok(())
    }
}

pub const MANIFEST_FILE_NAME: &str = "fonts.json";

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct FontManifest<'a> {
    generated_at: DateTime<Utc>,
    fonts: &'a [FontRecord],
}

/// Writes the current font set as `fonts.json` into the extensions directory.
pub struct ManifestNotifier {
    dir: PathBuf,
}

impl ManifestNotifier {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn manifest_path(&self) -> PathBuf {
        self.dir.join(MANIFEST_FILE_NAME)
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl FontSetNotifier for ManifestNotifier {
    fn regenerate(&self, fonts: &[FontRecord]) -> Result<()> {
        fs::create_dir_all(&self.dir)?;
        let manifest = FontManifest {
            generated_at: Utc::now(),
            fonts,
        };
        let content = serde_json::to_string_pretty(&manifest)?;

        // Atomic write
        let tmp_file = self.dir.join(format!(".fonts-{}.tmp", Uuid::new_v4()));
        fs::write(&tmp_file, content)?;
        if let Err(e) = fs::rename(&tmp_file, self.manifest_path()) {
            let _ = fs::remove_file(&tmp_file);
            return Err(e.into());
        }
        Ok(())
    }

    fn remove_all(&self) -> Result<()> {
        match fs::remove_file(self.manifest_path()) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NotifierCall {
    /// Names of the fonts passed, in the order received.
    Regenerate(Vec<String>),
    RemoveAll,
}

/// Records every call, optionally failing them.
#[derive(Default)]
pub struct RecordingNotifier {
    calls: Mutex<Vec<NotifierCall>>,
    fail: AtomicBool,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_simulate_error(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }

    pub fn calls(&self) -> Vec<NotifierCall> {
        self.calls
            .lock()
            .map(|calls| calls.clone())
            .unwrap_or_default()
    }

    pub fn last(&self) -> Option<NotifierCall> {
        self.calls().pop()
    }

    pub fn reset(&self) {
        if let Ok(mut calls) = self.calls.lock() {
            calls.clear();
        }
    }

    fn record(&self, call: NotifierCall) -> Result<()> {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(call);
        }
        if self.fail.load(Ordering::SeqCst) {
            return Err(io::Error::other("Simulated notifier error").into());
        }
        Ok(())
    }
}

impl FontSetNotifier for RecordingNotifier {
    fn regenerate(&self, fonts: &[FontRecord]) -> Result<()> {
        self.record(NotifierCall::Regenerate(
            fonts.iter().map(|f| f.name.clone()).collect(),
        ))
    }

    fn remove_all(&self) -> Result<()> {
        self.record(NotifierCall::RemoveAll)
    }
}
