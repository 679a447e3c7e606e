//! Persistence of the whole task list as one JSON document.

use std::fs::{self, File};
use std::io::Write;
use std::path::Path;

use crate::error::Result;
use crate::task::Task;

pub trait TaskStorage {
    /// Reads the task list. Never fails: a missing or unreadable document
    /// yields an empty list and the problem is logged.
    fn load(&self, path: &Path) -> Vec<Task>;

    /// Replaces the stored document with `tasks`.
    fn save(&self, path: &Path, tasks: &[Task]) -> Result<()>;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct JsonFileStorage;

impl JsonFileStorage {
    pub fn new() -> Self {
        Self
    }

    fn read(path: &Path) -> Result<Vec<Task>> {
        let data = fs::read_to_string(path)?;
        let tasks: Option<Vec<Task>> = serde_json::from_str(&data)?;
        Ok(tasks.unwrap_or_default())
    }

    fn write_atomic(path: &Path, data: &[u8]) -> Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let temp_path = path.with_extension(format!(
            "{}.tmp.{}",
            path.extension().and_then(|e| e.to_str()).unwrap_or(""),
            std::process::id()
        ));
        let written = File::create(&temp_path).and_then(|mut file| {
            file.write_all(data)?;
            file.sync_all()
        });
        if let Err(err) = written.and_then(|()| fs::rename(&temp_path, path)) {
            let _ = fs::remove_file(&temp_path);
            return Err(err.into());
        }
        Ok(())
    }
}

impl TaskStorage for JsonFileStorage {
    fn load(&self, path: &Path) -> Vec<Task> {
        if !path.exists() {
            tracing::debug!(path = %path.display(), "no task file yet, starting empty");
            return Vec::new();
        }
        match Self::read(path) {
            Ok(tasks) => {
                tracing::debug!(path = %path.display(), count = tasks.len(), "loaded tasks");
                tasks
            }
            Err(err) => {
                tracing::warn!(path = %path.display(), error = %err, "failed to load tasks, starting empty");
                Vec::new()
            }
        }
    }

    fn save(&self, path: &Path, tasks: &[Task]) -> Result<()> {
        let json = serde_json::to_string_pretty(tasks)?;
        Self::write_atomic(path, json.as_bytes()).inspect_err(|err| {
            tracing::warn!(path = %path.display(), error = %err, "failed to save tasks");
        })?;
        tracing::debug!(path = %path.display(), count = tasks.len(), "saved tasks");
        Ok(())
    }
}
