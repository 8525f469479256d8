use crate::storage::{KeyValueStore, StorageError, StorageResult, key_matches};

use std::collections::BTreeMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use log::{debug, info, warn};

const DATE_FORMAT: &str = "%Y%m%d_%H%M%S";

/// JSON-file backed store; survives process restarts like browser local
/// storage survives reloads.
///
/// The whole map is kept in memory and every mutation rewrites the file
/// with the temp-file, fsync, rename sequence so a crash never leaves a
/// half-written store behind.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    entries: Mutex<BTreeMap<String, String>>,
}

impl FileStore {
    /// Opens the store at `path`.
    ///
    /// A missing file is an empty store. A file that does not parse is
    /// renamed to `<name>.corrupted.<timestamp>` and the store starts empty.
    pub fn open(path: impl Into<PathBuf>) -> StorageResult<Self> {
        let path = path.into();
        let entries = Self::load(&path)?;

        Ok(Self {
            path,
            entries: Mutex::new(entries),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(path: &Path) -> StorageResult<BTreeMap<String, String>> {
        if !path.exists() {
            info!("No store file at {path:?}, starting empty");
            return Ok(BTreeMap::new());
        }

        let contents =
            fs::read_to_string(path).map_err(|e| StorageError::file_read(path.to_path_buf(), e))?;

        match serde_json::from_str::<BTreeMap<String, String>>(&contents) {
            Ok(entries) => {
                debug!("Loaded {} entries from {path:?}", entries.len());
                Ok(entries)
            }
            Err(e) => {
                warn!("Store file corrupted at {path:?}: {e}");
                Self::backup_corrupted(path)?;
                Ok(BTreeMap::new())
            }
        }
    }

    fn backup_corrupted(path: &Path) -> StorageResult<PathBuf> {
        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| String::from("store"));
        let timestamp = chrono::Utc::now().format(DATE_FORMAT);
        let backup_path = path.with_file_name(format!("{file_name}.corrupted.{timestamp}"));

        fs::rename(path, &backup_path)
            .map_err(|e| StorageError::backup_failed(path.to_path_buf(), e))?;

        warn!("Backed up corrupted store to {backup_path:?}");
        Ok(backup_path)
    }

    /// Write `next` to disk, then make it the in-memory map. On a failed
    /// write memory keeps matching the file.
    fn replace(
        &self,
        entries: &mut BTreeMap<String, String>,
        next: BTreeMap<String, String>,
    ) -> StorageResult<()> {
        self.persist(&next)?;
        *entries = next;
        Ok(())
    }

    fn persist(&self, entries: &BTreeMap<String, String>) -> StorageResult<()> {
        if let Some(dir) = self.path.parent()
            && !dir.as_os_str().is_empty()
        {
            fs::create_dir_all(dir).map_err(|e| StorageError::dir_creation(dir.to_path_buf(), e))?;
        }

        let file_name = self
            .path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| String::from("store"));
        let temp_path = self
            .path
            .with_file_name(format!("{file_name}.tmp.{}", std::process::id()));

        let json = serde_json::to_string_pretty(entries)?;

        {
            let mut file = fs::File::create(&temp_path)
                .map_err(|e| StorageError::file_write(temp_path.clone(), e))?;

            file.write_all(json.as_bytes())
                .map_err(|e| StorageError::file_write(temp_path.clone(), e))?;

            file.sync_all()
                .map_err(|e| StorageError::file_write(temp_path.clone(), e))?;
        }

        fs::rename(&temp_path, &self.path).map_err(|e| {
            let _ = fs::remove_file(&temp_path);
            StorageError::atomic_rename(temp_path.clone(), self.path.clone(), e)
        })?;

        Ok(())
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> StorageResult<Option<String>> {
        let entries = self.entries.lock().map_err(|_| StorageError::poisoned())?;
        Ok(entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> StorageResult<()> {
        let mut entries = self.entries.lock().map_err(|_| StorageError::poisoned())?;
        let mut next = entries.clone();
        next.insert(key.to_string(), value.to_string());
        self.replace(&mut entries, next)
    }

    fn remove(&self, key: &str) -> StorageResult<()> {
        let mut entries = self.entries.lock().map_err(|_| StorageError::poisoned())?;
        if !entries.contains_key(key) {
            return Ok(());
        }

        let mut next = entries.clone();
        next.remove(key);
        self.replace(&mut entries, next)
    }

    fn keys(&self) -> StorageResult<Vec<String>> {
        let entries = self.entries.lock().map_err(|_| StorageError::poisoned())?;
        Ok(entries.keys().cloned().collect())
    }

    // One rewrite for the whole sweep instead of one per key
    fn purge_matching(&self, patterns: &[String]) -> StorageResult<Vec<String>> {
        let mut entries = self.entries.lock().map_err(|_| StorageError::poisoned())?;
        let doomed: Vec<String> = entries
            .keys()
            .filter(|key| key_matches(key, patterns))
            .cloned()
            .collect();

        if doomed.is_empty() {
            return Ok(doomed);
        }

        let mut next = entries.clone();
        for key in &doomed {
            next.remove(key);
        }
        self.replace(&mut entries, next)?;

        Ok(doomed)
    }
}
