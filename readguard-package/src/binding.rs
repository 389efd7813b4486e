//! Device bindings: which device a content id was packaged on.
//!
//! Written when a package is created, read when one is opened. The store is
//! injected into [`Packager`](crate::Packager) so hosts can back it with
//! whatever local persistence they have.

use crate::error::{PackageError, PackageResult};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, RwLock};

/// A content id bound to a device fingerprint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceBinding {
    pub content_id: String,
    pub device_fingerprint: String,
    pub bound_at: DateTime<Utc>,
}

impl DeviceBinding {
    pub fn new(content_id: impl Into<String>, device_fingerprint: impl Into<String>) -> Self {
        Self {
            content_id: content_id.into(),
            device_fingerprint: device_fingerprint.into(),
            bound_at: Utc::now(),
        }
    }
}

/// Key-value store of device bindings keyed by content id.
pub trait BindingStore: Send + Sync {
    fn get(&self, content_id: &str) -> PackageResult<Option<DeviceBinding>>;
    fn put(&self, binding: DeviceBinding) -> PackageResult<()>;
    fn remove(&self, content_id: &str) -> PackageResult<()>;
}

/// In-memory binding store.
#[derive(Default)]
pub struct MemoryBindingStore {
    bindings: RwLock<HashMap<String, DeviceBinding>>,
}

impl MemoryBindingStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of stored bindings.
    pub fn len(&self) -> usize {
        self.bindings.read().map(|b| b.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl BindingStore for MemoryBindingStore {
    fn get(&self, content_id: &str) -> PackageResult<Option<DeviceBinding>> {
        let bindings = self
            .bindings
            .read()
            .map_err(|e| PackageError::Binding(e.to_string()))?;
        Ok(bindings.get(content_id).cloned())
    }

    fn put(&self, binding: DeviceBinding) -> PackageResult<()> {
        let mut bindings = self
            .bindings
            .write()
            .map_err(|e| PackageError::Binding(e.to_string()))?;
        bindings.insert(binding.content_id.clone(), binding);
        Ok(())
    }

    fn remove(&self, content_id: &str) -> PackageResult<()> {
        let mut bindings = self
            .bindings
            .write()
            .map_err(|e| PackageError::Binding(e.to_string()))?;
        bindings.remove(content_id);
        Ok(())
    }
}

/// Binding store persisted as a JSON object in a single file.
pub struct FileBindingStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl FileBindingStore {
    /// Creates a store at the given path. The file is created on first write.
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            lock: Mutex::new(()),
        }
    }

    /// Returns the default store path under the platform data directory.
    #[must_use]
    pub fn default_path() -> PathBuf {
        dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("readguard")
            .join("device-bindings.json")
    }

    /// Returns the backing file path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load_all(&self) -> PackageResult<HashMap<String, DeviceBinding>> {
        if !self.path.exists() {
            return Ok(HashMap::new());
        }
        let json = std::fs::read_to_string(&self.path)
            .map_err(|e| PackageError::Binding(e.to_string()))?;
        serde_json::from_str(&json).map_err(|e| PackageError::Binding(e.to_string()))
    }

    fn save_all(&self, bindings: &HashMap<String, DeviceBinding>) -> PackageResult<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| PackageError::Binding(e.to_string()))?;
        }
        let json = serde_json::to_string_pretty(bindings)
            .map_err(|e| PackageError::Binding(e.to_string()))?;
        std::fs::write(&self.path, json).map_err(|e| PackageError::Binding(e.to_string()))
    }
}

impl BindingStore for FileBindingStore {
    fn get(&self, content_id: &str) -> PackageResult<Option<DeviceBinding>> {
        let _guard = self.lock.lock().map_err(|e| PackageError::Binding(e.to_string()))?;
        Ok(self.load_all()?.remove(content_id))
    }

    fn put(&self, binding: DeviceBinding) -> PackageResult<()> {
        let _guard = self.lock.lock().map_err(|e| PackageError::Binding(e.to_string()))?;
        let mut bindings = self.load_all()?;
        bindings.insert(binding.content_id.clone(), binding);
        self.save_all(&bindings)
    }

    fn remove(&self, content_id: &str) -> PackageResult<()> {
        let _guard = self.lock.lock().map_err(|e| PackageError::Binding(e.to_string()))?;
        let mut bindings = self.load_all()?;
        if bindings.remove(content_id).is_some() {
            self.save_all(&bindings)?;
        }
        Ok(())
    }
}
