//! Thin file-backed JSON map used for the alert state and the company cache.

use std::collections::BTreeMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::core::AlertError;

/// A string-keyed map persisted as one pretty-printed JSON object.
///
/// Every [`save`](Self::save) rewrites the whole file through a temporary
/// sibling and a rename, so readers never observe a half-written document.
#[derive(Debug, Clone)]
pub struct JsonFileMap<V> {
    path: PathBuf,
    entries: BTreeMap<String, V>,
}

impl<V> JsonFileMap<V>
where
    V: Serialize + DeserializeOwned,
{
    /// An empty map that will be written to `path`.
    pub fn empty(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            entries: BTreeMap::new(),
        }
    }

    /// Reads `path`; a missing file yields an empty map.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or decoded.
    pub fn try_load(path: impl Into<PathBuf>) -> Result<Self, AlertError> {
        let path = path.into();
        let entries = match fs::read_to_string(&path) {
            Ok(text) => serde_json::from_str(&text)?,
            Err(e) if e.kind() == ErrorKind::NotFound => BTreeMap::new(),
            Err(e) => return Err(e.into()),
        };
        Ok(Self { path, entries })
    }

    /// Like [`try_load`](Self::try_load) but a corrupt file is logged and
    /// replaced by an empty map.
    pub fn load_or_default(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        match Self::try_load(&path) {
            Ok(map) => {
                tracing::debug!(path = %path.display(), entries = map.len(), "loaded");
                map
            }
            Err(e) => {
                tracing::warn!(
                    path = %path.display(),
                    error = %e,
                    "could not load file; starting fresh with an empty map"
                );
                Self::empty(path)
            }
        }
    }

    /// Writes the full map to disk, replacing previous content.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or any filesystem step fails.
    pub fn save(&self) -> Result<(), AlertError> {
        let text = serde_json::to_string_pretty(&self.entries)?;
        if let Some(dir) = self.path.parent()
            && !dir.as_os_str().is_empty()
        {
            fs::create_dir_all(dir)?;
        }
        let tmp = tmp_path(&self.path);
        fs::write(&tmp, text)?;
        fs::rename(&tmp, &self.path)?;
        tracing::trace!(path = %self.path.display(), entries = self.entries.len(), "saved");
        Ok(())
    }

    pub fn get(&self, key: &str) -> Option<&V> {
        self.entries.get(key)
    }

    pub fn insert(&mut self, key: impl Into<String>, value: V) -> Option<V> {
        self.entries.insert(key.into(), value)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &V)> {
        self.entries.iter()
    }
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}
