use crate::prelude::PersistenceError;
use crate::telemetry::log::LogManager;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs;
use std::io::ErrorKind;
use std::marker::PhantomData;
use std::path::{Path, PathBuf};

/// JSON document on disk holding one registry value.
///
/// Reads are fail-soft through [`JsonStore::load_or_default`]; writes always
/// report failure to the caller.
pub struct JsonStore<T> {
    path: PathBuf,
    logger: LogManager,
    _value: PhantomData<fn() -> T>,
}

impl<T> JsonStore<T>
where
    T: Serialize + DeserializeOwned + Default,
{
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self {
            path: path.into(),
            logger: LogManager::new("store"),
            _value: PhantomData,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads the document. A missing file yields the default value.
    pub fn load(&self) -> Result<T, PersistenceError> {
        let contents = match fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(T::default()),
            Err(source) => {
                return Err(PersistenceError::Io {
                    path: self.path.display().to_string(),
                    source,
                })
            }
        };
        serde_json::from_str(&contents).map_err(|source| PersistenceError::Json {
            path: self.path.display().to_string(),
            source,
        })
    }

    pub fn load_or_default(&self) -> T {
        match self.load() {
            Ok(value) => value,
            Err(err) => {
                self.logger
                    .warn(&format!("starting empty, could not load store: {}", err));
                T::default()
            }
        }
    }

    /// Writes the document through a sibling temp file so readers never see a partial write.
    pub fn save(&self, value: &T) -> Result<(), PersistenceError> {
        let io_err = |source| PersistenceError::Io {
            path: self.path.display().to_string(),
            source,
        };

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(io_err)?;
            }
        }

        let body = serde_json::to_string_pretty(value).map_err(|source| PersistenceError::Json {
            path: self.path.display().to_string(),
            source,
        })?;

        let mut staging = self.path.clone().into_os_string();
        staging.push(".tmp");
        let staging = PathBuf::from(staging);
        fs::write(&staging, body).map_err(io_err)?;
        fs::rename(&staging, &self.path).map_err(io_err)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;
    use tempfile::tempdir;

    #[test]
    fn missing_file_loads_default() {
        let dir = tempdir().unwrap();
        let store: JsonStore<Vec<String>> = JsonStore::new(dir.path().join("absent.json"));
        assert!(store.load().unwrap().is_empty());
    }

    #[test]
    fn corrupt_file_is_an_error_but_loads_soft() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("broken.json");
        fs::write(&path, "{ not json").unwrap();
        let store: JsonStore<BTreeMap<String, String>> = JsonStore::new(&path);
        assert!(matches!(store.load(), Err(PersistenceError::Json { .. })));
        assert!(store.load_or_default().is_empty());
    }

    #[test]
    fn save_creates_parent_directories() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested/deeper/values.json");
        let store: JsonStore<Vec<i32>> = JsonStore::new(&path);
        store.save(&vec![1, 2, 3]).unwrap();
        assert_eq!(store.load().unwrap(), vec![1, 2, 3]);
    }

    #[test]
    fn save_into_unwritable_location_fails() {
        let dir = tempdir().unwrap();
        let blocker = dir.path().join("file");
        fs::write(&blocker, "x").unwrap();
        let store: JsonStore<Vec<i32>> = JsonStore::new(blocker.join("child.json"));
        assert!(matches!(store.save(&vec![1]), Err(PersistenceError::Io { .. })));
    }
}
