//! Local JSON file store rooted at `~/.devdeck` (or `--data-dir`).

mod repo;
mod todos;

use serde::{de::DeserializeOwned, Serialize};
use sha2::{Digest, Sha256};
use std::{
    env, fs, io,
    path::{Path, PathBuf},
};
use thiserror::Error;

pub use repo::RepoState;

pub const DIR_NAME: &str = ".devdeck";

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("not found")]
    NotFound,
    #[error("cannot determine the home directory")]
    NoHomeDir,
    #[error("{}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("{}: invalid JSON: {source}", path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

impl StoreError {
    fn io(path: &Path, source: io::Error) -> Self {
        Self::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

/// `~/.devdeck`, from `HOME`.
pub fn default_data_dir() -> Result<PathBuf, StoreError> {
    env::var_os("HOME")
        .filter(|home| !home.is_empty())
        .map(|home| PathBuf::from(home).join(DIR_NAME))
        .ok_or(StoreError::NoHomeDir)
}

/// Stable short id for a repository path: the first 8 bytes of its SHA-256, hex encoded.
pub fn path_id(path: &str) -> String {
    let digest = Sha256::digest(path.as_bytes());
    hex::encode(&digest[..8])
}

/// A directory of named files.
#[derive(Debug, Clone)]
pub struct Store {
    path: PathBuf,
}

impl Store {
    /// Open (creating if needed) a store at `path`.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        fs::create_dir_all(&path).map_err(|err| StoreError::io(&path, err))?;
        Ok(Self { path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn file(&self, name: &str) -> PathBuf {
        self.path.join(name)
    }

    pub fn write(&self, name: &str, data: &[u8]) -> Result<(), StoreError> {
        let path = self.file(name);
        fs::write(&path, data).map_err(|err| StoreError::io(&path, err))
    }

    pub fn read(&self, name: &str) -> Result<Vec<u8>, StoreError> {
        let path = self.file(name);
        fs::read(&path).map_err(|err| match err.kind() {
            io::ErrorKind::NotFound => StoreError::NotFound,
            _ => StoreError::io(&path, err),
        })
    }

    /// Pretty-printed with a two-space indent.
    pub fn write_json<T: Serialize + ?Sized>(&self, name: &str, value: &T) -> Result<(), StoreError> {
        let data = serde_json::to_vec_pretty(value).map_err(|source| StoreError::Json {
            path: self.file(name),
            source,
        })?;
        self.write(name, &data)
    }

    pub fn read_json<T: DeserializeOwned>(&self, name: &str) -> Result<T, StoreError> {
        let data = self.read(name)?;
        serde_json::from_slice(&data).map_err(|source| StoreError::Json {
            path: self.file(name),
            source,
        })
    }

    pub fn delete(&self, name: &str) -> Result<(), StoreError> {
        let path = self.file(name);
        fs::remove_file(&path).map_err(|err| match err.kind() {
            io::ErrorKind::NotFound => StoreError::NotFound,
            _ => StoreError::io(&path, err),
        })
    }

    pub fn exists(&self, name: &str) -> bool {
        self.file(name).exists()
    }

    /// Names of regular files in the store, sorted.
    pub fn list(&self) -> Result<Vec<String>, StoreError> {
        let entries = fs::read_dir(&self.path).map_err(|err| StoreError::io(&self.path, err))?;
        let mut names = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|err| StoreError::io(&self.path, err))?;
            let is_dir = entry.file_type().map(|kind| kind.is_dir()).unwrap_or(false);
            if !is_dir {
                names.push(entry.file_name().to_string_lossy().into_owned());
            }
        }
        names.sort();
        Ok(names)
    }

    /// A nested store, created on first use.
    pub fn sub_dir(&self, name: &str) -> Result<Store, StoreError> {
        Store::open(self.path.join(name))
    }
}
