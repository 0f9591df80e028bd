use std::{
    collections::HashMap,
    fs::File,
    io::{ErrorKind, Read, Seek, Write},
    path::PathBuf,
};

use anyhow::Result;
use fs4::fs_std::FileExt;
use tracing::debug;

use super::StoreKey;

/// Interface for abstracting the key-value store the tracker mirrors its state into.
pub trait KeyValueStore {
    /// Returns the raw value, or `None` if nothing was stored under the key.
    fn get(&self, key: StoreKey) -> Result<Option<String>>;

    /// Replaces the whole value stored under the key.
    fn set(&mut self, key: StoreKey, value: &str) -> Result<()>;

    /// Removing a missing key is not an error.
    fn remove(&mut self, key: StoreKey) -> Result<()>;
}

/// The main realization of [KeyValueStore]. Every key is a separate json file, so a broken
/// write only affects one collection.
pub struct FileStore {
    store_dir: PathBuf,
}

impl FileStore {
    pub fn new(store_dir: PathBuf) -> Result<Self, std::io::Error> {
        std::fs::create_dir_all(&store_dir)?;

        Ok(Self { store_dir })
    }

    fn path_for(&self, key: StoreKey) -> PathBuf {
        self.store_dir.join(format!("{}.json", key.as_str()))
    }

    fn overwrite(file: &mut File, value: &str) -> Result<()> {
        file.set_len(0)?;
        file.rewind()?;
        file.write_all(value.as_bytes())?;
        file.flush()?;
        Ok(())
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: StoreKey) -> Result<Option<String>> {
        let path = self.path_for(key);
        debug!("Reading {path:?}");
        let mut file = match File::open(&path) {
            Ok(file) => file,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => Err(e)?,
        };

        file.lock_shared()?;
        let mut value = String::new();
        let result = file.read_to_string(&mut value);
        file.unlock()?;
        result?;

        Ok(Some(value))
    }

    fn set(&mut self, key: StoreKey, value: &str) -> Result<()> {
        let path = self.path_for(key);
        debug!("Writing {path:?}");
        // Truncating happens only after the lock is held.
        let mut file = File::options()
            .write(true)
            .create(true)
            .truncate(false)
            .open(path)?;

        file.lock_exclusive()?;
        let result = Self::overwrite(&mut file, value);
        file.unlock()?;
        result
    }

    fn remove(&mut self, key: StoreKey) -> Result<()> {
        match std::fs::remove_file(self.path_for(key)) {
            Ok(_) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// Keeps values in memory only. Handy for tests and for throwaway sessions.
#[derive(Default, Debug)]
pub struct MemoryStore {
    values: HashMap<&'static str, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: StoreKey) -> Result<Option<String>> {
        Ok(self.values.get(key.as_str()).cloned())
    }

    fn set(&mut self, key: StoreKey, value: &str) -> Result<()> {
        self.values.insert(key.as_str(), value.to_owned());
        Ok(())
    }

    fn remove(&mut self, key: StoreKey) -> Result<()> {
        self.values.remove(key.as_str());
        Ok(())
    }
}
