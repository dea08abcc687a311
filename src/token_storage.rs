use crate::errors::StoreError;
use serde_json::{Map, Value};

use std::fs;
use std::path::{Path, PathBuf};

/// JSON file mapping usernames to their most recently fetched tokens.
///
/// Every mutation loads the whole file, changes one key and writes the whole
/// file back. There is no locking between processes.
#[derive(Debug, Clone)]
pub struct TokenStore {
    path: PathBuf,
}

impl TokenStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        TokenStore { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Loads the store, treating a missing or corrupt file as empty.
    ///
    /// Failures to read an existing file (permissions, I/O) are returned so
    /// the caller never overwrites tokens it could not see.
    pub fn load_or_empty(&self) -> Result<Map<String, Value>, StoreError> {
        match self.load() {
            Ok(Some(tokens)) => Ok(tokens),
            Ok(None) => {
                tracing::debug!("No tokens file at {:?}, starting empty", self.path);
                Ok(Map::new())
            }
            Err(e) if e.is_corrupt_content() => {
                tracing::warn!(
                    "Ignoring corrupt tokens file {:?}: {}. Starting from an empty store.",
                    self.path,
                    e
                );
                Ok(Map::new())
            }
            Err(e) => Err(e),
        }
    }

    /// Loads the store. `Ok(None)` means the file does not exist.
    pub fn load(&self) -> Result<Option<Map<String, Value>>, StoreError> {
        if !self.path.exists() {
            return Ok(None);
        }

        let contents =
            fs::read_to_string(&self.path).map_err(|e| StoreError::ReadError { source: e })?;

        match serde_json::from_str::<Value>(&contents)? {
            Value::Object(tokens) => Ok(Some(tokens)),
            _ => Err(StoreError::NotAnObject),
        }
    }

    /// Returns `(username, token)` pairs in file order, or `None` if the file is missing.
    pub fn entries(&self) -> Result<Option<Vec<(String, String)>>, StoreError> {
        let Some(tokens) = self.load()? else {
            return Ok(None);
        };

        tokens
            .into_iter()
            .map(|(username, value)| match value {
                Value::String(token) => Ok((username, token)),
                _ => Err(StoreError::InvalidEntry { username }),
            })
            .collect::<Result<Vec<_>, _>>()
            .map(Some)
    }

    /// Sets `username`'s token, keeping every other entry as it was.
    pub fn upsert(&self, username: &str, token: &str) -> Result<(), StoreError> {
        let mut tokens = self.load_or_empty()?;
        tokens.insert(username.to_string(), Value::String(token.to_string()));
        self.save(&tokens)?;
        tracing::info!("Token for {} saved to {:?}", username, self.path);
        Ok(())
    }

    /// Removes `username`'s entry. Returns whether an entry existed.
    pub fn remove(&self, username: &str) -> Result<bool, StoreError> {
        let Some(mut tokens) = self.load()? else {
            return Ok(false);
        };

        if !tokens.contains_key(username) {
            return Ok(false);
        }

        tokens.retain(|key, _| key != username);
        self.save(&tokens)?;
        tracing::info!("Token for {} removed from {:?}", username, self.path);
        Ok(true)
    }

    fn save(&self, tokens: &Map<String, Value>) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
            && !parent.exists()
        {
            fs::create_dir_all(parent).map_err(|e| StoreError::WriteError { source: e })?;
        }

        let json = serde_json::to_string_pretty(tokens)?;
        fs::write(&self.path, json).map_err(|e| StoreError::WriteError { source: e })?;
        Ok(())
    }
}
