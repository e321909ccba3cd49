use dashmap::DashMap;
use serde::{Serialize, de::DeserializeOwned};
use serde_json::Value;
use tracing::warn;

/// Cache key holding the average points won per WON game.
pub const AVERAGE_POINTS_KEY: &str = "AVE_PTS_PER_GAME";

/// Keyed in-process cache storing JSON values.
///
/// Writes overwrite the previous entry; reads never block writers of other keys.
#[derive(Debug, Default)]
pub struct CacheStore {
    entries: DashMap<String, Value>,
}

impl CacheStore {
    /// Empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Read and decode the entry stored under `key`.
    ///
    /// Entries that no longer decode as `T` are reported as missing.
    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let value = self.entries.get(key)?.value().clone();
        match serde_json::from_value(value) {
            Ok(decoded) => Some(decoded),
            Err(err) => {
                warn!(key, error = %err, "cache entry has an unexpected shape");
                None
            }
        }
    }

    /// Overwrite the entry stored under `key`.
    pub fn set<T: Serialize>(&self, key: &str, value: &T) -> Result<(), serde_json::Error> {
        let encoded = serde_json::to_value(value)?;
        self.entries.insert(key.to_owned(), encoded);
        Ok(())
    }
}
