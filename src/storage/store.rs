use crate::error::{Result, VesperError};
use crate::types::{StoreMode, VesperConfig};
use sled::Db;
use tracing::error;

/// Persistent key-value layer under the document engine. Durability,
/// crash recovery, and on-disk layout are all delegated to sled.
pub struct DocStore {
    db: Db,
}

impl DocStore {
    pub fn open(config: &VesperConfig) -> Result<Self> {
        if config.create_dirs {
            if let Some(parent) = config.db_path.parent() {
                if !parent.as_os_str().is_empty() {
                    std::fs::create_dir_all(parent)?;
                }
            }
        }

        let mode = match config.mode {
            StoreMode::HighThroughput => sled::Mode::HighThroughput,
            StoreMode::LowSpace => sled::Mode::LowSpace,
        };

        let db = sled::Config::new()
            .path(&config.db_path)
            .cache_capacity((config.cache_capacity_mb * 1024 * 1024) as u64)
            .flush_every_ms(config.flush_interval_ms)
            .mode(mode)
            .open()?;

        Ok(Self { db })
    }

    pub fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        Ok(self.db.get(key.as_bytes())?.map(|ivec| ivec.to_vec()))
    }

    pub fn set(&self, key: &str, value: Vec<u8>) -> Result<()> {
        self.db.insert(key.as_bytes(), value)?;
        // Don't flush immediately - the background flusher handles it
        Ok(())
    }

    pub fn delete(&self, key: &str) -> Result<()> {
        self.db.remove(key.as_bytes())?;
        Ok(())
    }

    /// Iterates every key-value pair under the given key prefix.
    pub fn scan_prefix<'a>(
        &'a self,
        prefix: &str,
    ) -> impl Iterator<Item = Result<(String, Vec<u8>)>> + 'a {
        self.db.scan_prefix(prefix.as_bytes()).map(|result| {
            result
                .map_err(VesperError::Storage)
                .and_then(|(key, value)| {
                    Ok((
                        String::from_utf8(key.to_vec()).map_err(|_| {
                            VesperError::Protocol("Invalid UTF-8 in key".to_string())
                        })?,
                        value.to_vec(),
                    ))
                })
        })
    }

    pub fn flush(&self) -> Result<()> {
        self.db.flush()?;
        Ok(())
    }
}

impl Drop for DocStore {
    fn drop(&mut self) {
        if let Err(e) = self.db.flush() {
            error!(error = %e, "error flushing store");
        }
    }
}
