//! # RocksDB Register Store
//!
//! Durable [`RegisterStore`] backed by RocksDB.
//!
//! ## Layout
//!
//! - Column family `state`: register address (32 bytes) → canonical
//!   `RegisterState` encoding
//! - Snappy compression, bloom filters for point lookups
//! - Optional fsync per write for durability

use crate::domain::{RegisterState, StoreError};
use crate::ports::RegisterStore;
use rocksdb::{ColumnFamily, ColumnFamilyDescriptor, Options, WriteOptions, DB};
use shared_types::Address;
use std::path::PathBuf;
use tracing::{debug, warn};

/// Column family holding register states.
pub const CF_STATE: &str = "state";

/// RocksDB configuration for the register store.
#[derive(Debug, Clone)]
pub struct RocksDbConfig {
    /// Path to the database directory
    pub path: PathBuf,
    /// Block cache size in bytes (default: 256MB)
    pub block_cache_size: usize,
    /// Write buffer size in bytes (default: 64MB)
    pub write_buffer_size: usize,
    /// Enable fsync after each write (default: true for durability)
    pub sync_writes: bool,
}

impl Default for RocksDbConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("./data/registers"),
            block_cache_size: 256 * 1024 * 1024,
            write_buffer_size: 64 * 1024 * 1024,
            sync_writes: true,
        }
    }
}

impl RocksDbConfig {
    /// Create config for testing (smaller buffers, no sync)
    pub fn for_testing(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            block_cache_size: 8 * 1024 * 1024,
            write_buffer_size: 4 * 1024 * 1024,
            sync_writes: false,
        }
    }
}

/// RocksDB-backed register store.
pub struct RocksDbRegisterStore {
    db: DB,
    config: RocksDbConfig,
}

impl RocksDbRegisterStore {
    /// Open or create the database.
    pub fn open(config: RocksDbConfig) -> Result<Self, StoreError> {
        let mut opts = Options::default();
        opts.create_if_missing(true);
        opts.create_missing_column_families(true);
        opts.set_write_buffer_size(config.write_buffer_size);
        opts.set_compression_type(rocksdb::DBCompressionType::Snappy);

        let mut block_opts = rocksdb::BlockBasedOptions::default();
        block_opts.set_bloom_filter(10.0, false);
        block_opts.set_block_cache(&rocksdb::Cache::new_lru_cache(config.block_cache_size));
        opts.set_block_based_table_factory(&block_opts);

        let mut cf_opts = Options::default();
        cf_opts.set_compression_type(rocksdb::DBCompressionType::Snappy);
        let cf = ColumnFamilyDescriptor::new(CF_STATE, cf_opts);

        let db = DB::open_cf_descriptors(&opts, &config.path, vec![cf]).map_err(|e| {
            StoreError::Backend {
                message: format!("Failed to open RocksDB: {e}"),
            }
        })?;
        debug!(path = %config.path.display(), "register store opened");

        Ok(Self { db, config })
    }

    fn state_cf(&self) -> Result<&ColumnFamily, StoreError> {
        self.db.cf_handle(CF_STATE).ok_or_else(|| StoreError::Backend {
            message: format!("missing column family {CF_STATE}"),
        })
    }
}

impl RegisterStore for RocksDbRegisterStore {
    fn read(&self, address: &Address) -> Result<Option<RegisterState>, StoreError> {
        let cf = self.state_cf()?;
        let Some(bytes) = self
            .db
            .get_cf(cf, address.as_bytes())
            .map_err(|e| StoreError::Backend {
                message: format!("RocksDB get failed: {e}"),
            })?
        else {
            return Ok(None);
        };

        RegisterState::decode(&bytes).map(Some).map_err(|e| {
            warn!(%address, error = %e, "undecodable register state");
            StoreError::Corrupted {
                address: *address,
                reason: e.to_string(),
            }
        })
    }

    fn write(&self, address: &Address, state: &RegisterState) -> Result<(), StoreError> {
        let cf = self.state_cf()?;
        let bytes = state.encode().map_err(|e| StoreError::Backend {
            message: format!("encode failed: {e}"),
        })?;

        let mut write_opts = WriteOptions::default();
        write_opts.set_sync(self.config.sync_writes);

        self.db
            .put_cf_opt(cf, address.as_bytes(), bytes, &write_opts)
            .map_err(|e| StoreError::Backend {
                message: format!("RocksDB put failed: {e}"),
            })
    }
}
