//! # RocksDB Version Store
//!
//! Persistent `VersionStore`. Every commit is one `WriteBatch` carrying the
//! encoded version and the latest-height marker, so a crash leaves either the
//! old or the new latest version, never a half-written one.
//!
//! ## Key Layout
//!
//! - `v/<height as 8 big-endian bytes>` - bincode-encoded version
//! - `meta/latest` - last committed height (8 big-endian bytes)

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use quantum_telemetry::{log_height_event, STATE_VERSIONS_PRUNED};
use rocksdb::{Direction, IteratorMode, Options, WriteBatch, WriteOptions, DB};
use serde::{Deserialize, Serialize};
use shared_types::{AppState, ConsensusParams, Height, Validator, ValidatorSet};
use std::sync::Arc;

use crate::domain::{StateError, StateVersion};
use crate::ports::VersionStore;

const VERSION_PREFIX: &[u8] = b"v/";
const LATEST_KEY: &[u8] = b"meta/latest";

/// RocksDB configuration
#[derive(Debug, Clone)]
pub struct RocksDbConfig {
    /// Path to the database directory
    pub path: String,
    /// Block cache size in bytes (default: 64MB)
    pub block_cache_size: usize,
    /// Write buffer size in bytes (default: 32MB)
    pub write_buffer_size: usize,
    /// Enable fsync after each commit (default: true for durability)
    pub sync_writes: bool,
}

impl Default for RocksDbConfig {
    fn default() -> Self {
        Self {
            path: "./data/state".to_string(),
            block_cache_size: 64 * 1024 * 1024, // 64MB
            write_buffer_size: 32 * 1024 * 1024, // 32MB
            sync_writes: true,
        }
    }
}

impl RocksDbConfig {
    /// Create config for testing (smaller buffers, no sync)
    pub fn for_testing(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            block_cache_size: 8 * 1024 * 1024,  // 8MB
            write_buffer_size: 4 * 1024 * 1024, // 4MB
            sync_writes: false,
        }
    }
}

/// On-disk form of a version. Module bytes are stored as plain pairs.
#[derive(Serialize, Deserialize)]
struct PersistedVersion {
    height: Height,
    chain_id: String,
    time: DateTime<Utc>,
    modules: Vec<(String, Vec<u8>)>,
    consensus_params: ConsensusParams,
    validators: Vec<Validator>,
}

impl PersistedVersion {
    fn from_version(version: &StateVersion) -> Self {
        Self {
            height: version.height,
            chain_id: version.chain_id.clone(),
            time: version.time,
            modules: version
                .app_state
                .iter()
                .map(|m| (m.name.clone(), m.data.clone()))
                .collect(),
            consensus_params: version.consensus_params.clone(),
            validators: version.validators.validators().to_vec(),
        }
    }

    fn into_version(self) -> Result<StateVersion, StateError> {
        let app_state = AppState::from_modules(self.modules)
            .map_err(|e| StateError::Serialization(e.to_string()))?;
        let validators = ValidatorSet::new(self.validators)
            .map_err(|e| StateError::Serialization(e.to_string()))?;
        Ok(StateVersion {
            height: self.height,
            chain_id: self.chain_id,
            time: self.time,
            app_state,
            consensus_params: self.consensus_params,
            validators,
        })
    }
}

fn version_key(height: Height) -> Vec<u8> {
    let mut key = Vec::with_capacity(VERSION_PREFIX.len() + 8);
    key.extend_from_slice(VERSION_PREFIX);
    key.extend_from_slice(&height.to_be_bytes());
    key
}

fn decode_height(bytes: &[u8]) -> Result<Height, StateError> {
    let raw: [u8; 8] = bytes
        .try_into()
        .map_err(|_| StateError::Serialization(format!("bad height length {}", bytes.len())))?;
    Ok(Height::from_be_bytes(raw))
}

/// RocksDB-backed version store.
pub struct RocksDbVersionStore {
    db: Arc<RwLock<DB>>,
    config: RocksDbConfig,
}

impl RocksDbVersionStore {
    /// Open or create a RocksDB database
    pub fn open(config: RocksDbConfig) -> Result<Self, StateError> {
        let mut opts = Options::default();
        opts.create_if_missing(true);
        opts.set_write_buffer_size(config.write_buffer_size);
        opts.set_compression_type(rocksdb::DBCompressionType::Snappy);

        let mut block_opts = rocksdb::BlockBasedOptions::default();
        block_opts.set_bloom_filter(10.0, false);
        block_opts.set_block_cache(&rocksdb::Cache::new_lru_cache(config.block_cache_size));
        opts.set_block_based_table_factory(&block_opts);

        let db = DB::open(&opts, &config.path)
            .map_err(|e| StateError::Database(format!("Failed to open RocksDB: {}", e)))?;

        Ok(Self {
            db: Arc::new(RwLock::new(db)),
            config,
        })
    }

    fn write_opts(&self) -> WriteOptions {
        let mut write_opts = WriteOptions::default();
        write_opts.set_sync(self.config.sync_writes);
        write_opts
    }

    fn read_latest(db: &DB) -> Result<Height, StateError> {
        match db
            .get(LATEST_KEY)
            .map_err(|e| StateError::Database(format!("RocksDB get failed: {}", e)))?
        {
            Some(bytes) => decode_height(&bytes),
            None => Ok(0),
        }
    }
}

impl VersionStore for RocksDbVersionStore {
    fn commit(&self, version: StateVersion) -> Result<Arc<StateVersion>, StateError> {
        // Writers are serialized by the write lock; readers keep going on snapshots.
        let db = self.db.write();
        let last = Self::read_latest(&db)?;
        if version.height <= last {
            return Err(StateError::HeightOrder {
                height: version.height,
                last,
            });
        }

        let encoded = bincode::serialize(&PersistedVersion::from_version(&version))
            .map_err(|e| StateError::Serialization(e.to_string()))?;

        let mut batch = WriteBatch::default();
        batch.put(version_key(version.height), &encoded);
        batch.put(LATEST_KEY, version.height.to_be_bytes());

        db.write_opt(batch, &self.write_opts())
            .map_err(|e| StateError::Database(format!("RocksDB batch write failed: {}", e)))?;

        Ok(Arc::new(version))
    }

    fn load_at_height(&self, height: Height) -> Result<Arc<StateVersion>, StateError> {
        let db = self.db.read();
        let bytes = db
            .get(version_key(height))
            .map_err(|e| StateError::Database(format!("RocksDB get failed: {}", e)))?
            .ok_or(StateError::HeightNotFound { height })?;

        let persisted: PersistedVersion = bincode::deserialize(&bytes)
            .map_err(|e| StateError::Serialization(e.to_string()))?;
        persisted.into_version().map(Arc::new)
    }

    fn latest_height(&self) -> Result<Height, StateError> {
        let db = self.db.read();
        Self::read_latest(&db)
    }

    fn prune(&self, retain_from: Height) -> Result<u64, StateError> {
        let db = self.db.write();
        let cutoff = retain_from.min(Self::read_latest(&db)?);
        let end = version_key(cutoff);

        let mut batch = WriteBatch::default();
        let mut pruned = 0u64;
        for item in db.iterator(IteratorMode::From(VERSION_PREFIX, Direction::Forward)) {
            let (key, _) =
                item.map_err(|e| StateError::Database(format!("RocksDB scan failed: {}", e)))?;
            if !key.starts_with(VERSION_PREFIX) || key.as_ref() >= end.as_slice() {
                break;
            }
            batch.delete(&key);
            pruned += 1;
        }

        if pruned > 0 {
            db.write_opt(batch, &self.write_opts())
                .map_err(|e| StateError::Database(format!("RocksDB batch write failed: {}", e)))?;
            STATE_VERSIONS_PRUNED.inc_by(pruned as f64);
            log_height_event!(debug, "state-management", "Pruned state versions", cutoff, pruned = pruned);
        }
        Ok(pruned)
    }
}
