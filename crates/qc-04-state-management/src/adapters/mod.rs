pub mod memory_db;
#[cfg(feature = "rocksdb")]
pub mod rocksdb_store;

pub use memory_db::InMemoryVersionStore;
#[cfg(feature = "rocksdb")]
pub use rocksdb_store::{RocksDbConfig, RocksDbVersionStore};
