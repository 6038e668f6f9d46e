pub mod in_memory;
pub mod locks;
pub mod membership;
pub mod notify;
#[cfg(feature = "storage-rocksdb")]
pub mod rocksdb;
