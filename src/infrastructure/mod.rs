//! Adapters implementing the domain ports.

pub mod clock;
pub mod gateway;
pub mod in_memory;
pub mod replica;
#[cfg(feature = "storage-rocksdb")]
pub mod rocksdb;
