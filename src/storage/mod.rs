//! Storage module
//!
//! Durable key-value persistence behind a narrow trait. The engine
//! treats the store as a black box that may fail.

pub mod kv;

pub use kv::{KeyValueStore, MemoryStore, SqliteStore};
