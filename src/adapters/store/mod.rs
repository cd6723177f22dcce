//! Session persistence adapters.

mod in_memory;
mod kv;

pub use in_memory::InMemoryKeyValueStore;
pub use kv::KvSessionStore;
