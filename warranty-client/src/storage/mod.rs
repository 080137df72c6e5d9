//! Device-side persistence

pub mod kv;
pub mod local;
pub mod secure;

pub use kv::{FileKeyValueStore, KeyValueStore, MemoryKeyValueStore};
pub use local::LocalStorage;
pub use secure::{KEYRING_SERVICE, KeyringSecureStore, MemorySecureStore, SecureStore};
