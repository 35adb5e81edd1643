pub mod atomic_toml;
pub mod jsonl;
pub mod secret_storage;

pub use atomic_toml::{AtomicTomlError, AtomicTomlFile};
pub use jsonl::JsonlFile;
pub use secret_storage::{SecretStorage, SecretStorageError};
