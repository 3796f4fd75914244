//! Persistence module.
//!
//! This module provides:
//! - `storage`: the key-value storage trait and its in-memory / directory
//!   backends
//! - `gateway`: versioned-key load/save of the aggregate and user record,
//!   plus the debounced write path

pub mod gateway;
pub mod storage;

pub use gateway::{
    load_root, load_user, save_root, save_user, Debouncer, PersistenceGateway,
    LEGACY_PROJECTS_KEYS, PROJECTS_KEY, USER_KEY, WRITE_QUIET_PERIOD,
};
pub use storage::{DirStorage, KeyValueStorage, MemoryStorage, StorageWriteError};
