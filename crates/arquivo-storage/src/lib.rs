//! Arquivo Storage Library
//!
//! This crate provides the storage abstraction and the local filesystem
//! implementation used for uploaded document files.
//!
//! # Storage key format
//!
//! All document files live under a single prefix: `documents/{stored_filename}`,
//! where the stored filename is the original filename sanitized and prefixed
//! with the upload timestamp in milliseconds (so stored filenames are unique).
//!
//! Keys must not contain `..` or a leading `/`. Key generation is centralized
//! in the `keys` module.

pub mod keys;
pub mod local;
pub mod traits;

// Re-export commonly used types
pub use keys::{sanitize_filename, stored_filename, storage_key};
pub use local::LocalStorage;
pub use traits::{Storage, StorageError, StorageResult};
