//! Database repositories for the data access layer
//!
//! This crate contains the repository over the `documents` table: CRUD
//! operations, the extraction write-back used by the background queue, and
//! filtered/sorted/paginated search.

pub mod documents;

pub use documents::DocumentRepository;
