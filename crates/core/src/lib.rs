//! Domain types for the filedock file manager.

pub mod domain;

pub use domain::{DomainError, EntryName, RelativePath, decode_legacy_filename};
