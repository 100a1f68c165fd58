mod entry_name;
mod error;
mod filename;
mod relative_path;

pub use entry_name::EntryName;
pub use error::DomainError;
pub use filename::decode_legacy_filename;
pub use relative_path::RelativePath;
