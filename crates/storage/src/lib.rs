//! filedock storage - 上传根目录之下的文件系统操作。
//!
//! 该 crate 为 server 提供目录浏览、增删改、上传落盘与文件夹打包能力，
//! 所有用户路径都经过 [`filedock_core::RelativePath`] 约束在根目录之内。

pub mod archive;
pub mod error;
pub mod filesystem;

pub use archive::{ArchiveExporter, ZipArtifact};
pub use error::{Result, StorageError};
pub use filesystem::{DownloadTarget, FileStore, UploadedFile};
