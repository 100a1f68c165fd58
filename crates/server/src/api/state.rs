//! 统一的应用状态。

use std::path::PathBuf;

use filedock_storage::{ArchiveExporter, FileStore};

/// 统一的应用状态，包含所有 handler 共享的存储。
#[derive(Debug, Clone)]
pub struct AppState {
    /// 上传根目录之下的文件存储。
    pub store: FileStore,
    /// 文件夹打包器。
    pub exporter: ArchiveExporter,
}

impl AppState {
    /// 创建新的应用状态。
    pub fn new(upload_root: impl Into<PathBuf>, archive_root: impl Into<PathBuf>) -> Self {
        let store = FileStore::new(upload_root);
        let exporter = ArchiveExporter::new(store.clone(), archive_root);
        Self { store, exporter }
    }

    /// 创建上传目录与打包目录。
    pub fn prepare(&self) -> filedock_storage::Result<()> {
        self.store.ensure_root()?;
        self.exporter.ensure_root()
    }
}
