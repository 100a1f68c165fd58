//! 文件系统存储模块。
//!
//! 把用户提交的相对路径映射到上传根目录之下，并提供列目录、创建、删除、
//! 重命名与上传落盘等单步操作。

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use filedock_api_types::{DirectoryEntry, DirectoryListing, EntryKind};
use filedock_core::{EntryName, RelativePath};
use tracing::{info, warn};

use crate::error::{Result, StorageError};

/// 待下载的单个文件。
#[derive(Debug, Clone)]
pub struct DownloadTarget {
    /// 文件的绝对路径。
    pub path: PathBuf,
    /// 文件名。
    pub file_name: String,
    /// 文件大小（字节）。
    pub len: u64,
}

/// 文件夹上传中的单个文件。
#[derive(Debug, Clone)]
pub struct UploadedFile {
    /// 相对于上传目标目录的路径，可以包含子目录。
    pub relative_path: RelativePath,
    /// 文件内容。
    pub contents: Vec<u8>,
}

/// 上传根目录之下的文件存储。
#[derive(Debug, Clone)]
pub struct FileStore {
    root: PathBuf,
}

impl FileStore {
    /// 创建以 `root` 为上传根目录的存储。
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// 上传根目录。
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// 根目录不存在时创建它。
    pub fn ensure_root(&self) -> Result<()> {
        fs::create_dir_all(&self.root)?;
        Ok(())
    }

    /// 相对路径对应的绝对路径。
    pub fn resolve(&self, relative: &RelativePath) -> PathBuf {
        relative.to_path_under(&self.root)
    }

    /// 列出目录的直接子项。
    pub fn list_directory(&self, relative: &RelativePath) -> Result<DirectoryListing> {
        let path = self.confine(relative)?;
        if !path.is_dir() {
            return Err(StorageError::NotADirectory(display(relative)));
        }

        info!(path = %path.display(), "listing directory");

        let current = relative.to_string();
        let mut entries = Vec::new();
        for entry in fs::read_dir(&path).map_err(|err| io_error(relative, err))? {
            let entry = entry?;
            let name = entry.file_name().to_string_lossy().into_owned();
            let kind = match fs::metadata(entry.path()) {
                Ok(metadata) if metadata.is_dir() => EntryKind::Folder,
                Ok(_) => EntryKind::File,
                // 悬空的符号链接
                Err(err) if err.kind() == ErrorKind::NotFound => EntryKind::File,
                Err(err) => return Err(err.into()),
            };
            let relative_path = if current.is_empty() {
                name.clone()
            } else {
                format!("{current}/{name}")
            };

            entries.push(DirectoryEntry {
                name,
                kind,
                relative_path,
            });
        }

        entries.sort_by(|a, b| a.name.cmp(&b.name));

        Ok(DirectoryListing {
            current_path: current,
            parent_path: relative.parent().map(|p| p.to_string()),
            entries,
        })
    }

    /// 定位待下载的文件。
    pub fn open_download(
        &self,
        relative: &RelativePath,
        name: &EntryName,
    ) -> Result<DownloadTarget> {
        let target = relative.join(name);
        let path = self.confine(&target)?;
        let metadata = fs::metadata(&path).map_err(|err| io_error(&target, err))?;
        if metadata.is_dir() {
            return Err(StorageError::IsADirectory(name.to_string()));
        }

        Ok(DownloadTarget {
            path,
            file_name: name.to_string(),
            len: metadata.len(),
        })
    }

    /// 创建空文件夹。
    pub fn create_folder(&self, relative: &RelativePath, name: &EntryName) -> Result<PathBuf> {
        self.require_directory(relative)?;
        let path = self.resolve(&relative.join(name));
        if path.try_exists()? {
            return Err(StorageError::AlreadyExists(name.to_string()));
        }

        fs::create_dir(&path)?;
        info!(path = %path.display(), "folder created");
        Ok(path)
    }

    /// 创建空文件。
    pub fn create_file(&self, relative: &RelativePath, name: &EntryName) -> Result<PathBuf> {
        self.require_directory(relative)?;
        let path = self.resolve(&relative.join(name));
        if path.try_exists()? {
            return Err(StorageError::AlreadyExists(name.to_string()));
        }

        match fs::OpenOptions::new().write(true).create_new(true).open(&path) {
            Ok(_) => {}
            Err(err) if err.kind() == ErrorKind::AlreadyExists => {
                return Err(StorageError::AlreadyExists(name.to_string()));
            }
            Err(err) => return Err(err.into()),
        }

        info!(path = %path.display(), "file created");
        Ok(path)
    }

    /// 删除文件或文件夹，文件夹会被递归删除。符号链接只删除链接本身。
    pub fn delete_entry(&self, relative: &RelativePath, name: &EntryName) -> Result<EntryKind> {
        self.confine(relative)?;
        let path = self.resolve(&relative.join(name));
        let metadata = fs::symlink_metadata(&path).map_err(|err| match err.kind() {
            ErrorKind::NotFound => StorageError::NotFound(name.to_string()),
            _ => err.into(),
        })?;

        let kind = if metadata.is_dir() {
            fs::remove_dir_all(&path)?;
            EntryKind::Folder
        } else {
            fs::remove_file(&path)?;
            EntryKind::File
        };

        info!(path = %path.display(), ?kind, "entry deleted");
        Ok(kind)
    }

    /// 重命名文件或文件夹。目标名称已被占用时不做任何修改。
    pub fn rename_entry(
        &self,
        relative: &RelativePath,
        old_name: &EntryName,
        new_name: &EntryName,
    ) -> Result<()> {
        self.confine(relative)?;
        let from = self.resolve(&relative.join(old_name));
        let to = self.resolve(&relative.join(new_name));

        if fs::symlink_metadata(&from).is_err_and(|err| err.kind() == ErrorKind::NotFound) {
            return Err(StorageError::NotFound(old_name.to_string()));
        }
        if old_name != new_name && to.try_exists()? {
            return Err(StorageError::AlreadyExists(new_name.to_string()));
        }

        fs::rename(&from, &to)?;
        info!(from = %from.display(), to = %to.display(), "entry renamed");
        Ok(())
    }

    /// 保存单个上传文件，同名文件会被覆盖。
    pub fn save_upload(
        &self,
        relative: &RelativePath,
        file_name: &EntryName,
        contents: &[u8],
    ) -> Result<PathBuf> {
        self.require_directory(relative)?;
        let path = self.upload_target(&relative.join(file_name))?;

        fs::write(&path, contents)?;
        info!(path = %path.display(), bytes = contents.len(), "file uploaded");
        Ok(path)
    }

    /// 保存文件夹上传，按每个文件携带的相对路径重建目录结构。
    ///
    /// 写入前检查全部目标，任何一个目标冲突时不写入任何文件。
    pub fn save_folder_upload(
        &self,
        relative: &RelativePath,
        files: &[UploadedFile],
    ) -> Result<usize> {
        self.require_directory(relative)?;

        let mut targets = Vec::with_capacity(files.len());
        for file in files {
            if file.relative_path.is_root() {
                warn!("skipping uploaded file without a name");
                continue;
            }
            let path = self.folder_upload_target(relative, &file.relative_path)?;
            targets.push((path, &file.contents));
        }

        for (path, contents) in &targets {
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::write(path, contents)?;
        }

        let saved = targets.len();
        info!(dir = %self.resolve(relative).display(), files = saved, "folder uploaded");
        Ok(saved)
    }

    /// 解析相对路径，并确认解析符号链接之后仍位于上传根目录之下。
    pub(crate) fn confine(&self, relative: &RelativePath) -> Result<PathBuf> {
        let path = self.resolve(relative);
        let real = fs::canonicalize(&path).map_err(|err| io_error(relative, err))?;
        if real.starts_with(self.canonical_root()?) {
            Ok(path)
        } else {
            warn!(path = %path.display(), real = %real.display(), "path escapes upload root");
            Err(StorageError::OutsideRoot(display(relative)))
        }
    }

    pub(crate) fn canonical_root(&self) -> Result<PathBuf> {
        Ok(fs::canonicalize(&self.root)?)
    }

    fn require_directory(&self, relative: &RelativePath) -> Result<PathBuf> {
        let path = self.confine(relative)?;
        if path.is_dir() {
            Ok(path)
        } else {
            Err(StorageError::NotADirectory(display(relative)))
        }
    }

    /// 上传的写入位置；已存在的目标必须是上传根目录之内的文件。
    fn upload_target(&self, target: &RelativePath) -> Result<PathBuf> {
        let path = self.resolve(target);
        match fs::symlink_metadata(&path) {
            Ok(_) => {
                self.confine(target)?;
                if path.is_dir() {
                    return Err(StorageError::IsADirectory(display(target)));
                }
            }
            Err(err) if err.kind() == ErrorKind::NotFound => {}
            Err(err) => return Err(err.into()),
        }
        Ok(path)
    }

    /// 文件夹上传中单个文件的写入位置，沿途已存在的每一级都必须是文件夹。
    fn folder_upload_target(
        &self,
        relative: &RelativePath,
        file: &RelativePath,
    ) -> Result<PathBuf> {
        for ancestor in file.ancestors() {
            let dir = relative.join_relative(&ancestor);
            match fs::symlink_metadata(self.resolve(&dir)) {
                Ok(_) => {
                    self.require_directory(&dir)?;
                }
                // 余下的各级目录在写入时创建
                Err(err) if err.kind() == ErrorKind::NotFound => {
                    return Ok(self.resolve(&relative.join_relative(file)));
                }
                Err(err) => return Err(err.into()),
            }
        }

        self.upload_target(&relative.join_relative(file))
    }
}

/// 用户可见的路径描述，根目录显示为 `/`。
pub(crate) fn display(relative: &RelativePath) -> String {
    if relative.is_root() {
        "/".to_string()
    } else {
        relative.to_string()
    }
}

/// 把 `NotFound` 类 IO 错误转换为 [`StorageError::NotFound`]。
pub(crate) fn io_error(relative: &RelativePath, err: std::io::Error) -> StorageError {
    if err.kind() == ErrorKind::NotFound {
        StorageError::NotFound(display(relative))
    } else {
        StorageError::Io(err)
    }
}
