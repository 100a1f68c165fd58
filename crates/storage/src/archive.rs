//! 文件夹打包模块。
//!
//! 递归遍历文件夹并写入 zip 文件，压缩包根目录对应文件夹的子项本身。

use std::fs::{self, File};
use std::io::{self, ErrorKind};
use std::path::{Path, PathBuf};

use filedock_core::{EntryName, RelativePath};
use tracing::{info, warn};
use walkdir::WalkDir;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::error::{Result, StorageError};
use crate::filesystem::FileStore;

/// Deflate 的最高压缩级别。
const MAX_COMPRESSION_LEVEL: i64 = 9;

/// 打包生成的 zip 文件。
#[derive(Debug, Clone)]
pub struct ZipArtifact {
    /// 下载时使用的文件名，`<文件夹名>.zip`。
    pub file_name: String,
    /// zip 文件的绝对路径。
    pub path: PathBuf,
    /// 写入的条目数量（文件与目录）。
    pub entries: usize,
    /// zip 文件大小（字节）。
    pub size: u64,
}

/// 把上传目录中的文件夹导出为 zip 文件。
///
/// 产物写入独立的打包目录，同名文件夹的再次导出会覆盖旧文件，
/// 导出后不做清理。
#[derive(Debug, Clone)]
pub struct ArchiveExporter {
    store: FileStore,
    archive_root: PathBuf,
}

impl ArchiveExporter {
    pub fn new(store: FileStore, archive_root: impl Into<PathBuf>) -> Self {
        Self {
            store,
            archive_root: archive_root.into(),
        }
    }

    pub fn archive_root(&self) -> &Path {
        &self.archive_root
    }

    /// 打包目录不存在时创建它。
    pub fn ensure_root(&self) -> Result<()> {
        fs::create_dir_all(&self.archive_root)?;
        Ok(())
    }

    /// 打包 `relative/folder_name`。
    ///
    /// 遍历过程中消失的路径只记录警告，指向上传目录之外的符号链接被跳过；
    /// 其他错误终止整个导出。
    pub fn export_folder(
        &self,
        relative: &RelativePath,
        folder_name: &EntryName,
    ) -> Result<ZipArtifact> {
        let target = relative.join(folder_name);
        let source = self.store.confine(&target)?;
        if !source.is_dir() {
            return Err(StorageError::NotADirectory(folder_name.to_string()));
        }

        let file_name = format!("{folder_name}.zip");
        let path = self.archive_root.join(&file_name);
        info!(source = %source.display(), archive = %path.display(), "archiving folder");

        let root = self.store.canonical_root()?;
        let mut writer = ZipWriter::new(File::create(&path)?);
        let entries = write_tree(&source, &root, &mut writer)?;
        writer.finish()?;

        let size = fs::metadata(&path)?.len();
        info!(archive = %path.display(), entries, size, "folder archived");

        Ok(ZipArtifact {
            file_name,
            path,
            entries,
            size,
        })
    }
}

fn write_tree(source: &Path, root: &Path, writer: &mut ZipWriter<File>) -> Result<usize> {
    let options = SimpleFileOptions::default()
        .compression_method(CompressionMethod::Deflated)
        .compression_level(Some(MAX_COMPRESSION_LEVEL));

    let mut entries = 0;
    let mut walker = WalkDir::new(source)
        .min_depth(1)
        .follow_links(true)
        .sort_by_file_name()
        .into_iter();

    while let Some(entry) = walker.next() {
        let entry = match entry {
            Ok(entry) => entry,
            Err(err) if is_vanished(err.io_error()) => {
                warn!(path = ?err.path(), error = %err, "path vanished while archiving");
                continue;
            }
            Err(err) => return Err(err.into()),
        };

        if entry.path_is_symlink() {
            match fs::canonicalize(entry.path()) {
                Ok(real) if real.starts_with(root) => {}
                Ok(real) => {
                    warn!(
                        path = %entry.path().display(),
                        real = %real.display(),
                        "skipping link outside upload root"
                    );
                    if entry.file_type().is_dir() {
                        walker.skip_current_dir();
                    }
                    continue;
                }
                Err(err) if err.kind() == ErrorKind::NotFound => {
                    warn!(path = %entry.path().display(), "link vanished while archiving");
                    continue;
                }
                Err(err) => return Err(err.into()),
            }
        }

        let Ok(relative) = entry.path().strip_prefix(source) else {
            continue;
        };
        let name = archive_name(relative);

        if entry.file_type().is_dir() {
            writer.add_directory(format!("{name}/"), options)?;
            entries += 1;
            continue;
        }

        let mut file = match File::open(entry.path()) {
            Ok(file) => file,
            Err(err) if err.kind() == ErrorKind::NotFound => {
                warn!(path = %entry.path().display(), "file vanished while archiving");
                continue;
            }
            Err(err) => return Err(err.into()),
        };
        let large_file = file.metadata()?.len() >= u64::from(u32::MAX);

        writer.start_file(name, options.large_file(large_file))?;
        io::copy(&mut file, writer)?;
        entries += 1;
    }

    Ok(entries)
}

fn is_vanished(err: Option<&io::Error>) -> bool {
    err.is_some_and(|err| err.kind() == ErrorKind::NotFound)
}

/// zip 条目名统一使用 `/` 分隔。
fn archive_name(relative: &Path) -> String {
    relative
        .components()
        .map(|component| component.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}
