//! 上传与下载。

use std::path::Path as FsPath;
use std::sync::Arc;

use axum::body::Body;
use axum::extract::{Multipart, Path, Query, State};
use axum::http::header;
use axum::response::{IntoResponse, Redirect, Response};
use filedock_api_types::Notice;
use filedock_core::{EntryName, RelativePath, decode_legacy_filename};
use filedock_storage::{FileStore, StorageError, UploadedFile};
use serde::Deserialize;
use tokio_util::io::ReaderStream;
use tracing::{error, info, warn};

use super::error::ApiError;
use super::notice::finish;
use super::state::AppState;

/// 下载查询参数。
#[derive(Debug, Deserialize)]
pub struct PathQuery {
    #[serde(default)]
    path: String,
}

/// 下载单个文件。
pub async fn download_file(
    State(state): State<Arc<AppState>>,
    Path(filename): Path<String>,
    Query(query): Query<PathQuery>,
) -> Result<Response, ApiError> {
    let located = RelativePath::parse(&query.path)
        .and_then(|dir| Ok((dir, EntryName::new(filename)?)))
        .map_err(StorageError::from)
        .and_then(|(dir, name)| state.store.open_download(&dir, &name));

    match located {
        Ok(target) => attachment(&target.path, &target.file_name).await,
        Err(err) => recover(&query.path, err),
    }
}

/// 打包并下载文件夹。
///
/// 打包在阻塞线程池中完成，zip 文件写完之后才开始响应。
pub async fn download_folder(
    State(state): State<Arc<AppState>>,
    Path(foldername): Path<String>,
    Query(query): Query<PathQuery>,
) -> Result<Response, ApiError> {
    let exporter = state.exporter.clone();
    let raw_path = query.path.clone();
    let exported = tokio::task::spawn_blocking(move || {
        let dir = RelativePath::parse(&raw_path)?;
        let name = EntryName::new(foldername)?;
        exporter.export_folder(&dir, &name)
    })
    .await
    .map_err(|err| {
        error!(error = %err, "archive task failed");
        ApiError::internal(format!("archive task failed: {err}"))
    })?;

    match exported {
        Ok(artifact) => attachment(&artifact.path, &artifact.file_name).await,
        Err(err) => recover(&query.path, err),
    }
}

/// 上传单个文件。
pub async fn upload_file(
    State(state): State<Arc<AppState>>,
    multipart: Multipart,
) -> Result<Redirect, ApiError> {
    let form = UploadForm::read(multipart, "file").await?;
    Ok(finish(&form.path, save_file(&state.store, &form)))
}

/// 上传文件夹，文件名中携带的相对路径决定目录结构。
pub async fn upload_folder(
    State(state): State<Arc<AppState>>,
    multipart: Multipart,
) -> Result<Redirect, ApiError> {
    let form = UploadForm::read(multipart, "files").await?;
    let outcome = save_folder(&state.store, &form.path, form.files);
    Ok(finish(&form.path, outcome))
}

fn save_file(store: &FileStore, form: &UploadForm) -> filedock_storage::Result<Notice> {
    let dir = RelativePath::parse(&form.path)?;
    let Some((raw_name, contents)) = form.files.first() else {
        return Ok(Notice::error("未选择文件"));
    };
    // 只保留文件名部分
    let base_name = raw_name.rsplit(['/', '\\']).next().unwrap_or_default();
    let name = EntryName::new(base_name)?;
    store.save_upload(&dir, &name, contents)?;
    Ok(Notice::success(format!("文件 {name} 上传成功")))
}

fn save_folder(
    store: &FileStore,
    raw_path: &str,
    files: Vec<(String, Vec<u8>)>,
) -> filedock_storage::Result<Notice> {
    let dir = RelativePath::parse(raw_path)?;
    if files.is_empty() {
        return Ok(Notice::error("未选择文件夹"));
    }

    let files = files
        .into_iter()
        .map(|(name, contents)| {
            Ok(UploadedFile {
                relative_path: RelativePath::parse(&name)?,
                contents,
            })
        })
        .collect::<filedock_storage::Result<Vec<_>>>()?;
    let saved = store.save_folder_upload(&dir, &files)?;
    Ok(Notice::success(format!("文件夹上传成功，共 {saved} 个文件")))
}

/// 解析后的上传表单。
#[derive(Debug, Default)]
struct UploadForm {
    path: String,
    /// 解码后的文件名与内容。
    files: Vec<(String, Vec<u8>)>,
}

impl UploadForm {
    async fn read(mut multipart: Multipart, file_field: &str) -> Result<Self, ApiError> {
        let mut form = UploadForm::default();

        while let Some(field) = multipart.next_field().await? {
            let field_name = field.name().map(str::to_owned);
            match field_name.as_deref() {
                Some("path") => form.path = field.text().await?,
                Some(name) if name == file_field => {
                    let file_name = field
                        .file_name()
                        .map(|raw| decode_legacy_filename(raw).into_owned())
                        .unwrap_or_default();
                    let contents = field.bytes().await?;
                    // 浏览器在未选择文件时也会提交一个空的文件字段
                    if file_name.is_empty() {
                        continue;
                    }
                    form.files.push((file_name, contents.to_vec()));
                }
                other => {
                    warn!(field = ?other, "ignoring unexpected multipart field");
                }
            }
        }

        info!(path = %form.path, files = form.files.len(), "upload received");
        Ok(form)
    }
}

/// 可恢复的错误重定向回目录页面并附带提示，其余错误终止请求。
fn recover(raw_path: &str, err: StorageError) -> Result<Response, ApiError> {
    if err.is_recoverable() {
        Ok(finish(raw_path, Err(err)).into_response())
    } else {
        Err(err.into())
    }
}

/// 以附件形式流式返回文件。
async fn attachment(path: &FsPath, file_name: &str) -> Result<Response, ApiError> {
    let file = tokio::fs::File::open(path).await.map_err(StorageError::from)?;
    let len = file.metadata().await.map_err(StorageError::from)?.len();
    let mime = mime_guess::from_path(file_name).first_or_octet_stream();

    Response::builder()
        .header(header::CONTENT_TYPE, mime.essence_str())
        .header(header::CONTENT_LENGTH, len)
        .header(header::CONTENT_DISPOSITION, content_disposition(file_name))
        .body(Body::from_stream(ReaderStream::new(file)))
        .map_err(|err| ApiError::internal(format!("failed to build download response: {err}")))
}

/// `attachment` 头，同时提供 ASCII 回退文件名与 RFC 5987 编码的完整文件名。
fn content_disposition(file_name: &str) -> String {
    let fallback: String = file_name
        .chars()
        .map(|c| {
            if c.is_ascii() && !c.is_ascii_control() && c != '"' && c != '\\' {
                c
            } else {
                '_'
            }
        })
        .collect();

    format!(
        "attachment; filename=\"{fallback}\"; filename*=UTF-8''{}",
        urlencoding::encode(file_name)
    )
}
