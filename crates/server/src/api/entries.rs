//! 创建、删除、重命名。
//!
//! 每个 handler 只做一次文件系统调用，
//! 结果以一次性提示的形式重定向回目录页面。

use std::sync::Arc;

use axum::Form;
use axum::extract::{Path, State};
use axum::response::Redirect;
use filedock_api_types::{EntryKind, Notice};
use filedock_core::{EntryName, RelativePath};
use filedock_storage::{FileStore, Result};
use serde::Deserialize;

use super::notice::finish;
use super::state::AppState;

#[derive(Debug, Deserialize)]
pub struct PathForm {
    #[serde(default)]
    path: String,
}

#[derive(Debug, Deserialize)]
pub struct CreateFolderForm {
    #[serde(default)]
    path: String,
    #[serde(default)]
    folder_name: String,
}

#[derive(Debug, Deserialize)]
pub struct CreateFileForm {
    #[serde(default)]
    path: String,
    #[serde(default)]
    file_name: String,
}

#[derive(Debug, Deserialize)]
pub struct RenameForm {
    #[serde(default)]
    path: String,
    #[serde(default)]
    old_name: String,
    #[serde(default)]
    new_name: String,
}

/// 创建空文件夹。
pub async fn create_folder(
    State(state): State<Arc<AppState>>,
    Form(form): Form<CreateFolderForm>,
) -> Redirect {
    finish(&form.path, create_folder_in(&state.store, &form))
}

/// 创建空文件。
pub async fn create_file(
    State(state): State<Arc<AppState>>,
    Form(form): Form<CreateFileForm>,
) -> Redirect {
    finish(&form.path, create_file_in(&state.store, &form))
}

/// 删除文件或文件夹。
pub async fn delete_entry(
    State(state): State<Arc<AppState>>,
    Path(filename): Path<String>,
    Form(form): Form<PathForm>,
) -> Redirect {
    finish(&form.path, delete_in(&state.store, &form.path, filename))
}

/// 重命名文件或文件夹。
pub async fn rename_entry(
    State(state): State<Arc<AppState>>,
    Form(form): Form<RenameForm>,
) -> Redirect {
    finish(&form.path, rename_in(&state.store, &form))
}

fn create_folder_in(store: &FileStore, form: &CreateFolderForm) -> Result<Notice> {
    let dir = RelativePath::parse(&form.path)?;
    let name = EntryName::new(form.folder_name.trim())?;
    store.create_folder(&dir, &name)?;
    Ok(Notice::success(format!("文件夹 {name} 创建成功")))
}

fn create_file_in(store: &FileStore, form: &CreateFileForm) -> Result<Notice> {
    let dir = RelativePath::parse(&form.path)?;
    let name = EntryName::new(form.file_name.trim())?;
    store.create_file(&dir, &name)?;
    Ok(Notice::success(format!("文件 {name} 创建成功")))
}

fn delete_in(store: &FileStore, raw_path: &str, filename: String) -> Result<Notice> {
    let dir = RelativePath::parse(raw_path)?;
    let name = EntryName::new(filename)?;
    let message = match store.delete_entry(&dir, &name)? {
        EntryKind::File => format!("文件 {name} 已删除"),
        EntryKind::Folder => format!("文件夹 {name} 已删除"),
    };
    Ok(Notice::success(message))
}

fn rename_in(store: &FileStore, form: &RenameForm) -> Result<Notice> {
    let dir = RelativePath::parse(&form.path)?;
    let old_name = EntryName::new(form.old_name.as_str())?;
    let new_name = EntryName::new(form.new_name.trim())?;
    store.rename_entry(&dir, &old_name, &new_name)?;
    Ok(Notice::success(format!("{old_name} 已重命名为 {new_name}")))
}
