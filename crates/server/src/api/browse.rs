//! 目录浏览页面。

use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::response::{Html, IntoResponse, Redirect, Response};
use filedock_api_types::{Notice, NoticeLevel};
use filedock_core::RelativePath;
use filedock_storage::StorageError;
use serde::Deserialize;

use super::error::{ApiError, classify};
use super::notice::{error_notice, redirect_to_path};
use super::state::AppState;
use crate::view;

/// 目录页面查询参数。
#[derive(Debug, Deserialize)]
pub struct IndexQuery {
    /// 当前目录。
    #[serde(default)]
    path: String,
    /// 重定向携带的提示文本。
    notice: Option<String>,
    /// 提示级别，无法识别的值按成功处理。
    level: Option<String>,
}

/// 渲染目录页面。
pub async fn index(
    State(state): State<Arc<AppState>>,
    Query(query): Query<IndexQuery>,
) -> Result<Response, ApiError> {
    let level = match query.level.as_deref() {
        Some("error") => NoticeLevel::Error,
        _ => NoticeLevel::Success,
    };
    let carried = query.notice.map(|message| Notice { level, message });

    let listing = RelativePath::parse(&query.path)
        .map_err(StorageError::from)
        .and_then(|path| state.store.list_directory(&path));

    match listing {
        Ok(listing) => {
            let page =
                view::directory_page(&listing.current_path, Some(&listing), carried.as_ref());
            Ok(Html(page.into_string()).into_response())
        }
        Err(err) if err.is_recoverable() => {
            let (_, status) = classify(&err);
            let page = view::directory_page(&query.path, None, Some(&error_notice(&err)));
            Ok((status, Html(page.into_string())).into_response())
        }
        Err(err) => Err(err.into()),
    }
}

/// `/open_folder/<path>` 跳转到对应目录。
pub async fn open_folder(Path(path): Path<String>) -> Redirect {
    redirect_to_path(&path)
}

/// `/open_folder` 跳转到根目录。
pub async fn open_root() -> Redirect {
    redirect_to_path("")
}
