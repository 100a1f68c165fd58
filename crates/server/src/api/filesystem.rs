//! 文件系统 JSON API 路由。
//!
//! 提供与页面相同的目录列表，供脚本或其他前端使用。

use std::sync::Arc;

use axum::extract::{Query, State};
use axum::routing::get;
use axum::{Json, Router};
use filedock_api_types::{DirectoryListing, HealthCheckResponse};
use filedock_core::RelativePath;
use serde::Deserialize;

use super::error::ApiError;
use super::state::AppState;

/// 创建文件系统 API 路由。
pub fn create_filesystem_router() -> Router<Arc<AppState>> {
    Router::new()
        // 列出目录内容
        .route("/api/fs/list", get(list_directory))
        // 存活检查
        .route("/api/health", get(health))
}

/// 列出目录内容查询参数。
#[derive(Debug, Deserialize)]
struct ListDirectoryQuery {
    /// 相对于上传根目录的路径，缺省为根目录。
    #[serde(default)]
    path: String,
}

/// 列出目录内容。
async fn list_directory(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ListDirectoryQuery>,
) -> Result<Json<DirectoryListing>, ApiError> {
    let path = RelativePath::parse(&query.path)?;
    let listing = state.store.list_directory(&path)?;
    Ok(Json(listing))
}

async fn health() -> Json<HealthCheckResponse> {
    Json(HealthCheckResponse::ok())
}
