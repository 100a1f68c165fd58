//! API 路由模块。
//!
//! 浏览器页面、文件增删改、上传下载与 JSON 接口。

pub mod browse;
pub mod entries;
pub mod error;
pub mod filesystem;
pub mod notice;
pub mod state;
pub mod transfer;

use std::sync::Arc;

use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::config::ServerConfig;

pub use error::ApiError;
pub use filesystem::create_filesystem_router;
pub use state::AppState;

/// 创建完整的应用路由。
pub fn create_router(state: Arc<AppState>, config: &ServerConfig) -> Router {
    let mut router = Router::new()
        // 目录浏览
        .route("/", get(browse::index))
        .route("/open_folder", get(browse::open_root))
        .route("/open_folder/", get(browse::open_root))
        .route("/open_folder/{*path}", get(browse::open_folder))
        // 下载
        .route("/download/{filename}", get(transfer::download_file))
        .route("/download_folder/{foldername}", get(transfer::download_folder))
        // 上传
        .route("/upload", post(transfer::upload_file))
        .route("/upload_folder", post(transfer::upload_folder))
        // 增删改
        .route("/create_folder", post(entries::create_folder))
        .route("/create_file", post(entries::create_file))
        .route("/delete/{filename}", post(entries::delete_entry))
        .route("/rename", post(entries::rename_entry))
        .merge(create_filesystem_router())
        .layer(DefaultBodyLimit::max(config.max_upload_bytes));

    if let Some(public_dir) = &config.public_dir {
        router = router.nest_service("/static", ServeDir::new(public_dir));
    }

    router.layer(TraceLayer::new_for_http()).with_state(state)
}
