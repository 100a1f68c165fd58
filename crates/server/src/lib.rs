//! filedock HTTP 服务。

pub mod api;
pub mod config;
pub mod view;

pub use api::{AppState, create_router};
pub use config::ServerConfig;
