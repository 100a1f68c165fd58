//! 一次性提示。
//!
//! 提示通过重定向地址的查询参数传递，不依赖服务端会话。
//! 页面渲染后由脚本把参数从地址栏移除，刷新不会再次显示。

use axum::response::Redirect;
use filedock_api_types::Notice;
use filedock_core::{DomainError, RelativePath};
use filedock_storage::StorageError;
use tracing::error;

/// 未处理错误对应的通用提示，具体原因只写入日志。
pub const GENERIC_FAILURE: &str = "操作失败，请稍后重试";

/// 携带提示重定向回目录页面。
pub fn redirect_with_notice(path: &str, notice: &Notice) -> Redirect {
    Redirect::to(&format!(
        "/?path={}&level={}&notice={}",
        urlencoding::encode(path),
        notice.level.as_str(),
        urlencoding::encode(&notice.message)
    ))
}

/// 重定向到目录页面，不带提示。
pub fn redirect_to_path(path: &str) -> Redirect {
    Redirect::to(&format!("/?path={}", urlencoding::encode(path)))
}

/// 把单步操作的结果转换为重定向。
///
/// 可恢复的错误变为对应的错误提示；其余错误记录日志后变为通用的失败提示。
pub fn finish(raw_path: &str, outcome: filedock_storage::Result<Notice>) -> Redirect {
    let path = normalized(raw_path);
    let notice = match outcome {
        Ok(notice) => notice,
        Err(err) if err.is_recoverable() => error_notice(&err),
        Err(err) => {
            error!(path = %path, error = %err, "operation failed");
            Notice::error(GENERIC_FAILURE)
        }
    };
    redirect_with_notice(&path, &notice)
}

/// 可恢复错误对应的提示文本。
pub fn error_notice(err: &StorageError) -> Notice {
    let message = match err {
        StorageError::Domain(DomainError::InvalidPath(path)) => format!("路径无效: {path}"),
        StorageError::Domain(DomainError::InvalidName(name)) => format!("名称无效: {name:?}"),
        other => other.to_string(),
    };
    Notice::error(message)
}

/// 重定向使用的规范化路径；非法路径回到根目录。
fn normalized(raw_path: &str) -> String {
    RelativePath::parse(raw_path)
        .map(|path| path.to_string())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use axum::http::header::LOCATION;
    use axum::response::IntoResponse;

    use super::*;

    fn location(redirect: Redirect) -> String {
        let response = redirect.into_response();
        response.headers()[LOCATION]
            .to_str()
            .expect("ascii location")
            .to_string()
    }

    #[test]
    fn success_notice_is_encoded_into_query() {
        let notice = Notice::success("文件 a b 创建成功");
        let url = location(redirect_with_notice("docs/2024", &notice));

        assert_eq!(
            url,
            format!(
                "/?path=docs%2F2024&level=success&notice={}",
                urlencoding::encode("文件 a b 创建成功")
            )
        );
    }

    #[test]
    fn recoverable_errors_become_error_notices() {
        let url = location(finish("docs", Err(StorageError::NotFound("ghost".into()))));

        assert_eq!(
            url,
            format!("/?path=docs&level=error&notice={}", urlencoding::encode("ghost 不存在"))
        );
    }

    #[test]
    fn traversal_paths_redirect_to_root() {
        let redirect = finish("../etc", Err(DomainError::InvalidPath("../etc".into()).into()));

        assert!(location(redirect).starts_with("/?path=&level=error"));
    }

    #[test]
    fn unhandled_errors_become_generic_notice() {
        let err = std::io::Error::from(std::io::ErrorKind::PermissionDenied);
        let url = location(finish("docs", Err(err.into())));

        assert_eq!(
            url,
            format!("/?path=docs&level=error&notice={}", urlencoding::encode(GENERIC_FAILURE))
        );
    }
}
