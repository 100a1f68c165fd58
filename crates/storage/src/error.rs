use filedock_core::DomainError;
use thiserror::Error;

/// 存储层错误类型。
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("{0} 不存在")]
    NotFound(String),

    #[error("{0} 已存在")]
    AlreadyExists(String),

    #[error("{0} 不是文件夹")]
    NotADirectory(String),

    #[error("{0} 是文件夹")]
    IsADirectory(String),

    #[error("{0} 指向上传目录之外")]
    OutsideRoot(String),

    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error("IO 错误: {0}")]
    Io(#[from] std::io::Error),

    #[error("压缩错误: {0}")]
    Archive(#[from] zip::result::ZipError),

    #[error("遍历目录失败: {0}")]
    Walk(#[from] walkdir::Error),
}

impl StorageError {
    /// 可以作为一次性提示返回给用户的错误；其余错误视为未处理故障。
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::NotFound(_)
                | Self::AlreadyExists(_)
                | Self::NotADirectory(_)
                | Self::IsADirectory(_)
                | Self::OutsideRoot(_)
                | Self::Domain(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, StorageError>;

#[cfg(test)]
mod tests {
    use super::StorageError;
    use filedock_core::DomainError;

    #[test]
    fn user_facing_errors_are_recoverable() {
        assert!(StorageError::NotFound("docs".into()).is_recoverable());
        assert!(StorageError::AlreadyExists("docs".into()).is_recoverable());
        assert!(StorageError::Domain(DomainError::InvalidPath("..".into())).is_recoverable());
    }

    #[test]
    fn io_errors_are_not_recoverable() {
        let err = StorageError::from(std::io::Error::from(std::io::ErrorKind::PermissionDenied));
        assert!(!err.is_recoverable());
    }
}
