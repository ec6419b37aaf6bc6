//! cms-errors - 统一错误处理
//!
//! 服务层错误 (`AppError`) 与持久化层错误 (`PersistenceError`)

use thiserror::Error;

/// 持久化处理器错误
///
/// 由 `RoleHandler` 等外部持久化实现返回
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PersistenceError {
    #[error("Could not find '{kind}' with identifier '{identifier}'")]
    NotFound { kind: String, identifier: String },

    #[error("Storage backend error: {0}")]
    Backend(String),
}

impl PersistenceError {
    pub fn not_found(kind: impl Into<String>, identifier: impl ToString) -> Self {
        Self::NotFound {
            kind: kind.into(),
            identifier: identifier.to_string(),
        }
    }

    pub fn backend(msg: impl Into<String>) -> Self {
        Self::Backend(msg.into())
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

/// 应用错误类型
#[derive(Debug, Error)]
pub enum AppError {
    /// 参数为空或格式错误，在任何持久化调用之前抛出
    #[error("Argument '{argument}' is invalid: {reason}")]
    InvalidArgument { argument: String, reason: String },

    /// 违反业务规则 (例如标识符重复)
    #[error("Argument '{argument}' has illegal value '{value}'")]
    IllegalState { argument: String, value: String },

    #[error("Could not find '{what}' with identifier '{identifier}'")]
    NotFound {
        what: String,
        identifier: String,
        #[source]
        source: Option<PersistenceError>,
    },

    #[error("User does not have access to '{function}' function in '{module}' module")]
    Unauthorized { module: String, function: String },

    #[error(transparent)]
    Persistence(PersistenceError),
}

impl AppError {
    pub fn invalid_argument(argument: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidArgument {
            argument: argument.into(),
            reason: reason.into(),
        }
    }

    pub fn illegal_state(argument: impl Into<String>, value: impl ToString) -> Self {
        Self::IllegalState {
            argument: argument.into(),
            value: value.to_string(),
        }
    }

    pub fn not_found(what: impl Into<String>, identifier: impl ToString) -> Self {
        Self::NotFound {
            what: what.into(),
            identifier: identifier.to_string(),
            source: None,
        }
    }

    pub fn unauthorized(module: impl Into<String>, function: impl Into<String>) -> Self {
        Self::Unauthorized {
            module: module.into(),
            function: function.into(),
        }
    }

    /// 将持久化层错误转换为服务层错误
    ///
    /// NotFound 重新包装为服务层 NotFound 并保留原始标识符，其余错误原样传播
    pub fn from_persistence(what: impl Into<String>, identifier: impl ToString, err: PersistenceError) -> Self {
        if err.is_not_found() {
            Self::NotFound {
                what: what.into(),
                identifier: identifier.to_string(),
                source: Some(err),
            }
        } else {
            Self::Persistence(err)
        }
    }

    /// 错误类别 (用于日志和指标标签)
    pub fn kind(&self) -> &'static str {
        match self {
            Self::InvalidArgument { .. } => "invalid_argument",
            Self::IllegalState { .. } => "illegal_state",
            Self::NotFound { .. } => "not_found",
            Self::Unauthorized { .. } => "unauthorized",
            Self::Persistence(_) => "persistence",
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

impl From<PersistenceError> for AppError {
    fn from(err: PersistenceError) -> Self {
        match err {
            PersistenceError::NotFound { kind, identifier } => Self::NotFound {
                what: kind.clone(),
                identifier: identifier.clone(),
                source: Some(PersistenceError::NotFound { kind, identifier }),
            },
            other => Self::Persistence(other),
        }
    }
}

/// Result 类型别名
pub type AppResult<T> = Result<T, AppError>;
