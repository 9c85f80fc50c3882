use reqwest::StatusCode;
use serde_json::Value;

/// 请求失败分类
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// 本地令牌已过期，未发出网络请求
    ExpiredSession,
    /// 后端返回 401
    Unauthorized,
    /// 其他非成功状态码
    HttpStatus,
    /// 网络或解析失败
    Transport,
    /// 会话存储读写失败
    Storage,
}

/// 统一的请求错误
///
/// 同一个去重请求的所有调用方拿到的是同一个错误的克隆。
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("{message}")]
pub struct HttpError {
    pub kind: ErrorKind,
    pub message: String,
    pub status: Option<u16>,
    pub payload: Option<Value>,
}

pub const SESSION_EXPIRED_MESSAGE: &str = "Token expired. Please log in again.";

impl HttpError {
    pub fn expired_session() -> Self {
        Self {
            kind: ErrorKind::ExpiredSession,
            message: SESSION_EXPIRED_MESSAGE.to_string(),
            status: None,
            payload: None,
        }
    }

    /// 根据非成功响应构造错误，消息优先取 `error`，其次 `message`
    pub fn from_status(status: StatusCode, payload: Option<Value>) -> Self {
        let message = payload
            .as_ref()
            .and_then(|body| {
                ["error", "message"]
                    .iter()
                    .find_map(|field| body.get(field).and_then(Value::as_str))
            })
            .filter(|msg| !msg.is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| format!("HTTP error! status: {}", status.as_u16()));

        let kind = if status == StatusCode::UNAUTHORIZED {
            ErrorKind::Unauthorized
        } else {
            ErrorKind::HttpStatus
        };

        Self {
            kind,
            message,
            status: Some(status.as_u16()),
            payload,
        }
    }

    pub fn transport(message: impl Into<String>) -> Self {
        Self {
            kind: ErrorKind::Transport,
            message: message.into(),
            status: None,
            payload: None,
        }
    }

    pub fn is_unauthorized(&self) -> bool {
        self.kind == ErrorKind::Unauthorized
    }

    pub fn is_session_expired(&self) -> bool {
        self.kind == ErrorKind::ExpiredSession
    }

    /// 登录时邮箱尚未验证
    pub fn is_email_unverified(&self) -> bool {
        self.message.contains("verify your email")
    }
}

impl From<reqwest::Error> for HttpError {
    fn from(err: reqwest::Error) -> Self {
        HttpError::transport(err.to_string())
    }
}

impl From<serde_json::Error> for HttpError {
    fn from(err: serde_json::Error) -> Self {
        HttpError::transport(format!("invalid JSON: {err}"))
    }
}

impl From<StoreError> for HttpError {
    fn from(err: StoreError) -> Self {
        Self {
            kind: ErrorKind::Storage,
            message: err.to_string(),
            status: None,
            payload: None,
        }
    }
}

/// 会话存储错误
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("redis error: {0}")]
    Redis(#[from] redis::RedisError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("unsupported session file version: {0}")]
    UnsupportedVersion(u32),
}

/// 表单校验错误，在发请求之前返回
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FormError {
    #[error("New password must be at least {0} characters long")]
    PasswordTooShort(usize),

    #[error("New passwords do not match")]
    PasswordMismatch,

    #[error("Please enter your email address first")]
    MissingEmail,

    #[error("invalid amount: {0:?}")]
    InvalidAmount(String),
}

/// 业务接口错误
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error(transparent)]
    Http(#[from] HttpError),

    #[error(transparent)]
    Form(#[from] FormError),
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        ApiError::Http(err.into())
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        ApiError::Http(err.into())
    }
}

impl ApiError {
    pub fn as_http(&self) -> Option<&HttpError> {
        match self {
            ApiError::Http(err) => Some(err),
            ApiError::Form(_) => None,
        }
    }

    pub fn is_email_unverified(&self) -> bool {
        self.as_http().is_some_and(HttpError::is_email_unverified)
    }
}
