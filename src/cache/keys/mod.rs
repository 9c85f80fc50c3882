/// 缓存键模块
/// 提供会话存储键与请求去重键

// 请求去重键
pub mod request_keys;

// 会话存储键
pub mod session_keys;

pub use request_keys::{EXCLUDED_ENDPOINTS, PendingRequestKey, is_excluded_endpoint};
pub use session_keys::{
    AUTH_TOKEN_KEY, CURRENT_USER_KEY, PASSWORD_RESET_REQUIRED_KEY, SESSION_KEYS, redis_session_key,
};
