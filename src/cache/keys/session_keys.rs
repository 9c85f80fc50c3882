/// 令牌存储键
pub const AUTH_TOKEN_KEY: &str = "authToken";

/// 当前用户存储键
pub const CURRENT_USER_KEY: &str = "currentUser";

/// 需要重置密码标记
pub const PASSWORD_RESET_REQUIRED_KEY: &str = "password_reset_required";

/// 会话失效时一起清除的键
pub const SESSION_KEYS: [&str; 3] = [
    AUTH_TOKEN_KEY,
    CURRENT_USER_KEY,
    PASSWORD_RESET_REQUIRED_KEY,
];

/// Redis 会话键前缀
const REDIS_SESSION_PREFIX: &str = "session:";

/// 生成 Redis 会话键
pub fn redis_session_key(namespace: &str, key: &str) -> String {
    format!("{}{}:{}", REDIS_SESSION_PREFIX, namespace, key)
}
