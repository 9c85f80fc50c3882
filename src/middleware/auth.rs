use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue};

use crate::cache::SessionOperations;
use crate::cache::SessionStore;
use crate::error::HttpError;
use crate::utils::{Navigator, TokenInspector, path_targets_any};

/// 登录页
pub const LOGIN_PATH: &str = "/login";

/// 令牌过期时，位于这些页面不再跳转
pub const EXPIRY_REDIRECT_GUARD: [&str; 2] = ["/login", "/signup"];

/// 收到 401 时，位于这些页面不再跳转
pub const UNAUTHORIZED_REDIRECT_GUARD: [&str; 3] = ["/login", "/signup", "/register"];

/// 附加认证头
///
/// 令牌过期时清除会话、跳转登录页并直接返回错误，不发起网络请求。
pub(crate) async fn authorize(
    store: &dyn SessionStore,
    inspector: &dyn TokenInspector,
    navigator: &dyn Navigator,
    endpoint: &str,
    headers: &mut HeaderMap,
) -> Result<(), HttpError> {
    let Some(token) = SessionOperations::read_token(store).await? else {
        tracing::debug!("No auth token found for request: {}", endpoint);
        return Ok(());
    };

    if inspector.is_expired(&token) {
        tracing::warn!("Token is expired, removing from storage and redirecting to login");
        invalidate_session(store, navigator, &EXPIRY_REDIRECT_GUARD).await;
        return Err(HttpError::expired_session());
    }

    let value = HeaderValue::from_str(&format!("Bearer {}", token))
        .map_err(|_| HttpError::transport("auth token contains invalid header characters"))?;
    headers.insert(AUTHORIZATION, value);
    tracing::debug!("Adding auth token to request: {}", endpoint);
    Ok(())
}

/// 清除会话并按需跳转登录页
///
/// 存储失败只记录日志，调用方仍会收到原始错误。
pub(crate) async fn invalidate_session(
    store: &dyn SessionStore,
    navigator: &dyn Navigator,
    guard: &[&str],
) {
    if let Err(e) = SessionOperations::clear_session(store).await {
        tracing::error!("Failed to clear session: {}", e);
    }

    let current = navigator.current_path();
    if !path_targets_any(&current, guard) {
        navigator.redirect(LOGIN_PATH);
    }
}
