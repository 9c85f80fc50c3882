use std::fmt;

use reqwest::Method;

/// 认证流程相关接口，从不去重
pub const EXCLUDED_ENDPOINTS: [&str; 6] = [
    "/login",
    "/register",
    "/logout",
    "/verify-email",
    "/forgot-password",
    "/reset-password",
];

pub fn is_excluded_endpoint(endpoint: &str) -> bool {
    EXCLUDED_ENDPOINTS
        .iter()
        .any(|fragment| endpoint.contains(fragment))
}

/// 请求去重键：方法 + 完整 URL + 序列化后的请求体
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PendingRequestKey {
    pub method: Method,
    pub url: String,
    pub body: String,
}

impl PendingRequestKey {
    pub fn new(method: &Method, url: &str, body: Option<&str>) -> Self {
        Self {
            method: method.clone(),
            url: url.to_string(),
            body: body.unwrap_or_default().to_string(),
        }
    }
}

impl fmt::Display for PendingRequestKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_{}_{}", self.method, self.url, self.body)
    }
}
