//! 业务接口
//!
//! 认证与报价相关接口，全部经由 [`HttpClient`](crate::http::HttpClient) 发出。

use std::fmt;

use serde::{Deserialize, Serialize};
use url::form_urlencoded;

pub mod offer;
pub mod user;

pub use offer::OffersApi;
pub use user::AuthApi;

/// 后端返回的 ID，可能是数字也可能是字符串
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RecordId {
    Number(i64),
    Text(String),
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordId::Number(n) => write!(f, "{}", n),
            RecordId::Text(s) => f.write_str(s),
        }
    }
}

impl From<i64> for RecordId {
    fn from(n: i64) -> Self {
        RecordId::Number(n)
    }
}

impl From<&str> for RecordId {
    fn from(s: &str) -> Self {
        match s.parse::<i64>() {
            Ok(n) => RecordId::Number(n),
            Err(_) => RecordId::Text(s.to_string()),
        }
    }
}

/// 拼接查询参数，没有参数时原样返回路径
pub(crate) fn with_query(path: &str, pairs: &[(&str, String)]) -> String {
    if pairs.is_empty() {
        return path.to_string();
    }
    let mut serializer = form_urlencoded::Serializer::new(String::new());
    for (name, value) in pairs {
        serializer.append_pair(name, value);
    }
    format!("{}?{}", path, serializer.finish())
}

/// 路径段转义
pub(crate) fn path_segment(id: &RecordId) -> String {
    form_urlencoded::byte_serialize(id.to_string().as_bytes()).collect()
}
