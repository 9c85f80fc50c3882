use reqwest::StatusCode;
use serde_json::Value;
use tracing::error;

use crate::error::HttpError;

/// 解析响应体并按状态码转换为结果
///
/// 成功响应的空体视为 `null`；失败响应的体无法解析时仍按状态码构造错误。
pub(crate) fn interpret_response(
    url: &str,
    status: StatusCode,
    body: &[u8],
) -> Result<Value, HttpError> {
    let parsed = if body.iter().all(u8::is_ascii_whitespace) {
        Ok(Value::Null)
    } else {
        serde_json::from_slice::<Value>(body)
    };

    if status.is_success() {
        return parsed.map_err(|e| {
            error!("Failed to parse response body from {}: {}", url, e);
            HttpError::from(e)
        });
    }

    let payload = match parsed {
        Ok(Value::Null) => None,
        Ok(value) => Some(value),
        Err(_) => {
            let text = String::from_utf8_lossy(body);
            Some(Value::String(text.into_owned()))
        }
    };
    let err = HttpError::from_status(status, payload);
    error!(
        "API Error Response - url: {}, status: {}, error: {}",
        url,
        status.as_u16(),
        err.message
    );
    Err(err)
}
