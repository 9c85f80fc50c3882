use futures_util::future::{BoxFuture, Shared};
use serde_json::Value;

use crate::error::HttpError;

/// 进行中请求的共享句柄，所有等待者得到同一个结果
pub type SharedResponse = Shared<BoxFuture<'static, Result<Value, HttpError>>>;
