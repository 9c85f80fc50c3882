//! 共享请求分发层
//!
//! 所有业务接口都经由 [`HttpClient`] 发出请求：统一附加认证头、对并发的相同请求去重、
//! 归一化错误，并在会话失效时清除会话并跳转登录页。

mod client;
mod options;
mod verbs;

pub use client::{HttpClient, HttpClientBuilder};
pub use options::RequestOptions;
