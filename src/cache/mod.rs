// 缓存模块
// 包含会话存储与进行中请求的登记表

pub mod keys;
pub mod models;
pub mod operations;

// 重新导出常用类型，方便其他模块使用
pub use keys::{PendingRequestKey, is_excluded_endpoint};
pub use operations::{
    FileSessionStore, MemorySessionStore, PendingCallRegistry, PendingSlot, RedisSessionStore,
    SessionOperations, SessionStore,
};
