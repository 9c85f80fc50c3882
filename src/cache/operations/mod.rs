/// 缓存操作
/// 提供会话存储与请求去重的功能实现

// 会话存储接口与会话操作
pub mod session;

// 内存会话存储
pub mod memory;

// 文件会话存储
pub mod file;

// Redis 会话存储
pub mod redis_store;

// 进行中请求登记表
pub mod pending;

pub use file::FileSessionStore;
pub use memory::MemorySessionStore;
pub use pending::{PendingCallRegistry, PendingGuard, PendingSlot};
pub use redis_store::RedisSessionStore;
pub use session::{SessionOperations, SessionStore};
