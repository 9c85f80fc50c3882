/// 缓存数据模型

pub mod pending;
pub mod session;

pub use pending::SharedResponse;
pub use session::{SESSION_FILE_VERSION, SessionFile};
