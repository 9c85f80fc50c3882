use std::sync::Arc;

use async_trait::async_trait;
use redis::{AsyncCommands, Client as RedisClient};

use super::session::SessionStore;
use crate::cache::keys::redis_session_key;
use crate::error::StoreError;

/// Redis 会话存储
///
/// 键格式为 `session:{namespace}:{key}`，同一命名空间下的客户端共享会话。
#[derive(Clone)]
pub struct RedisSessionStore {
    redis: Arc<RedisClient>,
    namespace: String,
}

impl RedisSessionStore {
    pub fn new(redis: Arc<RedisClient>, namespace: impl Into<String>) -> Self {
        Self {
            redis,
            namespace: namespace.into(),
        }
    }

    pub fn open(redis_url: &str, namespace: impl Into<String>) -> Result<Self, StoreError> {
        let client = RedisClient::open(redis_url)?;
        Ok(Self::new(Arc::new(client), namespace))
    }

    fn key(&self, key: &str) -> String {
        redis_session_key(&self.namespace, key)
    }
}

#[async_trait]
impl SessionStore for RedisSessionStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let mut conn = self.redis.get_multiplexed_async_connection().await?;
        let result: Option<String> = conn.get(self.key(key)).await?;
        Ok(result)
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let mut conn = self.redis.get_multiplexed_async_connection().await?;
        let _: () = conn.set(self.key(key), value).await?;
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), StoreError> {
        let mut conn = self.redis.get_multiplexed_async_connection().await?;
        let _: () = conn.del(self.key(key)).await?;
        Ok(())
    }
}
