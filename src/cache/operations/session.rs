use async_trait::async_trait;

use crate::cache::keys::{
    AUTH_TOKEN_KEY, CURRENT_USER_KEY, PASSWORD_RESET_REQUIRED_KEY, SESSION_KEYS,
};
use crate::error::StoreError;

/// 持久化的键值会话存储
#[async_trait]
pub trait SessionStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    async fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;

    async fn remove(&self, key: &str) -> Result<(), StoreError>;
}

/// 会话操作
pub struct SessionOperations;

impl SessionOperations {
    /// 读取令牌
    pub async fn read_token(store: &dyn SessionStore) -> Result<Option<String>, StoreError> {
        Ok(store
            .get(AUTH_TOKEN_KEY)
            .await?
            .filter(|token| !token.is_empty()))
    }

    /// 登录成功后写入会话
    pub async fn store_login(
        store: &dyn SessionStore,
        token: &str,
        user_json: &str,
        password_reset_required: bool,
    ) -> Result<(), StoreError> {
        store.set(AUTH_TOKEN_KEY, token).await?;
        store.set(CURRENT_USER_KEY, user_json).await?;
        Self::set_password_reset_required(store, password_reset_required).await
    }

    /// 读取缓存的当前用户
    pub async fn current_user_json(store: &dyn SessionStore) -> Result<Option<String>, StoreError> {
        store.get(CURRENT_USER_KEY).await
    }

    pub async fn password_reset_required(store: &dyn SessionStore) -> Result<bool, StoreError> {
        Ok(store.get(PASSWORD_RESET_REQUIRED_KEY).await?.as_deref() == Some("true"))
    }

    pub async fn set_password_reset_required(
        store: &dyn SessionStore,
        required: bool,
    ) -> Result<(), StoreError> {
        if required {
            store.set(PASSWORD_RESET_REQUIRED_KEY, "true").await
        } else {
            store.remove(PASSWORD_RESET_REQUIRED_KEY).await
        }
    }

    /// 清除会话：令牌、当前用户、重置密码标记一起删除
    ///
    /// 某个键删除失败时仍会尝试删除其余的键，返回第一个错误。
    pub async fn clear_session(store: &dyn SessionStore) -> Result<(), StoreError> {
        let mut first_error = None;
        for key in SESSION_KEYS {
            if let Err(e) = store.remove(key).await {
                tracing::error!("Failed to remove session key {}: {}", key, e);
                first_error.get_or_insert(e);
            }
        }
        match first_error {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::operations::MemorySessionStore;

    #[tokio::test]
    async fn store_login_then_clear() {
        let store = MemorySessionStore::new();
        SessionOperations::store_login(&store, "tok", r#"{"role":"advertiser"}"#, true)
            .await
            .unwrap();

        assert_eq!(
            SessionOperations::read_token(&store).await.unwrap().as_deref(),
            Some("tok")
        );
        assert!(SessionOperations::password_reset_required(&store).await.unwrap());
        assert_eq!(
            SessionOperations::current_user_json(&store).await.unwrap().as_deref(),
            Some(r#"{"role":"advertiser"}"#)
        );

        SessionOperations::clear_session(&store).await.unwrap();
        for key in SESSION_KEYS {
            assert!(store.get(key).await.unwrap().is_none(), "{key} should be cleared");
        }
    }

    #[tokio::test]
    async fn login_without_reset_removes_stale_flag() {
        let store = MemorySessionStore::with_entries([(PASSWORD_RESET_REQUIRED_KEY, "true")]);
        SessionOperations::store_login(&store, "tok", "{}", false)
            .await
            .unwrap();
        assert!(!SessionOperations::password_reset_required(&store).await.unwrap());
    }

    #[tokio::test]
    async fn empty_token_reads_as_absent() {
        let store = MemorySessionStore::with_entries([(AUTH_TOKEN_KEY, "")]);
        assert!(SessionOperations::read_token(&store).await.unwrap().is_none());
    }
}
