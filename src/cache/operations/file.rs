//! 文件会话存储
//!
//! 会话以 JSON 形式保存在单个文件中，权限为 0o600。

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::sync::Mutex;

use super::session::SessionStore;
use crate::cache::models::{SESSION_FILE_VERSION, SessionFile};
use crate::error::StoreError;

pub struct FileSessionStore {
    path: PathBuf,
    // 串行化读-改-写
    lock: Mutex<()>,
}

impl FileSessionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn load(&self) -> Result<SessionFile, StoreError> {
        let data = match tokio::fs::read_to_string(&self.path).await {
            Ok(data) => data,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Ok(SessionFile::default());
            }
            Err(e) => return Err(e.into()),
        };

        // 文件损坏时按空会话处理，下次写入会覆盖
        let file: SessionFile = match serde_json::from_str(&data) {
            Ok(file) => file,
            Err(e) => {
                tracing::warn!(
                    "Session file {} is unreadable, starting empty: {}",
                    self.path.display(),
                    e
                );
                return Ok(SessionFile::default());
            }
        };
        if file.version != SESSION_FILE_VERSION {
            return Err(StoreError::UnsupportedVersion(file.version));
        }
        Ok(file)
    }

    async fn save(&self, file: &mut SessionFile) -> Result<(), StoreError> {
        file.last_updated = Some(chrono::Utc::now().to_rfc3339());

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }

        let json = serde_json::to_string_pretty(file)?;
        tokio::fs::write(&self.path, json).await?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let perms = std::fs::Permissions::from_mode(0o600);
            if let Err(e) = tokio::fs::set_permissions(&self.path, perms).await {
                tracing::warn!("failed to restrict session file permissions: {e}");
            }
        }

        Ok(())
    }
}

#[async_trait]
impl SessionStore for FileSessionStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let _guard = self.lock.lock().await;
        Ok(self.load().await?.entries.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let _guard = self.lock.lock().await;
        let mut file = self.load().await?;
        file.entries.insert(key.to_string(), value.to_string());
        self.save(&mut file).await
    }

    async fn remove(&self, key: &str) -> Result<(), StoreError> {
        let _guard = self.lock.lock().await;
        let mut file = self.load().await?;
        if file.entries.remove(key).is_none() {
            return Ok(());
        }
        self.save(&mut file).await
    }
}
