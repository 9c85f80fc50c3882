use std::env;
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_API_BASE_URL: &str = "http://localhost:4100/api";
pub const DEFAULT_SESSION_FILE: &str = ".offerhub/session.json";
pub const DEFAULT_SESSION_NAMESPACE: &str = "default";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid value for {name}: {value:?}")]
    InvalidValue { name: &'static str, value: String },
}

#[derive(Debug, Clone, serde::Deserialize)]
pub struct Config {
    /// 后端地址，进程生命周期内不变
    pub api_base_url: String,
    pub session_file: PathBuf,
    pub redis_url: Option<String>,
    pub session_namespace: String,
    /// 判断令牌过期时允许的时钟偏差
    pub token_leeway_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self::new(DEFAULT_API_BASE_URL)
    }
}

impl Config {
    pub fn new(api_base_url: impl Into<String>) -> Self {
        let api_base_url: String = api_base_url.into();
        Config {
            api_base_url: api_base_url.trim_end_matches('/').to_string(),
            session_file: PathBuf::from(DEFAULT_SESSION_FILE),
            redis_url: None,
            session_namespace: DEFAULT_SESSION_NAMESPACE.to_string(),
            token_leeway_secs: 0,
        }
    }

    pub fn from_env() -> Result<Self, ConfigError> {
        dotenv::dotenv().ok();
        Self::from_lookup(|name| env::var(name).ok())
    }

    fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());

        let mut config = Config::new(
            var("API_BASE_URL").unwrap_or_else(|| DEFAULT_API_BASE_URL.to_string()),
        );
        if let Some(path) = var("SESSION_FILE") {
            config.session_file = PathBuf::from(path);
        }
        config.redis_url = var("REDIS_URL");
        if let Some(namespace) = var("SESSION_NAMESPACE") {
            config.session_namespace = namespace;
        }
        if let Some(leeway) = var("TOKEN_LEEWAY_SECS") {
            config.token_leeway_secs = leeway
                .trim_end_matches('s')
                .parse()
                .map_err(|_| ConfigError::InvalidValue {
                    name: "TOKEN_LEEWAY_SECS",
                    value: leeway.clone(),
                })?;
        }
        Ok(config)
    }

    /// 基础地址与接口路径直接拼接
    pub fn endpoint_url(&self, endpoint: &str) -> String {
        format!("{}{}", self.api_base_url, endpoint)
    }

    pub fn token_leeway(&self) -> Duration {
        Duration::from_secs(self.token_leeway_secs)
    }
}
