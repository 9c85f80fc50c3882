use std::sync::Arc;

use api::{AuthApi, OffersApi};
use cache::SessionStore;
use config::Config;
use utils::Navigator;

pub mod api;
pub mod cache;
pub mod config;
pub mod error;
pub mod http;
pub mod middleware;
pub mod utils;

pub use error::{ApiError, ErrorKind, HttpError};
pub use http::{HttpClient, RequestOptions};

/// 客户端上下文，所有接口共享同一个 [`HttpClient`]
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub client: HttpClient,
    pub auth: AuthApi,
    pub offers: OffersApi,
}

impl AppState {
    pub fn new(config: Config, store: Arc<dyn SessionStore>, navigator: Arc<dyn Navigator>) -> Self {
        let client = HttpClient::new(config.clone(), store, navigator);
        Self {
            config,
            auth: AuthApi::new(client.clone()),
            offers: OffersApi::new(client.clone()),
            client,
        }
    }
}
