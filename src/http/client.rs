use std::sync::Arc;

use futures_util::FutureExt;
use reqwest::Method;
use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderValue};
use serde_json::Value;
use tracing::{Instrument, Span};
use uuid::Uuid;

use super::options::RequestOptions;
use crate::cache::models::SharedResponse;
use crate::cache::operations::PendingGuard;
use crate::cache::{
    MemorySessionStore, PendingCallRegistry, PendingRequestKey, SessionStore, is_excluded_endpoint,
};
use crate::config::Config;
use crate::error::HttpError;
use crate::middleware::{self, UNAUTHORIZED_REDIRECT_GUARD};
use crate::utils::{JwtInspector, MemoryNavigator, Navigator, TokenInspector};

struct ClientInner {
    config: Config,
    http: reqwest::Client,
    store: Arc<dyn SessionStore>,
    inspector: Arc<dyn TokenInspector>,
    navigator: Arc<dyn Navigator>,
    pending: PendingCallRegistry,
}

/// 已附加认证头、待发出的调用
struct OutboundCall {
    method: Method,
    url: String,
    headers: HeaderMap,
    body: Option<String>,
}

/// 共享请求客户端
///
/// 克隆开销很小，克隆出的实例共享会话存储与进行中请求登记表；
/// 不同 `build` 出来的实例互不干扰。
#[derive(Clone)]
pub struct HttpClient {
    inner: Arc<ClientInner>,
}

pub struct HttpClientBuilder {
    config: Config,
    http: Option<reqwest::Client>,
    store: Option<Arc<dyn SessionStore>>,
    inspector: Option<Arc<dyn TokenInspector>>,
    navigator: Option<Arc<dyn Navigator>>,
}

impl HttpClientBuilder {
    pub fn session_store(mut self, store: Arc<dyn SessionStore>) -> Self {
        self.store = Some(store);
        self
    }

    pub fn navigator(mut self, navigator: Arc<dyn Navigator>) -> Self {
        self.navigator = Some(navigator);
        self
    }

    pub fn token_inspector(mut self, inspector: Arc<dyn TokenInspector>) -> Self {
        self.inspector = Some(inspector);
        self
    }

    pub fn http_client(mut self, http: reqwest::Client) -> Self {
        self.http = Some(http);
        self
    }

    pub fn build(self) -> HttpClient {
        let leeway = self.config.token_leeway();
        let inspector = self
            .inspector
            .unwrap_or_else(|| Arc::new(JwtInspector::new(leeway)) as Arc<dyn TokenInspector>);
        let store = self
            .store
            .unwrap_or_else(|| Arc::new(MemorySessionStore::new()) as Arc<dyn SessionStore>);
        let navigator = self
            .navigator
            .unwrap_or_else(|| Arc::new(MemoryNavigator::default()) as Arc<dyn Navigator>);

        HttpClient {
            inner: Arc::new(ClientInner {
                config: self.config,
                http: self.http.unwrap_or_default(),
                store,
                inspector,
                navigator,
                pending: PendingCallRegistry::new(),
            }),
        }
    }
}

impl HttpClient {
    pub fn builder(config: Config) -> HttpClientBuilder {
        HttpClientBuilder {
            config,
            http: None,
            store: None,
            inspector: None,
            navigator: None,
        }
    }

    pub fn new(
        config: Config,
        store: Arc<dyn SessionStore>,
        navigator: Arc<dyn Navigator>,
    ) -> Self {
        Self::builder(config)
            .session_store(store)
            .navigator(navigator)
            .build()
    }

    pub fn config(&self) -> &Config {
        &self.inner.config
    }

    pub fn session_store(&self) -> &Arc<dyn SessionStore> {
        &self.inner.store
    }

    pub fn navigator(&self) -> &Arc<dyn Navigator> {
        &self.inner.navigator
    }

    pub fn pending_calls(&self) -> &PendingCallRegistry {
        &self.inner.pending
    }

    /// 发出请求并返回解析后的 JSON
    ///
    /// 1. 拼接 URL
    /// 2. 附加认证头，令牌过期则直接失败
    /// 3. 非认证流程接口复用进行中的相同请求
    /// 4. 解析响应，401 时清除会话并跳转登录页
    pub async fn dispatch(&self, endpoint: &str, options: RequestOptions) -> Result<Value, HttpError> {
        let span = tracing::info_span!(
            "dispatch",
            request_id = %Uuid::new_v4(),
            method = %options.method,
            endpoint = %endpoint
        );
        self.dispatch_inner(endpoint, options).instrument(span).await
    }

    async fn dispatch_inner(
        &self,
        endpoint: &str,
        options: RequestOptions,
    ) -> Result<Value, HttpError> {
        let inner = &self.inner;
        let url = inner.config.endpoint_url(endpoint);

        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.extend(options.headers);
        middleware::authorize(
            inner.store.as_ref(),
            inner.inspector.as_ref(),
            inner.navigator.as_ref(),
            endpoint,
            &mut headers,
        )
        .await?;

        let call = OutboundCall {
            method: options.method,
            url,
            headers,
            body: options.body,
        };

        if is_excluded_endpoint(endpoint) {
            return self.spawn_call(call, None).await;
        }

        // 检查与登记之间不能有 await
        let key = PendingRequestKey::new(&call.method, &call.url, call.body.as_deref());
        let slot = inner
            .pending
            .join_or_start(key.clone(), || self.spawn_call(call, Some(key)));
        if slot.is_joined() {
            tracing::debug!("Reusing ongoing request: {}", endpoint);
        }
        slot.into_response().await
    }

    /// 在独立任务中发出调用，调用方放弃等待也不会取消请求
    fn spawn_call(&self, call: OutboundCall, dedup_key: Option<PendingRequestKey>) -> SharedResponse {
        let client = self.clone();
        let task = tokio::spawn(
            async move {
                let _completion =
                    dedup_key.map(|key| PendingGuard::new(&client.inner.pending, key));
                client.execute(call).await
            }
            .instrument(Span::current()),
        );

        async move {
            task.await.unwrap_or_else(|e| {
                Err(HttpError::transport(format!("request task failed: {e}")))
            })
        }
        .boxed()
        .shared()
    }

    async fn execute(&self, call: OutboundCall) -> Result<Value, HttpError> {
        tracing::info!("Making API call to: {}", call.url);

        let mut request = self
            .inner
            .http
            .request(call.method, &call.url)
            .headers(call.headers);
        if let Some(body) = call.body {
            request = request.body(body);
        }

        let response = request.send().await.map_err(|e| {
            tracing::error!("API Error: {}: {}", call.url, e);
            HttpError::from(e)
        })?;
        let status = response.status();
        let body = response.bytes().await?;

        let result = middleware::interpret_response(&call.url, status, &body);
        match &result {
            Ok(_) => tracing::info!("API Success: {} Status: {}", call.url, status.as_u16()),
            Err(err) if err.is_unauthorized() => {
                tracing::warn!("Unauthorized response, likely expired token");
                middleware::invalidate_session(
                    self.inner.store.as_ref(),
                    self.inner.navigator.as_ref(),
                    &UNAUTHORIZED_REDIRECT_GUARD,
                )
                .await;
            }
            Err(_) => {}
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::keys::{AUTH_TOKEN_KEY, CURRENT_USER_KEY, PASSWORD_RESET_REQUIRED_KEY};
    use crate::error::{ErrorKind, SESSION_EXPIRED_MESSAGE};
    use crate::middleware::LOGIN_PATH;
    use jsonwebtoken::{EncodingKey, Header, encode};
    use serde_json::json;
    use std::time::Duration;
    use wiremock::matchers::{header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const SLOW: Duration = Duration::from_millis(200);

    fn token(exp_offset_secs: i64) -> String {
        encode(
            &Header::default(),
            &json!({ "sub": "7", "exp": chrono::Utc::now().timestamp() + exp_offset_secs }),
            &EncodingKey::from_secret(b"backend-secret"),
        )
        .unwrap()
    }

    fn logged_in(token: &str) -> Arc<MemorySessionStore> {
        Arc::new(MemorySessionStore::with_entries([
            (AUTH_TOKEN_KEY, token),
            (CURRENT_USER_KEY, r#"{"role":"advertiser","entity_id":5}"#),
            (PASSWORD_RESET_REQUIRED_KEY, "true"),
        ]))
    }

    fn client_for(
        server: &MockServer,
        store: Arc<MemorySessionStore>,
        navigator: Arc<MemoryNavigator>,
    ) -> HttpClient {
        HttpClient::new(Config::new(format!("{}/api", server.uri())), store, navigator)
    }

    async fn assert_session_cleared(store: &MemorySessionStore) {
        for key in [AUTH_TOKEN_KEY, CURRENT_USER_KEY, PASSWORD_RESET_REQUIRED_KEY] {
            assert!(store.get(key).await.unwrap().is_none(), "{key} should be cleared");
        }
    }

    #[tokio::test]
    async fn concurrent_identical_gets_share_one_call() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/offers"))
            .and(query_param("entity_id", "5"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({ "offers": [{ "offer_id": 1 }], "total": 1 }))
                    .set_delay(SLOW),
            )
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server, Arc::new(MemorySessionStore::new()), Arc::default());
        let (a, b) = tokio::join!(
            client.get("/offers?entity_id=5"),
            client.get("/offers?entity_id=5")
        );

        assert_eq!(a.unwrap(), json!({ "offers": [{ "offer_id": 1 }], "total": 1 }));
        assert_eq!(b.unwrap(), json!({ "offers": [{ "offer_id": 1 }], "total": 1 }));
        assert!(client.pending_calls().is_empty());
    }

    #[tokio::test]
    async fn concurrent_identical_logins_are_not_deduplicated() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/login"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({ "token": "t" }))
                    .set_delay(SLOW),
            )
            .expect(2)
            .mount(&server)
            .await;

        let client = client_for(&server, Arc::new(MemorySessionStore::new()), Arc::default());
        let creds = json!({ "email": "a@b.c", "password": "secret1" });
        let (a, b) = tokio::join!(client.post("/login", &creds), client.post("/login", &creds));

        assert!(a.is_ok());
        assert!(b.is_ok());
    }

    #[tokio::test]
    async fn settled_call_is_not_reused() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/offer-requests"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "requests": [] })))
            .expect(2)
            .mount(&server)
            .await;

        let client = client_for(&server, Arc::new(MemorySessionStore::new()), Arc::default());
        client.get("/offer-requests").await.unwrap();
        client.get("/offer-requests").await.unwrap();
    }

    #[tokio::test]
    async fn failed_call_is_shared_then_cleared() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/offers"))
            .respond_with(
                ResponseTemplate::new(400)
                    .set_body_json(json!({ "error": "bad filter" }))
                    .set_delay(SLOW),
            )
            .expect(2)
            .mount(&server)
            .await;

        let client = client_for(&server, Arc::new(MemorySessionStore::new()), Arc::default());
        let (a, b) = tokio::join!(client.get("/offers"), client.get("/offers"));
        let (a, b) = (a.unwrap_err(), b.unwrap_err());
        assert_eq!(a, b);
        assert_eq!(a.message, "bad filter");
        assert!(client.pending_calls().is_empty());

        // 失败后再次请求会重新发出
        assert!(client.get("/offers").await.is_err());
    }

    #[tokio::test]
    async fn different_bodies_are_separate_calls() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/offers"))
            .respond_with(
                ResponseTemplate::new(201)
                    .set_body_json(json!({ "ok": true }))
                    .set_delay(SLOW),
            )
            .expect(2)
            .mount(&server)
            .await;

        let client = client_for(&server, Arc::new(MemorySessionStore::new()), Arc::default());
        let body_a = json!({ "title": "a" });
        let body_b = json!({ "title": "b" });
        let (a, b) = tokio::join!(
            client.post("/offers", &body_a),
            client.post("/offers", &body_b)
        );
        assert!(a.is_ok() && b.is_ok());
    }

    #[tokio::test]
    async fn valid_token_is_sent_as_bearer() {
        let server = MockServer::start().await;
        let tok = token(3600);
        Mock::given(method("GET"))
            .and(path("/api/offers"))
            .and(header("authorization", format!("Bearer {tok}").as_str()))
            .and(header("content-type", "application/json"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "offers": [] })))
            .expect(1)
            .mount(&server)
            .await;

        let store = logged_in(&tok);
        let client = client_for(&server, store.clone(), Arc::default());
        client.get("/offers").await.unwrap();
        assert_eq!(store.get(AUTH_TOKEN_KEY).await.unwrap(), Some(tok));
    }

    #[tokio::test]
    async fn anonymous_request_has_no_authorization() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
            .mount(&server)
            .await;

        let client = client_for(&server, Arc::new(MemorySessionStore::new()), Arc::default());
        client.get("/offers").await.unwrap();

        let requests = server.received_requests().await.unwrap();
        assert_eq!(requests.len(), 1);
        assert!(!requests[0].headers.contains_key("authorization"));
    }

    #[tokio::test]
    async fn expired_token_short_circuits() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
            .expect(0)
            .mount(&server)
            .await;

        let store = logged_in(&token(-3600));
        let navigator = Arc::new(MemoryNavigator::at("/advertiser-dashboard"));
        let client = client_for(&server, store.clone(), navigator.clone());

        let err = client.get("/offers").await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::ExpiredSession);
        assert_eq!(err.message, SESSION_EXPIRED_MESSAGE);
        assert_session_cleared(&store).await;
        assert_eq!(navigator.history(), vec![LOGIN_PATH.to_string()]);
    }

    #[tokio::test]
    async fn unauthorized_response_clears_session_and_redirects() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/offers"))
            .respond_with(ResponseTemplate::new(401).set_body_json(json!({ "message": "Invalid token" })))
            .expect(1)
            .mount(&server)
            .await;

        let store = logged_in(&token(3600));
        let navigator = Arc::new(MemoryNavigator::at("/advertiser-dashboard"));
        let client = client_for(&server, store.clone(), navigator.clone());

        let err = client.get("/offers").await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::Unauthorized);
        assert_eq!(err.status, Some(401));
        assert_eq!(err.message, "Invalid token");
        assert_eq!(err.payload, Some(json!({ "message": "Invalid token" })));
        assert_session_cleared(&store).await;
        assert_eq!(navigator.history(), vec![LOGIN_PATH.to_string()]);
    }

    #[tokio::test]
    async fn unauthorized_on_register_page_does_not_redirect() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(401).set_body_json(json!({ "error": "nope" })))
            .mount(&server)
            .await;

        let store = logged_in(&token(3600));
        let navigator = Arc::new(MemoryNavigator::at("/register"));
        let client = client_for(&server, store.clone(), navigator.clone());

        let err = client.post("/users/register", &json!({})).await.unwrap_err();
        assert!(err.is_unauthorized());
        assert_session_cleared(&store).await;
        assert!(navigator.history().is_empty());
    }

    #[tokio::test]
    async fn error_field_becomes_message() {
        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .respond_with(ResponseTemplate::new(422).set_body_json(json!({ "error": "X" })))
            .mount(&server)
            .await;

        let store = logged_in(&token(3600));
        let navigator = Arc::new(MemoryNavigator::at("/advertiser-dashboard"));
        let client = client_for(&server, store.clone(), navigator.clone());

        let err = client.put("/offers/9", &json!({ "title": "t" })).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::HttpStatus);
        assert_eq!(err.message, "X");
        assert_eq!(err.status, Some(422));
        // 普通错误不影响会话
        assert!(store.get(AUTH_TOKEN_KEY).await.unwrap().is_some());
        assert!(navigator.history().is_empty());
    }

    #[tokio::test]
    async fn transport_failure_is_normalized() {
        // 绑定后立即释放端口，保证连接被拒绝
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let client = HttpClient::builder(Config::new(format!("http://{addr}/api"))).build();
        let err = client.get("/offers").await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::Transport);
        assert_eq!(err.status, None);
        assert!(client.pending_calls().is_empty());
    }

    #[tokio::test]
    async fn caller_headers_are_merged() {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .and(header("x-client", "cli"))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server, Arc::new(MemorySessionStore::new()), Arc::default());
        let options = RequestOptions::new(Method::DELETE).with_header(
            reqwest::header::HeaderName::from_static("x-client"),
            HeaderValue::from_static("cli"),
        );
        assert_eq!(client.dispatch("/offers/3", options).await.unwrap(), Value::Null);
    }

    #[tokio::test]
    async fn separate_clients_do_not_share_pending_calls() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({}))
                    .set_delay(SLOW),
            )
            .expect(2)
            .mount(&server)
            .await;

        let first = client_for(&server, Arc::new(MemorySessionStore::new()), Arc::default());
        let second = client_for(&server, Arc::new(MemorySessionStore::new()), Arc::default());
        let (a, b) = tokio::join!(first.get("/offers"), second.get("/offers"));
        assert!(a.is_ok() && b.is_ok());
    }

    struct FixedInspector(bool);

    impl TokenInspector for FixedInspector {
        fn is_expired(&self, _token: &str) -> bool {
            self.0
        }
    }

    #[tokio::test]
    async fn injected_inspector_and_http_client_are_used() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/offers"))
            .and(header("authorization", "Bearer opaque-session"))
            .and(header("x-client", "offerhub-cli"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "offers": [] })))
            .expect(1)
            .mount(&server)
            .await;

        let mut defaults = HeaderMap::new();
        defaults.insert("x-client", HeaderValue::from_static("offerhub-cli"));
        let http = reqwest::Client::builder()
            .default_headers(defaults)
            .build()
            .unwrap();

        // 非 JWT 令牌，默认解析器会判定为过期
        let store = logged_in("opaque-session");
        let client = HttpClient::builder(Config::new(format!("{}/api", server.uri())))
            .session_store(store.clone())
            .token_inspector(Arc::new(FixedInspector(false)))
            .http_client(http)
            .build();

        assert_eq!(client.get("/offers").await.unwrap(), json!({ "offers": [] }));
        assert!(store.get(AUTH_TOKEN_KEY).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn configured_leeway_accepts_recently_expired_token() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/offers"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
            .expect(1)
            .mount(&server)
            .await;

        let mut config = Config::new(format!("{}/api", server.uri()));
        config.token_leeway_secs = 300;
        let store = logged_in(&token(-60));
        let client = HttpClient::new(config, store.clone(), Arc::new(MemoryNavigator::default()));

        client.get("/offers").await.unwrap();
        assert!(store.get(AUTH_TOKEN_KEY).await.unwrap().is_some());
    }
}
