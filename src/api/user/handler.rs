use serde_json::{Value, json};

use super::model::{
    CurrentUser, EmailRequest, LoginRequest, LoginResponse, PasswordResetForm, RegisterRequest,
    VerifyEmailRequest,
};
use crate::cache::{SessionOperations, SessionStore};
use crate::error::ApiError;
use crate::http::HttpClient;

/// 认证接口
#[derive(Clone)]
pub struct AuthApi {
    client: HttpClient,
}

impl AuthApi {
    pub fn new(client: HttpClient) -> Self {
        Self { client }
    }

    fn store(&self) -> &dyn SessionStore {
        self.client.session_store().as_ref()
    }

    /// 登录并写入会话
    pub async fn login(&self, req: &LoginRequest) -> Result<LoginResponse, ApiError> {
        let response: LoginResponse = self.client.post_as("/users/login", req).await?;
        let profile = response.profile()?;

        let user_json = serde_json::to_string(&response.user)?;
        SessionOperations::store_login(
            self.store(),
            &response.token,
            &user_json,
            response.password_reset_required,
        )
        .await?;

        tracing::info!(
            "Login successful, role: {:?}, password reset required: {}",
            profile.role,
            response.password_reset_required
        );
        Ok(response)
    }

    pub async fn register(&self, req: &RegisterRequest) -> Result<Value, ApiError> {
        Ok(self.client.post("/users/register", req).await?)
    }

    /// 退出登录
    ///
    /// 服务端注销失败只记录日志，本地会话总会被清除。
    pub async fn logout(&self) -> Result<(), ApiError> {
        if SessionOperations::read_token(self.store()).await?.is_some() {
            if let Err(e) = self.client.post("/users/logout", &json!({})).await {
                tracing::warn!("Server-side logout failed: {}", e);
            }
        }
        SessionOperations::clear_session(self.store()).await?;
        Ok(())
    }

    pub async fn verify_email(&self, token: &str) -> Result<Value, ApiError> {
        let req = VerifyEmailRequest {
            token: token.to_string(),
        };
        Ok(self.client.post("/users/verify-email", &req).await?)
    }

    pub async fn resend_verification(&self, email: &str) -> Result<Value, ApiError> {
        let req = EmailRequest::new(email)?;
        Ok(self.client.post("/users/resend-verification", &req).await?)
    }

    pub async fn forgot_password(&self, email: &str) -> Result<Value, ApiError> {
        let req = EmailRequest::new(email)?;
        Ok(self.client.post("/users/forgot-password", &req).await?)
    }

    /// 重置密码，成功后清除重置标记
    pub async fn reset_password(&self, form: PasswordResetForm) -> Result<Value, ApiError> {
        let req = form.validate()?;
        let value = self.client.post("/users/reset-password", &req).await?;
        SessionOperations::set_password_reset_required(self.store(), false).await?;
        Ok(value)
    }

    /// 缓存的当前用户，内容损坏时视为未登录
    pub async fn current_user(&self) -> Result<Option<CurrentUser>, ApiError> {
        let Some(raw) = SessionOperations::current_user_json(self.store()).await? else {
            return Ok(None);
        };
        match serde_json::from_str(&raw) {
            Ok(user) => Ok(Some(user)),
            Err(e) => {
                tracing::warn!("Cached user is unreadable: {}", e);
                Ok(None)
            }
        }
    }

    pub async fn is_authenticated(&self) -> Result<bool, ApiError> {
        Ok(SessionOperations::read_token(self.store()).await?.is_some())
    }

    pub async fn password_reset_required(&self) -> Result<bool, ApiError> {
        Ok(SessionOperations::password_reset_required(self.store()).await?)
    }
}
