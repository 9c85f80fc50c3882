use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::api::RecordId;
use crate::error::FormError;

pub const MIN_PASSWORD_LEN: usize = 6;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Advertiser,
    Affiliate,
    Network,
    #[default]
    #[serde(other)]
    User,
}

impl Role {
    /// 登录后跳转的面板，管理员留在当前页显示管理面板
    pub fn dashboard_path(&self) -> Option<&'static str> {
        match self {
            Role::Admin => None,
            Role::Advertiser => Some("/advertiser-dashboard"),
            Role::Affiliate => Some("/affiliate-dashboard"),
            Role::Network => Some("/network-dashboard"),
            Role::User => Some("/user-dashboard"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrentUser {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<RecordId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<RecordId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default)]
    pub role: Role,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entity_id: Option<RecordId>,
    // 其他字段原样保留
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl CurrentUser {
    /// 后端有时返回 `user_id`，有时返回 `id`
    pub fn user_id(&self) -> Option<&RecordId> {
        self.user_id.as_ref().or(self.id.as_ref())
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoginResponse {
    pub token: String,
    /// 后端返回的用户对象，原样写入会话
    pub user: Value,
    #[serde(default)]
    pub password_reset_required: bool,
    #[serde(default)]
    pub message: Option<String>,
}

impl LoginResponse {
    pub fn profile(&self) -> Result<CurrentUser, serde_json::Error> {
        CurrentUser::deserialize(&self.user)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub role: Role,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub company: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct VerifyEmailRequest {
    pub token: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct EmailRequest {
    pub email: String,
}

impl EmailRequest {
    pub fn new(email: &str) -> Result<Self, FormError> {
        let email = email.trim();
        if email.is_empty() {
            return Err(FormError::MissingEmail);
        }
        Ok(Self {
            email: email.to_string(),
        })
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ResetPasswordRequest {
    pub new_password: String,
}

/// 重置密码表单
#[derive(Debug, Clone, Default)]
pub struct PasswordResetForm {
    pub new_password: String,
    pub confirm_password: String,
}

impl PasswordResetForm {
    pub fn validate(self) -> Result<ResetPasswordRequest, FormError> {
        if self.new_password.chars().count() < MIN_PASSWORD_LEN {
            return Err(FormError::PasswordTooShort(MIN_PASSWORD_LEN));
        }
        if self.new_password != self.confirm_password {
            return Err(FormError::PasswordMismatch);
        }
        Ok(ResetPasswordRequest {
            new_password: self.new_password,
        })
    }
}
