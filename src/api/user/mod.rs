mod handler;
mod model;

pub use handler::AuthApi;
pub use model::{
    CurrentUser, EmailRequest, LoginRequest, LoginResponse, MIN_PASSWORD_LEN, PasswordResetForm,
    RegisterRequest, ResetPasswordRequest, Role, VerifyEmailRequest,
};
