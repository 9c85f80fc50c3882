mod auth;
mod error_handler;

pub use auth::{
    EXPIRY_REDIRECT_GUARD, LOGIN_PATH, UNAUTHORIZED_REDIRECT_GUARD,
};
pub(crate) use auth::{authorize, invalidate_session};
pub(crate) use error_handler::interpret_response;
