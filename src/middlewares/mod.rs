pub mod auth;
pub mod cors;

pub use auth::{AuthMiddleware, token_info};
pub use cors::create_cors;
