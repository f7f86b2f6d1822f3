mod auth;

pub use auth::{auth_middleware, authorize, CurrentUser};
