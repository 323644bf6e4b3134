//! HTTP surfaces: the public read API and the token-guarded admin API.

mod admin;
mod error;
mod public;

pub use error::ApiError;
pub use public::{AppState, build_router};
