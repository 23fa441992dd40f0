//! API layer - HTTP entry points.

pub mod auth;
pub mod emergency_routes;
pub mod error;
pub mod extract;
pub mod http;
pub mod map_routes;
pub mod regulation_routes;
pub mod user_routes;


pub use error::ApiError;
