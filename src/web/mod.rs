//! HTTP boundary: routing, dispatch, and response hardening

pub mod error;
pub mod handlers;
pub mod headers;
pub mod routes;
pub mod state;

pub use error::RouterError;
pub use headers::HeaderPolicy;
pub use routes::create_router;
pub use state::AppState;
