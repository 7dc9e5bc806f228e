//! HTTP API module.
//!
//! The only surface external callers touch: the point-in-time state read,
//! the viewer stream, and the authorization endpoints.

mod error;
mod handlers;
mod routes;
mod state;

pub use error::{ApiError, ApiResult, ErrorResponse};
pub use routes::create_router;
pub use state::AppState;
