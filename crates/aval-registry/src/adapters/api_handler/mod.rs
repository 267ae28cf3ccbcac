//! # Request Boundary
//!
//! Structured request/response contract consumed by the form/API layer.

mod handler;
mod types;


pub use handler::{error_response, AvalApiHandler, DEFAULT_PAGE_LIMIT};
pub use types::{ApiRequest, ApiResponse, AvalView, TIMESTAMP_FORMAT};
