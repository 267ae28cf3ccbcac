//! # Domain Layer
//!
//! Pure domain logic for the aval registry.
//! No storage or I/O here - only types and rules.
//!
//! ## Modules
//!
//! - `entities` - AvalRecord, lifecycle, payloads and the editable field set
//! - `correlativo` - Code formatter and embedded-number parser
//! - `dates` - Date normalization
//! - `query` - Filters and paging
//! - `value_objects` - Configuration and key layout
//! - `errors` - Domain error types

pub mod correlativo;
pub mod dates;
pub mod entities;
pub mod errors;
pub mod query;
pub mod value_objects;
