//! Cross-module scenarios.

pub mod concurrency;
pub mod lifecycle;
pub mod persistence;
pub mod properties;
