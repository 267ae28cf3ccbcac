//! # Ports Layer
//!
//! - `inbound` - APIs this library exposes
//! - `outbound` - Interfaces the host provides

pub mod inbound;
pub mod outbound;
