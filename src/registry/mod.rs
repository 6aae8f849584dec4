//! Package registry layer
//!
//! - [`probe`]: service-index discovery and latest-version search
//! - [`types`]: registry configuration and probe results
//! - [`error`]: error types for registry operations

pub mod error;
pub mod probe;
pub mod types;
