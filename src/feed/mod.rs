//! Feed aggregation layer
//!
//! One aggregation run resolves a CI build's artifacts, extracts the build
//! and template versions, fetches the currently published feed, and overlays
//! the fresh values onto its most recent release:
//!
//! ```text
//! ┌───────────┐    ┌────────────┐    ┌──────────────┐
//! │ Collector │───▶│ Aggregator │◀───│ Feed (CDN)   │
//! │ (CI data) │    │ (overlay)  │    │ (prior entry)│
//! └───────────┘    └────────────┘    └──────────────┘
//! ```
//!
//! - [`aggregator`]: the pipeline producing an updated release entry
//! - [`document`]: the published feed document model
//! - [`error`]: error type for aggregation runs

pub mod aggregator;
pub mod document;
pub mod error;
