//! Layout Engine - Column distribution, cell wrapping, and pagination
//!
//! This crate turns projected rows into page layouts for the paged and
//! fixed-size renderers. It knows nothing about PDF or pixels: callers pass
//! a content box in their own units and a text metric matching their font.

mod columns;
mod error;
mod geometry;
mod line_breaker;
mod metrics;
mod paginator;

pub use columns::*;
pub use error::*;
pub use geometry::*;
pub use line_breaker::*;
pub use metrics::*;
pub use paginator::*;
