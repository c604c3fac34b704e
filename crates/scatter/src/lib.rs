//! Environment scattering: random placement of decorations on the ground
//! plane, avoiding exclusion zones.
//!
//! # Invariants
//! - Every placed point lies inside its request's spawn rect and outside all
//!   of its exclusion rects (edges inclusive).
//! - Sampling is bounded by `count * max_attempts`; an over-constrained
//!   request yields fewer instances and a warning instead of spinning.
//! - The same seed and requests always produce the same layout.

mod generator;
mod rect;

pub use generator::{
    DEFAULT_MAX_ATTEMPTS, EnvironmentGenerator, PlacementRequest, RequestReport, ScatterReport,
};
pub use rect::Rect;

pub fn crate_info() -> &'static str {
    "gravefield-scatter v0.1.0"
}
