//! Shared types for the gravefield scene.
//!
//! # Invariants
//! - An `EntityId` is only meaningful for the registry that issued it.
//! - A `Transform`'s cached world matrix is refreshed explicitly, never on write.

mod types;

pub use types::{EntityId, Transform};
