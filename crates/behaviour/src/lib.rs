//! Behaviour scripts attached to entities and dispatched once per frame.
//!
//! # Invariants
//! - An entity has at most one [`BehaviourBinding`]; its behaviours update in
//!   insertion order.
//! - Disabled behaviours are skipped, and re-enabling one takes effect on the
//!   next dispatch.
//! - Dispatch runs before the world-matrix refresh of the same frame.

mod binding;
mod camera_control;
mod follow_path;
mod mover;

pub use binding::{
    AsAny, Behaviour, BehaviourBinding, BehaviourContext, behaviour, behaviour_mut, bind,
    bind_disabled, bind_with, dispatch,
};
pub use camera_control::CameraControl;
pub use follow_path::FollowPath;
pub use mover::OscillatingMover;

pub fn crate_info() -> &'static str {
    "gravefield-behaviour v0.1.0"
}
