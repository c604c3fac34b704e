//! Scene Kernel: scene ownership, key commands, frame timing and the frame
//! driver state machine.
//!
//! # Invariants
//! - All subsystems run sequentially on one thread within a frame.
//! - Behaviour updates precede world-matrix refresh, which precedes drawing.
//! - Delta time handed to behaviours is always in `(0, 1]` seconds.

pub mod clock;
pub mod command;
pub mod demo;
pub mod driver;
pub mod error;
pub mod scene;

pub use clock::{FrameClock, MAX_FRAME_DELTA, clamp_delta};
pub use command::{SceneCommand, default_key_bindings};
pub use demo::build_demo_scene;
pub use driver::{DriverState, FrameDriver, FrameReport, Host};
pub use error::KernelError;
pub use scene::{DEFAULT_CLEAR_COLOR, Scene};

pub fn crate_info() -> &'static str {
    "gravefield-kernel v0.1.0"
}
