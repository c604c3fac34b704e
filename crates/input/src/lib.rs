//! Input state and key watchers.
//!
//! The windowing host translates its native events into [`Key`]s and mouse
//! deltas on an [`InputState`]. Game code reads that state; key watchers map
//! keys to explicit command values instead of closures.
//!
//! # Invariants
//! - Input state is written by the host only, before the frame's update.
//! - A watcher fires once per press, on the frame the key goes down.

mod state;
mod watcher;

pub use state::{InputState, Key, MouseButton};
pub use watcher::{KeyBindings, KeyWatcher};
