//! Entity registry with typed component storage and grouped views.
//!
//! Each component type lives in its own sparse-set storage indexed by the
//! entity's arena index. Groups over a hot pair of component types are
//! registered once and kept current by the registry.
//!
//! # Invariants
//! - Destroying an entity removes all of its components and group memberships.
//! - `get`/`get_mut` on an absent component is a programming error and panics.
//! - Group members always own both grouped component types.

mod components;
mod hierarchy;
mod registry;
mod storage;

pub use components::{MaterialHandle, MeshHandle, Name, Parent, Renderable};
pub use hierarchy::refresh_world_matrices;
pub use registry::{Group, Registry};
pub use storage::Storage;
