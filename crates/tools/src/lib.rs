//! Developer tooling: scene inspector and frame-time history for the overlay.
//!
//! # Invariants
//! - Tools only read scene state.

mod fps;
mod inspector;

pub use fps::{FPS_HISTORY_LEN, FpsHistory};
pub use inspector::{EntityInfo, SceneInspector, SceneSummary};

pub fn crate_info() -> &'static str {
    "gravefield-tools v0.1.0"
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn crate_loads() {
        assert!(crate_info().contains("tools"));
    }
}
