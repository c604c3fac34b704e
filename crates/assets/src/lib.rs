//! CPU-side asset decoding for the demo scene.
//!
//! Meshes, textures and cube maps are read from an asset root directory and
//! decoded into plain data that a render backend uploads. Nothing here holds
//! GPU resources.
//!
//! # Invariants
//! - Every mesh is an indexed triangle list.
//! - Every texture is tightly packed RGBA8.

mod error;
mod factory;
mod mesh;
mod obj;
mod texture;

use std::path::{Path, PathBuf};

pub use error::AssetError;
pub use factory::MeshFactory;
pub use mesh::{MeshData, Vertex};
pub use obj::{load_obj, parse_obj};
pub use texture::{CUBE_FACE_ORDER, CubeMapData, TextureData};

/// Resolves asset paths relative to one root directory.
#[derive(Debug, Clone)]
pub struct AssetRoot {
    root: PathBuf,
}

impl AssetRoot {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn path(&self) -> &Path {
        &self.root
    }

    pub fn resolve(&self, relative: impl AsRef<Path>) -> PathBuf {
        self.root.join(relative)
    }

    pub fn mesh(&self, relative: impl AsRef<Path>) -> Result<MeshData, AssetError> {
        load_obj(self.resolve(relative))
    }

    pub fn texture(&self, relative: impl AsRef<Path>) -> Result<TextureData, AssetError> {
        TextureData::from_file(self.resolve(relative))
    }

    pub fn cube_map(&self, relative: impl AsRef<Path>) -> Result<CubeMapData, AssetError> {
        CubeMapData::from_cross_file(self.resolve(relative))
    }
}

pub fn crate_info() -> &'static str {
    "gravefield-assets v0.1.0"
}
