use gravefield_assets::AssetError;
use gravefield_render::RenderError;

/// Errors surfaced by scene setup and the frame driver.
#[derive(Debug, thiserror::Error)]
pub enum KernelError {
    #[error("scene has no camera entity with Transform and Camera components")]
    MissingCamera,
    #[error("failed to load startup asset: {0}")]
    Asset(#[from] AssetError),
    #[error(transparent)]
    Render(#[from] RenderError),
    #[error("presentation failed: {0}")]
    Present(String),
}
