use std::path::PathBuf;

/// Errors from loading or decoding asset files.
#[derive(Debug, thiserror::Error)]
pub enum AssetError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("{path}:{line}: {message}")]
    ObjParse {
        path: PathBuf,
        line: usize,
        message: String,
    },
    #[error("{path} contains no faces")]
    EmptyMesh { path: PathBuf },
    #[error("failed to decode image {path}: {source}")]
    Image {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
    #[error("cube map {path} is {width}x{height}, expected a 4x3 cross")]
    CubeMapLayout {
        path: PathBuf,
        width: u32,
        height: u32,
    },
}
