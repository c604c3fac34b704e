use crate::error::AssetError;
use image::RgbaImage;
use std::path::Path;

/// Decoded RGBA8 pixels ready for upload.
#[derive(Debug, Clone, PartialEq)]
pub struct TextureData {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<u8>,
}

impl TextureData {
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, AssetError> {
        let path = path.as_ref();
        let image = open_rgba(path)?;
        let (width, height) = image.dimensions();
        tracing::debug!(path = %path.display(), width, height, "loaded texture");
        Ok(Self {
            width,
            height,
            pixels: image.into_raw(),
        })
    }

    /// A single-color texture, e.g. a neutral specular map.
    pub fn solid_color(width: u32, height: u32, color: [u8; 4]) -> Self {
        let pixels = color
            .iter()
            .copied()
            .cycle()
            .take(width as usize * height as usize * 4)
            .collect();
        Self {
            width,
            height,
            pixels,
        }
    }

    pub fn white() -> Self {
        Self::solid_color(1, 1, [255; 4])
    }
}

/// Face order of [`CubeMapData::faces`]: +X, -X, +Y, -Y, +Z, -Z.
pub const CUBE_FACE_ORDER: [&str; 6] = ["+x", "-x", "+y", "-y", "+z", "-z"];

/// (column, row) of each face in a horizontal 4x3 cross, in face order.
///
/// ```text
///        [+Y]
///   [-X] [+Z] [+X] [-Z]
///        [-Y]
/// ```
const CROSS_CELLS: [(u32, u32); 6] = [(2, 1), (0, 1), (1, 0), (1, 2), (1, 1), (3, 1)];

/// Six square RGBA8 faces of a cube map.
#[derive(Debug, Clone, PartialEq)]
pub struct CubeMapData {
    pub face_size: u32,
    pub faces: [Vec<u8>; 6],
}

impl CubeMapData {
    /// Load a cube map stored as one horizontal-cross image.
    pub fn from_cross_file(path: impl AsRef<Path>) -> Result<Self, AssetError> {
        let path = path.as_ref();
        let image = open_rgba(path)?;
        let cube = Self::from_cross(&image, path)?;
        tracing::debug!(path = %path.display(), face_size = cube.face_size, "loaded cube map");
        Ok(cube)
    }

    pub fn from_cross(image: &RgbaImage, path: &Path) -> Result<Self, AssetError> {
        let (width, height) = image.dimensions();
        let face_size = width / 4;
        if face_size == 0 || width != face_size * 4 || height != face_size * 3 {
            return Err(AssetError::CubeMapLayout {
                path: path.to_path_buf(),
                width,
                height,
            });
        }
        let faces = CROSS_CELLS.map(|(col, row)| {
            image::imageops::crop_imm(image, col * face_size, row * face_size, face_size, face_size)
                .to_image()
                .into_raw()
        });
        Ok(Self { face_size, faces })
    }
}

fn open_rgba(path: &Path) -> Result<RgbaImage, AssetError> {
    let image = image::open(path).map_err(|source| match source {
        image::ImageError::IoError(source) => AssetError::Io {
            path: path.to_path_buf(),
            source,
        },
        source => AssetError::Image {
            path: path.to_path_buf(),
            source,
        },
    })?;
    Ok(image.to_rgba8())
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    #[test]
    fn solid_color_fills_every_pixel() {
        let tex = TextureData::solid_color(2, 3, [10, 20, 30, 255]);
        assert_eq!(tex.pixels.len(), 2 * 3 * 4);
        assert!(tex.pixels.chunks(4).all(|p| p == [10, 20, 30, 255]));
        assert_eq!(TextureData::white().pixels, vec![255; 4]);
    }

    #[test]
    fn png_round_trips_through_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("red.png");
        RgbaImage::from_pixel(4, 2, Rgba([255, 0, 0, 255]))
            .save(&path)
            .unwrap();
        let tex = TextureData::from_file(&path).unwrap();
        assert_eq!((tex.width, tex.height), (4, 2));
        assert_eq!(&tex.pixels[..4], &[255, 0, 0, 255]);
    }

    #[test]
    fn missing_texture_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            TextureData::from_file(dir.path().join("nope.png")),
            Err(AssetError::Io { .. })
        ));
    }

    #[test]
    fn cross_is_split_into_faces() {
        // paint each cell with its face index in the red channel
        let mut cross = RgbaImage::new(8, 6);
        for (face, (col, row)) in CROSS_CELLS.iter().enumerate() {
            for y in 0..2 {
                for x in 0..2 {
                    cross.put_pixel(col * 2 + x, row * 2 + y, Rgba([face as u8, 0, 0, 255]));
                }
            }
        }
        let cube = CubeMapData::from_cross(&cross, Path::new("sky.png")).unwrap();
        assert_eq!(cube.face_size, 2);
        for (face, pixels) in cube.faces.iter().enumerate() {
            assert_eq!(pixels.len(), 2 * 2 * 4);
            assert_eq!(pixels[0], face as u8, "face {}", CUBE_FACE_ORDER[face]);
        }
    }

    #[test]
    fn non_cross_image_is_rejected() {
        let square = RgbaImage::new(8, 8);
        assert!(matches!(
            CubeMapData::from_cross(&square, Path::new("sky.png")),
            Err(AssetError::CubeMapLayout { width: 8, height: 8, .. })
        ));
    }
}
