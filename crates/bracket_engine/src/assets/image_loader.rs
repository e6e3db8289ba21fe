//! Image decoding for textures
//!
//! Decodes PNG (and whatever else the `image` crate is built with) into RGBA8
//! pixels ready for upload.

use std::path::Path;

use crate::assets::AssetError;

/// Decoded texture
#[derive(Debug, Clone, PartialEq)]
pub struct Texture {
    /// Path the pixels came from
    pub path: String,
    /// Raw RGBA pixel data
    pub data: Vec<u8>,
    /// Image width in pixels
    pub width: u32,
    /// Image height in pixels
    pub height: u32,
    /// Whether this is the fallback standing in for a failed load
    pub is_fallback: bool,
}

impl Texture {
    /// Load an image from a file path
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, AssetError> {
        let path_ref = path.as_ref();

        log::debug!("Loading image from: {:?}", path_ref);

        let img = image::open(path_ref)
            .map_err(|e| AssetError::LoadFailed(format!("{}: {}", path_ref.display(), e)))?;

        // Convert to RGBA8 format (standard for GPU upload)
        let rgba_img = img.to_rgba8();
        let (width, height) = rgba_img.dimensions();

        log::debug!("Loaded image {}x{} from {:?}", width, height, path_ref);

        Ok(Self {
            path: path_ref.to_string_lossy().into_owned(),
            data: rgba_img.into_raw(),
            width,
            height,
            is_fallback: false,
        })
    }

    /// Decode an in-memory image
    pub fn from_bytes(name: &str, bytes: &[u8]) -> Result<Self, AssetError> {
        let img = image::load_from_memory(bytes)
            .map_err(|e| AssetError::LoadFailed(format!("{name}: {e}")))?;

        let rgba_img = img.to_rgba8();
        let (width, height) = rgba_img.dimensions();

        Ok(Self {
            path: name.to_string(),
            data: rgba_img.into_raw(),
            width,
            height,
            is_fallback: false,
        })
    }

    /// Create a solid color texture (useful for testing and defaults)
    pub fn solid_color(name: &str, width: u32, height: u32, color: [u8; 4]) -> Self {
        let pixel_count = (width * height) as usize;
        let mut data = Vec::with_capacity(pixel_count * 4);
        for _ in 0..pixel_count {
            data.extend_from_slice(&color);
        }

        Self {
            path: name.to_string(),
            data,
            width,
            height,
            is_fallback: false,
        }
    }

    /// Get the size of the pixel data in bytes
    pub fn size_bytes(&self) -> usize {
        self.data.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_solid_color_texture() {
        let tex = Texture::solid_color("red", 4, 4, [255, 0, 0, 255]);
        assert_eq!(tex.width, 4);
        assert_eq!(tex.size_bytes(), 4 * 4 * 4);
        assert_eq!(&tex.data[0..4], &[255, 0, 0, 255]);
        assert!(!tex.is_fallback);
    }

    #[test]
    fn test_png_round_trip_through_disk() {
        let file = tempfile::Builder::new().suffix(".png").tempfile().unwrap();
        image::RgbaImage::from_pixel(2, 3, image::Rgba([0, 255, 0, 255]))
            .save(file.path())
            .unwrap();

        let tex = Texture::from_file(file.path()).unwrap();
        assert_eq!((tex.width, tex.height), (2, 3));
        assert_eq!(&tex.data[4..8], &[0, 255, 0, 255]);
    }

    #[test]
    fn test_garbage_bytes_fail() {
        assert!(matches!(
            Texture::from_bytes("junk", b"not an image"),
            Err(AssetError::LoadFailed(_))
        ));
    }
}
