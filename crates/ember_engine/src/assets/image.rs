//! Image decoding for texture data
//!
//! Decodes image files into tightly packed 8-bit pixels, flipped so the
//! first row is the bottom of the image, ready for a texture upload.

use crate::assets::{AssetError, AssetResult};
use crate::render::{ImageFormat, TextureSpecification};
use image::DynamicImage;
use std::path::Path;

/// Decoded image data ready for GPU upload
#[derive(Debug, Clone)]
pub struct ImageData {
    /// Packed pixel data
    pub data: Vec<u8>,
    /// Image width in pixels
    pub width: u32,
    /// Image height in pixels
    pub height: u32,
    /// Channels per pixel (3 or 4)
    pub channels: u8,
}

impl ImageData {
    /// Load an image from a file path
    pub fn from_file(path: impl AsRef<Path>) -> AssetResult<Self> {
        let path = path.as_ref();
        log::debug!("Loading image from: {}", path.display());

        let image = image::open(path).map_err(|source| AssetError::Image {
            path: path.to_path_buf(),
            source,
        })?;
        let data = Self::from_image(image);
        log::info!("Loaded image {}x{} from {}", data.width, data.height, path.display());
        Ok(data)
    }

    /// Load an image from memory
    pub fn from_bytes(bytes: &[u8]) -> AssetResult<Self> {
        let image = image::load_from_memory(bytes).map_err(|source| AssetError::Image {
            path: "<memory>".into(),
            source,
        })?;
        Ok(Self::from_image(image))
    }

    fn from_image(image: DynamicImage) -> Self {
        let image = image.flipv();
        let (width, height) = (image.width(), image.height());
        if image.color().has_alpha() {
            Self {
                data: image.into_rgba8().into_raw(),
                width,
                height,
                channels: 4,
            }
        } else {
            Self {
                data: image.into_rgb8().into_raw(),
                width,
                height,
                channels: 3,
            }
        }
    }

    /// Solid RGBA image
    pub fn solid_color(width: u32, height: u32, color: [u8; 4]) -> Self {
        let pixel_count = width as usize * height as usize;
        Self {
            data: color.repeat(pixel_count),
            width,
            height,
            channels: 4,
        }
    }

    /// Texture specification matching this image
    pub fn specification(&self) -> TextureSpecification {
        TextureSpecification {
            width: self.width,
            height: self.height,
            format: ImageFormat::from_channels(self.channels).unwrap_or_default(),
            generate_mips: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage, Rgba, RgbaImage};

    #[test]
    fn test_rgba_file_is_flipped() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("stripe.png");
        let mut img = RgbaImage::from_pixel(2, 2, Rgba([0, 0, 0, 255]));
        img.put_pixel(0, 0, Rgba([255, 0, 0, 255]));
        img.save(&path).unwrap();

        let data = ImageData::from_file(&path).unwrap();
        assert_eq!((data.width, data.height, data.channels), (2, 2, 4));
        assert_eq!(data.specification().format, ImageFormat::Rgba8);
        // Top-left pixel ends up in the last row.
        assert_eq!(&data.data[8..12], &[255, 0, 0, 255]);
    }

    #[test]
    fn test_rgb_file_keeps_three_channels() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("plain.png");
        RgbImage::from_pixel(3, 1, Rgb([10, 20, 30])).save(&path).unwrap();

        let data = ImageData::from_file(&path).unwrap();
        assert_eq!(data.channels, 3);
        assert_eq!(data.data.len(), data.specification().data_size());
    }

    #[test]
    fn test_missing_file_fails() {
        assert!(matches!(
            ImageData::from_file("does/not/exist.png"),
            Err(AssetError::Image { .. })
        ));
    }

    #[test]
    fn test_solid_color() {
        let data = ImageData::solid_color(2, 3, [1, 2, 3, 4]);
        assert_eq!(data.data.len(), 24);
        assert_eq!(&data.data[20..], &[1, 2, 3, 4]);
    }
}
