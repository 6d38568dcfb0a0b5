//! Rasterization of scalar fields into RGBA pixel buffers.

use crate::field::ScalarField;

/// Map a field sample to an 8-bit channel value: `clamp(v * 255, 0, 255)`.
#[inline]
pub fn to_channel(value: f32) -> u8 {
    (value * 255.0).clamp(0.0, 255.0) as u8
}

/// An opaque greyscale image stored as row-major RGBA pixels.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GrayscaleImage {
    /// Image width in pixels.
    pub width: u32,
    /// Image height in pixels.
    pub height: u32,
    /// Pixel data in row-major RGBA format. Length = `width * height * 4`.
    pub pixels: Vec<u8>,
}

impl GrayscaleImage {
    /// Rasterize `field`: every channel holds [`to_channel`] of the sample,
    /// alpha is 255.
    pub fn from_field(field: &ScalarField) -> Self {
        let mut pixels = Vec::with_capacity(field.len() * 4);
        for &v in field.as_slice() {
            let c = to_channel(v);
            pixels.extend_from_slice(&[c, c, c, 255]);
        }
        Self {
            width: field.width() as u32,
            height: field.height() as u32,
            pixels,
        }
    }

    /// Get a pixel's RGBA value.
    ///
    /// # Panics
    ///
    /// Panics if `x >= width` or `y >= height`.
    pub fn get_pixel(&self, x: u32, y: u32) -> (u8, u8, u8, u8) {
        let idx = ((y * self.width + x) * 4) as usize;
        (
            self.pixels[idx],
            self.pixels[idx + 1],
            self.pixels[idx + 2],
            self.pixels[idx + 3],
        )
    }

    /// Returns `(width, height)`.
    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Consume the image and return the raw RGBA buffer.
    pub fn into_raw(self) -> Vec<u8> {
        self.pixels
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_channel_mapping_clamps() {
        assert_eq!(to_channel(-0.5), 0);
        assert_eq!(to_channel(0.0), 0);
        assert_eq!(to_channel(0.5), 127);
        assert_eq!(to_channel(1.0), 255);
        assert_eq!(to_channel(3.0), 255);
    }

    #[test]
    fn test_image_dimensions_and_layout() {
        let field = ScalarField::from_vec(2, 2, vec![0.0, 1.0, 0.5, 0.25]).unwrap();
        let image = GrayscaleImage::from_field(&field);
        assert_eq!(image.dimensions(), (2, 2));
        assert_eq!(image.pixels.len(), 16);
        assert_eq!(image.get_pixel(1, 0), (255, 255, 255, 255));
        assert_eq!(image.get_pixel(1, 1), (63, 63, 63, 255));
    }

    #[test]
    fn test_alpha_is_opaque() {
        let field = ScalarField::filled(5, 3, 0.1).unwrap();
        let image = GrayscaleImage::from_field(&field);
        assert!(image.pixels.chunks_exact(4).all(|px| px[3] == 255));
    }
}
