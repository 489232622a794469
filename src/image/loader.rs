use crate::utils::error::ServiceError;
use crate::Result;
use image::codecs::jpeg::JpegEncoder;
use image::{DynamicImage, ImageFormat, RgbImage};

/// JPEG quality for every image sent out of the service.
pub const JPEG_QUALITY: u8 = 95;

pub struct ImageLoader;

impl ImageLoader {
    /// Decodes uploaded bytes into an 8-bit RGB image.
    pub fn from_bytes(bytes: &[u8]) -> Result<RgbImage> {
        if bytes.is_empty() {
            return Err(ServiceError::InvalidInput("Empty file".to_string()));
        }

        if let Some(format) = Self::detect_format(bytes) {
            tracing::debug!("Upload looks like {:?}", format);
        }

        let image = image::load_from_memory(bytes)?;
        Ok(Self::to_rgb(image))
    }

    pub fn detect_format(bytes: &[u8]) -> Option<ImageFormat> {
        image::guess_format(bytes).ok()
    }

    fn to_rgb(image: DynamicImage) -> RgbImage {
        match image {
            DynamicImage::ImageRgb8(rgb) => rgb,
            other => other.to_rgb8(),
        }
    }

    /// Compresses an image to JPEG.
    pub fn encode_jpeg(image: &RgbImage) -> Result<Vec<u8>> {
        let mut buffer = Vec::new();
        JpegEncoder::new_with_quality(&mut buffer, JPEG_QUALITY)
            .encode_image(image)
            .map_err(|e| ServiceError::ImageEncode(e.to_string()))?;
        Ok(buffer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;
    use std::io::Cursor;

    fn png_bytes(image: &RgbImage) -> Vec<u8> {
        let mut bytes = Vec::new();
        image
            .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
            .unwrap();
        bytes
    }

    #[test]
    fn decodes_png_losslessly() {
        let original = RgbImage::from_fn(8, 6, |x, y| Rgb([x as u8 * 10, y as u8 * 20, 7]));
        let decoded = ImageLoader::from_bytes(&png_bytes(&original)).unwrap();
        assert_eq!(decoded, original);
    }

    #[test]
    fn rejects_garbage_as_decode_error() {
        let err = ImageLoader::from_bytes(b"hello, not an image").unwrap_err();
        assert!(matches!(err, ServiceError::ImageDecode(_)));
    }

    #[test]
    fn rejects_empty_upload() {
        let err = ImageLoader::from_bytes(&[]).unwrap_err();
        assert!(matches!(err, ServiceError::InvalidInput(_)));
    }

    #[test]
    fn jpeg_output_is_decodable() {
        let image = RgbImage::from_pixel(32, 16, Rgb([200, 30, 30]));
        let jpeg = ImageLoader::encode_jpeg(&image).unwrap();

        assert_eq!(ImageLoader::detect_format(&jpeg), Some(ImageFormat::Jpeg));
        let back = ImageLoader::from_bytes(&jpeg).unwrap();
        assert_eq!(back.dimensions(), (32, 16));
    }
}
