//! Image attachments for vision questions
//!
//! An [`AttachedImage`] is the picture a question is asked about. Only PNG
//! and JPEG are accepted. Format detection uses magic bytes, the data is
//! decoded once with the `image` crate to validate it, and pictures larger
//! than the configured bound are downscaled before being sent anywhere.

use crate::error::{Result, SaanraError};
use base64::Engine;
use image::{DynamicImage, GenericImageView};
use std::io::Cursor;
use std::path::Path;

/// Supported image formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFormat {
    /// PNG image
    Png,
    /// JPEG image
    Jpeg,
}

impl ImageFormat {
    /// Returns the MIME type for this image format
    pub fn mime_type(&self) -> &'static str {
        match self {
            ImageFormat::Png => "image/png",
            ImageFormat::Jpeg => "image/jpeg",
        }
    }

    /// Detect the format from leading magic bytes
    ///
    /// # Examples
    ///
    /// ```
    /// use saanra::attachment::ImageFormat;
    ///
    /// assert_eq!(ImageFormat::detect(b"\x89PNG\r\n\x1a\n"), Some(ImageFormat::Png));
    /// assert_eq!(ImageFormat::detect(b"GIF89a"), None);
    /// ```
    pub fn detect(bytes: &[u8]) -> Option<Self> {
        if bytes.starts_with(b"\x89PNG") {
            Some(ImageFormat::Png)
        } else if bytes.starts_with(b"\xff\xd8\xff") {
            Some(ImageFormat::Jpeg)
        } else {
            None
        }
    }

    fn codec(&self) -> image::ImageFormat {
        match self {
            ImageFormat::Png => image::ImageFormat::Png,
            ImageFormat::Jpeg => image::ImageFormat::Jpeg,
        }
    }
}

/// Returns true if the file extension is one the uploader accepts
///
/// # Examples
///
/// ```
/// use saanra::attachment::is_supported_image_file;
/// use std::path::Path;
///
/// assert!(is_supported_image_file(Path::new("photo.JPG")));
/// assert!(!is_supported_image_file(Path::new("clip.gif")));
/// ```
pub fn is_supported_image_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| matches!(ext.to_lowercase().as_str(), "png" | "jpg" | "jpeg"))
        .unwrap_or(false)
}

/// An image attached to the current conversation
#[derive(Debug, Clone)]
pub struct AttachedImage {
    file_name: String,
    format: ImageFormat,
    width: u32,
    height: u32,
    bytes: Vec<u8>,
}

impl AttachedImage {
    /// Build an attachment from raw file bytes
    ///
    /// Images wider or taller than `max_dimension` are shrunk to fit,
    /// keeping the aspect ratio, and re-encoded in their original format.
    ///
    /// # Errors
    ///
    /// Returns `SaanraError::Image` if the bytes are not a decodable PNG or
    /// JPEG image.
    pub fn from_bytes(
        file_name: impl Into<String>,
        bytes: Vec<u8>,
        max_dimension: u32,
    ) -> Result<Self> {
        let file_name = file_name.into();
        let format = ImageFormat::detect(&bytes).ok_or_else(|| {
            SaanraError::Image(format!("Unsupported image format: {}", file_name))
        })?;

        let decoded = image::load_from_memory_with_format(&bytes, format.codec())
            .map_err(|e| SaanraError::Image(format!("Image decoding failed: {}", e)))?;
        let (width, height) = decoded.dimensions();

        if max_dimension == 0 || (width <= max_dimension && height <= max_dimension) {
            return Ok(Self {
                file_name,
                format,
                width,
                height,
                bytes,
            });
        }

        let resized = decoded.thumbnail(max_dimension, max_dimension);
        let resized = match format {
            // JPEG cannot carry an alpha channel
            ImageFormat::Jpeg => DynamicImage::ImageRgb8(resized.to_rgb8()),
            ImageFormat::Png => resized,
        };
        let (new_width, new_height) = resized.dimensions();

        let mut encoded = Vec::new();
        resized
            .write_to(&mut Cursor::new(&mut encoded), format.codec())
            .map_err(|e| SaanraError::Image(format!("Image encoding failed: {}", e)))?;

        tracing::debug!(
            "Downscaled {} from {}x{} to {}x{}",
            file_name,
            width,
            height,
            new_width,
            new_height
        );

        Ok(Self {
            file_name,
            format,
            width: new_width,
            height: new_height,
            bytes: encoded,
        })
    }

    /// Read and validate an image file
    ///
    /// # Errors
    ///
    /// Returns `SaanraError::Image` for unsupported extensions or data, and
    /// `SaanraError::Io` if the file cannot be read.
    pub fn load(path: &Path, max_dimension: u32) -> Result<Self> {
        if !is_supported_image_file(path) {
            return Err(SaanraError::Image(format!(
                "Unsupported file type: {} (expected jpg, jpeg or png)",
                path.display()
            ))
            .into());
        }

        let bytes = std::fs::read(path).map_err(SaanraError::Io)?;
        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().to_string())
            .unwrap_or_else(|| path.display().to_string());

        Self::from_bytes(file_name, bytes, max_dimension)
    }

    /// Original file name
    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    /// Detected format
    pub fn format(&self) -> ImageFormat {
        self.format
    }

    /// MIME type to declare when uploading
    pub fn mime_type(&self) -> &'static str {
        self.format.mime_type()
    }

    /// Pixel dimensions after any downscaling
    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Encoded image bytes
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Standard base64 encoding of the image bytes
    pub fn to_base64(&self) -> String {
        base64::engine::general_purpose::STANDARD.encode(&self.bytes)
    }
}
