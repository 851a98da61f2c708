//! Core types for greeting image generation.

use crate::error::{GreetVizError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Supported image formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageFormat {
    /// PNG format (lossless).
    #[default]
    Png,
    /// JPEG format (lossy).
    Jpeg,
    /// WebP format (modern, efficient).
    WebP,
}

impl ImageFormat {
    /// Returns the file extension for this format.
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Png => "png",
            Self::Jpeg => "jpg",
            Self::WebP => "webp",
        }
    }

    /// Returns the MIME type for this format.
    pub fn mime_type(&self) -> &'static str {
        match self {
            Self::Png => "image/png",
            Self::Jpeg => "image/jpeg",
            Self::WebP => "image/webp",
        }
    }

    /// Parses a MIME type returned by the service.
    pub fn from_mime_type(mime: &str) -> Option<Self> {
        match mime {
            "image/png" => Some(Self::Png),
            "image/jpeg" | "image/jpg" => Some(Self::Jpeg),
            "image/webp" => Some(Self::WebP),
            _ => None,
        }
    }

    /// Detects image format from magic bytes.
    pub fn from_magic_bytes(data: &[u8]) -> Option<Self> {
        if data.len() < 12 {
            return None;
        }

        // PNG: 89 50 4E 47 0D 0A 1A 0A
        if data.starts_with(&[0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A]) {
            return Some(Self::Png);
        }

        // JPEG: FF D8 FF
        if data.starts_with(&[0xFF, 0xD8, 0xFF]) {
            return Some(Self::Jpeg);
        }

        // WebP: RIFF....WEBP
        if data.starts_with(b"RIFF") && &data[8..12] == b"WEBP" {
            return Some(Self::WebP);
        }

        None
    }
}

/// Aspect ratios the greeting templates are rendered in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum AspectRatio {
    /// 1:1 square, the Instagram feed format.
    #[default]
    #[serde(rename = "1:1")]
    Square,
}

impl AspectRatio {
    /// Returns the aspect ratio as a string (e.g., "1:1").
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Square => "1:1",
        }
    }
}

impl std::fmt::Display for AspectRatio {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Output resolution tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ImageSize {
    /// Roughly 1024px on the long edge.
    #[default]
    #[serde(rename = "1K")]
    OneK,
}

impl ImageSize {
    /// Returns the tier as the service spells it.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::OneK => "1K",
        }
    }
}

impl std::fmt::Display for ImageSize {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Metadata about the generation process.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationMetadata {
    /// Model used for generation.
    pub model: Option<String>,
    /// Generation duration in milliseconds.
    pub duration_ms: Option<u64>,
}

/// A request for one image.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationRequest {
    /// The instruction text sent to the model.
    pub prompt: String,
    /// Aspect ratio of the output.
    pub aspect_ratio: Option<AspectRatio>,
    /// Resolution tier of the output.
    pub image_size: Option<ImageSize>,
    /// Image to edit (raw bytes). Sent inline before the prompt.
    #[serde(skip)]
    pub input_image: Option<Vec<u8>>,
}

impl GenerationRequest {
    /// Creates a new request with the given prompt.
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            aspect_ratio: None,
            image_size: None,
            input_image: None,
        }
    }

    /// Sets the aspect ratio.
    pub fn with_aspect_ratio(mut self, ratio: AspectRatio) -> Self {
        self.aspect_ratio = Some(ratio);
        self
    }

    /// Sets the resolution tier.
    pub fn with_image_size(mut self, size: ImageSize) -> Self {
        self.image_size = Some(size);
        self
    }

    /// Sets an input image for editing.
    pub fn with_input_image(mut self, image: Vec<u8>) -> Self {
        self.input_image = Some(image);
        self
    }

    /// Returns true if this is an image editing request (has input image).
    pub fn is_edit(&self) -> bool {
        self.input_image.is_some()
    }
}

/// A generated image with its data and metadata.
#[derive(Debug, Clone, PartialEq)]
#[must_use = "generated image should be saved or processed"]
pub struct GeneratedImage {
    /// Raw image bytes.
    pub data: Vec<u8>,
    /// Image format.
    pub format: ImageFormat,
    /// Generation metadata.
    pub metadata: GenerationMetadata,
}

impl GeneratedImage {
    /// Creates a new generated image.
    pub fn new(data: Vec<u8>, format: ImageFormat, metadata: GenerationMetadata) -> Self {
        Self {
            data,
            format,
            metadata,
        }
    }

    /// Decodes a base64 payload as the service transports it.
    pub fn from_base64(
        encoded: &str,
        format: ImageFormat,
        metadata: GenerationMetadata,
    ) -> Result<Self> {
        use base64::Engine;
        let data = base64::engine::general_purpose::STANDARD
            .decode(encoded)
            .map_err(|e| GreetVizError::Decode(e.to_string()))?;
        Ok(Self::new(data, format, metadata))
    }

    /// Returns the size of the image data in bytes.
    pub fn size(&self) -> usize {
        self.data.len()
    }

    /// Saves the image to the specified path.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        std::fs::write(path, &self.data)?;
        Ok(())
    }

    /// Encodes the image data as base64.
    pub fn to_base64(&self) -> String {
        use base64::Engine;
        base64::engine::general_purpose::STANDARD.encode(&self.data)
    }

    /// Returns the image as a data URL.
    pub fn to_data_url(&self) -> String {
        format!(
            "data:{};base64,{}",
            self.format.mime_type(),
            self.to_base64()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PNG_MAGIC: [u8; 12] = [0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A, 0, 0, 0, 0];
    const JPEG_MAGIC: [u8; 12] = [0xFF, 0xD8, 0xFF, 0xE0, 0, 0, 0, 0, 0, 0, 0, 0];
    const WEBP_MAGIC: [u8; 12] = *b"RIFF\x00\x00\x00\x00WEBP";

    #[test]
    fn test_format_from_magic_bytes() {
        assert_eq!(
            ImageFormat::from_magic_bytes(&PNG_MAGIC),
            Some(ImageFormat::Png)
        );
        assert_eq!(
            ImageFormat::from_magic_bytes(&JPEG_MAGIC),
            Some(ImageFormat::Jpeg)
        );
        assert_eq!(
            ImageFormat::from_magic_bytes(&WEBP_MAGIC),
            Some(ImageFormat::WebP)
        );
        assert_eq!(ImageFormat::from_magic_bytes(b"short"), None);
    }

    #[test]
    fn test_format_from_mime_type() {
        assert_eq!(
            ImageFormat::from_mime_type("image/jpeg"),
            Some(ImageFormat::Jpeg)
        );
        assert_eq!(ImageFormat::from_mime_type("text/plain"), None);
    }

    #[test]
    fn test_defaults_match_instagram_post() {
        assert_eq!(AspectRatio::default().as_str(), "1:1");
        assert_eq!(ImageSize::default().as_str(), "1K");
    }

    #[test]
    fn test_only_template_format_deserializes() {
        assert_eq!(
            serde_json::from_str::<AspectRatio>("\"1:1\"").unwrap(),
            AspectRatio::Square
        );
        assert!(serde_json::from_str::<AspectRatio>("\"9:16\"").is_err());
        assert!(serde_json::from_str::<ImageSize>("\"4K\"").is_err());
    }

    #[test]
    fn test_request_serializes_service_spellings() {
        let req = GenerationRequest::new("hello")
            .with_aspect_ratio(AspectRatio::Square)
            .with_image_size(ImageSize::OneK);
        let json = serde_json::to_value(&req).unwrap();
        assert_eq!(json["aspect_ratio"], "1:1");
        assert_eq!(json["image_size"], "1K");
        assert!(!req.is_edit());
    }

    #[test]
    fn test_base64_and_data_url() {
        let image = GeneratedImage::from_base64(
            "iVBORw0KGgo=",
            ImageFormat::Png,
            GenerationMetadata::default(),
        )
        .unwrap();
        assert_eq!(image.size(), 8);
        assert_eq!(image.to_base64(), "iVBORw0KGgo=");
        assert_eq!(image.to_data_url(), "data:image/png;base64,iVBORw0KGgo=");
    }

    #[test]
    fn test_from_base64_rejects_garbage() {
        let err = GeneratedImage::from_base64(
            "not base64!!",
            ImageFormat::Png,
            GenerationMetadata::default(),
        )
        .unwrap_err();
        assert!(matches!(err, GreetVizError::Decode(_)));
    }

    #[test]
    fn test_save_writes_bytes() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("new-year-wish.png");
        let image = GeneratedImage::new(
            PNG_MAGIC.to_vec(),
            ImageFormat::Png,
            GenerationMetadata::default(),
        );
        image.save(&path).unwrap();
        assert_eq!(std::fs::read(&path).unwrap(), PNG_MAGIC.to_vec());
    }
}
