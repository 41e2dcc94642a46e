use bytes::Bytes;
use image::imageops::FilterType;
use jpeg_encoder::{ColorType, Encoder};
use thiserror::Error;

use crate::frame::{EncodedImage, InputImage};

#[derive(Debug, Error)]
pub enum EncodeError {
    #[error("decode {name}: {source}")]
    Decode {
        name: String,
        #[source]
        source: image::ImageError,
    },
    #[error("encode {name}: {source}")]
    Encode {
        name: String,
        #[source]
        source: jpeg_encoder::EncodingError,
    },
    #[error("image {name} too large to encode ({width}x{height})")]
    TooLarge {
        name: String,
        width: u32,
        height: u32,
    },
    #[error("encoder task canceled")]
    Canceled,
}

#[derive(Clone, Debug)]
pub struct Settings {
    /// JPEG quality, 1..=100.
    pub quality: u8,
    /// Inputs with a side larger than this are downscaled proportionally.
    /// None = keep original size.
    pub max_dimension: Option<u32>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            quality: 95,
            max_dimension: Some(2048),
        }
    }
}

/// Transforms one input file into encoded output bytes. The bus runs this on
/// the blocking pool, one input at a time.
pub trait ImageCodec: Send + Sync + 'static {
    fn transcode(&self, input: &InputImage) -> Result<EncodedImage, EncodeError>;
}

pub struct JpegCodec {
    settings: Settings,
}

impl JpegCodec {
    pub fn new(settings: Settings) -> Self {
        Self { settings }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }
}

impl Default for JpegCodec {
    fn default() -> Self {
        Self::new(Settings::default())
    }
}

impl ImageCodec for JpegCodec {
    fn transcode(&self, input: &InputImage) -> Result<EncodedImage, EncodeError> {
        let mut decoded = image::load_from_memory(&input.data).map_err(|e| EncodeError::Decode {
            name: input.name.clone(),
            source: e,
        })?;

        if let Some(max) = self.settings.max_dimension {
            if decoded.width() > max || decoded.height() > max {
                decoded = decoded.resize(max, max, FilterType::Triangle);
            }
        }

        let rgb = decoded.to_rgb8();
        let (width, height) = rgb.dimensions();
        if width > u16::MAX as u32 || height > u16::MAX as u32 {
            return Err(EncodeError::TooLarge {
                name: input.name.clone(),
                width,
                height,
            });
        }

        let mut out = Vec::new();
        let encoder = Encoder::new(&mut out, self.settings.quality);
        encoder
            .encode(rgb.as_raw(), width as u16, height as u16, ColorType::Rgb)
            .map_err(|e| EncodeError::Encode {
                name: input.name.clone(),
                source: e,
            })?;

        Ok(EncodedImage {
            source: input.name.clone(),
            data: Bytes::from(out),
            width,
            height,
        })
    }
}
