use image::{
    ImageResult, RgbImage, RgbaImage,
    buffer::ConvertBuffer as _,
    codecs::{jpeg::JpegEncoder, png::PngEncoder},
};

use crate::foundation::{
    core::OutputFormat,
    error::{ChainError, ChainResult},
};

/// Default JPEG quality for cache entries.
pub const DEFAULT_JPEG_QUALITY: u8 = 95;

/// Decode encoded image bytes (any format the `image` crate detects) into straight RGBA8.
pub fn decode_image(bytes: &[u8]) -> ImageResult<RgbaImage> {
    Ok(image::load_from_memory(bytes)?.to_rgba8())
}

/// Encode `img` for storage. JPEG output drops the alpha channel.
pub fn encode_image(
    img: &RgbaImage,
    format: OutputFormat,
    jpeg_quality: u8,
) -> ChainResult<Vec<u8>> {
    let mut buf = Vec::new();
    let res = match format {
        OutputFormat::Jpeg => {
            let rgb: RgbImage = img.convert();
            rgb.write_with_encoder(JpegEncoder::new_with_quality(&mut buf, jpeg_quality))
        }
        OutputFormat::Png => img.write_with_encoder(PngEncoder::new(&mut buf)),
    };
    res.map_err(|e| ChainError::cache_write(format!("encode {}: {e}", format.extension())))?;
    Ok(buf)
}

#[cfg(test)]
#[path = "../../tests/unit/assets/decode.rs"]
mod tests;
