use std::io::Cursor;

use anyhow::{bail, Context, Result};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use image::{ImageFormat, RgbImage};

/// Width the live preview is downscaled to before encoding. Stills keep
/// the source's native resolution.
pub const PREVIEW_WIDTH: u32 = 320;

/// Serializes one frame as a lossless PNG wrapped in a self-contained
/// data URI.
pub fn encode_png_data_uri(frame: &RgbImage) -> Result<String> {
    let mut png_bytes = Vec::new();
    frame
        .write_to(&mut Cursor::new(&mut png_bytes), ImageFormat::Png)
        .context("failed to encode frame as PNG")?;
    Ok(format!("data:image/png;base64,{}", STANDARD.encode(&png_bytes)))
}

/// Preview variant: downscales to [`PREVIEW_WIDTH`] (aspect preserved)
/// before encoding, so the shell isn't fed native-resolution frames
/// several times a second.
pub fn encode_preview_data_uri(frame: &RgbImage) -> Result<String> {
    let (width, height) = frame.dimensions();
    if width == 0 || height == 0 {
        bail!("refusing to encode an empty frame");
    }
    if width <= PREVIEW_WIDTH {
        return encode_png_data_uri(frame);
    }

    let scaled_height = ((height as u64 * PREVIEW_WIDTH as u64) / width as u64).max(1) as u32;
    let preview = image::imageops::thumbnail(frame, PREVIEW_WIDTH, scaled_height);
    encode_png_data_uri(&preview)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    fn test_frame(width: u32, height: u32) -> RgbImage {
        RgbImage::from_fn(width, height, |x, y| {
            Rgb([(x % 256) as u8, (y % 256) as u8, 128])
        })
    }

    #[test]
    fn still_is_a_png_data_uri_at_native_resolution() {
        let uri = encode_png_data_uri(&test_frame(48, 32)).expect("encode should succeed");
        let payload = uri
            .strip_prefix("data:image/png;base64,")
            .expect("uri should carry the png data-uri envelope");

        let bytes = STANDARD.decode(payload).expect("payload should be base64");
        let decoded = image::load_from_memory(&bytes).expect("payload should decode as an image");
        assert_eq!((decoded.width(), decoded.height()), (48, 32));
    }

    #[test]
    fn preview_downscales_wide_frames() {
        let uri = encode_preview_data_uri(&test_frame(640, 480)).expect("encode should succeed");
        let payload = uri.strip_prefix("data:image/png;base64,").expect("data uri");
        let bytes = STANDARD.decode(payload).expect("base64");
        let decoded = image::load_from_memory(&bytes).expect("png");
        assert_eq!((decoded.width(), decoded.height()), (PREVIEW_WIDTH, 240));
    }

    #[test]
    fn preview_keeps_small_frames_untouched() {
        let uri = encode_preview_data_uri(&test_frame(160, 120)).expect("encode should succeed");
        let payload = uri.strip_prefix("data:image/png;base64,").expect("data uri");
        let bytes = STANDARD.decode(payload).expect("base64");
        let decoded = image::load_from_memory(&bytes).expect("png");
        assert_eq!((decoded.width(), decoded.height()), (160, 120));
    }
}
