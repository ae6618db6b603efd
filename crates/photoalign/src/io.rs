//! `image`-crate adapters for the core buffer types.
//!
//! Disk I/O happens only here, at the workspace boundary; the pipeline
//! itself operates purely on in-memory buffers.

use std::path::Path;

use photoalign_core::RgbImage;

/// Errors from the loading/saving adapters.
#[derive(thiserror::Error, Debug)]
pub enum IoError {
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Image(#[from] image::ImageError),
}

/// Load any supported image file and convert it to an 8-bit RGB buffer.
pub fn load_rgb(path: impl AsRef<Path>) -> Result<RgbImage, IoError> {
    let decoded = image::ImageReader::open(path)?.decode()?.to_rgb8();
    Ok(to_core_rgb(&decoded))
}

/// Encode an RGB buffer to `path`; the format follows the file extension.
pub fn save_rgb(path: impl AsRef<Path>, img: &RgbImage) -> Result<(), IoError> {
    from_core_rgb(img).save(path)?;
    Ok(())
}

/// Convert an `image::RgbImage` into the core buffer type.
pub fn to_core_rgb(img: &image::RgbImage) -> RgbImage {
    RgbImage {
        width: img.width() as usize,
        height: img.height() as usize,
        data: img.as_raw().clone(),
    }
}

/// Convert a core buffer into an `image::RgbImage`.
pub fn from_core_rgb(img: &RgbImage) -> image::RgbImage {
    image::RgbImage::from_raw(img.width as u32, img.height as u32, img.data.clone())
        .unwrap_or_else(|| image::RgbImage::new(0, 0))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn conversions_round_trip() {
        let mut img = RgbImage::new(5, 4);
        img.put_pixel(3, 2, [9, 80, 200]);
        let back = to_core_rgb(&from_core_rgb(&img));
        assert_eq!(back, img);
    }
}
