use std::path::Path;

use crate::backend::Backend;
use crate::codec::color::Rgb;
use crate::error::{Error, Result};
use crate::grid::Image;

/// Reads anything the `image` crate can decode, writes PNG.
#[derive(Debug, Default, Clone, Copy)]
pub struct NativeBackend;

impl Backend for NativeBackend {
    fn name(&self) -> &'static str {
        "native"
    }

    fn read(&self, path: &Path) -> Result<Image> {
        // to_rgb8 drops any alpha channel.
        let rgb = ::image::open(path)?.to_rgb8();
        let (width, height) = rgb.dimensions();
        let data = rgb
            .pixels()
            .map(|px| {
                let [r, g, b] = px.0;
                Rgb(r, g, b)
            })
            .collect();
        Image::from_parts(width, height, data)
    }

    fn write(&self, image: &Image, path: &Path) -> Result<()> {
        let (width, height) = image.size();
        let buffer = ::image::RgbImage::from_raw(width, height, image.to_rgb_bytes())
            .ok_or_else(|| Error::Codec(format!("cannot build a {width}x{height} RGB buffer")))?;
        buffer.save_with_format(path, ::image::ImageFormat::Png)?;
        Ok(())
    }
}
