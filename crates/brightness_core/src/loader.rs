use std::path::Path;

use image::{ColorType, DynamicImage, GenericImageView, GrayImage, RgbImage, RgbaImage};
use log::{debug, info};

use crate::buffer::PixelBuffer;
use crate::{BrightnessError, Result};

/// File extensions offered when picking an input image.
pub const SUPPORTED_EXTENSIONS: &[&str] = &["bmp", "jpg", "jpeg", "png", "tif", "tiff"];

/// Decoded image together with the colour type it was stored in.
#[derive(Clone, Debug)]
pub struct LoadedImage {
    pub buffer: PixelBuffer,
    pub source_format: ColorType,
}

impl LoadedImage {
    pub fn from_dynamic(image: &DynamicImage) -> Self {
        Self { buffer: buffer_from_dynamic(image), source_format: image.color() }
    }

    /// Human readable source format, e.g. `Rgb8` or `La16`.
    pub fn format_label(&self) -> String {
        format!("{:?}", self.source_format)
    }
}

pub fn is_supported_image(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| SUPPORTED_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()))
        .unwrap_or(false)
}

pub fn load_image<P: AsRef<Path>>(path: P) -> Result<LoadedImage> {
    let image = image::open(path.as_ref())?;
    let loaded = LoadedImage::from_dynamic(&image);
    debug!(
        "loaded {} ({}x{}, {})",
        path.as_ref().display(),
        loaded.buffer.width(),
        loaded.buffer.height(),
        loaded.format_label()
    );
    Ok(loaded)
}

/// Encode `buffer` to `path`; the format follows the file extension.
pub fn save_image<P: AsRef<Path>>(buffer: &PixelBuffer, path: P) -> Result<()> {
    to_dynamic(buffer)?.save(path.as_ref())?;
    info!("wrote {}", path.as_ref().display());
    Ok(())
}

/// Grayscale sources keep one channel; colour sources become BGR, or BGRA with alpha.
fn buffer_from_dynamic(image: &DynamicImage) -> PixelBuffer {
    let (width, height) = image.dimensions();
    let color = image.color();

    if !color.has_color() {
        return PixelBuffer::packed_unchecked(width, height, 1, image.to_luma8().into_raw());
    }

    if color.has_alpha() {
        let mut data = image.to_rgba8().into_raw();
        data.chunks_exact_mut(4).for_each(|pixel| pixel.swap(0, 2));
        PixelBuffer::packed_unchecked(width, height, 4, data)
    } else {
        let mut data = image.to_rgb8().into_raw();
        data.chunks_exact_mut(3).for_each(|pixel| pixel.swap(0, 2));
        PixelBuffer::packed_unchecked(width, height, 3, data)
    }
}

fn to_dynamic(buffer: &PixelBuffer) -> Result<DynamicImage> {
    let (width, height) = buffer.dimensions();
    let channels = buffer.channels();
    let mut data = Vec::with_capacity(buffer.pixel_count() * channels.max(3));

    let image = match channels {
        1 => {
            buffer.rows().for_each(|row| data.extend_from_slice(row));
            GrayImage::from_raw(width, height, data).map(DynamicImage::ImageLuma8)
        },
        4 => {
            for row in buffer.rows() {
                for pixel in row.chunks_exact(4) {
                    data.extend_from_slice(&[pixel[2], pixel[1], pixel[0], pixel[3]]);
                }
            }
            RgbaImage::from_raw(width, height, data).map(DynamicImage::ImageRgba8)
        },
        _ => {
            for y in 0..height {
                for x in 0..width {
                    let bgr = buffer.bgr(x, y);
                    data.extend_from_slice(&[bgr.red, bgr.green, bgr.blue]);
                }
            }
            RgbImage::from_raw(width, height, data).map(DynamicImage::ImageRgb8)
        },
    };

    image.ok_or_else(|| {
        BrightnessError::InvalidLayout(format!(
            "{width}x{height} image with {channels} channels does not match its pixel data"
        ))
    })
}
