use crate::{BrightnessError, Result};

/// Colour triple read from a single pixel.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Bgr {
    pub blue: u8,
    pub green: u8,
    pub red: u8,
}

impl Bgr {
    /// Integer mean of the three channels.
    pub fn average(self) -> i32 {
        (i32::from(self.red) + i32::from(self.green) + i32::from(self.blue)) / 3
    }
}

/// Rectangular grid of 8-bit pixels stored blue-first.
///
/// Byte `row_stride * y + channels * x + c` holds channel `c` of pixel `(x, y)`,
/// where `c` is 0 = blue, 1 = green, 2 = red and 3 = alpha. Rows may carry
/// trailing padding.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PixelBuffer {
    width: u32,
    height: u32,
    channels: usize,
    row_stride: usize,
    data: Vec<u8>,
}

impl PixelBuffer {
    pub fn new(
        width: u32,
        height: u32,
        channels: usize,
        row_stride: usize,
        data: Vec<u8>,
    ) -> Result<Self> {
        if !(1..=4).contains(&channels) {
            return Err(BrightnessError::InvalidLayout(format!(
                "expected 1 to 4 channels, got {channels}"
            )));
        }

        let row_bytes = row_bytes(width, channels)?;
        if row_stride < row_bytes {
            return Err(BrightnessError::InvalidLayout(format!(
                "row stride {row_stride} is shorter than a row of {row_bytes} bytes"
            )));
        }

        let required = row_stride.checked_mul(height as usize).ok_or_else(|| {
            BrightnessError::InvalidLayout(format!(
                "row stride {row_stride} times {height} rows overflows"
            ))
        })?;
        if data.len() < required {
            return Err(BrightnessError::InvalidLayout(format!(
                "buffer holds {} bytes, {required} required",
                data.len()
            )));
        }

        Ok(Self { width, height, channels, row_stride, data })
    }

    /// Tightly packed buffer, no row padding.
    pub fn packed(width: u32, height: u32, channels: usize, data: Vec<u8>) -> Result<Self> {
        Self::new(width, height, channels, row_bytes(width, channels)?, data)
    }

    /// Packed layout whose length is already known to match.
    pub(crate) fn packed_unchecked(
        width: u32,
        height: u32,
        channels: usize,
        data: Vec<u8>,
    ) -> Self {
        let row_stride = width as usize * channels;
        debug_assert_eq!(data.len(), row_stride * height as usize);
        Self { width, height, channels, row_stride, data }
    }

    /// Packed 3-channel buffer built from `(red, green, blue)` triples in row-major order.
    pub fn from_rgb(width: u32, height: u32, pixels: &[[u8; 3]]) -> Result<Self> {
        let data = pixels.iter().flat_map(|&[r, g, b]| [b, g, r]).collect();
        Self::packed(width, height, 3, data)
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn channels(&self) -> usize {
        self.channels
    }

    pub fn row_stride(&self) -> usize {
        self.row_stride
    }

    pub fn pixel_count(&self) -> usize {
        self.width as usize * self.height as usize
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    /// Index of the alpha channel, if the layout has one.
    pub fn alpha_index(&self) -> Option<usize> {
        match self.channels {
            2 => Some(1),
            4 => Some(3),
            _ => None,
        }
    }

    /// Visible bytes of row `y`, without padding.
    pub fn row(&self, y: u32) -> &[u8] {
        let start = self.row_stride * y as usize;
        &self.data[start..start + self.width as usize * self.channels]
    }

    pub fn rows(&self) -> impl Iterator<Item = &[u8]> + '_ {
        (0..self.height).map(move |y| self.row(y))
    }

    /// Channel bytes of pixel `(x, y)`.
    pub fn pixel(&self, x: u32, y: u32) -> &[u8] {
        let offset = self.row_stride * y as usize + self.channels * x as usize;
        &self.data[offset..offset + self.channels]
    }

    /// Colour triple of `(x, y)`; missing green or red channels repeat blue.
    pub fn bgr(&self, x: u32, y: u32) -> Bgr {
        read_bgr(self.pixel(x, y))
    }
}

fn row_bytes(width: u32, channels: usize) -> Result<usize> {
    (width as usize).checked_mul(channels).ok_or_else(|| {
        BrightnessError::InvalidLayout(format!("{width} pixels of {channels} channels overflows"))
    })
}

pub(crate) fn read_bgr(pixel: &[u8]) -> Bgr {
    let blue = pixel[0];
    let green = if pixel.len() > 1 { pixel[1] } else { blue };
    let red = if pixel.len() > 2 { pixel[2] } else { blue };
    Bgr { blue, green, red }
}
