use log::debug;
use rayon::prelude::*;

use crate::buffer::PixelBuffer;
use crate::{BrightnessError, Result, PARALLEL_THRESHOLD};

/// Reduction percentage restricted to the `10%..=90%` menu in steps of ten.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ReductionStep(u8);

impl ReductionStep {
    pub const MENU: [u8; 9] = [10, 20, 30, 40, 50, 60, 70, 80, 90];

    pub fn percent(self) -> i32 {
        i32::from(self.0)
    }
}

impl Default for ReductionStep {
    fn default() -> Self {
        Self(50)
    }
}

impl TryFrom<i64> for ReductionStep {
    type Error = BrightnessError;

    fn try_from(value: i64) -> Result<Self> {
        Self::MENU
            .into_iter()
            .find(|&step| i64::from(step) == value)
            .map(Self)
            .ok_or(BrightnessError::InvalidPercentage(value))
    }
}

/// Scale every colour channel by `1 - percentage / 100`.
///
/// Values truncate toward zero and clamp to `0..=255`, so negative
/// percentages brighten. Alpha is copied unchanged. The result is tightly
/// packed and `buffer` is left untouched.
pub fn reduce(buffer: &PixelBuffer, percentage: i32) -> PixelBuffer {
    let factor = 1.0 - f64::from(percentage) / 100.0;
    let channels = buffer.channels();
    let alpha = buffer.alpha_index();
    let row_bytes = buffer.width() as usize * channels;

    let scale_row = |(source, target): (&[u8], &mut [u8])| {
        for (src, dst) in source.chunks_exact(channels).zip(target.chunks_exact_mut(channels)) {
            for (index, (&value, out)) in src.iter().zip(dst.iter_mut()).enumerate() {
                *out = if Some(index) == alpha { value } else { scale_channel(value, factor) };
            }
        }
    };

    let mut data = vec![0u8; row_bytes * buffer.height() as usize];
    if row_bytes > 0 {
        if buffer.pixel_count() >= PARALLEL_THRESHOLD {
            let rows: Vec<&[u8]> = buffer.rows().collect();
            rows.into_par_iter().zip(data.par_chunks_exact_mut(row_bytes)).for_each(scale_row);
        } else {
            buffer.rows().zip(data.chunks_exact_mut(row_bytes)).for_each(scale_row);
        }
    }

    debug!(
        "reduced {}x{} image by {percentage}% (factor {factor})",
        buffer.width(),
        buffer.height()
    );

    PixelBuffer::packed_unchecked(buffer.width(), buffer.height(), channels, data)
}

fn scale_channel(value: u8, factor: f64) -> u8 {
    (f64::from(value) * factor).trunc().clamp(0.0, 255.0) as u8
}
