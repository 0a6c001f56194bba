use log::debug;
use rayon::prelude::*;

use crate::buffer::{read_bgr, PixelBuffer};
use crate::mode::BitDepthMode;
use crate::{BrightnessError, Result, PARALLEL_THRESHOLD};

/// Total brightness of an image and its share of the 255-per-pixel maximum.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BrightnessResult {
    pub total: f64,
    /// `total / (255 * width * height) * 100`. Exceeds 100 in 48bpp mode.
    pub percentage: f64,
}

impl BrightnessResult {
    fn from_total(total: f64, width: u32, height: u32) -> Self {
        let max_brightness = 255.0 * f64::from(width) * f64::from(height);
        Self { total, percentage: total / max_brightness * 100.0 }
    }
}

pub fn aggregate(buffer: &PixelBuffer, mode: BitDepthMode) -> Result<BrightnessResult> {
    let (width, height) = buffer.dimensions();
    if buffer.is_empty() {
        return Err(BrightnessError::InvalidDimensions { width, height });
    }

    let row_total = |row: &[u8]| -> u64 {
        row.chunks_exact(buffer.channels())
            .map(|pixel| {
                let bgr = read_bgr(pixel);
                u64::from(mode.pixel_value(bgr.red, bgr.green, bgr.blue))
            })
            .sum()
    };

    // Row sums are exact integers, so the parallel total matches a serial scan.
    let total: u64 = if buffer.pixel_count() >= PARALLEL_THRESHOLD {
        (0..height).into_par_iter().map(|y| row_total(buffer.row(y))).sum()
    } else {
        buffer.rows().map(row_total).sum()
    };

    let result = BrightnessResult::from_total(total as f64, width, height);
    debug!(
        "aggregated {width}x{height} image as {mode}: total {}, {:.3}%",
        result.total, result.percentage
    );
    Ok(result)
}

/// Aggregate using a mode label such as `"24bpp"`.
pub fn aggregate_label(buffer: &PixelBuffer, label: &str) -> Result<BrightnessResult> {
    aggregate(buffer, label.parse()?)
}

#[cfg(test)]
mod tests {
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    use super::*;

    fn random_buffer(rng: &mut StdRng, width: u32, height: u32, channels: usize) -> PixelBuffer {
        let stride = width as usize * channels + rng.gen_range(0..4);
        let data = (0..stride * height as usize).map(|_| rng.gen()).collect();
        PixelBuffer::new(width, height, channels, stride, data).unwrap()
    }

    #[test]
    fn white_and_black_pair_is_half_bright() {
        let buffer = PixelBuffer::from_rgb(2, 1, &[[255, 255, 255], [0, 0, 0]]).unwrap();
        let result = aggregate(&buffer, BitDepthMode::Bpp24).unwrap();
        assert_eq!(result.total, 255.0);
        assert_eq!(result.percentage, 50.0);
    }

    #[test]
    fn bpp8_only_reads_blue() {
        let buffer = PixelBuffer::from_rgb(1, 1, &[[255, 255, 51]]).unwrap();
        let result = aggregate(&buffer, BitDepthMode::Bpp8).unwrap();
        assert_eq!(result.total, 51.0);
        assert_eq!(result.percentage, 20.0);
    }

    #[test]
    fn bpp48_overflows_the_percentage() {
        let buffer = PixelBuffer::from_rgb(2, 2, &[[255, 255, 255]; 4]).unwrap();
        let result = aggregate(&buffer, BitDepthMode::Bpp48).unwrap();
        assert_eq!(result.total, 65280.0 * 4.0);
        assert!((result.percentage - 25600.0).abs() < 1e-9);
    }

    #[test]
    fn bpp24_and_bpp32_agree() {
        let mut rng = StdRng::seed_from_u64(7);
        for channels in [3, 4] {
            let buffer = random_buffer(&mut rng, 17, 9, channels);
            let a = aggregate(&buffer, BitDepthMode::Bpp24).unwrap();
            let b = aggregate(&buffer, BitDepthMode::Bpp32).unwrap();
            assert_eq!(a, b);
        }
    }

    #[test]
    fn identity_scale_modes_match_bpp24() {
        let mut rng = StdRng::seed_from_u64(11);
        let buffer = random_buffer(&mut rng, 13, 5, 3);
        let reference = aggregate(&buffer, BitDepthMode::Bpp24).unwrap();
        assert_eq!(aggregate(&buffer, BitDepthMode::Bpp12).unwrap(), reference);
        assert_eq!(aggregate(&buffer, BitDepthMode::Bpp16).unwrap(), reference);
    }

    #[test]
    fn percentage_stays_in_range_below_48bpp() {
        let mut rng = StdRng::seed_from_u64(3);
        for channels in 1..=4 {
            let buffer = random_buffer(&mut rng, 11, 7, channels);
            for mode in &BitDepthMode::ALL[..5] {
                let result = aggregate(&buffer, *mode).unwrap();
                assert!((0.0..=100.0).contains(&result.percentage), "{mode}: {result:?}");
            }
        }
    }

    #[test]
    fn parallel_scan_matches_serial_sum() {
        let mut rng = StdRng::seed_from_u64(5);
        let buffer = random_buffer(&mut rng, 512, 160, 3);
        assert!(buffer.pixel_count() >= PARALLEL_THRESHOLD);

        let expected: u64 = (0..buffer.height())
            .flat_map(|y| (0..buffer.width()).map(move |x| (x, y)))
            .map(|(x, y)| buffer.bgr(x, y).average() as u64)
            .sum();
        let result = aggregate(&buffer, BitDepthMode::Bpp24).unwrap();
        assert_eq!(result.total, expected as f64);
    }

    #[test]
    fn grayscale_uses_blue_for_every_channel() {
        let buffer = PixelBuffer::packed(2, 1, 1, vec![90, 30]).unwrap();
        let result = aggregate(&buffer, BitDepthMode::Bpp24).unwrap();
        assert_eq!(result.total, 120.0);
    }

    #[test]
    fn zero_area_is_rejected() {
        let buffer = PixelBuffer::packed(0, 3, 3, Vec::new()).unwrap();
        assert!(matches!(
            aggregate(&buffer, BitDepthMode::Bpp24),
            Err(BrightnessError::InvalidDimensions { width: 0, height: 3 })
        ));
    }

    #[test]
    fn unknown_label_is_rejected() {
        let buffer = PixelBuffer::from_rgb(1, 1, &[[1, 2, 3]]).unwrap();
        assert!(matches!(
            aggregate_label(&buffer, "10bpp"),
            Err(BrightnessError::UnsupportedMode(_))
        ));
        assert_eq!(aggregate_label(&buffer, "24bpp").unwrap().total, 2.0);
    }
}
