use log::{debug, warn};

use crate::buffer::PixelBuffer;
use crate::{BrightnessError, Result};

pub const BEFORE_HEADER: &str = "Before Brightness Reduction";
pub const AFTER_HEADER: &str = "After Brightness Reduction";

/// Spreadsheet ceiling of 1,048,576 rows minus the header row.
pub const EXPORT_ROW_LIMIT: usize = 1_048_575;

/// Average brightness of one pixel position before and after reduction.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BrightnessTableRow {
    pub before: i32,
    pub after: i32,
}

/// Before/after brightness rows in row-major pixel order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PixelTable {
    pub rows: Vec<BrightnessTableRow>,
    /// Number of pixel positions in the source images.
    pub pixel_count: usize,
    /// Maximum number of data rows the table may hold.
    pub row_limit: usize,
    /// Set when `pixel_count` exceeded `row_limit` and rows were dropped.
    pub truncated: bool,
}

impl PixelTable {
    pub fn headers(&self) -> [&'static str; 2] {
        [BEFORE_HEADER, AFTER_HEADER]
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Turn the truncation signal into an error.
    pub fn ensure_complete(&self) -> Result<()> {
        if self.truncated {
            return Err(BrightnessError::RowLimitExceeded {
                rows: self.pixel_count,
                limit: self.row_limit,
            });
        }
        Ok(())
    }
}

pub fn export(before: &PixelBuffer, after: &PixelBuffer) -> Result<PixelTable> {
    export_with_limit(before, after, EXPORT_ROW_LIMIT)
}

fn export_with_limit(
    before: &PixelBuffer,
    after: &PixelBuffer,
    limit: usize,
) -> Result<PixelTable> {
    if before.dimensions() != after.dimensions() {
        let (before_width, before_height) = before.dimensions();
        let (after_width, after_height) = after.dimensions();
        return Err(BrightnessError::DimensionMismatch {
            before_width,
            before_height,
            after_width,
            after_height,
        });
    }

    let (width, height) = before.dimensions();
    let pixel_count = before.pixel_count();
    let rows: Vec<BrightnessTableRow> = (0..height)
        .flat_map(|y| (0..width).map(move |x| (x, y)))
        .take(limit)
        .map(|(x, y)| BrightnessTableRow {
            before: before.bgr(x, y).average(),
            after: after.bgr(x, y).average(),
        })
        .collect();

    let truncated = pixel_count > limit;
    if truncated {
        warn!("{pixel_count} pixels exceed the {limit} row limit, table truncated");
    } else {
        debug!("exported {} brightness rows for {width}x{height} image", rows.len());
    }

    Ok(PixelTable { rows, pixel_count, row_limit: limit, truncated })
}
