use std::path::Path;

use log::debug;

use crate::aggregate::{aggregate, BrightnessResult};
use crate::buffer::PixelBuffer;
use crate::export::{export, PixelTable};
use crate::loader::{load_image, LoadedImage};
use crate::mode::BitDepthMode;
use crate::reduce::{reduce, ReductionStep};
use crate::{BrightnessError, Result};

/// Caller-held state between operations.
///
/// Keeps the image as loaded next to the one currently shown. Reductions
/// always apply to the current image, so repeated reductions compound,
/// while exports compare against the untouched original.
#[derive(Clone, Debug, Default)]
pub struct Session {
    original: Option<LoadedImage>,
    current: Option<PixelBuffer>,
    pub mode: BitDepthMode,
    pub reduction: ReductionStep,
}

impl Session {
    pub fn new(mode: BitDepthMode, reduction: ReductionStep) -> Self {
        Self { mode, reduction, ..Self::default() }
    }

    pub fn open<P: AsRef<Path>>(&mut self, path: P) -> Result<()> {
        let loaded = load_image(path)?;
        self.load(loaded);
        Ok(())
    }

    /// Replace both the original and the current image.
    pub fn load(&mut self, image: LoadedImage) {
        self.current = Some(image.buffer.clone());
        self.original = Some(image);
    }

    pub fn original(&self) -> Option<&PixelBuffer> {
        self.original.as_ref().map(|image| &image.buffer)
    }

    pub fn current(&self) -> Option<&PixelBuffer> {
        self.current.as_ref()
    }

    pub fn original_format(&self) -> Option<String> {
        self.original.as_ref().map(LoadedImage::format_label)
    }

    /// Brightness of the image currently shown.
    pub fn calculate(&self) -> Result<BrightnessResult> {
        let current = self.current.as_ref().ok_or(BrightnessError::NoImage)?;
        aggregate(current, self.mode)
    }

    pub fn reduce(&mut self) -> Result<&PixelBuffer> {
        let current = self.current.as_ref().ok_or(BrightnessError::NoImage)?;
        let reduced = reduce(current, self.reduction.percent());
        debug!("current image reduced by {}%", self.reduction.percent());
        Ok(self.current.insert(reduced))
    }

    /// Before/after table of the original against the current image.
    pub fn export_table(&self) -> Result<PixelTable> {
        match (self.original(), self.current()) {
            (Some(original), Some(current)) => export(original, current),
            _ => Err(BrightnessError::NoImage),
        }
    }
}

#[cfg(test)]
mod tests {
    use image::ColorType;

    use super::*;

    fn session_with(pixels: &[[u8; 3]], width: u32, height: u32) -> Session {
        let mut session = Session::default();
        session.load(LoadedImage {
            buffer: PixelBuffer::from_rgb(width, height, pixels).unwrap(),
            source_format: ColorType::Rgb8,
        });
        session
    }

    #[test]
    fn operations_need_an_image() {
        let mut session = Session::default();
        assert!(matches!(session.calculate(), Err(BrightnessError::NoImage)));
        assert!(matches!(session.reduce(), Err(BrightnessError::NoImage)));
        assert!(matches!(session.export_table(), Err(BrightnessError::NoImage)));
        assert_eq!(session.original_format(), None);
    }

    #[test]
    fn reductions_compound_on_the_current_image() {
        let mut session = session_with(&[[200, 200, 200]], 1, 1);
        session.reduction = ReductionStep::try_from(50i64).unwrap();

        session.reduce().unwrap();
        session.reduce().unwrap();

        assert_eq!(session.current().unwrap().as_bytes(), &[50, 50, 50]);
        assert_eq!(session.original().unwrap().as_bytes(), &[200, 200, 200]);

        let table = session.export_table().unwrap();
        assert_eq!(table.rows[0].before, 200);
        assert_eq!(table.rows[0].after, 50);
    }

    #[test]
    fn calculate_reads_the_current_image() {
        let mut session = session_with(&[[255, 255, 255], [0, 0, 0]], 2, 1);
        session.mode = BitDepthMode::Bpp24;
        assert_eq!(session.calculate().unwrap().percentage, 50.0);

        session.reduce().unwrap();
        assert_eq!(session.calculate().unwrap().total, 127.0);
    }

    #[test]
    fn loading_resets_the_current_image() {
        let mut session = session_with(&[[90, 90, 90]], 1, 1);
        session.reduce().unwrap();
        session.load(LoadedImage {
            buffer: PixelBuffer::packed(1, 1, 1, vec![9]).unwrap(),
            source_format: ColorType::L8,
        });
        assert_eq!(session.current().unwrap().as_bytes(), &[9]);
        assert_eq!(session.original_format().as_deref(), Some("L8"));
    }
}
