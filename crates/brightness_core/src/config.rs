use std::fs;
use std::path::{Path, PathBuf};

use log::debug;
use serde::Deserialize;

use crate::mode::BitDepthMode;
use crate::reduce::ReductionStep;
use crate::workbook::DEFAULT_WORKBOOK_NAME;
use crate::Result;

/// Settings file looked up in the working directory when none is given.
pub const DEFAULT_CONFIG_FILE: &str = "brightness.toml";

/// User defaults for the pixel depth, reduction step and export file.
///
/// ```toml
/// mode = "24bpp"
/// reduction = 30
/// workbook = "exports/PixelData.xlsx"
/// ```
#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    pub mode: String,
    pub reduction: i64,
    pub workbook: PathBuf,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            mode: BitDepthMode::default().label().to_owned(),
            reduction: i64::from(ReductionStep::default().percent()),
            workbook: PathBuf::from(DEFAULT_WORKBOOK_NAME),
        }
    }
}

impl Settings {
    /// Load from `path`, or from [`DEFAULT_CONFIG_FILE`] if it exists, or fall back to defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::from_file(path),
            None => {
                let fallback = Path::new(DEFAULT_CONFIG_FILE);
                if fallback.is_file() {
                    Self::from_file(fallback)
                } else {
                    Ok(Self::default())
                }
            },
        }
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        let settings = Self::from_toml(&contents)?;
        debug!("loaded settings from {}: {settings:?}", path.display());
        Ok(settings)
    }

    pub fn from_toml(contents: &str) -> Result<Self> {
        Ok(toml::from_str(contents)?)
    }

    pub fn mode(&self) -> Result<BitDepthMode> {
        self.mode.parse()
    }

    pub fn reduction(&self) -> Result<ReductionStep> {
        ReductionStep::try_from(self.reduction)
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;
    use crate::BrightnessError;

    #[test]
    fn defaults_match_the_menu_defaults() {
        let settings = Settings::default();
        assert_eq!(settings.mode().unwrap(), BitDepthMode::Bpp16);
        assert_eq!(settings.reduction().unwrap().percent(), 50);
        assert_eq!(settings.workbook, PathBuf::from("PixelData.xlsx"));
    }

    #[test]
    fn partial_files_keep_defaults() {
        let settings = Settings::from_toml("mode = \"48bpp\"").unwrap();
        assert_eq!(settings.mode().unwrap(), BitDepthMode::Bpp48);
        assert_eq!(settings.reduction, 50);
    }

    #[test]
    fn invalid_values_surface_typed_errors() {
        let settings = Settings::from_toml("mode = \"7bpp\"\nreduction = 45").unwrap();
        assert!(matches!(settings.mode(), Err(BrightnessError::UnsupportedMode(_))));
        assert!(matches!(settings.reduction(), Err(BrightnessError::InvalidPercentage(45))));
    }

    #[test]
    fn unknown_keys_are_rejected() {
        assert!(matches!(Settings::from_toml("colour = 1"), Err(BrightnessError::Config(_))));
    }

    #[test]
    fn explicit_paths_are_read() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "reduction = 20\nworkbook = \"out.xlsx\"").unwrap();

        let settings = Settings::load(Some(file.path())).unwrap();
        assert_eq!(settings.reduction().unwrap().percent(), 20);
        assert_eq!(settings.workbook, PathBuf::from("out.xlsx"));
    }

    #[test]
    fn missing_explicit_path_is_an_error() {
        let result = Settings::load(Some(Path::new("/nonexistent/brightness.toml")));
        assert!(matches!(result, Err(BrightnessError::Io(_))));
    }
}
