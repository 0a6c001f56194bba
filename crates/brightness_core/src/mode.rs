use std::fmt;
use std::str::FromStr;

use crate::BrightnessError;

/// Declared pixel depth used to pick the aggregation formula.
///
/// The mode does not describe how the buffer is stored; every buffer holds
/// 8-bit channels regardless of the selected interpretation.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum BitDepthMode {
    Bpp8,
    Bpp12,
    #[default]
    Bpp16,
    Bpp24,
    Bpp32,
    Bpp48,
}

impl BitDepthMode {
    pub const ALL: [BitDepthMode; 6] = [
        BitDepthMode::Bpp8,
        BitDepthMode::Bpp12,
        BitDepthMode::Bpp16,
        BitDepthMode::Bpp24,
        BitDepthMode::Bpp32,
        BitDepthMode::Bpp48,
    ];

    pub fn bits(self) -> u32 {
        match self {
            BitDepthMode::Bpp8 => 8,
            BitDepthMode::Bpp12 => 12,
            BitDepthMode::Bpp16 => 16,
            BitDepthMode::Bpp24 => 24,
            BitDepthMode::Bpp32 => 32,
            BitDepthMode::Bpp48 => 48,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            BitDepthMode::Bpp8 => "8bpp",
            BitDepthMode::Bpp12 => "12bpp",
            BitDepthMode::Bpp16 => "16bpp",
            BitDepthMode::Bpp24 => "24bpp",
            BitDepthMode::Bpp32 => "32bpp",
            BitDepthMode::Bpp48 => "48bpp",
        }
    }

    /// Scalar contributed by one pixel.
    ///
    /// 12 and 16bpp scale by `4095/4095` and `65535/65535`, which leaves the
    /// channel mean unchanged. 48bpp widens each channel by 256 without
    /// adjusting the 255 maximum used for the percentage, so it reports up
    /// to ~100x the other modes.
    pub(crate) fn pixel_value(self, red: u8, green: u8, blue: u8) -> u32 {
        let (r, g, b) = (u32::from(red), u32::from(green), u32::from(blue));
        match self {
            BitDepthMode::Bpp8 => b,
            BitDepthMode::Bpp12 => ((r + g + b) / 3) * 4095 / 4095,
            BitDepthMode::Bpp16 => ((r + g + b) / 3) * 65535 / 65535,
            BitDepthMode::Bpp24 | BitDepthMode::Bpp32 => (r + g + b) / 3,
            BitDepthMode::Bpp48 => (r * 256 + g * 256 + b * 256) / 3,
        }
    }
}

impl fmt::Display for BitDepthMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for BitDepthMode {
    type Err = BrightnessError;

    fn from_str(label: &str) -> Result<Self, Self::Err> {
        BitDepthMode::ALL
            .into_iter()
            .find(|mode| mode.label() == label)
            .ok_or_else(|| BrightnessError::UnsupportedMode(label.to_owned()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn labels_round_trip() {
        for mode in BitDepthMode::ALL {
            assert_eq!(mode.label().parse::<BitDepthMode>().unwrap(), mode);
            assert_eq!(mode.label(), format!("{}bpp", mode.bits()));
        }
    }

    #[test]
    fn unknown_labels_are_rejected() {
        for label in ["64bpp", "24", "", "24BPP", " 24bpp "] {
            let err = label.parse::<BitDepthMode>().unwrap_err();
            assert!(matches!(err, BrightnessError::UnsupportedMode(ref l) if l == label));
        }
    }

    #[test]
    fn default_is_16bpp() {
        assert_eq!(BitDepthMode::default(), BitDepthMode::Bpp16);
    }

    #[test]
    fn pixel_values_follow_the_formula_table() {
        let (r, g, b) = (200, 100, 50);
        assert_eq!(BitDepthMode::Bpp8.pixel_value(r, g, b), 50);
        assert_eq!(BitDepthMode::Bpp12.pixel_value(r, g, b), 116);
        assert_eq!(BitDepthMode::Bpp16.pixel_value(r, g, b), 116);
        assert_eq!(BitDepthMode::Bpp24.pixel_value(r, g, b), 116);
        assert_eq!(BitDepthMode::Bpp32.pixel_value(r, g, b), 116);
        assert_eq!(BitDepthMode::Bpp48.pixel_value(r, g, b), 29866);
        assert_eq!(BitDepthMode::Bpp48.pixel_value(255, 255, 255), 65280);
    }
}
