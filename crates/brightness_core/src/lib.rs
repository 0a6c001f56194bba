mod aggregate;
mod buffer;
mod config;
mod export;
mod loader;
mod mode;
mod reduce;
mod session;
mod workbook;

pub use aggregate::{aggregate, aggregate_label, BrightnessResult};
pub use buffer::{Bgr, PixelBuffer};
pub use config::{Settings, DEFAULT_CONFIG_FILE};
pub use export::{
    export, BrightnessTableRow, PixelTable, AFTER_HEADER, BEFORE_HEADER, EXPORT_ROW_LIMIT,
};
pub use loader::{is_supported_image, load_image, save_image, LoadedImage, SUPPORTED_EXTENSIONS};
pub use mode::BitDepthMode;
pub use reduce::{reduce, ReductionStep};
pub use session::Session;
pub use workbook::{write_workbook, DEFAULT_WORKBOOK_NAME, WORKSHEET_NAME};

/// Images with at least this many pixels are scanned with rayon.
const PARALLEL_THRESHOLD: usize = 1 << 16;

#[derive(Debug, thiserror::Error)]
pub enum BrightnessError {
    #[error("unsupported pixel format: {0}")]
    UnsupportedMode(String),
    #[error("image has no pixels ({width}x{height})")]
    InvalidDimensions { width: u32, height: u32 },
    #[error(
        "images have different dimensions ({before_width}x{before_height} vs \
         {after_width}x{after_height})"
    )]
    DimensionMismatch {
        before_width: u32,
        before_height: u32,
        after_width: u32,
        after_height: u32,
    },
    #[error(
        "data exceeds spreadsheet row limit: {rows} pixels, {limit} rows written; consider \
         reducing the image resolution"
    )]
    RowLimitExceeded { rows: usize, limit: usize },
    #[error("invalid brightness reduction percentage: {0}")]
    InvalidPercentage(i64),
    #[error("invalid pixel buffer layout: {0}")]
    InvalidLayout(String),
    #[error("please select an image first")]
    NoImage,
    #[error("failed to load image: {0}")]
    Image(#[from] image::ImageError),
    #[error("failed to write workbook: {0}")]
    Workbook(#[from] rust_xlsxwriter::XlsxError),
    #[error("failed to parse settings: {0}")]
    Config(#[from] toml::de::Error),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T, E = BrightnessError> = std::result::Result<T, E>;
