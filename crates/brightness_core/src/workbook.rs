use std::path::{Path, PathBuf};

use log::info;
use rust_xlsxwriter::{Format, Workbook};

use crate::export::PixelTable;
use crate::Result;

pub const DEFAULT_WORKBOOK_NAME: &str = "PixelData.xlsx";
pub const WORKSHEET_NAME: &str = "PixelData";

/// Write `table` as a single worksheet: headers in row 1, one pixel per row below.
///
/// An `.xlsx` extension is appended when `path` lacks one. Returns the path written.
pub fn write_workbook<P: AsRef<Path>>(table: &PixelTable, path: P) -> Result<PathBuf> {
    let path = with_xlsx_extension(path.as_ref());

    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();
    worksheet.set_name(WORKSHEET_NAME)?;

    let header = Format::new().set_bold();
    for (col, title) in (0u16..).zip(table.headers()) {
        worksheet.write_string_with_format(0, col, title, &header)?;
        worksheet.set_column_width(col, 28)?;
    }

    for (row, entry) in (1u32..).zip(&table.rows) {
        worksheet.write_number(row, 0, entry.before)?;
        worksheet.write_number(row, 1, entry.after)?;
    }

    workbook.save(&path)?;
    info!("wrote {} brightness rows to {}", table.len(), path.display());
    Ok(path)
}

fn with_xlsx_extension(path: &Path) -> PathBuf {
    let has_xlsx = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("xlsx"));
    if has_xlsx {
        path.to_path_buf()
    } else {
        let mut name = path.as_os_str().to_owned();
        name.push(".xlsx");
        PathBuf::from(name)
    }
}
