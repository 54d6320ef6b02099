use std::io::Cursor;

use calamine::{open_workbook_from_rs, Data, Reader, Xlsx};
use rust_xlsxwriter::{Workbook, XlsxError};

use crate::error::{AppError, Result};

pub const XLSX_CONTENT_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

const TEMPLATE_SHEET_NAME: &str = "usuarios";

/// First worksheet of an upload, as trimmed text cells.
///
/// Rows and columns are absolute: row 0 is the spreadsheet's first row even
/// when it is blank.
#[derive(Debug, Clone, Default)]
pub struct Sheet {
    rows: Vec<Vec<String>>,
}

impl Sheet {
    pub fn from_rows(rows: Vec<Vec<String>>) -> Self {
        Self { rows }
    }

    pub fn from_xlsx(bytes: &[u8]) -> Result<Self> {
        let mut workbook: Xlsx<_> = open_workbook_from_rs(Cursor::new(bytes))
            .map_err(|e| AppError::InvalidFile(format!("could not read spreadsheet: {}", e)))?;

        let range = match workbook.worksheet_range_at(0) {
            Some(Ok(range)) => range,
            Some(Err(e)) => {
                return Err(AppError::InvalidFile(format!("could not read worksheet: {}", e)))
            }
            None => return Err(AppError::InvalidFile("spreadsheet has no worksheets".to_string())),
        };

        // calamine trims leading empty rows/columns off the range.
        let (row_offset, col_offset) = range
            .start()
            .map(|(row, col)| (row as usize, col as usize))
            .unwrap_or((0, 0));

        let mut rows = vec![Vec::new(); row_offset];
        for row in range.rows() {
            let mut cells = vec![String::new(); col_offset];
            cells.extend(row.iter().map(cell_text));
            rows.push(cells);
        }

        Ok(Self { rows })
    }

    pub fn header(&self) -> Option<&[String]> {
        self.rows.first().map(Vec::as_slice)
    }

    /// Rows after the header with their 1-based spreadsheet row numbers.
    pub fn data_rows(&self) -> impl Iterator<Item = (usize, &[String])> {
        self.rows
            .iter()
            .enumerate()
            .skip(1)
            .map(|(index, row)| (index + 1, row.as_slice()))
    }
}

fn cell_text(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(s) => s.trim().to_string(),
        // Whole numbers typed into a cell (phone-like passwords) come back as floats.
        Data::Float(f) if f.fract() == 0.0 && f.abs() < 1e15 => format!("{}", *f as i64),
        other => other.to_string().trim().to_string(),
    }
}

/// Uploads are identified by extension before any decoding is attempted.
pub fn ensure_xlsx_filename(filename: &str) -> Result<()> {
    if filename.to_lowercase().ends_with(".xlsx") {
        Ok(())
    } else {
        Err(AppError::InvalidFile("upload an .xlsx file".to_string()))
    }
}

/// Empty workbook holding only the given header row.
pub fn template_xlsx(headers: &[&str]) -> Result<Vec<u8>> {
    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();
    worksheet.set_name(TEMPLATE_SHEET_NAME).map_err(xlsx_error)?;

    for (col, header) in headers.iter().enumerate() {
        worksheet
            .write_string(0, col as u16, *header)
            .map_err(xlsx_error)?;
    }

    workbook.save_to_buffer().map_err(xlsx_error)
}

fn xlsx_error(err: XlsxError) -> AppError {
    AppError::Internal(format!("Spreadsheet generation failed: {}", err))
}
