//! Output document writers; the xlsx adapter is built on `rust_xlsxwriter`.

use rust_xlsxwriter::{Format, FormatAlign, Workbook, Worksheet};

use crate::conf::{N_NCOLS_EXCEL_MAX, N_NROWS_EXCEL_MAX};
use crate::spec::{
    EnumCellValue, MedsheetError, Result, SpecAutofitCellsPolicy, SpecCellFormat,
    SpecDocumentFormats, SpecOutputDocument,
};
use crate::util::{convert_datetime_to_excel_serial, derive_cell_text, sanitize_sheet_name};

/// Serializes an output document into one file format.
pub trait DocumentWriter {
    /// File extension without the dot, e.g. `xlsx`.
    fn extension(&self) -> &'static str;

    /// Render `document` into file bytes.
    fn write_document(&self, document: &SpecOutputDocument) -> Result<Vec<u8>>;
}

/// Writes each document as a single-worksheet xlsx workbook.
///
/// Section headers use the emphasis format. Date/time cells, headers
/// included, are written as serial numbers with a date/time number format.
/// Missing values leave the cell unwritten.
#[derive(Debug, Clone, Default)]
pub struct XlsxDocumentWriter {
    formats: SpecDocumentFormats,
}

impl XlsxDocumentWriter {
    /// Create writer bound to format presets.
    pub fn new(formats: SpecDocumentFormats) -> Self {
        Self { formats }
    }

    /// Borrow the format presets.
    pub fn formats(&self) -> &SpecDocumentFormats {
        &self.formats
    }

    fn write_worksheet(
        &self,
        worksheet: &mut Worksheet,
        document: &SpecOutputDocument,
    ) -> Result<()> {
        let fmt_text = derive_rust_xlsx_format(&self.formats.fmt_text);
        let fmt_emphasis = derive_rust_xlsx_format(&self.formats.fmt_emphasis);
        let fmt_datetime = derive_rust_xlsx_format(&self.formats.fmt_datetime);
        let fmt_emphasis_datetime = derive_rust_xlsx_format(&self.formats.fmt_emphasis_datetime);

        let policy_autofit = &self.formats.policy_autofit;
        let mut l_width_by_col: Vec<usize> = Vec::new();

        for (n_idx_row, row) in document.rows.iter().enumerate() {
            for (n_idx_col, cell) in row.iter().enumerate() {
                let format = match (&cell.value, cell.if_emphasis) {
                    (EnumCellValue::DateTime(_), true) => &fmt_emphasis_datetime,
                    (EnumCellValue::DateTime(_), false) => &fmt_datetime,
                    (_, true) => &fmt_emphasis,
                    _ => &fmt_text,
                };
                write_cell_with_format(worksheet, n_idx_row, n_idx_col, &cell.value, format)?;

                if policy_autofit.if_autofit && !cell.if_emphasis {
                    if l_width_by_col.len() <= n_idx_col {
                        l_width_by_col.resize(n_idx_col + 1, 0);
                    }
                    l_width_by_col[n_idx_col] =
                        usize::max(l_width_by_col[n_idx_col], estimate_width_len(&cell.value));
                }
            }
        }

        if policy_autofit.if_autofit {
            for (n_idx_col, n_width_recorded) in l_width_by_col.into_iter().enumerate() {
                worksheet
                    .set_column_width(
                        cast_col_num(n_idx_col)?,
                        derive_column_width(n_width_recorded, policy_autofit) as f64,
                    )?;
            }
        }

        Ok(())
    }
}

impl DocumentWriter for XlsxDocumentWriter {
    fn extension(&self) -> &'static str {
        "xlsx"
    }

    fn write_document(&self, document: &SpecOutputDocument) -> Result<Vec<u8>> {
        validate_document_size(document)?;

        let mut workbook = Workbook::new();
        let worksheet = workbook.add_worksheet();
        worksheet.set_name(sanitize_sheet_name(&document.sheet_title, "_"))?;
        self.write_worksheet(worksheet, document)?;

        Ok(workbook.save_to_buffer()?)
    }
}

fn validate_document_size(document: &SpecOutputDocument) -> Result<()> {
    if document.rows.len() > N_NROWS_EXCEL_MAX {
        return Err(MedsheetError::DocumentTooLarge {
            name: document.name.clone(),
            message: format!(
                "{} rows > {N_NROWS_EXCEL_MAX}",
                document.rows.len()
            ),
        });
    }
    let n_width = document.rows.iter().map(Vec::len).max().unwrap_or(0);
    if n_width > N_NCOLS_EXCEL_MAX {
        return Err(MedsheetError::DocumentTooLarge {
            name: document.name.clone(),
            message: format!("{n_width} columns > {N_NCOLS_EXCEL_MAX}"),
        });
    }
    Ok(())
}

/// Estimate displayed width units for one cell value.
pub fn estimate_width_len(value: &EnumCellValue) -> usize {
    match value {
        EnumCellValue::None => 0,
        EnumCellValue::DateTime(_) => 19,
        _ => estimate_unicode_string_width(&derive_cell_text(value)),
    }
}

fn estimate_unicode_string_width(s: &str) -> usize {
    let n_ascii = s.chars().filter(|chr| chr.is_ascii()).count();
    let n_non_ascii = s.chars().count().saturating_sub(n_ascii);
    n_ascii + (n_non_ascii as f64 * 1.6).round() as usize
}

fn derive_column_width(n_width_recorded: usize, policy_autofit: &SpecAutofitCellsPolicy) -> usize {
    let n_min = usize::max(1, policy_autofit.width_cell_min);
    let n_max = usize::min(255, usize::max(n_min, policy_autofit.width_cell_max));
    usize::min(
        n_max,
        usize::max(n_min, n_width_recorded + policy_autofit.width_cell_padding),
    )
}

fn write_cell_with_format(
    worksheet: &mut Worksheet,
    row_idx: usize,
    col_idx: usize,
    value: &EnumCellValue,
    format: &Format,
) -> Result<()> {
    let n_row = cast_row_num(row_idx)?;
    let n_col = cast_col_num(col_idx)?;
    match value {
        EnumCellValue::None => {}
        EnumCellValue::String(val) | EnumCellValue::Error(val) => {
            worksheet.write_string_with_format(n_row, n_col, val, format)?;
        }
        EnumCellValue::Int(val) => {
            worksheet.write_number_with_format(n_row, n_col, *val as f64, format)?;
        }
        EnumCellValue::Float(val) => {
            if val.is_finite() {
                worksheet.write_number_with_format(n_row, n_col, *val, format)?;
            } else {
                worksheet.write_string_with_format(n_row, n_col, val.to_string(), format)?;
            }
        }
        EnumCellValue::Bool(val) => {
            worksheet.write_boolean_with_format(n_row, n_col, *val, format)?;
        }
        EnumCellValue::DateTime(val) => {
            worksheet.write_number_with_format(
                n_row,
                n_col,
                convert_datetime_to_excel_serial(val),
                format,
            )?;
        }
    }
    Ok(())
}

fn derive_rust_xlsx_format(spec: &SpecCellFormat) -> Format {
    let mut format = Format::new();

    if let Some(val) = &spec.font_name {
        format = format.set_font_name(val.clone());
    }
    if let Some(val) = spec.font_size {
        format = format.set_font_size(val as f64);
    }
    if spec.bold.unwrap_or(false) {
        format = format.set_bold();
    }
    if spec.italic.unwrap_or(false) {
        format = format.set_italic();
    }
    if let Some(val) = &spec.align
        && let Some(align) = derive_format_align(val)
    {
        format = format.set_align(align);
    }
    if let Some(val) = &spec.num_format {
        format = format.set_num_format(val.clone());
    }
    if let Some(val) = &spec.font_color {
        format = format.set_font_color(val.as_str());
    }

    format
}

fn derive_format_align(align: &str) -> Option<FormatAlign> {
    let value = align.trim().to_ascii_lowercase();
    match value.as_str() {
        "general" => Some(FormatAlign::General),
        "left" => Some(FormatAlign::Left),
        "center" => Some(FormatAlign::Center),
        "right" => Some(FormatAlign::Right),
        "fill" => Some(FormatAlign::Fill),
        "justify" => Some(FormatAlign::Justify),
        _ => None,
    }
}

fn cast_row_num(value: usize) -> Result<u32> {
    u32::try_from(value).map_err(|_| MedsheetError::DocumentTooLarge {
        name: String::new(),
        message: format!("row index overflow: {value}"),
    })
}

fn cast_col_num(value: usize) -> Result<u16> {
    u16::try_from(value).map_err(|_| MedsheetError::DocumentTooLarge {
        name: String::new(),
        message: format!("column index overflow: {value}"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spec::SpecOutputCell;

    #[test]
    fn test_derive_column_width_clamps() {
        let policy = SpecAutofitCellsPolicy::default();
        assert_eq!(derive_column_width(0, &policy), 8);
        assert_eq!(derive_column_width(10, &policy), 12);
        assert_eq!(derive_column_width(500, &policy), 60);
    }

    #[test]
    fn test_estimate_width_len_counts_wide_chars() {
        assert_eq!(estimate_width_len(&EnumCellValue::text("abc")), 3);
        assert_eq!(estimate_width_len(&EnumCellValue::text("医生")), 3);
        assert_eq!(estimate_width_len(&EnumCellValue::None), 0);
    }

    #[test]
    fn test_write_document_produces_xlsx_bytes() {
        let document = SpecOutputDocument {
            name: "Jan_doctor".to_string(),
            sheet_title: "Jan".to_string(),
            rows: vec![
                vec![SpecOutputCell::emphasized(EnumCellValue::text("Dr. A"))],
                vec![
                    SpecOutputCell::plain(EnumCellValue::Int(1)),
                    SpecOutputCell::plain(EnumCellValue::None),
                    SpecOutputCell::plain(EnumCellValue::text("Alice")),
                ],
                vec![],
            ],
        };
        let writer = XlsxDocumentWriter::default();
        let v_bytes = writer.write_document(&document).expect("write");

        assert_eq!(writer.extension(), "xlsx");
        assert_eq!(&v_bytes[..2], b"PK");
    }

    #[test]
    fn test_write_document_keeps_datetime_group_key_as_date() {
        use std::io::Cursor;

        use calamine::{Data, Reader, Xlsx, open_workbook_from_rs};
        use chrono::NaiveDate;

        let dt_key = NaiveDate::from_ymd_opt(2024, 1, 1)
            .and_then(|date| date.and_hms_opt(0, 0, 0))
            .expect("date");
        let document = SpecOutputDocument {
            name: "Jan_doctor".to_string(),
            sheet_title: "Jan".to_string(),
            rows: vec![
                vec![SpecOutputCell::emphasized(EnumCellValue::DateTime(dt_key))],
                vec![
                    SpecOutputCell::plain(EnumCellValue::text("Alice")),
                    SpecOutputCell::plain(EnumCellValue::DateTime(dt_key)),
                ],
                vec![],
            ],
        };
        let v_bytes = XlsxDocumentWriter::default()
            .write_document(&document)
            .expect("write");

        let mut workbook: Xlsx<_> = open_workbook_from_rs(Cursor::new(v_bytes)).expect("xlsx");
        let range = workbook.worksheet_range("Jan").expect("range");
        for n_pos in [(0, 0), (1, 1)] {
            let Some(Data::DateTime(dt)) = range.get(n_pos) else {
                panic!("expected date/time at {n_pos:?}, got {:?}", range.get(n_pos));
            };
            assert_eq!(dt.as_datetime(), Some(dt_key));
        }
    }

    #[test]
    fn test_write_document_accepts_empty_document() {
        let document = SpecOutputDocument {
            name: "Empty_doctor".to_string(),
            sheet_title: "Empty".to_string(),
            rows: vec![],
        };
        let v_bytes = XlsxDocumentWriter::default()
            .write_document(&document)
            .expect("write");
        assert!(!v_bytes.is_empty());
    }
}
