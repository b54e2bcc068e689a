//! Workbook reader built on `calamine`, plus the header re-parse step.

use std::io::Cursor;

use calamine::{Data, Range, Reader, open_workbook_auto_from_rs};

use crate::spec::{EnumCellValue, MedsheetError, Result, SpecParsedSheet, SpecRawSheet};
use crate::util::{derive_column_labels, parse_iso_datetime};

/// Read every worksheet of an in-memory workbook as headerless grids.
///
/// Any format `calamine` detects (xlsx, xlsm, xlsb, xls, ods) is accepted.
/// Sheets keep workbook order; grids are anchored at cell A1.
pub fn read_workbook_from_bytes(v_bytes: &[u8]) -> Result<Vec<SpecRawSheet>> {
    let mut workbook = open_workbook_auto_from_rs(Cursor::new(v_bytes.to_vec()))?;

    let l_sheet_names = workbook.sheet_names();
    let mut l_sheets = Vec::with_capacity(l_sheet_names.len());
    for sheet_name in l_sheet_names {
        let range = workbook.worksheet_range(&sheet_name).map_err(|err| {
            MedsheetError::Read(format!("sheet {sheet_name:?}: {err}"))
        })?;
        l_sheets.push(derive_raw_sheet(&sheet_name, &range));
    }
    Ok(l_sheets)
}

/// Convert one `calamine` range into a raw sheet.
///
/// `calamine` ranges begin at the first used cell; empty leading rows and
/// columns are restored so positions match the worksheet.
pub fn derive_raw_sheet(sheet_name: &str, range: &Range<Data>) -> SpecRawSheet {
    let (n_row_start, n_col_start) = range
        .start()
        .map(|(n_row, n_col)| (n_row as usize, n_col as usize))
        .unwrap_or_default();

    let mut rows: Vec<Vec<EnumCellValue>> = Vec::with_capacity(n_row_start + range.height());
    rows.resize(n_row_start, Vec::new());
    for row in range.rows() {
        let mut l_values = vec![EnumCellValue::None; n_col_start];
        l_values.extend(row.iter().map(convert_calamine_cell));
        rows.push(l_values);
    }
    SpecRawSheet::new(sheet_name, rows)
}

/// Normalize a `calamine` cell. Empty strings read as missing.
pub fn convert_calamine_cell(cell: &Data) -> EnumCellValue {
    match cell {
        Data::Empty => EnumCellValue::None,
        Data::String(s) if s.is_empty() => EnumCellValue::None,
        Data::String(s) => EnumCellValue::String(s.clone()),
        Data::Int(n) => EnumCellValue::Int(*n),
        Data::Float(n) => EnumCellValue::Float(*n),
        Data::Bool(val) => EnumCellValue::Bool(*val),
        Data::DateTime(dt) => match dt.as_datetime() {
            Some(val) => EnumCellValue::DateTime(val),
            None => EnumCellValue::Float(dt.as_f64()),
        },
        Data::DateTimeIso(s) => match parse_iso_datetime(s) {
            Some(val) => EnumCellValue::DateTime(val),
            None => EnumCellValue::String(s.clone()),
        },
        Data::DurationIso(s) => EnumCellValue::String(s.clone()),
        Data::Error(e) => EnumCellValue::Error(e.to_string()),
    }
}

/// Re-parse a raw sheet using row `row_header` as column labels.
///
/// Rows above the header are discarded, fully blank data rows are skipped,
/// and short rows are padded with missing values. An empty sheet yields
/// zero columns and zero records.
pub fn derive_parsed_sheet(sheet: &SpecRawSheet, row_header: usize) -> SpecParsedSheet {
    let Some(l_header_row) = sheet.rows.get(row_header) else {
        return SpecParsedSheet {
            sheet_name: sheet.sheet_name.clone(),
            ..Default::default()
        };
    };

    let l_rows_body = &sheet.rows[row_header + 1..];
    let n_width = l_rows_body
        .iter()
        .map(Vec::len)
        .fold(l_header_row.len(), usize::max);
    let columns = derive_column_labels(l_header_row, n_width);

    let records = l_rows_body
        .iter()
        .filter(|row| !row.iter().all(EnumCellValue::is_blank))
        .map(|row| {
            let mut record = row.clone();
            record.resize(n_width, EnumCellValue::None);
            record
        })
        .collect();

    SpecParsedSheet {
        sheet_name: sheet.sheet_name.clone(),
        columns,
        records,
    }
}
