//! Stateless helper utilities shared by the consolidation kernel.

use std::collections::{BTreeMap, BTreeSet};

use chrono::{NaiveDate, NaiveDateTime};

use crate::conf::{
    C_ARCHIVE_EXTENSION, C_ARCHIVE_STEM_FALLBACK, C_DOCUMENT_NAME_SUFFIX,
    C_UNNAMED_COLUMN_PREFIX, N_LEN_EXCEL_SHEET_NAME_MAX, TUP_ENTRY_NAME_ILLEGAL,
    TUP_EXCEL_ILLEGAL,
};
use crate::spec::EnumCellValue;

////////////////////////////////////////////////////////////////////////////////
// #region CellValueConversion

/// Canonical text of a cell, used for keyword matching and group identity.
///
/// - `None` -> `""`
/// - integers -> decimal digits
/// - floats -> shortest round-trip form (`1.0` -> `"1"`)
/// - booleans -> `"True"` / `"False"`
/// - date/time -> `YYYY-MM-DD HH:MM:SS`
/// - errors -> the error literal
pub fn derive_cell_text(value: &EnumCellValue) -> String {
    match value {
        EnumCellValue::None => String::new(),
        EnumCellValue::String(s) => s.clone(),
        EnumCellValue::Int(n) => n.to_string(),
        EnumCellValue::Float(n) => n.to_string(),
        EnumCellValue::Bool(val) => (if *val { "True" } else { "False" }).to_string(),
        EnumCellValue::DateTime(dt) => dt.format("%Y-%m-%d %H:%M:%S").to_string(),
        EnumCellValue::Error(e) => e.clone(),
    }
}

/// Kind component of a group identity; integers and floats share `Number`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum EnumGroupKeyKind {
    /// Text cell.
    Text,
    /// Integer or float cell.
    Number,
    /// Boolean cell.
    Bool,
    /// Date/time cell.
    DateTime,
    /// Error cell.
    Error,
}

/// Identity used to bucket records; `None` for blank keys.
pub fn derive_group_identity(value: &EnumCellValue) -> Option<(EnumGroupKeyKind, String)> {
    if value.is_blank() {
        return None;
    }
    let kind = match value {
        EnumCellValue::None => return None,
        EnumCellValue::String(_) => EnumGroupKeyKind::Text,
        EnumCellValue::Int(_) => EnumGroupKeyKind::Number,
        EnumCellValue::Float(n) => {
            if n.is_nan() {
                return None;
            }
            EnumGroupKeyKind::Number
        }
        EnumCellValue::Bool(_) => EnumGroupKeyKind::Bool,
        EnumCellValue::DateTime(_) => EnumGroupKeyKind::DateTime,
        EnumCellValue::Error(_) => EnumGroupKeyKind::Error,
    };
    Some((kind, derive_cell_text(value)))
}

/// Convert date/time to an Excel serial number (1900 date system).
pub fn convert_datetime_to_excel_serial(dt: &NaiveDateTime) -> f64 {
    let dt_epoch = NaiveDate::from_ymd_opt(1899, 12, 30)
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .unwrap_or_default();
    let n_millis = dt.signed_duration_since(dt_epoch).num_milliseconds();
    n_millis as f64 / 86_400_000.0
}

/// Parse ISO-8601 date or date/time text.
pub fn parse_iso_datetime(text: &str) -> Option<NaiveDateTime> {
    let text = text.trim();
    for c_fmt in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(text, c_fmt) {
            return Some(dt);
        }
    }
    NaiveDate::parse_from_str(text, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region ColumnLabels

/// Derive column labels from a header row padded to `width`.
///
/// Blank header cells become `Unnamed: <col>`.
pub fn derive_column_labels(header_row: &[EnumCellValue], width: usize) -> Vec<String> {
    (0..usize::max(width, header_row.len()))
        .map(|n_idx_col| {
            let c_label = header_row
                .get(n_idx_col)
                .map(derive_cell_text)
                .unwrap_or_default();
            if c_label.is_empty() {
                format!("{C_UNNAMED_COLUMN_PREFIX}{n_idx_col}")
            } else {
                c_label
            }
        })
        .collect()
}

/// Describe duplicated column labels; `None` when all labels are unique.
pub fn derive_duplicate_columns_text(columns: &[String]) -> Option<String> {
    if columns.len() == columns.iter().collect::<BTreeSet<_>>().len() {
        return None;
    }

    let mut dict_pos: BTreeMap<&str, Vec<usize>> = BTreeMap::new();
    for (n_idx, c_name) in columns.iter().enumerate() {
        dict_pos.entry(c_name).or_default().push(n_idx);
    }

    let c_msg = dict_pos
        .iter()
        .filter_map(|(c_name, l_pos)| {
            if l_pos.len() > 1 {
                Some(format!(
                    "{c_name:?} x{} at indices {:?}",
                    l_pos.len(),
                    l_pos
                ))
            } else {
                None
            }
        })
        .collect::<Vec<_>>()
        .join("; ");

    Some(format!("Duplicate column names detected: {c_msg}"))
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region NameNormalization

/// Replace characters Excel rejects in sheet names and clamp the length.
pub fn sanitize_sheet_name(name: &str, replace_to: &str) -> String {
    let mut c_name = name.to_string();
    for c_illegal in TUP_EXCEL_ILLEGAL {
        c_name = c_name.replace(c_illegal, replace_to);
    }
    c_name = c_name.trim().trim_matches('\'').trim().to_string();
    if c_name.is_empty() {
        c_name = "Sheet".to_string();
    }

    c_name.chars().take(N_LEN_EXCEL_SHEET_NAME_MAX).collect()
}

/// Document name for a sheet, e.g. `Sheet1_doctor`.
pub fn derive_document_name(sheet_name: &str) -> String {
    format!("{sheet_name}{C_DOCUMENT_NAME_SUFFIX}")
}

/// Archive entry file name for a document, path separators replaced.
pub fn derive_entry_file_name(document_name: &str, extension: &str) -> String {
    let mut c_name = document_name.to_string();
    for c_illegal in TUP_ENTRY_NAME_ILLEGAL {
        c_name = c_name.replace(c_illegal, "_");
    }
    format!("{c_name}.{extension}")
}

/// Archive name from the uploaded file name: stem up to the first `.`.
pub fn derive_archive_name(upload_name: &str) -> String {
    let c_base = upload_name
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or(upload_name);
    let c_stem = c_base.split('.').next().unwrap_or_default().trim();
    let c_stem = if c_stem.is_empty() {
        C_ARCHIVE_STEM_FALLBACK
    } else {
        c_stem
    };
    format!("{c_stem}.{C_ARCHIVE_EXTENSION}")
}

/// Return `name` if unused, else `stem__<n>.ext` with the first free `n >= 2`.
pub fn derive_unique_entry_name(name: &str, set_names_existing: &mut BTreeSet<String>) -> String {
    if !set_names_existing.contains(name) {
        set_names_existing.insert(name.to_string());
        return name.to_string();
    }

    let (c_stem, c_ext) = match name.rsplit_once('.') {
        Some((stem, ext)) => (stem, format!(".{ext}")),
        None => (name, String::new()),
    };

    let mut n_idx = 2usize;
    loop {
        let candidate = format!("{c_stem}__{n_idx}{c_ext}");
        if !set_names_existing.contains(&candidate) {
            set_names_existing.insert(candidate.clone());
            return candidate;
        }
        n_idx += 1;
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
