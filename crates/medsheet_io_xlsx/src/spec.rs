//! Shared consolidation models, options and errors.

use chrono::NaiveDateTime;
use thiserror::Error;

use crate::conf::{
    derive_default_convert_options, derive_default_document_formats,
    derive_default_header_keywords,
};

////////////////////////////////////////////////////////////////////////////////
// #region CellValueSpecification

/// Normalized cell value shared by reader, grouper and writer.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum EnumCellValue {
    /// Missing/blank value.
    #[default]
    None,
    /// Text value.
    String(String),
    /// Integer value.
    Int(i64),
    /// Floating-point value.
    Float(f64),
    /// Boolean value.
    Bool(bool),
    /// Date/time value.
    DateTime(NaiveDateTime),
    /// Spreadsheet error literal, e.g. `#DIV/0!`.
    Error(String),
}

impl EnumCellValue {
    /// Build a text cell.
    pub fn text(value: impl Into<String>) -> Self {
        Self::String(value.into())
    }

    /// `true` for missing values and empty strings.
    pub fn is_blank(&self) -> bool {
        match self {
            Self::None => true,
            Self::String(s) => s.is_empty(),
            _ => false,
        }
    }
}

impl From<&str> for EnumCellValue {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}

impl From<i64> for EnumCellValue {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<f64> for EnumCellValue {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region SheetSpecification

/// Headerless grid of one input sheet.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SpecRawSheet {
    /// Source sheet name.
    pub sheet_name: String,
    /// Rows x columns, no labels assumed. Rows may be ragged.
    pub rows: Vec<Vec<EnumCellValue>>,
}

impl SpecRawSheet {
    /// Create raw sheet from name and rows.
    pub fn new(sheet_name: impl Into<String>, rows: Vec<Vec<EnumCellValue>>) -> Self {
        Self {
            sheet_name: sheet_name.into(),
            rows,
        }
    }

    /// Number of rows.
    pub fn height(&self) -> usize {
        self.rows.len()
    }
}

/// Sheet re-parsed with a detected header row as column labels.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SpecParsedSheet {
    /// Source sheet name.
    pub sheet_name: String,
    /// Column labels taken from the header row.
    pub columns: Vec<String>,
    /// Records aligned with `columns`.
    pub records: Vec<Vec<EnumCellValue>>,
}

impl SpecParsedSheet {
    /// Number of records.
    pub fn height(&self) -> usize {
        self.records.len()
    }

    /// Number of columns.
    pub fn width(&self) -> usize {
        self.columns.len()
    }

    /// Position of the first column labeled `name`.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c_col| c_col == name)
    }

    /// Value of `name` in record `idx_record`; `None` if either is absent.
    pub fn get(&self, idx_record: usize, name: &str) -> Option<&EnumCellValue> {
        let n_idx_col = self.column_index(name)?;
        self.records.get(idx_record)?.get(n_idx_col)
    }
}

/// Keyword set used to sniff the header row.
///
/// Keywords are stored uppercased so comparison is case-insensitive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecHeaderKeywords {
    keywords: Vec<String>,
}

impl SpecHeaderKeywords {
    /// Build keyword set; blank keywords are ignored.
    pub fn new<I, S>(keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            keywords: keywords
                .into_iter()
                .map(|kw| kw.as_ref().trim().to_uppercase())
                .filter(|kw| !kw.is_empty())
                .collect(),
        }
    }

    /// Uppercased keywords.
    pub fn keywords(&self) -> &[String] {
        &self.keywords
    }

    /// `true` if uppercased `text` contains any keyword.
    pub fn is_matching(&self, text_upper: &str) -> bool {
        self.keywords.iter().any(|kw| text_upper.contains(kw.as_str()))
    }
}

impl Default for SpecHeaderKeywords {
    fn default() -> Self {
        derive_default_header_keywords()
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region GroupSpecification

/// One group of records sharing a group key.
#[derive(Debug, Clone, PartialEq)]
pub struct SpecDoctorGroup {
    /// Raw group key as first seen.
    pub key: EnumCellValue,
    /// Records with the group field removed, input order.
    pub records: Vec<Vec<EnumCellValue>>,
}

/// Stable group-by result for one sheet.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SpecGroupedSheet {
    /// Source sheet name.
    pub sheet_name: String,
    /// Columns with the group field removed.
    pub columns: Vec<String>,
    /// Groups in first-occurrence order.
    pub groups: Vec<SpecDoctorGroup>,
    /// Records dropped because their group key was blank.
    pub cnt_dropped_null_key: usize,
}

impl SpecGroupedSheet {
    /// Total records across groups.
    pub fn record_count(&self) -> usize {
        self.groups.iter().map(|group| group.records.len()).sum()
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region DocumentSpecification

/// One output cell with an emphasis flag.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SpecOutputCell {
    /// Cell value.
    pub value: EnumCellValue,
    /// Render with emphasis (bold).
    pub if_emphasis: bool,
}

impl SpecOutputCell {
    /// Plain cell.
    pub fn plain(value: EnumCellValue) -> Self {
        Self {
            value,
            if_emphasis: false,
        }
    }

    /// Emphasized cell.
    pub fn emphasized(value: EnumCellValue) -> Self {
        Self {
            value,
            if_emphasis: true,
        }
    }
}

/// Format-independent output document; an empty row is a separator.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SpecOutputDocument {
    /// Document name without extension, e.g. `Sheet1_doctor`.
    pub name: String,
    /// Title used for the single worksheet.
    pub sheet_title: String,
    /// Ordered rows.
    pub rows: Vec<Vec<SpecOutputCell>>,
}

impl SpecOutputDocument {
    /// Number of emphasized section-header rows.
    pub fn section_count(&self) -> usize {
        self.rows
            .iter()
            .filter(|row| row.first().is_some_and(|cell| cell.if_emphasis))
            .count()
    }

    /// `true` if the document holds no rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Cell format specification, right-side overlay via [`Self::merge`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct SpecCellFormat {
    /// Font family name.
    pub font_name: Option<String>,
    /// Font size in points.
    pub font_size: Option<i64>,
    /// Bold style.
    pub bold: Option<bool>,
    /// Italic style.
    pub italic: Option<bool>,
    /// Horizontal alignment.
    pub align: Option<String>,
    /// Number format code.
    pub num_format: Option<String>,
    /// Font color.
    pub font_color: Option<String>,
}

impl SpecCellFormat {
    /// Return a new format by overlaying `patch` onto `self`.
    pub fn with_(&self, patch: SpecCellFormat) -> SpecCellFormat {
        self.merge(&patch)
    }

    /// Merge two formats with right-side non-`None` overwrite semantics.
    pub fn merge(&self, other: &SpecCellFormat) -> SpecCellFormat {
        SpecCellFormat {
            font_name: other.font_name.clone().or_else(|| self.font_name.clone()),
            font_size: other.font_size.or(self.font_size),
            bold: other.bold.or(self.bold),
            italic: other.italic.or(self.italic),
            align: other.align.clone().or_else(|| self.align.clone()),
            num_format: other.num_format.clone().or_else(|| self.num_format.clone()),
            font_color: other.font_color.clone().or_else(|| self.font_color.clone()),
        }
    }
}

/// Column width inference for written documents.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecAutofitCellsPolicy {
    /// Enable width inference from record cells.
    pub if_autofit: bool,
    /// Minimum final width.
    pub width_cell_min: usize,
    /// Maximum final width.
    pub width_cell_max: usize,
    /// Width padding added after inference.
    pub width_cell_padding: usize,
}

impl Default for SpecAutofitCellsPolicy {
    fn default() -> Self {
        Self {
            if_autofit: true,
            width_cell_min: 8,
            width_cell_max: 60,
            width_cell_padding: 2,
        }
    }
}

/// Format presets for the xlsx writer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecDocumentFormats {
    /// Record cells.
    pub fmt_text: SpecCellFormat,
    /// Section-header cells.
    pub fmt_emphasis: SpecCellFormat,
    /// Date/time record cells.
    pub fmt_datetime: SpecCellFormat,
    /// Date/time section-header cells.
    pub fmt_emphasis_datetime: SpecCellFormat,
    /// Column width inference.
    pub policy_autofit: SpecAutofitCellsPolicy,
}

impl Default for SpecDocumentFormats {
    fn default() -> Self {
        derive_default_document_formats()
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region ConvertOptions

/// What to do with a sheet that lacks the group field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EnumMissingGroupFieldRule {
    /// Fail the whole conversion (default).
    #[default]
    Abort,
    /// Omit the sheet and record a warning.
    Skip,
}

/// Options for one workbook conversion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecConvertOptions {
    /// Column used to partition records.
    pub group_field: String,
    /// Header sniffing keywords.
    pub header_keywords: SpecHeaderKeywords,
    /// Missing group field policy.
    pub rule_missing_group_field: EnumMissingGroupFieldRule,
    /// Writer formats.
    pub formats: SpecDocumentFormats,
}

impl Default for SpecConvertOptions {
    fn default() -> Self {
        derive_default_convert_options()
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region ReportSpecification

/// One file inside the output archive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecArchiveEntry {
    /// File name inside the archive.
    pub file_name: String,
    /// File content.
    pub bytes: Vec<u8>,
}

/// Per-sheet conversion summary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecSheetReport {
    /// Source sheet name.
    pub sheet_name: String,
    /// Detected header row (zero-based worksheet row).
    pub row_header: usize,
    /// Archive entry written for this sheet.
    pub file_name: String,
    /// Number of groups written.
    pub cnt_groups: usize,
    /// Number of records written.
    pub cnt_records: usize,
    /// Records dropped because their group key was blank.
    pub cnt_dropped_null_key: usize,
}

/// Result of one workbook conversion.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SpecConversionReport {
    /// Archive file name, e.g. `report.zip`.
    pub archive_name: String,
    /// Archive content.
    pub archive_bytes: Vec<u8>,
    /// Converted sheets in workbook order.
    pub sheets: Vec<SpecSheetReport>,
    /// Non-fatal warnings.
    pub warnings: Vec<String>,
}

impl SpecConversionReport {
    /// Add a warning message.
    pub fn warn(&mut self, msg: impl AsRef<str>) {
        self.warnings.push(msg.as_ref().to_string());
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region Errors

/// Errors raised by the consolidation kernel.
#[derive(Debug, Error)]
pub enum MedsheetError {
    /// Group field is not among the parsed sheet's columns.
    #[error("Column {field:?} not found in sheet {sheet:?}")]
    MissingGroupField {
        /// Requested group field.
        field: String,
        /// Sheet being consolidated.
        sheet: String,
    },

    /// Input workbook could not be read.
    #[error("Failed to read workbook: {0}")]
    Read(String),

    /// Output document could not be written.
    #[error("xlsx write error: {0}")]
    Write(#[from] rust_xlsxwriter::XlsxError),

    /// Output document exceeds worksheet limits.
    #[error("Document {name:?} exceeds worksheet limits: {message}")]
    DocumentTooLarge {
        /// Document name.
        name: String,
        /// Limit description.
        message: String,
    },

    /// Archive assembly failed.
    #[error("zip archive error: {0}")]
    Archive(#[from] zip::result::ZipError),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<calamine::Error> for MedsheetError {
    fn from(err: calamine::Error) -> Self {
        Self::Read(err.to_string())
    }
}

/// Result type for consolidation operations.
pub type Result<T> = std::result::Result<T, MedsheetError>;

// #endregion
////////////////////////////////////////////////////////////////////////////////
