//! Consolidation constants and default preset factories.

use crate::spec::{
    EnumMissingGroupFieldRule, SpecAutofitCellsPolicy, SpecCellFormat, SpecConvertOptions,
    SpecDocumentFormats, SpecHeaderKeywords,
};

/// Excel worksheet maximum row count.
pub const N_NROWS_EXCEL_MAX: usize = 1_048_576;
/// Excel worksheet maximum column count.
pub const N_NCOLS_EXCEL_MAX: usize = 16_384;
/// Excel sheet name maximum length.
pub const N_LEN_EXCEL_SHEET_NAME_MAX: usize = 31;
/// Characters not allowed in sheet names.
pub const TUP_EXCEL_ILLEGAL: [&str; 7] = ["*", ":", "?", "/", "\\", "[", "]"];
/// Characters replaced in archive entry names.
pub const TUP_ENTRY_NAME_ILLEGAL: [&str; 9] = ["/", "\\", ":", "*", "?", "\"", "<", ">", "|"];

/// Column used to partition records.
pub const C_GROUP_FIELD_DEFAULT: &str = "REF. DOCTOR";
/// Substrings that mark a header row (compared against uppercased cell text).
pub const TUP_HEADER_KEYWORDS_DEFAULT: [&str; 2] = ["S.NO", "DATE"];
/// Suffix appended to the sheet name to form the document name.
pub const C_DOCUMENT_NAME_SUFFIX: &str = "_doctor";
/// Label prefix for header cells that are blank.
pub const C_UNNAMED_COLUMN_PREFIX: &str = "Unnamed: ";
/// Archive file extension.
pub const C_ARCHIVE_EXTENSION: &str = "zip";
/// Archive stem used when the upload name has none.
pub const C_ARCHIVE_STEM_FALLBACK: &str = "workbook";

/// Build default formats used by [`crate::writer::XlsxDocumentWriter`].
pub fn derive_default_document_formats() -> SpecDocumentFormats {
    let cfg_base_fmt_spec = SpecCellFormat {
        font_name: Some("Calibri".to_string()),
        font_size: Some(11),
        align: Some("left".to_string()),
        ..Default::default()
    };

    let cfg_datetime_fmt_patch = SpecCellFormat {
        num_format: Some("yyyy-mm-dd hh:mm:ss".to_string()),
        ..Default::default()
    };
    let fmt_emphasis = cfg_base_fmt_spec.with_(SpecCellFormat {
        bold: Some(true),
        ..Default::default()
    });

    SpecDocumentFormats {
        fmt_text: cfg_base_fmt_spec.clone(),
        fmt_datetime: cfg_base_fmt_spec.merge(&cfg_datetime_fmt_patch),
        fmt_emphasis_datetime: fmt_emphasis.merge(&cfg_datetime_fmt_patch),
        fmt_emphasis,
        policy_autofit: SpecAutofitCellsPolicy::default(),
    }
}

/// Build default header keywords.
pub fn derive_default_header_keywords() -> SpecHeaderKeywords {
    SpecHeaderKeywords::new(TUP_HEADER_KEYWORDS_DEFAULT)
}

/// Build default conversion options.
pub fn derive_default_convert_options() -> SpecConvertOptions {
    SpecConvertOptions {
        group_field: C_GROUP_FIELD_DEFAULT.to_string(),
        header_keywords: derive_default_header_keywords(),
        rule_missing_group_field: EnumMissingGroupFieldRule::Abort,
        formats: derive_default_document_formats(),
    }
}
