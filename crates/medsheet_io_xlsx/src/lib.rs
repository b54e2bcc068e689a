//! `medsheet_io_xlsx` v1:
//! Referring-doctor consolidation kernel for multi-sheet patient workbooks.
//!
//! - `conf`        : constants and default presets
//! - `spec`        : models/options/errors
//! - `util`        : pure helper functions
//! - `locate`      : header row detection
//! - `consolidate` : doctor grouping and document rendering
//! - `reader`      : `calamine` workbook reader and header re-parse
//! - `writer`      : `rust_xlsxwriter` document writer
//! - `archive`     : zip bundling
//! - `pipeline`    : per-workbook orchestration
pub mod archive;
pub mod conf;
pub mod consolidate;
pub mod locate;
pub mod pipeline;
pub mod reader;
pub mod spec;
pub mod util;
pub mod writer;

pub use archive::build_archive;
pub use conf::{
    C_GROUP_FIELD_DEFAULT, TUP_HEADER_KEYWORDS_DEFAULT, derive_default_convert_options,
};
pub use consolidate::{consolidate, group_records, render_grouped_sheet};
pub use locate::locate_header_row;
pub use pipeline::{convert_sheets, convert_workbook};
pub use reader::{derive_parsed_sheet, read_workbook_from_bytes};
pub use spec::{
    EnumCellValue, EnumMissingGroupFieldRule, MedsheetError, SpecArchiveEntry, SpecCellFormat,
    SpecConversionReport, SpecConvertOptions, SpecDocumentFormats, SpecDoctorGroup,
    SpecGroupedSheet, SpecHeaderKeywords, SpecOutputCell, SpecOutputDocument, SpecParsedSheet,
    SpecRawSheet, SpecSheetReport,
};
pub use writer::{DocumentWriter, XlsxDocumentWriter};
