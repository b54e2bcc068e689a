//! Per-workbook orchestration: read, locate, re-parse, consolidate, write, bundle.

use tracing::{debug, info, warn};

use crate::archive::build_archive;
use crate::consolidate::{group_records, render_grouped_sheet};
use crate::locate::locate_header_row;
use crate::reader::{derive_parsed_sheet, read_workbook_from_bytes};
use crate::spec::{
    EnumMissingGroupFieldRule, MedsheetError, Result, SpecArchiveEntry, SpecConversionReport,
    SpecConvertOptions, SpecRawSheet, SpecSheetReport,
};
use crate::util::{derive_archive_name, derive_duplicate_columns_text, derive_entry_file_name};
use crate::writer::{DocumentWriter, XlsxDocumentWriter};

/// Convert one uploaded workbook into a zip of per-sheet doctor documents.
///
/// `upload_name` only names the archive (`<stem>.zip`).
///
/// # Errors
///
/// - [`MedsheetError::Read`] if the bytes are not a readable workbook.
/// - [`MedsheetError::MissingGroupField`] if a sheet lacks the group field
///   and the rule is [`EnumMissingGroupFieldRule::Abort`].
/// - Write/archive errors from the output stage.
pub fn convert_workbook(
    v_bytes: &[u8],
    upload_name: &str,
    options: &SpecConvertOptions,
) -> Result<SpecConversionReport> {
    let l_sheets = read_workbook_from_bytes(v_bytes)?;
    info!(
        upload = upload_name,
        sheets = l_sheets.len(),
        "workbook loaded"
    );
    let writer = XlsxDocumentWriter::new(options.formats.clone());
    convert_sheets(&l_sheets, upload_name, options, &writer)
}

/// Convert already-read sheets with any document writer.
pub fn convert_sheets<W: DocumentWriter>(
    sheets: &[SpecRawSheet],
    upload_name: &str,
    options: &SpecConvertOptions,
    writer: &W,
) -> Result<SpecConversionReport> {
    let mut report = SpecConversionReport {
        archive_name: derive_archive_name(upload_name),
        ..Default::default()
    };
    let mut l_entries = Vec::with_capacity(sheets.len());

    for sheet in sheets {
        match convert_sheet(sheet, options, writer, &mut report) {
            Ok((sheet_report, entry)) => {
                report.sheets.push(sheet_report);
                l_entries.push(entry);
            }
            Err(MedsheetError::MissingGroupField { field, sheet: c_sheet })
                if options.rule_missing_group_field == EnumMissingGroupFieldRule::Skip =>
            {
                warn!(sheet = %c_sheet, field = %field, "group field missing; sheet skipped");
                report.warn(format!(
                    "Sheet {c_sheet:?} skipped: column {field:?} not found"
                ));
            }
            Err(err) => return Err(err),
        }
    }

    report.archive_bytes = build_archive(&l_entries)?;
    info!(
        archive = %report.archive_name,
        documents = l_entries.len(),
        bytes = report.archive_bytes.len(),
        "archive built"
    );
    Ok(report)
}

fn convert_sheet<W: DocumentWriter>(
    sheet: &SpecRawSheet,
    options: &SpecConvertOptions,
    writer: &W,
    report: &mut SpecConversionReport,
) -> Result<(SpecSheetReport, SpecArchiveEntry)> {
    let row_header = locate_header_row(sheet, &options.header_keywords);
    let parsed = derive_parsed_sheet(sheet, row_header);
    if let Some(c_msg) = derive_duplicate_columns_text(&parsed.columns) {
        warn!(sheet = %sheet.sheet_name, "{c_msg}");
        report.warn(format!("Sheet {:?}: {c_msg}", sheet.sheet_name));
    }

    let grouped = group_records(&parsed, &options.group_field)?;
    let document = render_grouped_sheet(&grouped);
    let v_bytes = writer.write_document(&document)?;
    let file_name = derive_entry_file_name(&document.name, writer.extension());

    debug!(
        sheet = %sheet.sheet_name,
        row_header,
        groups = grouped.groups.len(),
        records = grouped.record_count(),
        dropped = grouped.cnt_dropped_null_key,
        "sheet consolidated"
    );

    Ok((
        SpecSheetReport {
            sheet_name: sheet.sheet_name.clone(),
            row_header,
            file_name: file_name.clone(),
            cnt_groups: grouped.groups.len(),
            cnt_records: grouped.record_count(),
            cnt_dropped_null_key: grouped.cnt_dropped_null_key,
        },
        SpecArchiveEntry {
            file_name,
            bytes: v_bytes,
        },
    ))
}
