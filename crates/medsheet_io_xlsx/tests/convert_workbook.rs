use std::io::{Cursor, Read};

use calamine::{Data, Reader, Xlsx, open_workbook_from_rs};
use medsheet_io_xlsx::{
    EnumCellValue, MedsheetError, SpecConvertOptions, SpecHeaderKeywords, consolidate,
    convert_workbook, derive_parsed_sheet, locate_header_row, read_workbook_from_bytes,
};
use rust_xlsxwriter::Workbook;
use zip::ZipArchive;

fn write_fixture_workbook() -> Vec<u8> {
    let mut workbook = Workbook::new();

    let worksheet = workbook.add_worksheet();
    worksheet.set_name("Jan").expect("name");
    worksheet.write_string(0, 0, "note").expect("write");
    for (n_col, c_label) in ["S.No", "Date", "REF. DOCTOR", "Patient"].iter().enumerate() {
        worksheet
            .write_string(1, n_col as u16, *c_label)
            .expect("write");
    }
    let l_rows = [
        (1.0, "2024-01-01", Some("Dr. A"), "Alice"),
        (2.0, "2024-01-02", None, "Bob"),
        (3.0, "2024-01-03", Some("Dr. A"), "Carol"),
        (4.0, "2024-01-04", Some("Dr. B"), "Dave"),
    ];
    for (n_idx, (n_serial, c_date, c_doctor, c_patient)) in l_rows.iter().enumerate() {
        let n_row = n_idx as u32 + 2;
        worksheet.write_number(n_row, 0, *n_serial).expect("write");
        worksheet.write_string(n_row, 1, *c_date).expect("write");
        if let Some(c_doctor) = c_doctor {
            worksheet.write_string(n_row, 2, *c_doctor).expect("write");
        }
        worksheet.write_string(n_row, 3, *c_patient).expect("write");
    }

    let worksheet = workbook.add_worksheet();
    worksheet.set_name("Feb").expect("name");
    for (n_col, c_label) in ["REF. DOCTOR", "Patient"].iter().enumerate() {
        worksheet
            .write_string(0, n_col as u16, *c_label)
            .expect("write");
    }
    worksheet.write_string(1, 0, "Dr. C").expect("write");
    worksheet.write_string(1, 1, "Frank").expect("write");

    workbook.save_to_buffer().expect("save")
}

fn read_entry(archive: &mut ZipArchive<Cursor<Vec<u8>>>, name: &str) -> Vec<u8> {
    let mut v_bytes = Vec::new();
    archive
        .by_name(name)
        .expect("entry")
        .read_to_end(&mut v_bytes)
        .expect("read entry");
    v_bytes
}

#[test]
fn header_is_located_and_null_doctor_rows_are_dropped() {
    let l_sheets = read_workbook_from_bytes(&write_fixture_workbook()).expect("read");
    assert_eq!(l_sheets.len(), 2);
    assert_eq!(l_sheets[0].sheet_name, "Jan");

    let row_header = locate_header_row(&l_sheets[0], &SpecHeaderKeywords::default());
    assert_eq!(row_header, 1);

    let parsed = derive_parsed_sheet(&l_sheets[0], row_header);
    assert_eq!(parsed.columns, vec!["S.No", "Date", "REF. DOCTOR", "Patient"]);
    assert_eq!(parsed.height(), 4);
    assert_eq!(parsed.get(1, "REF. DOCTOR"), Some(&EnumCellValue::None));

    let document = consolidate(&parsed, "REF. DOCTOR").expect("consolidate");
    assert_eq!(document.section_count(), 2);
    assert_eq!(document.rows[0][0].value, EnumCellValue::text("Dr. A"));
    assert_eq!(document.rows[1][2].value, EnumCellValue::text("Alice"));
    assert_eq!(document.rows[2][2].value, EnumCellValue::text("Carol"));
    assert_eq!(document.rows[4][0].value, EnumCellValue::text("Dr. B"));
    assert_eq!(document.rows[5][2].value, EnumCellValue::text("Dave"));
}

#[test]
fn convert_workbook_emits_one_document_per_sheet() {
    let report = convert_workbook(
        &write_fixture_workbook(),
        "records.xlsx",
        &SpecConvertOptions::default(),
    )
    .expect("convert");

    assert_eq!(report.archive_name, "records.zip");
    assert_eq!(report.sheets.len(), 2);
    assert_eq!(report.sheets[0].cnt_groups, 2);
    assert_eq!(report.sheets[0].cnt_records, 3);
    assert_eq!(report.sheets[0].cnt_dropped_null_key, 1);
    assert_eq!(report.sheets[1].row_header, 0);

    let mut archive = ZipArchive::new(Cursor::new(report.archive_bytes)).expect("open zip");
    let l_names: Vec<String> = archive.file_names().map(ToString::to_string).collect();
    assert_eq!(l_names.len(), 2);
    assert_eq!(archive.by_index(0).expect("entry").name(), "Jan_doctor.xlsx");
    assert_eq!(archive.by_index(1).expect("entry").name(), "Feb_doctor.xlsx");

    let v_jan = read_entry(&mut archive, "Jan_doctor.xlsx");
    let mut workbook: Xlsx<_> = open_workbook_from_rs(Cursor::new(v_jan.clone())).expect("xlsx");
    assert_eq!(workbook.sheet_names(), vec!["Jan".to_string()]);
    let range = workbook.worksheet_range("Jan").expect("range");

    assert_eq!(range.get((0, 0)), Some(&Data::String("Dr. A".to_string())));
    assert_eq!(range.get((1, 0)), Some(&Data::Float(1.0)));
    assert_eq!(range.get((1, 1)), Some(&Data::String("2024-01-01".to_string())));
    assert_eq!(range.get((1, 2)), Some(&Data::String("Alice".to_string())));
    assert_eq!(range.get((2, 2)), Some(&Data::String("Carol".to_string())));
    assert_eq!(range.get((3, 0)), Some(&Data::Empty));
    assert_eq!(range.get((4, 0)), Some(&Data::String("Dr. B".to_string())));
    assert_eq!(range.get((5, 2)), Some(&Data::String("Dave".to_string())));

    let l_cells: Vec<&Data> = range.used_cells().map(|(_, _, cell)| cell).collect();
    assert!(!l_cells.contains(&&Data::String("Bob".to_string())));
    assert!(!l_cells.contains(&&Data::String("REF. DOCTOR".to_string())));

    let mut document_zip = ZipArchive::new(Cursor::new(v_jan)).expect("xlsx zip");
    let mut c_styles = String::new();
    document_zip
        .by_name("xl/styles.xml")
        .expect("styles")
        .read_to_string(&mut c_styles)
        .expect("read styles");
    assert!(c_styles.contains("<b/>"));
}

#[test]
fn convert_workbook_fails_on_missing_group_field() {
    let options = SpecConvertOptions {
        group_field: "DOCTOR".to_string(),
        ..Default::default()
    };
    let err = convert_workbook(&write_fixture_workbook(), "records.xlsx", &options)
        .expect_err("missing field");
    assert!(matches!(err, MedsheetError::MissingGroupField { ref field, .. } if field == "DOCTOR"));
}

#[test]
fn convert_workbook_rejects_non_workbook_bytes() {
    let err = convert_workbook(b"not a workbook", "x.xlsx", &SpecConvertOptions::default())
        .expect_err("unreadable");
    assert!(matches!(err, MedsheetError::Read(_)));
}
