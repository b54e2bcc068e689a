use rust_xlsxwriter::Workbook;

/// One sheet with a note row above the header and one blank doctor.
pub fn write_fixture_workbook() -> Vec<u8> {
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
        (1.0, "Dr. A", "Alice"),
        (2.0, "", "Bob"),
        (3.0, "Dr. A", "Carol"),
        (4.0, "Dr. B", "Dave"),
    ];
    for (n_idx, (n_serial, c_doctor, c_patient)) in l_rows.iter().enumerate() {
        let n_row = n_idx as u32 + 2;
        worksheet.write_number(n_row, 0, *n_serial).expect("write");
        worksheet.write_string(n_row, 1, "2024-01-01").expect("write");
        if !c_doctor.is_empty() {
            worksheet.write_string(n_row, 2, *c_doctor).expect("write");
        }
        worksheet.write_string(n_row, 3, *c_patient).expect("write");
    }
    workbook.save_to_buffer().expect("save")
}
