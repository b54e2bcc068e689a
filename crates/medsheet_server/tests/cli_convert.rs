mod common;

use std::fs;
use std::io::Cursor;

use clap::Parser;
use medsheet_server::cli::{Cli, EnumCommand, run_convert};
use zip::ZipArchive;

fn derive_convert_args(l_args: &[&str]) -> medsheet_server::cli::ConvertArgs {
    let cli = Cli::try_parse_from(l_args).expect("parse");
    match cli.command {
        EnumCommand::Convert(args) => args,
        EnumCommand::Serve(_) => panic!("expected convert"),
    }
}

#[test]
fn convert_writes_archive_next_to_input() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path_input = dir.path().join("records.2024.xlsx");
    fs::write(&path_input, common::write_fixture_workbook()).expect("write input");

    let c_input = path_input.to_string_lossy().to_string();
    let path_out = run_convert(&derive_convert_args(&["medsheet", "convert", &c_input]))
        .expect("convert");

    assert_eq!(path_out, dir.path().join("records.zip"));
    let archive = ZipArchive::new(Cursor::new(fs::read(&path_out).expect("read"))).expect("zip");
    let l_names: Vec<&str> = archive.file_names().collect();
    assert_eq!(l_names, vec!["Jan_doctor.xlsx"]);
}

#[test]
fn convert_honours_output_and_skip_rule() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path_input = dir.path().join("records.xlsx");
    let path_output = dir.path().join("out.zip");
    fs::write(&path_input, common::write_fixture_workbook()).expect("write input");

    let c_input = path_input.to_string_lossy().to_string();
    let c_output = path_output.to_string_lossy().to_string();
    let path_out = run_convert(&derive_convert_args(&[
        "medsheet",
        "convert",
        &c_input,
        "-o",
        &c_output,
        "--group-field",
        "CONSULTANT",
        "--skip-missing-group-field",
    ]))
    .expect("convert");

    assert_eq!(path_out, path_output);
    let archive = ZipArchive::new(Cursor::new(fs::read(&path_out).expect("read"))).expect("zip");
    assert_eq!(archive.len(), 0);
}

#[test]
fn convert_fails_on_missing_input() {
    let dir = tempfile::tempdir().expect("tempdir");
    let c_input = dir.path().join("absent.xlsx").to_string_lossy().to_string();
    let err = run_convert(&derive_convert_args(&["medsheet", "convert", &c_input]))
        .expect_err("missing input");
    assert!(err.to_string().starts_with("Failed to read"));
}
