//! Command-line surface: argument models and the offline `convert` command.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use medsheet_io_xlsx::conf::{C_GROUP_FIELD_DEFAULT, derive_default_document_formats};
use medsheet_io_xlsx::{
    EnumMissingGroupFieldRule, SpecConvertOptions, SpecHeaderKeywords, TUP_HEADER_KEYWORDS_DEFAULT,
    convert_workbook,
};
use tracing::{info, warn};

/// Consolidate patient workbooks by referring doctor.
#[derive(Debug, Parser)]
#[command(name = "medsheet", version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: EnumCommand,
}

#[derive(Debug, Subcommand)]
pub enum EnumCommand {
    /// Serve the upload page and conversion endpoint.
    Serve(ServeArgs),
    /// Convert one workbook file into a zip archive.
    Convert(ConvertArgs),
}

#[derive(Debug, Args)]
pub struct ServeArgs {
    /// Bind address.
    #[arg(long, env = "MEDSHEET_ADDR", default_value = "127.0.0.1:5000")]
    pub addr: String,

    /// Maximum upload size in MiB.
    #[arg(long, env = "MEDSHEET_MAX_UPLOAD_MB", default_value_t = 32)]
    pub max_upload_mb: usize,

    #[command(flatten)]
    pub convert: ConvertOptionArgs,
}

#[derive(Debug, Args)]
pub struct ConvertArgs {
    /// Input workbook (xlsx, xlsm, xlsb, xls or ods).
    pub input: PathBuf,

    /// Output zip path; defaults to `<stem>.zip` next to the input.
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    #[command(flatten)]
    pub convert: ConvertOptionArgs,
}

/// Options shared by `serve` and `convert`.
#[derive(Debug, Clone, Args)]
pub struct ConvertOptionArgs {
    /// Column used to group records.
    #[arg(long, env = "MEDSHEET_GROUP_FIELD", default_value = C_GROUP_FIELD_DEFAULT)]
    pub group_field: String,

    /// Header keyword (repeatable); replaces the default set.
    #[arg(long = "keyword", value_name = "KEYWORD")]
    pub keywords: Vec<String>,

    /// Skip sheets lacking the group field instead of failing.
    #[arg(long)]
    pub skip_missing_group_field: bool,
}

impl ConvertOptionArgs {
    /// Build library conversion options.
    pub fn to_convert_options(&self) -> SpecConvertOptions {
        let header_keywords = if self.keywords.is_empty() {
            SpecHeaderKeywords::new(TUP_HEADER_KEYWORDS_DEFAULT)
        } else {
            SpecHeaderKeywords::new(&self.keywords)
        };
        SpecConvertOptions {
            group_field: self.group_field.clone(),
            header_keywords,
            rule_missing_group_field: if self.skip_missing_group_field {
                EnumMissingGroupFieldRule::Skip
            } else {
                EnumMissingGroupFieldRule::Abort
            },
            formats: derive_default_document_formats(),
        }
    }
}

/// Run `convert`; returns the written archive path.
pub fn run_convert(args: &ConvertArgs) -> Result<PathBuf> {
    let v_bytes = fs::read(&args.input)
        .with_context(|| format!("Failed to read {}", args.input.display()))?;
    let c_upload_name = args
        .input
        .file_name()
        .map(|name| name.to_string_lossy().to_string())
        .unwrap_or_default();

    let report = convert_workbook(&v_bytes, &c_upload_name, &args.convert.to_convert_options())
        .with_context(|| format!("Failed to convert {}", args.input.display()))?;
    for c_warning in &report.warnings {
        warn!("{c_warning}");
    }

    let path_out = match &args.output {
        Some(path) => path.clone(),
        None => derive_default_output_path(&args.input, &report.archive_name),
    };
    fs::write(&path_out, &report.archive_bytes)
        .with_context(|| format!("Failed to write {}", path_out.display()))?;

    info!(
        output = %path_out.display(),
        sheets = report.sheets.len(),
        "archive written"
    );
    Ok(path_out)
}

fn derive_default_output_path(path_input: &Path, archive_name: &str) -> PathBuf {
    path_input
        .parent()
        .map(|dir| dir.join(archive_name))
        .unwrap_or_else(|| PathBuf::from(archive_name))
}
