//! HTTP request handlers.

use axum::{
    Json,
    extract::{Multipart, State},
    http::{StatusCode, header},
    response::{Html, IntoResponse},
};
use medsheet_io_xlsx::{MedsheetError, convert_workbook};
use percent_encoding::{NON_ALPHANUMERIC, utf8_percent_encode};
use serde::Serialize;
use tracing::{error, info, warn};

use crate::ServerState;

/// Multipart field carrying the workbook.
pub const C_UPLOAD_FIELD: &str = "file";

const C_INDEX_HTML: &str = include_str!("../templates/index.html");

/// Health check response body.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

/// Upload page.
pub async fn home() -> Html<&'static str> {
    Html(C_INDEX_HTML)
}

/// Health check endpoint.
pub async fn health_check() -> impl IntoResponse {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// Convert an uploaded workbook and answer with the zip archive.
pub async fn upload(
    State(state): State<ServerState>,
    mut multipart: Multipart,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let (c_file_name, v_bytes) = loop {
        let field = multipart
            .next_field()
            .await
            .map_err(|e| (e.status(), e.body_text()))?;
        let Some(field) = field else {
            return Err((StatusCode::BAD_REQUEST, "No file part".to_string()));
        };
        if field.name() != Some(C_UPLOAD_FIELD) {
            continue;
        }
        let c_file_name = field.file_name().unwrap_or_default().to_string();
        if c_file_name.is_empty() {
            return Err((StatusCode::BAD_REQUEST, "No selected file".to_string()));
        }
        let v_bytes = field
            .bytes()
            .await
            .map_err(|e| (e.status(), e.body_text()))?;
        break (c_file_name, v_bytes);
    };

    info!(file = %c_file_name, bytes = v_bytes.len(), "upload received");

    let options = state.options.clone();
    let c_upload_name = c_file_name.clone();
    let report = tokio::task::spawn_blocking(move || {
        convert_workbook(&v_bytes, &c_upload_name, &options)
    })
    .await
    .map_err(|e| {
        error!("Conversion task failed: {e}");
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            "Conversion task failed".to_string(),
        )
    })?
    .map_err(|e| derive_error_response(&c_file_name, e))?;

    for c_warning in &report.warnings {
        warn!(file = %c_file_name, "{c_warning}");
    }

    Ok((
        [
            (header::CONTENT_TYPE, "application/zip".to_string()),
            (
                header::CONTENT_DISPOSITION,
                derive_content_disposition(&report.archive_name),
            ),
        ],
        report.archive_bytes,
    ))
}

/// `attachment` disposition with an ASCII fallback and an RFC 5987 UTF-8 name.
fn derive_content_disposition(file_name: &str) -> String {
    let c_fallback: String = file_name
        .chars()
        .map(|chr| {
            if chr == ' ' || (chr.is_ascii_graphic() && chr != '"' && chr != '\\') {
                chr
            } else {
                '_'
            }
        })
        .collect();
    if c_fallback == file_name {
        return format!("attachment; filename=\"{file_name}\"");
    }
    format!(
        "attachment; filename=\"{c_fallback}\"; filename*=UTF-8''{}",
        utf8_percent_encode(file_name, NON_ALPHANUMERIC)
    )
}

fn derive_error_response(file_name: &str, err: MedsheetError) -> (StatusCode, String) {
    let status = match &err {
        MedsheetError::Read(_) => StatusCode::BAD_REQUEST,
        MedsheetError::MissingGroupField { .. } => StatusCode::UNPROCESSABLE_ENTITY,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    };
    if status.is_server_error() {
        error!(file = %file_name, "{err}");
    } else {
        warn!(file = %file_name, "{err}");
    }
    (status, err.to_string())
}
