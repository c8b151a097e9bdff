use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use std::io::Write;
use std::sync::Arc;

use crate::report::{self, ReportBundle, DOCX_MIME, REPORT_FILENAME};
use crate::state::AppState;

async fn lookup_bundle(state: &AppState, report_id: &str) -> Option<ReportBundle> {
    state.reports.read().await.get(report_id).cloned()
}

/// Assemble the DOCX for a stored bundle and stream it under a fixed
/// filename. A missing bundle or a render failure answers with a plain
/// message instead of a file.
pub async fn download_report(
    State(state): State<Arc<AppState>>,
    Path(report_id): Path<String>,
) -> impl IntoResponse {
    let Some(bundle) = lookup_bundle(&state, &report_id).await else {
        return (
            StatusCode::NOT_FOUND,
            "No generated report found. Submit the event form first.",
        )
            .into_response();
    };

    match report::build_docx(&bundle, &state.config.upload_folder) {
        Ok(content) => axum::response::Response::builder()
            .header("Content-Type", DOCX_MIME)
            .header(
                "Content-Disposition",
                format!("attachment; filename=\"{}\"", REPORT_FILENAME),
            )
            .body(axum::body::Body::from(content))
            .unwrap()
            .into_response(),
        Err(e) => {
            tracing::error!("Report {} failed to render: {}", report_id, e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Could not generate the report document: {}", e),
            )
                .into_response()
        }
    }
}

/// Zip the generated document together with every stored upload.
pub async fn download_bundle(
    State(state): State<Arc<AppState>>,
    Path(report_id): Path<String>,
) -> impl IntoResponse {
    let Some(bundle) = lookup_bundle(&state, &report_id).await else {
        return (
            StatusCode::NOT_FOUND,
            "No generated report found. Submit the event form first.",
        )
            .into_response();
    };

    let mut zip_data = Vec::new();
    {
        let mut zip = zip::ZipWriter::new(std::io::Cursor::new(&mut zip_data));
        let options = zip::write::SimpleFileOptions::default().unix_permissions(0o644);

        match report::build_docx(&bundle, &state.config.upload_folder) {
            Ok(content) => {
                let _ = zip.start_file(REPORT_FILENAME, options);
                let _ = zip.write_all(&content);
            }
            Err(e) => tracing::warn!("Bundle {} ships without the document: {}", report_id, e),
        }

        for name in bundle.submission.uploaded_files() {
            let path = state.config.upload_folder.join(name);
            if let Ok(content) = std::fs::read(&path) {
                let _ = zip.start_file(name, options);
                let _ = zip.write_all(&content);
            }
        }

        let _ = zip.finish();
    }

    let title = bundle.submission.event_title.trim();
    let download_name = if title.is_empty() {
        "Event_Report_Bundle.zip".to_string()
    } else {
        format!("{}_Report_Bundle.zip", title.replace(' ', "_"))
    };

    axum::response::Response::builder()
        .header("Content-Type", "application/zip")
        .header(
            "Content-Disposition",
            format!("attachment; filename=\"{}\"", download_name),
        )
        .body(axum::body::Body::from(zip_data))
        .unwrap()
        .into_response()
}

/// JSON status for a stored bundle, for the summary page's fetch calls.
pub async fn report_status(
    State(state): State<Arc<AppState>>,
    Path(report_id): Path<String>,
) -> impl IntoResponse {
    let Some(bundle) = lookup_bundle(&state, &report_id).await else {
        return axum::Json(serde_json::json!({
            "status": "not_found",
            "message": "Report not found."
        }))
        .into_response();
    };

    axum::Json(serde_json::json!({
        "status": "ready",
        "report_id": report_id,
        "title": bundle.submission.event_title,
        "created_at": bundle.created_at,
        "photo_count": bundle.submission.event_photos.len(),
        "upload_count": bundle.submission.uploaded_files().len(),
    }))
    .into_response()
}
