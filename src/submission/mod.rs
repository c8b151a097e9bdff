use axum::extract::multipart::Field;
use axum::extract::Multipart;
use serde::Serialize;
use std::path::Path;
use tracing::warn;

use crate::storage;

/// One event-report form submission. Text fields keep whatever the user
/// typed (empty string when the field was absent); file fields hold stored
/// filenames relative to the upload directory.
#[derive(Debug, Default, Clone, Serialize)]
pub struct Submission {
    pub event_title: String,
    pub event_summary: String,
    pub event_objectives: String,
    pub event_activities: String,
    pub event_feedback: String,
    pub event_venue: String,
    pub event_date: String,
    pub event_department: String,
    pub faculty_coordinator: String,
    pub student_coordinator: String,
    pub chief_guest: String,
    pub event_time: Vec<String>,
    pub poster: Option<String>,
    pub feedback_excel: Option<String>,
    pub participant_list: Option<String>,
    pub presenter_list: Option<String>,
    pub winner_list: Option<String>,
    pub certificates: Vec<String>,
    pub event_photos: Vec<String>,
}

impl Submission {
    /// Every stored upload, in the order it appears in the document.
    pub fn uploaded_files(&self) -> Vec<&str> {
        let mut files = Vec::new();
        for single in [
            &self.poster,
            &self.feedback_excel,
            &self.participant_list,
            &self.presenter_list,
            &self.winner_list,
        ] {
            if let Some(name) = single {
                files.push(name.as_str());
            }
        }
        files.extend(self.certificates.iter().map(String::as_str));
        files.extend(self.event_photos.iter().map(String::as_str));
        files
    }
}

/// Drain the multipart payload into a `Submission`. Unknown field names are
/// ignored, repeated `event_time` entries accumulate in order, and file parts
/// are sanitized and persisted as they stream in. A part with an empty
/// filename or an empty body counts as "not provided".
pub async fn collect(
    multipart: &mut Multipart,
    upload_dir: &Path,
    report_id: &str,
) -> Submission {
    let mut submission = Submission::default();

    while let Ok(Some(field)) = multipart.next_field().await {
        let name = field.name().unwrap_or("").to_string();
        match name.as_str() {
            "event_title" => submission.event_title = read_text(field).await,
            "event_summary" => submission.event_summary = read_text(field).await,
            "event_objectives" => submission.event_objectives = read_text(field).await,
            "event_activities" => submission.event_activities = read_text(field).await,
            "event_feedback" => submission.event_feedback = read_text(field).await,
            "event_venue" => submission.event_venue = read_text(field).await,
            "event_date" => submission.event_date = read_text(field).await,
            "event_department" => submission.event_department = read_text(field).await,
            "faculty_coordinator" => submission.faculty_coordinator = read_text(field).await,
            "student_coordinator" => submission.student_coordinator = read_text(field).await,
            "chief_guest" => submission.chief_guest = read_text(field).await,
            "event_time" => {
                let slot = read_text(field).await;
                if !slot.is_empty() {
                    submission.event_time.push(slot);
                }
            }
            "poster" => {
                if let Some(stored) = store_file(field, upload_dir, report_id).await {
                    submission.poster = Some(stored);
                }
            }
            "feedback_excel" => {
                if let Some(stored) = store_file(field, upload_dir, report_id).await {
                    submission.feedback_excel = Some(stored);
                }
            }
            "participant_list" => {
                if let Some(stored) = store_file(field, upload_dir, report_id).await {
                    submission.participant_list = Some(stored);
                }
            }
            "presenter_list" => {
                if let Some(stored) = store_file(field, upload_dir, report_id).await {
                    submission.presenter_list = Some(stored);
                }
            }
            "winner_list" => {
                if let Some(stored) = store_file(field, upload_dir, report_id).await {
                    submission.winner_list = Some(stored);
                }
            }
            "certificates" => {
                if let Some(stored) = store_file(field, upload_dir, report_id).await {
                    submission.certificates.push(stored);
                }
            }
            "event_photos" => {
                if let Some(stored) = store_file(field, upload_dir, report_id).await {
                    submission.event_photos.push(stored);
                }
            }
            _ => {}
        }
    }

    submission
}

async fn read_text(field: Field<'_>) -> String {
    field.text().await.unwrap_or_default()
}

async fn store_file(field: Field<'_>, upload_dir: &Path, report_id: &str) -> Option<String> {
    let original = field.file_name().unwrap_or("").to_string();
    if original.is_empty() {
        return None;
    }
    let Some(clean) = storage::sanitize_filename(&original) else {
        warn!("Rejected unusable upload filename {:?}", original);
        return None;
    };

    let data = field.bytes().await.ok()?;
    if data.is_empty() {
        return None;
    }

    match storage::store_upload(upload_dir, report_id, &clean, &data) {
        Ok(stored) => Some(stored),
        Err(e) => {
            warn!("Failed to store upload {}: {}", clean, e);
            None
        }
    }
}
