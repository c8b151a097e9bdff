pub mod sheet;

use chrono::{DateTime, Utc};
use docx_rs::{AlignmentType, Docx, Paragraph, Pic, Run, Table, TableCell, TableRow};
use std::collections::HashMap;
use std::path::Path;
use thiserror::Error;
use tracing::warn;

use crate::enrich::GeneratedText;
use crate::submission::Submission;

pub const REPORT_FILENAME: &str = "Event_Report.docx";
pub const DOCX_MIME: &str =
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document";

const EMU_PER_PX: u32 = 9525;
const POSTER_WIDTH_PX: u32 = 480;
const PHOTO_WIDTH_PX: u32 = 220;
const CERTIFICATE_WIDTH_PX: u32 = 440;

const TITLE_SIZE: usize = 36;
const HEADING_SIZE: usize = 28;
const BODY_SIZE: usize = 22;
const CAPTION_SIZE: usize = 18;

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("uploaded file {0} is missing from the upload directory")]
    MissingUpload(String),
    #[error("could not read uploaded file {name}: {source}")]
    UploadRead {
        name: String,
        source: std::io::Error,
    },
    #[error("uploaded file {0} is not a readable image")]
    InvalidImage(String),
    #[error("document serialization failed: {0}")]
    Serialize(String),
}

/// Everything one submission produced. Inserted into the app state once and
/// never mutated; the download routes read it back by report id.
#[derive(Debug, Clone)]
pub struct ReportBundle {
    pub submission: Submission,
    pub generated: GeneratedText,
    pub captions: HashMap<String, String>,
    pub created_at: DateTime<Utc>,
}

/// Assemble the report document in memory: title heading, labeled field
/// sections in fixed order, poster, captioned photo row, certificates, and
/// the transcribed feedback spreadsheet.
pub fn build_docx(bundle: &ReportBundle, upload_dir: &Path) -> Result<Vec<u8>, ReportError> {
    let submission = &bundle.submission;
    let mut docx = Docx::new();

    docx = docx.add_paragraph(heading("Event Report", TITLE_SIZE).align(AlignmentType::Center));

    for (label, value) in field_sections(submission, &bundle.generated) {
        docx = docx.add_paragraph(heading(label, HEADING_SIZE));
        docx = docx.add_paragraph(body_text(&value));
    }

    if let Some(poster) = &submission.poster {
        let pic = load_picture(upload_dir, poster, POSTER_WIDTH_PX)?;
        docx = docx.add_paragraph(heading("Poster", HEADING_SIZE));
        docx = docx.add_paragraph(
            Paragraph::new()
                .add_run(Run::new().add_image(pic))
                .align(AlignmentType::Center),
        );
    }

    if !submission.event_photos.is_empty() {
        docx = docx.add_paragraph(heading("Photo Gallery", HEADING_SIZE));
        docx = docx.add_table(photo_table(
            upload_dir,
            &submission.event_photos,
            &bundle.captions,
        )?);
    }

    if !submission.certificates.is_empty() {
        docx = docx.add_paragraph(heading("Certificates", HEADING_SIZE));
        for certificate in &submission.certificates {
            let pic = load_picture(upload_dir, certificate, CERTIFICATE_WIDTH_PX)?;
            docx = docx.add_paragraph(
                Paragraph::new()
                    .add_run(Run::new().add_image(pic))
                    .align(AlignmentType::Center),
            );
        }
    }

    if let Some(sheet_name) = &submission.feedback_excel {
        docx = docx.add_paragraph(heading("Feedback Responses", HEADING_SIZE));
        match sheet::load_table(&upload_dir.join(sheet_name)) {
            Ok(table) => docx = docx.add_table(data_table(&table)),
            Err(e) => {
                warn!("Skipping feedback table for {}: {}", sheet_name, e);
                docx = docx.add_paragraph(body_text(&format!("Error: {}", e)));
            }
        }
    }

    let mut cursor = std::io::Cursor::new(Vec::new());
    docx.build()
        .pack(&mut cursor)
        .map_err(|e| ReportError::Serialize(e.to_string()))?;
    Ok(cursor.into_inner())
}

/// Labeled text sections in display order; empty fields are skipped.
/// Enriched fields come from the generated text, the rest straight from the
/// submission.
fn field_sections(submission: &Submission, generated: &GeneratedText) -> Vec<(&'static str, String)> {
    let pairs = vec![
        ("Title", submission.event_title.clone()),
        ("Summary", generated.summary.clone()),
        ("Objectives", generated.objectives.clone()),
        ("Activities", submission.event_activities.clone()),
        ("Venue", submission.event_venue.clone()),
        ("Date", submission.event_date.clone()),
        ("Time", submission.event_time.join(", ")),
        ("Department", submission.event_department.clone()),
        ("Faculty Coordinator", submission.faculty_coordinator.clone()),
        ("Student Coordinator", submission.student_coordinator.clone()),
        ("Chief Guest", submission.chief_guest.clone()),
        ("Feedback", generated.feedback.clone()),
        ("Event Outcome", generated.outcome.clone()),
        ("SEO Description", generated.seo_description.clone()),
    ];

    pairs
        .into_iter()
        .filter(|(_, value)| !value.trim().is_empty())
        .collect()
}

fn heading(text: &str, size: usize) -> Paragraph {
    Paragraph::new().add_run(Run::new().add_text(text).size(size).bold())
}

fn body_text(text: &str) -> Paragraph {
    Paragraph::new().add_run(Run::new().add_text(text).size(BODY_SIZE))
}

fn load_picture(upload_dir: &Path, name: &str, target_width_px: u32) -> Result<Pic, ReportError> {
    let path = upload_dir.join(name);
    if !path.exists() {
        return Err(ReportError::MissingUpload(name.to_string()));
    }
    let bytes = std::fs::read(&path).map_err(|source| ReportError::UploadRead {
        name: name.to_string(),
        source,
    })?;

    let (width, height) = intrinsic_size(&bytes)
        .ok_or_else(|| ReportError::InvalidImage(name.to_string()))?;
    let scaled_height =
        ((height as u64 * target_width_px as u64) / width as u64).clamp(1, 1600) as u32;

    Ok(Pic::new(&bytes).size(target_width_px * EMU_PER_PX, scaled_height * EMU_PER_PX))
}

// Full decode, not just a header sniff: the docx writer decodes the bytes
// again when embedding, so anything undecodable must be rejected here.
fn intrinsic_size(bytes: &[u8]) -> Option<(u32, u32)> {
    use image::GenericImageView;

    let img = image::load_from_memory(bytes).ok()?;
    let (w, h) = img.dimensions();
    (w > 0 && h > 0).then_some((w, h))
}

/// One row, one cell per photo: the image with its caption centered beneath.
fn photo_table(
    upload_dir: &Path,
    photos: &[String],
    captions: &HashMap<String, String>,
) -> Result<Table, ReportError> {
    let mut cells = Vec::new();
    for name in photos {
        let pic = load_picture(upload_dir, name, PHOTO_WIDTH_PX)?;
        let caption = captions.get(name).cloned().unwrap_or_default();
        cells.push(
            TableCell::new()
                .add_paragraph(
                    Paragraph::new()
                        .add_run(Run::new().add_image(pic))
                        .align(AlignmentType::Center),
                )
                .add_paragraph(
                    Paragraph::new()
                        .add_run(Run::new().add_text(caption).size(CAPTION_SIZE))
                        .align(AlignmentType::Center),
                ),
        );
    }
    Ok(Table::new(vec![TableRow::new(cells)]))
}

fn data_table(table: &sheet::SheetTable) -> Table {
    let mut rows = Vec::with_capacity(table.rows.len() + 1);

    rows.push(TableRow::new(
        table
            .header
            .iter()
            .map(|cell| {
                TableCell::new().add_paragraph(
                    Paragraph::new().add_run(Run::new().add_text(cell.clone()).bold()),
                )
            })
            .collect(),
    ));

    for row in &table.rows {
        rows.push(TableRow::new(
            row.iter()
                .map(|cell| {
                    TableCell::new()
                        .add_paragraph(Paragraph::new().add_run(Run::new().add_text(cell.clone())))
                })
                .collect(),
        ));
    }

    Table::new(rows)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn png_bytes() -> Vec<u8> {
        let img = image::RgbaImage::from_pixel(1, 1, image::Rgba([200, 30, 30, 255]));
        let mut bytes = Vec::new();
        image::DynamicImage::ImageRgba8(img)
            .write_to(
                &mut std::io::Cursor::new(&mut bytes),
                image::ImageOutputFormat::Png,
            )
            .unwrap();
        bytes
    }

    fn bundle_with(submission: Submission, generated: GeneratedText) -> ReportBundle {
        ReportBundle {
            submission,
            generated,
            captions: HashMap::new(),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn sections_follow_display_order_and_skip_empties() {
        let submission = Submission {
            event_title: "Tech Talk".to_string(),
            event_venue: "Main Hall".to_string(),
            event_time: vec!["10:00".to_string(), "14:00".to_string()],
            ..Submission::default()
        };
        let generated = GeneratedText {
            summary: "notes about AI".to_string(),
            outcome: "Error: boom".to_string(),
            ..GeneratedText::default()
        };

        let sections = field_sections(&submission, &generated);
        let labels: Vec<&str> = sections.iter().map(|(label, _)| *label).collect();

        assert_eq!(
            labels,
            vec!["Title", "Summary", "Venue", "Time", "Event Outcome"]
        );
        assert_eq!(sections[0].1, "Tech Talk");
        assert_eq!(sections[3].1, "10:00, 14:00");
    }

    #[test]
    fn text_only_report_packs_to_a_zip_container() {
        let dir = tempfile::tempdir().unwrap();
        let submission = Submission {
            event_title: "Tech Talk".to_string(),
            ..Submission::default()
        };
        let bundle = bundle_with(submission, GeneratedText::default());

        let bytes = build_docx(&bundle, dir.path()).unwrap();
        assert!(bytes.len() > 4);
        assert_eq!(&bytes[..2], b"PK");
    }

    #[test]
    fn report_embeds_poster_photos_and_certificates() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["poster.png", "ph1.png", "ph2.png", "cert.png"] {
            std::fs::write(dir.path().join(name), png_bytes()).unwrap();
        }

        let submission = Submission {
            event_title: "Tech Talk".to_string(),
            poster: Some("poster.png".to_string()),
            certificates: vec!["cert.png".to_string()],
            event_photos: vec!["ph1.png".to_string(), "ph2.png".to_string()],
            ..Submission::default()
        };
        let mut bundle = bundle_with(submission, GeneratedText::default());
        bundle
            .captions
            .insert("ph1.png".to_string(), "Speakers on stage".to_string());
        bundle
            .captions
            .insert("ph2.png".to_string(), "Caption Error: unreadable".to_string());

        let bytes = build_docx(&bundle, dir.path()).unwrap();
        assert_eq!(&bytes[..2], b"PK");
    }

    #[test]
    fn missing_photo_is_a_render_error() {
        let dir = tempfile::tempdir().unwrap();
        let submission = Submission {
            event_photos: vec!["gone.png".to_string()],
            ..Submission::default()
        };
        let bundle = bundle_with(submission, GeneratedText::default());

        let err = build_docx(&bundle, dir.path()).unwrap_err();
        assert!(matches!(err, ReportError::MissingUpload(name) if name == "gone.png"));
    }

    #[test]
    fn non_image_upload_is_a_render_error() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("poster.png"), b"not an image").unwrap();

        let submission = Submission {
            poster: Some("poster.png".to_string()),
            ..Submission::default()
        };
        let bundle = bundle_with(submission, GeneratedText::default());

        let err = build_docx(&bundle, dir.path()).unwrap_err();
        assert!(matches!(err, ReportError::InvalidImage(name) if name == "poster.png"));
    }

    #[test]
    fn unreadable_spreadsheet_degrades_to_inline_error() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("feedback.xlsx"), b"not a workbook").unwrap();

        let submission = Submission {
            feedback_excel: Some("feedback.xlsx".to_string()),
            ..Submission::default()
        };
        let bundle = bundle_with(submission, GeneratedText::default());

        // The document still renders; the table section carries an error line.
        let bytes = build_docx(&bundle, dir.path()).unwrap();
        assert_eq!(&bytes[..2], b"PK");
    }
}
