use chrono::Utc;
use regex::Regex;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use uuid::Uuid;

pub fn generate_report_id() -> String {
    format!(
        "{}_{}",
        Utc::now().format("%Y%m%d"),
        Uuid::new_v4().to_string()[..8].to_string()
    )
}

pub fn ensure_upload_dir(upload_folder: &PathBuf) -> std::io::Result<()> {
    std::fs::create_dir_all(upload_folder)
}

/// Reduce an uploaded filename to a safe relative name: path components and
/// anything outside `[A-Za-z0-9_.-]` collapse to underscores, leading and
/// trailing dots/underscores are stripped. Returns `None` when nothing usable
/// remains ("..", hidden-file markers, names made of separators only).
pub fn sanitize_filename(name: &str) -> Option<String> {
    static DISALLOWED: OnceLock<Regex> = OnceLock::new();
    let re = DISALLOWED.get_or_init(|| Regex::new(r"[^A-Za-z0-9_.-]+").unwrap());

    let cleaned = re.replace_all(name, "_");
    let cleaned = cleaned.trim_matches(|c| c == '.' || c == '_');
    if cleaned.is_empty() {
        None
    } else {
        Some(cleaned.to_string())
    }
}

/// Persist uploaded bytes under the report id. If the target name is already
/// taken, a numeric suffix is appended before the extension until a free name
/// is found; existing files are never overwritten.
pub fn store_upload(
    upload_dir: &Path,
    report_id: &str,
    filename: &str,
    bytes: &[u8],
) -> std::io::Result<String> {
    let base = format!("{}_{}", report_id, filename);
    let (stem, ext) = match base.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() => (stem.to_string(), Some(ext.to_string())),
        _ => (base.clone(), None),
    };

    let mut stored = base;
    let mut n = 1;
    while upload_dir.join(&stored).exists() {
        stored = match &ext {
            Some(ext) => format!("{}_{}.{}", stem, n, ext),
            None => format!("{}_{}", stem, n),
        };
        n += 1;
    }

    std::fs::write(upload_dir.join(&stored), bytes)?;
    Ok(stored)
}
