mod api;
mod pages;

pub use api::{download_bundle, download_report, report_status};
pub use pages::{index, submit_report, view_report};
