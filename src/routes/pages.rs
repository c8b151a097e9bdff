use axum::{
    extract::{Multipart, Path, State},
    response::{Html, IntoResponse, Redirect},
};
use chrono::Utc;
use std::sync::Arc;
use tera::Context;

use crate::agents::ClaudeAgent;
use crate::report::ReportBundle;
use crate::state::AppState;
use crate::storage::generate_report_id;
use crate::{enrich, submission};

pub async fn index(State(_state): State<Arc<AppState>>) -> impl IntoResponse {
    render_template("form.html", Context::new())
}

/// Handle one form submission start to finish: store the uploads, enrich the
/// designated text fields, caption the photos, file the bundle under a fresh
/// report id. Everything runs sequentially inside this request; external-call
/// failures surface as in-band text inside the bundle, never as a failed
/// response.
pub async fn submit_report(
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> impl IntoResponse {
    let report_id = generate_report_id();
    let submission =
        submission::collect(&mut multipart, &state.config.upload_folder, &report_id).await;

    tracing::info!(
        "Collected submission {} ({} uploads)",
        report_id,
        submission.uploaded_files().len()
    );

    let agent = ClaudeAgent::new(state.config.claude_api_key.clone());
    let generated = enrich::generate_report_text(&agent, &submission).await;
    let captions =
        enrich::caption_photos(&agent, &state.config.upload_folder, &submission.event_photos)
            .await;

    let bundle = ReportBundle {
        submission,
        generated,
        captions,
        created_at: Utc::now(),
    };

    state
        .reports
        .write()
        .await
        .insert(report_id.clone(), bundle);

    Redirect::to(&format!("/report/{}", report_id)).into_response()
}

pub async fn view_report(
    State(state): State<Arc<AppState>>,
    Path(report_id): Path<String>,
) -> impl IntoResponse {
    let reports = state.reports.read().await;
    let Some(bundle) = reports.get(&report_id) else {
        return Redirect::to("/").into_response();
    };

    let mut ctx = Context::new();
    ctx.insert("report_id", &report_id);
    ctx.insert("submission", &bundle.submission);
    ctx.insert("generated", &bundle.generated);
    ctx.insert("captions", &bundle.captions);
    ctx.insert(
        "created_at",
        &bundle.created_at.format("%B %d, %Y %H:%M UTC").to_string(),
    );

    render_template("summary.html", ctx).into_response()
}

fn render_template(name: &str, ctx: Context) -> Html<String> {
    let tera = crate::templates::get_tera();
    let rendered = tera
        .render(name, &ctx)
        .unwrap_or_else(|_| format!("Template error: {}", name));
    Html(rendered)
}
