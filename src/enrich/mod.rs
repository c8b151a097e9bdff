use serde::Serialize;
use std::collections::HashMap;
use std::future::Future;
use std::path::Path;
use tracing::warn;

use crate::agents::{parse_outcome_sections, ClaudeAgent};
use crate::submission::Submission;

const SUMMARY_PROMPT: &str = "You are a professional event summarizer. Do not add any \
introduction, just provide the output. Convert the given rough notes or key points into \
a clear, well-structured event summary in a single paragraph of about 300 words.";

const OBJECTIVES_PROMPT: &str = "You are a professional event report writer. Do not add \
any introduction, just provide the output. Rewrite the given rough objectives as a short, \
polished list of event objectives, one per line.";

const FEEDBACK_PROMPT: &str = "You are a professional event report writer. Do not add any \
introduction, just provide the output. Consolidate the given raw attendee feedback into a \
single concise paragraph capturing the overall sentiment and notable remarks.";

const OUTCOME_PROMPT: &str = "You are a professional event report writer. You will receive \
an event summary, its objectives and attendee feedback. Respond with exactly two sections \
and nothing else. The first section starts with the label \"Event Outcome:\" followed by \
one paragraph describing what the event achieved. The second section starts with the label \
\"SEO Description:\" followed by one or two sentences suitable as a web page description. \
Use each label exactly once and do not decorate the labels.";

const CAPTION_PROMPT: &str = "You describe event photographs. Reply with a single short \
caption of at most twelve words. Do not add quotes or any introduction.";

const OUTCOME_FALLBACK: &str = "Error: event outcome could not be generated.";
const SEO_FALLBACK: &str = "Error: SEO description could not be generated.";

/// Free-text fields after enrichment. A field whose source input was empty
/// stays empty; a failed call leaves an `Error: ...` marker in place of text.
#[derive(Debug, Default, Clone, Serialize)]
pub struct GeneratedText {
    pub summary: String,
    pub objectives: String,
    pub feedback: String,
    pub outcome: String,
    pub seo_description: String,
}

pub async fn generate_report_text(agent: &ClaudeAgent, submission: &Submission) -> GeneratedText {
    let summary = enrich_field(&submission.event_summary, |text| async move {
        agent.generate(SUMMARY_PROMPT, &text).await
    })
    .await;

    let objectives = enrich_field(&submission.event_objectives, |text| async move {
        agent.generate(OBJECTIVES_PROMPT, &text).await
    })
    .await;

    let feedback = enrich_field(&submission.event_feedback, |text| async move {
        agent.generate(FEEDBACK_PROMPT, &text).await
    })
    .await;

    let (outcome, seo_description) = derive_outcome(agent, &summary, &objectives, &feedback).await;

    GeneratedText {
        summary,
        objectives,
        feedback,
        outcome,
        seo_description,
    }
}

/// Run one free-text field through a generation call. Empty input short
/// circuits without calling out; failures become in-band `Error:` text.
async fn enrich_field<F, Fut>(input: &str, generate: F) -> String
where
    F: FnOnce(String) -> Fut,
    Fut: Future<Output = Result<String, String>>,
{
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return String::new();
    }
    match generate(trimmed.to_string()).await {
        Ok(text) => text.trim().to_string(),
        Err(e) => format!("Error: {}", e),
    }
}

/// Combine the enriched summary/objectives/feedback into one prompt and split
/// the answer into the two derived fields. Malformed responses take fixed
/// fallback strings; a failed call reports its cause in both fields.
async fn derive_outcome(
    agent: &ClaudeAgent,
    summary: &str,
    objectives: &str,
    feedback: &str,
) -> (String, String) {
    derive_outcome_with(summary, objectives, feedback, |combined| async move {
        agent.generate(OUTCOME_PROMPT, &combined).await
    })
    .await
}

async fn derive_outcome_with<F, Fut>(
    summary: &str,
    objectives: &str,
    feedback: &str,
    generate: F,
) -> (String, String)
where
    F: FnOnce(String) -> Fut,
    Fut: Future<Output = Result<String, String>>,
{
    if summary.is_empty() && objectives.is_empty() && feedback.is_empty() {
        return (String::new(), String::new());
    }

    let combined = format!(
        "Event Summary:\n{}\n\nEvent Objectives:\n{}\n\nParticipant Feedback:\n{}",
        summary, objectives, feedback
    );

    match generate(combined).await {
        Ok(response) => match parse_outcome_sections(&response) {
            Ok(sections) => (sections.outcome, sections.seo_description),
            Err(e) => {
                warn!("Malformed outcome response: {}", e);
                (OUTCOME_FALLBACK.to_string(), SEO_FALLBACK.to_string())
            }
        },
        Err(e) => (format!("Error: {}", e), format!("Error: {}", e)),
    }
}

/// Caption every stored photo. The map always ends up with one entry per
/// filename; a photo whose read or call fails gets a `Caption Error:` entry
/// and the rest are still processed.
pub async fn caption_photos(
    agent: &ClaudeAgent,
    upload_dir: &Path,
    photos: &[String],
) -> HashMap<String, String> {
    caption_photos_with(photos, |name| async move {
        let path = upload_dir.join(&name);
        let bytes =
            std::fs::read(&path).map_err(|e| format!("could not read {}: {}", name, e))?;
        let media_type = mime_guess::from_path(&name)
            .first_or_octet_stream()
            .essence_str()
            .to_string();
        agent.caption(CAPTION_PROMPT, &bytes, &media_type).await
    })
    .await
}

async fn caption_photos_with<F, Fut>(photos: &[String], caption: F) -> HashMap<String, String>
where
    F: Fn(String) -> Fut,
    Fut: Future<Output = Result<String, String>>,
{
    let mut captions = HashMap::new();
    for name in photos {
        let entry = match caption(name.clone()).await {
            Ok(text) => text.trim().to_string(),
            Err(e) => format!("Caption Error: {}", e),
        };
        captions.insert(name.clone(), entry);
    }
    captions
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[tokio::test]
    async fn empty_field_makes_no_call_and_stays_empty() {
        let calls = Cell::new(0u32);
        let result = enrich_field("   \n ", |_input| async {
            calls.set(calls.get() + 1);
            Ok("should not happen".to_string())
        })
        .await;

        assert_eq!(result, "");
        assert_eq!(calls.get(), 0);
    }

    #[tokio::test]
    async fn successful_call_stores_trimmed_response() {
        let result = enrich_field("raw notes", |input| async move {
            assert_eq!(input, "raw notes");
            Ok("  polished text \n".to_string())
        })
        .await;

        assert_eq!(result, "polished text");
    }

    #[tokio::test]
    async fn failed_call_stores_error_marker() {
        let result =
            enrich_field("raw notes", |_input| async { Err("timed out".to_string()) }).await;

        assert_eq!(result, "Error: timed out");
    }

    #[tokio::test]
    async fn input_is_trimmed_before_the_call() {
        let result = enrich_field("  notes  ", |input| async move { Ok(input) }).await;
        assert_eq!(result, "notes");
    }

    #[tokio::test]
    async fn composite_call_skipped_when_all_inputs_empty() {
        let calls = Cell::new(0u32);
        let (outcome, seo) = derive_outcome_with("", "", "", |_combined| async {
            calls.set(calls.get() + 1);
            Ok("unused".to_string())
        })
        .await;

        assert_eq!(outcome, "");
        assert_eq!(seo, "");
        assert_eq!(calls.get(), 0);
    }

    #[tokio::test]
    async fn composite_response_splits_into_both_fields() {
        let (outcome, seo) = derive_outcome_with("s", "o", "f", |combined| async move {
            assert!(combined.contains("Event Summary:\ns"));
            assert!(combined.contains("Participant Feedback:\nf"));
            Ok("Event Outcome: went great.\nSEO Description: a great event.".to_string())
        })
        .await;

        assert_eq!(outcome, "went great.");
        assert_eq!(seo, "a great event.");
    }

    #[tokio::test]
    async fn malformed_composite_response_takes_fixed_fallbacks() {
        let (outcome, seo) = derive_outcome_with("s", "", "", |_combined| async {
            Ok("no labels anywhere in this answer".to_string())
        })
        .await;

        assert_eq!(outcome, OUTCOME_FALLBACK);
        assert_eq!(seo, SEO_FALLBACK);
    }

    #[tokio::test]
    async fn failed_composite_call_reports_cause_in_both_fields() {
        let (outcome, seo) =
            derive_outcome_with("s", "", "", |_combined| async { Err("boom".to_string()) }).await;

        assert_eq!(outcome, "Error: boom");
        assert_eq!(seo, "Error: boom");
    }

    #[tokio::test]
    async fn every_photo_gets_a_caption_entry() {
        let photos = vec![
            "a.jpg".to_string(),
            "broken.jpg".to_string(),
            "c.png".to_string(),
        ];
        let captions = caption_photos_with(&photos, |name| async move {
            if name == "broken.jpg" {
                Err("unreadable image".to_string())
            } else {
                Ok(format!(" caption for {} ", name))
            }
        })
        .await;

        assert_eq!(captions.len(), 3);
        assert_eq!(captions["a.jpg"], "caption for a.jpg");
        assert_eq!(captions["broken.jpg"], "Caption Error: unreadable image");
        assert_eq!(captions["c.png"], "caption for c.png");
    }

    #[tokio::test]
    async fn no_photos_yields_an_empty_map() {
        let captions =
            caption_photos_with(&[], |_name| async { Ok("unused".to_string()) }).await;
        assert!(captions.is_empty());
    }
}
