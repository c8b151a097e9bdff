use thiserror::Error;

pub const OUTCOME_LABEL: &str = "Event Outcome:";
pub const SEO_LABEL: &str = "SEO Description:";

/// The composite generation call must answer with exactly two labeled
/// sections. Anything else is a malformed response and the caller substitutes
/// fixed fallback text for both derived fields.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SectionParseError {
    #[error("missing `{0}` section label")]
    MissingLabel(&'static str),
    #[error("`{0}` section label occurs {1} times, expected exactly one")]
    RepeatedLabel(&'static str, usize),
}

#[derive(Debug, PartialEq, Eq)]
pub struct OutcomeSections {
    pub outcome: String,
    pub seo_description: String,
}

/// Split the response on the literal `SEO Description:` label. The label must
/// occur exactly once, and `Event Outcome:` must occur before it.
pub fn parse_outcome_sections(response: &str) -> Result<OutcomeSections, SectionParseError> {
    let Some((head, tail)) = response.split_once(SEO_LABEL) else {
        return Err(SectionParseError::MissingLabel(SEO_LABEL));
    };
    if tail.contains(SEO_LABEL) {
        let count = response.matches(SEO_LABEL).count();
        return Err(SectionParseError::RepeatedLabel(SEO_LABEL, count));
    }

    let Some((_, outcome)) = head.split_once(OUTCOME_LABEL) else {
        return Err(SectionParseError::MissingLabel(OUTCOME_LABEL));
    };

    Ok(OutcomeSections {
        outcome: outcome.trim().to_string(),
        seo_description: tail.trim().to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_a_well_formed_response() {
        let response = "Event Outcome:\nThe workshop reached 120 students.\n\n\
                        SEO Description: Hands-on AI workshop for students.";
        let sections = parse_outcome_sections(response).unwrap();
        assert_eq!(sections.outcome, "The workshop reached 120 students.");
        assert_eq!(
            sections.seo_description,
            "Hands-on AI workshop for students."
        );
    }

    #[test]
    fn tolerates_prose_before_the_first_label() {
        let response = "Here you go.\nEvent Outcome: Done well.\nSEO Description: Short blurb.";
        let sections = parse_outcome_sections(response).unwrap();
        assert_eq!(sections.outcome, "Done well.");
        assert_eq!(sections.seo_description, "Short blurb.");
    }

    #[test]
    fn missing_seo_label_is_an_error() {
        let err = parse_outcome_sections("Event Outcome: fine, nothing else").unwrap_err();
        assert_eq!(err, SectionParseError::MissingLabel(SEO_LABEL));
    }

    #[test]
    fn missing_outcome_label_is_an_error() {
        let err = parse_outcome_sections("SEO Description: only half").unwrap_err();
        assert_eq!(err, SectionParseError::MissingLabel(OUTCOME_LABEL));
    }

    #[test]
    fn repeated_seo_label_is_an_error() {
        let response =
            "Event Outcome: a\nSEO Description: b\nSEO Description: c";
        let err = parse_outcome_sections(response).unwrap_err();
        assert_eq!(err, SectionParseError::RepeatedLabel(SEO_LABEL, 2));
    }

    #[test]
    fn sections_are_trimmed() {
        let response = "Event Outcome:   padded   \nSEO Description:\n\n  also padded \n";
        let sections = parse_outcome_sections(response).unwrap();
        assert_eq!(sections.outcome, "padded");
        assert_eq!(sections.seo_description, "also padded");
    }
}
