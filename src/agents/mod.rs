mod claude;
mod sections;

pub use claude::ClaudeAgent;
pub use sections::{parse_outcome_sections, OutcomeSections, SectionParseError};
