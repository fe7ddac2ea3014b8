//! Credit sessions: pasted credits processed line by line
//!
//! Lines are trimmed. Every line with at least one statement is resolved; the
//! name cache is persisted after each such line so confirmed mappings survive
//! an interrupted session. A line only counts as parsed once a relationship
//! was created from it, everything else (blank lines included) is kept as
//! remaining text.

use crate::notice::parse_copyright_notice;
use crate::resolve::{Orchestrator, ResolutionStrategy};
use serde::Serialize;
use tracing::{debug, info, warn};

/// Outcome of one credit session
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SessionReport {
    /// Lines that created at least one relationship, in input order
    pub parsed_lines: Vec<String>,
    /// All other lines, blank ones included
    pub skipped_lines: Vec<String>,
    /// Whether any relationship was created
    pub relationships_added: bool,
}

impl SessionReport {
    /// Auditable summary of what was parsed
    pub fn edit_note_message(&self) -> String {
        self.parsed_lines.join("\n")
    }

    /// Input without the parsed lines
    pub fn remaining_text(&self) -> String {
        self.skipped_lines.join("\n")
    }
}

/// Parses and resolves every line of `text`
pub async fn process_credits(
    orchestrator: &Orchestrator,
    text: &str,
    strategy: &dyn ResolutionStrategy,
) -> SessionReport {
    let mut report = SessionReport::default();

    for line in text.lines().map(str::trim) {
        let statements = parse_copyright_notice(line);
        if statements.is_empty() {
            report.skipped_lines.push(line.to_string());
            continue;
        }

        info!(line = %line, statements = statements.len(), "Parsed credit line");
        let added = orchestrator.resolve_and_create(&statements, strategy).await;

        if let Err(e) = orchestrator.name_cache().store() {
            warn!(error = %e, "Failed to persist name cache");
        }

        if added {
            report.relationships_added = true;
            report.parsed_lines.push(line.to_string());
        } else {
            debug!(line = %line, "Nothing created, keeping line");
            report.skipped_lines.push(line.to_string());
        }
    }

    report
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_messages() {
        let report = SessionReport {
            parsed_lines: vec!["© 2020 Foo".to_string(), "℗ 2020 Bar".to_string()],
            skipped_lines: vec!["Mastered by Baz".to_string()],
            relationships_added: true,
        };
        assert_eq!(report.edit_note_message(), "© 2020 Foo\n℗ 2020 Bar");
        assert_eq!(report.remaining_text(), "Mastered by Baz");
    }
}
