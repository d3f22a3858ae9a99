//! Knowledge-base chunk parsing
//!
//! The course knowledge base is a plain-text file of blocks delimited by
//! `===CHUNK_START===` / `===CHUNK_END===`. Each block carries `key: value`
//! metadata lines followed by a `text:` line that starts the content region.

use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use tracing::{debug, info, warn};

const CHUNK_START: &str = "===CHUNK_START===";
const CHUNK_END: &str = "===CHUNK_END===";

/// A titled, typed unit of course knowledge-base content
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Chunk {
    /// 1-based position within the source file
    pub chunk_number: usize,

    /// Course level (e.g. "ug", "pg", "general")
    pub level: String,

    /// Course or program name
    pub course_name: String,

    /// Content category (e.g. "overview", "fees", "requirements")
    #[serde(rename = "type")]
    pub kind: String,

    /// Flattened content text
    pub content: String,

    /// Derived identifier: `chunk_{n}_{level}_{type}`
    pub chunk_id: String,
}

impl Chunk {
    /// Text actually sent to the embedding model: title line plus content
    pub fn display_text(&self) -> String {
        format!(
            "{} - {}\n\n{}",
            self.course_name,
            title_case(&self.kind),
            self.content
        )
    }
}

/// Outcome of parsing a knowledge-base file
///
/// Per-block failures accumulate in `errors` and never abort the remaining
/// blocks; only an unreadable file is fatal.
#[derive(Debug, Default)]
pub struct ParseOutcome {
    pub chunks: Vec<Chunk>,
    pub errors: Vec<String>,
    pub total_characters: usize,
}

/// Knowledge-base parser
pub struct KnowledgeBase;

impl KnowledgeBase {
    /// Parse a knowledge-base file from disk
    pub fn parse_file(path: &Path) -> Result<ParseOutcome> {
        info!("Reading knowledge base from {}", path.display());
        let content = std::fs::read_to_string(path)?;
        Ok(Self::parse_str(&content))
    }

    /// Parse knowledge-base text into chunks
    pub fn parse_str(content: &str) -> ParseOutcome {
        let mut outcome = ParseOutcome::default();
        let mut rest = content;
        let mut chunk_number = 0;

        while let Some(start) = rest.find(CHUNK_START) {
            let after_start = &rest[start + CHUNK_START.len()..];
            let Some(end) = after_start.find(CHUNK_END) else {
                outcome.errors.push(format!(
                    "chunk {}: {} without matching {}",
                    chunk_number + 1,
                    CHUNK_START,
                    CHUNK_END
                ));
                break;
            };

            chunk_number += 1;
            let block = &after_start[..end];
            if let Some(chunk) = parse_block(block.trim(), chunk_number) {
                debug!(
                    "Parsed chunk {}: {} ({})",
                    chunk_number, chunk.course_name, chunk.kind
                );
                outcome.total_characters += chunk.content.len();
                outcome.chunks.push(chunk);
            } else {
                warn!("Chunk {} has no content, skipping", chunk_number);
            }

            rest = &after_start[end + CHUNK_END.len()..];
        }

        info!(
            "Parsed {} chunks ({} errors)",
            outcome.chunks.len(),
            outcome.errors.len()
        );
        outcome
    }
}

/// Parse one delimited block; returns None for blocks with no content
fn parse_block(block: &str, chunk_number: usize) -> Option<Chunk> {
    let mut metadata: HashMap<String, String> = HashMap::new();
    let mut content_lines: Vec<String> = Vec::new();
    let mut in_metadata = true;

    for line in block.lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        if let Some(text) = line.strip_prefix("text:") {
            in_metadata = false;
            let text = text.trim();
            if !text.is_empty() {
                content_lines.push(text.to_string());
            }
        } else if in_metadata {
            if let Some((key, value)) = line.split_once(':') {
                metadata.insert(key.trim().to_string(), value.trim().to_string());
            }
        } else {
            content_lines.push(line.to_string());
        }
    }

    if content_lines.is_empty() {
        return None;
    }

    let level = metadata.get("level").cloned().unwrap_or_default();
    let kind = metadata.get("type").cloned().unwrap_or_default();
    let course_name = metadata
        .get("course_name")
        .cloned()
        .unwrap_or_else(|| format!("Chunk {}", chunk_number));

    Some(Chunk {
        chunk_number,
        chunk_id: format!("chunk_{}_{}_{}", chunk_number, level, kind),
        level,
        course_name,
        kind,
        content: content_lines.join(" "),
    })
}

/// Capitalize the first letter of each whitespace-separated word
fn title_case(s: &str) -> String {
    s.split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "\
===CHUNK_START===
level: pg
course_name: MBA
type: requirements
text: Applicants must hold a bachelor degree.
Minimum CGPA of 2.5 is required.
===CHUNK_END===
===CHUNK_START===
level: ug
course_name: BSc Computer Science
type: overview
text: A three year programme covering software
engineering and data science.
===CHUNK_END===
";

    #[test]
    fn test_parse_well_formed_chunks() {
        let outcome = KnowledgeBase::parse_str(SAMPLE);
        assert!(outcome.errors.is_empty());
        assert_eq!(outcome.chunks.len(), 2);

        let first = &outcome.chunks[0];
        assert_eq!(first.chunk_number, 1);
        assert_eq!(first.level, "pg");
        assert_eq!(first.course_name, "MBA");
        assert_eq!(first.kind, "requirements");
        assert_eq!(
            first.content,
            "Applicants must hold a bachelor degree. Minimum CGPA of 2.5 is required."
        );
        assert_eq!(first.chunk_id, "chunk_1_pg_requirements");

        let second = &outcome.chunks[1];
        assert_eq!(second.chunk_number, 2);
        assert_eq!(
            second.content,
            "A three year programme covering software engineering and data science."
        );
    }

    #[test]
    fn test_block_without_text_line_yields_no_chunk() {
        let input = "\
===CHUNK_START===
level: ug
course_name: BBA
type: fees
===CHUNK_END===
";
        let outcome = KnowledgeBase::parse_str(input);
        assert!(outcome.chunks.is_empty());
        assert!(outcome.errors.is_empty());
    }

    #[test]
    fn test_missing_course_name_defaults() {
        let input = "\
===CHUNK_START===
level: general
text: Campus facilities include a library and labs.
===CHUNK_END===
";
        let outcome = KnowledgeBase::parse_str(input);
        assert_eq!(outcome.chunks.len(), 1);
        assert_eq!(outcome.chunks[0].course_name, "Chunk 1");
        assert_eq!(outcome.chunks[0].kind, "");
    }

    #[test]
    fn test_unterminated_block_recorded_as_error() {
        let input = "===CHUNK_START===\ntext: dangling content";
        let outcome = KnowledgeBase::parse_str(input);
        assert!(outcome.chunks.is_empty());
        assert_eq!(outcome.errors.len(), 1);
        assert!(outcome.errors[0].contains("without matching"));
    }

    #[test]
    fn test_unrecognized_metadata_ignored_downstream() {
        let input = "\
===CHUNK_START===
level: pg
course_name: MSc AI
type: overview
campus: main
text: Covers machine learning and robotics.
===CHUNK_END===
";
        let outcome = KnowledgeBase::parse_str(input);
        assert_eq!(outcome.chunks.len(), 1);
        // "campus" is captured during parsing but not part of the record
        assert_eq!(outcome.chunks[0].course_name, "MSc AI");
    }

    #[test]
    fn test_display_text_title_cases_type() {
        let outcome = KnowledgeBase::parse_str(SAMPLE);
        let text = outcome.chunks[0].display_text();
        assert!(text.starts_with("MBA - Requirements\n\n"));
        assert!(text.ends_with("Minimum CGPA of 2.5 is required."));
    }

    #[test]
    fn test_parse_is_idempotent() {
        let first = KnowledgeBase::parse_str(SAMPLE);
        let second = KnowledgeBase::parse_str(SAMPLE);
        assert_eq!(first.chunks, second.chunks);
    }
}
