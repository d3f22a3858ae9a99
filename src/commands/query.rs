//! Query and eligibility command implementations

use crate::rag::{EligibilityResponse, RagPipeline, SearchResponse, SearchStatus};
use tracing::info;

/// Execute a document search
pub async fn cmd_query(
    rag: &RagPipeline,
    query: &str,
    filter: &str,
    limit: Option<usize>,
) -> SearchResponse {
    info!("Querying: {}", query);
    rag.search_documents(query, filter, limit).await
}

/// Execute an eligibility search for a program
pub async fn cmd_eligibility(
    rag: &RagPipeline,
    student_background: &str,
    program_name: &str,
) -> EligibilityResponse {
    info!("Checking eligibility for program: {}", program_name);
    rag.search_eligibility(student_background, program_name).await
}

/// Print search results to console
pub fn print_search_response(response: &SearchResponse) {
    println!("\n🔍 Query: {}\n", response.query_used);

    match response.status {
        SearchStatus::Success => {
            println!("Found {} results:\n", response.total_found);
            for (i, doc) in response.documents.iter().enumerate() {
                println!(
                    "{}. [score: {:.3}] {}",
                    i + 1,
                    doc.relevance_score,
                    doc.course_name
                );
                println!("   {}\n", preview(&doc.content));
            }
        }
        SearchStatus::NoResults => println!("{}", response.message),
        SearchStatus::Error => eprintln!("✗ {}", response.message),
    }
}

/// Print eligibility results to console
pub fn print_eligibility_response(response: &EligibilityResponse) {
    println!("\n🎓 Eligibility check: {}", response.program_name);
    println!("   Background: {}\n", response.student_background);

    match response.status {
        SearchStatus::Success => {
            if !response.requirements_found.is_empty() {
                println!("Requirements ({}):", response.requirements_found.len());
                for doc in &response.requirements_found {
                    println!(
                        "  • [{:.3}] {} - {}",
                        doc.relevance_score,
                        doc.course_name,
                        preview(&doc.content)
                    );
                }
            }

            if !response.policies_found.is_empty() {
                println!("\nPolicies ({}):", response.policies_found.len());
                for doc in &response.policies_found {
                    println!(
                        "  • [{:.3}] {} - {}",
                        doc.relevance_score,
                        doc.course_name,
                        preview(&doc.content)
                    );
                }
            }

            println!("\nTotal documents considered: {}", response.total_documents);
        }
        SearchStatus::NoResults => {
            println!(
                "{}",
                response
                    .message
                    .as_deref()
                    .unwrap_or("No relevant documents found")
            );
        }
        SearchStatus::Error => {
            eprintln!(
                "✗ {}",
                response.message.as_deref().unwrap_or("Search failed")
            );
        }
    }
}

fn preview(text: &str) -> String {
    let flat = text.replace('\n', " ");
    let trimmed = flat.trim();
    match trimmed.char_indices().nth(200) {
        Some((idx, _)) => format!("{}...", &trimmed[..idx]),
        None => trimmed.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_preview_truncates_long_text() {
        let long = "x".repeat(500);
        let p = preview(&long);
        assert_eq!(p.len(), 203);
        assert!(p.ends_with("..."));
    }

    #[test]
    fn test_preview_flattens_newlines() {
        assert_eq!(preview("a\nb"), "a b");
    }
}
