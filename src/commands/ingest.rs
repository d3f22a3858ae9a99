//! Knowledge base ingestion command

use crate::error::{Error, Result};
use crate::kb::KnowledgeBase;
use crate::rag::RagPipeline;
use serde::Serialize;
use std::path::Path;
use tracing::info;

/// Accumulated ingestion statistics
#[derive(Debug, Clone, Default, Serialize)]
pub struct IngestStats {
    pub chunks_parsed: usize,
    pub chunks_stored: usize,
    pub total_characters: usize,
    pub errors: Vec<String>,
}

/// Ingest a knowledge base file into the vector index.
///
/// Connectivity is verified before any parsing work; an unreachable
/// index aborts the run rather than producing a long tail of per-chunk
/// failures.
pub async fn cmd_ingest(rag: &RagPipeline, path: &Path) -> Result<IngestStats> {
    let health = rag.health_check().await;
    if !health.qdrant_connected {
        return Err(Error::Qdrant(format!(
            "Vector index unreachable: {}",
            health.errors.join("; ")
        )));
    }
    for error in &health.errors {
        tracing::warn!("Health check warning: {}", error);
    }

    info!("Parsing knowledge base file {:?}", path);
    let outcome = KnowledgeBase::parse_file(path)?;

    let mut stats = IngestStats {
        chunks_parsed: outcome.chunks.len(),
        total_characters: outcome.total_characters,
        errors: outcome.errors,
        ..Default::default()
    };

    if outcome.chunks.is_empty() {
        return Err(Error::Parse(format!(
            "No chunks parsed from {}",
            path.display()
        )));
    }

    for chunk in &outcome.chunks {
        if rag.ingest_chunk(chunk).await {
            stats.chunks_stored += 1;
            println!(
                "   ✅ Stored chunk {}: {} ({})",
                chunk.chunk_number, chunk.course_name, chunk.kind
            );
        } else {
            let error = format!(
                "Failed to store chunk {}: {} ({})",
                chunk.chunk_number, chunk.course_name, chunk.kind
            );
            println!("   ❌ {}", error);
            stats.errors.push(error);
        }
    }

    info!(
        "Ingestion complete: {}/{} chunks stored",
        stats.chunks_stored, stats.chunks_parsed
    );

    Ok(stats)
}

/// Print an ingestion summary to console
pub fn print_ingest_stats(stats: &IngestStats) {
    println!("\n✓ Ingestion complete");
    println!("  Chunks parsed: {}", stats.chunks_parsed);
    println!("  Chunks stored: {}", stats.chunks_stored);
    println!("  Total characters: {}", stats.total_characters);

    if stats.chunks_parsed > 0 {
        let success_rate = stats.chunks_stored as f64 / stats.chunks_parsed as f64 * 100.0;
        println!("  Success rate: {:.1}%", success_rate);
    }

    if !stats.errors.is_empty() {
        println!("\n⚠ {} error(s) encountered:", stats.errors.len());
        for error in &stats.errors {
            println!("   • {}", error);
        }
    }
}
