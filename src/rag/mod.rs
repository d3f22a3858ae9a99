//! Retrieval pipeline
//!
//! Composes the embedding client and vector store into the two operations
//! every agent consumes: chunk ingestion and similarity search. All
//! failures surface as structured statuses; nothing raises past this
//! boundary.

use crate::config::QueryConfig;
use crate::embed::Embedder;
use crate::kb::Chunk;
use crate::store::{point_id, ChunkPayload, VectorIndex};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, warn};

/// Keywords marking a document as requirement-bearing. Requirement match
/// takes priority over policy match; a document lands in at most one bucket.
const REQUIREMENT_KEYWORDS: [&str; 4] = ["requirement", "prerequisite", "minimum", "must have"];
const POLICY_KEYWORDS: [&str; 3] = ["policy", "admission", "criteria"];

/// Search outcome, distinguishable by callers: zero matches is not an error
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SearchStatus {
    Success,
    NoResults,
    Error,
}

/// A matched document formatted for LLM consumption
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DocumentMatch {
    pub content: String,
    pub course_name: String,
    pub relevance_score: f32,
    pub source_id: String,
}

/// Result of a document search
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResponse {
    pub status: SearchStatus,
    pub message: String,
    pub documents: Vec<DocumentMatch>,
    pub total_found: usize,
    pub query_used: String,
}

impl SearchResponse {
    fn error(message: String, query_used: String) -> Self {
        Self {
            status: SearchStatus::Error,
            message,
            documents: Vec::new(),
            total_found: 0,
            query_used,
        }
    }
}

/// Result of an eligibility-oriented search
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EligibilityResponse {
    pub status: SearchStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub program_name: String,
    pub student_background: String,
    pub requirements_found: Vec<DocumentMatch>,
    pub policies_found: Vec<DocumentMatch>,
    pub all_documents: Vec<DocumentMatch>,
    pub total_documents: usize,
    pub search_query: String,
}

/// Health of the retrieval stack
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthStatus {
    pub qdrant_connected: bool,
    pub embedding_api_configured: bool,
    pub collection_exists: bool,
    pub errors: Vec<String>,
}

/// Retrieval pipeline over an embedder and a vector index.
///
/// Dependencies are injected explicitly; there is no process-wide instance.
pub struct RagPipeline {
    embedder: Arc<dyn Embedder>,
    index: Arc<dyn VectorIndex>,
    default_limit: usize,
    score_threshold: f32,
    eligibility_limit: usize,
}

impl RagPipeline {
    pub fn new(embedder: Arc<dyn Embedder>, index: Arc<dyn VectorIndex>, query: &QueryConfig) -> Self {
        Self {
            embedder,
            index,
            default_limit: query.default_limit,
            score_threshold: query.score_threshold,
            eligibility_limit: query.eligibility_limit,
        }
    }

    /// Embed and store one knowledge-base chunk. Returns false when
    /// embedding fails or the upsert errors; never raises.
    pub async fn ingest_chunk(&self, chunk: &Chunk) -> bool {
        let text = chunk.display_text();
        if text.trim().is_empty() {
            warn!("Empty text provided for document chunk");
            return false;
        }

        let Some(vector) = self.embedder.embed(&text).await else {
            warn!("Failed to generate embedding for document chunk");
            return false;
        };

        let payload = ChunkPayload {
            text,
            course_name: chunk.course_name.clone(),
            chunk_id: chunk.chunk_id.clone(),
            level: chunk.level.clone(),
            kind: chunk.kind.clone(),
        };

        let id = point_id(&payload.chunk_id, &payload.text, &payload.course_name);

        match self.index.upsert(id, vector, payload).await {
            Ok(()) => {
                info!("Stored document chunk for course: {}", chunk.course_name);
                true
            }
            Err(e) => {
                warn!("Error adding document chunk: {}", e);
                false
            }
        }
    }

    /// Search course documents by similarity.
    ///
    /// A non-empty `filter` is appended to the query text before embedding.
    /// This is plain text enrichment, not structured filtering - a deliberate
    /// simplification carried over from the reference deployment.
    pub async fn search_documents(
        &self,
        query: &str,
        filter: &str,
        limit: Option<usize>,
    ) -> SearchResponse {
        let limit = limit.unwrap_or(self.default_limit);

        let enhanced_query = if filter.trim().is_empty() {
            query.to_string()
        } else {
            format!("{} {}", query, filter.trim())
        };

        if query.trim().is_empty() {
            warn!("Empty query text provided");
            return SearchResponse {
                status: SearchStatus::NoResults,
                message: "Empty query text provided".to_string(),
                documents: Vec::new(),
                total_found: 0,
                query_used: enhanced_query,
            };
        }

        // Lazy init so a fresh deployment can serve its first query
        if let Err(e) = self.index.ensure_collection().await {
            warn!("Collection initialization failed: {}", e);
        }

        let Some(vector) = self.embedder.embed(&enhanced_query).await else {
            return SearchResponse::error(
                "Failed to generate embedding for query".to_string(),
                enhanced_query,
            );
        };

        let results = match self.index.search(vector, limit, self.score_threshold).await {
            Ok(results) => results,
            Err(e) => {
                warn!("Vector search failed: {}", e);
                return SearchResponse::error(
                    format!("Error searching course documents: {}", e),
                    enhanced_query,
                );
            }
        };

        // The score floor holds no matter what the index returned
        let documents: Vec<DocumentMatch> = results
            .into_iter()
            .filter(|r| r.score >= self.score_threshold)
            .take(limit)
            .map(|r| DocumentMatch {
                content: r.text,
                course_name: r.course_name,
                relevance_score: (r.score * 1000.0).round() / 1000.0,
                source_id: r.id.to_string(),
            })
            .collect();

        if documents.is_empty() {
            return SearchResponse {
                status: SearchStatus::NoResults,
                message: format!("No relevant documents found for query: '{}'", query),
                documents: Vec::new(),
                total_found: 0,
                query_used: enhanced_query,
            };
        }

        info!(
            "Found {} relevant documents for query '{}'",
            documents.len(),
            query
        );

        SearchResponse {
            status: SearchStatus::Success,
            message: format!("Found {} relevant documents", documents.len()),
            total_found: documents.len(),
            documents,
            query_used: enhanced_query,
        }
    }

    /// Search eligibility requirements for a program given a student's
    /// background, partitioning hits into requirements and policies.
    pub async fn search_eligibility(
        &self,
        student_background: &str,
        program_name: &str,
    ) -> EligibilityResponse {
        let eligibility_query = format!(
            "eligibility requirements admission criteria {} {}",
            program_name, student_background
        );

        let search_result = self
            .search_documents(&eligibility_query, program_name, Some(self.eligibility_limit))
            .await;

        if search_result.status != SearchStatus::Success {
            return EligibilityResponse {
                status: search_result.status,
                message: Some(search_result.message),
                program_name: program_name.to_string(),
                student_background: student_background.to_string(),
                requirements_found: Vec::new(),
                policies_found: Vec::new(),
                all_documents: Vec::new(),
                total_documents: 0,
                search_query: eligibility_query,
            };
        }

        let mut requirements = Vec::new();
        let mut policies = Vec::new();

        for doc in &search_result.documents {
            let content = doc.content.to_lowercase();
            if REQUIREMENT_KEYWORDS.iter().any(|k| content.contains(k)) {
                requirements.push(doc.clone());
            } else if POLICY_KEYWORDS.iter().any(|k| content.contains(k)) {
                policies.push(doc.clone());
            }
        }

        EligibilityResponse {
            status: SearchStatus::Success,
            message: None,
            program_name: program_name.to_string(),
            student_background: student_background.to_string(),
            requirements_found: requirements,
            policies_found: policies,
            total_documents: search_result.total_found,
            all_documents: search_result.documents,
            search_query: eligibility_query,
        }
    }

    /// Report health of the retrieval stack; never raises
    pub async fn health_check(&self) -> HealthStatus {
        let index_health = self.index.health().await;
        let embedding_api_configured = self.embedder.api_key_present();

        let mut errors = index_health.errors;
        if !embedding_api_configured {
            errors.push("Embedding API key not configured".to_string());
        }

        HealthStatus {
            qdrant_connected: index_health.connected,
            embedding_api_configured,
            collection_exists: index_health.collection_exists,
            errors,
        }
    }
}
