//! Qdrant vector database integration
//!
//! This module wraps the Qdrant client and provides:
//! - Idempotent collection management
//! - Single-point upsert keyed by deterministic numeric ids
//! - Vector search with a hard score-threshold floor
//! - Health reporting that never raises past this boundary

mod payload;

pub use payload::*;

use crate::config::Config;
use crate::error::{Error, Result};
use async_trait::async_trait;
use qdrant_client::qdrant::{
    CreateCollectionBuilder, Distance, PointId, SearchPointsBuilder, UpsertPointsBuilder,
    VectorParamsBuilder,
};
use qdrant_client::Qdrant;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, error, info};

/// A search hit with its payload fields flattened out
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ScoredChunk {
    pub text: String,
    pub course_name: String,
    pub level: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub chunk_id: String,
    pub score: f32,
    pub id: u64,
}

/// Connectivity and collection state of the vector index
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IndexHealth {
    pub connected: bool,
    pub collection_exists: bool,
    pub errors: Vec<String>,
}

/// Information about the backing collection
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CollectionInfo {
    pub points_count: u64,
    pub status: String,
}

/// Seam over the remote vector index, used by the retrieval pipeline
#[async_trait]
pub trait VectorIndex: Send + Sync {
    /// Ensure the collection exists with the configured parameters
    async fn ensure_collection(&self) -> Result<()>;

    /// Check if the collection exists
    async fn collection_exists(&self) -> Result<bool>;

    /// Upsert a single vector point
    async fn upsert(&self, id: u64, vector: Vec<f32>, payload: ChunkPayload) -> Result<()>;

    /// Search for similar vectors; results are score-filtered and ranked
    async fn search(
        &self,
        vector: Vec<f32>,
        limit: usize,
        score_threshold: f32,
    ) -> Result<Vec<ScoredChunk>>;

    /// Probe connectivity and collection existence without raising
    async fn health(&self) -> IndexHealth;
}

/// Qdrant store handle
pub struct QdrantStore {
    client: Qdrant,
    collection: String,
    dimension: usize,
}

impl QdrantStore {
    /// Connect to Qdrant using config
    pub fn connect(config: &Config) -> Result<Self> {
        Self::new(
            &config.qdrant_url,
            config.qdrant_api_key(),
            &config.collection_name,
            config.embedding.dimension,
        )
    }

    /// Create a new store handle directly with URL and collection name
    pub fn new(
        url: &str,
        api_key: Option<String>,
        collection: &str,
        dimension: usize,
    ) -> Result<Self> {
        debug!("Connecting to Qdrant at {}", url);

        let client = Qdrant::from_url(url)
            .api_key(api_key)
            .skip_compatibility_check()
            .build()
            .map_err(|e| Error::Qdrant(e.to_string()))?;

        Ok(Self {
            client,
            collection: collection.to_string(),
            dimension,
        })
    }

    /// Get the expected vector dimension for this store
    pub fn dimension(&self) -> usize {
        self.dimension
    }

    /// Initialize the collection, reporting success as a boolean.
    ///
    /// Idempotent; failures are logged and absorbed at this boundary.
    pub async fn initialize_collection(&self) -> bool {
        match self.ensure_collection().await {
            Ok(()) => true,
            Err(e) => {
                error!("Error initializing collection: {}", e);
                false
            }
        }
    }

    /// Get collection info (point count, status)
    pub async fn collection_info(&self) -> Result<Option<CollectionInfo>> {
        if !self.client.collection_exists(&self.collection).await? {
            return Ok(None);
        }

        let info = self.client.collection_info(&self.collection).await?;
        Ok(info.result.map(|r| CollectionInfo {
            points_count: r.points_count.unwrap_or(0),
            status: format!("{:?}", r.status()),
        }))
    }
}

#[async_trait]
impl VectorIndex for QdrantStore {
    async fn ensure_collection(&self) -> Result<()> {
        let exists = self.client.collection_exists(&self.collection).await?;

        if exists {
            debug!("Collection {} already exists", self.collection);
            return Ok(());
        }

        info!(
            "Creating collection {} with dimension {}",
            self.collection, self.dimension
        );

        let vectors_config = VectorParamsBuilder::new(self.dimension as u64, Distance::Cosine);

        self.client
            .create_collection(
                CreateCollectionBuilder::new(&self.collection).vectors_config(vectors_config),
            )
            .await?;

        info!("Collection {} created successfully", self.collection);
        Ok(())
    }

    async fn collection_exists(&self) -> Result<bool> {
        let exists = self.client.collection_exists(&self.collection).await?;
        Ok(exists)
    }

    async fn upsert(&self, id: u64, vector: Vec<f32>, payload: ChunkPayload) -> Result<()> {
        if vector.len() != self.dimension {
            return Err(Error::Qdrant(format!(
                "Vector dimension mismatch for collection '{}': expected {}, got {}",
                self.collection,
                self.dimension,
                vector.len()
            )));
        }

        debug!(
            "Upserting point {} into collection {}",
            id, self.collection
        );

        let point = payload.to_point_struct(id, vector);
        self.client
            .upsert_points(UpsertPointsBuilder::new(&self.collection, vec![point]))
            .await?;

        Ok(())
    }

    async fn search(
        &self,
        vector: Vec<f32>,
        limit: usize,
        score_threshold: f32,
    ) -> Result<Vec<ScoredChunk>> {
        debug!(
            "Searching collection {} with limit {} and threshold {}",
            self.collection, limit, score_threshold
        );

        let search_builder = SearchPointsBuilder::new(&self.collection, vector, limit as u64)
            .score_threshold(score_threshold)
            .with_payload(true);

        let response = self.client.search_points(search_builder).await?;

        let mut results: Vec<ScoredChunk> = response
            .result
            .into_iter()
            .map(|p| {
                let payload: ChunkPayload = p
                    .payload
                    .into_iter()
                    .map(|(k, v)| (k, json_from_qdrant_value(v)))
                    .collect::<serde_json::Map<String, Value>>()
                    .into();

                ScoredChunk {
                    text: payload.text,
                    course_name: payload.course_name,
                    level: payload.level,
                    kind: payload.kind,
                    chunk_id: payload.chunk_id,
                    score: p.score,
                    id: point_id_to_u64(p.id),
                }
            })
            .collect();

        // The server already applies the threshold; enforce the floor and
        // ordering here as well so the contract holds regardless of backend.
        results.retain(|r| r.score >= score_threshold);
        results.sort_by(|a, b| b.score.total_cmp(&a.score));
        results.truncate(limit);

        Ok(results)
    }

    async fn health(&self) -> IndexHealth {
        let mut health = IndexHealth::default();

        match self.client.collection_exists(&self.collection).await {
            Ok(exists) => {
                health.connected = true;
                health.collection_exists = exists;
            }
            Err(e) => {
                health
                    .errors
                    .push(format!("Qdrant connection error: {}", e));
            }
        }

        health
    }
}

/// Convert a PointId to the numeric id space; UUID-form ids map to 0
fn point_id_to_u64(id: Option<PointId>) -> u64 {
    match id {
        Some(PointId {
            point_id_options: Some(qdrant_client::qdrant::point_id::PointIdOptions::Num(num)),
        }) => num,
        _ => 0,
    }
}

/// Convert Qdrant value to serde_json Value
fn json_from_qdrant_value(v: qdrant_client::qdrant::Value) -> Value {
    use qdrant_client::qdrant::value::Kind;

    match v.kind {
        Some(Kind::NullValue(_)) => Value::Null,
        Some(Kind::BoolValue(b)) => Value::Bool(b),
        Some(Kind::IntegerValue(i)) => Value::Number(i.into()),
        Some(Kind::DoubleValue(d)) => serde_json::Number::from_f64(d)
            .map(Value::Number)
            .unwrap_or(Value::Null),
        Some(Kind::StringValue(s)) => Value::String(s),
        Some(Kind::ListValue(list)) => Value::Array(
            list.values
                .into_iter()
                .map(json_from_qdrant_value)
                .collect(),
        ),
        Some(Kind::StructValue(s)) => Value::Object(
            s.fields
                .into_iter()
                .map(|(k, v)| (k, json_from_qdrant_value(v)))
                .collect(),
        ),
        None => Value::Null,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_upsert_rejects_dimension_mismatch() {
        let store = QdrantStore::new("http://127.0.0.1:6334", None, "test_collection", 3)
            .expect("store should initialize");

        let payload = ChunkPayload {
            text: "MBA - Overview\n\nA postgraduate business degree.".to_string(),
            course_name: "MBA".to_string(),
            chunk_id: "chunk_1_pg_overview".to_string(),
            level: "pg".to_string(),
            kind: "overview".to_string(),
        };

        let err = store
            .upsert(42, vec![0.1, 0.2], payload)
            .await
            .expect_err("should reject mismatched vector length");

        match err {
            Error::Qdrant(message) => assert!(message.contains("dimension mismatch")),
            other => panic!("expected qdrant error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_health_reports_unreachable_index() {
        // Port 9 (discard) is not a Qdrant server
        let store =
            QdrantStore::new("http://127.0.0.1:9", None, "test_collection", 3).unwrap();

        let health = store.health().await;
        assert!(!health.connected);
        assert!(!health.collection_exists);
        assert!(!health.errors.is_empty());
    }

    #[test]
    fn test_point_id_to_u64_handles_uuid_form() {
        let uuid_id = PointId {
            point_id_options: Some(qdrant_client::qdrant::point_id::PointIdOptions::Uuid(
                "not-a-number".to_string(),
            )),
        };
        assert_eq!(point_id_to_u64(Some(uuid_id)), 0);
        assert_eq!(point_id_to_u64(None), 0);
    }
}
