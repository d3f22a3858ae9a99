//! Payload schema and point identity for Qdrant points

use qdrant_client::qdrant::{PointStruct, Value as QdrantValue};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashMap;

/// Point ids live in [0, 10^10), matching the id space of the original
/// deployment. Collisions are possible and overwrite silently.
const POINT_ID_RANGE: u64 = 10_000_000_000;

/// Derive a deterministic point id from the chunk identity.
///
/// Hashes `chunk_id` when present, otherwise `text + course_name`. blake3
/// keeps the id stable across processes and re-ingestions; last-write-wins
/// on collision.
pub fn point_id(chunk_id: &str, text: &str, course_name: &str) -> u64 {
    let digest = if chunk_id.is_empty() {
        blake3::hash(format!("{}{}", text, course_name).as_bytes())
    } else {
        blake3::hash(chunk_id.as_bytes())
    };

    let mut bytes = [0u8; 8];
    bytes.copy_from_slice(&digest.as_bytes()[..8]);
    u64::from_le_bytes(bytes) % POINT_ID_RANGE
}

/// Payload stored with each chunk in Qdrant
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ChunkPayload {
    /// Embedded display text (title line plus content)
    pub text: String,

    /// Course or program name
    pub course_name: String,

    /// Source chunk identifier
    #[serde(default)]
    pub chunk_id: String,

    /// Course level (ug/pg/general)
    #[serde(default)]
    pub level: String,

    /// Content category
    #[serde(rename = "type", default)]
    pub kind: String,
}

impl ChunkPayload {
    /// Convert to Qdrant payload format
    pub fn to_qdrant_payload(&self) -> HashMap<String, QdrantValue> {
        let mut map = HashMap::new();
        map.insert("text".to_string(), string_to_qdrant(&self.text));
        map.insert("course_name".to_string(), string_to_qdrant(&self.course_name));
        map.insert("chunk_id".to_string(), string_to_qdrant(&self.chunk_id));
        map.insert("level".to_string(), string_to_qdrant(&self.level));
        map.insert("type".to_string(), string_to_qdrant(&self.kind));
        map
    }

    /// Build a PointStruct ready for upsert
    pub fn to_point_struct(&self, id: u64, vector: Vec<f32>) -> PointStruct {
        PointStruct::new(id, vector, self.to_qdrant_payload())
    }
}

fn string_to_qdrant(s: &str) -> QdrantValue {
    QdrantValue {
        kind: Some(qdrant_client::qdrant::value::Kind::StringValue(s.to_string())),
    }
}

impl From<Map<String, Value>> for ChunkPayload {
    fn from(map: Map<String, Value>) -> Self {
        serde_json::from_value(Value::Object(map)).unwrap_or_default()
    }
}
