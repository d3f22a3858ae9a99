//! Default values for configuration

/// Default Qdrant gRPC URL for local development (port 6334, not 6333 REST)
pub fn default_qdrant_url() -> String {
    std::env::var("QDRANT_URL").unwrap_or_else(|_| "http://127.0.0.1:6334".to_string())
}

/// Default environment variable name for Qdrant API key
pub fn default_qdrant_api_key_env() -> String {
    "QDRANT_API_KEY".to_string()
}

/// Default collection name
pub fn default_collection_name() -> String {
    "course_chunks".to_string()
}

/// Default embedding service URL (BAAI/bge-large-en-v1.5 inference endpoint)
pub fn default_embedding_api_url() -> String {
    std::env::var("EMBEDDING_API_URL")
        .unwrap_or_else(|_| "https://api.deepinfra.com/v1/inference/BAAI/bge-large-en-v1.5".to_string())
}

/// Default environment variable name for the embedding API key
pub fn default_embedding_api_key_env() -> String {
    "EMBEDDING_API_KEY".to_string()
}

/// Default embedding request timeout in seconds
pub fn default_embedding_timeout() -> u64 {
    30
}

/// Default embedding dimension (bge-large-en-v1.5)
pub fn default_embedding_dimension() -> usize {
    1024
}

/// Default input character budget (conservative estimate for the model's 512 token limit)
pub fn default_embedding_max_chars() -> usize {
    2000
}

/// Default number of query results
pub fn default_query_limit() -> usize {
    5
}

/// Default minimum similarity score
pub fn default_score_threshold() -> f32 {
    0.6
}

/// Default result window for eligibility queries
pub fn default_eligibility_limit() -> usize {
    7
}

/// Default profile data file name (relative to the base directory)
pub fn default_profile_data_file() -> String {
    "user_data.json".to_string()
}

/// Default lock acquisition timeout in seconds
pub fn default_profile_lock_timeout() -> u64 {
    5
}
