//! Init command implementation

use crate::config::Config;
use crate::error::{Error, Result};
use crate::store::QdrantStore;
use std::path::PathBuf;
use tracing::info;

/// Initialize registrar configuration, profile store, and vector collection
pub async fn cmd_init(base_dir: Option<PathBuf>, force: bool) -> Result<()> {
    let config = Config::with_base_dir(base_dir);

    // Check if already initialized
    if config.paths.config_file.exists() && !force {
        return Err(Error::AlreadyInitialized(
            config.paths.base_dir.display().to_string(),
        ));
    }

    std::fs::create_dir_all(&config.paths.base_dir)?;

    config.validate()?;
    config.save()?;
    info!("Created config at {:?}", config.paths.config_file);

    // Seed an empty profile store
    if !config.paths.profile_file.exists() {
        std::fs::write(&config.paths.profile_file, "{}")?;
        info!("Created profile store at {:?}", config.paths.profile_file);
    }

    // Try to reach Qdrant and create the collection
    match QdrantStore::connect(&config) {
        Ok(store) => {
            if store.initialize_collection().await {
                info!("Qdrant collection '{}' ready", config.collection_name);
            } else {
                tracing::warn!(
                    "Could not create Qdrant collection '{}'. You can create it later with 'registrar db init'.",
                    config.collection_name
                );
            }
        }
        Err(e) => {
            tracing::warn!(
                "Could not connect to Qdrant at {}: {}. Make sure Qdrant is running.",
                config.qdrant_url,
                e
            );
        }
    }

    println!("✓ Initialized registrar at {:?}", config.paths.base_dir);
    println!("\nConfiguration: {:?}", config.paths.config_file);
    println!("Profile store: {:?}", config.paths.profile_file);
    println!("\nNext steps:");
    println!("  export EMBEDDING_API_KEY=...                  # Embedding service credential");
    println!("  registrar ingest ./course_knowledge.txt       # Index the knowledge base");
    println!("  registrar query \"MBA entry requirements\"      # Search the index");

    Ok(())
}
