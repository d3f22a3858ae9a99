//! Status command implementation

use crate::config::Config;
use crate::rag::{HealthStatus, RagPipeline};
use crate::store::{CollectionInfo, QdrantStore};
use serde::Serialize;

/// Aggregated system status for display
#[derive(Debug, Clone, Serialize)]
pub struct StatusReport {
    pub qdrant_url: String,
    pub collection_name: String,
    pub embedding_api_url: String,
    pub health: HealthStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub collection: Option<CollectionInfo>,
}

/// Collect system status: connectivity, credentials, collection state
pub async fn cmd_status(
    config: &Config,
    rag: &RagPipeline,
    store: &QdrantStore,
) -> StatusReport {
    let health = rag.health_check().await;

    let collection = if health.collection_exists {
        store.collection_info().await.ok().flatten()
    } else {
        None
    };

    StatusReport {
        qdrant_url: config.qdrant_url.clone(),
        collection_name: config.collection_name.clone(),
        embedding_api_url: config.embedding.api_url.clone(),
        health,
        collection,
    }
}

/// Print status report to console
pub fn print_status(report: &StatusReport) {
    println!("\n📊 Registrar status\n");
    println!("Qdrant:        {}", report.qdrant_url);
    println!("Collection:    {}", report.collection_name);
    println!("Embedding API: {}", report.embedding_api_url);
    println!();
    println!(
        "  Qdrant connected:      {}",
        check(report.health.qdrant_connected)
    );
    println!(
        "  Collection exists:     {}",
        check(report.health.collection_exists)
    );
    println!(
        "  Embedding configured:  {}",
        check(report.health.embedding_api_configured)
    );

    if let Some(info) = &report.collection {
        println!("\n  Points indexed: {}", info.points_count);
        println!("  Collection status: {}", info.status);
    }

    if !report.health.errors.is_empty() {
        println!("\n⚠ Problems:");
        for error in &report.health.errors {
            println!("   • {}", error);
        }
    }
}

fn check(ok: bool) -> &'static str {
    if ok {
        "✓"
    } else {
        "✗"
    }
}
