//! registrar CLI entry point

use clap::{Parser, Subcommand};
use registrar::{
    commands::{
        cmd_eligibility, cmd_ingest, cmd_init, cmd_profile_show, cmd_profile_update, cmd_query,
        cmd_status, print_eligibility_response, print_ingest_stats, print_profile,
        print_search_response, print_status, print_update_result,
    },
    config::Config,
    embed::HttpEmbedder,
    error::Result,
    profile::{required_schema, ProfileStore},
    rag::RagPipeline,
    store::QdrantStore,
};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::error;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser)]
#[command(name = "registrar")]
#[command(version, about = "Admissions assistant core: knowledge base retrieval and applicant profiles", long_about = None)]
struct Cli {
    /// Path to config file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Output as JSON
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize registrar configuration and vector collection
    Init {
        /// Force overwrite existing config
        #[arg(long)]
        force: bool,
    },

    /// Ingest a knowledge base file into the vector index
    Ingest {
        /// Path to the chunk-delimited knowledge base file
        file: PathBuf,
    },

    /// Search course documents
    Query {
        /// The search query
        query: String,

        /// Program name to focus the search on
        #[arg(short, long, default_value = "")]
        filter: String,

        /// Maximum number of results
        #[arg(short, long)]
        limit: Option<usize>,
    },

    /// Check eligibility requirements for a program
    Eligibility {
        /// Student's academic background
        background: String,

        /// Program name
        program: String,
    },

    /// Show system status
    Status,

    /// Inspect and update applicant profiles
    Profile {
        #[command(subcommand)]
        action: ProfileAction,
    },

    /// Vector database management
    Db {
        #[command(subcommand)]
        action: DbAction,
    },
}

#[derive(Subcommand)]
enum ProfileAction {
    /// Update one profile field by dot-notation path
    Update {
        /// Phone number (primary identifier)
        phone: String,

        /// Dot notation field path (e.g. personal_info.full_name)
        field_path: String,

        /// Value to set (parsed as JSON when possible)
        value: String,

        /// Identifier recorded in the profile metadata
        #[arg(long, default_value = "cli")]
        agent_id: String,
    },

    /// Show a profile with its completeness accounting
    Show {
        /// Phone number (primary identifier)
        phone: String,
    },

    /// Print the required data schema
    Schema,
}

#[derive(Subcommand)]
enum DbAction {
    /// Create the vector collection if it does not exist
    Init,
}

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        error!("{}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"))
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    // Handle init command specially (doesn't need existing config)
    if let Commands::Init { force } = cli.command {
        let base_dir = cli.config.and_then(|p| p.parent().map(PathBuf::from));
        return cmd_init(base_dir, force).await;
    }

    // Load configuration
    let config = load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Init { .. } => unreachable!(),

        Commands::Ingest { file } => {
            let rag = build_pipeline(&config)?;
            let stats = cmd_ingest(&rag, &file).await?;

            if cli.json {
                println!("{}", serde_json::to_string_pretty(&stats)?);
            } else {
                print_ingest_stats(&stats);
            }
        }

        Commands::Query {
            query,
            filter,
            limit,
        } => {
            let rag = build_pipeline(&config)?;
            let response = cmd_query(&rag, &query, &filter, limit).await;

            if cli.json {
                println!("{}", serde_json::to_string_pretty(&response)?);
            } else {
                print_search_response(&response);
            }
        }

        Commands::Eligibility {
            background,
            program,
        } => {
            let rag = build_pipeline(&config)?;
            let response = cmd_eligibility(&rag, &background, &program).await;

            if cli.json {
                println!("{}", serde_json::to_string_pretty(&response)?);
            } else {
                print_eligibility_response(&response);
            }
        }

        Commands::Status => {
            let rag = build_pipeline(&config)?;
            let store = QdrantStore::connect(&config)?;
            let report = cmd_status(&config, &rag, &store).await;

            if cli.json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                print_status(&report);
            }
        }

        Commands::Profile { action } => {
            let store = ProfileStore::from_config(&config)?;

            match action {
                ProfileAction::Update {
                    phone,
                    field_path,
                    value,
                    agent_id,
                } => {
                    let result =
                        cmd_profile_update(&store, &phone, &field_path, &value, &agent_id);

                    if cli.json {
                        println!("{}", serde_json::to_string_pretty(&result)?);
                    } else {
                        print_update_result(&result);
                    }
                }

                ProfileAction::Show { phone } => {
                    let result = cmd_profile_show(&store, &phone);

                    if cli.json {
                        println!("{}", serde_json::to_string_pretty(&result)?);
                    } else {
                        print_profile(&result);
                    }
                }

                ProfileAction::Schema => {
                    println!("{}", serde_json::to_string_pretty(&required_schema())?);
                }
            }
        }

        Commands::Db { action } => match action {
            DbAction::Init => {
                let store = QdrantStore::connect(&config)?;
                if store.initialize_collection().await {
                    println!("✓ Collection '{}' ready", config.collection_name);
                } else {
                    eprintln!(
                        "✗ Could not initialize collection '{}'",
                        config.collection_name
                    );
                    std::process::exit(1);
                }
            }
        },
    }

    Ok(())
}

fn load_config(path: Option<&std::path::Path>) -> Result<Config> {
    let config_path = path
        .map(PathBuf::from)
        .unwrap_or_else(Config::default_config_path);

    if !config_path.exists() {
        eprintln!(
            "Config file not found: {}\nRun 'registrar init' first.",
            config_path.display()
        );
        std::process::exit(1);
    }

    Config::load(&config_path)
}

fn build_pipeline(config: &Config) -> Result<RagPipeline> {
    let embedder = HttpEmbedder::new(&config.embedding)?;
    let store = QdrantStore::connect(config)?;
    Ok(RagPipeline::new(
        Arc::new(embedder),
        Arc::new(store),
        &config.query,
    ))
}
