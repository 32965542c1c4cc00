use std::path::PathBuf;

use clap::Parser;
use clap::Subcommand;
use docrag::config::AppConfig;
use docrag::rag::RagService;
use docrag::rag::RetrievalMode;
use docrag::store::VectorStore;
use docrag::Result;
use tracing::info;

#[derive(Parser)]
#[command(name = "docrag")]
#[command(about = "Document question answering over a pgvector index")]
#[command(version)]
struct Cli {
    /// Enable verbose debug logging
    #[arg(short, long)]
    verbose: bool,

    /// Path to the configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize the database schema
    Init,
    /// Ingest documents into the index
    Ingest {
        /// Files or directories to ingest (.txt and .md)
        paths: Vec<PathBuf>,
    },
    /// Ask a question from the command line
    Ask {
        /// The question to answer
        question: String,
        /// Retrieval mode: basic, delimiter, or dual
        #[arg(short, long, default_value = "dual")]
        mode: String,
        /// Override the configured LLM model
        #[arg(long)]
        model: Option<String>,
        /// Show the supporting chunks alongside the answer
        #[arg(long)]
        show_matches: bool,
        /// Skip the answer cache
        #[arg(long)]
        no_cache: bool,
    },
    /// Start the API server
    Serve {
        /// Host to bind (overrides config)
        #[arg(long)]
        host: Option<String>,
        /// Port to bind (overrides config)
        #[arg(long)]
        port: Option<u16>,
        /// Enable CORS
        #[arg(long)]
        cors: bool,
    },
    /// Show index statistics
    Stats,
    /// Delete indexed chunks
    Clear {
        /// Collection to clear: basic, delimiter, or all
        #[arg(long, default_value = "all")]
        collection: String,
        /// Skip confirmation prompt
        #[arg(short, long)]
        force: bool,
    },
    /// Print the resolved configuration
    Config,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    if cli.verbose {
        docrag::logging::init_logging_with_level("debug")?;
    } else {
        docrag::logging::init_logging()?;
    }

    let config = match &cli.config {
        Some(path) => AppConfig::from_file(path)?,
        None => AppConfig::load()?,
    };

    match cli.command {
        Commands::Init => {
            let store = VectorStore::from_config(&config).await?;
            store.init_schema().await?;
            println!("Schema initialized");
        }
        Commands::Ingest { paths } => {
            if paths.is_empty() {
                println!("Nothing to ingest: no paths given");
                return Ok(());
            }

            let store = VectorStore::from_config(&config).await?;
            store.init_schema().await?;
            let rag = RagService::new(&config, store)?;

            let files = collect_files(&paths)?;
            if files.is_empty() {
                println!("No .txt or .md files found under the given paths");
                return Ok(());
            }

            let mut total = 0i64;
            for file in &files {
                match rag.index_file(file).await {
                    Ok(counts) => {
                        println!(
                            "{}: {} chunks ({} basic, {} delimiter)",
                            file.display(),
                            counts.total,
                            counts.basic,
                            counts.delimiter
                        );
                        total += counts.total;
                    }
                    Err(e) => {
                        eprintln!("Skipping {}: {}", file.display(), e);
                    }
                }
            }
            println!("Ingested {} chunks from {} files", total, files.len());
        }
        Commands::Ask {
            question,
            mode,
            model,
            show_matches,
            no_cache,
        } => {
            let store = VectorStore::from_config(&config).await?;
            let rag = RagService::new(&config, store)?;

            let response = rag
                .ask_with_cache(
                    &question,
                    RetrievalMode::parse(&mode),
                    model.as_deref(),
                    !no_cache,
                )
                .await?;

            println!("{}", response.answer);
            println!();
            if response.low_confidence {
                println!(
                    "(low confidence: best match {:.1}%)",
                    response.top_similarity * 100.0
                );
            }
            if show_matches {
                for m in &response.matches {
                    println!(
                        "  #{} [{}] {} ({})",
                        m.rank, m.score_percent, m.source, m.search_source
                    );
                }
            }
            println!(
                "(model: {}, retrieval {}ms, generation {}ms, total {}ms{})",
                response.model_used,
                response.timings.retrieval_ms,
                response.timings.generation_ms,
                response.timings.total_ms,
                if response.from_cache { ", cached" } else { "" }
            );
        }
        Commands::Serve { host, port, cors } => {
            let host = host.unwrap_or_else(|| config.server.host.clone());
            let port = port.unwrap_or(config.server.port);
            let enable_cors = cors || config.server.enable_cors;
            docrag::api::serve_api(&config, host, port, enable_cors).await?;
        }
        Commands::Stats => {
            let store = VectorStore::from_config(&config).await?;
            let counts = store.count_chunks().await?;
            println!("Indexed chunks:");
            println!("  basic:     {}", counts.basic);
            println!("  delimiter: {}", counts.delimiter);
            println!("  total:     {}", counts.total);
        }
        Commands::Clear { collection, force } => {
            if !force {
                println!("This deletes indexed chunks. Re-run with --force to confirm.");
                return Ok(());
            }
            let store = VectorStore::from_config(&config).await?;
            let deleted = match collection.as_str() {
                "all" => store.clear_all().await?,
                name => {
                    store
                        .clear_collection(docrag::documents::ChunkingStrategy::parse(name))
                        .await?
                }
            };
            println!("Deleted {deleted} chunks");
        }
        Commands::Config => {
            println!("database.url: {}", mask_url(config.database_url()));
            println!("embeddings.provider: {}", config.embeddings.provider);
            println!("embeddings.model: {}", config.embedding_model());
            println!("embeddings.dimension: {}", config.embedding_dimension());
            println!("llm.model: {}", config.llm_model());
            println!("llm.endpoint: {}", config.llm_endpoint());
            println!("chunking.chunk_size: {}", config.chunking.chunk_size);
            println!("chunking.chunk_overlap: {}", config.chunking.chunk_overlap);
            println!("chunking.delimiter: {}", config.chunk_delimiter());
            println!("retrieval.limit: {}", config.retrieval.retrieval_limit);
            println!("retrieval.threshold: {}", config.similarity_threshold());
            println!(
                "retrieval.max_context_length: {}",
                config.retrieval.max_context_length
            );
            println!("cache.enabled: {}", config.cache.enabled);
            println!("cache.ttl_hours: {}", config.cache.ttl_hours);
            println!(
                "server: {}:{} (cors: {})",
                config.server.host, config.server.port, config.server.enable_cors
            );
        }
    }

    Ok(())
}

/// Expand files and directories into a flat list of ingestable files
fn collect_files(paths: &[PathBuf]) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();

    for path in paths {
        if path.is_dir() {
            let mut entries: Vec<PathBuf> = std::fs::read_dir(path)?
                .filter_map(std::result::Result::ok)
                .map(|e| e.path())
                .filter(|p| {
                    p.is_file()
                        && matches!(
                            p.extension().and_then(|e| e.to_str()),
                            Some("txt" | "md")
                        )
                })
                .collect();
            entries.sort();
            files.extend(entries);
        } else {
            files.push(path.clone());
        }
    }

    info!("Collected {} files for ingestion", files.len());
    Ok(files)
}

/// Hide credentials in a database URL for display
fn mask_url(url: &str) -> String {
    match url::Url::parse(url) {
        Ok(mut parsed) => {
            if parsed.password().is_some() {
                let _ = parsed.set_password(Some("****"));
            }
            parsed.to_string()
        }
        Err(_) => url.to_string(),
    }
}
