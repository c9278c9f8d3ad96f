use clap::Parser;
use clap::Subcommand;
use ragline::config::AppConfig;
use ragline::Result;
use tracing::info;

#[derive(Parser)]
#[command(name = "ragline")]
#[command(about = "Streaming retrieval-augmented chat server")]
#[command(version)]
struct Cli {
    /// Enable verbose debug logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the chat server
    Serve {
        /// Host to bind to (overrides configuration)
        #[arg(long)]
        host: Option<String>,
        /// Port to bind to (overrides configuration)
        #[arg(short, long)]
        port: Option<u16>,
        /// Enable permissive CORS (overrides configuration)
        #[arg(long)]
        cors: bool,
    },
    /// Show current configuration
    Config,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    if cli.verbose {
        ragline::logging::init_logging_with_level("debug")?;
    } else {
        ragline::logging::init_logging()?;
    }

    // Load configuration
    let config = AppConfig::load()?;
    info!("Configuration loaded successfully");

    // Execute the requested command
    match cli.command {
        Commands::Serve { host, port, cors } => {
            let host = host.unwrap_or_else(|| config.server_host().to_string());
            let port = port.unwrap_or_else(|| config.server_port());
            let cors = cors || config.cors_enabled();
            ragline::api::serve(&config, host, port, cors).await?;
        }
        Commands::Config => {
            handle_config_command(&config);
        }
    }

    Ok(())
}

fn handle_config_command(config: &AppConfig) {
    println!("📋 ragline Configuration:");
    println!();

    println!("🌐 Server:");
    println!("  Host: {}", config.server_host());
    println!("  Port: {}", config.server_port());
    println!("  CORS: {}", config.cors_enabled());
    println!("  Static dir: {}", config.static_dir());
    println!();

    println!("📝 Logging:");
    println!("  Level: {}", config.logging.level);
    println!("  Backtrace: {}", config.logging.backtrace);
    println!();

    println!("🧠 Embeddings:");
    println!("  Endpoint: {}", config.embeddings_endpoint());
    println!("  API key: {}", mask_key(config.embeddings_api_key()));
    println!("  Model: {}", config.embedding_model());
    println!("  Dimension: {}", config.embedding_dimension());
    println!("  Request timeout: {}s", config.embeddings_timeout_secs());
    println!();

    println!("🗂  Vector store:");
    println!("  Endpoint: {}", config.vector_store_endpoint());
    println!("  API key: {}", mask_key(config.vector_store_api_key()));
    println!("  Request timeout: {}s", config.vector_store_timeout_secs());
    println!();

    println!("💬 LLM:");
    println!("  Endpoint: {}", config.llm_endpoint());
    println!("  API key: {}", mask_key(config.llm_key()));
    println!("  Model: {}", config.llm_model());
    println!("  Connect timeout: {}s", config.llm_connect_timeout_secs());
}

/// Mask an API key for display (keep a short prefix)
fn mask_key(key: &str) -> String {
    if key.chars().count() <= 4 {
        "***".to_string()
    } else {
        let prefix: String = key.chars().take(4).collect();
        format!("{prefix}***")
    }
}
