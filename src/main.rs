//! parley - minimal Gemini chat service
//!
//! `parley serve` runs the HTTP API; `parley chat` opens a terminal client
//! against a running server.

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use std::time::Duration;
use tracing_subscriber::{EnvFilter, fmt};

use parley::client::HttpChatTransport;
use parley::config::{self, Config, resolve, resolve_opt};
use parley::llm::gemini::DEFAULT_BASE_URL;
use parley::repl::{Repl, colors};
use parley::server::{self, ServerSettings};

#[derive(Parser)]
#[command(name = "parley")]
#[command(about = "Chat with Gemini over HTTP or from the terminal")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run the HTTP API
    Serve(ServeArgs),
    /// Interactive chat against a running server
    Chat(ChatArgs),
}

#[derive(Args)]
struct ServeArgs {
    /// Bind address
    #[arg(long, env = "PARLEY_HOST")]
    host: Option<String>,

    /// HTTP server port (default: 3000)
    #[arg(long, env = "PORT")]
    port: Option<u16>,

    /// Gemini API key
    #[arg(long, env = "GEMINI_API_KEY", hide_env_values = true)]
    gemini_api_key: Option<String>,

    /// Gemini REST base URL
    #[arg(long, env = "GEMINI_BASE_URL")]
    gemini_base_url: Option<String>,

    /// Candidate models in priority order (comma separated)
    #[arg(long, env = "PARLEY_MODELS", value_delimiter = ',')]
    models: Option<Vec<String>>,

    /// Model request timeout in seconds
    #[arg(long, env = "PARLEY_REQUEST_TIMEOUT")]
    request_timeout_secs: Option<u64>,

    /// Supabase project URL for the message log
    #[arg(long, env = "SUPABASE_URL")]
    supabase_url: Option<String>,

    /// Supabase API key
    #[arg(long, env = "SUPABASE_KEY", hide_env_values = true)]
    supabase_key: Option<String>,
}

#[derive(Args)]
struct ChatArgs {
    /// Server to talk to
    #[arg(long, env = "PARLEY_SERVER_URL")]
    server_url: Option<String>,

    /// Directory for generated images
    #[arg(long, env = "PARLEY_IMAGE_DIR")]
    image_dir: Option<PathBuf>,

    /// User id attached to logged messages
    #[arg(long, env = "PARLEY_USER_ID")]
    user_id: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file (from ~/.parley/.env or current dir)
    let env_path = Some(config::config_dir().join(".env")).filter(|p| p.exists());
    if let Some(path) = env_path {
        let _ = dotenvy::from_path(&path);
    } else {
        let _ = dotenvy::dotenv();
    }

    // Initialize logging
    fmt().with_env_filter(EnvFilter::from_default_env()).init();

    let cli = Cli::parse();

    // Load config file (~/.parley/config.toml)
    let config = Config::load();

    // Resolve values: CLI args > env vars (handled by clap) > config file > defaults
    match cli.command {
        Command::Serve(args) => serve(args, config).await,
        Command::Chat(args) => chat(args, config).await,
    }
}

async fn serve(args: ServeArgs, config: Config) -> Result<()> {
    let supabase = match (
        resolve_opt(args.supabase_url, config.supabase_url),
        resolve_opt(args.supabase_key, config.supabase_key),
    ) {
        (Some(url), Some(key)) => Some((url, key)),
        _ => None,
    };

    let settings = ServerSettings {
        host: resolve(args.host, config.host, config::DEFAULT_HOST.to_string()),
        port: resolve(args.port, config.port, config::DEFAULT_PORT),
        api_key: resolve_opt(args.gemini_api_key, config.gemini_api_key).filter(|k| !k.trim().is_empty()),
        base_url: resolve(args.gemini_base_url, config.gemini_base_url, DEFAULT_BASE_URL.to_string()),
        models: resolve(args.models, config.models, Vec::new()),
        request_timeout: Duration::from_secs(resolve(
            args.request_timeout_secs,
            config.request_timeout_secs,
            config::DEFAULT_REQUEST_TIMEOUT_SECS,
        )),
        supabase,
    };

    server::run(settings).await
}

async fn chat(args: ChatArgs, config: Config) -> Result<()> {
    use colors::ansi::*;

    let server_url = resolve(args.server_url, config.server_url, config::DEFAULT_SERVER_URL.to_string());
    let image_dir = resolve_opt(args.image_dir, config.image_dir.map(PathBuf::from));

    println!();
    println!("{}{}  parley {}{}", BOLD, MAGENTA, env!("CARGO_PKG_VERSION"), RESET);
    println!("{}", colors::separator(50));
    println!("{}Server{}      {}", DIM, RESET, server_url);
    match &image_dir {
        Some(dir) => println!("{}Images{}      {}", DIM, RESET, dir.display()),
        None => println!("{}Images{}      {}summarised (set --image-dir to save){}", DIM, RESET, YELLOW, RESET),
    }
    println!();

    let mut transport = HttpChatTransport::new(&server_url);
    if let Some(user_id) = args.user_id {
        transport = transport.with_user_id(user_id);
    }

    let mut repl = Repl::new(transport, image_dir)?;
    repl.run().await
}
