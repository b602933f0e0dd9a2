use std::io::BufRead;

use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use cinema_client::models::OutboundRequest;
use cinema_client::storage::FileStore;
use cinema_client::{AnnotationStore, ApiClient, ClientConfig};

#[derive(Parser)]
#[command(name = "cinema")]
#[command(about = "Authenticated client for the cinema API")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Send a request through the authenticated client
    Request {
        /// HTTP method (GET, POST, ...)
        method: String,

        /// Path relative to the base URL, or an absolute URL
        url: String,

        /// Extra header as `name:value` (repeatable)
        #[arg(short = 'H', long = "header")]
        headers: Vec<String>,

        /// JSON request body
        #[arg(short, long)]
        data: Option<String>,
    },
    /// Manage the stored credential
    Token {
        #[command(subcommand)]
        action: TokenAction,
    },
    /// Read comments from stdin, one per line, and print the thread
    Comments {
        /// Start from the sample comments instead of an empty thread
        #[arg(long)]
        seed: bool,
    },
}

#[derive(Subcommand)]
enum TokenAction {
    /// Store a credential
    Set { value: String },
    /// Remove the stored credential
    Clear,
    /// Show the stored credential (masked)
    Show,
}

/// Log to stderr so stdout only carries command output.
fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::new(
        std::env::var("RUST_LOG").unwrap_or_else(|_| "cinema_client=info".into()),
    );

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

/// Tokens shorter than this are fully masked.
const MASK_REVEAL_MIN_CHARS: usize = 12;
const MASK_PREFIX_CHARS: usize = 4;

fn mask(token: &str) -> String {
    let count = token.chars().count();
    if count < MASK_REVEAL_MIN_CHARS {
        return "*".repeat(count);
    }
    let prefix: String = token.chars().take(MASK_PREFIX_CHARS).collect();
    format!("{}{}", prefix, "*".repeat(count - MASK_PREFIX_CHARS))
}

fn parse_header(raw: &str) -> anyhow::Result<(&str, &str)> {
    let (name, value) = raw
        .split_once(':')
        .ok_or_else(|| anyhow::anyhow!("header must be `name:value`, got `{}`", raw))?;
    Ok((name.trim(), value.trim()))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing();

    let config = ClientConfig::from_env();

    match cli.command {
        Commands::Request {
            method,
            url,
            headers,
            data,
        } => {
            let client = ApiClient::from_config(&config)?;

            let mut request = OutboundRequest::parse(&method, url)?;
            for raw in &headers {
                let (name, value) = parse_header(raw)?;
                request.set_header(name, value)?;
            }
            if let Some(data) = data {
                let body: serde_json::Value = serde_json::from_str(&data)?;
                request.set_json(&body)?;
            }

            let response = client.send(request).await?;
            println!("{}", response.status);
            println!("{}", response.text());
        }
        Commands::Token { action } => {
            let store = FileStore::from_config(&config)?;
            let key = &config.token_key;
            match action {
                TokenAction::Set { value } => {
                    store.set(key, &value).await?;
                    println!("Credential stored in {}", store.path().display());
                }
                TokenAction::Clear => {
                    if store.remove(key).await? {
                        println!("Credential removed");
                    } else {
                        println!("No credential stored");
                    }
                }
                TokenAction::Show => {
                    use cinema_client::storage::CredentialStore;
                    match store.get(key).await? {
                        Some(token) if !token.is_empty() => println!("{}", mask(&token)),
                        _ => println!("No credential stored"),
                    }
                }
            }
        }
        Commands::Comments { seed } => {
            let mut thread = if seed {
                AnnotationStore::with_sample_comments()
            } else {
                AnnotationStore::new()
            };

            for line in std::io::stdin().lock().lines() {
                thread.edit(line?);
                if thread.submit().is_none() {
                    tracing::debug!("skipped blank comment");
                }
            }

            for comment in thread.entries() {
                println!("{}", comment);
            }
        }
    }

    Ok(())
}
