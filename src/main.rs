//! todu-server - Self-hosted backend for the Todu todo tracker
//!
//! A small REST server that stores user accounts and todo items,
//! maintaining a dense priority ranking and a soft-delete trash.

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod api;
mod auth;
mod config;
mod db;
mod error;
mod models;
mod validate;

use config::Config;

#[derive(Parser)]
#[command(name = "todu-server")]
#[command(about = "Self-hosted backend for the Todu todo tracker")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the API server
    Serve {
        /// Config file path
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Port to listen on (overrides config)
        #[arg(short, long)]
        port: Option<u16>,

        /// Bind address (overrides config)
        #[arg(short, long)]
        bind: Option<String>,
    },

    /// Initialize a new config file with a generated auth secret
    Init {
        /// Output path for config file
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Create an account directly in the database
    AddUser {
        /// Email address for the new account
        #[arg(short, long)]
        email: String,

        /// Display name
        #[arg(short, long)]
        name: String,

        /// Password (signup rules apply)
        #[arg(short, long)]
        password: String,

        /// Config file path
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("todu_server=info".parse().unwrap()),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Serve { config, port, bind } => {
            let mut cfg = if let Some(path) = config {
                Config::load_from(&path)?
            } else {
                Config::load()?
            };

            // Override with CLI args
            if let Some(p) = port {
                cfg.server.port = p;
            }
            if let Some(b) = bind {
                cfg.server.bind = b;
            }

            if cfg.auth.secret.is_empty() {
                bail!(
                    "No auth secret configured. Run 'todu-server init' and point \
                     the server at the generated config."
                );
            }

            run_server(cfg).await
        }

        Commands::Init { output } => {
            let path = output.unwrap_or_else(|| PathBuf::from("config.toml"));
            let mut cfg = Config::default();
            cfg.auth.secret = generate_secret();
            cfg.save_to(&path)?;

            println!("Created config file: {}", path.display());
            println!();
            println!("Next steps:");
            println!(
                "  1. Create an account: todu-server add-user --email you@example.com \
                 --name You --password <password>"
            );
            println!(
                "  2. Start the server: todu-server serve --config {}",
                path.display()
            );

            Ok(())
        }

        Commands::AddUser {
            email,
            name,
            password,
            config,
        } => {
            let cfg = if let Some(path) = config {
                Config::load_from(&path)?
            } else {
                Config::load()?
            };

            validate::validate_email(&email).map_err(|e| anyhow::anyhow!(e.to_string()))?;
            validate::validate_password(&password).map_err(|e| anyhow::anyhow!(e.to_string()))?;
            validate::validate_name(&name).map_err(|e| anyhow::anyhow!(e.to_string()))?;

            let database =
                db::Database::open(&cfg.database.path).context("Failed to open database")?;
            let password_hash =
                auth::hash_password(&password).map_err(|e| anyhow::anyhow!(e.to_string()))?;
            let user = database
                .create_user(&email, &password_hash, &name)
                .map_err(|e| anyhow::anyhow!(e.to_string()))?;

            println!("Created user '{}' ({})", user.name, user.email);
            println!("User id: {}", user.id);

            Ok(())
        }
    }
}

async fn run_server(config: Config) -> Result<()> {
    let db = db::Database::open(&config.database.path).context("Failed to open database")?;

    let state = api::AppState::new(db, config.clone());
    let app = api::create_router(state);

    let addr = format!("{}:{}", config.server.bind, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!("🚀 todu-server listening on http://{}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}

fn generate_secret() -> String {
    use rand::Rng;
    let mut rng = rand::rng();
    let bytes: [u8; 48] = rng.random();

    const ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";

    bytes
        .iter()
        .map(|b| ALPHABET[(*b as usize) % ALPHABET.len()] as char)
        .collect()
}
