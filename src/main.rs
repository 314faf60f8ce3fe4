use std::fs;
use std::sync::Arc;

use anyhow::bail;
use clap::{Parser, Subcommand};
use rand::Rng;
use rand::distributions::Alphanumeric;
use tracing::info;
use tracing_subscriber::EnvFilter;

use mailshare::auth::PasswordHasher;
use mailshare::config::ServerConfig;
use mailshare::server::{AppState, create_router};
use mailshare::store::{NewUser, SqliteStore, Store};
use mailshare::types::Role;

#[derive(Parser)]
#[command(name = "mailshare")]
#[command(about = "An email-inbox-sharing admin server", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Administrative commands
    Admin {
        #[command(subcommand)]
        command: AdminCommands,
    },

    /// Start the server
    Serve {
        /// Host to bind to
        #[arg(long, default_value = "127.0.0.1")]
        host: String,

        /// Port to bind to
        #[arg(long, short, default_value = "8080")]
        port: u16,

        /// Data directory for the database
        #[arg(long, default_value = "./data")]
        data_dir: String,
    },
}

#[derive(Subcommand)]
enum AdminCommands {
    /// Initialize the server (create database and superadmin account)
    Init {
        /// Data directory for the database
        #[arg(long, default_value = "./data")]
        data_dir: String,

        /// Skip interactive prompts
        #[arg(long)]
        non_interactive: bool,
    },
}

fn generate_password() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(20)
        .map(char::from)
        .collect()
}

fn run_init(data_dir: String, non_interactive: bool) -> anyhow::Result<()> {
    let data_path: std::path::PathBuf = data_dir.into();
    fs::create_dir_all(&data_path)?;

    let db_path = data_path.join("mailshare.db");
    let store = SqliteStore::new(&db_path)?;
    store.initialize()?;

    if store.has_superadmin()? {
        bail!(
            "Server already initialized. Database exists at: {}",
            db_path.display()
        );
    }

    let (username, password) = if non_interactive {
        ("admin".to_string(), generate_password())
    } else {
        prompt_superadmin_credentials()?
    };

    let hasher = PasswordHasher::new();
    let password_hash = hasher.hash(&password)?;

    let user = store.create_user(&NewUser {
        username: username.clone(),
        password_hash,
        role: Role::Superadmin,
        created_by_admin_id: None,
    })?;

    store.record_event(Some(user.id), "init", Some("superadmin created"))?;

    println!();
    println!("========================================");
    println!("Superadmin account '{username}' created.");
    if non_interactive {
        println!();
        println!("Generated password (save this, it won't be shown again):");
        println!();
        println!("  {password}");
    }
    println!();
    println!("Database written to: {}", db_path.display());
    println!("========================================");
    println!();

    Ok(())
}

fn prompt_superadmin_credentials() -> anyhow::Result<(String, String)> {
    let username = inquire::Text::new("Superadmin username:")
        .with_default("admin")
        .with_validator(|input: &str| {
            if input.trim().is_empty() {
                Err("Username cannot be empty".into())
            } else if input.contains(char::is_whitespace) {
                Err("Username cannot contain whitespace".into())
            } else {
                Ok(inquire::validator::Validation::Valid)
            }
        })
        .prompt()?;

    let password = inquire::Password::new("Superadmin password:")
        .with_validator(|input: &str| {
            if input.len() < 8 {
                Err("Password must be at least 8 characters".into())
            } else {
                Ok(inquire::validator::Validation::Valid)
            }
        })
        .prompt()?;

    Ok((username, password))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("mailshare=info".parse()?))
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Admin { command } => match command {
            AdminCommands::Init {
                data_dir,
                non_interactive,
            } => {
                run_init(data_dir, non_interactive)?;
            }
        },
        Commands::Serve {
            host,
            port,
            data_dir,
        } => {
            let config = ServerConfig {
                host,
                port,
                data_dir: data_dir.into(),
            };

            let db_path = config.db_path();
            if !db_path.exists() {
                bail!(
                    "Server not initialized. Run 'mailshare admin init' first to create the database and superadmin account."
                );
            }

            let store = SqliteStore::new(&db_path)?;
            if !store.has_superadmin()? {
                bail!(
                    "Server not initialized. Run 'mailshare admin init' first to create the database and superadmin account."
                );
            }

            let state = Arc::new(AppState::new(Arc::new(store)));

            let app = create_router(state);
            let addr = config.socket_addr()?;

            info!("Starting server on {}", addr);

            let listener = tokio::net::TcpListener::bind(addr).await?;
            axum::serve(listener, app).await?;
        }
    }

    Ok(())
}
