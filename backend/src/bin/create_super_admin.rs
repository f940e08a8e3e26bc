//! Create a super admin account.
//!
//! # Usage
//!
//! ```bash
//! # Prompts for anything not given on the command line
//! cargo run --bin create-super-admin -- --email root@example.com
//!
//! # Against MongoDB
//! REPOSITORY_TYPE=mongo MONGODB_URL=mongodb://localhost:27017 \
//!   cargo run --bin create-super-admin --features mongo-repo -- --email root@example.com
//! ```
//!
//! With the local backend the seed file (`LOCAL_SEED_PATH`) is loaded,
//! updated and written back.

use std::io::{self, BufRead, Write};
use std::sync::Arc;

use anyhow::{anyhow, bail, Context};
use clap::Parser;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use lineup_analytics::auth::{AuthError, AuthService};
use lineup_analytics::config::AppConfig;
use lineup_analytics::db::{LocalRepository, RepositoryFactory, RepositoryType};

#[derive(Parser, Debug)]
#[command(name = "create-super-admin", about = "Create a super admin account")]
struct Args {
    /// Admin email; prompted for when omitted
    #[arg(long)]
    email: Option<String>,

    /// Admin password; prompted for when omitted
    #[arg(long)]
    password: Option<String>,
}

fn prompt(label: &str) -> anyhow::Result<String> {
    print!("{}: ", label);
    io::stdout().flush()?;
    let mut line = String::new();
    io::stdin().lock().read_line(&mut line)?;
    let value = line.trim().to_string();
    if value.is_empty() {
        bail!("{} must not be empty", label);
    }
    Ok(value)
}

async fn create(auth: &AuthService, email: &str, password: &str) -> anyhow::Result<()> {
    match auth.create_admin(email, password, true).await {
        Ok(id) => {
            info!("Super admin {} created with id {}", email, id);
            Ok(())
        }
        Err(AuthError::DuplicateAdmin(email)) => bail!("Admin with email {} already exists", email),
        Err(e) => Err(e.into()),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    FmtSubscriber::builder().with_max_level(Level::INFO).init();

    let args = Args::parse();
    let email = match args.email {
        Some(email) => email,
        None => prompt("Enter super admin email")?,
    };
    let password = match args.password {
        Some(password) => password,
        None => prompt("Enter super admin password")?,
    };

    let config = AppConfig::load()?;

    match config.repository.repository_type()? {
        RepositoryType::Local => {
            let path = config
                .repository
                .seed_path
                .clone()
                .ok_or_else(|| anyhow!("LOCAL_SEED_PATH must be set to persist a local admin"))?;
            let local = if path.exists() {
                LocalRepository::from_snapshot_file(&path)?
            } else {
                LocalRepository::new()
            };

            let auth = AuthService::from_config(Arc::new(local.clone()), &config.auth);
            create(&auth, &email, &password).await?;

            local
                .write_snapshot_file(&path)
                .with_context(|| format!("writing {}", path.display()))?;
            info!("Saved {}", path.display());
        }
        RepositoryType::Mongo => {
            let repository = RepositoryFactory::create(&config.repository).await?;
            let auth = AuthService::from_config(repository, &config.auth);
            create(&auth, &email, &password).await?;
        }
    }

    Ok(())
}
