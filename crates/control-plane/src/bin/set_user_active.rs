// CLI tool for activating or deactivating a user account.
// Run with: cargo run --bin set-user-active -- --help

use anyhow::{bail, Context, Result};
use pupillix_control_plane::api::validation::normalize_email;
use pupillix_control_plane::storage::{Database, UpdateUser};
use std::env;
use tracing_subscriber::EnvFilter;

#[derive(Debug, PartialEq, Eq)]
struct Args {
    email: String,
    active: bool,
}

impl Args {
    fn parse() -> Result<Self> {
        Self::parse_from(env::args().skip(1))
    }

    fn parse_from(args: impl IntoIterator<Item = String>) -> Result<Self> {
        let args: Vec<String> = args.into_iter().collect();
        let mut email = None;
        let mut active = None;
        let mut i = 0;

        while i < args.len() {
            match args[i].as_str() {
                "--email" | "-e" => {
                    i += 1;
                    let raw = args.get(i).context("--email requires a value")?;
                    email = Some(
                        normalize_email(raw)
                            .with_context(|| format!("Invalid email address: {raw}"))?,
                    );
                }
                "--active" => active = Some(true),
                "--inactive" => active = Some(false),
                "--help" | "-h" => {
                    print_help();
                    std::process::exit(0);
                }
                arg => {
                    eprintln!("Unknown argument: {}", arg);
                    print_help();
                    std::process::exit(1);
                }
            }
            i += 1;
        }

        let Some(email) = email else {
            bail!("--email is required");
        };
        let Some(active) = active else {
            bail!("one of --active or --inactive is required");
        };

        Ok(Self { email, active })
    }
}

fn print_help() {
    eprintln!(
        r#"
set-user-active - Activate or deactivate a user account

USAGE:
    set-user-active --email <EMAIL> (--active | --inactive)

OPTIONS:
    -e, --email <EMAIL>     Account email (case-insensitive)
        --active            Allow the account to log in again
        --inactive          Block login and all authenticated requests
    -h, --help              Show this help message

ENVIRONMENT:
    DATABASE_URL            PostgreSQL connection string (required)

NOTES:
    Tokens already issued stay valid until they expire, but every
    authenticated request re-checks the flag, so deactivation takes
    effect immediately.
"#
    );
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse()?;

    // Load environment
    if let Ok(path) = dotenvy::dotenv() {
        tracing::info!("Loaded .env from {:?}", path);
    }

    let database_url = env::var("DATABASE_URL").context("DATABASE_URL not set")?;
    let db = Database::from_url(&database_url)
        .await
        .context("Failed to connect to database")?;
    tracing::info!("Connected to database");

    let user = db
        .get_user_by_email(&args.email)
        .await?
        .with_context(|| format!("No user with email {}", args.email))?;

    if user.is_active == args.active {
        tracing::info!(user_id = %user.id, active = args.active, "Nothing to do");
        return Ok(());
    }

    db.update_user(
        user.id,
        UpdateUser {
            is_active: Some(args.active),
            ..Default::default()
        },
    )
    .await?;

    tracing::info!(
        user_id = %user.id,
        email = %user.email,
        active = args.active,
        "User updated"
    );
    Ok(())
}
