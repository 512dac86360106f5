use clap::Parser;
use tracing_subscriber::EnvFilter;

use fatoreal_admin::cli::{self, Cli};
use fatoreal_admin::config;

#[tokio::main]
async fn main() {
    // Load .env if present so SUPABASE_URL and friends are picked up locally
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("fatoreal_admin=info,tower_http=info")),
        )
        .init();

    let cli = Cli::parse();

    if let Err(e) = cli::run(cli, config::config().clone()).await {
        match std::env::var("FATOREAL_VERBOSE").as_deref() {
            Ok("true") | Ok("1") => eprintln!("Error: {e:?}"),
            _ => eprintln!("Error: {e}"),
        }
        std::process::exit(1);
    }
}
