use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use serde_json::Value;

use crate::app::{serve, AppState};
use crate::backend::SupabaseBackend;
use crate::config::AppConfig;

#[derive(Parser)]
#[command(name = "fatoreal-admin")]
#[command(about = "Fato Real admin dashboard - manage noticias and cadernos on a hosted Supabase project")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Start the dashboard server (default)")]
    Serve {
        #[arg(long, help = "Interface to bind, overrides SERVER_HOST")]
        host: Option<String>,

        #[arg(long, help = "Port to bind, overrides FATOREAL_PORT / PORT")]
        port: Option<u16>,
    },

    #[command(about = "Print the effective configuration with secrets masked")]
    Config,

    #[command(about = "Check a running instance's /health endpoint")]
    Health {
        #[arg(long, help = "Base URL of the instance, defaults to the configured host and port")]
        url: Option<String>,
    },
}

pub async fn run(cli: Cli, config: AppConfig) -> anyhow::Result<()> {
    match cli.command.unwrap_or(Commands::Serve { host: None, port: None }) {
        Commands::Serve { host, port } => {
            let host = host.unwrap_or_else(|| config.server.host.clone());
            let port = port.unwrap_or(config.server.port);

            tracing::info!("Starting Fato Real admin in {:?} mode", config.environment);
            let backend = SupabaseBackend::new(&config.supabase).context("cannot create Supabase client")?;
            let state = AppState::new(config, Arc::new(backend));
            serve(state, &host, port).await
        }
        Commands::Config => {
            println!("{}", serde_json::to_string_pretty(&config.redacted())?);
            Ok(())
        }
        Commands::Health { url } => {
            let base = url.unwrap_or_else(|| local_url(&config));
            check_health(&base).await
        }
    }
}

fn local_url(config: &AppConfig) -> String {
    let host = match config.server.host.as_str() {
        "0.0.0.0" | "::" => "127.0.0.1",
        other => other,
    };
    format!("http://{}:{}", host, config.server.port)
}

async fn check_health(base: &str) -> anyhow::Result<()> {
    let url = format!("{}/health", base.trim_end_matches('/'));
    let client = reqwest::Client::builder().timeout(Duration::from_secs(10)).build()?;

    let response = client
        .get(&url)
        .send()
        .await
        .with_context(|| format!("cannot reach {}", url))?;
    let status = response.status();
    let body: Value = response.json().await.unwrap_or(Value::Null);

    println!("{}", serde_json::to_string_pretty(&body)?);
    if !status.is_success() {
        bail!("{} answered {}", url, status);
    }
    Ok(())
}
