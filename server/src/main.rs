mod config;
mod graphql;
mod hr;
mod http;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use platform_obs::{ObsConfig, init_tracing};
use tracing::info;

use crate::{
    config::AppConfig,
    http::{AppState, ServeConfig},
};

#[derive(Parser, Debug)]
#[command(name = "hr-server", version, about = "HR employee intake service")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP + GraphQL server.
    Serve(ServeCommand),
    /// Print the GraphQL schema snapshot.
    #[command(name = "schema:print")]
    SchemaPrint {
        #[arg(long, value_name = "FILE", help = "Destination file path")]
        output: Option<PathBuf>,
    },
}

#[derive(Args, Debug)]
struct ServeCommand {
    #[arg(long, default_value = "0.0.0.0")]
    host: std::net::IpAddr,
    #[arg(long, default_value_t = 8080)]
    port: u16,
    #[arg(long, help = "Reject employee forms with blank fields")]
    strict: bool,
}

impl From<&ServeCommand> for ServeConfig {
    fn from(value: &ServeCommand) -> Self {
        ServeConfig::new(value.host, value.port)
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing(ObsConfig::from_env("hr-server")?)?;
    let cli = Cli::parse();
    let app_config = AppConfig::load()?;
    match cli.command {
        Command::Serve(cmd) => run_server(cmd, app_config).await,
        Command::SchemaPrint { output } => schema_print(output, app_config),
    }
}

fn schema_print(path: Option<PathBuf>, config: AppConfig) -> Result<()> {
    let state = AppState::new(Arc::new(config));
    let sdl = state.schema.sdl();
    match path {
        Some(target) => {
            std::fs::write(&target, sdl)
                .with_context(|| format!("failed to write {}", target.display()))?;
            info!(path = %target.display(), "schema snapshot written");
        }
        None => println!("{sdl}"),
    }
    Ok(())
}

async fn run_server(cmd: ServeCommand, mut config: AppConfig) -> Result<()> {
    if cmd.strict {
        config.require_all_fields = true;
    }
    info!(
        strict = config.require_all_fields,
        origins = ?config.cors_allowed_origins,
        "starting hr server"
    );
    let state = AppState::new(Arc::new(config));
    http::serve((&cmd).into(), state).await
}
