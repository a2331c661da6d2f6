use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use futures::future::join_all;
use serde_json::{json, Value};
use tracing::warn;

use storefront_client::config::{config_schema, load_config, DEFAULT_CONFIG_PATH};
use storefront_client::feedback::Notifier;
use storefront_client::models::Credentials;
use storefront_client::session::AuthSession;
use storefront_client::startup;
use storefront_client::state::AppState;
use storefront_client::utils::init_logging;

/// Command-line client for the storefront API
#[derive(Parser, Debug)]
#[command(name = "storefront")]
#[command(about = "Talks to the storefront API, refreshing the session as needed", long_about = None)]
struct Args {
    /// Path to the YAML configuration file
    #[arg(short, long, default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    /// Print Prometheus metrics to stdout after the command
    #[arg(long)]
    metrics: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the JSON schema of the configuration file
    Schema,
    #[command(flatten)]
    Session(SessionCommand),
}

/// Commands that need a configured client.
#[derive(Subcommand, Debug)]
enum SessionCommand {
    /// Sign in and store the session
    Login {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },
    /// Fetch one or more API paths concurrently and print the JSON bodies
    Get {
        #[arg(required = true)]
        paths: Vec<String>,
    },
    /// Sign out and forget the stored session
    Logout,
    /// Show whether a session is stored
    Status,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let command = match args.command {
        Command::Schema => {
            println!("{}", config_schema()?);
            return Ok(());
        }
        Command::Session(command) => command,
    };

    let config = load_config(&args.config)
        .with_context(|| format!("loading {}", args.config.display()))?;
    init_logging(&config.logging)?;
    let state = startup::build(Arc::new(config))?;

    let result = run(&state, command).await;

    if args.metrics {
        print!("{}", state.metrics.render());
    }
    result
}

async fn run(state: &AppState, command: SessionCommand) -> Result<()> {
    match command {
        SessionCommand::Login { email, password } => {
            let token = state
                .session
                .login(&Credentials { email, password })
                .await?;
            if let Err(e) = state
                .notifier
                .show_success_toast("Signed in", "Your session has been stored")
                .await
            {
                warn!("Failed to show toast: {}", e);
            }
            println!("{}", serde_json::to_string_pretty(&json!({ "user": token.user }))?);
        }
        SessionCommand::Get { paths } => {
            let results =
                join_all(paths.iter().map(|path| state.client.get_json::<Value>(path))).await;

            let mut failed = 0;
            for (path, result) in paths.iter().zip(results) {
                let line = match result {
                    Ok(body) => json!({ "path": path, "body": body }),
                    Err(e) => {
                        failed += 1;
                        json!({ "path": path, "error": e.to_string() })
                    }
                };
                println!("{}", line);
            }
            if failed > 0 {
                bail!("{} of {} requests failed", failed, paths.len());
            }
        }
        SessionCommand::Logout => {
            state.session.logout().await?;
            println!("Signed out");
        }
        SessionCommand::Status => {
            let logged_in = state.session.is_logged_in().await;
            let user = match state.session.current().await? {
                Some(token) => token.user,
                None => None,
            };
            println!(
                "{}",
                serde_json::to_string_pretty(&json!({
                    "logged_in": logged_in,
                    "persistent": state.store.is_persistent(),
                    "user": user,
                }))?
            );
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schema_needs_no_session() {
        let args = Args::try_parse_from(["storefront", "schema"]).unwrap();
        assert!(matches!(args.command, Command::Schema));
    }

    #[test]
    fn test_session_commands_parse() {
        let args =
            Args::try_parse_from(["storefront", "--metrics", "get", "/api/v1/orders", "/api/v1/profile"])
                .unwrap();
        assert!(args.metrics);
        match args.command {
            Command::Session(SessionCommand::Get { paths }) => {
                assert_eq!(paths, vec!["/api/v1/orders", "/api/v1/profile"])
            }
            other => panic!("unexpected command {:?}", other),
        }
    }
}
