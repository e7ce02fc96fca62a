//! Command handlers for the pypas CLI
//!
//! This module implements the command handlers that coordinate between CLI
//! arguments and the core application functionality. Workspace commands go
//! through the [`ExerciseManager`]; `log` and `list` query the service
//! directly and render the answer.

use std::process::{self, ExitStatus};
use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};
use tracing::{debug, info};

use crate::app::{ExerciseManager, ListFilter, MessageKind, PypasClient};
use crate::auth::{authenticate, clear_token, get_auth_status, prompt_token, save_token};
use crate::cli::console::{frame_listing_lines, frame_log_lines, Terminal};
use crate::cli::{AuthArgs, ListArgs};
use crate::config::AppConfig;
use crate::errors::Result;

/// Build the service client from the loaded configuration
fn build_client(config: &AppConfig) -> Result<PypasClient> {
    let (client_config, endpoints, _) = config.to_runtime_config()?;
    Ok(PypasClient::new(client_config, endpoints)?)
}

/// Build a lifecycle manager bound to the current directory
fn build_manager(config: &AppConfig) -> Result<ExerciseManager<Terminal>> {
    let (client_config, endpoints, settings) = config.to_runtime_config()?;
    let client = PypasClient::new(client_config, endpoints)?;
    let workdir = std::env::current_dir()?;
    debug!("Working directory: {}", workdir.display());
    Ok(ExerciseManager::new(settings, client, Terminal::new(), workdir))
}

/// Token sent with requests that do not strictly require one
fn token_or_empty(config: &AppConfig) -> &str {
    config.token().unwrap_or_default()
}

/// Spinner shown while waiting for a service query
fn query_spinner(message: String) -> ProgressBar {
    let spinner = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::with_template("{spinner:.green} {msg}") {
        spinner.set_style(style.tick_strings(&["◐", "◓", "◑", "◒", "✔"]));
    }
    spinner.set_message(message);
    spinner.enable_steady_tick(Duration::from_millis(120));
    spinner
}

/// Propagate the exit code of a child process
fn exit_on_failure(status: ExitStatus) {
    if !status.success() {
        debug!("Child process finished with {}", status);
        process::exit(status.code().unwrap_or(1));
    }
}

/// Handle the get command
pub async fn handle_get(config: &AppConfig, exercise_slug: &str) -> Result<()> {
    info!("Getting exercise {}", exercise_slug);
    let manager = build_manager(config)?;
    manager.get(exercise_slug, token_or_empty(config)).await?;
    Ok(())
}

/// Handle the update command
pub async fn handle_update(config: &AppConfig, force: bool) -> Result<()> {
    info!("Updating exercise (force: {})", force);
    let manager = build_manager(config)?;
    manager.update(token_or_empty(config), force).await?;
    Ok(())
}

/// Handle the auth command
///
/// Validates the token with the service before storing it, so a rejected
/// token never replaces a working one.
pub async fn handle_auth(config: &AppConfig, args: AuthArgs) -> Result<()> {
    let terminal = Terminal::new();
    if args.status {
        let status = get_auth_status(&config.path);
        terminal.print(MessageKind::Info, &status.status_message());
        return Ok(());
    }

    let token = match args.token {
        Some(token) => token,
        None => prompt_token()?,
    };
    let client = build_client(config)?;
    let name = authenticate(&client, &token).await?;
    save_token(&config.path, &token)?;

    info!("Token stored in {}", config.path.display());
    terminal.print(
        MessageKind::Success,
        &format!("Welcome {}! You have been successfully authenticated", name),
    );
    Ok(())
}

/// Handle the unauth command
pub async fn handle_unauth(config: &AppConfig) -> Result<()> {
    let removed = clear_token(&config.path)?;
    debug!("Token removed: {}", removed);
    Terminal::new().print(
        MessageKind::Success,
        "You have been successfully unauthenticated",
    );
    Ok(())
}

/// Handle the zip command
pub async fn handle_zip(config: &AppConfig, verbose: bool) -> Result<()> {
    let manager = build_manager(config)?;
    manager.zip(verbose).await?;
    Ok(())
}

/// Handle the put command
pub async fn handle_put(config: &AppConfig) -> Result<()> {
    info!("Uploading exercise");
    let manager = build_manager(config)?;
    manager.put(config.token()).await?;
    Ok(())
}

/// Handle the test command
pub async fn handle_test(config: &AppConfig, args: &[String]) -> Result<()> {
    let manager = build_manager(config)?;
    let status = manager.test(args).await?;
    exit_on_failure(status);
    Ok(())
}

/// Handle the run command
pub async fn handle_run(config: &AppConfig) -> Result<()> {
    let manager = build_manager(config)?;
    let status = manager.run().await?;
    exit_on_failure(status);
    Ok(())
}

/// Handle the doc command
pub async fn handle_doc(config: &AppConfig) -> Result<()> {
    let manager = build_manager(config)?;
    let status = manager.open_docs().await?;
    exit_on_failure(status);
    Ok(())
}

/// Handle the pull command
pub async fn handle_pull(config: &AppConfig, item_slug: &str) -> Result<()> {
    info!("Pulling {}", item_slug);
    let manager = build_manager(config)?;
    manager.pull(item_slug, token_or_empty(config)).await?;
    Ok(())
}

/// Handle the log command
pub async fn handle_log(config: &AppConfig, frame: &str, verbose: bool) -> Result<()> {
    let client = build_client(config)?;
    let spinner = query_spinner(format!(
        "Getting log from: {}",
        client.endpoints().log
    ));
    let result = client
        .assignment_log(token_or_empty(config), frame, verbose)
        .await;
    spinner.finish_and_clear();
    let frames = result?;

    let terminal = Terminal::new();
    terminal.print(
        MessageKind::Warning,
        "Listing assignments only from active frames...",
    );
    if frames.is_empty() {
        terminal.print(
            MessageKind::Warning,
            "There's no assignments with the given criteria",
        );
    }
    for frame in &frames {
        for (kind, line) in frame_log_lines(frame, verbose) {
            terminal.print(kind, &line);
        }
    }
    Ok(())
}

/// Handle the list command
pub async fn handle_list(config: &AppConfig, args: &ListArgs) -> Result<()> {
    let client = build_client(config)?;
    let filter = ListFilter::from(args);
    let spinner = query_spinner(format!(
        "Getting exercise list from: {}",
        client.endpoints().list_exercises
    ));
    let result = client
        .list_exercises(token_or_empty(config), &filter)
        .await;
    spinner.finish_and_clear();
    let frames = result?;

    let terminal = Terminal::new();
    terminal.print(
        MessageKind::Warning,
        "Listing exercises only from active frames...",
    );
    for frame in &frames {
        for (kind, line) in frame_listing_lines(frame) {
            terminal.print(kind, &line);
        }
    }
    Ok(())
}
