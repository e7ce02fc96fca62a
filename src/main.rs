//! pypas CLI application
//!
//! Command-line client for the pypas practical-assignments platform.
//! Downloads exercises, runs their tests, keeps them up to date and uploads
//! solutions.

use std::process;

use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

use pypas::app::MessageKind;
// Import CLI modules through the library (module is public but not re-exported)
use pypas::cli::{
    handle_auth, handle_doc, handle_get, handle_list, handle_log, handle_pull, handle_put,
    handle_run, handle_test, handle_unauth, handle_update, handle_zip, Cli, Commands, Terminal,
};
use pypas::config::AppConfig;
use pypas::errors::Result;

#[tokio::main(flavor = "current_thread")]
async fn main() {
    // Initialize program
    let result = run().await;

    // Handle any errors that occurred
    if let Err(e) = result {
        tracing::debug!("Command failed ({}): {:?}", e.category(), e);
        let terminal = Terminal::new();
        terminal.print(MessageKind::Error, &format!("Error: {}", e));
        if let Some(hint) = e.hint() {
            terminal.print(MessageKind::Warning, hint);
        }
        process::exit(1);
    }
}

/// Main application logic
async fn run() -> Result<()> {
    // Load environment variables from .env file if it exists
    dotenv::dotenv().ok(); // Ignore errors if file doesn't exist

    // Parse command line arguments
    let cli = Cli::parse_args();

    // Load configuration (file, then environment overrides)
    let config = AppConfig::load(cli.global.config.clone()).await?;

    // Initialize logging based on verbosity
    init_logging(&cli, &config);

    info!("pypas v{} starting", env!("CARGO_PKG_VERSION"));

    // Execute the appropriate command
    match cli.command {
        Commands::Get { exercise_slug } => handle_get(&config, &exercise_slug).await,
        Commands::Update { force } => handle_update(&config, force).await,
        Commands::Auth(args) => handle_auth(&config, args).await,
        Commands::Unauth => handle_unauth(&config).await,
        Commands::Zip { verbose } => handle_zip(&config, verbose).await,
        Commands::Put => handle_put(&config).await,
        Commands::Test { args } => handle_test(&config, &args).await,
        Commands::Log { frame, verbose } => handle_log(&config, &frame, verbose).await,
        Commands::List(args) => handle_list(&config, &args).await,
        Commands::Run => handle_run(&config).await,
        Commands::Pull { item_slug } => handle_pull(&config, &item_slug).await,
        Commands::Doc => handle_doc(&config).await,
    }
}

/// Initialize logging from the CLI flags, falling back to the configured level
fn init_logging(cli: &Cli, config: &AppConfig) {
    let log_level = cli
        .log_level()
        .map(|level| level.to_string().to_lowercase())
        .unwrap_or_else(|| config.logging.level.clone());

    // Create environment filter
    let filter = EnvFilter::from_default_env().add_directive(
        format!("pypas={}", log_level)
            .parse()
            .unwrap_or_else(|_| "pypas=warn".parse().expect("static directive is valid")),
    );

    // Initialize subscriber
    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .with_level(cli.global.debug) // Show levels only in debug mode
        .init();

    if cli.global.debug {
        info!("Debug logging enabled");
    }
}
