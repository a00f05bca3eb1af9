use actix_multipart::form::MultipartFormConfig;
use actix_web::{App, HttpServer, web};
use clap::{Parser, Subcommand};
use std::fs::File;
use std::path::{Path, PathBuf};
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, Layer, filter::LevelFilter};
mod api;
use crate::api::{
    application::handlers::application_config,
    health::health_config,
    source::source_config,
    state::{AppState, Session, state_config},
    validation,
};
mod config;
mod shutdown;
mod store;
use crate::shutdown::ShutdownCoordinator;
use crate::store::CsvStore;

#[derive(Parser)]
#[command(name = "job-tracker")]
#[command(about = "Track job applications in a CSV file")]
struct Cli {
    /// Tracker CSV file (overrides TRACKER_FILE)
    #[arg(short, long, global = true)]
    file: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the HTTP server (default)
    Serve,

    /// Print the tracked applications
    List,

    /// Append the rows of another tracker CSV file
    Import {
        /// CSV file with the tracker header row
        path: PathBuf,
    },
}

fn init_logging(log_dir: &Path) -> std::io::Result<()> {
    // Create logs directory if it doesn't exist
    std::fs::create_dir_all(log_dir)?;

    // Log files will be created as: logs/info.log.2024-12-22, logs/error.log.2024-12-22, etc.
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "info".into());

    let info_file = tracing_appender::rolling::daily(log_dir, "info.log");
    let warn_file = tracing_appender::rolling::daily(log_dir, "warn.log");
    let error_file = tracing_appender::rolling::daily(log_dir, "error.log");
    let debug_file = tracing_appender::rolling::daily(log_dir, "debug.log");

    let info_layer = tracing_subscriber::fmt::layer()
        .with_writer(info_file)
        .with_ansi(false)
        .with_filter(LevelFilter::INFO);

    let warn_layer = tracing_subscriber::fmt::layer()
        .with_writer(warn_file)
        .with_ansi(false)
        .with_filter(LevelFilter::WARN);

    let error_layer = tracing_subscriber::fmt::layer()
        .with_writer(error_file)
        .with_ansi(false)
        .with_filter(LevelFilter::ERROR);

    let debug_layer = tracing_subscriber::fmt::layer()
        .with_writer(debug_file)
        .with_ansi(false)
        .with_filter(LevelFilter::DEBUG);

    // Console goes to stderr so `list` output stays clean on stdout
    let console_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_ansi(true);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(console_layer)
        .with(info_layer)
        .with(warn_layer)
        .with(error_layer)
        .with(debug_layer)
        .init();

    Ok(())
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    let cli = Cli::parse();

    // Load configuration from environment
    let config::Config {
        tracker_file,
        host,
        port,
        max_payload_size,
        log_dir,
    } = config::Config::from_env()
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidInput, e))?;

    init_logging(&log_dir)?;

    let tracker_file = cli.file.unwrap_or(tracker_file);
    let session = Session::open(CsvStore::new(&tracker_file));

    match cli.command.unwrap_or(Commands::Serve) {
        Commands::List => {
            list(&session);
            Ok(())
        }
        Commands::Import { path } => import(session, &path),
        Commands::Serve => serve(session, host, port, max_payload_size).await,
    }
}

fn list(session: &Session) {
    if session.records.is_empty() {
        println!("The tracker is currently empty.");
        return;
    }

    println!(
        "{:<30} {:<20} {:<17} {:<14} {:<8}",
        "JOB TITLE", "COMPANY", "SUBMITTED", "STATUS", "MATCHED"
    );
    println!("{}", "-".repeat(93));
    for row in session.records.rows() {
        println!(
            "{:<30} {:<20} {:<17} {:<14} {:<8}",
            truncate(&row.job_title, 28),
            truncate(&row.company, 18),
            row.date_submitted,
            row.status.as_str(),
            row.requirements_matched
        );
    }
    println!("\nTotal entries: {}", session.records.len());
}

fn import(session: Session, path: &Path) -> std::io::Result<()> {
    let file = File::open(path)?;
    match session.service.import_csv(&session.records, file) {
        Ok(committed) => {
            println!("{}", committed.outcome.message);
            for failure in &committed.outcome.errors {
                println!("  {}: {}", failure.identifier, failure.errors.join("; "));
            }
            Ok(())
        }
        Err(e) => {
            error!("Import failed: {}", e);
            Err(std::io::Error::other(e))
        }
    }
}

async fn serve(
    session: Session,
    host: String,
    port: u16,
    max_payload_size: usize,
) -> std::io::Result<()> {
    info!("Starting job-tracker application");
    info!("Configuration loaded successfully:");
    info!("  - Data file: {}", session.service.store().path().display());
    info!("  - Max payload size: {} bytes", max_payload_size);
    info!("  - Applications loaded: {}", session.records.len());

    let state = web::Data::new(AppState::new("job-tracker", session));
    let server_state = state.clone();

    let server = HttpServer::new(move || {
        // Configure payload size limits globally
        let payload_config = web::PayloadConfig::default()
            .limit(max_payload_size);

        let multipart_config = MultipartFormConfig::default()
            .total_limit(max_payload_size);

        App::new()
            .app_data(server_state.clone())
            .app_data(payload_config) // Global payload size limit
            .app_data(multipart_config) // Global multipart/file upload size limit
            .app_data(validation::json_config()) // Global validation config
            .configure(health_config) // Health check endpoints
            .configure(state_config)
            .configure(source_config)
            .configure(application_config)
    });

    info!("Server starting on http://{}:{}", host, port);

    // Signals are handled by the shutdown coordinator
    let server = server
        .disable_signals()
        .bind((host.as_str(), port))?
        .run();

    let server_handle = server.handle();
    let server_task = tokio::spawn(server);

    let coordinator = ShutdownCoordinator::new(server_handle, server_task, state);
    coordinator.wait_for_shutdown().await
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}
