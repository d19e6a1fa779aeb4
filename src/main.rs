//! herakles-gpu-exporter - version 0.1.0
//!
//! Prometheus exporter for NVIDIA GPU telemetry with tracing logging.
//! This is the main entry point that initializes the server and handles subcommands.

mod cli;
mod commands;
mod config;
mod gpu;
mod handlers;
mod health_stats;
mod metrics;
mod startup_checks;
mod state;

use axum::{routing::get, Router};
use clap::Parser;
use prometheus::{Gauge, Registry};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;
use tokio::{net::TcpListener, signal};
use tracing::{debug, error, info, Level};

use cli::{Args, Commands, LogLevel};
use commands::{command_check, command_config, command_devices, command_test};
use config::{
    resolve_config, show_config, validate_effective_config, Config, DEFAULT_BIND_ADDR, DEFAULT_PORT,
};
use gpu::GpuReader;
use handlers::{config_handler, devices_handler, health_handler, metrics_handler, root_handler};
use health_stats::HealthStats;
use metrics::GpuMetrics;
use state::AppState;

/// Initializes tracing logging subsystem with configured log level.
fn setup_logging(_config: &Config, args: &Args) {
    let log_level = match args.log_level {
        LogLevel::Off => Level::ERROR,
        LogLevel::Error => Level::ERROR,
        LogLevel::Warn => Level::WARN,
        LogLevel::Info => Level::INFO,
        LogLevel::Debug => Level::DEBUG,
        LogLevel::Trace => Level::TRACE,
    };

    let subscriber = tracing_subscriber::fmt()
        .with_max_level(log_level)
        .with_target(true)
        .with_thread_ids(false)
        .with_file(true)
        .with_line_number(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber).expect("Failed to set tracing subscriber");

    info!("Logging initialized with level: {:?}", args.log_level);
}

/// Helper function to load and validate configuration.
/// Exits the process with error code 1 if validation fails.
fn load_validated_config(args: &Args) -> Result<Config, Box<dyn std::error::Error>> {
    let config = resolve_config(args)?;
    if let Err(e) = validate_effective_config(&config) {
        eprintln!("❌ Configuration invalid: {}", e);
        std::process::exit(1);
    }
    Ok(config)
}

/// Main application entry point.
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    // Early config resolution for show/check modes
    if args.show_config || args.show_user_config || args.check_config {
        let config = resolve_config(&args)?;

        if args.check_config {
            if let Err(e) = validate_effective_config(&config) {
                eprintln!("❌ Configuration invalid: {}", e);
                std::process::exit(1);
            }
            println!("✅ Configuration is valid");
            return Ok(());
        }

        if args.show_config {
            return show_config(&config, args.config_format, false);
        }

        if args.show_user_config {
            return show_config(&config, args.config_format, true);
        }
    }

    // Handle subcommands
    if let Some(command) = &args.command {
        // Config and Devices commands don't need config validation
        match command {
            Commands::Config {
                output,
                format,
                commented,
            } => {
                return command_config(output.clone(), format.clone(), *commented);
            }
            Commands::Devices { verbose } => {
                return command_devices(*verbose);
            }
            _ => {
                // Other commands need config validation
            }
        }

        let config = load_validated_config(&args)?;

        return match command {
            Commands::Check { nvml, devices, all } => command_check(*nvml, *devices, *all, &config),

            Commands::Test {
                iterations,
                verbose,
            } => command_test(*iterations, *verbose, &config),

            Commands::Config { .. } => unreachable!("Config handled above"),
            Commands::Devices { .. } => unreachable!("Devices handled above"),
        };
    }

    // Load configuration for main server mode
    let config = resolve_config(&args)?;

    if let Err(e) = validate_effective_config(&config) {
        eprintln!("❌ Configuration invalid: {}", e);
        std::process::exit(1);
    }

    setup_logging(&config, &args);

    info!("Starting herakles-gpu-exporter");

    // Validate runtime requirements BEFORE proceeding
    if let Err(e) = startup_checks::validate_requirements() {
        error!("❌ Startup validation failed: {}", e);
        error!("   The exporter will start but may not function correctly!");
        // Continue anyway - NVML init below gives the definitive answer
    }

    let bind_ip_str = config.bind.as_deref().unwrap_or(DEFAULT_BIND_ADDR);
    let port = config.port.unwrap_or(DEFAULT_PORT);

    // Open the NVML handle once for the process lifetime
    let reader = match GpuReader::new() {
        Ok(reader) => reader,
        Err(e) => {
            error!("Failed to initialize NVML: {}", e);
            return Err(e.into());
        }
    };

    match reader.driver_version() {
        Ok(version) => info!("NVIDIA driver version: {}", version),
        Err(e) => debug!("Could not read driver version: {}", e),
    }
    match reader.device_count() {
        Ok(count) => info!("Enumerated {} GPU(s)", count),
        Err(e) => error!("Initial device enumeration failed: {}", e),
    }

    // Initialize Prometheus metrics registry
    let registry = Registry::new();
    debug!("Prometheus registry initialized");

    let metrics = GpuMetrics::new(&registry)?;
    let scrape_duration = Gauge::new(
        "gpu_exporter_scrape_duration_seconds",
        "Time spent serving /metrics request (reading all devices)",
    )?;
    let devices_total = Gauge::new(
        "gpu_exporter_devices",
        "Number of GPUs currently exported by herakles-gpu-exporter",
    )?;
    let collect_success = Gauge::new(
        "gpu_exporter_collect_success",
        "Whether the last device enumeration was successful (1) or failed (0)",
    )?;

    if config.enable_telemetry.unwrap_or(true) {
        registry.register(Box::new(scrape_duration.clone()))?;
        registry.register(Box::new(devices_total.clone()))?;
        registry.register(Box::new(collect_success.clone()))?;
    }

    debug!("All metrics registered successfully");

    let health_stats = Arc::new(HealthStats::new());

    let state = Arc::new(AppState {
        registry,
        metrics,
        scrape_duration,
        devices_total,
        collect_success,
        reader,
        config: Arc::new(config.clone()),
        health_stats,
        start_time: Instant::now(),
    });

    // Setup graceful shutdown signal handlers
    let shutdown_signal = async {
        let ctrl_c = async {
            signal::ctrl_c()
                .await
                .expect("Failed to install Ctrl+C handler");
        };

        #[cfg(unix)]
        let terminate = async {
            signal::unix::signal(signal::unix::SignalKind::terminate())
                .expect("Failed to install signal handler")
                .recv()
                .await;
        };

        #[cfg(not(unix))]
        let terminate = std::future::pending::<()>();

        tokio::select! {
            _ = ctrl_c => {
                info!("Received SIGINT (Ctrl+C), shutting down gracefully...");
            }
            _ = terminate => {
                info!("Received SIGTERM, shutting down gracefully...");
            }
        }
    };

    // Configure HTTP server routes
    let addr: SocketAddr = format!("{}:{}", bind_ip_str, port).parse()?;

    let mut app = Router::new()
        .route("/", get(root_handler))
        .route("/metrics", get(metrics_handler));

    if config.enable_health.unwrap_or(true) {
        app = app.route("/health", get(health_handler));
    }

    app = app
        .route("/config", get(config_handler))
        .route("/devices", get(devices_handler));

    let app = app.with_state(state.clone());

    let listener = TcpListener::bind(addr).await?;
    info!(
        "herakles-gpu-exporter listening on http://{}:{}",
        bind_ip_str, port
    );

    let server = axum::serve(listener, app);

    tokio::select! {
        result = server => {
            if let Err(e) = result {
                error!("Server error: {}", e);
                return Err(e.into());
            }
        }
        _ = shutdown_signal => {
            info!("Shutdown signal received, exiting...");
        }
    }

    info!("herakles-gpu-exporter stopped gracefully");
    Ok(())
}
