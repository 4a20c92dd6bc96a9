//! rust-chord-node - Main entry point
//!
//! A Chord distributed hash table node with ring stabilization.

use anyhow::{Context, Result};
use rust_chord_node::{ChordServer, CliArgs, Config, RpcServer};
use tracing::{debug, error, info};

/// Set up panic handler for unexpected errors
fn setup_panic_handler() {
    std::panic::set_hook(Box::new(|panic_info| {
        let backtrace = std::backtrace::Backtrace::capture();
        let location = panic_info.location().unwrap();

        error!(
            "PANIC occurred at {}:{}:{}",
            location.file(),
            location.line(),
            location.column()
        );
        let payload = panic_info.payload();
        if let Some(s) = payload.downcast_ref::<&str>() {
            error!("Panic message: {}", s);
        } else if let Some(s) = payload.downcast_ref::<String>() {
            error!("Panic message: {}", s);
        } else {
            error!("Panic message: unknown");
        }
        error!("Backtrace:\n{:?}", backtrace);
    }));
}

#[tokio::main]
async fn main() -> Result<()> {
    // Set up panic handler
    setup_panic_handler();

    // Parse CLI arguments
    let args = CliArgs::parse_args();

    // Initialize logging
    init_logging(&args);
    info!("rust-chord-node starting");
    debug!("CLI arguments: {:?}", args);

    // Create and validate configuration
    let config = Config::from_args(&args);
    config.validate().context("Invalid configuration")?;

    // Create the local node and bind its RPC listener; a bind failure is
    // fatal and exits non-zero.
    let chord = ChordServer::new(&config.listen_addr, config.rpc_deadline);
    let server = RpcServer::bind(&config.listen_addr, chord.clone())
        .await
        .context("Failed to bind RPC listener")?;

    display_node_info(&chord, &config).await;

    // Join an existing ring if a bootstrap peer was given
    if let Some(bootstrap) = &config.bootstrap {
        chord
            .join(bootstrap)
            .await
            .with_context(|| format!("Failed to join ring via {}", bootstrap))?;
    }

    // Run the RPC server and the maintenance loop side by side until
    // interrupted.
    chord.start().await;
    let maintenance = {
        let chord = chord.clone();
        let cadence = config.cadence;
        tokio::spawn(async move { chord.run_maintenance(cadence).await })
    };

    tokio::select! {
        result = server.run() => {
            result.context("RPC server failed")?;
        }
        _ = tokio::signal::ctrl_c() => {
            info!("Received interrupt, shutting down");
        }
    }

    chord.stop().await;
    let _ = maintenance.await;

    info!("rust-chord-node finished");
    Ok(())
}

/// Initialize logging based on verbosity settings
fn init_logging(args: &CliArgs) {
    let level = args.log_level();

    let subscriber = tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false);

    if args.is_verbose() {
        subscriber.pretty().init();
    } else {
        subscriber.compact().init();
    }

    debug!("Logging initialized with level: {:?}", level);
}

/// Display node information
async fn display_node_info(chord: &ChordServer, config: &Config) {
    let self_node = chord.self_node().await;
    println!("Chord Node:");
    println!("  Identifier: {}", self_node.id);
    println!("  Listen address: {}", config.listen_addr);
    println!(
        "  Bootstrap: {}",
        config.bootstrap.as_deref().unwrap_or("none (solo ring)")
    );
    println!("  Maintenance cadence: {:?}", config.cadence);
    println!("  RPC deadline: {:?}", config.rpc_deadline);
    println!();
}
