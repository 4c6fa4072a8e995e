//! stagehand - install orchestration and session tracking
//!
//! CLI front-end over the orchestration crates. Commands mutate the
//! pending-operation store; the `run` command drives the orchestration
//! loop against the simulated platform until the queue settles.

mod cli;
mod error;
mod events;
mod logging;
mod setup;

use std::process;
use std::time::{Duration, Instant};

use clap::Parser;
use stagehand_config::Config;
use stagehand_events::EventReceiver;
use stagehand_types::{ArtifactRecord, ArtifactStatus, BackendKind, SharedLib};
use tokio::select;
use tracing::{error, info};

use crate::cli::{Cli, Commands};
use crate::error::CliError;
use crate::events::EventHandler;
use crate::setup::SystemSetup;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    logging::init_tracing(cli.global.debug);

    if let Err(e) = run(cli).await {
        error!("command failed: {e}");
        eprintln!("Error: {e}");
        process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), CliError> {
    info!(
        command = cli.command.name(),
        "starting stagehand v{}",
        env!("CARGO_PKG_VERSION")
    );

    cli.command.validate().map_err(CliError::InvalidArguments)?;

    let config_path = match &cli.global.config {
        Some(path) => path.clone(),
        None => Config::default_path()?,
    };
    let mut config = Config::load_or_default(cli.global.config.as_deref()).await?;
    config.merge_env()?;
    if let Some(dir) = &cli.global.state_dir {
        config.paths.state_dir = Some(dir.clone());
    }

    let (event_sender, event_receiver) = stagehand_events::channel();
    let mut setup = SystemSetup::new(config, config_path);
    setup.initialize(event_sender).await?;

    let mut handler = EventHandler::new(cli.global.debug);
    execute_command_with_events(cli.command, &mut setup, event_receiver, &mut handler).await
}

/// Execute the command while rendering events as they arrive.
async fn execute_command_with_events(
    command: Commands,
    setup: &mut SystemSetup,
    mut event_receiver: EventReceiver,
    handler: &mut EventHandler,
) -> Result<(), CliError> {
    let mut command_future = Box::pin(execute_command(command, setup));

    loop {
        select! {
            result = &mut command_future => {
                while let Ok(message) = event_receiver.try_recv() {
                    handler.handle_message(message);
                }
                return result;
            }
            message = event_receiver.recv() => {
                if let Some(message) = message {
                    handler.handle_message(message);
                }
            }
        }
    }
}

async fn execute_command(command: Commands, setup: &mut SystemSetup) -> Result<(), CliError> {
    match command {
        Commands::Queue {
            package,
            version,
            name,
            size,
            target_sdk,
            lib,
        } => {
            let libs: Vec<SharedLib> = lib
                .iter()
                .map(|spec| {
                    // Validated during argument checking.
                    let (lib_package, lib_version) =
                        cli::parse_lib_spec(spec).expect("validated lib spec");
                    SharedLib::new(lib_package, lib_version)
                })
                .collect();

            // The CLI has no retrieval pipeline, so queued artifacts go
            // straight to the state an install can be enqueued from.
            let display_name = name.unwrap_or_else(|| package.clone());
            let mut record =
                ArtifactRecord::new_queued(&package, version, display_name, size, target_sdk)
                    .with_shared_libs(libs);
            record.status = ArtifactStatus::Completed;
            setup.store().upsert(&record).await?;
            println!("queued {package} (version {version})");
            Ok(())
        }

        Commands::Enqueue { package } => {
            setup.orchestrator().enqueue_install(&package).await?;
            Ok(())
        }

        Commands::Run { timeout } => run_until_settled(setup, timeout).await,

        Commands::Status => {
            let records = setup.store().snapshot().await?;
            if records.is_empty() {
                println!("queue is empty");
                return Ok(());
            }
            for record in records {
                print_record(&record);
            }
            Ok(())
        }

        Commands::Backends => {
            let orchestrator = setup.orchestrator();
            let resolved = orchestrator.resolved_backend().await;
            let preference = setup.preferences().preferred_backend().await.kind();
            println!("preferred: {preference}");
            println!("resolved:  {resolved}");
            println!("available:");
            for descriptor in orchestrator.available_backends().await {
                println!("  {} ({})", descriptor.kind, descriptor.display_label);
            }
            Ok(())
        }

        Commands::SetBackend { backend } => {
            // Validated during argument checking.
            let kind = BackendKind::parse(&backend).expect("validated backend name");
            setup
                .preferences()
                .set_preferred_backend(kind.into())
                .await?;
            println!("preferred backend set to {kind}");
            Ok(())
        }

        Commands::Uninstall { package } => {
            setup.orchestrator().uninstall(&package).await?;
            Ok(())
        }

        Commands::Remove { package } => {
            setup.store().delete(&package).await?;
            println!("removed {package} from the queue");
            Ok(())
        }

        Commands::Reset => {
            setup.store().delete_all().await?;
            println!("queue cleared");
            Ok(())
        }
    }
}

/// Drive the orchestration loop until nothing is awaiting or mid
/// install, or the timeout passes.
async fn run_until_settled(setup: &mut SystemSetup, timeout: u64) -> Result<(), CliError> {
    let orchestrator = setup.orchestrator();
    let sessions = setup.take_sessions();
    let loop_handle = tokio::spawn(async move { orchestrator.run(sessions).await });

    let deadline = Instant::now() + Duration::from_secs(timeout);
    let settled = loop {
        let records = setup.store().snapshot().await?;
        if !records.iter().any(ArtifactRecord::is_installing) {
            break true;
        }
        if Instant::now() >= deadline {
            break false;
        }
        tokio::time::sleep(Duration::from_millis(100)).await;
    };

    loop_handle.abort();
    if settled {
        info!("install queue settled");
        Ok(())
    } else {
        Err(CliError::App(stagehand_errors::Error::internal(format!(
            "install queue did not settle within {timeout}s"
        ))))
    }
}

fn print_record(record: &ArtifactRecord) {
    let backend = record
        .backend
        .map_or_else(|| "-".to_string(), |kind| kind.to_string());
    let progress = record
        .install_progress
        .map_or_else(|| "-".to_string(), |p| format!("{p}%"));
    println!(
        "{:<40} v{:<8} {:<16} {:<8} {}",
        record.package_id, record.version_code, record.status, backend, progress
    );
    for lib in &record.shared_libs {
        let lib_progress = lib
            .install_progress
            .map_or_else(|| "-".to_string(), |p| format!("{p}%"));
        println!("  lib {:<36} v{:<8} {}", lib.package_id, lib.version_code, lib_progress);
    }
}
