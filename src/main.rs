use anyhow::{Context, Result};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;
use uuid::Uuid;
use vendor_verify::checker::CheckerRouter;
use vendor_verify::cli::commands::{HistoryCommand, ServeCommand, StepsCommand, SubmitCommand};
use vendor_verify::cli::output::*;
use vendor_verify::cli::{Cli, Command};
use vendor_verify::core::{ApplicationPayload, OverallStatus, StepRegistry};
use vendor_verify::execution::{VerificationEngine, VerificationEvent};
use vendor_verify::gateway::SubmissionGateway;
use vendor_verify::persistence::{InMemoryPersistence, PersistenceBackend};
use vendor_verify::{server, VerifyConfig};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::from_args();

    // Initialize logging; RUST_LOG takes precedence
    let default_level = if cli.verbose {
        "debug"
    } else if matches!(cli.command, Command::Serve(_)) {
        "info"
    } else {
        "warn"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to set logging subscriber: {}", e))?;

    let config = load_config(cli.config.as_deref())?;

    match &cli.command {
        Command::Serve(cmd) => serve(cmd, &config).await?,
        Command::Submit(cmd) => submit(cmd, &config).await?,
        Command::Steps(cmd) => show_steps(cmd, &config)?,
        Command::History(cmd) => show_history(cmd).await?,
    }

    Ok(())
}

fn load_config(path: Option<&str>) -> Result<VerifyConfig> {
    match path {
        Some(path) => VerifyConfig::from_file(path).context("Failed to load service config"),
        None => Ok(VerifyConfig::default()),
    }
}

async fn open_store(no_history: bool) -> Result<Arc<dyn PersistenceBackend>> {
    if no_history {
        return Ok(Arc::new(InMemoryPersistence::new()));
    }

    #[cfg(feature = "sqlite")]
    {
        let store = vendor_verify::persistence::SqliteSnapshotStore::with_default_path().await?;
        Ok(Arc::new(store))
    }

    #[cfg(not(feature = "sqlite"))]
    {
        tracing::warn!("Built without the sqlite feature; history is kept in memory");
        Ok(Arc::new(InMemoryPersistence::new()))
    }
}

fn build_engine(
    config: &VerifyConfig,
    registry: &StepRegistry,
    store: Arc<dyn PersistenceBackend>,
) -> Result<VerificationEngine<CheckerRouter>> {
    let checkers = config.checker_router(registry)?;
    Ok(VerificationEngine::new(checkers, config.engine_settings()).with_persistence(store))
}

async fn serve(cmd: &ServeCommand, config: &VerifyConfig) -> Result<()> {
    let registry = Arc::new(config.to_registry()?);
    let store = open_store(cmd.no_history).await?;
    let engine = build_engine(config, &registry, store)?;
    let gateway = Arc::new(SubmissionGateway::new(
        registry,
        engine,
        config.max_concurrent_pipelines,
    ));

    let bind = cmd.bind.as_deref().unwrap_or(&config.bind);
    server::serve(gateway, bind).await
}

async fn submit(cmd: &SubmitCommand, config: &VerifyConfig) -> Result<()> {
    let content = std::fs::read_to_string(&cmd.file)
        .with_context(|| format!("Failed to read payload file {}", cmd.file))?;
    let payload: ApplicationPayload =
        serde_json::from_str(&content).context("Failed to parse application payload")?;

    let registry = Arc::new(config.to_registry()?);
    let store = open_store(cmd.no_history).await?;
    let mut engine = build_engine(config, &registry, store)?;

    let progress = (!cmd.json).then(|| create_progress_bar(registry.len()));
    if let Some(bar) = progress.clone() {
        engine = engine.with_event_handler(move |event| {
            match event {
                VerificationEvent::StepStarted { kind, .. } => bar.set_message(kind.to_string()),
                VerificationEvent::StepCompleted { .. } | VerificationEvent::StepFailed { .. } => bar.inc(1),
                VerificationEvent::StepsSkipped { kinds, .. } => bar.inc(kinds.len() as u64),
                _ => {}
            }
            bar.println(format_verification_event(event));
        });
    }

    let gateway = SubmissionGateway::new(registry, engine, config.max_concurrent_pipelines);
    let handle = gateway.submit(payload).await?;
    let snapshot = gateway.wait_for_completion(handle.application_id()).await?;

    if let Some(bar) = progress {
        bar.finish_and_clear();
    }

    if cmd.json {
        println!("{}", serde_json::to_string_pretty(&snapshot)?);
    } else {
        println!("\n{}", format_snapshot_details(&snapshot));
        if !cmd.no_history {
            println!(
                "\n{} Application saved to history (ID: {})",
                INFO,
                style(snapshot.application_id).dim()
            );
        }
    }

    if snapshot.overall_status == OverallStatus::Failed {
        std::process::exit(1);
    }

    Ok(())
}

fn show_steps(cmd: &StepsCommand, config: &VerifyConfig) -> Result<()> {
    let registry = config.to_registry()?;

    if cmd.json {
        println!("{}", serde_json::to_string_pretty(registry.definitions())?);
        return Ok(());
    }

    println!("{} Verification steps:", INFO);
    for definition in registry.definitions() {
        println!("{}", format_step_definition(definition));
    }

    Ok(())
}

async fn show_history(cmd: &HistoryCommand) -> Result<()> {
    let store = open_store(false).await?;

    if let Some(id) = &cmd.application_id {
        let id = Uuid::parse_str(id).context("Invalid application ID format")?;
        match store.load_snapshot(id).await? {
            Some(snapshot) if cmd.json => println!("{}", serde_json::to_string_pretty(&snapshot)?),
            Some(snapshot) => println!("{}", format_snapshot_details(&snapshot)),
            None => println!("{} Application not found", WARN),
        }
        return Ok(());
    }

    let snapshots = store.list_snapshots(cmd.limit).await?;
    if snapshots.is_empty() {
        println!("{} No applications found", INFO);
        return Ok(());
    }

    if cmd.json {
        let data = serde_json::json!({ "applications": snapshots });
        println!("{}", serde_json::to_string_pretty(&data)?);
    } else {
        println!("{} Application history (showing latest {}):", INFO, cmd.limit);
        for snapshot in &snapshots {
            println!("  {}", format_snapshot_summary(snapshot));
        }
    }

    Ok(())
}
