use std::sync::Arc;

use clap::{Parser, Subcommand};
use workflow_engine::audit::CsvAuditSink;
use workflow_engine::backends::ToolBackends;
use workflow_engine::model::Request;
use workflow_engine::{EngineConfig, EventType, FixtureLlmAdapter, WorkflowEngine};

#[derive(Parser)]
#[command(name = "engine-cli", about = "Run and inspect the agentic workflow engine")]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Optional path to an EngineConfig TOML file; defaults are used if omitted.
    #[arg(long, global = true)]
    config: Option<String>,

    /// Append a CSV row for every account opened to this path.
    #[arg(long, global = true)]
    audit_log: Option<String>,
}

#[derive(Subcommand)]
enum Command {
    /// Submit a canned Roth IRA account-opening request and stream its events.
    Run {
        #[arg(long, default_value = "C1")]
        client_id: String,
        #[arg(long, default_value = "open_roth_ira")]
        request_type: String,
    },
    /// Re-run the documented example scenarios (S1-S4) against the fixture backends.
    Replay,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into()))
        .init();

    let cli = Cli::parse();
    let config = match &cli.config {
        Some(path) => EngineConfig::load(path)?,
        None => EngineConfig::default(),
    };
    let backends = ToolBackends::with_example_fixtures().await;
    let engine = WorkflowEngine::new(config, backends, Arc::new(FixtureLlmAdapter));

    match cli.command {
        Command::Run { client_id, request_type } => run_and_stream(&engine, request_type, client_id, cli.audit_log.as_deref()).await,
        Command::Replay => replay_scenarios(&engine).await,
    }
}

async fn run_and_stream(engine: &WorkflowEngine, request_type: String, client_id: String, audit_log: Option<&str>) -> anyhow::Result<()> {
    let request = Request::new(request_type, client_id);
    let (workflow_id, mut subscription) = engine.start(request);
    tracing::info!(%workflow_id, "workflow started");

    // `start` hands out exactly one subscription; to also feed a CSV audit
    // sink we tee every event onto a second channel as we print it, rather
    // than asking the engine for a second subscription.
    let audit_tx = audit_log.map(|path| {
        let (tx, rx) = tokio::sync::mpsc::channel(256);
        (tx, CsvAuditSink::new(path).spawn(rx))
    });

    while let Some(event) = subscription.receiver.recv().await {
        println!("[{:?}] {}", event.event_type, event.payload);
        if let Some((tx, _)) = &audit_tx {
            let _ = tx.send(event.clone()).await;
        }
        if event.event_type == EventType::WorkflowComplete {
            break;
        }
    }

    if let Some((tx, handle)) = audit_tx {
        drop(tx);
        handle.await??;
    }
    Ok(())
}

async fn replay_scenarios(engine: &WorkflowEngine) -> anyhow::Result<()> {
    let scenarios = [
        ("S1 happy path", "open_roth_ira", "C1"),
        ("S2 duplicate account", "open_roth_ira", "C2"),
        ("S3 ineligible client", "open_roth_ira", "C3"),
        ("S4 invalid documents", "open_roth_ira", "C4"),
    ];

    for (label, request_type, client_id) in scenarios {
        let request = Request::new(request_type, client_id);
        let (workflow_id, mut subscription) = engine.start(request);
        let mut final_status = None;
        while let Some(event) = subscription.receiver.recv().await {
            if event.event_type == EventType::WorkflowComplete {
                final_status = Some(event.payload);
                break;
            }
        }
        println!("{label} ({workflow_id}): {}", final_status.unwrap_or(serde_json::json!({"status": "unknown"})));
    }
    Ok(())
}
