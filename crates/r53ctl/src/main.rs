// # r53ctl - Route 53 lifecycle CLI
//
// A thin integration layer:
// 1. Parse flags and load the stack file
// 2. Initialize logging and the runtime
// 3. Register the Route 53 client and state stores
// 4. Run one engine command and report the result
//
// All resource semantics live in r53-core.
//
// ## Configuration
//
// - `--config` / `R53_CONFIG`: Path to the JSON stack file (default `r53.json`)
// - `--log-level` / `R53_LOG_LEVEL`: trace, debug, info, warn, error
//
// ## Example
//
// ```bash
// r53ctl --config stack.json plan
// r53ctl --config stack.json apply
// r53ctl import zone.main zone Z0123456789ABCDEFGHIJ
// r53ctl state list
// ```

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use r53_core::engine::{EngineEvent, LifecycleEngine, Plan, PlanAction};
use r53_core::{ProviderContext, ProviderRegistry, ResourceKind, StackConfig};
use std::path::PathBuf;
use std::process::ExitCode;
use tokio_stream::StreamExt;
use tokio_stream::wrappers::ReceiverStream;
use tracing::{Level, error, info, warn};
use tracing_subscriber::FmtSubscriber;

/// Exit codes for different termination scenarios
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum R53ExitCode {
    /// Command completed
    Success = 0,
    /// Configuration or startup error
    ConfigError = 1,
    /// A Route 53 or state store operation failed
    RuntimeError = 2,
    /// `plan --detailed-exitcode` found changes
    ChangesPending = 3,
}

impl From<R53ExitCode> for ExitCode {
    fn from(code: R53ExitCode) -> Self {
        ExitCode::from(code as u8)
    }
}

#[derive(Debug, Parser)]
#[command(name = "r53ctl", version, about = "Manage Route 53 resources from a stack file")]
struct Cli {
    /// Path to the JSON stack file
    #[arg(short, long, env = "R53_CONFIG", default_value = "r53.json")]
    config: PathBuf,

    /// Log level
    #[arg(long, env = "R53_LOG_LEVEL", default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Show what apply would change
    Plan {
        /// Exit with code 3 when the plan has changes
        #[arg(long)]
        detailed_exitcode: bool,
    },
    /// Converge Route 53 on the stack
    Apply,
    /// Delete every tracked resource
    Destroy,
    /// Adopt an existing Route 53 object
    Import {
        /// Address to store the object under, e.g. `zone.main`
        address: String,
        /// Resource kind, e.g. `zone` or `record`
        kind: ResourceKind,
        /// Import ID in the kind's format, e.g. `Z123_www.example.com_A`
        id: String,
    },
    /// Inspect persisted state
    #[command(subcommand)]
    State(StateCommand),
}

#[derive(Debug, Subcommand)]
enum StateCommand {
    /// List tracked addresses
    List,
    /// Print the stored attributes of one address
    Show { address: String },
}

fn parse_level(level: &str) -> Option<Level> {
    match level.to_lowercase().as_str() {
        "trace" => Some(Level::TRACE),
        "debug" => Some(Level::DEBUG),
        "info" => Some(Level::INFO),
        "warn" => Some(Level::WARN),
        "error" => Some(Level::ERROR),
        _ => None,
    }
}

fn load_stack(path: &PathBuf) -> Result<StackConfig> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read stack file {}", path.display()))?;
    let stack = StackConfig::from_json(&text)
        .with_context(|| format!("Invalid stack file {}", path.display()))?;
    Ok(stack)
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let Some(log_level) = parse_level(&cli.log_level) else {
        eprintln!(
            "Invalid log level '{}'. Valid levels: trace, debug, info, warn, error",
            cli.log_level
        );
        return R53ExitCode::ConfigError.into();
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_writer(std::io::stderr)
        .finish();
    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
        return R53ExitCode::ConfigError.into();
    }

    let stack = match load_stack(&cli.config) {
        Ok(stack) => stack,
        Err(e) => {
            eprintln!("Configuration error: {:#}", e);
            return R53ExitCode::ConfigError.into();
        }
    };
    info!(
        "Loaded {} with {} resource(s)",
        cli.config.display(),
        stack.resources.len()
    );

    let rt = match tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            error!("Failed to create tokio runtime: {}", e);
            return R53ExitCode::RuntimeError.into();
        }
    };

    let result = rt.block_on(run(stack, cli.command));
    match result {
        Ok(code) => code.into(),
        Err(e) => {
            error!("{:#}", e);
            R53ExitCode::RuntimeError.into()
        }
    }
}

/// Wire the registry and engine, then run one command
async fn run(stack: StackConfig, command: Command) -> Result<R53ExitCode> {
    let registry = ProviderRegistry::with_builtin_state_stores();

    #[cfg(feature = "aws")]
    {
        r53_provider_aws::register(&registry);
    }

    let api = registry.create_api(&stack.provider).await?;
    let state_store = registry.create_state_store(&stack.state_store).await?;
    info!(client = api.provider_name(), "Route 53 client ready");

    if let Command::State(state) = command {
        return show_state(state_store.as_ref(), state).await;
    }

    let region = stack.provider.region().map(str::to_string);
    let ctx = ProviderContext::new(api, stack.timeouts.clone()).with_region(region);

    let (engine, events) = LifecycleEngine::new(ctx, state_store, stack)?;
    let reporter = tokio::spawn(report_events(events));

    let code = run_command(&engine, command).await;

    // dropping the engine closes the event channel
    drop(engine);
    if let Err(e) = reporter.await {
        warn!("Event reporter failed: {}", e);
    }
    code
}

async fn run_command(engine: &LifecycleEngine, command: Command) -> Result<R53ExitCode> {
    match command {
        Command::Plan { detailed_exitcode } => {
            let plan = engine.plan().await?;
            print_plan(&plan);
            if detailed_exitcode && plan.has_changes() {
                return Ok(R53ExitCode::ChangesPending);
            }
        }
        Command::Apply => {
            let summary = engine.apply().await?;
            println!(
                "Apply complete: {} created, {} updated, {} replaced, {} deleted, {} unchanged",
                summary.created, summary.updated, summary.replaced, summary.deleted, summary.unchanged
            );
        }
        Command::Destroy => {
            let summary = engine.destroy().await?;
            println!("Destroy complete: {} deleted", summary.deleted);
        }
        Command::Import { address, kind, id } => {
            let record = engine.import(&address, kind, &id).await?;
            println!("Imported {} as {} ({})", record.id, address, kind);
        }
        Command::State(_) => {}
    }
    Ok(R53ExitCode::Success)
}

fn print_plan(plan: &Plan) {
    for change in &plan.changes {
        let marker = match &change.action {
            PlanAction::Create => "+",
            PlanAction::Update => "~",
            PlanAction::Replace => "-/+",
            PlanAction::Delete => "-",
            PlanAction::NoOp => continue,
            PlanAction::Deferred { .. } => "?",
        };
        match &change.action {
            PlanAction::Deferred { references } => println!(
                "{marker} {} ({}) after {}",
                change.address,
                change.kind,
                references.join(", ")
            ),
            action => println!("{marker} {} ({}) {action}", change.address, change.kind),
        }
    }

    if plan.has_changes() {
        println!(
            "Plan: {} to create, {} to update, {} to replace, {} to delete",
            plan.count(&PlanAction::Create) + plan.count(&PlanAction::Deferred { references: vec![] }),
            plan.count(&PlanAction::Update),
            plan.count(&PlanAction::Replace),
            plan.count(&PlanAction::Delete)
        );
    } else {
        println!("No changes. Route 53 matches the stack.");
    }
}

async fn show_state(
    store: &dyn r53_core::StateStore,
    command: StateCommand,
) -> Result<R53ExitCode> {
    match command {
        StateCommand::List => {
            for address in store.list().await? {
                if let Some(record) = store.get(&address).await? {
                    println!("{}\t{}\t{}", address, record.kind, record.id);
                }
            }
        }
        StateCommand::Show { address } => {
            let record = store
                .get(&address)
                .await?
                .with_context(|| format!("{address} is not in state"))?;
            println!("{}", serde_json::to_string_pretty(&record)?);
        }
    }
    Ok(R53ExitCode::Success)
}

/// Log engine events until the engine is dropped
async fn report_events(events: tokio::sync::mpsc::Receiver<EngineEvent>) {
    let mut stream = ReceiverStream::new(events);
    while let Some(event) = stream.next().await {
        match event {
            EngineEvent::Planned {
                creates,
                updates,
                replaces,
                deletes,
            } => info!(creates, updates, replaces, deletes, "Plan computed"),
            EngineEvent::Drifted { address, id } => {
                warn!(%address, %id, "Tracked resource is gone and will be recreated")
            }
            EngineEvent::ActionStarted { address, action } => info!(%address, %action, "Started"),
            EngineEvent::ActionSucceeded {
                address,
                action,
                id,
            } => info!(%address, %action, %id, "Done"),
            EngineEvent::ActionFailed {
                address,
                action,
                error,
                retry_count,
            } => error!(%address, %action, retry_count, "Failed: {}", error),
            EngineEvent::Imported { address, id } => info!(%address, %id, "Imported"),
        }
    }
}
