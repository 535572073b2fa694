mod dry_run;

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

use flowpilot_runtime::{ChannelSink, CoordinatorConfig, ExecutionCoordinator, ProgressEvent};
use flowpilot_store::{FsWorkflowStore, WorkflowStore};
use flowpilot_workflow::{NodeKind, Workflow};

use crate::dry_run::DryRunExecutor;

/// Flowpilot - build, validate and run browser-automation workflows
#[derive(Parser)]
#[command(name = "flowpilot")]
#[command(version, about, long_about = None)]
struct Cli {
  /// Path to the data directory (default: ~/.flowpilot)
  #[arg(long, global = true)]
  data_dir: Option<PathBuf>,

  #[command(subcommand)]
  command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
  /// Check a workflow file and print every violation
  Validate {
    /// Path to the workflow JSON document
    workflow_file: PathBuf,
  },

  /// Dry-run a workflow, streaming progress to stderr
  Run {
    /// Path to the workflow JSON document
    workflow_file: PathBuf,

    /// Fail any node that runs longer than this
    #[arg(long)]
    node_timeout_ms: Option<u64>,

    /// Report nodes of this type as failed (repeatable)
    #[arg(long = "fail-on", value_name = "TYPE")]
    fail_on: Vec<String>,
  },

  /// Validate a workflow file and save it to the data directory
  Save {
    /// Path to the workflow JSON document
    workflow_file: PathBuf,
  },

  /// List saved workflows
  List,

  /// Delete a saved workflow
  Delete {
    /// Id of the workflow to delete
    workflow_id: String,
  },
}

fn main() -> Result<()> {
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("flowpilot=info,warn")),
    )
    .with_target(false)
    .with_writer(std::io::stderr)
    .init();

  let cli = Cli::parse();

  let data_dir = match cli.data_dir {
    Some(dir) => dir,
    None => dirs::home_dir()
      .context("could not determine home directory")?
      .join(".flowpilot"),
  };

  match cli.command {
    Some(Commands::Validate { workflow_file }) => validate_workflow(&workflow_file)?,
    Some(Commands::Run {
      workflow_file,
      node_timeout_ms,
      fail_on,
    }) => {
      let rt = tokio::runtime::Runtime::new()?;
      rt.block_on(run_workflow(workflow_file, node_timeout_ms, fail_on))?;
    }
    Some(Commands::Save { workflow_file }) => {
      let rt = tokio::runtime::Runtime::new()?;
      rt.block_on(save_workflow(workflow_file, data_dir))?;
    }
    Some(Commands::List) => {
      let rt = tokio::runtime::Runtime::new()?;
      rt.block_on(list_workflows(data_dir))?;
    }
    Some(Commands::Delete { workflow_id }) => {
      let rt = tokio::runtime::Runtime::new()?;
      rt.block_on(delete_workflow(workflow_id, data_dir))?;
    }
    None => {
      println!("flowpilot - use --help to see available commands");
    }
  }

  Ok(())
}

fn read_workflow(workflow_file: &Path) -> Result<Workflow> {
  let content = std::fs::read_to_string(workflow_file)
    .with_context(|| format!("failed to read workflow file: {}", workflow_file.display()))?;

  Workflow::from_json_str(&content)
    .with_context(|| format!("failed to parse workflow file: {}", workflow_file.display()))
}

fn validate_workflow(workflow_file: &Path) -> Result<()> {
  let workflow = read_workflow(workflow_file)?;
  let violations = flowpilot_validator::validate(&workflow);

  let mut errors = 0;
  for violation in &violations {
    if violation.is_error() {
      errors += 1;
      eprintln!("error: {}", violation);
    } else {
      eprintln!("warning: {}", violation);
    }
  }

  if errors > 0 {
    bail!("workflow '{}' has {} error(s)", workflow.id, errors);
  }

  println!(
    "workflow '{}' is valid ({} nodes, {} connections)",
    workflow.id,
    workflow.node_count(),
    workflow.connection_count()
  );
  Ok(())
}

async fn run_workflow(
  workflow_file: PathBuf,
  node_timeout_ms: Option<u64>,
  fail_on: Vec<String>,
) -> Result<()> {
  let workflow = read_workflow(&workflow_file)?;
  eprintln!("Loaded workflow: {}", workflow.name);

  let mut config = CoordinatorConfig::default();
  if let Some(ms) = node_timeout_ms {
    config = config.with_node_timeout(Duration::from_millis(ms));
  }

  let executor = DryRunExecutor::new(fail_on.into_iter().map(NodeKind::from));
  let (sink, mut events) = ChannelSink::channel();
  let coordinator = ExecutionCoordinator::with_sink(executor, config, sink);

  let handle = coordinator
    .start(&workflow)
    .context("failed to start workflow")?;
  eprintln!("Started run: {}", handle.run_id());

  let printer = tokio::spawn(async move {
    while let Some(event) = events.recv().await {
      print_event(&event);
    }
  });
  let ctrl_c = tokio::spawn(stop_on_ctrl_c(handle.cancel_token()));

  let summary = handle.wait().await.context("workflow run failed")?;
  ctrl_c.abort();

  // Dropping the coordinator drops the last sender and ends the printer.
  drop(coordinator);
  printer.await?;

  println!("{}", serde_json::to_string_pretty(&summary)?);

  if summary.cancelled {
    bail!("run stopped after {} of {} nodes", summary.executed(), summary.total);
  }
  if summary.failed > 0 {
    bail!("{} of {} nodes failed", summary.failed, summary.total);
  }
  Ok(())
}

async fn stop_on_ctrl_c(cancel: CancellationToken) {
  if tokio::signal::ctrl_c().await.is_ok() {
    eprintln!("Stopping run...");
    cancel.cancel();
  }
}

fn print_event(event: &ProgressEvent) {
  match event {
    ProgressEvent::Progress { current, total } => eprintln!("[{}/{}]", current, total),
    ProgressEvent::NodeResult(result) => {
      let status = if result.success { "ok" } else { "FAILED" };
      eprintln!(
        "  {} {} ({}) {} [{}ms]",
        status, result.node_id, result.kind, result.message, result.duration_ms
      );
    }
    ProgressEvent::Complete(summary) => eprintln!(
      "Run completed: {} succeeded, {} failed in {}ms",
      summary.succeeded, summary.failed, summary.elapsed_ms
    ),
  }
}

async fn save_workflow(workflow_file: PathBuf, data_dir: PathBuf) -> Result<()> {
  let workflow = read_workflow(&workflow_file)?;
  let store = FsWorkflowStore::new(data_dir.join("workflows"));

  store
    .save(&workflow)
    .await
    .with_context(|| format!("failed to save workflow '{}'", workflow.id))?;

  eprintln!("Saved workflow: {}", workflow.id);
  Ok(())
}

async fn list_workflows(data_dir: PathBuf) -> Result<()> {
  let store = FsWorkflowStore::new(data_dir.join("workflows"));
  let workflows = store.list().await.context("failed to list workflows")?;

  if workflows.is_empty() {
    eprintln!("No saved workflows in {}", store.root().display());
  }
  for workflow in workflows {
    println!("{}\t{}\t{} nodes", workflow.id, workflow.name, workflow.node_count);
  }
  Ok(())
}

async fn delete_workflow(workflow_id: String, data_dir: PathBuf) -> Result<()> {
  let store = FsWorkflowStore::new(data_dir.join("workflows"));
  store
    .delete(&workflow_id)
    .await
    .with_context(|| format!("failed to delete workflow '{}'", workflow_id))?;

  eprintln!("Deleted workflow: {}", workflow_id);
  Ok(())
}
