//! `outreach` — development/ops CLI for the outreach workflow engine.
//!
//! Loads a workflow definition file, compiles and validates its graph,
//! drives it end to end against in-memory collaborators, runs a scheduler
//! tick over a batch of records, or runs the built-in eval suite. Grounded
//! in `langgraph-cli`'s subcommand structure; deliberately minimal — no
//! dashboard, no auth, no durable storage.

mod config;
mod records;
mod scenarios;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use config::EngineConfig;
use outreach_checkpoint::InMemoryCheckpointSaver;
use outreach_eval::{Runner, StubJudge, Verifier};
use outreach_graph::{
    workflow_def, Contact, Edge, InvokeLlm, Record, Runtime, ThreadState, ToolExecutor,
    WorkflowDefinition,
};
use outreach_llm::{KeywordStub, OpenAiInvoker, RemoteLlmConfig};
use outreach_scheduler::{InMemoryRecordProvider, Scheduler, SchedulerRules};
use outreach_tools::{InMemoryRecordStore, LoggingCallGateway, LoggingEmailGateway, ToolRegistry};
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "outreach")]
#[command(about = "Development/ops CLI for the outreach workflow engine", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse and compile a workflow definition, reporting validation errors.
    Validate {
        /// Path to the workflow definition YAML file.
        file: PathBuf,
    },

    /// Render a workflow definition's graph as a Mermaid flowchart.
    Visualize {
        /// Path to the workflow definition YAML file.
        file: PathBuf,
    },

    /// Run a workflow to completion or its first interrupt against an
    /// in-memory checkpointer, optionally resuming with scripted values.
    Run {
        /// Path to the workflow definition YAML file.
        file: PathBuf,

        /// Path to a JSON file holding the initial `Record`.
        #[arg(long)]
        record: PathBuf,

        /// Path to a JSON file holding the initial `Contact` (optional).
        #[arg(long)]
        contact: Option<PathBuf>,

        /// Resume value JSON files, applied in order on successive
        /// interrupts. May be repeated.
        #[arg(long = "resume-with")]
        resume_with: Vec<PathBuf>,

        /// Keyword-stub LLM script entries, in call order. Ignored when
        /// `OPENAI_API_KEY` is set (the real client is used instead).
        #[arg(long = "llm-script")]
        llm_script: Vec<String>,
    },

    /// Run one scheduler tick over a batch of records read from a file.
    Tick {
        /// Path to the workflow definition YAML file.
        file: PathBuf,

        /// Path to a JSON file holding an array of schedulable records.
        #[arg(long)]
        records: PathBuf,
    },

    /// Run a workflow to its first interrupt, then immediately resume it
    /// with a supplied value, printing both the interrupt payload and the
    /// resumed outcome. A faithful `resume`-only entry point would need a
    /// checkpoint store that outlives the process; this harness keeps the
    /// full interrupt/resume round trip inside one invocation instead (see
    /// DESIGN.md).
    Resume {
        /// Path to the workflow definition YAML file.
        file: PathBuf,

        /// Path to a JSON file holding the initial `Record`.
        #[arg(long)]
        record: PathBuf,

        /// Path to a JSON file holding the initial `Contact` (optional).
        #[arg(long)]
        contact: Option<PathBuf>,

        /// Path to a JSON file holding the resume value fed to the first
        /// interrupt encountered.
        #[arg(long = "resume-value")]
        resume_value: PathBuf,

        /// Keyword-stub LLM script entries, in call order.
        #[arg(long = "llm-script")]
        llm_script: Vec<String>,
    },

    /// Run the built-in eval suite (the legacy topology's S1/S2/S6
    /// scenarios) and report pass/fail per verification check.
    Eval,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let config = EngineConfig::from_env().context("loading configuration from environment")?;

    match cli.command {
        Commands::Validate { file } => cmd_validate(&file),
        Commands::Visualize { file } => cmd_visualize(&file),
        Commands::Run {
            file,
            record,
            contact,
            resume_with,
            llm_script,
        } => cmd_run(&config, &file, &record, contact.as_deref(), &resume_with, llm_script).await,
        Commands::Tick { file, records } => cmd_tick(&file, &records).await,
        Commands::Resume {
            file,
            record,
            contact,
            resume_value,
            llm_script,
        } => cmd_resume(&config, &file, &record, contact.as_deref(), &resume_value, llm_script).await,
        Commands::Eval => cmd_eval().await,
    }
}

fn load_workflow(file: &std::path::Path) -> Result<WorkflowDefinition> {
    WorkflowDefinition::from_yaml_file(file)
        .with_context(|| format!("loading workflow definition from {}", file.display()))
}

fn load_json<T: serde::de::DeserializeOwned>(path: &std::path::Path) -> Result<T> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("reading {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("parsing {} as JSON", path.display()))
}

fn cmd_validate(file: &std::path::Path) -> Result<()> {
    let def = load_workflow(file)?;
    let graph = def.compile().context("compiling graph definition")?;
    println!("workflow {:?} is valid", def.id);
    println!("  entrypoint: {}", graph.entrypoint);
    println!("  model: {}", def.model);
    Ok(())
}

/// The fixed legacy topology's edges, mirroring `outreach_graph::graph::legacy_topology`
/// exactly (that function keeps its edge map private to `CompiledGraph`).
fn legacy_edges() -> Vec<(String, Edge)> {
    use outreach_graph::END;
    vec![
        (
            "analyzeRecord".to_string(),
            Edge::Conditional(vec![
                ("sendEmail".into(), "sendEmail".into()),
                ("sendCall".into(), "sendCall".into()),
                ("humanReview".into(), "humanReview".into()),
                ("markComplete".into(), "markComplete".into()),
            ]),
        ),
        ("sendEmail".to_string(), Edge::Static("waitForResponse".into())),
        ("sendCall".to_string(), Edge::Static("waitForResponse".into())),
        (
            "waitForResponse".to_string(),
            Edge::Conditional(vec![
                ("processResponse".into(), "processResponse".into()),
                (END.into(), END.into()),
            ]),
        ),
        (
            "processResponse".to_string(),
            Edge::Static("analyzeRecord".into()),
        ),
        (
            "humanReview".to_string(),
            Edge::Conditional(vec![
                ("analyzeRecord".into(), "analyzeRecord".into()),
                (END.into(), END.into()),
            ]),
        ),
        (
            "markComplete".to_string(),
            Edge::Conditional(vec![(END.into(), END.into())]),
        ),
    ]
}

fn declarative_edges(def: &workflow_def::GraphDefinitionSpec) -> Vec<(String, Edge)> {
    def.nodes
        .iter()
        .map(|(name, spec)| {
            let edge = match &spec.next {
                workflow_def::NextSpec::Static(target) => Edge::Static(target.clone()),
                workflow_def::NextSpec::Conditional(branches) => Edge::Conditional(
                    branches
                        .iter()
                        .map(|b| (b.condition.clone(), b.target.clone()))
                        .collect(),
                ),
            };
            (name.clone(), edge)
        })
        .collect()
}

fn cmd_visualize(file: &std::path::Path) -> Result<()> {
    let def = load_workflow(file)?;
    let graph = def.compile().context("compiling graph definition")?;
    let edges = match &def.graph_definition {
        Some(spec) => declarative_edges(spec),
        None => legacy_edges(),
    };
    print!("{}", outreach_graph::visualization::to_mermaid(&graph, &edges));
    Ok(())
}

fn build_llm(config: &EngineConfig, llm_script: Vec<String>, tools: Arc<dyn ToolExecutor>) -> Arc<dyn InvokeLlm> {
    match &config.openai_api_key {
        Some(api_key) => {
            let remote_config = RemoteLlmConfig::new(api_key.clone())
                .with_base_url("https://api.openai.com/v1");
            Arc::new(OpenAiInvoker::new(remote_config, tools))
        }
        None => {
            let script = if llm_script.is_empty() {
                vec!["needs_email".to_string(), "complete".to_string()]
            } else {
                llm_script
            };
            Arc::new(KeywordStub::new(script))
        }
    }
}

async fn build_tools_async(seed_record: &Record) -> Arc<dyn ToolExecutor> {
    let store = Arc::new(InMemoryRecordStore::new());
    store.seed(seed_record.clone()).await;
    Arc::new(ToolRegistry::with_default_handlers(
        Arc::new(LoggingEmailGateway::default()),
        Arc::new(LoggingCallGateway::default()),
        store,
    ))
}

async fn cmd_run(
    config: &EngineConfig,
    file: &std::path::Path,
    record_path: &std::path::Path,
    contact_path: Option<&std::path::Path>,
    resume_with: &[PathBuf],
    llm_script: Vec<String>,
) -> Result<()> {
    let def = load_workflow(file)?;
    let graph = def.compile().context("compiling graph definition")?;
    let record: Record = load_json(record_path)?;
    let contact: Option<Contact> = contact_path.map(load_json).transpose()?;

    let tools = build_tools_async(&record).await;
    let llm = build_llm(config, llm_script, tools.clone());
    let saver = InMemoryCheckpointSaver::new();
    let invoke_ctx = workflow_def::invoke_context(&def);
    let runtime = Runtime::new(graph, saver, llm, tools, invoke_ctx);

    let thread_id = format!("{}:{}", def.id, record.id);
    let initial = ThreadState::new(record, contact);

    let (_, mut outcome) = runtime.stream(&thread_id, Some(initial), None).await?;

    let mut resumes = resume_with.iter();
    loop {
        match outcome {
            outreach_graph::RunOutcome::Finished(state) => {
                println!("{}", serde_json::to_string_pretty(&state)?);
                return Ok(());
            }
            outreach_graph::RunOutcome::Interrupted { node, payload, .. } => {
                println!("interrupted at {node}: {payload}");
                match resumes.next() {
                    Some(resume_path) => {
                        let resume_value: serde_json::Value = load_json(resume_path)?;
                        let (_, next) = runtime.stream(&thread_id, None, Some(resume_value)).await?;
                        outcome = next;
                    }
                    None => {
                        println!("no more scripted resume values; stopping while interrupted");
                        return Ok(());
                    }
                }
            }
        }
    }
}

async fn cmd_resume(
    config: &EngineConfig,
    file: &std::path::Path,
    record_path: &std::path::Path,
    contact_path: Option<&std::path::Path>,
    resume_value_path: &std::path::Path,
    llm_script: Vec<String>,
) -> Result<()> {
    let def = load_workflow(file)?;
    let graph = def.compile().context("compiling graph definition")?;
    let record: Record = load_json(record_path)?;
    let contact: Option<Contact> = contact_path.map(load_json).transpose()?;

    let tools = build_tools_async(&record).await;
    let llm = build_llm(config, llm_script, tools.clone());
    let saver = InMemoryCheckpointSaver::new();
    let invoke_ctx = workflow_def::invoke_context(&def);
    let runtime = Runtime::new(graph, saver, llm, tools, invoke_ctx);

    let thread_id = format!("{}:{}", def.id, record.id);
    let initial = ThreadState::new(record, contact);

    let (_, outcome) = runtime.stream(&thread_id, Some(initial), None).await?;
    let (node, payload) = match outcome {
        outreach_graph::RunOutcome::Finished(state) => {
            println!("workflow finished without interrupting; nothing to resume");
            println!("{}", serde_json::to_string_pretty(&state)?);
            return Ok(());
        }
        outreach_graph::RunOutcome::Interrupted { node, payload, .. } => (node, payload),
    };
    println!("interrupted at {node}: {payload}");

    let resume_value: serde_json::Value = load_json(resume_value_path)?;
    let (_, outcome) = runtime.stream(&thread_id, None, Some(resume_value)).await?;
    match outcome {
        outreach_graph::RunOutcome::Finished(state) => {
            println!("{}", serde_json::to_string_pretty(&state)?);
        }
        outreach_graph::RunOutcome::Interrupted { node, payload, .. } => {
            println!("interrupted again at {node}: {payload}");
        }
    }
    Ok(())
}

async fn cmd_tick(file: &std::path::Path, records_path: &std::path::Path) -> Result<()> {
    let def = load_workflow(file)?;
    let graph = def.compile().context("compiling graph definition")?;
    let rules = SchedulerRules::default();

    let provider = InMemoryRecordProvider::new();
    for record in records::load_records(records_path)? {
        provider.seed(record).await;
    }

    let demo_record = Record {
        id: "scheduler-demo".into(),
        title: "scheduler demo".into(),
        status: outreach_graph::RecordStatus::Open,
        priority: None,
        record_type: "demo".into(),
        metadata: Default::default(),
    };
    let tools = build_tools_async(&demo_record).await;
    let llm: Arc<dyn InvokeLlm> = Arc::new(KeywordStub::new(vec!["needs_email", "complete"]));
    let saver = InMemoryCheckpointSaver::new();
    let invoke_ctx = workflow_def::invoke_context(&def);
    let runtime = Arc::new(Runtime::new(graph, saver, llm, tools, invoke_ctx));

    let scheduler = Scheduler::new(def.id.clone(), rules, runtime);
    let summary = scheduler.tick(&provider, chrono::Utc::now()).await?;

    for outcome in &summary.outcomes {
        println!(
            "{}: {:?} (reason={:?}, error={:?})",
            outcome.record_id, outcome.outcome, outcome.reason, outcome.error
        );
    }
    Ok(())
}

async fn cmd_eval() -> Result<()> {
    let judge = StubJudge;
    let runner = Runner::legacy();
    let verifier = Verifier::new(&judge);

    let mut any_failed = false;
    for scenario in scenarios::builtin() {
        let result = runner.run(&scenario).await?;
        let report = verifier.verify(&scenario, &result).await?;
        let status = if report.passed() { "PASS" } else { "FAIL" };
        println!("[{status}] {}", scenario.id);
        for check in &report.checks {
            if !check.passed {
                any_failed = true;
                println!("    FAILED {}: {}", check.name, check.detail);
            }
        }
    }

    if any_failed {
        anyhow::bail!("one or more eval scenarios failed");
    }
    Ok(())
}
