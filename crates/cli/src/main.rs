//! CLI entrypoint: interactive chat, one-shot run, and tool listing.

mod config;

use std::io::Write as _;
use std::sync::Arc;

use agent::{LlmProvider, OpenAiProvider, ReactEngine, SqliteMemory, Supervisor, ToolRegistry};
use clap::{Parser, Subcommand};
use proto::{ApprovalPolicy, SessionId};
use tools::{FamilyMemberTool, FamilyNamesTool, WeatherTool};
use tracing::info;
use tracing_subscriber::EnvFilter;

use config::Config;

/// Top-level command-line arguments for the toolgate application.
#[derive(Parser)]
#[command(name = "toolgate")]
#[command(about = "Human-in-the-loop tool-calling agent", version = "0.1.0")]
struct Cli {
    /// Path to config file
    #[arg(short, long)]
    config: Option<std::path::PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "warn")]
    log_level: String,

    /// Session key to converse under
    #[arg(short, long, default_value = "default")]
    session: String,

    #[command(subcommand)]
    command: Option<Commands>,
}

/// CLI subcommands available in the application.
#[derive(Subcommand)]
enum Commands {
    /// Interactive chat (default when no subcommand is given)
    Chat,

    /// Send a single message and exit
    Run {
        /// Message to send to the agent
        #[arg(short = 'e', long)]
        exec: String,
    },

    /// List registered tools and their confirmation requirements
    Tools,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(&cli.log_level);

    let session = SessionId::from(cli.session.as_str());
    match cli.command.unwrap_or(Commands::Chat) {
        Commands::Tools => {
            list_tools();
            Ok(())
        }
        Commands::Chat => {
            let config = Config::load(cli.config.as_deref())?;
            let supervisor = build_supervisor(&config).await?;
            chat_loop(&supervisor, &session).await
        }
        Commands::Run { exec } => {
            let config = Config::load(cli.config.as_deref())?;
            let supervisor = build_supervisor(&config).await?;
            let reply = supervisor.invoke(&session, &exec).await?;
            println!("{}", reply.text);
            Ok(())
        }
    }
}

fn init_tracing(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

fn build_registry() -> ToolRegistry {
    let mut registry = ToolRegistry::new();
    registry.register(WeatherTool);
    registry.register(FamilyNamesTool);
    registry.register(FamilyMemberTool);
    registry
}

async fn build_supervisor(config: &Config) -> anyhow::Result<Supervisor> {
    let api_key = config.require_api_key()?;
    let llm: Arc<dyn LlmProvider> = match &config.llm.base_url {
        Some(url) => Arc::new(OpenAiProvider::with_base_url(api_key, url)),
        None => Arc::new(OpenAiProvider::new(api_key)),
    };

    let registry = Arc::new(build_registry());
    let memory = Arc::new(SqliteMemory::open(&config.agent.db_path).await?);

    let policy = match &config.agent.auto_approve {
        Some(names) => ApprovalPolicy::validated(names.iter().cloned(), registry.tool_names())?,
        None => registry.approval_policy(),
    }
    .with_max_auto_approvals(config.agent.max_auto_approvals);

    info!(
        model = %config.llm.model,
        auto_approve = ?policy.auto_approved_names(),
        "Supervisor ready"
    );

    let mut engine = ReactEngine::new(llm, registry, memory, &config.llm.model);
    if let Some(prompt) = &config.agent.system_prompt {
        engine = engine.with_system_prompt(prompt);
    }

    Ok(Supervisor::new(Arc::new(engine), policy))
}

async fn chat_loop(supervisor: &Supervisor, session: &SessionId) -> anyhow::Result<()> {
    use tokio::io::AsyncBufReadExt;

    println!("toolgate — session '{session}'. Ctrl-D to exit.");
    let stdin = tokio::io::BufReader::new(tokio::io::stdin());
    let mut lines = stdin.lines();

    loop {
        print!("> ");
        std::io::stdout().flush()?;
        let Some(line) = lines.next_line().await? else {
            break;
        };
        let input = line.trim();
        if input.is_empty() {
            continue;
        }
        match supervisor.invoke(session, input).await {
            Ok(reply) => println!("{}", reply.text),
            Err(e) => eprintln!("error: {e}"),
        }
    }

    Ok(())
}

fn list_tools() {
    let registry = build_registry();
    let mut defs = registry.definitions();
    defs.sort_by(|a, b| a.name.cmp(&b.name));
    for def in defs {
        let gated = registry.requires_confirmation(&def.name).unwrap_or(true);
        let tag = if gated { "confirm" } else { "auto" };
        println!("{:<40} [{tag}] {}", def.name, def.description);
    }
}
