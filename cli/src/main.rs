//! CLI entrypoint for hybrid-rag
//!
//! This is the main binary that wires together all layers using
//! dependency injection.

mod ingest;

use anyhow::{Context, Result, anyhow};
use clap::Parser;
use rag_application::{
    Agent, ConversationLogger, Dispatcher, DomainAgent, Embedder, GenerationBackend, NoProgress,
    ProgressNotifier, Retriever, ToolExecutorPort, VectorIndex,
};
use rag_domain::AgentDomain;
use rag_infrastructure::{
    ConfigLoader, FileConfig, JsonlConversationLogger, OpenAiChatBackend,
    ToolCallClient, build_http_client, embedder_from_config, index_from_config,
    tool_client_from_config,
};
use rag_presentation::{
    ChatRepl, Cli, Command, ConsoleFormatter, OutputFormat, OutputFormatter, ProgressReporter,
    SimpleProgress, StatusEntry,
};
use std::io::IsTerminal;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// Shared handles behind every agent; the dispatcher owns the embedder
/// and the vector index
struct Services {
    config: FileConfig,
    tools: Arc<ToolCallClient>,
    dispatcher: Arc<Dispatcher>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging based on verbosity level; RUST_LOG wins when set
    let default_level = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    if cli.show_config {
        ConfigLoader::print_config_sources();
        return Ok(());
    }

    let config = if cli.no_config {
        ConfigLoader::load_defaults()
    } else {
        ConfigLoader::load(cli.config.as_ref())
            .map_err(|e| anyhow!("failed to load configuration: {}", e))?
    };
    config.validate().context("invalid configuration")?;

    info!("Starting hybrid-rag");

    let Some(command) = cli.command.clone() else {
        anyhow::bail!("No command given. Try `hybrid-rag ask --domain chat \"...\"` or `hybrid-rag --help`.");
    };

    let services = build_services(config).await?;

    match command {
        Command::Ask { domain, question } => ask(&cli, &services, &domain, &question).await,
        Command::Chat { domain } => chat(&cli, &services, &domain).await,
        Command::Ingest { collection, file } => ingest_file(&services, &collection, &file).await,
        Command::Status => status(&cli, &services).await,
        Command::Tools => {
            println!("{}", ConsoleFormatter::format_tools(services.tools.tool_spec().all()));
            Ok(())
        }
    }
}

// === Dependency Injection ===
async fn build_services(config: FileConfig) -> Result<Services> {
    let embedder: Arc<dyn Embedder> = embedder_from_config(&config.embedding);
    let index: Arc<dyn VectorIndex> = Arc::new(index_from_config(&config));

    // The client-wide ceiling only guards against hung connections;
    // per-tool timeouts are enforced by the tool-call client.
    let http = build_http_client(Duration::from_secs(60));
    let tools = Arc::new(tool_client_from_config(&config, http).await);

    let retriever = Arc::new(Retriever::new(
        embedder.clone(),
        index.clone(),
        tools.clone() as Arc<dyn ToolExecutorPort>,
        config.retrieval.to_params(),
    ));

    let backend: Arc<dyn GenerationBackend> =
        Arc::new(OpenAiChatBackend::from_config(&config.generation));

    let logger: Option<Arc<dyn ConversationLogger>> = match &config.logging.conversation_log {
        Some(path) => match JsonlConversationLogger::open(path) {
            Ok(logger) => Some(Arc::new(logger)),
            Err(e) => {
                warn!(path = %path, error = %e, "Conversation log disabled");
                None
            }
        },
        None => None,
    };

    let mut dispatcher = Dispatcher::new(embedder, index)
        .with_max_history_turns(config.agents.max_history_turns);
    for domain in AgentDomain::ALL {
        let mut agent =
            DomainAgent::new(config.agent_profile(domain), retriever.clone(), backend.clone());
        if let Some(logger) = &logger {
            agent = agent.with_conversation_logger(logger.clone());
        }
        dispatcher = dispatcher.register(Arc::new(agent));
    }

    Ok(Services {
        config,
        tools,
        dispatcher: Arc::new(dispatcher),
    })
}

/// Spinner on a terminal, plain lines otherwise, nothing with `-q`
fn progress_for(cli: &Cli) -> Box<dyn ProgressNotifier> {
    if cli.quiet || cli.output == OutputFormat::Json {
        Box::new(NoProgress)
    } else if std::io::stderr().is_terminal() {
        Box::new(ProgressReporter::new())
    } else {
        Box::new(SimpleProgress)
    }
}

async fn ask(cli: &Cli, services: &Services, domain: &str, question: &str) -> Result<()> {
    let agent = services.dispatcher.resolve(domain)?;
    let mut context = services.dispatcher.new_session(agent.domain())?;

    let cancel = CancellationToken::new();
    let watcher = {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                cancel.cancel();
            }
        })
    };

    let progress = progress_for(cli);
    let result = services
        .dispatcher
        .dispatch_with(question, &mut context, progress.as_ref(), &cancel)
        .await;
    watcher.abort();

    let response = result?;
    println!("{}", ConsoleFormatter.render(&response, cli.output));
    Ok(())
}

async fn chat(cli: &Cli, services: &Services, domain: &str) -> Result<()> {
    let domain: AgentDomain = domain.parse()?;
    let repl_config = &services.config.repl;

    let mut repl = ChatRepl::new(services.dispatcher.clone(), domain)?
        .with_progress(repl_config.show_progress && !cli.quiet);
    if let Some(path) = &repl_config.history_file {
        repl = repl.with_history_file(Some(PathBuf::from(path)));
    }

    repl.run().await?;
    Ok(())
}

async fn ingest_file(services: &Services, collection: &str, file: &Path) -> Result<()> {
    let input = tokio::fs::read_to_string(file)
        .await
        .with_context(|| format!("failed to read {}", file.display()))?;
    let records = ingest::parse_records(&input)?;
    if records.is_empty() {
        warn!(file = %file.display(), "No records to ingest");
    }

    let stored = ingest::ingest(
        services.dispatcher.embedder().as_ref(),
        services.dispatcher.index().as_ref(),
        collection,
        records,
        services.config.embedding.batch_size,
    )
    .await?;

    println!("Stored {} documents in '{}'", stored, collection);
    Ok(())
}

async fn status(cli: &Cli, services: &Services) -> Result<()> {
    let mut entries = Vec::new();
    for domain in services.dispatcher.domains() {
        let profile = services.dispatcher.agent(domain)?.profile().clone();
        let documents = services
            .dispatcher
            .index()
            .count(&profile.collection)
            .await
            .map_err(|e| e.to_string());
        entries.push(StatusEntry {
            domain,
            web_search: profile.can_escalate()
                && services.tools.tool_spec().get(rag_domain::tool::WEB_SEARCH).is_some(),
            collection: profile.collection,
            documents,
        });
    }

    let output = match cli.output {
        OutputFormat::Text => ConsoleFormatter::format_status(&entries),
        OutputFormat::Json => ConsoleFormatter::format_status_json(&entries),
    };
    println!("{}", output);
    Ok(())
}
