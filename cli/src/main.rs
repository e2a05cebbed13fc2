//! CLI entrypoint for toolweave
//!
//! This is the main binary that wires together all layers using
//! dependency injection.

mod commands;
mod output;

use anyhow::{Context, Result, bail};
use clap::Parser;
use colored::Colorize;
use commands::Cli;
use output::ConsoleFormatter;
use std::path::Path;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use toolweave_application::{ChatGateway, RunAgentInput, RunAgentUseCase};
use toolweave_domain::{AgentConfig, AgentResponse, ToolCatalog};
use toolweave_infrastructure::{
    BuiltinToolSet, CatalogToolExecutor, ConfigLoader, DocumentIndex, FileConfig,
    JsonlTranscriptWriter,
};
use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let _log_guard = init_logging(cli.verbose, cli.log_file.as_deref())?;

    info!("Starting toolweave");

    // === Configuration ===
    let file_config = if cli.no_config {
        ConfigLoader::load_defaults()
    } else {
        ConfigLoader::new()
            .with_explicit_path(cli.config.clone())
            .load()?
    };
    let agent_config = agent_config(&cli, &file_config);

    if cli.show_config {
        let mut effective = file_config.clone();
        effective.agent = agent_config;
        print!("{}", effective.to_toml()?);
        return Ok(());
    }

    // === Dependency Injection ===
    let catalog = Arc::new(ToolCatalog::new());
    let index = Arc::new(DocumentIndex::new());
    let root = cli
        .root
        .clone()
        .or_else(|| file_config.tools.root.clone())
        .unwrap_or_else(|| ".".into());

    let mut builtins = BuiltinToolSet::new(root).with_index(Arc::clone(&index));
    if let Some(enabled) = &file_config.tools.enabled {
        builtins = builtins.with_enabled(enabled.iter().cloned());
    }
    let registered = builtins.register_into(&catalog);
    info!("Registered {} builtin tools", registered);

    if let Some(docs) = cli.docs.as_ref().or(file_config.tools.docs_dir.as_ref()) {
        let loaded = index
            .load_dir(docs, file_config.tools.docs_tenant.as_deref())
            .map_err(|e| anyhow::anyhow!("{}", e.message))
            .with_context(|| format!("Failed to load documents from {}", docs.display()))?;
        info!("Indexed {} passages from {}", loaded, docs.display());
    }

    if cli.list_tools {
        print!("{}", ConsoleFormatter::format_tools(&catalog.list_all()));
        return Ok(());
    }

    let Some(message) = cli.message.clone() else {
        bail!("A message is required. Use --list-tools or --show-config to inspect the setup.");
    };

    let mut executor = CatalogToolExecutor::new(Arc::clone(&catalog));
    if let Some(timeout) = file_config.tools.call_timeout() {
        executor = executor.with_call_timeout(timeout);
    }

    let mut input = RunAgentInput::new(message).with_config(agent_config);
    if let Some(tenant) = &cli.tenant {
        input = input.with_tenant(tenant.clone());
    }

    #[cfg(feature = "openai")]
    let response = run(&cli, build_gateway(&file_config)?, Arc::new(executor), input).await?;
    #[cfg(not(feature = "openai"))]
    let response: AgentResponse = {
        let _ = (executor, input);
        bail!("toolweave was built without a chat provider; enable the `openai` feature")
    };

    if let Some(path) = &cli.transcript {
        let writer = JsonlTranscriptWriter::open(path)
            .with_context(|| format!("Failed to open transcript {}", path.display()))?;
        writer.write_response(&response)?;
        info!("Transcript written to {}", writer.path().display());
    }

    if cli.json {
        println!("{}", ConsoleFormatter::format_json(&response)?);
    } else {
        println!("{}", ConsoleFormatter::format(&response));
    }

    Ok(())
}

/// Run one request, cancelling it on Ctrl-C
#[cfg(feature = "openai")]
async fn run<G: ChatGateway + 'static>(
    cli: &Cli,
    gateway: Arc<G>,
    executor: Arc<CatalogToolExecutor>,
    input: RunAgentInput,
) -> Result<AgentResponse> {
    let token = CancellationToken::new();
    let ctrl_c_token = token.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupted, cancelling request");
            ctrl_c_token.cancel();
        }
    });

    let use_case = RunAgentUseCase::new(gateway, executor).with_cancellation(token);

    let result = if cli.stream && !cli.json {
        let mut stream = use_case.process_stream(input);
        while let Some(event) = stream.next_event().await {
            if let Some(line) = ConsoleFormatter::format_event(&event) {
                eprintln!("{}", line);
            }
        }
        eprintln!();
        stream.finish().await
    } else {
        use_case.process(input).await
    };

    if let Err(e) = &result
        && e.is_cancelled()
    {
        eprintln!("{}", "Request cancelled".yellow());
    }
    Ok(result?)
}

/// CLI flags layered over the file configuration
fn agent_config(cli: &Cli, file_config: &FileConfig) -> AgentConfig {
    let mut config = file_config.agent.clone();
    if let Some(max) = cli.max_tool_calls {
        config.max_tool_calls = max;
    }
    if cli.sequential {
        config.parallel_tools = false;
    }
    if cli.no_rag {
        config.use_rag = false;
    }
    config
}

#[cfg(feature = "openai")]
fn build_gateway(
    file_config: &FileConfig,
) -> Result<Arc<toolweave_infrastructure::OpenAiGateway>> {
    use toolweave_infrastructure::{OpenAiGateway, OpenAiSettings};

    let provider = &file_config.provider;
    let mut settings = OpenAiSettings::new(&provider.model)
        .with_base_url(&provider.base_url)
        .with_timeout(provider.timeout());
    if let Some(key) = provider.api_key() {
        settings = settings.with_api_key(key);
    }
    if let Some(temperature) = provider.temperature {
        settings = settings.with_temperature(temperature);
    }
    Ok(Arc::new(OpenAiGateway::new(settings)?))
}

/// Install the tracing subscriber: stderr plus an optional log file.
///
/// `RUST_LOG` takes precedence over the `-v` count.
fn init_logging(verbose: u8, log_file: Option<&Path>) -> Result<Option<WorkerGuard>> {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let stderr_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false);

    let (file_layer, guard) = match log_file {
        Some(path) => {
            let dir = path
                .parent()
                .filter(|p| !p.as_os_str().is_empty())
                .unwrap_or(Path::new("."));
            std::fs::create_dir_all(dir)
                .with_context(|| format!("Failed to create log directory {}", dir.display()))?;
            let file_name = path
                .file_name()
                .with_context(|| format!("Invalid log file path {}", path.display()))?;
            let appender = tracing_appender::rolling::never(dir, file_name);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = fmt::layer()
                .with_writer(writer)
                .with_ansi(false)
                .with_target(true);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(stderr_layer)
        .with(file_layer)
        .try_init()
        .context("Failed to initialize logging")?;

    Ok(guard)
}
