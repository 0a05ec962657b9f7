use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use gema_core::{agent, config, memory, providers};
use std::sync::Arc;
use tokio::io::{AsyncWriteExt, BufReader};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "gema")]
#[command(about = "gema - terminal chat with tool calling", long_about = None)]
struct Cli {
    /// Chat without advertising tools to the model
    #[arg(long, global = true)]
    no_tools: bool,

    /// Log at info level unless RUST_LOG is set
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a default config file to ~/.gema/config.toml
    Init,
    /// Start an interactive chat, or answer one message with -m
    Chat {
        /// Send one message and exit
        #[arg(short, long)]
        message: Option<String>,
    },
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "info" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let _ = dotenvy::dotenv();
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command.unwrap_or(Commands::Chat { message: None }) {
        Commands::Init => {
            if config::config_exists() {
                println!(
                    "Config already exists at {}",
                    config::get_config_path().display()
                );
                return Ok(());
            }
            let path = config::save_config(&config::Config::default())?;
            println!("Wrote {}", path.display());
        }
        Commands::Chat { message } => {
            let mut config = config::Config::load_or_default()?;
            if cli.no_tools {
                config.tools_enabled = false;
            }

            let provider: Arc<dyn gema_core::Provider> = providers::create_provider(&config)
                .context("Could not set up the model provider")?
                .into();
            let context_builder = agent::ContextBuilder::new(config.system_prompt.clone());
            let tool_registry = Arc::new(agent::ToolRegistry::builtin());

            tracing::info!(
                provider = provider.name(),
                model = config.model.as_deref().unwrap_or("default"),
                tools = config.tools_enabled,
                "session started"
            );

            let agent_loop = agent::AgentLoop::new(
                provider,
                context_builder,
                tool_registry,
                memory::create_memory(),
            )
            .with_tools_enabled(config.tools_enabled);

            if let Some(msg) = message {
                run_once(agent_loop, &config, &msg).await?;
            } else {
                run_interactive(agent_loop, &config).await?;
            }
        }
    }

    Ok(())
}

async fn run_once(
    mut agent_loop: agent::AgentLoop,
    config: &config::Config,
    msg: &str,
) -> Result<()> {
    match agent_loop.process(msg).await {
        Ok(response) => {
            println!("{}: {}", config.assistant_name, response);
            Ok(())
        }
        Err(e) => {
            eprintln!("{} {}", agent::repl::FAILURE_PREFIX, e);
            anyhow::bail!("Agent processing failed: {}", e);
        }
    }
}

async fn run_interactive(agent_loop: agent::AgentLoop, config: &config::Config) -> Result<()> {
    let mut repl = agent::Repl::new(agent_loop, agent::ReplOptions::from(config));
    let mut stdout = tokio::io::stdout();
    let mut stderr = tokio::io::stderr();

    let exit = repl
        .run(
            BufReader::new(tokio::io::stdin()),
            &mut stdout,
            &mut stderr,
            shutdown_signal(),
        )
        .await?;

    if exit == agent::ReplExit::Shutdown {
        stdout.write_all(b"\n").await?;
    }
    stdout.flush().await?;
    tracing::info!(?exit, "session ended");

    // tokio's stdin reader thread would otherwise block runtime shutdown.
    std::process::exit(0);
}

async fn shutdown_signal() {
    #[cfg(unix)]
    {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                tokio::select! {
                    _ = sigterm.recv() => {}
                    _ = tokio::signal::ctrl_c() => {}
                }
            }
            Err(e) => {
                tracing::warn!(error = %e, "could not install SIGTERM handler");
                let _ = tokio::signal::ctrl_c().await;
            }
        }
    }

    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }
}
