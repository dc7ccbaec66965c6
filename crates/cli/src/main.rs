mod skill_commands;

use std::path::PathBuf;

use {
    clap::{Parser, Subcommand},
    tracing::debug,
    tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt},
};

#[derive(Parser)]
#[command(
    name = "agent-evolver",
    version,
    about = "Install reusable skills into AI coding assistants"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Log level (trace, debug, info, warn, error).
    #[arg(long, global = true, default_value = "info")]
    log_level: String,

    /// Output logs as JSON instead of human-readable.
    #[arg(long, global = true, default_value_t = false)]
    json_logs: bool,

    /// Directory containing universal skill definitions.
    #[arg(long, global = true, env = "AGENT_EVOLVER_SKILLS_DIR")]
    skills_dir: Option<PathBuf>,

    /// Custom config directory (overrides default ~/.config/agent-evolver/).
    #[arg(long, global = true, env = "AGENT_EVOLVER_CONFIG_DIR")]
    config_dir: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Install skills for a coding assistant.
    #[command(
        after_help = "Exit status: 0 when every skill installed or none were found, \
                      1 when any skill failed to install (including partial installs)."
    )]
    Install {
        /// Agent identifier (claude-code, cursor, aider). Detected when omitted.
        #[arg(short, long)]
        agent: Option<String>,
        /// Install only this skill.
        #[arg(short, long)]
        skill: Option<String>,
        /// Install into the home directory instead of the current project.
        #[arg(short, long)]
        global: bool,
        /// Emit the install report as JSON.
        #[arg(long)]
        json: bool,
    },
    /// List available skills.
    List,
    /// Show which coding assistants are installed.
    Detect,
}

fn init_telemetry(cli: &Cli) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cli.log_level));

    let registry = tracing_subscriber::registry().with(filter);

    // Logs go to stderr so stdout stays clean for command output.
    if cli.json_logs {
        registry
            .with(
                fmt::layer()
                    .json()
                    .with_target(true)
                    .with_thread_ids(false)
                    .with_writer(std::io::stderr),
            )
            .init();
    } else {
        registry
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_thread_ids(false)
                    .with_ansi(true)
                    .with_writer(std::io::stderr),
            )
            .init();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    init_telemetry(&cli);
    debug!(version = env!("CARGO_PKG_VERSION"), "agent-evolver starting");

    if let Some(ref dir) = cli.config_dir {
        evolver_config::set_config_dir(dir.clone());
    }
    let config = evolver_config::discover_and_load();
    let skills_dir = config.skills_source_dir(cli.skills_dir.as_deref());
    debug!(skills_dir = %skills_dir.display(), "resolved skills source");

    match cli.command {
        Commands::Install {
            agent,
            skill,
            global,
            json,
        } => {
            let options = skill_commands::InstallOptions {
                agent,
                skill,
                global,
                json,
            };
            skill_commands::handle_install(&config, skills_dir, options).await
        },
        Commands::List => skill_commands::handle_list(skills_dir).await,
        Commands::Detect => skill_commands::handle_detect(),
    }
}
