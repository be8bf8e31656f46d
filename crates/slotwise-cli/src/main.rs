use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

mod commands;

#[derive(Parser)]
#[command(name = "slotwise", version, about = "Deadline-aware task allocation and risk scoring")]
struct Cli {
    /// Config file to use instead of the default location
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Log engine decisions to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Allocate pending items into free time
    Plan(commands::engine::PlanArgs),
    /// Score deadline-miss risk against the committed schedule
    Risk(commands::engine::InputArgs),
    /// Predict the overall outcome score
    Outcome(commands::engine::OutcomeArgs),
    /// Allocate, then score risk and predict the outcome
    Assess(commands::engine::PlanArgs),
    /// Propose an earlier slot for one scheduled item
    Propose(commands::engine::ProposeArgs),
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
}

const LOG_ENV: &str = "SLOTWISE_LOG";

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_ansi(false)
                .with_target(true),
        )
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = cli.config.as_deref();
    let result = match cli.command {
        Commands::Plan(args) => commands::engine::plan(args, config),
        Commands::Risk(args) => commands::engine::risk(args, config),
        Commands::Outcome(args) => commands::engine::outcome(args, config),
        Commands::Assess(args) => commands::engine::assess(args, config),
        Commands::Propose(args) => commands::engine::propose(args, config),
        Commands::Config { action } => commands::config::run(action, config),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
