mod demo;

use anyhow::Result;
use canopy_tree::TreeConfig;
use clap::{Parser, Subcommand};
use colored::Colorize;
use tracing::debug;

#[derive(Parser)]
#[command(name = "canopy")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Show descendant notifications and the tree outline after every step
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Log filter used when RUST_LOG is not set
    #[arg(long, global = true, default_value = "warn")]
    log_level: String,

    /// Dispose nodes as soon as they are detached
    #[arg(long, global = true)]
    dispose_on_detach: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Attach and detach a small menu tree, printing every hook
    Lifecycle {
        /// Number of items under the menu
        #[arg(short, long, default_value_t = 3)]
        items: usize,
    },
    /// Route views through a bounded host and show where each one lands
    Views {
        /// How many views the window host accepts
        #[arg(short, long, default_value_t = 2)]
        capacity: usize,
        /// Number of dialogs to open
        #[arg(short, long, default_value_t = 3)]
        dialogs: usize,
    },
    /// Dispose a node while background work is bound to it
    Dispose {
        /// How long the background work takes, in milliseconds
        #[arg(long, default_value_t = 50)]
        work_ms: u64,
        /// Dispose the node after this many milliseconds
        #[arg(long, default_value_t = 10)]
        after_ms: u64,
    },
}

fn init_tracing(log_level: &str) {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level)),
        )
        .with_target(false)
        .with_thread_ids(false)
        .with_thread_names(false)
        .with_file(false)
        .with_line_number(false)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(&cli.log_level);

    let config = TreeConfig::new()
        .dispose_on_detach(cli.dispose_on_detach)
        .log_notifications(cli.verbose);
    debug!(
        dispose_on_detach = config.disposes_on_detach(),
        trace_notifications = config.logs_notifications(),
        "tree config"
    );

    let outcome = match cli.command {
        Commands::Lifecycle { items } => demo::lifecycle(config, items, cli.verbose),
        Commands::Views { capacity, dialogs } => demo::views(config, capacity, dialogs, cli.verbose),
        Commands::Dispose { work_ms, after_ms } => demo::dispose(config, work_ms, after_ms),
    };

    if let Err(err) = &outcome {
        eprintln!("{} {}", "error:".red().bold(), err);
        if cli.verbose {
            for cause in err.chain().skip(1) {
                eprintln!("  {} {}", "caused by:".yellow(), cause);
            }
        }
        std::process::exit(1);
    }
    Ok(())
}
