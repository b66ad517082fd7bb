use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "pizza_delivery")]
#[command(about = "A bounded order pipeline: intake, preparation and delivery")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the pipeline until the run duration elapses or Ctrl-C is pressed
    Run(RunArgs),

    /// Print the effective configuration as JSON
    ShowConfig {
        /// JSON configuration file (durations in milliseconds)
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
}

/// Options for the run command. Flags override values from the config file.
#[derive(Args, Debug, Clone, Default)]
pub struct RunArgs {
    /// JSON configuration file (durations in milliseconds)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Number of preparation workers (cooks)
    #[arg(long)]
    pub cooks: Option<usize>,

    /// Number of delivery workers (drivers)
    #[arg(long)]
    pub drivers: Option<usize>,

    /// Capacity of both the intake and the delivery queue
    #[arg(long)]
    pub capacity: Option<usize>,

    /// Interval between new orders in milliseconds
    #[arg(long)]
    pub tick_ms: Option<u64>,

    /// Preparation time per order in milliseconds
    #[arg(long)]
    pub prep_ms: Option<u64>,

    /// Lower bound of the random delivery time in milliseconds
    #[arg(long)]
    pub min_delivery_ms: Option<u64>,

    /// Upper bound (exclusive) of the random delivery time in milliseconds
    #[arg(long)]
    pub max_delivery_ms: Option<u64>,

    /// Stop after this many seconds
    #[arg(short, long, conflicts_with = "until_ctrl_c")]
    pub duration_secs: Option<u64>,

    /// Ignore the run duration and keep running until Ctrl-C
    #[arg(long)]
    pub until_ctrl_c: bool,

    /// Deliveries per batch summary
    #[arg(short, long)]
    pub batch_size: Option<usize>,

    /// Stop producing after this many orders
    #[arg(short = 'n', long)]
    pub max_orders: Option<usize>,

    /// Print the final summary as JSON
    #[arg(long)]
    pub json: bool,

    /// Suppress lifecycle events
    #[arg(short, long)]
    pub quiet: bool,
}
