use anyhow::Result;
use clap::Parser;
use pizza_delivery::cli::{execute_run, execute_show_config, Cli, Commands};

fn init_tracing() {
    // ログはstderrへ。stdoutは --json の出力用に空けておく
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .with_target(false)
        .with_timer(tracing_subscriber::fmt::time::ChronoLocal::rfc_3339())
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Run(args) => {
            init_tracing();
            let summary = execute_run(args).await?;
            if !summary.failed_workers.is_empty() {
                std::process::exit(2);
            }
        }
        Commands::ShowConfig { config } => {
            execute_show_config(config.as_deref())?;
        }
    }

    Ok(())
}
