use std::{process::ExitCode, sync::Arc};

use clap::Parser;
use console::style;
use log::{error, info};

use redditsaved::{remove_report, App, Cli, Config, RedditApi, Result};

pub fn initialize_logger(verbose: bool) {
    let default_filter = if verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .format_timestamp_secs()
        .format_module_path(true)
        .init();

    info!("Logger initialized");
}

async fn run(cli: Cli) -> Result<()> {
    if cli.clean {
        remove_report(&cli.output)?;
        println!("Removed {}", cli.output.display());
        return Ok(());
    }

    let config_path = cli.config.clone().unwrap_or_else(Config::default_path);
    let config = Config::load(&config_path)?;
    info!("Using configuration from {}", config_path.display());

    let api = RedditApi::new(config.request_timeout())?;
    let app = App::new(Arc::new(api), config);
    let summary = app.run(cli.run_options()).await?;

    info!("Run complete: {:?}", summary);
    Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    initialize_logger(cli.verbose);

    info!("Application starting up");

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{:?}", e);
            eprintln!("{} {}", style("Error:").red().bold(), e);
            ExitCode::from(e.exit_code())
        }
    }
}
