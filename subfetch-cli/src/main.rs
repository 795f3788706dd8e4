mod cli;
mod config;
mod error;

use crate::{
    cli::Args,
    config::AppConfig,
    error::{CliError, Result},
};
use clap::Parser;
#[cfg(feature = "colored-output")]
use colored::*;
use std::process;
use subtitle_platforms::viki::Viki;
use tracing::{Level, debug, error, info, warn};
use tracing_subscriber::{filter::EnvFilter, fmt, prelude::*};

#[tokio::main]
async fn main() {
    let args = Args::parse();

    if let Err(e) = run(args).await {
        error!("Application error: {}", e);
        #[cfg(feature = "colored-output")]
        {
            eprintln!("{} {}", "Error:".red().bold(), e);
        }
        #[cfg(not(feature = "colored-output"))]
        {
            eprintln!("Error: {}", e);
        }
        process::exit(1);
    }
}

async fn run(args: Args) -> Result<()> {
    init_logging(args.verbose, args.quiet)?;

    if !Viki::is_url_valid(&args.url) {
        return Err(CliError::InvalidInput(format!(
            "unsupported url: {}",
            args.url
        )));
    }

    let config = AppConfig::load(args.config.as_deref())?;
    debug!("Starting subfetch with config: {:?}", config);

    let options = args.download_options(&config)?;
    let cookies = args.cookies_path(&config);
    debug!(cookies = %cookies.display(), "Using cookie file");

    let viki = Viki::from_cookie_file(cookies, config.viki, options).await?;
    match viki.run(&args.url).await? {
        Some(report) => {
            info!("Downloaded {} subtitle(s)", report.downloaded);
            if !report.is_complete() {
                warn!("Failed: {}", report.failed.join(", "));
            }
        }
        None => info!("Nothing downloaded"),
    }

    Ok(())
}

fn init_logging(verbose: bool, quiet: bool) -> Result<()> {
    let filter = if quiet {
        EnvFilter::new("error")
    } else if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::from_default_env().add_directive(Level::INFO.into())
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).with_level(verbose))
        .try_init()?;
    Ok(())
}
