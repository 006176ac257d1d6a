use std::env;
use std::fs;
use std::path::PathBuf;
use std::time::Instant;

use anyhow::{Context, Result};
use clap::Parser;

use kinopoisk_export::{Config, KinopoiskScraper, Session};

#[derive(Parser)]
#[command(name = "kinopoisk-export")]
#[command(about = "Export your Kinopoisk movie ratings to CSV")]
#[command(version)]
struct Args {
    /// Path to a TOML config file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Numeric Kinopoisk user id (the number in your profile URL)
    #[arg(short, long)]
    user_id: Option<String>,

    /// Session cookies as a single "name=value; name=value" string
    #[arg(long, conflicts_with = "cookies_file")]
    cookies: Option<String>,

    /// File containing the session cookie string
    #[arg(long)]
    cookies_file: Option<PathBuf>,

    /// Where to write the CSV
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Alternate Kinopoisk host (e.g. a mirror)
    #[arg(long)]
    base_url: Option<String>,
}

fn main() -> Result<()> {
    // Initialize logger
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let args = Args::parse();
    let config = resolve_config(args)?;

    log::info!("Exporting ratings for user {}", config.user_id);
    let started = Instant::now();

    let session = Session::new(&config.user_id, &config.cookies);
    let scraper = KinopoiskScraper::new(session, &config.base_url)?;
    scraper.export_to_csv(&config.output)?;

    log::info!(
        "Total execution time: {:.2} seconds",
        started.elapsed().as_secs_f64()
    );
    Ok(())
}

/// Layer the three configuration sources: flags beat the config file,
/// which beats the environment.
fn resolve_config(args: Args) -> Result<Config> {
    let mut config = match &args.config {
        Some(path) => Config::from_file(path)?,
        None => Config::default(),
    };

    if config.user_id.is_empty() {
        if let Ok(user_id) = env::var("KINOPOISK_USER_ID") {
            config.user_id = user_id;
        }
    }
    if config.cookies.is_empty() {
        if let Ok(cookies) = env::var("KINOPOISK_COOKIES") {
            config.cookies = cookies;
        }
    }

    if let Some(user_id) = args.user_id {
        config.user_id = user_id;
    }
    if let Some(cookies) = args.cookies {
        config.cookies = cookies;
    }
    if let Some(path) = args.cookies_file {
        let contents = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read cookies file: {}", path.display()))?;
        config.cookies = contents.trim().to_string();
    }
    if let Some(output) = args.output {
        config.output = output;
    }
    if let Some(base_url) = args.base_url {
        config.base_url = base_url;
    }

    config.validate()?;
    Ok(config)
}
