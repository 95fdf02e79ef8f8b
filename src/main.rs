use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;

use feedroll::app::{self, Finished};
use feedroll::config::Config;
use feedroll::element::{HtmlPageElement, TerminalElement};
use feedroll::render::html_to_text;

#[derive(Parser, Debug)]
#[command(
    name = "feedroll",
    about = "Rotate the latest entries of an RSS feed with fade transitions"
)]
struct Args {
    /// Feed to rotate (overrides the config file)
    #[arg(long, value_name = "URL")]
    feed_url: Option<String>,

    /// Write a self-updating HTML page instead of drawing in the terminal
    #[arg(long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// Config file (default: ~/.config/feedroll/config.toml)
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Number of leading entries to rotate
    #[arg(long, value_name = "N")]
    max_entries: Option<usize>,

    /// Print the entries that would be rotated and exit
    #[arg(long)]
    list: bool,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // Logs go to stderr; stdout belongs to the terminal display
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let config_path = match &args.config {
        Some(path) => path.clone(),
        None => Config::default_path()?,
    };
    let mut config = Config::load(&config_path)
        .with_context(|| format!("Failed to load config from {}", config_path.display()))?;
    if let Some(url) = args.feed_url {
        config.feed_url = url;
    }
    if let Some(max) = args.max_entries {
        config.max_entries = max;
    }
    config.validate()?;

    let client = app::build_client().context("Failed to create HTTP client")?;

    if args.list {
        return list_entries(&client, &config).await;
    }

    let rotation = async {
        match &args.output {
            Some(path) => {
                app::run(&client, &config, || {
                    HtmlPageElement::create(path, &config.element_id, &config.hidden_class)
                })
                .await
            }
            None => app::run(&client, &config, || TerminalElement::new(std::io::stdout())).await,
        }
    };

    tokio::select! {
        finished = rotation => {
            let finished = finished.context("Display update failed")?;
            tracing::debug!(?finished, "Rotation ended");
        }
        result = shutdown_signal() => {
            result?;
            tracing::info!("Shutting down");
        }
    }

    Ok(())
}

async fn list_entries(client: &reqwest::Client, config: &Config) -> Result<()> {
    let entries = match app::fetch_entries(client, config).await {
        Ok(entries) => entries,
        Err(Finished::LoadFailed(e)) => return Err(e).context("Failed to load feed"),
        Err(finished) => {
            eprintln!("Nothing to rotate: {:?}", finished);
            return Ok(());
        }
    };

    for (index, entry) in entries.iter().take(config.max_entries).enumerate() {
        let text = entry
            .description
            .as_deref()
            .map(html_to_text)
            .unwrap_or_else(|| "(no description, skipped)".to_string());
        println!("[{index}] {}", entry.link.as_deref().unwrap_or("-"));
        for line in text.lines() {
            println!("    {line}");
        }
    }
    Ok(())
}

/// Completes on Ctrl-C, or SIGTERM on Unix.
async fn shutdown_signal() -> Result<()> {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};
        let mut sigterm = signal(SignalKind::terminate())?;
        tokio::select! {
            result = tokio::signal::ctrl_c() => result?,
            _ = sigterm.recv() => {}
        }
    }
    #[cfg(not(unix))]
    tokio::signal::ctrl_c().await?;

    Ok(())
}
