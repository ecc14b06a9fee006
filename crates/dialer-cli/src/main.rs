//! Dialer CLI - Place AMD test calls and browse history
//!
//! Thin client for the Dialer API; no local state beyond the config file.

mod api;
mod config;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use colored::{ColoredString, Colorize};
use dialoguer::{Input, Password};
use uuid::Uuid;

use api::{DialerClient, HistoryQuery};
use config::Config;

const DEFAULT_STRATEGY: &str = "gemini";

#[derive(Parser)]
#[command(name = "dialer")]
#[command(about = "Dialer CLI - Outbound calls with answering machine detection", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Login and store API key
    Login {
        /// API key (will prompt if not provided)
        #[arg(short, long)]
        key: Option<String>,
        /// API base URL (e.g. https://dialer.shuttle.app)
        #[arg(long)]
        base_url: Option<String>,
    },

    /// Place an outbound call
    Call {
        /// Destination, 10 or 11 digits (prompts if omitted)
        number: Option<String>,
        /// AMD strategy: gemini, huggingface, jambonz, twilio
        #[arg(short, long)]
        strategy: Option<String>,
    },

    /// List call history
    History {
        /// Page number
        #[arg(short, long)]
        page: Option<u32>,
        /// Calls per page (max 100)
        #[arg(long)]
        page_size: Option<u32>,
        /// Filter by AMD strategy ("all" for no filter)
        #[arg(short, long)]
        strategy: Option<String>,
        /// Filter by status, e.g. COMPLETED ("all" for no filter)
        #[arg(long)]
        status: Option<String>,
    },

    /// Show a call with its event log and AMD results
    Show {
        /// Call ID
        call_id: Uuid,
    },

    /// Show current configuration
    Config,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Login { key, base_url } => cmd_login(key, base_url).await,
        Commands::Call { number, strategy } => cmd_call(number, strategy).await,
        Commands::History {
            page,
            page_size,
            strategy,
            status,
        } => {
            cmd_history(HistoryQuery {
                page,
                page_size,
                strategy,
                status,
            })
            .await
        }
        Commands::Show { call_id } => cmd_show(call_id).await,
        Commands::Config => cmd_config(),
    }
}

// ============================================
// Command Implementations
// ============================================

async fn cmd_login(key: Option<String>, base_url: Option<String>) -> Result<()> {
    let mut config = Config::load()?;

    if let Some(url) = base_url {
        config.set_base_url(&url);
    }

    let api_key = match key {
        Some(k) => k,
        None => Password::new()
            .with_prompt("API Key")
            .interact()
            .context("Failed to read API key")?,
    };

    // Test connection
    let client = DialerClient::new(&config.base_url, &api_key);
    print!("Testing connection... ");

    match client.health().await {
        Ok(true) => println!("{}", "OK".green()),
        _ => {
            println!("{}", "Failed".red());
            bail!("Could not reach Dialer API at {}", config.base_url);
        }
    }

    if !client.verify_key().await? {
        bail!("API key was rejected");
    }

    config.set_api_key(api_key);
    config.save()?;

    println!("{} API key saved to {:?}", "✓".green(), Config::config_path()?);

    Ok(())
}

async fn cmd_call(number: Option<String>, strategy: Option<String>) -> Result<()> {
    let config = Config::load()?;
    let client = DialerClient::new(&config.base_url, config.require_api_key()?);

    let number = match number {
        Some(n) => n,
        None => Input::new()
            .with_prompt("Number to call")
            .interact_text()
            .context("Failed to read input")?,
    };
    let strategy = strategy
        .or_else(|| config.default_strategy.clone())
        .unwrap_or_else(|| DEFAULT_STRATEGY.to_string());

    let call = client.create_call(&number, &strategy).await?;

    println!(
        "{} Call {} to {} [{}]",
        "✓".green(),
        call.call_id.to_string().cyan(),
        call.target_number,
        call.amd_strategy
    );
    println!("  Status: {}", colorize_status(&call.status));
    println!(
        "  Provider SID: {}",
        call.provider_sid.as_deref().unwrap_or("-").dimmed()
    );

    Ok(())
}

async fn cmd_history(query: HistoryQuery) -> Result<()> {
    let config = Config::load()?;
    let client = DialerClient::new(&config.base_url, config.require_api_key()?);

    let page = client.list_calls(&query).await?;

    if page.calls.is_empty() {
        println!("No calls found.");
        return Ok(());
    }

    println!(
        "{} (page {}/{}, {} total)",
        "Calls:".bold(),
        page.page,
        page.total_pages.max(1),
        page.total
    );
    for call in page.calls {
        println!(
            "  {} {} {:<12} {:<20} {}",
            call.id.to_string().dimmed(),
            call.created_at.dimmed(),
            call.amd_strategy.cyan(),
            colorize_status(&call.status),
            call.target_number
        );
    }

    Ok(())
}

async fn cmd_show(call_id: Uuid) -> Result<()> {
    let config = Config::load()?;
    let client = DialerClient::new(&config.base_url, config.require_api_key()?);

    let detail = client.get_call(call_id).await?;
    let call = &detail.call;

    println!("{} {}", "Call".bold(), call.id.to_string().cyan());
    println!("  Number:       {}", call.target_number);
    println!("  Strategy:     {}", call.amd_strategy);
    println!("  Status:       {}", colorize_status(&call.status));
    println!(
        "  Provider SID: {}",
        call.provider_sid.as_deref().unwrap_or("-")
    );
    println!("  Created:      {}", call.created_at);
    println!("  Updated:      {}", detail.updated_at);

    println!("\n{}", "AMD results:".bold());
    if detail.amd_results.is_empty() {
        println!("  {}", "none".dimmed());
    }
    for result in &detail.amd_results {
        let confidence = result
            .confidence
            .map(|c| format!("{:.0}%", c * 100.0))
            .unwrap_or_else(|| "-".to_string());
        println!(
            "  {} {} {} ({})",
            result.recorded_at.dimmed(),
            result.strategy.cyan(),
            result.decision.bold(),
            confidence
        );
    }

    println!("\n{}", "Events:".bold());
    for event in &detail.events {
        println!(
            "  {} {} {}",
            event.occurred_at.dimmed(),
            event.event_type.cyan(),
            truncate_string(&event.payload.to_string(), 80).dimmed()
        );
    }

    Ok(())
}

fn colorize_status(status: &str) -> ColoredString {
    match status {
        "COMPLETED" | "HUMAN_DETECTED" => status.green(),
        "FAILED" => status.red(),
        "VOICEMAIL_DETECTED" | "MACHINE_DETECTED" => status.yellow(),
        _ => status.normal(),
    }
}

/// Truncate string safely for UTF-8 (by char count, not bytes)
fn truncate_string(s: &str, max_chars: usize) -> String {
    let chars: Vec<char> = s.chars().take(max_chars).collect();
    if s.chars().count() > max_chars {
        format!("{}...", chars.into_iter().collect::<String>())
    } else {
        s.to_string()
    }
}

fn cmd_config() -> Result<()> {
    let config = Config::load()?;

    println!("{}", "Configuration:".bold());
    println!("  Path: {:?}", Config::config_path()?);
    println!("  Base URL: {}", config.base_url);
    println!(
        "  API Key: {}",
        if config.api_key.is_some() {
            "Set".green()
        } else {
            "Not set".red()
        }
    );
    println!(
        "  Default Strategy: {}",
        config
            .default_strategy
            .as_deref()
            .unwrap_or(DEFAULT_STRATEGY)
            .cyan()
    );

    Ok(())
}
