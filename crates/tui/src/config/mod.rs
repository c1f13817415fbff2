use clap::Parser;
use client::SyncPolicy;
use serde::Deserialize;

use crate::error::Result;

const DEFAULT_CONFIG_PATH: &str = "config/expenses_tui.toml";

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub base_url: String,
    /// Append `.json` to resource paths (Firebase Realtime Database).
    pub json_suffix: bool,
    pub timeout_secs: u64,
    pub recent_days: u64,
    pub sync_policy: SyncPolicy,
    pub log_level: String,
    pub log_file: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:3000".to_string(),
            json_suffix: false,
            timeout_secs: client::DEFAULT_TIMEOUT.as_secs(),
            recent_days: engine::RECENT_DAYS,
            sync_policy: SyncPolicy::Optimistic,
            log_level: "info".to_string(),
            log_file: "config/expenses_tui.log".to_string(),
        }
    }
}

#[derive(Debug, Parser)]
#[command(name = "expenses_tui", disable_version_flag = true)]
struct Args {
    /// Optional config file path (TOML).
    #[arg(long)]
    config: Option<String>,
    /// Override base URL (e.g. http://127.0.0.1:3000).
    #[arg(long)]
    base_url: Option<String>,
    /// Append `.json` to resource paths.
    #[arg(long)]
    json_suffix: bool,
    /// Override the request timeout, in seconds.
    #[arg(long)]
    timeout_secs: Option<u64>,
    /// Override the log level (trace, debug, info, warn, error).
    #[arg(long)]
    log_level: Option<String>,
}

pub fn load() -> Result<AppConfig> {
    build(Args::parse())
}

fn build(args: Args) -> Result<AppConfig> {
    let config_path = args.config.as_deref().unwrap_or(DEFAULT_CONFIG_PATH);
    let mut builder = config::Config::builder();
    builder = builder.add_source(config::File::with_name(config_path).required(false));
    builder = builder.add_source(config::Environment::with_prefix("EXPENSES_TUI"));
    let mut settings: AppConfig = builder.build()?.try_deserialize()?;

    if let Some(base_url) = args.base_url {
        settings.base_url = base_url;
    }
    if args.json_suffix {
        settings.json_suffix = true;
    }
    if let Some(timeout_secs) = args.timeout_secs {
        settings.timeout_secs = timeout_secs;
    }
    if let Some(log_level) = args.log_level {
        settings.log_level = log_level;
    }

    Ok(settings)
}
