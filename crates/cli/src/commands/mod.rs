//! Subcommand implementations and the helpers they share.

pub mod chat;
pub mod config_cmd;
pub mod context_cmd;
pub mod doctor;
pub mod files;
pub mod onboard;
pub mod providers;

use filechat_agent::ContextBuilder;
use filechat_config::{AppConfig, ContextConfig};
use std::path::PathBuf;

pub type CommandResult = Result<(), Box<dyn std::error::Error>>;

pub fn load_config() -> Result<AppConfig, Box<dyn std::error::Error>> {
    AppConfig::load().map_err(|e| format!("Failed to load config: {e}").into())
}

/// Scan `root` (or the current directory) off the async runtime.
pub async fn scan_project(
    root: Option<PathBuf>,
    config: &ContextConfig,
) -> Result<ContextBuilder, Box<dyn std::error::Error>> {
    let root = match root {
        Some(root) => root,
        None => std::env::current_dir()?,
    };
    let config = config.clone();
    let builder = tokio::task::spawn_blocking(move || ContextBuilder::scan(root, &config)).await??;
    Ok(builder)
}

/// Human-readable byte count.
pub fn format_size(bytes: u64) -> String {
    const KIB: u64 = 1024;
    const MIB: u64 = KIB * 1024;
    match bytes {
        b if b >= MIB => format!("{:.1} MiB", b as f64 / MIB as f64),
        b if b >= KIB => format!("{:.1} KiB", b as f64 / KIB as f64),
        b => format!("{b} B"),
    }
}
