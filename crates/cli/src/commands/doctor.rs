//! `filechat doctor` — Diagnose configuration and provider health.

use super::{CommandResult, scan_project};
use filechat_config::AppConfig;
use std::time::Duration;

const HEALTH_CHECK_TIMEOUT: Duration = Duration::from_secs(10);

pub async fn run() -> CommandResult {
    println!("🩺 FileChat Doctor — System Diagnostics");
    println!("=======================================\n");

    let mut issues = 0;

    let config_path = AppConfig::config_dir().join("config.toml");
    if !config_path.exists() {
        println!("  ⚠️  No config file — using defaults (run `filechat onboard`)");
        issues += 1;
    }

    let config = match AppConfig::load() {
        Ok(config) => {
            println!("  ✅ Configuration valid");
            config
        }
        Err(e) => {
            println!("  ❌ Config file invalid: {e}");
            println!("\n  ⚠️  {} issue(s) found. See above for details.", issues + 1);
            return Ok(());
        }
    };

    if config.has_api_key() {
        println!("  ✅ API key configured");
    } else {
        println!("  ⚠️  No API key configured — add api_key to config.toml");
        issues += 1;
    }

    // Provider reachability
    let router = filechat_providers::router::build_from_config(&config);
    println!("  ℹ️  Configured providers: {}", router.list().join(", "));
    match router.default() {
        Some(provider) => {
            match tokio::time::timeout(HEALTH_CHECK_TIMEOUT, provider.health_check()).await {
                Ok(Ok(true)) => println!("  ✅ Provider '{}' reachable", provider.name()),
                Ok(Ok(false)) => {
                    println!("  ⚠️  Provider '{}' responded but is unhealthy", provider.name());
                    issues += 1;
                }
                Ok(Err(e)) => {
                    println!("  ❌ Provider '{}' check failed: {e}", provider.name());
                    issues += 1;
                }
                Err(_) => {
                    println!("  ❌ Provider '{}' did not answer in time", provider.name());
                    issues += 1;
                }
            }
        }
        None => {
            println!("  ❌ No default provider configured");
            issues += 1;
        }
    }

    // Project scan of the current directory
    match scan_project(None, &config.context).await {
        Ok(builder) if builder.index().is_empty() => {
            println!("  ⚠️  No indexable files in the current directory");
            issues += 1;
        }
        Ok(builder) => println!("  ✅ Current directory: {} indexable files", builder.index().len()),
        Err(e) => {
            println!("  ❌ Cannot scan current directory: {e}");
            issues += 1;
        }
    }

    println!();
    if issues == 0 {
        println!("  🎉 All checks passed!");
    } else {
        println!("  ⚠️  {issues} issue(s) found. See above for details.");
    }

    Ok(())
}
