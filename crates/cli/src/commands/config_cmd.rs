//! `filechat config` — Configuration management commands.

use super::CommandResult;
use filechat_config::AppConfig;

pub async fn validate() -> CommandResult {
    println!("🔍 Validating configuration...");

    match AppConfig::load() {
        Ok(config) => {
            println!("   ✅ Config parsed successfully");

            let warnings = warnings(&config);
            if warnings.is_empty() {
                println!("   ✅ All checks passed");
            } else {
                println!();
                for w in &warnings {
                    println!("   ⚠️  {w}");
                }
            }

            println!();
            println!("   Provider:  {}", config.default_provider);
            println!("   Model:     {}", config.default_model);
            println!(
                "   Context:   {} (budget {} chars, {} per file)",
                if config.context.enabled { "on" } else { "off" },
                config.context.budget_chars,
                config.context.max_file_chars
            );
            println!(
                "   Retries:   {} (base {} ms)",
                config.retry.max_retries, config.retry.base_delay_ms
            );
        }
        Err(e) => {
            println!("   ❌ Config error: {e}");
            return Err(e.into());
        }
    }

    Ok(())
}

/// Settings that load fine but are probably not what the user wants.
fn warnings(config: &AppConfig) -> Vec<&'static str> {
    let mut warnings = Vec::new();

    if !config.has_api_key() {
        warnings.push("No API key set (set FILECHAT_API_KEY or OPENROUTER_API_KEY env var)");
    }

    if config.context.max_file_chars > config.context.budget_chars {
        warnings.push("context.max_file_chars exceeds context.budget_chars; large files will never fit");
    }

    if config.context.continuity_window == 0 {
        warnings.push("context.continuity_window = 0 disables follow-up file tracking");
    }

    warnings
}

pub async fn show() -> CommandResult {
    let mut config = AppConfig::load().map_err(|e| format!("Failed to load config: {e}"))?;
    redact(&mut config);
    let toml_str = toml::to_string_pretty(&config)?;
    println!("{toml_str}");
    Ok(())
}

fn redact(config: &mut AppConfig) {
    if config.api_key.is_some() {
        config.api_key = Some("***".into());
    }
    for provider in config.providers.values_mut() {
        if provider.api_key.is_some() {
            provider.api_key = Some("***".into());
        }
    }
}

pub async fn path() -> CommandResult {
    let config_path = AppConfig::config_dir().join("config.toml");
    println!("{}", config_path.display());
    Ok(())
}
