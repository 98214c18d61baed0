//! `filechat onboard` — First-time setup.

use super::CommandResult;
use filechat_config::AppConfig;

pub async fn run() -> CommandResult {
    let config_dir = AppConfig::config_dir();
    let config_path = config_dir.join("config.toml");

    println!("📂 FileChat — First-Time Setup");
    println!("==============================\n");

    if !config_dir.exists() {
        std::fs::create_dir_all(&config_dir)?;
        println!("✅ Created config directory: {}", config_dir.display());
    } else {
        println!("  Config directory exists: {}", config_dir.display());
    }

    if config_path.exists() {
        println!("\n⚠️  Config already exists at: {}", config_path.display());
        println!("   Edit it manually or delete and re-run onboard.\n");
    } else {
        std::fs::write(&config_path, AppConfig::default_toml())?;
        println!("✅ Created config.toml at: {}", config_path.display());
        println!("\n📝 Next steps:");
        println!("   1. Edit {} and add your API key", config_path.display());
        println!("      (or export FILECHAT_API_KEY)");
        println!("   2. cd into a project and run: filechat chat");
        println!("   3. Ask about a file by name, e.g. \"what does main.rs do?\"\n");
    }

    println!("🎉 Setup complete! Run `filechat chat` to start chatting.\n");

    Ok(())
}
