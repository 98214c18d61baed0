//! `filechat chat` — Interactive or single-message chat with project context.

use super::{CommandResult, format_size, load_config, scan_project};
use crate::input;
use filechat_agent::{ChatSession, ContextBuilder, TurnOutcome};
use filechat_config::AppConfig;
use std::io::Write;
use std::path::PathBuf;
use tracing::info;

pub struct ChatOptions {
    pub message: Option<String>,
    pub root: Option<PathBuf>,
    pub no_context: bool,
    pub stream: bool,
}

/// Slash commands understood in interactive mode.
#[derive(Debug, PartialEq, Eq)]
pub enum ChatCommand {
    Files,
    Project,
    Clear,
    Help,
    Unknown(String),
}

impl ChatCommand {
    /// A single `/word` is a command; anything else is a message.
    pub fn parse(line: &str) -> Option<Self> {
        let word = line.strip_prefix('/')?;
        if word.is_empty() || word.contains(char::is_whitespace) || word.contains('/') {
            return None;
        }
        Some(match word {
            "files" => Self::Files,
            "project" => Self::Project,
            "clear" => Self::Clear,
            "help" => Self::Help,
            other => Self::Unknown(other.to_string()),
        })
    }
}

/// Local providers accept requests without a key.
fn needs_api_key(provider: &str) -> bool {
    !matches!(provider, "ollama" | "vllm" | "llamacpp" | "llama.cpp")
}

pub async fn run(options: ChatOptions) -> CommandResult {
    let config = load_config()?;

    // Fail before scanning when no key is available
    if needs_api_key(&config.default_provider) && !config.has_api_key() {
        print_missing_key_help();
        return Err("No API key found. See above for setup instructions.".into());
    }

    let router = filechat_providers::router::build_from_config(&config);
    let provider = router.default().ok_or("No default provider configured")?;

    let context = if options.no_context || !config.context.enabled {
        ContextBuilder::disabled()
    } else {
        scan_project(options.root.clone(), &config.context).await?
    };
    info!(
        provider = %config.default_provider,
        model = %config.default_model,
        files = context.index().len(),
        "Chat session starting"
    );

    let mut session = ChatSession::from_config(provider, &config, context);

    if let Some(msg) = options.message {
        // Single message mode
        run_turn(&mut session, &msg, options.stream, false).await?;
        return Ok(());
    }

    print_banner(&config, &session);

    let mut rx = input::spawn_stdin_reader();
    prompt()?;

    while let Some(line) = rx.recv().await {
        match ChatCommand::parse(&line) {
            Some(command) => handle_command(&mut session, command),
            None => {
                if let Err(e) = run_turn(&mut session, &line, options.stream, true).await {
                    eprintln!("  [Error] {e}");
                    println!();
                }
            }
        }
        prompt()?;
    }

    println!();
    println!("  Goodbye! 👋");
    println!();
    Ok(())
}

async fn run_turn(
    session: &mut ChatSession,
    text: &str,
    stream: bool,
    interactive: bool,
) -> CommandResult {
    let outcome: TurnOutcome = if stream {
        if interactive {
            print!("\n  Assistant > ");
        }
        let mut stdout = std::io::stdout();
        let outcome = session
            .send_streaming(text, |delta| {
                let _ = stdout.write_all(delta.as_bytes());
                let _ = stdout.flush();
            })
            .await?;
        println!();
        outcome
    } else {
        eprint!("  Thinking...");
        let result = session.send(text).await;
        eprint!("\r              \r");
        let outcome = result?;
        if interactive {
            println!();
            for line in outcome.reply.lines() {
                println!("  Assistant > {line}");
            }
        } else {
            println!("{}", outcome.reply);
        }
        outcome
    };

    if interactive {
        if !outcome.context_files.is_empty() {
            eprintln!("  📎 {}", outcome.context_files.join(", "));
        }
        println!();
    }
    Ok(())
}

fn handle_command(session: &mut ChatSession, command: ChatCommand) {
    match command {
        ChatCommand::Files => {
            let files = session.current_context();
            if files.is_empty() {
                println!("  No files attached to the last message.");
            } else {
                println!("  Files attached to the last message:");
                for path in files {
                    println!("    • {path}");
                }
            }
        }
        ChatCommand::Project => {
            let index = session.context().index();
            println!("  Root:   {}", index.root().display());
            println!(
                "  Files:  {} ({})",
                index.len(),
                format_size(index.total_size())
            );
            let top: Vec<String> = index
                .extension_counts()
                .into_iter()
                .take(5)
                .map(|(ext, n)| format!(".{ext} × {n}"))
                .collect();
            if !top.is_empty() {
                println!("  Types:  {}", top.join(", "));
            }
        }
        ChatCommand::Clear => {
            session.clear();
            println!("  Conversation cleared.");
        }
        ChatCommand::Help => print_help(),
        ChatCommand::Unknown(name) => {
            println!("  Unknown command: /{name} (try /help)");
        }
    }
    println!();
}

fn prompt() -> std::io::Result<()> {
    print!("  You > ");
    std::io::stdout().flush()
}

fn print_banner(config: &AppConfig, session: &ChatSession) {
    let index = session.context().index();
    println!();
    println!("  ╔══════════════════════════════════════════════╗");
    println!("  ║         FileChat — Interactive Mode          ║");
    println!("  ╚══════════════════════════════════════════════╝");
    println!();
    println!("  Provider:  {}", config.default_provider);
    println!("  Model:     {}", session.model());
    if session.context().is_enabled() {
        println!("  Project:   {}", index.root().display());
        println!("  Indexed:   {} files", index.len());
    } else {
        println!("  Project:   (context disabled)");
    }
    println!();
    println!("  Type your message and press Enter. /help lists commands.");
    println!("  Type 'exit' or Ctrl+C to quit.");
    println!();
}

fn print_help() {
    println!("  /files    files attached to the last message");
    println!("  /project  summary of the indexed project");
    println!("  /clear    forget the conversation so far");
    println!("  /help     this list");
    println!("  exit      quit");
}

fn print_missing_key_help() {
    eprintln!();
    eprintln!("  ERROR: No API key configured!");
    eprintln!();
    eprintln!("  Set one of these environment variables:");
    eprintln!("    FILECHAT_API_KEY   = 'sk-...'         (generic)");
    eprintln!("    OPENROUTER_API_KEY = 'sk-or-v1-...'   (recommended)");
    eprintln!("    OPENAI_API_KEY     = 'sk-...'         (for OpenAI direct)");
    eprintln!();
    eprintln!("  Or add it to your config file:");
    eprintln!("    {}", AppConfig::config_dir().join("config.toml").display());
    eprintln!();
    eprintln!("  Get an OpenRouter key at: https://openrouter.ai/keys");
    eprintln!();
}
