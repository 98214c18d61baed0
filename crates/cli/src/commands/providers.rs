//! `filechat providers` — List supported LLM providers.

use super::CommandResult;
use filechat_providers::router::default_base_url;

/// Providers with a built-in base URL, and whether they need a key.
const KNOWN_PROVIDERS: &[(&str, bool)] = &[
    ("openrouter", true),
    ("openai", true),
    ("groq", true),
    ("deepseek", true),
    ("together", true),
    ("fireworks", true),
    ("mistral", true),
    ("xai", true),
    ("ollama", false),
    ("vllm", false),
    ("llamacpp", false),
];

pub async fn run() -> CommandResult {
    println!("🤖 Supported LLM Providers");
    println!("==========================");
    println!();
    println!("  Built-in providers:");
    for line in table() {
        println!("  {line}");
    }
    println!();
    println!("  Custom endpoints:");
    println!("    Any OpenAI-compatible API works out of the box:");
    println!("    default_provider = \"openai\"");
    println!("    [providers.openai]");
    println!("    api_url = \"https://your-custom-endpoint.com/v1\"");
    println!("    api_key = \"your-key\"");
    println!();
    println!("  Environment variables:");
    println!("    FILECHAT_API_KEY, OPENROUTER_API_KEY, OPENAI_API_KEY");
    println!("    FILECHAT_PROVIDER, FILECHAT_MODEL");

    Ok(())
}

fn table() -> Vec<String> {
    let rows: Vec<(&str, String, &str)> = KNOWN_PROVIDERS
        .iter()
        .map(|(name, keyed)| {
            let url = default_base_url(name);
            let url = url
                .trim_start_matches("https://")
                .trim_start_matches("http://")
                .to_string();
            (*name, url, if *keyed { "API key" } else { "None (local)" })
        })
        .collect();

    let url_width = rows.iter().map(|(_, url, _)| url.len()).max().unwrap_or(0);
    let mut lines = vec![format!("{:<12}  {:<url_width$}  Auth", "Provider", "Base URL")];
    lines.extend(
        rows.iter()
            .map(|(name, url, auth)| format!("{name:<12}  {url:<url_width$}  {auth}")),
    );
    lines
}
