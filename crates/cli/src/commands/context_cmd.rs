//! `filechat context` — Show what a message would attach, without sending it.

use super::{CommandResult, load_config, scan_project};
use filechat_agent::PackReport;
use std::path::PathBuf;

pub async fn run(message: String, root: Option<PathBuf>, json: bool) -> CommandResult {
    let config = load_config()?;
    let mut builder = scan_project(root, &config.context).await?;

    let (packed, report) = builder.build_report(&message, &[]);

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    if packed.is_empty() {
        println!("No project files match this message; nothing would be attached.");
        return Ok(());
    }

    print!("{packed}");
    for line in summary(&report, config.context.budget_chars) {
        eprintln!("{line}");
    }
    Ok(())
}

fn summary(report: &PackReport, budget: usize) -> Vec<String> {
    let mut lines = vec![format!(
        "── {} file(s) attached, {}/{} characters",
        report.included.len(),
        report.chars_used,
        budget
    )];
    if !report.truncated.is_empty() {
        lines.push(format!("   truncated:  {}", report.truncated.join(", ")));
    }
    if !report.unreadable.is_empty() {
        lines.push(format!("   unreadable: {}", report.unreadable.join(", ")));
    }
    if !report.dropped.is_empty() {
        lines.push(format!("   over budget: {}", report.dropped.join(", ")));
    }
    lines
}
