//! `filechat files` — List or search the files a chat session would index.

use super::{CommandResult, format_size, load_config, scan_project};
use filechat_agent::ProjectFile;
use std::path::PathBuf;

pub async fn run(query: Option<String>, root: Option<PathBuf>, json: bool) -> CommandResult {
    let config = load_config()?;
    let builder = scan_project(root, &config.context).await?;
    let index = builder.index();

    let files: Vec<&ProjectFile> = match query.as_deref() {
        Some(q) => index.find_by_query(q),
        None => index.files().iter().collect(),
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&files)?);
        return Ok(());
    }

    if files.is_empty() {
        match query {
            Some(q) => println!("No indexed files match '{q}'."),
            None => println!("No indexable files under {}.", index.root().display()),
        }
        return Ok(());
    }

    for line in render(&files) {
        println!("{line}");
    }
    println!();
    println!(
        "{} of {} file(s) under {}",
        files.len(),
        index.len(),
        index.root().display()
    );
    Ok(())
}

/// One aligned line per file: relative path, then size.
fn render(files: &[&ProjectFile]) -> Vec<String> {
    let width = files
        .iter()
        .map(|f| f.relative_path.chars().count())
        .max()
        .unwrap_or(0);
    files
        .iter()
        .map(|f| format!("  {:<width$}  {:>10}", f.relative_path, format_size(f.size)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn file(rel: &str, size: u64) -> ProjectFile {
        ProjectFile {
            name: rel.rsplit('/').next().unwrap_or(rel).into(),
            path: PathBuf::from("/p").join(rel),
            relative_path: rel.into(),
            extension: "rs".into(),
            size,
        }
    }

    #[test]
    fn rows_are_aligned() {
        let a = file("src/main.rs", 10);
        let b = file("lib.rs", 4096);
        let lines = render(&[&a, &b]);
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].len(), lines[1].len());
        assert!(lines[1].trim_end().ends_with("4.0 KiB"));
    }
}
