//! Budget packer — renders selected files into a bounded context block.
//!
//! The output is a header, one labelled block per file, an optional
//! "more files available" notice and a footer. File blocks are charged
//! against the character budget; the framing is a fixed overhead of at most
//! [`FRAMING_OVERHEAD`] characters on top of it.

use crate::context::index::ProjectIndex;
use serde::Serialize;
use tracing::{debug, warn};

/// Default character budget for the file blocks of one request.
pub const DEFAULT_BUDGET: usize = filechat_config::DEFAULT_BUDGET_CHARS;

/// Characters kept from a single file before it is truncated.
pub const MAX_FILE_CHARS: usize = filechat_config::DEFAULT_MAX_FILE_CHARS;

pub const HEADER: &str = "=== PROJECT CONTEXT ===\n\
The following project files may be relevant to the question:\n\n";
pub const FOOTER: &str = "=== END PROJECT CONTEXT ===\n\n";
pub const BUDGET_NOTICE: &str = "[More files available but context limit reached]\n\n";
pub const UNREADABLE_PLACEHOLDER: &str = "[Error: Could not read file]";
pub const TRUNCATION_MARKER: &str = "\n... [File truncated]";

const SEPARATOR: &str = "============================================================";

/// Upper bound on everything the packer emits besides file blocks.
pub const FRAMING_OVERHEAD: usize = HEADER.len() + BUDGET_NOTICE.len() + FOOTER.len();

/// What happened to each selected file during one pack.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PackReport {
    /// Files rendered into the context, in order
    pub included: Vec<String>,
    /// Files left out because the budget ran out
    pub dropped: Vec<String>,
    /// Included files whose content was cut at the per-file limit
    pub truncated: Vec<String>,
    /// Included files rendered with the error placeholder
    pub unreadable: Vec<String>,
    /// Characters charged against the budget
    pub chars_used: usize,
}

impl PackReport {
    pub fn hit_budget(&self) -> bool {
        !self.dropped.is_empty()
    }
}

/// Reads and packs files from a borrowed index.
pub struct BudgetPacker<'a> {
    index: &'a ProjectIndex,
    max_file_chars: usize,
}

impl<'a> BudgetPacker<'a> {
    pub fn new(index: &'a ProjectIndex) -> Self {
        Self {
            index,
            max_file_chars: MAX_FILE_CHARS,
        }
    }

    pub fn with_max_file_chars(mut self, max_file_chars: usize) -> Self {
        self.max_file_chars = max_file_chars;
        self
    }

    /// Pack `paths` in order into at most `budget` characters of file blocks.
    ///
    /// Returns an empty string for an empty selection.
    pub fn pack(&self, paths: &[String], budget: usize) -> String {
        self.pack_report(paths, budget).0
    }

    /// [`pack`](Self::pack), plus a record of what was included and why.
    pub fn pack_report(&self, paths: &[String], budget: usize) -> (String, PackReport) {
        let mut report = PackReport::default();
        if paths.is_empty() {
            return (String::new(), report);
        }

        let mut packed = String::from(HEADER);
        for (position, path) in paths.iter().enumerate() {
            let (block, truncated, unreadable) = self.render_block(path);
            let block_chars = block.chars().count();

            if report.chars_used + block_chars > budget {
                packed.push_str(BUDGET_NOTICE);
                report.dropped.extend(paths[position..].iter().cloned());
                break;
            }

            packed.push_str(&block);
            report.chars_used += block_chars;
            report.included.push(path.clone());
            if truncated {
                report.truncated.push(path.clone());
            }
            if unreadable {
                report.unreadable.push(path.clone());
            }
        }
        packed.push_str(FOOTER);

        debug!(
            included = report.included.len(),
            dropped = report.dropped.len(),
            truncated = report.truncated.len(),
            chars_used = report.chars_used,
            budget,
            "Packed project context"
        );
        (packed, report)
    }

    /// One labelled file block, plus whether it was truncated or unreadable.
    fn render_block(&self, path: &str) -> (String, bool, bool) {
        let (content, truncated, unreadable) = match self.index.read(path) {
            Ok(text) => {
                let (content, truncated) = truncate_chars(&text, self.max_file_chars);
                (content, truncated, false)
            }
            Err(e) => {
                warn!(path, error = %e, "Could not read context file");
                (UNREADABLE_PLACEHOLDER.to_string(), false, true)
            }
        };

        let block = format!("{SEPARATOR}\nFILE: {path}\n{SEPARATOR}\n{content}\n\n");
        (block, truncated, unreadable)
    }
}

/// Keep the first `max` characters of `text`, marking the cut.
fn truncate_chars(text: &str, max: usize) -> (String, bool) {
    match text.char_indices().nth(max) {
        Some((cut, _)) => (format!("{}{TRUNCATION_MARKER}", &text[..cut]), true),
        None => (text.to_string(), false),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::index::ScanOptions;
    use std::fs;

    fn project(files: &[(&str, &str)]) -> (tempfile::TempDir, ProjectIndex) {
        let dir = tempfile::tempdir().unwrap();
        for (rel, content) in files {
            let path = dir.path().join(rel);
            fs::create_dir_all(path.parent().unwrap()).unwrap();
            fs::write(path, content).unwrap();
        }
        let index = ProjectIndex::scan(dir.path(), &ScanOptions::default()).unwrap();
        (dir, index)
    }

    fn owned(paths: &[&str]) -> Vec<String> {
        paths.iter().map(|p| p.to_string()).collect()
    }

    fn block_len(path: &str, content: &str) -> usize {
        format!("{SEPARATOR}\nFILE: {path}\n{SEPARATOR}\n{content}\n\n")
            .chars()
            .count()
    }

    #[test]
    fn empty_selection_packs_nothing() {
        let (_dir, index) = project(&[("a.rs", "fn a() {}")]);
        let (packed, report) = BudgetPacker::new(&index).pack_report(&[], DEFAULT_BUDGET);
        assert_eq!(packed, "");
        assert_eq!(report, PackReport::default());
    }

    #[test]
    fn renders_header_blocks_and_footer() {
        let (_dir, index) = project(&[("src/a.rs", "fn a() {}")]);
        let packed = BudgetPacker::new(&index).pack(&owned(&["src/a.rs"]), DEFAULT_BUDGET);

        assert!(packed.starts_with(HEADER));
        assert!(packed.ends_with(FOOTER));
        assert!(packed.contains(&format!("{SEPARATOR}\nFILE: src/a.rs\n{SEPARATOR}\nfn a() {{}}\n\n")));
        assert!(!packed.contains(BUDGET_NOTICE));
    }

    #[test]
    fn long_file_is_truncated_short_file_is_not() {
        let long = "x".repeat(5000);
        let short = "y".repeat(500);
        let (_dir, index) = project(&[("long.txt", long.as_str()), ("short.txt", short.as_str())]);

        let (packed, report) = BudgetPacker::new(&index)
            .pack_report(&owned(&["long.txt", "short.txt"]), DEFAULT_BUDGET);

        let expected = format!("{}{TRUNCATION_MARKER}", "x".repeat(2000));
        assert!(packed.contains(&expected));
        assert!(!packed.contains(&"x".repeat(2001)));
        assert!(packed.contains(&format!("{short}\n\n")));
        assert_eq!(report.truncated, vec!["long.txt"]);
        assert_eq!(packed.matches(TRUNCATION_MARKER).count(), 1);
    }

    #[test]
    fn truncation_counts_characters_not_bytes() {
        let (text, cut) = truncate_chars("héllo wörld", 5);
        assert!(cut);
        assert_eq!(text, format!("héllo{TRUNCATION_MARKER}"));

        let (text, cut) = truncate_chars("héllo", 5);
        assert!(!cut);
        assert_eq!(text, "héllo");
    }

    #[test]
    fn block_that_overflows_budget_is_dropped_with_notice() {
        let content = "z".repeat(100);
        let (_dir, index) = project(&[
            ("a.txt", content.as_str()),
            ("b.txt", content.as_str()),
            ("c.txt", content.as_str()),
        ]);
        let one = block_len("a.txt", &content);
        let budget = one + one / 4;

        let (packed, report) =
            BudgetPacker::new(&index).pack_report(&owned(&["a.txt", "b.txt", "c.txt"]), budget);

        assert_eq!(report.included, vec!["a.txt"]);
        assert_eq!(report.dropped, vec!["b.txt", "c.txt"]);
        assert!(report.hit_budget());
        assert!(packed.contains("FILE: a.txt"));
        assert!(!packed.contains("FILE: b.txt"));
        assert!(packed.contains(BUDGET_NOTICE));
        assert!(packed.ends_with(FOOTER));
    }

    #[test]
    fn exact_fit_is_included() {
        let (_dir, index) = project(&[("a.txt", "abc"), ("b.txt", "abc")]);
        let budget = block_len("a.txt", "abc") * 2;

        let (packed, report) = BudgetPacker::new(&index).pack_report(&owned(&["a.txt", "b.txt"]), budget);
        assert_eq!(report.included.len(), 2);
        assert_eq!(report.chars_used, budget);
        assert!(!packed.contains(BUDGET_NOTICE));
    }

    #[test]
    fn output_never_exceeds_budget_plus_framing() {
        let files: Vec<(String, String)> = (0..12)
            .map(|i| (format!("f{i:02}.md"), "w".repeat(300 + i * 150)))
            .collect();
        let refs: Vec<(&str, &str)> = files.iter().map(|(p, c)| (p.as_str(), c.as_str())).collect();
        let (_dir, index) = project(&refs);
        let paths: Vec<String> = files.iter().map(|(p, _)| p.clone()).collect();

        for budget in [1, 200, 1000, 3000, DEFAULT_BUDGET] {
            let (packed, report) = BudgetPacker::new(&index).pack_report(&paths, budget);
            assert!(report.chars_used <= budget);
            assert!(packed.chars().count() <= budget + FRAMING_OVERHEAD);
        }
    }

    #[test]
    fn unreadable_file_gets_placeholder() {
        let (dir, index) = project(&[("gone.rs", "fn x() {}"), ("kept.rs", "fn y() {}")]);
        fs::remove_file(dir.path().join("gone.rs")).unwrap();

        let (packed, report) =
            BudgetPacker::new(&index).pack_report(&owned(&["gone.rs", "kept.rs"]), DEFAULT_BUDGET);

        assert!(packed.contains(&format!("FILE: gone.rs\n{SEPARATOR}\n{UNREADABLE_PLACEHOLDER}\n\n")));
        assert!(packed.contains("fn y() {}"));
        assert_eq!(report.unreadable, vec!["gone.rs"]);
        assert_eq!(report.included, vec!["gone.rs", "kept.rs"]);
    }

    #[test]
    fn packing_is_deterministic() {
        let (_dir, index) = project(&[("a.rs", "a"), ("b.rs", "b")]);
        let packer = BudgetPacker::new(&index);
        let paths = owned(&["b.rs", "a.rs"]);
        assert_eq!(packer.pack(&paths, 500), packer.pack(&paths, 500));

        let packed = packer.pack(&paths, 500);
        let b = packed.find("FILE: b.rs").unwrap();
        let a = packed.find("FILE: a.rs").unwrap();
        assert!(b < a);
    }

    #[test]
    fn absolute_paths_are_read_as_is() {
        let (_dir, index) = project(&[("a.rs", "abs")]);
        let absolute = index.root().join("a.rs").to_str().unwrap().to_string();
        let packed = BudgetPacker::new(&index).pack(&[absolute], DEFAULT_BUDGET);
        assert!(packed.contains("\nabs\n\n"));
    }

    #[test]
    fn custom_file_limit() {
        let (_dir, index) = project(&[("a.txt", "abcdef")]);
        let packed = BudgetPacker::new(&index)
            .with_max_file_chars(3)
            .pack(&owned(&["a.txt"]), DEFAULT_BUDGET);
        assert!(packed.contains(&format!("abc{TRUNCATION_MARKER}\n\n")));
    }
}
