//! Relevance matcher — lexical extraction of file references from a message.
//!
//! Two passes, merged in this order:
//!
//! 1. **Literal** — tokens that look like file names or paths (`parser.ts`,
//!    `src/lib.rs`, or either wrapped in backticks or quotes).
//! 2. **Keyword** — topic words ("config", "test", "auth", ...) mapped to
//!    representative file-name fragments, capped per keyword.
//!
//! Every candidate is resolved through [`ProjectIndex::find_by_query`]; tokens
//! that resolve to nothing are dropped without error.

use crate::context::index::ProjectIndex;
use crate::context::selection::ContextSelection;
use regex_lite::Regex;
use std::sync::LazyLock;
use tracing::debug;

/// Files taken per topic keyword.
pub const KEYWORD_MATCH_LIMIT: usize = filechat_config::DEFAULT_KEYWORD_MATCH_LIMIT;

/// Topic keyword → file-name fragments looked up, in order, when the keyword
/// appears anywhere in the lower-cased message.
pub const KEYWORD_TOPICS: &[(&str, &[&str])] = &[
    ("main", &["main.", "index.", "app."]),
    ("config", &["config", "settings", ".env.example"]),
    ("readme", &["readme"]),
    (
        "package",
        &["package.json", "cargo.toml", "pyproject.toml", "requirements.txt"],
    ),
    ("test", &["test", "spec"]),
    ("component", &["component", ".jsx", ".tsx", ".vue"]),
    ("style", &["style", ".css", ".scss"]),
    ("database", &["database", "db", "schema", "model"]),
    ("api", &["api", "route", "controller", "endpoint"]),
    ("auth", &["auth", "login", "session"]),
];

/// Literal file-reference patterns, applied in order. The first capture group
/// (if any) is the reference with its wrapping stripped.
static LITERAL_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        // bare name.ext (multi-dot names like app.test.ts included)
        r"\b[\w-]+(?:\.[\w-]+)*\.[A-Za-z][A-Za-z0-9]*\b",
        // path-like a/b.ext
        r"(?:[\w.-]+/)+[\w-]+(?:\.[\w-]+)*\.[A-Za-z][A-Za-z0-9]*\b",
        // `wrapped`
        r"`([^`\s]+\.[A-Za-z][A-Za-z0-9]*)`",
        // "wrapped"
        r#""([^"\s]+\.[A-Za-z][A-Za-z0-9]*)""#,
        // 'wrapped'
        r"'([^'\s]+\.[A-Za-z][A-Za-z0-9]*)'",
    ]
    .into_iter()
    .filter_map(|pattern| Regex::new(pattern).ok())
    .collect()
});

/// Resolves free-text file references against a borrowed project index.
pub struct RelevanceMatcher<'a> {
    index: &'a ProjectIndex,
    keyword_limit: usize,
}

impl<'a> RelevanceMatcher<'a> {
    pub fn new(index: &'a ProjectIndex) -> Self {
        Self {
            index,
            keyword_limit: KEYWORD_MATCH_LIMIT,
        }
    }

    /// Override how many files a single keyword may contribute.
    pub fn with_keyword_limit(mut self, limit: usize) -> Self {
        self.keyword_limit = limit;
        self
    }

    /// Candidate files for `message`: literal matches first, then keyword matches.
    pub fn extract_candidates(&self, message: &str) -> ContextSelection {
        let mut selection = self.literal_candidates(message);
        selection.merge(self.keyword_candidates(message));

        debug!(
            candidates = selection.len(),
            "Extracted file candidates from message"
        );
        selection
    }

    /// Pass 1: every indexed file matching any literal reference in the message.
    pub fn literal_candidates(&self, message: &str) -> ContextSelection {
        let mut selection = ContextSelection::new();
        for literal in extract_literals(message) {
            for file in self.index.find_by_query(&literal) {
                selection.insert(file.relative_path.as_str());
            }
        }
        selection
    }

    /// Pass 2: up to `keyword_limit` files per topic keyword present in the message.
    pub fn keyword_candidates(&self, message: &str) -> ContextSelection {
        let mut selection = ContextSelection::new();
        if self.keyword_limit == 0 {
            return selection;
        }

        for (keyword, patterns) in topics_in(message) {
            let mut per_keyword = ContextSelection::new();
            'patterns: for pattern in patterns {
                for file in self.index.find_by_query(pattern) {
                    per_keyword.insert(file.relative_path.as_str());
                    if per_keyword.len() >= self.keyword_limit {
                        break 'patterns;
                    }
                }
            }
            debug!(keyword, matches = per_keyword.len(), "Keyword topic matched");
            selection.merge(per_keyword);
        }
        selection
    }
}

/// All literal file references in `message`, in pattern order then position,
/// with quote/backtick wrapping removed. Duplicates are kept; resolution dedups.
pub fn extract_literals(message: &str) -> Vec<String> {
    let mut literals = Vec::new();
    for pattern in LITERAL_PATTERNS.iter() {
        for captures in pattern.captures_iter(message) {
            let matched = captures.get(1).or_else(|| captures.get(0));
            if let Some(m) = matched {
                literals.push(m.as_str().to_string());
            }
        }
    }
    literals
}

/// Topic entries whose keyword occurs in the lower-cased message.
pub fn topics_in(message: &str) -> impl Iterator<Item = (&'static str, &'static [&'static str])> {
    let lowered = message.to_lowercase();
    KEYWORD_TOPICS
        .iter()
        .filter(move |(keyword, _)| lowered.contains(keyword))
        .map(|(keyword, patterns)| (*keyword, *patterns))
}
