//! Project index — the one-time snapshot of candidate files under a root.
//!
//! The scan is depth-limited and skips build output, VCS metadata, dependency
//! caches, lockfiles and anything that is not a known text/source format.
//! Once built the index is read-only; it is never refreshed mid-session, so
//! files created after the scan are invisible until the next run.

use filechat_config::ContextConfig;
use filechat_core::error::ContextError;
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};
use walkdir::{DirEntry, WalkDir};

/// Directories nested deeper than this below the root are not listed.
pub const MAX_SCAN_DEPTH: usize = filechat_config::DEFAULT_MAX_SCAN_DEPTH;

/// Files above this size are never indexed (1 MiB).
pub const MAX_FILE_SIZE: u64 = filechat_config::DEFAULT_MAX_FILE_SIZE_BYTES;

/// Directory names never descended into.
pub const IGNORED_DIRS: &[&str] = &[
    "node_modules",
    ".git",
    ".svn",
    ".hg",
    "target",
    "dist",
    "build",
    "out",
    ".next",
    ".nuxt",
    "__pycache__",
    ".pytest_cache",
    ".venv",
    "venv",
    "coverage",
    ".idea",
    ".vscode",
    ".cache",
];

/// File names never indexed, whatever their extension.
pub const IGNORED_FILES: &[&str] = &[
    "package-lock.json",
    "yarn.lock",
    "pnpm-lock.yaml",
    "Cargo.lock",
    "poetry.lock",
    "composer.lock",
    "Gemfile.lock",
    ".env",
    ".env.local",
    ".gitignore",
    ".dockerignore",
    ".npmignore",
    ".DS_Store",
];

/// Lower-cased extensions (without the dot) treated as readable text.
pub const SUPPORTED_EXTENSIONS: &[&str] = &[
    // Systems & compiled
    "rs", "c", "h", "cpp", "cc", "hpp", "go", "java", "kt", "scala", "swift", "cs",
    // Scripting
    "py", "rb", "php", "lua", "pl", "sh", "bash", "zsh", "ps1",
    // Web
    "js", "jsx", "ts", "tsx", "mjs", "cjs", "vue", "svelte", "html", "css", "scss", "sass",
    "less",
    // Data & config
    "json", "yaml", "yml", "toml", "xml", "ini", "cfg", "conf", "sql", "graphql", "proto",
    "example",
    // Docs
    "md", "mdx", "txt", "rst",
];

/// A candidate file discovered by the scan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProjectFile {
    /// File name with extension (e.g. `parser.ts`)
    pub name: String,
    /// Absolute path on disk
    pub path: PathBuf,
    /// Path below the project root, `/`-separated; unique within an index
    pub relative_path: String,
    /// Lower-cased extension without the dot
    pub extension: String,
    /// Size in bytes at scan time
    pub size: u64,
}

/// Limits applied while walking the project tree.
#[derive(Debug, Clone)]
pub struct ScanOptions {
    pub max_depth: usize,
    pub max_file_size: u64,
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self {
            max_depth: MAX_SCAN_DEPTH,
            max_file_size: MAX_FILE_SIZE,
        }
    }
}

impl From<&ContextConfig> for ScanOptions {
    fn from(config: &ContextConfig) -> Self {
        Self {
            max_depth: config.max_scan_depth,
            max_file_size: config.max_file_size_bytes,
        }
    }
}

/// Why a file could not be read at pack time.
#[derive(Debug, thiserror::Error)]
pub enum ReadError {
    #[error("File not found: {path}")]
    NotFound { path: String },

    #[error("Failed to read {path}: {reason}")]
    Io { path: String, reason: String },
}

/// Read-only snapshot of the project's candidate files.
#[derive(Debug, Clone)]
pub struct ProjectIndex {
    root: PathBuf,
    files: Vec<ProjectFile>,
}

impl ProjectIndex {
    /// Walk `root` and collect every indexable file.
    ///
    /// Only an unusable root is an error. Unreadable subdirectories and
    /// files are logged and skipped.
    pub fn scan(root: impl AsRef<Path>, options: &ScanOptions) -> Result<Self, ContextError> {
        let root = root.as_ref();
        let root = root
            .canonicalize()
            .map_err(|e| ContextError::InvalidRoot {
                path: root.display().to_string(),
                reason: e.to_string(),
            })?;
        if !root.is_dir() {
            return Err(ContextError::InvalidRoot {
                path: root.display().to_string(),
                reason: "not a directory".into(),
            });
        }

        let mut files = Vec::new();
        let mut skipped = 0usize;

        // Depth counts directories below the root; their files sit one level deeper.
        // Links are followed so symlinked sources are indexed under the link's
        // path; loops and dangling links surface as entry errors below.
        let walker = WalkDir::new(&root)
            .follow_links(true)
            .max_depth(options.max_depth + 1)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|entry| entry.depth() == 0 || !is_ignored_dir(entry));

        for result in walker {
            let entry = match result {
                Ok(entry) => entry,
                Err(e) => {
                    warn!(
                        path = ?e.path(),
                        error = %e,
                        "Skipping unreadable entry during project scan"
                    );
                    skipped += 1;
                    continue;
                }
            };

            if !entry.file_type().is_file() {
                continue;
            }

            if let Some(file) = Self::inspect(&root, &entry, options) {
                files.push(file);
            }
        }

        info!(
            root = %root.display(),
            files = files.len(),
            skipped,
            "Project scan complete"
        );

        Ok(Self { root, files })
    }

    /// Build an index from an already-enumerated file list.
    pub fn from_files(root: impl Into<PathBuf>, files: Vec<ProjectFile>) -> Self {
        Self {
            root: root.into(),
            files,
        }
    }

    /// Turn a walked entry into a [`ProjectFile`] if it passes every filter.
    fn inspect(root: &Path, entry: &DirEntry, options: &ScanOptions) -> Option<ProjectFile> {
        let name = entry.file_name().to_string_lossy().into_owned();
        if IGNORED_FILES.contains(&name.as_str()) {
            return None;
        }

        let extension = entry
            .path()
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_lowercase)?;
        if !SUPPORTED_EXTENSIONS.contains(&extension.as_str()) {
            return None;
        }

        let size = match entry.metadata() {
            Ok(meta) => meta.len(),
            Err(e) => {
                warn!(path = %entry.path().display(), error = %e, "Cannot stat file, skipping");
                return None;
            }
        };
        if size > options.max_file_size {
            debug!(
                path = %entry.path().display(),
                size,
                limit = options.max_file_size,
                "Skipping large file"
            );
            return None;
        }

        let relative_path = entry
            .path()
            .strip_prefix(root)
            .ok()?
            .components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/");

        Some(ProjectFile {
            name,
            path: entry.path().to_path_buf(),
            relative_path,
            extension,
            size,
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// All indexed files in scan order.
    pub fn files(&self) -> &[ProjectFile] {
        &self.files
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    pub fn total_size(&self) -> u64 {
        self.files.iter().map(|f| f.size).sum()
    }

    /// Look a file up by its exact relative path.
    pub fn get(&self, relative_path: &str) -> Option<&ProjectFile> {
        self.files.iter().find(|f| f.relative_path == relative_path)
    }

    /// Case-insensitive substring match against file name or relative path.
    ///
    /// Returns every match in scan order. An empty query matches nothing.
    pub fn find_by_query(&self, query: &str) -> Vec<&ProjectFile> {
        let query = query.trim().to_lowercase();
        if query.is_empty() {
            return Vec::new();
        }
        self.files
            .iter()
            .filter(|f| {
                f.name.to_lowercase().contains(&query)
                    || f.relative_path.to_lowercase().contains(&query)
            })
            .collect()
    }

    /// Read a file as UTF-8 text.
    ///
    /// Relative paths resolve against the root; absolute paths are used as-is.
    pub fn read(&self, path: &str) -> Result<String, ReadError> {
        let candidate = Path::new(path);
        let full = if candidate.is_absolute() {
            candidate.to_path_buf()
        } else {
            self.root.join(candidate)
        };

        std::fs::read_to_string(&full).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => ReadError::NotFound { path: path.into() },
            _ => ReadError::Io {
                path: path.into(),
                reason: e.to_string(),
            },
        })
    }

    /// File counts per extension, most common first (ties by name).
    pub fn extension_counts(&self) -> Vec<(String, usize)> {
        let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
        for file in &self.files {
            *counts.entry(file.extension.as_str()).or_default() += 1;
        }
        let mut counts: Vec<(String, usize)> = counts
            .into_iter()
            .map(|(ext, n)| (ext.to_string(), n))
            .collect();
        counts.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        counts
    }
}

fn is_ignored_dir(entry: &DirEntry) -> bool {
    entry.file_type().is_dir()
        && entry
            .file_name()
            .to_str()
            .is_some_and(|name| IGNORED_DIRS.contains(&name))
}
