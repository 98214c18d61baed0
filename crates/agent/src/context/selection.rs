//! Ordered, deduplicated set of project-relative paths.

use std::collections::HashSet;

/// The files chosen for one turn, in first-found order.
///
/// Inserting a path that is already present is a no-op, so the position of
/// a path is decided by whichever source mentioned it first.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContextSelection {
    paths: Vec<String>,
    seen: HashSet<String>,
}

impl ContextSelection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `path` unless it is already selected. Returns whether it was added.
    pub fn insert(&mut self, path: impl Into<String>) -> bool {
        let path = path.into();
        if self.seen.contains(&path) {
            return false;
        }
        self.seen.insert(path.clone());
        self.paths.push(path);
        true
    }

    /// Union with `other`, keeping this selection's entries first.
    pub fn merge(&mut self, other: ContextSelection) {
        for path in other.paths {
            self.insert(path);
        }
    }

    pub fn contains(&self, path: &str) -> bool {
        self.seen.contains(path)
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.paths.iter().map(String::as_str)
    }

    pub fn as_slice(&self) -> &[String] {
        &self.paths
    }

    pub fn into_vec(self) -> Vec<String> {
        self.paths
    }
}

impl<S: Into<String>> FromIterator<S> for ContextSelection {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut selection = Self::new();
        for path in iter {
            selection.insert(path);
        }
        selection
    }
}

impl<S: Into<String>> Extend<S> for ContextSelection {
    fn extend<I: IntoIterator<Item = S>>(&mut self, iter: I) {
        for path in iter {
            self.insert(path);
        }
    }
}
