//! Gitignore-style path filtering
//!
//! Patterns are compiled into a single `GlobSet`. Matching is done on the path
//! relative to the exercise root, with `/` separators, and the last matching
//! pattern decides (so `!pattern` can re-include a path).
//!
//! Supported syntax:
//! - blank lines and lines starting with `#` are ignored
//! - `!` negates the pattern
//! - a trailing `/` only matches directories (everything below them)
//! - a leading or middle `/` anchors the pattern to the root, otherwise it
//!   matches at any depth
//! - `*`, `?`, `[...]` never cross a `/`; `**` does

use std::path::{Component, Path};

use globset::{GlobBuilder, GlobSet, GlobSetBuilder};

use crate::errors::{ArchiveError, ArchiveResult};

/// Compiled list of gitignore-style patterns
#[derive(Debug, Clone)]
pub struct PathFilter {
    globset: GlobSet,
    /// Negation flag for every glob in `globset`, in insertion order
    negated: Vec<bool>,
}

impl Default for PathFilter {
    fn default() -> Self {
        Self::empty()
    }
}

impl PathFilter {
    /// A filter that matches nothing
    pub fn empty() -> Self {
        Self {
            globset: GlobSet::empty(),
            negated: Vec::new(),
        }
    }

    /// Compile a list of patterns, in order
    pub fn from_patterns<S: AsRef<str>>(patterns: &[S]) -> ArchiveResult<Self> {
        let mut builder = GlobSetBuilder::new();
        let mut negated = Vec::new();

        for line in patterns {
            let Some(rule) = Rule::parse(line.as_ref()) else {
                continue;
            };
            for glob in rule.globs() {
                let compiled = GlobBuilder::new(&glob)
                    .literal_separator(true)
                    .build()
                    .map_err(|e| ArchiveError::InvalidPattern {
                        pattern: line.as_ref().to_string(),
                        reason: e.to_string(),
                    })?;
                builder.add(compiled);
                negated.push(rule.negated);
            }
        }

        let globset = builder.build().map_err(|e| ArchiveError::InvalidPattern {
            pattern: patterns
                .iter()
                .map(|p| p.as_ref())
                .collect::<Vec<_>>()
                .join(", "),
            reason: e.to_string(),
        })?;

        Ok(Self { globset, negated })
    }

    /// Whether the filter has no effective patterns
    pub fn is_empty(&self) -> bool {
        self.negated.is_empty()
    }

    /// Check a path relative to the filtered root
    pub fn is_match(&self, relative: &Path) -> bool {
        if self.is_empty() {
            return false;
        }
        let candidate = posix_path(relative);
        self.globset
            .matches(candidate.as_str())
            .into_iter()
            .max()
            .map(|index| !self.negated[index])
            .unwrap_or(false)
    }
}

/// Render a relative path with `/` separators, dropping `.` components
pub fn posix_path(path: &Path) -> String {
    path.components()
        .filter_map(|component| match component {
            Component::Normal(part) => Some(part.to_string_lossy()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("/")
}

/// One parsed pattern line
struct Rule {
    body: String,
    negated: bool,
    anchored: bool,
    dir_only: bool,
}

impl Rule {
    fn parse(line: &str) -> Option<Self> {
        let line = line.trim_end();
        if line.is_empty() || line.starts_with('#') {
            return None;
        }

        let (negated, line) = match line.strip_prefix('!') {
            Some(rest) => (true, rest),
            None => (false, line.strip_prefix('\\').unwrap_or(line)),
        };
        let (dir_only, line) = match line.strip_suffix('/') {
            Some(rest) => (true, rest),
            None => (false, line),
        };
        let anchored = line.contains('/');
        let body = line.trim_start_matches('/').to_string();
        if body.is_empty() {
            return None;
        }

        Some(Self {
            body,
            negated,
            anchored,
            dir_only,
        })
    }

    fn globs(&self) -> Vec<String> {
        let base = if self.anchored || self.body.starts_with("**") {
            self.body.clone()
        } else {
            format!("**/{}", self.body)
        };
        let below = format!("{}/**", base);
        if self.dir_only {
            vec![below]
        } else {
            vec![base, below]
        }
    }
}
