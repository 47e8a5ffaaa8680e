//! Public suffix rules
//!
//! Understands the `public_suffix_list.dat` format: one rule per line, `//`
//! comments, `*.` wildcard rules and `!` exception rules. Rules after the
//! `===BEGIN PRIVATE DOMAINS===` marker are only used when requested. A copy
//! of the upstream list (`data/public_suffix_list.dat`) is compiled in and used
//! unless another file is configured.

use crate::error::{Result, RuntimeError};
use std::collections::HashSet;
use std::path::Path;
use std::sync::OnceLock;
use tracing::debug;

const PRIVATE_SECTION_MARKER: &str = "===BEGIN PRIVATE DOMAINS===";

/// Mozilla public suffix list bundled with the crate
const BUNDLED_LIST: &str = include_str!("../../data/public_suffix_list.dat");

fn bundled_icann() -> &'static SuffixList {
    static ICANN: OnceLock<SuffixList> = OnceLock::new();
    ICANN.get_or_init(|| SuffixList::parse(BUNDLED_LIST, false))
}

fn bundled_all() -> &'static SuffixList {
    static ALL: OnceLock<SuffixList> = OnceLock::new();
    ALL.get_or_init(|| SuffixList::parse(BUNDLED_LIST, true))
}

/// Set of public suffix rules
#[derive(Debug, Clone, Default)]
pub struct SuffixList {
    rules: HashSet<String>,
    wildcards: HashSet<String>,
    exceptions: HashSet<String>,
}

impl SuffixList {
    /// ICANN section of the bundled public suffix list
    pub fn builtin() -> Self {
        bundled_icann().clone()
    }

    /// Bundled public suffix list including the private section
    pub fn builtin_with_private() -> Self {
        bundled_all().clone()
    }

    /// Parse rules in `public_suffix_list.dat` format
    pub fn parse(content: &str, include_private: bool) -> Self {
        let mut list = Self::default();

        for line in content.lines() {
            let line = line.trim();

            if line.contains(PRIVATE_SECTION_MARKER) && !include_private {
                break;
            }
            if line.is_empty() || line.starts_with("//") {
                continue;
            }

            // Only the first whitespace-delimited token is the rule
            let rule = line
                .split_whitespace()
                .next()
                .unwrap_or_default()
                .to_lowercase();

            if let Some(exception) = rule.strip_prefix('!') {
                list.exceptions.insert(exception.to_string());
            } else if let Some(parent) = rule.strip_prefix("*.") {
                list.wildcards.insert(parent.to_string());
            } else {
                list.rules.insert(rule);
            }
        }

        list
    }

    /// Load a rule file from disk
    pub fn from_file(path: &Path, include_private: bool) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            RuntimeError::Configuration(format!(
                "cannot read public suffix list {}: {}",
                path.display(),
                e
            ))
        })?;

        let list = Self::parse(&content, include_private);
        debug!(
            "Loaded {} suffix rules ({} wildcard, {} exception) from {}",
            list.rules.len(),
            list.wildcards.len(),
            list.exceptions.len(),
            path.display()
        );
        Ok(list)
    }

    /// Number of rules of all kinds
    pub fn len(&self) -> usize {
        self.rules.len() + self.wildcards.len() + self.exceptions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Index of the first label belonging to the public suffix.
    ///
    /// Labels must already be lower-cased. Returns `labels.len()` when no rule
    /// matches, i.e. the suffix is empty.
    pub fn suffix_index(&self, labels: &[String]) -> usize {
        for i in 0..labels.len() {
            let candidate = labels[i..].join(".");

            if self.exceptions.contains(&candidate) {
                return i + 1;
            }
            if self.rules.contains(&candidate) {
                return i;
            }
            if i + 1 < labels.len() && self.wildcards.contains(&labels[i + 1..].join(".")) {
                return i;
            }
        }

        labels.len()
    }
}
