// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Line-oriented cleanup of exported manifests.
//!
//! The exported YAML is never parsed. Lines are dropped by prefix and the
//! top-level `status:` block is dropped by indentation, so everything that
//! survives keeps its exact text and position.

use crate::constants::manifest::{EXCLUDED_PREFIXES, STATUS_BLOCK};

/// A manifest as an ordered list of lines
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ManifestDocument {
    lines: Vec<String>,
}

impl ManifestDocument {
    pub fn parse(text: &str) -> Self {
        Self {
            lines: text.lines().map(str::to_string).collect(),
        }
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    /// True when there is nothing but whitespace
    pub fn is_blank(&self) -> bool {
        self.lines.iter().all(|l| l.trim().is_empty())
    }

    /// Render with a newline after every line
    pub fn to_text(&self) -> String {
        self.lines.iter().fold(String::new(), |mut out, line| {
            out.push_str(line);
            out.push('\n');
            out
        })
    }

    /// Drop server-managed fields and the status block.
    ///
    /// The status block runs from a line equal to `status:` up to the next
    /// line that does not start with whitespace; that line is kept.
    pub fn sanitized(&self) -> Self {
        let mut in_status = false;
        let mut lines = Vec::with_capacity(self.lines.len());

        for line in &self.lines {
            if is_excluded(line) {
                continue;
            }
            if line == STATUS_BLOCK {
                in_status = true;
                continue;
            }
            if in_status {
                if line.starts_with(char::is_whitespace) {
                    continue;
                }
                in_status = false;
            }
            lines.push(line.clone());
        }

        Self { lines }
    }
}

fn is_excluded(line: &str) -> bool {
    let trimmed = line.trim();
    EXCLUDED_PREFIXES.iter().any(|p| trimmed.starts_with(p))
}
