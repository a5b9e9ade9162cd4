//! Maps byte offsets to line/column positions for diagnostics
//!
//! Building the line table means scanning the whole file, so linker files only
//! construct a tracker the first time a warning is actually reported.

use std::sync::Arc;

use crate::types::{Loc, Source};

/// A resolved diagnostic position
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MsgLocation {
    pub file: String,
    /// One-based line number
    pub line: u32,
    /// Zero-based byte column
    pub column: u32,
    pub line_text: String,
}

#[derive(Debug, Clone)]
pub struct LineColumnTracker {
    pretty_path: String,
    contents: Arc<str>,
    /// Byte offset of the first character of every line
    line_starts: Vec<u32>,
}

impl LineColumnTracker {
    pub fn new(source: &Source) -> Self {
        let bytes = source.contents.as_bytes();
        let mut line_starts = vec![0];
        let mut i = 0;
        while i < bytes.len() {
            match bytes[i] {
                b'\n' => line_starts.push((i + 1) as u32),
                b'\r' => {
                    // "\r\n" counts as a single line break
                    if bytes.get(i + 1) == Some(&b'\n') {
                        i += 1;
                    }
                    line_starts.push((i + 1) as u32);
                }
                _ => {}
            }
            i += 1;
        }

        log::trace!(
            "Built line table for {} ({} lines)",
            source.pretty_path,
            line_starts.len()
        );

        Self {
            pretty_path: source.pretty_path.clone(),
            contents: Arc::clone(&source.contents),
            line_starts,
        }
    }

    pub fn line_count(&self) -> usize {
        self.line_starts.len()
    }

    /// Zero-based line and column of `loc`. Offsets past the end clamp to the end.
    pub fn line_column(&self, loc: Loc) -> (u32, u32) {
        let offset = loc.start.min(self.contents.len() as u32);
        let line = self.line_starts.partition_point(|start| *start <= offset) - 1;
        (line as u32, offset - self.line_starts[line])
    }

    /// Text of a zero-based line without its terminator
    pub fn line_text(&self, line: u32) -> &str {
        let line = line as usize;
        let Some(&start) = self.line_starts.get(line) else {
            return "";
        };
        let end = self
            .line_starts
            .get(line + 1)
            .map_or(self.contents.len(), |next| *next as usize);
        self.contents[start as usize..end].trim_end_matches(['\r', '\n'])
    }

    pub fn location(&self, loc: Loc) -> MsgLocation {
        let (line, column) = self.line_column(loc);
        MsgLocation {
            file: self.pretty_path.clone(),
            line: line + 1,
            column,
            line_text: self.line_text(line).to_owned(),
        }
    }
}
