//! Shared type definitions for the linker graph crate
//!
//! Identities for files and symbols, plus the byte-offset positions used by
//! diagnostics. These are used by every other module, so they live here to
//! avoid circular dependencies.

use std::sync::Arc;

/// Identity of one parsed source file within the shared input pool
///
/// Source indices are assigned while parsing and are not deterministic across
/// builds. Anything that needs a reproducible ordering should sort by the
/// stable index exposed on the linker graph instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct SourceIndex(u32);

impl SourceIndex {
    /// The synthetic file whose named exports supply runtime helpers
    pub const RUNTIME: Self = Self(0);

    pub const fn new(index: u32) -> Self {
        Self(index)
    }

    /// Returns the underlying u32 value of the SourceIndex
    #[inline]
    pub const fn as_u32(&self) -> u32 {
        self.0
    }

    #[inline]
    pub const fn as_usize(&self) -> usize {
        self.0 as usize
    }
}

impl std::fmt::Display for SourceIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Reference to a symbol: the owning file plus the symbol's position in that
/// file's symbol list
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Ref {
    pub source_index: SourceIndex,
    pub inner_index: u32,
}

impl Ref {
    pub const fn new(source_index: SourceIndex, inner_index: u32) -> Self {
        Self {
            source_index,
            inner_index,
        }
    }
}

/// Byte offset into a file's source text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Loc {
    pub start: u32,
}

impl Loc {
    pub const fn new(start: u32) -> Self {
        Self { start }
    }
}

/// A span of source text starting at `loc`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Range {
    pub loc: Loc,
    pub len: u32,
}

impl Range {
    pub const fn end(&self) -> u32 {
        self.loc.start + self.len
    }
}

/// The text of one parsed file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Source {
    pub index: SourceIndex,
    /// Unique key used by the resolver, usually an absolute path
    pub key_path: String,
    /// Path shown to users in diagnostics
    pub pretty_path: String,
    pub contents: Arc<str>,
}

impl Source {
    pub fn new(index: SourceIndex, path: impl Into<String>, contents: impl Into<Arc<str>>) -> Self {
        let path = path.into();
        Self {
            index,
            key_path: path.clone(),
            pretty_path: path,
            contents: contents.into(),
        }
    }
}
