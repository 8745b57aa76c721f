use crate::domain::Entry;

/// Controls flattened traversal of a tree of requirements files.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WalkOptions {
    /// Skip lines that carry nothing at all.
    pub no_empty_lines: bool,

    /// Skip lines that carry only a comment.
    pub no_comment_only_lines: bool,

    /// Fail once includes nest deeper than this many levels.
    ///
    /// `None` places no bound on nesting, so a file that includes itself
    /// (directly or transitively) is walked forever.
    pub max_depth: Option<usize>,
}

impl WalkOptions {
    /// Whether a (non-include) entry survives the line filters.
    #[must_use]
    pub const fn keeps(&self, entry: &Entry) -> bool {
        if self.no_empty_lines && !entry.is_present() {
            return false;
        }
        !(self.no_comment_only_lines && entry.is_comment_only())
    }

    /// Whether an include found at `depth` (the root file being depth 0) is
    /// too deep to follow.
    #[must_use]
    pub const fn exceeds(&self, depth: usize) -> bool {
        match self.max_depth {
            Some(max) => depth > max,
            None => false,
        }
    }
}

/// Controls writing a tree of requirements files out as a single file.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExportOptions {
    /// Traversal settings, including the line filters.
    pub walk: WalkOptions,

    /// Drop lines whose rendered text was already written, keeping the first.
    pub no_duplicates: bool,
}
