use std::{fmt, path::Path};

use crate::{
    domain::{
        comment::{Comment, Directive},
        patterns,
        requirement::{Classification, Requirement, classify},
    },
    storage::RequirementFile,
};

/// A reference to another requirements file from a `-r`/`--requirement` flag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Include {
    written: String,
    file: RequirementFile,
}

impl Include {
    /// The path as it was written in the referencing file.
    #[must_use]
    pub fn written_path(&self) -> &str {
        &self.written
    }

    /// The referenced file, resolved against the referencing file's directory.
    #[must_use]
    pub const fn file(&self) -> &RequirementFile {
        &self.file
    }

    /// Mutable access to the referenced file.
    pub const fn file_mut(&mut self) -> &mut RequirementFile {
        &mut self.file
    }
}

/// What a line carries besides its comment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Content {
    /// Nothing: a blank or comment-only line.
    Nothing,
    /// A requirement.
    Requirement(Requirement),
    /// A reference to another requirements file.
    Include(Include),
}

/// A single line of a requirements file.
///
/// An entry is one of:
/// - empty
/// - a requirement, optionally with a comment
/// - an include of another file, optionally with a comment
/// - a comment only
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    content: Content,
    comment: Comment,
}

impl Entry {
    /// Creates an entry from its parts.
    #[must_use]
    pub const fn new(content: Content, comment: Comment) -> Self {
        Self { content, comment }
    }

    /// Parses one line of a requirements file.
    ///
    /// `dir` is the directory of the file the line came from; included file
    /// paths are resolved against it. A line with several `-r` flags produces
    /// one entry per flag, each sharing the line's comment.
    ///
    /// Returns `None` if the line does not have the shape of a requirements
    /// line.
    #[must_use]
    pub fn parse(line: &str, dir: &Path) -> Option<Vec<Self>> {
        let line = line.trim();
        let (text, comment) = patterns::split_comment(line)?;
        let comment = Comment::new(comment);

        let entries = match classify(Some(text), &comment) {
            Classification::Empty => vec![Self::new(Content::Nothing, comment)],
            Classification::Requirement(requirement) => {
                vec![Self::new(Content::Requirement(requirement), comment)]
            }
            Classification::Inclusion => patterns::requirement_files(text)
                .map(|written| {
                    let include = Include {
                        written: written.to_string(),
                        file: RequirementFile::new(dir.join(written)),
                    };
                    tracing::debug!(
                        "found requirement file '{written}', resolved to {}",
                        include.file
                    );
                    Self::new(Content::Include(include), comment.clone())
                })
                .collect(),
        };

        Some(entries)
    }

    /// What the line carries besides its comment.
    #[must_use]
    pub const fn content(&self) -> &Content {
        &self.content
    }

    /// The requirement on this line, if any.
    #[must_use]
    pub const fn requirement(&self) -> Option<&Requirement> {
        match &self.content {
            Content::Requirement(requirement) => Some(requirement),
            _ => None,
        }
    }

    /// Mutable access to the requirement on this line, e.g. to rewrite its
    /// URL.
    pub const fn requirement_mut(&mut self) -> Option<&mut Requirement> {
        match &mut self.content {
            Content::Requirement(requirement) => Some(requirement),
            _ => None,
        }
    }

    /// The included file, if this line is a `-r`/`--requirement` flag.
    #[must_use]
    pub const fn include(&self) -> Option<&Include> {
        match &self.content {
            Content::Include(include) => Some(include),
            _ => None,
        }
    }

    /// Mutable access to the included file.
    pub const fn include_mut(&mut self) -> Option<&mut Include> {
        match &mut self.content {
            Content::Include(include) => Some(include),
            _ => None,
        }
    }

    /// The comment on this line. Absent comments are represented by a
    /// comment with no text.
    #[must_use]
    pub const fn comment(&self) -> &Comment {
        &self.comment
    }

    /// Whether the line carries anything at all.
    #[must_use]
    pub const fn is_present(&self) -> bool {
        !matches!(self.content, Content::Nothing) || self.comment.is_present()
    }

    /// Whether the line is nothing but a comment.
    #[must_use]
    pub const fn is_comment_only(&self) -> bool {
        matches!(self.content, Content::Nothing) && self.comment.is_present()
    }

    /// Whether the requirement on this line comes from a `git+ssh`,
    /// `git+http` or `git+https` URL.
    #[must_use]
    pub fn is_git(&self) -> bool {
        self.git_protocol().is_some()
    }

    /// The git transport of the requirement's URL (`ssh`, `http` or `https`).
    #[must_use]
    pub fn git_protocol(&self) -> Option<&str> {
        self.requirement()
            .and_then(Requirement::url)
            .and_then(patterns::git_protocol)
    }
}

impl fmt::Display for Entry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.content {
            Content::Nothing => return write!(f, "{}", self.comment),
            Content::Requirement(requirement) => write!(f, "{requirement}")?,
            Content::Include(include) => {
                let path = self
                    .comment
                    .get(Directive::RootRelative)
                    .unwrap_or(&include.written);
                write!(f, "-r {path}")?;
            }
        }

        if self.comment.is_present() {
            write!(f, " {}", self.comment)?;
        }
        Ok(())
    }
}
