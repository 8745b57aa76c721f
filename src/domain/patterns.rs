//! Text-matching rules shared by the line parser.
//!
//! All patterns are compiled once on first use and are safe to share between
//! threads.

use std::sync::LazyLock;

use regex::Regex;

/// Separates the requirement part of a line from a trailing `# ...` comment.
///
/// Expects a line that has already been trimmed and contains no newline
/// characters. Matches comment-only lines (empty `reqs`) and lines without a
/// comment (no `comment` group).
static LINE_COMMENT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?P<reqs>[^#\r\n]*?)\s*(?P<comment>#.*)?$").expect("pattern is valid")
});

/// Pulls `-r <path>`, `--requirement <path>` and `--requirement=<path>` out of
/// a requirement string. `-r=<path>` is deliberately not matched.
static REQUIREMENT_OPTION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:^|\s)(?:-r\s+|--requirement(?:\s+|=))(?P<file_path>\S+)")
        .expect("pattern is valid")
});

/// Locates the `requirement-walker:` argument list inside a comment.
static ARGUMENTS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"requirement-walker:\s*(?P<args>.*?)\s*$").expect("pattern is valid")
});

/// Detects a `git+<protocol>://` prefix on a requirement URL.
static GIT_PROTOCOL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"git\+(?P<protocol>ssh|http|https)://").expect("pattern is valid")
});

/// Splits a trimmed line into its requirement text and its comment.
///
/// The comment, when present, keeps its leading `#`. Returns `None` if the
/// line does not have the expected shape (for example if it still contains a
/// newline).
#[must_use]
pub fn split_comment(line: &str) -> Option<(&str, Option<&str>)> {
    let captures = LINE_COMMENT.captures(line)?;
    let reqs = captures.name("reqs").map_or("", |m| m.as_str());
    let comment = captures.name("comment").map(|m| m.as_str());
    Some((reqs, comment))
}

/// Returns every file path referenced by a `-r`/`--requirement` flag, in the
/// order they appear.
pub fn requirement_files(text: &str) -> impl Iterator<Item = &str> {
    REQUIREMENT_OPTION
        .captures_iter(text)
        .filter_map(|captures| captures.name("file_path"))
        .map(|m| m.as_str())
}

/// Whether the text contains at least one `-r`/`--requirement` flag.
#[must_use]
pub fn has_requirement_file(text: &str) -> bool {
    REQUIREMENT_OPTION.is_match(text)
}

/// Returns the raw `name[=value]` tokens following `requirement-walker:`.
pub fn arguments(comment: &str) -> impl Iterator<Item = &str> {
    ARGUMENTS
        .captures(comment)
        .and_then(|captures| captures.name("args"))
        .map(|m| m.as_str())
        .into_iter()
        .flat_map(|args| args.split('|'))
        .filter(|token| !token.trim().is_empty())
}

/// Returns the git transport (`ssh`, `http` or `https`) of a `git+` URL.
#[must_use]
pub fn git_protocol(url: &str) -> Option<&str> {
    GIT_PROTOCOL
        .captures(url)
        .and_then(|captures| captures.name("protocol"))
        .map(|m| m.as_str())
}
