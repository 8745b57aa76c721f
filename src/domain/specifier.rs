//! Standard requirement specifiers, as understood by PEP 508.
//!
//! Parsing is delegated to [`pep508_rs`]; this module only lifts the fields the
//! walker cares about out of the parsed value.

use std::{fmt, ops::Range};

use pep508_rs::VersionOrUrl;

/// A requirement that parsed as a PEP 508 specifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StandardRequirement {
    raw: String,
    name: String,
    extras: Vec<String>,
    version: Option<String>,
    /// Where the URL sits in `raw`, for `name @ url` requirements.
    written_url: Option<Range<usize>>,
    url: Option<String>,
}

impl StandardRequirement {
    /// The normalized package name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Requested extras, in the order written.
    #[must_use]
    pub fn extras(&self) -> &[String] {
        &self.extras
    }

    /// The version specifier set, e.g. `>=1.0, <2`.
    #[must_use]
    pub fn version(&self) -> Option<&str> {
        self.version.as_deref()
    }

    /// The source URL for `name @ url` requirements, as written in the file
    /// until it is replaced with [`StandardRequirement::set_url`].
    #[must_use]
    pub fn url(&self) -> Option<&str> {
        self.url.as_deref()
    }

    /// Replaces the source URL.
    pub fn set_url(&mut self, url: String) {
        self.url = Some(url);
    }

    /// The environment marker as written, without the leading `;`.
    #[must_use]
    pub fn marker(&self) -> Option<&str> {
        let after = self.written_url.as_ref().map_or(0, |range| range.end);
        self.raw[after..]
            .split_once(';')
            .map(|(_, marker)| marker.trim())
            .filter(|marker| !marker.is_empty())
    }

    /// The requirement text exactly as it appeared in the file.
    #[must_use]
    pub fn raw(&self) -> &str {
        &self.raw
    }
}

impl fmt::Display for StandardRequirement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Some(url) = &self.url else {
            return f.write_str(&self.raw);
        };

        if let Some(range) = &self.written_url {
            // splice the new URL in, keeping extras and markers as written
            return write!(
                f,
                "{}{url}{}",
                &self.raw[..range.start],
                &self.raw[range.end..]
            );
        }

        f.write_str(&self.name)?;
        if !self.extras.is_empty() {
            write!(f, "[{}]", self.extras.join(","))?;
        }
        write!(f, " @ {url}")?;
        if let Some(marker) = self.marker() {
            write!(f, " ; {marker}")?;
        }
        Ok(())
    }
}

/// The text is not a well-formed PEP 508 requirement.
#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
#[error("invalid requirement specifier '{text}': {reason}")]
pub struct SpecifierError {
    text: String,
    reason: String,
}

/// Parses a standard requirement specifier.
///
/// # Errors
///
/// Returns an error if `text` is not a valid PEP 508 requirement. The walker
/// treats every failure the same way regardless of the reason.
pub fn parse(text: &str) -> Result<StandardRequirement, SpecifierError> {
    let parsed: pep508_rs::Requirement = text.parse().map_err(|e| SpecifierError {
        text: text.to_string(),
        reason: format!("{e}"),
    })?;

    let (version, written_url) = match &parsed.version_or_url {
        Some(VersionOrUrl::VersionSpecifier(specifiers)) => (Some(specifiers.to_string()), None),
        Some(VersionOrUrl::Url(_)) => (None, locate_url(text)),
        None => (None, None),
    };
    let version = version.filter(|v| !v.is_empty());
    let url = written_url.clone().map(|range| text[range].to_string());

    Ok(StandardRequirement {
        raw: text.to_string(),
        name: parsed.name.to_string(),
        extras: parsed.extras.iter().map(ToString::to_string).collect(),
        version,
        written_url,
        url,
    })
}

/// Finds the URL of a `name @ url` requirement in its text.
///
/// Names and extras cannot contain `@`, so the first one separates the name
/// from the URL, and a URL cannot contain whitespace.
fn locate_url(text: &str) -> Option<Range<usize>> {
    let after_at = text.find('@')? + 1;
    let rest = &text[after_at..];
    let start = after_at + (rest.len() - rest.trim_start().len());
    let end = text[start..]
        .find(char::is_whitespace)
        .map_or(text.len(), |len| start + len);
    (start < end).then_some(start..end)
}
