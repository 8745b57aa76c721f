use std::{collections::BTreeMap, fmt, str::FromStr};

use crate::domain::patterns;

/// An argument recognised inside a `requirement-walker:` comment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Directive {
    /// Names a local package whose path cannot be parsed as a standard
    /// requirement.
    LocalPackageName,
    /// A path to use in place of the written one when rendering the line.
    RootRelative,
}

impl Directive {
    /// The name of the directive as written in a comment.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::LocalPackageName => "local-package-name",
            Self::RootRelative => "root-relative",
        }
    }
}

impl fmt::Display for Directive {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Directive {
    type Err = UnknownDirective;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "local-package-name" => Ok(Self::LocalPackageName),
            "root-relative" => Ok(Self::RootRelative),
            other => Err(UnknownDirective(other.to_string())),
        }
    }
}

/// A `requirement-walker:` argument that is not on the whitelist.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
#[error("unknown argument provided for requirement-walker: {0}")]
pub struct UnknownDirective(String);

/// The comment portion of a line in a requirements file.
///
/// Example comments carrying directives:
///
/// ```text
/// # requirement-walker: local-package-name=my-local-package
/// # requirement-walker: local-package-name=my-local-package|root-relative=./pkg
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Comment {
    text: Option<String>,
    directives: BTreeMap<Directive, Option<String>>,
}

impl Comment {
    /// Builds a comment from the text following the requirement, including
    /// its leading `#`.
    ///
    /// Unknown directive names are logged and dropped.
    #[must_use]
    pub fn new(text: Option<&str>) -> Self {
        let Some(text) = text.map(str::trim) else {
            return Self::default();
        };

        let directives = extract_directives(text);
        tracing::debug!(?directives, "arguments pulled from comment");

        Self {
            text: Some(text.to_string()),
            directives,
        }
    }

    /// The comment text, with its leading `#`.
    #[must_use]
    pub fn text(&self) -> Option<&str> {
        self.text.as_deref()
    }

    /// Whether the line carried a comment at all.
    #[must_use]
    pub const fn is_present(&self) -> bool {
        self.text.is_some()
    }

    /// Whether the directive was given, with or without a value.
    #[must_use]
    pub fn has(&self, directive: Directive) -> bool {
        self.directives.contains_key(&directive)
    }

    /// The value assigned to a directive, if it was given one.
    #[must_use]
    pub fn get(&self, directive: Directive) -> Option<&str> {
        self.directives.get(&directive).and_then(Option::as_deref)
    }

    /// All recognised directives on this comment.
    #[must_use]
    pub const fn directives(&self) -> &BTreeMap<Directive, Option<String>> {
        &self.directives
    }
}

impl fmt::Display for Comment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.text().unwrap_or_default())
    }
}

fn extract_directives(comment: &str) -> BTreeMap<Directive, Option<String>> {
    let mut directives = BTreeMap::new();
    for argument in patterns::arguments(comment) {
        let mut parts = argument.trim().split('=');
        let name = parts.next().unwrap_or_default();
        let value = parts.next().map(ToString::to_string);

        match name.parse::<Directive>() {
            Ok(directive) => {
                directives.insert(directive, value);
            }
            Err(e) => tracing::error!("{e}"),
        }
    }
    directives
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn absent_comment_is_empty() {
        let comment = Comment::new(None);
        assert!(!comment.is_present());
        assert!(comment.directives().is_empty());
        assert_eq!(comment.to_string(), "");
    }

    #[test]
    fn plain_comment_has_no_directives() {
        let comment = Comment::new(Some("# pinned for a reason  "));
        assert!(comment.is_present());
        assert_eq!(comment.text(), Some("# pinned for a reason"));
        assert!(comment.directives().is_empty());
    }

    #[test]
    fn bare_hash_is_present() {
        let comment = Comment::new(Some("#"));
        assert!(comment.is_present());
        assert_eq!(comment.to_string(), "#");
    }

    #[test]
    fn extracts_whitelisted_directives() {
        let comment = Comment::new(Some(
            "# requirement-walker: local-package-name=my_pkg|root-relative=./libs/my_pkg",
        ));
        assert_eq!(comment.get(Directive::LocalPackageName), Some("my_pkg"));
        assert_eq!(comment.get(Directive::RootRelative), Some("./libs/my_pkg"));
    }

    #[test]
    fn directive_without_value() {
        let comment = Comment::new(Some("# requirement-walker: local-package-name"));
        assert!(comment.has(Directive::LocalPackageName));
        assert_eq!(comment.get(Directive::LocalPackageName), None);
        assert!(!comment.has(Directive::RootRelative));
    }

    #[test]
    fn unknown_directives_are_dropped() {
        let comment = Comment::new(Some(
            "# requirement-walker: ignore-some=1,2,3|local-package-name=pkg",
        ));
        assert_eq!(comment.directives().len(), 1);
        assert_eq!(comment.get(Directive::LocalPackageName), Some("pkg"));
    }

    #[test]
    fn parses_directive_names() {
        assert_eq!(
            "root-relative".parse::<Directive>(),
            Ok(Directive::RootRelative)
        );
        assert!("ignore-some".parse::<Directive>().is_err());
        assert_eq!(Directive::LocalPackageName.to_string(), "local-package-name");
    }
}
