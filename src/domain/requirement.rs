use std::fmt;

use crate::domain::{
    comment::{Comment, Directive},
    patterns,
    specifier::{self, StandardRequirement},
};

/// Name given to local packages that don't declare one.
pub const LOCAL_REQUIREMENT_NAME: &str = "local_req";

/// Name given to requirements that could not be parsed.
pub const FAILED_REQUIREMENT_NAME: &str = "failed_req";

/// A single requirement from a requirements file.
///
/// Every variant is a requirement that was actually written on the line; a
/// line with no requirement text has no `Requirement` at all.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Requirement {
    /// A well-formed PEP 508 requirement.
    Standard(StandardRequirement),

    /// A local package, flagged by a `local-package-name` directive.
    LocalPackage {
        /// The declared package name, or [`LOCAL_REQUIREMENT_NAME`].
        name: String,
        /// The `root-relative` path if given, otherwise the written text.
        url: String,
    },

    /// Text that could not be interpreted, kept for diagnostics.
    Failed {
        /// The unparsable text.
        url: String,
    },
}

impl Requirement {
    /// The package name.
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::Standard(requirement) => requirement.name(),
            Self::LocalPackage { name, .. } => name,
            Self::Failed { .. } => FAILED_REQUIREMENT_NAME,
        }
    }

    /// The source URL or path, if there is one.
    #[must_use]
    pub fn url(&self) -> Option<&str> {
        match self {
            Self::Standard(requirement) => requirement.url(),
            Self::LocalPackage { url, .. } | Self::Failed { url } => Some(url),
        }
    }

    /// Overwrites the source URL in place.
    ///
    /// This is the hook used to rewrite requirements (e.g. SSH to HTTPS)
    /// before writing them back out.
    pub fn set_url(&mut self, new_url: String) {
        match self {
            Self::Standard(requirement) => requirement.set_url(new_url),
            Self::LocalPackage { url, .. } | Self::Failed { url } => *url = new_url,
        }
    }

    /// A requirement always represents something written on the line, even
    /// when it failed to parse.
    #[must_use]
    pub const fn is_present(&self) -> bool {
        true
    }

    /// Whether this is a [`Requirement::Failed`].
    #[must_use]
    pub const fn is_failed(&self) -> bool {
        matches!(self, Self::Failed { .. })
    }

    /// Whether this is a [`Requirement::LocalPackage`].
    #[must_use]
    pub const fn is_local(&self) -> bool {
        matches!(self, Self::LocalPackage { .. })
    }
}

impl fmt::Display for Requirement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Standard(requirement) => fmt::Display::fmt(requirement, f),
            Self::LocalPackage { url, .. } | Self::Failed { url } => f.write_str(url),
        }
    }
}

/// The outcome of classifying the requirement part of a line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Classification {
    /// The line carries no requirement text.
    Empty,
    /// The line carries a requirement.
    Requirement(Requirement),
    /// The line references other requirement files via `-r`/`--requirement`
    /// and must be expanded rather than treated as a requirement.
    Inclusion,
}

/// Classifies the requirement text of a line.
///
/// The text is first parsed as a standard specifier. If that fails, a line
/// containing a `-r`/`--requirement` flag is always an inclusion, even when
/// the comment also declares a `local-package-name`. Otherwise the comment's
/// directives decide between a local package and a failed requirement.
///
/// This never fails: anything that cannot be interpreted becomes
/// [`Requirement::Failed`].
#[must_use]
pub fn classify(text: Option<&str>, comment: &Comment) -> Classification {
    let text = match text.map(str::trim) {
        Some(text) if !text.is_empty() => text,
        _ => return Classification::Empty,
    };

    let err = match specifier::parse(text) {
        Ok(requirement) => return Classification::Requirement(Requirement::Standard(requirement)),
        Err(e) => e,
    };
    tracing::debug!("falling back to custom parsing: {err}");

    if patterns::has_requirement_file(text) {
        tracing::debug!("requirement '{text}' references other requirement files");
        return Classification::Inclusion;
    }

    if comment.has(Directive::LocalPackageName) {
        let name = comment
            .get(Directive::LocalPackageName)
            .unwrap_or(LOCAL_REQUIREMENT_NAME);
        let url = comment.get(Directive::RootRelative).unwrap_or(text);
        return Classification::Requirement(Requirement::LocalPackage {
            name: name.to_string(),
            url: url.to_string(),
        });
    }

    tracing::warn!(
        "unable to parse requirement, recording it as '{FAILED_REQUIREMENT_NAME}' with url '{text}'"
    );
    Classification::Requirement(Requirement::Failed {
        url: text.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use test_case::test_case;

    use super::*;

    fn comment(text: &str) -> Comment {
        Comment::new(Some(text))
    }

    #[test_case(None; "absent")]
    #[test_case(Some(""); "empty")]
    #[test_case(Some("   "); "whitespace")]
    fn no_text_is_empty(text: Option<&str>) {
        assert_eq!(classify(text, &Comment::default()), Classification::Empty);
    }

    #[test]
    fn standard_requirement() {
        let Classification::Requirement(requirement) =
            classify(Some(" flask>=2.0 "), &Comment::default())
        else {
            panic!("expected a requirement");
        };
        assert!(matches!(requirement, Requirement::Standard(_)));
        assert_eq!(requirement.name(), "flask");
        assert_eq!(requirement.url(), None);
        assert_eq!(requirement.to_string(), "flask>=2.0");
    }

    #[test]
    fn local_package_with_name() {
        let classification = classify(
            Some("./local-pkg"),
            &comment("# requirement-walker: local-package-name=mypkg"),
        );
        assert_eq!(
            classification,
            Classification::Requirement(Requirement::LocalPackage {
                name: "mypkg".to_string(),
                url: "./local-pkg".to_string(),
            })
        );
    }

    #[test]
    fn local_package_defaults_name() {
        let Classification::Requirement(requirement) = classify(
            Some("./local-pkg"),
            &comment("# requirement-walker: local-package-name"),
        ) else {
            panic!("expected a requirement");
        };
        assert_eq!(requirement.name(), LOCAL_REQUIREMENT_NAME);
    }

    #[test]
    fn local_package_uses_root_relative() {
        let Classification::Requirement(requirement) = classify(
            Some("../../libs/pkg"),
            &comment("# requirement-walker: local-package-name=pkg|root-relative=./libs/pkg"),
        ) else {
            panic!("expected a requirement");
        };
        assert_eq!(requirement.url(), Some("./libs/pkg"));
        assert_eq!(requirement.to_string(), "./libs/pkg");
    }

    #[test]
    fn unparsable_text_fails() {
        let classification = classify(Some("???not a requirement???"), &Comment::default());
        let Classification::Requirement(requirement) = classification else {
            panic!("expected a requirement");
        };
        assert!(requirement.is_failed());
        assert!(requirement.is_present());
        assert_eq!(requirement.name(), FAILED_REQUIREMENT_NAME);
        assert_eq!(requirement.url(), Some("???not a requirement???"));
    }

    #[test_case("-r other.txt"; "short flag")]
    #[test_case("--requirement=other.txt"; "long flag with equals")]
    #[test_case("--requirement other.txt -r more.txt"; "several flags")]
    fn inclusion_flags(text: &str) {
        assert_eq!(
            classify(Some(text), &Comment::default()),
            Classification::Inclusion
        );
    }

    #[test]
    fn inclusion_takes_precedence_over_local_package() {
        let classification = classify(
            Some("-r other.txt"),
            &comment("# requirement-walker: local-package-name=mypkg"),
        );
        assert_eq!(classification, Classification::Inclusion);
    }

    #[test]
    fn short_flag_with_equals_is_not_an_inclusion() {
        let classification = classify(Some("-r=333"), &Comment::default());
        assert!(matches!(
            classification,
            Classification::Requirement(Requirement::Failed { .. })
        ));
    }

    #[test]
    fn set_url_overwrites_in_place() {
        let mut requirement = Requirement::Failed {
            url: "git+ssh://git@example.com/org/repo.git".to_string(),
        };
        requirement.set_url("git+https://example.com/org/repo.git".to_string());
        assert_eq!(requirement.url(), Some("git+https://example.com/org/repo.git"));
        assert_eq!(requirement.to_string(), "git+https://example.com/org/repo.git");
    }
}
