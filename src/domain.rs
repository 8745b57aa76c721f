//! Domain models for requirements files.
//!
//! This module contains the line-level types: the patterns used to split a
//! line, comments and their directives, requirement classification, and the
//! [`Entry`] that ties them together.

mod comment;
pub use comment::{Comment, Directive, UnknownDirective};

mod config;
pub use config::{Config, LoadError as ConfigError, SaveError as ConfigSaveError};

mod entry;
pub use entry::{Content, Entry, Include};

pub mod patterns;

/// Requirement kinds and the classifier.
pub mod requirement;
pub use requirement::{Classification, Requirement, classify};

pub mod specifier;
pub use specifier::{SpecifierError, StandardRequirement};
