//! Walk through requirements and comments in `requirements.txt` files.
//!
//! Each line of a requirements file becomes an [`Entry`]: a requirement, a
//! `-r`/`--requirement` include, a comment, or any sensible combination.
//! Includes form a tree of [`RequirementFile`]s which can be walked one file
//! at a time or flattened depth-first, and written back out as a single file.

pub mod domain;
pub use domain::{Comment, Config, Directive, Entry, Requirement, StandardRequirement};

/// Reading, walking, and writing requirements files.
pub mod storage;
pub use storage::{Error, ExportOptions, RequirementFile, Walk, WalkOptions, walk};
