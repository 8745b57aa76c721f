use std::{io, path::PathBuf};

mod export;
mod options;
mod reader;
pub mod requirement_file;
mod walk;

pub use options::{ExportOptions, WalkOptions};
pub use reader::EntryReader;
pub use requirement_file::{Flatten, FlattenMut, RequirementFile};
pub use walk::{Walk, walk};

/// Errors raised while reading or writing requirements files.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A requirements file could not be opened or read.
    #[error("failed to read requirements file {}", path.display())]
    Read {
        /// The file being read.
        path: PathBuf,
        /// The underlying I/O error.
        source: io::Error,
    },

    /// The flattened output could not be written.
    #[error("failed to write requirements file {}", path.display())]
    Write {
        /// The destination file.
        path: PathBuf,
        /// The underlying I/O error.
        source: io::Error,
    },

    /// Includes nested deeper than the configured limit, most likely because
    /// of a cycle.
    #[error("{} is nested more than {max_depth} includes deep", path.display())]
    TooDeep {
        /// The file that would have been walked next.
        path: PathBuf,
        /// The configured limit.
        max_depth: usize,
    },
}
