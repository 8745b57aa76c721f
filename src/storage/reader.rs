use std::{
    collections::VecDeque,
    io::{self, BufRead},
    path::{Path, PathBuf},
};

use crate::{domain::Entry, storage::Error};

/// Parses a requirements file one line at a time.
///
/// The reader owns its source; dropping it part way through releases the
/// underlying file handle.
#[derive(Debug)]
pub struct EntryReader<R> {
    lines: io::Lines<R>,
    path: PathBuf,
    dir: PathBuf,
    pending: VecDeque<Entry>,
    line_number: usize,
}

impl<R: BufRead> EntryReader<R> {
    /// Creates a reader over `source`, which holds the contents of the file at
    /// `path`. Included files are resolved against the parent of `path`.
    pub fn new(source: R, path: &Path) -> Self {
        let dir = path.parent().map(Path::to_path_buf).unwrap_or_default();
        Self {
            lines: source.lines(),
            path: path.to_path_buf(),
            dir,
            pending: VecDeque::new(),
            line_number: 0,
        }
    }
}

impl<R: BufRead> Iterator for EntryReader<R> {
    type Item = Result<Entry, Error>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(entry) = self.pending.pop_front() {
                return Some(Ok(entry));
            }

            let line = match self.lines.next()? {
                Ok(line) => line,
                Err(source) => {
                    return Some(Err(Error::Read {
                        path: self.path.clone(),
                        source,
                    }));
                }
            };
            self.line_number += 1;

            match Entry::parse(&line, &self.dir) {
                Some(entries) => self.pending.extend(entries),
                None => tracing::error!(
                    "could not match line {} of {} (continuing): {line}",
                    self.line_number,
                    self.path.display()
                ),
            }
        }
    }
}
