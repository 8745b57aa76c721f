//! A requirements file and the tree of files it includes.
//!
//! A [`RequirementFile`] is parsed lazily. The first call that needs its
//! entries reads the file once and caches them; every later traversal replays
//! the cache without touching the filesystem.

use std::{
    fmt,
    fs::File,
    io::BufReader,
    path::{Path, PathBuf},
    slice,
};

use tracing::instrument;

use crate::{
    domain::Entry,
    storage::{EntryReader, Error, ExportOptions, WalkOptions, export},
};

#[derive(Debug, Clone, Default)]
enum State {
    #[default]
    Unparsed,
    Cached(Vec<Entry>),
}

/// A requirements file on disk.
///
/// Two files are equal if they have the same absolute path.
#[derive(Debug, Clone)]
pub struct RequirementFile {
    path: PathBuf,
    state: State,
}

impl RequirementFile {
    /// Refers to the requirements file at `path`.
    ///
    /// Nothing is read until the entries are needed, so the file does not
    /// have to exist yet.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let path = std::path::absolute(&path).unwrap_or(path);
        Self {
            path,
            state: State::Unparsed,
        }
    }

    /// The absolute path of the file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Whether the entries have already been read and cached.
    #[must_use]
    pub const fn is_cached(&self) -> bool {
        matches!(self.state, State::Cached(_))
    }

    /// Streams the entries of this file straight from disk.
    ///
    /// This bypasses (and does not populate) the cache. Included files are
    /// not expanded.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be opened.
    pub fn reader(&self) -> Result<EntryReader<BufReader<File>>, Error> {
        tracing::info!("walking requirements for file: {}", self.path.display());
        let file = File::open(&self.path).map_err(|source| Error::Read {
            path: self.path.clone(),
            source,
        })?;
        Ok(EntryReader::new(BufReader::new(file), &self.path))
    }

    /// The entries of this file, one per line, without expanding includes.
    ///
    /// # Errors
    ///
    /// Returns an error if the file has not been cached yet and cannot be
    /// read.
    pub fn entries(&mut self) -> Result<&[Entry], Error> {
        self.entries_mut().map(|entries| &*entries)
    }

    /// Mutable access to the entries of this file, e.g. to rewrite
    /// requirement URLs before exporting.
    ///
    /// # Errors
    ///
    /// Returns an error if the file has not been cached yet and cannot be
    /// read.
    pub fn entries_mut(&mut self) -> Result<&mut [Entry], Error> {
        if matches!(self.state, State::Unparsed) {
            let entries = self.reader()?.collect::<Result<Vec<_>, _>>()?;
            tracing::debug!(
                "cached {} entries from {}",
                entries.len(),
                self.path.display()
            );
            self.state = State::Cached(entries);
        }

        Ok(self.cached_mut())
    }

    /// Walks the whole tree of included files depth-first, in the order a
    /// reader following every `-r` would see the lines.
    ///
    /// Include lines are replaced by the entries of the files they include.
    ///
    /// Every file in the tree is read and cached before the first entry is
    /// yielded, so one unreadable include fails the whole call and no entries
    /// are returned. Use [`walk`](crate::walk) to stream entries up to the
    /// first failure instead.
    ///
    /// # Errors
    ///
    /// Returns an error if any file in the tree cannot be read, or if the
    /// includes nest deeper than `options.max_depth`.
    #[instrument(skip(self), fields(path = %self.path.display()))]
    pub fn iter_recursive(&mut self, options: WalkOptions) -> Result<Flatten<'_>, Error> {
        self.load_tree(options)?;
        Ok(Flatten {
            stack: vec![self.cached().iter()],
            options,
        })
    }

    /// Like [`RequirementFile::iter_recursive`], but yields mutable entries.
    ///
    /// # Errors
    ///
    /// Returns an error if any file in the tree cannot be read, or if the
    /// includes nest deeper than `options.max_depth`.
    #[instrument(skip(self), fields(path = %self.path.display()))]
    pub fn iter_recursive_mut(&mut self, options: WalkOptions) -> Result<FlattenMut<'_>, Error> {
        self.load_tree(options)?;
        Ok(FlattenMut {
            stack: vec![self.cached_mut().iter_mut()],
            options,
        })
    }

    /// Writes the flattened tree to `dest` as a single requirements file.
    ///
    /// The destination is overwritten and its parent directories created as
    /// needed. Returns the number of lines written.
    ///
    /// # Errors
    ///
    /// Returns an error if any file in the tree cannot be read, or the
    /// destination cannot be written.
    #[instrument(skip(self, dest), fields(path = %self.path.display()))]
    pub fn to_single_file(
        &mut self,
        dest: impl AsRef<Path>,
        options: ExportOptions,
    ) -> Result<usize, Error> {
        let lines = self.iter_recursive(options.walk)?.map(ToString::to_string);
        export::write_lines(dest.as_ref(), lines, options.no_duplicates)
    }

    /// Reads and caches every file in the tree.
    ///
    /// Uses an explicit stack rather than recursion, so deep nesting costs
    /// heap rather than call stack.
    fn load_tree(&mut self, options: WalkOptions) -> Result<(), Error> {
        let mut stack: Vec<(&mut Self, usize)> = vec![(self, 0)];

        while let Some((file, depth)) = stack.pop() {
            if options.exceeds(depth) {
                return Err(Error::TooDeep {
                    path: file.path.clone(),
                    max_depth: options.max_depth.unwrap_or_default(),
                });
            }

            let children: Vec<_> = file
                .entries_mut()?
                .iter_mut()
                .filter_map(Entry::include_mut)
                .map(|include| (include.file_mut(), depth + 1))
                .collect();

            // reversed so the first include is read first
            stack.extend(children.into_iter().rev());
        }

        Ok(())
    }

    fn cached(&self) -> &[Entry] {
        match &self.state {
            State::Cached(entries) => entries,
            State::Unparsed => &[],
        }
    }

    /// The cached entries, or nothing if the file has not been read.
    fn cached_mut(&mut self) -> &mut [Entry] {
        match &mut self.state {
            State::Cached(entries) => entries,
            State::Unparsed => &mut [],
        }
    }
}

impl PartialEq for RequirementFile {
    fn eq(&self, other: &Self) -> bool {
        self.path == other.path
    }
}

impl Eq for RequirementFile {}

impl fmt::Display for RequirementFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.path.display())
    }
}

/// Depth-first iterator over the entries of a cached tree of files.
///
/// Returned by [`RequirementFile::iter_recursive`].
#[derive(Debug)]
pub struct Flatten<'a> {
    stack: Vec<slice::Iter<'a, Entry>>,
    options: WalkOptions,
}

impl<'a> Iterator for Flatten<'a> {
    type Item = &'a Entry;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let Some(entry) = self.stack.last_mut()?.next() else {
                self.stack.pop();
                continue;
            };

            if let Some(include) = entry.include() {
                self.stack.push(include.file().cached().iter());
            } else if self.options.keeps(entry) {
                return Some(entry);
            }
        }
    }
}

/// Depth-first iterator over mutable entries of a cached tree of files.
///
/// Returned by [`RequirementFile::iter_recursive_mut`].
#[derive(Debug)]
pub struct FlattenMut<'a> {
    stack: Vec<slice::IterMut<'a, Entry>>,
    options: WalkOptions,
}

impl<'a> Iterator for FlattenMut<'a> {
    type Item = &'a mut Entry;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let Some(entry) = self.stack.last_mut()?.next() else {
                self.stack.pop();
                continue;
            };

            if entry.include().is_some() {
                if let Some(include) = entry.include_mut() {
                    self.stack.push(include.file_mut().cached_mut().iter_mut());
                }
            } else if self.options.keeps(entry) {
                return Some(entry);
            }
        }
    }
}
