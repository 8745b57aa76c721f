use std::{fs::File, io::BufReader, path::PathBuf};

use crate::{
    domain::Entry,
    storage::{EntryReader, Error, RequirementFile, WalkOptions},
};

/// Streams the flattened entries of a requirements file and everything it
/// includes.
///
/// Unlike [`RequirementFile::iter_recursive`], nothing is cached: each file
/// is opened only when the walk reaches it and closed as soon as it is
/// exhausted (or the walk is dropped). Entries are yielded as owned values.
///
/// ```no_run
/// for entry in requirement_walker::walk("requirements.txt") {
///     println!("{}", entry?);
/// }
/// # Ok::<(), requirement_walker::storage::Error>(())
/// ```
pub fn walk(path: impl Into<PathBuf>) -> Walk {
    Walk::new(path, WalkOptions::default())
}

/// Iterator returned by [`walk`].
///
/// After an error the walk is over and yields nothing more.
#[derive(Debug)]
pub struct Walk {
    root: Option<RequirementFile>,
    stack: Vec<EntryReader<BufReader<File>>>,
    options: WalkOptions,
}

impl Walk {
    /// Walks the file at `path` with the given filters and depth cap.
    pub fn new(path: impl Into<PathBuf>, options: WalkOptions) -> Self {
        Self {
            root: Some(RequirementFile::new(path)),
            stack: Vec::new(),
            options,
        }
    }

    fn fail(&mut self, error: Error) -> Option<Result<Entry, Error>> {
        self.stack.clear();
        Some(Err(error))
    }
}

impl Iterator for Walk {
    type Item = Result<Entry, Error>;

    fn next(&mut self) -> Option<Self::Item> {
        if let Some(root) = self.root.take() {
            match root.reader() {
                Ok(reader) => self.stack.push(reader),
                Err(e) => return self.fail(e),
            }
        }

        loop {
            let entry = match self.stack.last_mut()?.next() {
                Some(Ok(entry)) => entry,
                Some(Err(e)) => return self.fail(e),
                None => {
                    self.stack.pop();
                    continue;
                }
            };

            let Some(include) = entry.include() else {
                if self.options.keeps(&entry) {
                    return Some(Ok(entry));
                }
                continue;
            };

            // the root file sits at depth 0
            let depth = self.stack.len();
            if self.options.exceeds(depth) {
                let error = Error::TooDeep {
                    path: include.file().path().to_path_buf(),
                    max_depth: self.options.max_depth.unwrap_or_default(),
                };
                return self.fail(error);
            }

            tracing::debug!("recursing into {}", include.file());
            match include.file().reader() {
                Ok(reader) => self.stack.push(reader),
                Err(e) => return self.fail(e),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use tempfile::TempDir;

    use super::*;

    fn setup() -> (TempDir, PathBuf) {
        let tmp = TempDir::new().unwrap();
        let root = tmp.path().join("requirements.txt");
        fs::write(&root, "# top\nalpha\n-r sub/child.txt\n\nomega\n").unwrap();
        fs::create_dir(tmp.path().join("sub")).unwrap();
        fs::write(tmp.path().join("sub/child.txt"), "beta # from child\ngamma\n").unwrap();
        (tmp, root)
    }

    fn rendered(walk: Walk) -> Vec<String> {
        walk.map(|entry| entry.unwrap().to_string()).collect()
    }

    #[test]
    fn streams_depth_first() {
        let (_tmp, root) = setup();
        assert_eq!(
            rendered(walk(root)),
            vec!["# top", "alpha", "beta # from child", "gamma", "", "omega"]
        );
    }

    #[test]
    fn matches_cached_traversal() {
        let (_tmp, root) = setup();
        let mut file = RequirementFile::new(&root);
        let cached: Vec<_> = file
            .iter_recursive(WalkOptions::default())
            .unwrap()
            .map(ToString::to_string)
            .collect();
        assert_eq!(rendered(walk(root)), cached);
    }

    #[test]
    fn applies_filters() {
        let (_tmp, root) = setup();
        let options = WalkOptions {
            no_empty_lines: true,
            no_comment_only_lines: true,
            max_depth: None,
        };
        assert_eq!(
            rendered(Walk::new(root, options)),
            vec!["alpha", "beta # from child", "gamma", "omega"]
        );
    }

    #[test]
    fn yields_entries_before_a_missing_include() {
        let tmp = TempDir::new().unwrap();
        let root = tmp.path().join("requirements.txt");
        fs::write(&root, "alpha\n-r missing.txt\nomega\n").unwrap();

        let mut walk = walk(root);
        assert_eq!(walk.next().unwrap().unwrap().to_string(), "alpha");
        assert!(matches!(walk.next(), Some(Err(Error::Read { .. }))));
        assert!(walk.next().is_none());
    }

    #[test]
    fn missing_root_is_an_error() {
        let tmp = TempDir::new().unwrap();
        let mut walk = walk(tmp.path().join("missing.txt"));
        assert!(matches!(walk.next(), Some(Err(Error::Read { .. }))));
        assert!(walk.next().is_none());
    }

    #[test]
    fn depth_cap_stops_self_inclusion() {
        let tmp = TempDir::new().unwrap();
        let root = tmp.path().join("requirements.txt");
        fs::write(&root, "alpha\n-r requirements.txt\n").unwrap();

        let options = WalkOptions {
            max_depth: Some(3),
            ..WalkOptions::default()
        };
        let results: Vec<_> = Walk::new(root, options).collect();

        // alpha at depths 0..=3, then the error
        assert_eq!(results.len(), 5);
        assert!(results[..4].iter().all(Result::is_ok));
        assert!(matches!(
            results[4],
            Err(Error::TooDeep { max_depth: 3, .. })
        ));
    }
}
