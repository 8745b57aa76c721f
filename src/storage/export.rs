use std::{
    collections::HashSet,
    fs::File,
    io::{BufWriter, Write},
    path::Path,
};

use crate::storage::Error;

/// Writes one line per item to `dest`, replacing any existing file.
///
/// Parent directories are created if they don't exist. With `no_duplicates`,
/// a line is skipped if the exact same text was already written. Returns the
/// number of lines written.
pub(crate) fn write_lines(
    dest: &Path,
    lines: impl IntoIterator<Item = String>,
    no_duplicates: bool,
) -> Result<usize, Error> {
    let write_error = |source| Error::Write {
        path: dest.to_path_buf(),
        source,
    };

    if let Some(parent) = dest.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(write_error)?;
    }

    let file = File::create(dest).map_err(write_error)?;
    let mut writer = BufWriter::new(file);

    let mut seen = HashSet::new();
    let mut written = 0;
    for line in lines {
        if no_duplicates && !seen.insert(line.clone()) {
            tracing::debug!("skipping duplicate line: {line}");
            continue;
        }
        writeln!(writer, "{line}").map_err(write_error)?;
        written += 1;
    }
    writer.flush().map_err(write_error)?;

    tracing::info!("wrote {written} lines to {}", dest.display());
    Ok(written)
}

#[cfg(test)]
mod tests {
    use std::fs;

    use tempfile::TempDir;

    use super::*;

    fn lines(items: &[&str]) -> Vec<String> {
        items.iter().map(ToString::to_string).collect()
    }

    #[test]
    fn creates_parent_directories() {
        let tmp = TempDir::new().unwrap();
        let dest = tmp.path().join("out/deeper/requirements.txt");

        let written = write_lines(&dest, lines(&["requests", "flask"]), false).unwrap();

        assert_eq!(written, 2);
        assert_eq!(fs::read_to_string(dest).unwrap(), "requests\nflask\n");
    }

    #[test]
    fn overwrites_existing_file() {
        let tmp = TempDir::new().unwrap();
        let dest = tmp.path().join("requirements.txt");
        fs::write(&dest, "old\ncontent\nthat is longer\n").unwrap();

        write_lines(&dest, lines(&["new"]), false).unwrap();

        assert_eq!(fs::read_to_string(dest).unwrap(), "new\n");
    }

    #[test]
    fn deduplicates_keeping_first_seen_order() {
        let tmp = TempDir::new().unwrap();
        let dest = tmp.path().join("requirements.txt");

        let written = write_lines(
            &dest,
            lines(&["b", "a", "b", "a # note", "a", "c"]),
            true,
        )
        .unwrap();

        assert_eq!(written, 4);
        assert_eq!(fs::read_to_string(dest).unwrap(), "b\na\na # note\nc\n");
    }

    #[test]
    fn keeps_duplicates_unless_asked() {
        let tmp = TempDir::new().unwrap();
        let dest = tmp.path().join("requirements.txt");

        let written = write_lines(&dest, lines(&["a", "a"]), false).unwrap();

        assert_eq!(written, 2);
    }
}
