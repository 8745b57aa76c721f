use std::path::PathBuf;

use requirement_walker::{
    Config, Entry, Requirement, RequirementFile, WalkOptions, domain::Content,
};
use serde::Serialize;
use tracing::instrument;

use super::terminal::Tone;

#[derive(Debug, clap::Parser)]
#[command(about = "List the entries of a requirements file")]
pub struct Command {
    /// The requirements file to read
    file: PathBuf,

    /// Expand `-r`/`--requirement` includes in place
    #[arg(long, short = 'R')]
    recursive: bool,

    /// Skip blank lines
    #[arg(long)]
    no_empty_lines: bool,

    /// Skip lines that only carry a comment
    #[arg(long)]
    no_comment_only_lines: bool,

    /// Output format
    #[arg(long, value_name = "FORMAT", default_value = "table")]
    output: OutputFormat,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
enum OutputFormat {
    #[default]
    Table,
    Json,
}

#[derive(Debug, Serialize)]
struct Row<'a> {
    kind: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    name: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    url: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    comment: Option<&'a str>,
    line: String,
}

impl<'a> From<&'a Entry> for Row<'a> {
    fn from(entry: &'a Entry) -> Self {
        Self {
            kind: kind(entry),
            name: entry.requirement().map(Requirement::name),
            url: entry.requirement().and_then(Requirement::url),
            comment: entry.comment().text(),
            line: entry.to_string(),
        }
    }
}

impl Command {
    #[instrument(level = "debug", skip(config))]
    pub fn run(self, config: &Config) -> anyhow::Result<()> {
        let options = WalkOptions {
            no_empty_lines: self.no_empty_lines || config.no_empty_lines,
            no_comment_only_lines: self.no_comment_only_lines || config.no_comment_only_lines,
            max_depth: config.max_depth,
        };

        let mut file = RequirementFile::new(self.file);
        let entries: Vec<&Entry> = if self.recursive {
            file.iter_recursive(options)?.collect()
        } else {
            file.entries()?
                .iter()
                .filter(|entry| entry.include().is_some() || options.keeps(entry))
                .collect()
        };

        print!("{}", render(&entries, self.output)?);
        Ok(())
    }
}

fn render(entries: &[&Entry], output: OutputFormat) -> anyhow::Result<String> {
    let rows: Vec<Row> = entries.iter().map(|entry| Row::from(*entry)).collect();

    if output == OutputFormat::Json {
        return Ok(serde_json::to_string_pretty(&rows)? + "\n");
    }

    let mut out = String::new();
    for row in rows {
        let row_tone = tone(row.kind);
        let line = format!(
            "{} {}",
            row_tone.paint(&format!("{:<8}", row.kind)),
            row_tone.paint(&row.line)
        );
        out.push_str(line.trim_end());
        out.push('\n');
    }
    Ok(out)
}

fn tone(kind: &str) -> Tone {
    match kind {
        "failed" => Tone::Failed,
        "comment" | "empty" => Tone::Quiet,
        _ => Tone::Plain,
    }
}

const fn kind(entry: &Entry) -> &'static str {
    match entry.content() {
        Content::Nothing if entry.is_comment_only() => "comment",
        Content::Nothing => "empty",
        Content::Include(_) => "include",
        Content::Requirement(Requirement::Standard(_)) => "standard",
        Content::Requirement(Requirement::LocalPackage { .. }) => "local",
        Content::Requirement(Requirement::Failed { .. }) => "failed",
    }
}

#[cfg(test)]
mod tests {
    use std::{fs, path::Path};

    use tempfile::TempDir;

    use super::*;

    fn parse(line: &str) -> Entry {
        Entry::parse(line, Path::new("/reqs")).unwrap().remove(0)
    }

    #[test]
    fn labels_every_kind() {
        let lines = [
            ("requests==2.0", "standard"),
            ("./pkg # requirement-walker: local-package-name=pkg", "local"),
            ("???", "failed"),
            ("-r base.txt", "include"),
            ("# note", "comment"),
            ("", "empty"),
        ];
        for (line, expected) in lines {
            assert_eq!(kind(&parse(line)), expected, "line: {line:?}");
        }
    }

    #[test]
    fn table_rows_are_labelled() {
        let entries = [parse("requests==2.0"), parse("-r base.txt # shared")];
        let refs: Vec<&Entry> = entries.iter().collect();
        let table = render(&refs, OutputFormat::Table).unwrap();
        let lines: Vec<&str> = table.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].contains("standard") && lines[0].ends_with("requests==2.0"));
        assert!(lines[1].contains("include") && lines[1].ends_with("-r base.txt # shared"));
    }

    #[test]
    fn failed_and_quiet_rows_are_toned() {
        assert_eq!(tone("failed"), Tone::Failed);
        assert_eq!(tone("comment"), Tone::Quiet);
        assert_eq!(tone("empty"), Tone::Quiet);
        assert_eq!(tone("standard"), Tone::Plain);
    }

    #[test]
    fn renders_json() {
        let entry = parse("./pkg # requirement-walker: local-package-name=pkg");
        let json = render(&[&entry], OutputFormat::Json).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value[0]["kind"], "local");
        assert_eq!(value[0]["name"], "pkg");
        assert_eq!(value[0]["url"], "./pkg");
        assert_eq!(
            value[0]["comment"],
            "# requirement-walker: local-package-name=pkg"
        );
    }

    #[test]
    fn run_lists_recursively() {
        let tmp = TempDir::new().unwrap();
        let root = tmp.path().join("requirements.txt");
        fs::write(&root, "requests\n-r other.txt\n").unwrap();
        fs::write(tmp.path().join("other.txt"), "flask\n").unwrap();

        let command = Command {
            file: root,
            recursive: true,
            no_empty_lines: false,
            no_comment_only_lines: false,
            output: OutputFormat::Table,
        };
        command.run(&Config::default()).unwrap();
    }

    #[test]
    fn run_fails_on_missing_file() {
        let tmp = TempDir::new().unwrap();
        let command = Command {
            file: tmp.path().join("missing.txt"),
            recursive: false,
            no_empty_lines: false,
            no_comment_only_lines: false,
            output: OutputFormat::Json,
        };
        assert!(command.run(&Config::default()).is_err());
    }
}
