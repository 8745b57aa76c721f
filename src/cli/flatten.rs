use std::path::PathBuf;

use anyhow::Context;
use requirement_walker::{Config, ExportOptions, RequirementFile};
use tracing::instrument;

use super::terminal::Tone;

#[derive(Debug, clap::Parser)]
#[command(about = "Write a requirements file and everything it includes to a single file")]
pub struct Command {
    /// The requirements file to read
    file: PathBuf,

    /// Where to write the flattened file (overwritten if it exists)
    dest: PathBuf,

    /// Skip blank lines
    #[arg(long)]
    no_empty_lines: bool,

    /// Skip lines that only carry a comment
    #[arg(long)]
    no_comment_only_lines: bool,

    /// Skip lines whose text was already written
    #[arg(long)]
    no_duplicates: bool,
}

impl Command {
    /// Combines the command line flags with the configured defaults. A flag
    /// can switch a filter on but never off.
    fn options(&self, config: &Config) -> ExportOptions {
        let mut options = config.export_options();
        options.walk.no_empty_lines |= self.no_empty_lines;
        options.walk.no_comment_only_lines |= self.no_comment_only_lines;
        options.no_duplicates |= self.no_duplicates;
        options
    }

    #[instrument(level = "debug", skip(config))]
    pub fn run(self, config: &Config) -> anyhow::Result<()> {
        let options = self.options(config);

        let mut file = RequirementFile::new(&self.file);
        let written = file
            .to_single_file(&self.dest, options)
            .with_context(|| format!("failed to flatten {}", self.file.display()))?;

        println!(
            "{}",
            Tone::Done.paint(&format!("Wrote {written} lines to {}", self.dest.display()))
        );
        Ok(())
    }
}
