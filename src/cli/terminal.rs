//! Colouring for terminal output. Plain text is written whenever stdout
//! cannot show colour.

use owo_colors::{OwoColorize, Style};
use supports_color::Stream;

/// How a piece of output should stand out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone {
    /// A command finished and wrote its result.
    Done,
    /// A requirement that could not be classified.
    Failed,
    /// A line that carries no requirement.
    Quiet,
    /// Everything else.
    Plain,
}

impl Tone {
    fn style(self) -> Style {
        match self {
            Self::Done => Style::new().green(),
            Self::Failed => Style::new().yellow().bold(),
            Self::Quiet => Style::new().dimmed(),
            Self::Plain => Style::new(),
        }
    }

    /// Paints `text` in this tone if stdout supports colour.
    pub fn paint(self, text: &str) -> String {
        if self != Self::Plain && supports_color::on_cached(Stream::Stdout).is_some() {
            text.style(self.style()).to_string()
        } else {
            text.to_string()
        }
    }
}
