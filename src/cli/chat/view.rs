use std::io::{self, Write};

use crossterm::style::Stylize;
use crossterm::{cursor, queue, terminal};

use super::transcript::{Message, MessageId, Sender};

/// Writes transcript entries to the terminal.
///
/// When `styled` is set the output is assumed to be a terminal: sender
/// prefixes are coloured and an entry that is still the last line written can
/// be erased again with [`ChatView::retract`].
pub struct ChatView {
    output: Box<dyn Write>,
    styled: bool,
    retract: bool,
    last_line: Option<MessageId>,
}

impl ChatView {
    pub fn new(output: Box<dyn Write>, styled: bool) -> Self {
        Self {
            output,
            styled,
            retract: styled,
            last_line: None,
        }
    }

    /// Turns line erasing off when something else also writes to the screen,
    /// e.g. debug logs on stderr. `last_line` cannot see those writes.
    pub fn with_retract(mut self, enabled: bool) -> Self {
        self.retract = enabled && self.styled;
        self
    }

    pub fn render(&mut self, message: &Message) -> io::Result<()> {
        let prefix = match message.sender() {
            Sender::User => "you ›",
            Sender::Bot => "bot ›",
        };

        let prefix = match (self.styled, message.sender()) {
            (false, _) => prefix.to_string(),
            (true, Sender::User) => prefix.cyan().bold().to_string(),
            (true, Sender::Bot) => prefix.green().bold().to_string(),
        };
        writeln!(self.output, "{} {}", prefix, message.text())?;
        self.output.flush()?;

        self.last_line = if message.text().contains('\n') {
            None
        } else {
            Some(message.id())
        };
        Ok(())
    }

    /// Erases the rendered line for `id` if nothing has been written after it.
    /// Returns whether the line was erased.
    pub fn retract(&mut self, id: MessageId) -> io::Result<bool> {
        if !self.retract || self.last_line != Some(id) {
            return Ok(false);
        }

        queue!(
            self.output,
            cursor::MoveToPreviousLine(1),
            terminal::Clear(terminal::ClearType::CurrentLine)
        )?;
        self.output.flush()?;
        self.last_line = None;
        Ok(true)
    }

    /// Writes text that is not part of the transcript (help, notices).
    pub fn notice(&mut self, text: &str) -> io::Result<()> {
        writeln!(self.output, "{}", text)?;
        self.output.flush()?;
        self.last_line = None;
        Ok(())
    }
}
