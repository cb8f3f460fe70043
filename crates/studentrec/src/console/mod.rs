//! Console input and output.
//!
//! The menus talk to a [`Console`]. [`TerminalConsole`] is the real one,
//! reading stdin and writing stdout.

pub mod masked;

use std::io::{self, IsTerminal, Stdin, Stdout, Write};

use tracing::debug;

use crate::error::{Error, Result};
use crate::record::Marks;

/// Prompted line input, masked input and text output.
pub trait Console {
    /// Print `prompt` and read one line, without its line ending.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InputClosed`] at end of input.
    fn read_line(&mut self, prompt: &str) -> Result<String>;

    /// Print `prompt` and read one line without echoing it.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InputClosed`] at end of input and
    /// [`Error::Interrupted`] on Ctrl-C.
    fn read_masked(&mut self, prompt: &str) -> Result<String>;

    /// Write text as-is.
    ///
    /// # Errors
    ///
    /// Returns an error if the output cannot be written.
    fn print(&mut self, text: &str) -> Result<()>;

    /// Write one line of text.
    ///
    /// # Errors
    ///
    /// Returns an error if the output cannot be written.
    fn say(&mut self, line: &str) -> Result<()> {
        self.print(line)?;
        self.print("\n")
    }

    /// Read the first whitespace-separated word of a line.
    ///
    /// Blank lines prompt again.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InputClosed`] at end of input.
    fn read_word(&mut self, prompt: &str) -> Result<String> {
        loop {
            let line = self.read_line(prompt)?;
            if let Some(word) = line.split_whitespace().next() {
                return Ok(word.to_string());
            }
        }
    }

    /// Read three whole numbers from one line, prompting until they parse.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InputClosed`] at end of input.
    fn read_marks(&mut self, prompt: &str) -> Result<Marks> {
        loop {
            match self.read_line(prompt)?.parse::<Marks>() {
                Ok(marks) => return Ok(marks),
                Err(_) => self.say("Please enter three whole numbers.")?,
            }
        }
    }
}

/// Console on the process's stdin and stdout.
#[derive(Debug)]
pub struct TerminalConsole {
    input: Stdin,
    output: Stdout,
}

impl TerminalConsole {
    /// Create a console on stdin and stdout.
    #[must_use]
    pub fn new() -> Self {
        Self {
            input: io::stdin(),
            output: io::stdout(),
        }
    }

    fn prompt(&mut self, prompt: &str) -> Result<()> {
        self.output.write_all(prompt.as_bytes())?;
        self.output.flush()?;
        Ok(())
    }
}

impl Default for TerminalConsole {
    fn default() -> Self {
        Self::new()
    }
}

impl Console for TerminalConsole {
    fn read_line(&mut self, prompt: &str) -> Result<String> {
        self.prompt(prompt)?;

        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            debug!("Standard input closed");
            return Err(Error::InputClosed);
        }
        let trimmed = line.trim_end_matches(['\n', '\r']).len();
        line.truncate(trimmed);
        Ok(line)
    }

    /// Falls back to an unmasked line read when stdin is not a terminal.
    fn read_masked(&mut self, prompt: &str) -> Result<String> {
        if !self.input.is_terminal() {
            return self.read_line(prompt);
        }
        masked::read_masked(prompt, &mut self.output)
    }

    fn print(&mut self, text: &str) -> Result<()> {
        self.output.write_all(text.as_bytes())?;
        self.output.flush()?;
        Ok(())
    }
}

/// Console replaying fixed input lines and recording everything printed.
#[cfg(test)]
#[derive(Debug, Default)]
pub(crate) struct ScriptedConsole {
    input: std::collections::VecDeque<String>,
    output: String,
}

#[cfg(test)]
impl ScriptedConsole {
    pub(crate) fn new<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            input: lines.into_iter().map(Into::into).collect(),
            output: String::new(),
        }
    }

    pub(crate) fn output(&self) -> &str {
        &self.output
    }

    pub(crate) fn remaining_input(&self) -> usize {
        self.input.len()
    }

    fn next_line(&mut self, prompt: &str) -> Result<String> {
        self.output.push_str(prompt);
        self.input.pop_front().ok_or(Error::InputClosed)
    }
}

#[cfg(test)]
impl Console for ScriptedConsole {
    fn read_line(&mut self, prompt: &str) -> Result<String> {
        let line = self.next_line(prompt)?;
        self.output.push_str(&line);
        self.output.push('\n');
        Ok(line)
    }

    /// Runs the line through the masking engine, so scripts may contain
    /// backspace and Ctrl-C bytes.
    fn read_masked(&mut self, prompt: &str) -> Result<String> {
        let line = self.next_line(prompt)?;
        let keys = line
            .bytes()
            .chain(std::iter::once(b'\n'))
            .map(|byte| Ok(masked::Key::from_byte(byte)));

        let mut echo = Vec::new();
        let result = masked::collect_masked(keys, &mut echo);
        self.output.push_str(&String::from_utf8_lossy(&echo));
        self.output.push('\n');
        result
    }

    fn print(&mut self, text: &str) -> Result<()> {
        self.output.push_str(text);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_word_skips_blank_lines() {
        let mut console = ScriptedConsole::new(["", "   ", "  S100 trailing words"]);
        assert_eq!(console.read_word("Regno: ").unwrap(), "S100");
        assert_eq!(console.output().matches("Regno: ").count(), 3);
    }

    #[test]
    fn test_read_marks_reprompts() {
        let mut console = ScriptedConsole::new(["80 70", "a b c", "80 70 90"]);
        assert_eq!(console.read_marks("Marks (3): ").unwrap(), Marks::new(80, 70, 90));
        assert_eq!(
            console.output().matches("Please enter three whole numbers.").count(),
            2
        );
    }

    #[test]
    fn test_read_line_end_of_input() {
        let mut console = ScriptedConsole::new(Vec::<String>::new());
        assert!(matches!(console.read_line("> "), Err(Error::InputClosed)));
    }

    #[test]
    fn test_scripted_masked_input_hides_text() {
        let mut console = ScriptedConsole::new(["hunter2"]);
        assert_eq!(console.read_masked("Password: ").unwrap(), "hunter2");
        assert_eq!(console.output(), "Password: *******\n");
        assert!(!console.output().contains("hunter2"));
    }

    #[test]
    fn test_scripted_masked_input_backspace() {
        let mut console = ScriptedConsole::new(["pass\x7f\x7fss"]);
        assert_eq!(console.read_masked("Password: ").unwrap(), "pass");
    }

    #[test]
    fn test_say_appends_newline() {
        let mut console = ScriptedConsole::default();
        console.say("Deleted.").unwrap();
        assert_eq!(console.output(), "Deleted.\n");
        assert_eq!(console.remaining_input(), 0);
    }
}
