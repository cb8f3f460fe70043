//! Masked line input.
//!
//! Typed characters are echoed as `*`. The key handling is separate from the
//! terminal so it can run over any key source and any output sink.

use std::io::{self, Write};

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::terminal;
use tracing::{trace, warn};

use crate::error::{Error, Result};

/// Glyph echoed for each buffered character.
const MASK: &[u8] = b"*";

/// Moves left, blanks the glyph, moves left again.
const ERASE: &[u8] = b"\x08 \x08";

/// A decoded keypress.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    /// A character to add to the line.
    Char(char),
    /// Carriage return or line feed; ends the line.
    Enter,
    /// Backspace or delete; removes the last character.
    Backspace,
    /// Ctrl-C.
    Interrupt,
    /// Anything with no effect on the line (arrows, function keys...).
    Ignored,
}

impl Key {
    /// Decode one byte of a raw input stream.
    #[must_use]
    pub fn from_byte(byte: u8) -> Self {
        match byte {
            b'\n' | b'\r' => Self::Enter,
            8 | 127 => Self::Backspace,
            3 => Self::Interrupt,
            other => Self::Char(char::from(other)),
        }
    }

    /// Decode a crossterm key event.
    #[must_use]
    pub fn from_event(event: &KeyEvent) -> Self {
        let ctrl = event.modifiers.contains(KeyModifiers::CONTROL);
        match event.code {
            KeyCode::Enter => Self::Enter,
            KeyCode::Backspace => Self::Backspace,
            KeyCode::Char('c') if ctrl => Self::Interrupt,
            KeyCode::Char('h') if ctrl => Self::Backspace,
            KeyCode::Char('j' | 'm') if ctrl => Self::Enter,
            KeyCode::Char(_) if ctrl => Self::Ignored,
            KeyCode::Char(c) => Self::Char(c),
            KeyCode::Tab => Self::Char('\t'),
            _ => Self::Ignored,
        }
    }
}

/// Switches the terminal to raw mode for as long as it lives.
///
/// Dropping the guard restores the previous mode on every exit path.
#[derive(Debug)]
pub struct RawModeGuard {
    _private: (),
}

impl RawModeGuard {
    /// Enter raw mode.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Terminal`] if the terminal mode cannot be changed.
    pub fn acquire() -> Result<Self> {
        terminal::enable_raw_mode().map_err(Error::Terminal)?;
        trace!("Terminal raw mode enabled");
        Ok(Self { _private: () })
    }
}

impl Drop for RawModeGuard {
    fn drop(&mut self) {
        match terminal::disable_raw_mode() {
            Ok(()) => trace!("Terminal raw mode disabled"),
            Err(e) => warn!("Failed to restore terminal mode: {}", e),
        }
    }
}

/// Collect one masked line from `keys`, echoing to `echo`.
///
/// The terminating newline is not echoed; callers print it once the
/// terminal is back in its normal mode.
///
/// # Errors
///
/// Returns [`Error::Interrupted`] on Ctrl-C, [`Error::InputClosed`] when the
/// keys run out before Enter, and [`Error::Terminal`] if a key cannot be read.
pub fn collect_masked<I, W>(keys: I, echo: &mut W) -> Result<String>
where
    I: IntoIterator<Item = io::Result<Key>>,
    W: Write,
{
    let mut line = String::new();
    for key in keys {
        match key.map_err(Error::Terminal)? {
            Key::Enter => return Ok(line),
            Key::Backspace => {
                if line.pop().is_some() {
                    echo.write_all(ERASE)?;
                }
            }
            Key::Char(c) => {
                line.push(c);
                echo.write_all(MASK)?;
            }
            Key::Interrupt => return Err(Error::Interrupted),
            Key::Ignored => continue,
        }
        echo.flush()?;
    }
    Err(Error::InputClosed)
}

/// Read a masked line from the terminal.
///
/// Prints `prompt`, reads keys in raw mode, then restores the terminal and
/// ends the display line.
///
/// # Errors
///
/// See [`collect_masked`]; also fails if raw mode cannot be entered.
pub fn read_masked<W: Write>(prompt: &str, out: &mut W) -> Result<String> {
    out.write_all(prompt.as_bytes())?;
    out.flush()?;

    let result = {
        let _guard = RawModeGuard::acquire()?;
        collect_masked(std::iter::from_fn(|| Some(next_terminal_key())), out)
    };

    out.write_all(b"\n")?;
    out.flush()?;
    result
}

/// Block until the next keypress.
fn next_terminal_key() -> io::Result<Key> {
    loop {
        if let Event::Key(key_event) = event::read()? {
            if key_event.kind == KeyEventKind::Release {
                continue;
            }
            return Ok(Key::from_event(&key_event));
        }
    }
}
