//! Random-access character buffer the tokenizer reads from.

use crate::error::{Result, SpecError};

/// A character buffer with a movable read pointer.
///
/// Supports single-character lookahead (`touch`), pushback (`ungetc`) and
/// both relative (`seek`) and absolute (`seek_to`) repositioning.
#[derive(Debug, Clone)]
pub struct SourceBuffer {
    content: Vec<char>,
    pointer: usize,
}

impl SourceBuffer {
    pub fn new(source: &str) -> Self {
        Self {
            content: source.chars().collect(),
            pointer: 0,
        }
    }

    /// Number of characters in the buffer.
    pub fn len(&self) -> usize {
        self.content.len()
    }

    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }

    /// Current pointer position.
    pub fn position(&self) -> usize {
        self.pointer
    }

    pub fn is_eof(&self) -> bool {
        self.pointer >= self.content.len()
    }

    /// Return the character under the pointer and advance.
    pub fn getc(&mut self) -> Option<char> {
        let c = self.content.get(self.pointer).copied()?;
        self.pointer += 1;
        Some(c)
    }

    /// Return the character under the pointer without advancing.
    pub fn touch(&self) -> Option<char> {
        self.content.get(self.pointer).copied()
    }

    /// Return the character `offset` places past the pointer without advancing.
    pub fn peek(&self, offset: usize) -> Option<char> {
        self.content.get(self.pointer + offset).copied()
    }

    /// Move the pointer one character back.
    pub fn ungetc(&mut self) -> Result<()> {
        if self.pointer == 0 {
            return Err(SpecError::BadIndex(
                "cannot unget at the beginning of the buffer".to_string(),
            ));
        }
        self.pointer -= 1;
        Ok(())
    }

    /// Move the pointer relative to its current position.
    pub fn seek(&mut self, offset: isize) -> Result<()> {
        let target = self
            .pointer
            .checked_add_signed(offset)
            .ok_or_else(|| SpecError::BadIndex(format!("bad seek by {offset}")))?;
        self.seek_to(target)
    }

    /// Move the pointer to an absolute position; `len()` is the EOF position.
    pub fn seek_to(&mut self, position: usize) -> Result<()> {
        if position > self.content.len() {
            return Err(SpecError::BadIndex(format!(
                "seek to {position} past end of buffer ({})",
                self.content.len()
            )));
        }
        self.pointer = position;
        Ok(())
    }

    pub fn reset(&mut self) {
        self.pointer = 0;
    }

    /// Read the rest of the current line, including its newline.
    pub fn read_line(&mut self) -> Option<String> {
        if self.is_eof() {
            return None;
        }
        let mut line = String::new();
        while let Some(c) = self.getc() {
            line.push(c);
            if c == '\n' {
                break;
            }
        }
        Some(line)
    }

    /// Read up to (not including) the next newline.
    pub fn read_until_eol(&mut self) -> String {
        let mut text = String::new();
        while let Some(c) = self.touch() {
            if c == '\n' {
                break;
            }
            text.push(c);
            self.pointer += 1;
        }
        text
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn getc_and_touch() {
        let mut buf = SourceBuffer::new("ab");
        assert_eq!(buf.touch(), Some('a'));
        assert_eq!(buf.getc(), Some('a'));
        assert_eq!(buf.getc(), Some('b'));
        assert_eq!(buf.getc(), None);
        assert_eq!(buf.touch(), None);
        assert!(buf.is_eof());
    }

    #[test]
    fn ungetc_steps_back_even_at_eof() {
        let mut buf = SourceBuffer::new("x");
        buf.getc();
        buf.ungetc().unwrap();
        assert_eq!(buf.getc(), Some('x'));
    }

    #[test]
    fn ungetc_at_start_is_bad_index() {
        let mut buf = SourceBuffer::new("x");
        assert!(matches!(buf.ungetc(), Err(SpecError::BadIndex(_))));
    }

    #[test]
    fn seek_relative_and_absolute() {
        let mut buf = SourceBuffer::new("hello");
        buf.seek(3).unwrap();
        assert_eq!(buf.touch(), Some('l'));
        buf.seek(-2).unwrap();
        assert_eq!(buf.touch(), Some('e'));
        buf.seek_to(5).unwrap();
        assert!(buf.is_eof());
        assert!(buf.seek_to(6).is_err());
        assert!(buf.seek(-10).is_err());
        buf.reset();
        assert_eq!(buf.position(), 0);
    }

    #[test]
    fn read_line_keeps_newline() {
        let mut buf = SourceBuffer::new("one\ntwo");
        assert_eq!(buf.read_line().as_deref(), Some("one\n"));
        assert_eq!(buf.read_line().as_deref(), Some("two"));
        assert_eq!(buf.read_line(), None);
    }

    #[test]
    fn read_until_eol_stops_before_newline() {
        let mut buf = SourceBuffer::new("# note\nrest");
        assert_eq!(buf.read_until_eol(), "# note");
        assert_eq!(buf.touch(), Some('\n'));
    }
}
