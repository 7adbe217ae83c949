//! # Token - the atomic lexical unit
//!
//! A [`Token`] is a run of non-whitespace text (its *value*) together with the
//! exact formatting around it:
//!
//! - `prepend`: whitespace and comments before the value
//! - `append`: whitespace and comments after the value
//!
//! Formatting is attached to tokens rather than emitted as separate
//! whitespace tokens, so a parser can consume `Name:` and `foo` as two tokens
//! while the renderer still writes back every byte.
//!
//! ```
//! use specedit_syntax::tokenize;
//!
//! let stream = tokenize("Name:  foo # comment\n");
//! let text: String = stream.tokens().iter().map(|t| t.to_text(false)).collect();
//! assert_eq!(text, "Name:  foo # comment\n");
//! ```

use std::fmt;
use std::io;

/// Line continuation: a backslash immediately followed by a newline.
pub const CONTINUATION: &str = "\\\n";
/// A line continuation in a file with CRLF line endings.
pub const CRLF_CONTINUATION: &str = "\\\r\n";

/// A token with its surrounding formatting and source line.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Token {
    /// Core text; `None` marks the end of the stream.
    pub value: Option<String>,
    pub prepend: String,
    pub append: String,
    /// 1-based line where the core text starts.
    pub line: usize,
}

impl Token {
    /// Create a token that did not come from a source file.
    ///
    /// The line is left at 0; created tokens are only ever rendered.
    pub fn create(value: impl Into<String>, prepend: impl Into<String>, append: impl Into<String>) -> Self {
        Self {
            value: Some(value.into()),
            prepend: prepend.into(),
            append: append.into(),
            line: 0,
        }
    }

    /// A token followed by a single space, the default for generated text.
    pub fn word(value: impl Into<String>) -> Self {
        Self::create(value, "", " ")
    }

    pub fn eof(prepend: impl Into<String>, line: usize) -> Self {
        Self {
            value: None,
            prepend: prepend.into(),
            append: String::new(),
            line,
        }
    }

    pub fn is_eof(&self) -> bool {
        self.value.is_none()
    }

    /// Core text, empty for EOF.
    pub fn as_str(&self) -> &str {
        self.value.as_deref().unwrap_or("")
    }

    /// True if the core text equals `text`.
    pub fn is(&self, text: &str) -> bool {
        self.value.as_deref() == Some(text)
    }

    /// Number of line continuations in the appended formatting.
    pub fn continuations(&self) -> usize {
        self.append.matches(CONTINUATION).count() + self.append.matches(CRLF_CONTINUATION).count()
    }

    /// Whether `next` starts on the same logical line as this token.
    ///
    /// Continuations in the append move the raw line forward without ending
    /// the logical line.
    pub fn same_line(&self, next: &Token) -> bool {
        self.line + self.continuations() == next.line
    }

    /// Terminate the line this token ends unless its append already does.
    pub fn end_line(&mut self) {
        if !self.append.contains('\n') {
            self.append.push('\n');
        }
    }

    /// Text of the token; `raw` omits prepend and append.
    pub fn to_text(&self, raw: bool) -> String {
        let mut out = String::new();
        self.push_to(&mut out, raw);
        out
    }

    pub fn push_to(&self, out: &mut String, raw: bool) {
        if !raw {
            out.push_str(&self.prepend);
        }
        if let Some(value) = &self.value {
            out.push_str(value);
        }
        if !raw {
            out.push_str(&self.append);
        }
    }

    pub fn write(&self, sink: &mut dyn io::Write, raw: bool) -> io::Result<()> {
        if !raw {
            sink.write_all(self.prepend.as_bytes())?;
        }
        if let Some(value) = &self.value {
            sink.write_all(value.as_bytes())?;
        }
        if !raw {
            sink.write_all(self.append.as_bytes())?;
        }
        Ok(())
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.value {
            Some(value) => f.write_str(value),
            None => f.write_str("<EOF>"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn token(value: &str, append: &str, line: usize) -> Token {
        Token {
            value: Some(value.to_string()),
            prepend: String::new(),
            append: append.to_string(),
            line,
        }
    }

    #[test]
    fn text_with_and_without_formatting() {
        let t = Token::create("foo", "  ", "\n");
        assert_eq!(t.to_text(false), "  foo\n");
        assert_eq!(t.to_text(true), "foo");
    }

    #[test]
    fn eof_displays_marker_and_renders_prepend() {
        let t = Token::eof("\n# trailing\n", 4);
        assert!(t.is_eof());
        assert_eq!(t.to_string(), "<EOF>");
        assert_eq!(t.to_text(false), "\n# trailing\n");
        assert_eq!(t.as_str(), "");
    }

    #[test]
    fn same_line_plain() {
        let a = token("Name:", " ", 1);
        let b = token("foo", "\n", 1);
        let c = token("Version:", " ", 2);
        assert!(a.same_line(&b));
        assert!(!b.same_line(&c));
    }

    #[test]
    fn same_line_across_continuation() {
        let a = token("foo", " \\\n  ", 3);
        let b = token("bar", "\n", 4);
        assert_eq!(a.continuations(), 1);
        assert!(a.same_line(&b));
    }

    #[test]
    fn write_to_sink() {
        let mut out = Vec::new();
        Token::create("x", "\t", " ").write(&mut out, false).unwrap();
        Token::create("y", "\t", " ").write(&mut out, true).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "\tx y");
    }

    #[test]
    fn word_appends_space() {
        assert_eq!(Token::word("Provides:").to_text(false), "Provides: ");
        assert!(Token::word("x").is("x"));
    }
}
