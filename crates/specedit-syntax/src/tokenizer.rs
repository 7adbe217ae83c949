//! # Tokenizer - source text to [`TokenStream`]
//!
//! The tokenizer scans a [`SourceBuffer`] one character at a time and groups
//! everything into tokens. Nothing is discarded: whitespace and comments are
//! attached to the neighbouring token as *prepend* or *append* text.
//!
//! ## Classification rules
//!
//! - Before any core character is seen, whitespace and comments are prepend.
//! - Non-whitespace characters form the core value.
//! - After the core, whitespace and comments are append, until a further core
//!   character shows up; that character is pushed back and starts the next
//!   token.
//! - A `#` that follows an append which already ends with a newline is pushed
//!   back too, so a comment on its own line belongs to the token after it.
//! - `\` followed by a newline (LF or CRLF) is a line continuation. It is
//!   stored verbatim and counted as a line, but [`Token::same_line`] does not
//!   treat it as the end of a logical line.
//!
//! The stream ends with an EOF token whose prepend carries any trailing
//! whitespace and comments, so concatenating every token reproduces the
//! input exactly.

use crate::source::SourceBuffer;
use crate::stream::TokenStream;
use crate::token::{CONTINUATION, CRLF_CONTINUATION, Token};

fn is_whitespace(c: char) -> bool {
    matches!(c, ' ' | '\t' | '\r' | '\n')
}

/// Tokenize a whole spec file.
pub fn tokenize(source: &str) -> TokenStream {
    let mut buffer = SourceBuffer::new(source);
    let mut line = 1;
    let mut tokens = Vec::new();

    loop {
        let token = next_token(&mut buffer, &mut line);
        if token.is_eof() {
            return TokenStream::new(tokens, token);
        }
        tokens.push(token);
    }
}

/// Tokenize replacement text for a section body.
///
/// Trailing whitespace that would land in the EOF token is moved onto the
/// last token so it survives being spliced into another stream.
pub fn tokenize_fragment(source: &str) -> TokenStream {
    let stream = tokenize(source);
    let trailing = stream.eof_token().prepend.clone();
    let mut tokens = stream.into_tokens();
    if let Some(last) = tokens.last_mut() {
        last.append.push_str(&trailing);
    }
    TokenStream::from_tokens(tokens)
}

fn next_token(buffer: &mut SourceBuffer, line: &mut usize) -> Token {
    let mut prepend = String::new();
    let mut core = String::new();
    let mut append = String::new();
    let mut core_line = *line;

    while let Some(c) = buffer.getc() {
        match c {
            '\\' if at_line_end(buffer) => {
                let continuation = if buffer.getc() == Some('\r') {
                    buffer.getc();
                    CRLF_CONTINUATION
                } else {
                    CONTINUATION
                };
                *line += 1;
                if core.is_empty() {
                    prepend.push_str(continuation);
                } else {
                    append.push_str(continuation);
                }
            }
            '#' => {
                if core.is_empty() {
                    prepend.push('#');
                    prepend.push_str(&buffer.read_until_eol());
                } else if append.ends_with('\n') {
                    step_back(buffer);
                    break;
                } else {
                    append.push('#');
                    append.push_str(&buffer.read_until_eol());
                }
            }
            c if is_whitespace(c) => {
                if c == '\n' {
                    *line += 1;
                }
                if core.is_empty() {
                    prepend.push(c);
                } else {
                    append.push(c);
                }
            }
            c => {
                if !append.is_empty() {
                    step_back(buffer);
                    break;
                }
                if core.is_empty() {
                    core_line = *line;
                }
                core.push(c);
            }
        }
    }

    if core.is_empty() {
        return Token::eof(prepend, *line);
    }

    Token {
        value: Some(core),
        prepend,
        append,
        line: core_line,
    }
}

/// True if the pointer is at an LF or CRLF line ending.
fn at_line_end(buffer: &SourceBuffer) -> bool {
    matches!(
        (buffer.touch(), buffer.peek(1)),
        (Some('\n'), _) | (Some('\r'), Some('\n'))
    )
}

fn step_back(buffer: &mut SourceBuffer) {
    // Only called right after a successful getc, so the pointer is never 0.
    if buffer.ungetc().is_err() {
        log::error!("tokenizer stepped back past the start of the buffer");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn parts(source: &str) -> Vec<(String, String, String, usize)> {
        tokenize(source)
            .iter()
            .map(|t| (t.prepend.clone(), t.as_str().to_string(), t.append.clone(), t.line))
            .collect()
    }

    fn part(prepend: &str, value: &str, append: &str, line: usize) -> (String, String, String, usize) {
        (prepend.to_string(), value.to_string(), append.to_string(), line)
    }

    fn reconstruct(source: &str) -> String {
        let stream = tokenize(source);
        let mut out = stream.to_text(false);
        out.push_str(&stream.eof_token().prepend);
        out
    }

    #[test]
    fn empty_input_is_only_eof() {
        let stream = tokenize("");
        assert!(stream.is_empty());
        assert!(stream.eof_token().is_eof());
        assert_eq!(stream.eof_token().prepend, "");
    }

    #[test]
    fn whitespace_only_input_lands_in_eof() {
        let stream = tokenize("  \n\t\n");
        assert!(stream.is_empty());
        assert_eq!(stream.eof_token().prepend, "  \n\t\n");
        assert_eq!(stream.eof_token().line, 3);
    }

    #[test]
    fn words_with_trailing_whitespace() {
        assert_eq!(
            parts("Name:  foo\n"),
            vec![part("", "Name:", "  ", 1), part("", "foo", "\n", 1)]
        );
    }

    #[test]
    fn leading_whitespace_is_prepend() {
        assert_eq!(parts("\n\n  x"), vec![part("\n\n  ", "x", "", 3)]);
    }

    #[test]
    fn end_of_line_comment_is_appended() {
        assert_eq!(
            parts("foo # note\nbar"),
            vec![part("", "foo", " # note\n", 1), part("", "bar", "", 2)]
        );
    }

    #[test]
    fn comment_on_own_line_goes_to_next_token() {
        assert_eq!(
            parts("foo\n# note\nbar\n"),
            vec![part("", "foo", "\n", 1), part("# note\n", "bar", "\n", 3)]
        );
    }

    #[test]
    fn hash_directly_after_core_is_comment() {
        assert_eq!(parts("foo#bar\n"), vec![part("", "foo", "#bar\n", 1)]);
    }

    #[test]
    fn continuation_is_kept_and_counted() {
        let stream = tokenize("a \\\n b\nc");
        let t = stream.tokens();
        assert_eq!(t[0].append, " \\\n ");
        assert_eq!(t[1].line, 2);
        assert!(t[0].same_line(&t[1]));
        assert_eq!(t[2].line, 3);
        assert!(!t[1].same_line(&t[2]));
    }

    #[test]
    fn crlf_continuation_is_kept_and_counted() {
        let source = "a \\\r\n b\r\nc";
        let stream = tokenize(source);
        let t = stream.tokens();
        assert_eq!(t[0].append, " \\\r\n ");
        assert_eq!(t[1].line, 2);
        assert!(t[0].same_line(&t[1]));
        assert_eq!(t[2].line, 3);
        assert_eq!(reconstruct(source), source);
    }

    #[test]
    fn backslash_before_lone_carriage_return_is_core() {
        assert_eq!(parts("a\\\rb\n"), vec![part("", "a\\", "\r", 1), part("", "b", "\n", 1)]);
    }

    #[test]
    fn backslash_inside_word_is_core() {
        assert_eq!(parts("a\\b\n"), vec![part("", "a\\b", "\n", 1)]);
    }

    #[test]
    fn trailing_comment_lands_in_eof() {
        let stream = tokenize("x\n# end\n");
        assert_eq!(stream.len(), 1);
        assert_eq!(stream.eof_token().prepend, "# end\n");
    }

    #[test]
    fn reconstructs_source_exactly() {
        let sources = [
            "",
            "Name: foo\n",
            "no newline at end",
            "\r\nName:\tfoo\r\n",
            "%global x \\\n  y\n# c\n\n",
            "  # only a comment",
            "a\\",
            "a \\\n",
        ];
        for source in sources {
            assert_eq!(reconstruct(source), source, "round trip failed for {source:?}");
        }
    }

    #[test]
    fn fragment_keeps_trailing_whitespace() {
        let fragment = tokenize_fragment("make\n\n# done\n");
        assert_eq!(fragment.to_text(false), "make\n\n# done\n");
        assert!(fragment.eof_token().prepend.is_empty());
    }
}
