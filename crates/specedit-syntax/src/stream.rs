//! # TokenStream - a cursor over tokens
//!
//! The parser never indexes tokens directly; it works through a
//! [`TokenStream`] which keeps a `pointer` into an ordered token list:
//!
//! - Inspect: [`touch`](TokenStream::touch), [`previous`](TokenStream::previous)
//! - Consume: [`get`](TokenStream::get), [`get_line`](TokenStream::get_line),
//!   [`get_rest_of_line`](TokenStream::get_rest_of_line),
//!   [`get_while_not`](TokenStream::get_while_not)
//! - Backtrack: [`unget`](TokenStream::unget), [`pointer`](TokenStream::pointer),
//!   [`set_pointer`](TokenStream::set_pointer)
//!
//! Once exhausted, `get` and `touch` keep returning the stream's EOF token.
//! The EOF token is kept apart from the token list so that sub-streams cut out
//! of a document (a section body, a definition value) render without it.

use std::fmt;
use std::io;

use crate::error::{Result, SpecError};
use crate::token::Token;

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TokenStream {
    tokens: Vec<Token>,
    eof: Token,
    pointer: usize,
}

impl TokenStream {
    /// A stream over `tokens` terminated by `eof`.
    pub fn new(tokens: Vec<Token>, eof: Token) -> Self {
        Self {
            tokens,
            eof,
            pointer: 0,
        }
    }

    /// A stream cut out of a larger one; its EOF token carries no text.
    pub fn from_tokens(tokens: Vec<Token>) -> Self {
        let line = tokens.last().map(|t| t.line).unwrap_or(0);
        Self::new(tokens, Token::eof("", line))
    }

    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    pub fn tokens_mut(&mut self) -> &mut Vec<Token> {
        &mut self.tokens
    }

    pub fn into_tokens(self) -> Vec<Token> {
        self.tokens
    }

    pub fn eof_token(&self) -> &Token {
        &self.eof
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// True once every token has been consumed.
    pub fn is_exhausted(&self) -> bool {
        self.pointer >= self.tokens.len()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Token> {
        self.tokens.iter()
    }

    pub fn first(&self) -> Option<&Token> {
        self.tokens.first()
    }

    pub fn last(&self) -> Option<&Token> {
        self.tokens.last()
    }

    pub fn push(&mut self, token: Token) {
        self.tokens.push(token);
    }

    /// Token under the cursor; advances unless exhausted.
    pub fn get(&mut self) -> Token {
        match self.tokens.get(self.pointer) {
            Some(token) => {
                self.pointer += 1;
                token.clone()
            }
            None => self.eof.clone(),
        }
    }

    /// Token under the cursor without advancing.
    pub fn touch(&self) -> &Token {
        self.tokens.get(self.pointer).unwrap_or(&self.eof)
    }

    /// Last consumed token.
    pub fn previous(&self) -> Option<&Token> {
        self.pointer
            .checked_sub(1)
            .and_then(|idx| self.tokens.get(idx))
    }

    pub fn unget(&mut self) -> Result<()> {
        if self.pointer == 0 {
            return Err(SpecError::BadIndex(
                "cannot unget at the beginning of the token stream".to_string(),
            ));
        }
        self.pointer -= 1;
        Ok(())
    }

    pub fn pointer(&self) -> usize {
        self.pointer
    }

    pub fn set_pointer(&mut self, pointer: usize) -> Result<()> {
        if pointer > self.tokens.len() {
            return Err(SpecError::BadIndex(format!(
                "token stream pointer {pointer} out of bounds ({})",
                self.tokens.len()
            )));
        }
        self.pointer = pointer;
        Ok(())
    }

    /// Consume the current logical line.
    ///
    /// The first token is always taken; following tokens are taken while they
    /// continue the logical line of the token before them.
    pub fn get_line(&mut self) -> TokenStream {
        let mut line = Vec::new();
        if self.is_exhausted() {
            return TokenStream::from_tokens(line);
        }
        let first = self.get();
        let rest = self.get_rest_of_line(&first);
        line.push(first);
        line.extend(rest.into_tokens());
        TokenStream::from_tokens(line)
    }

    /// Consume the tokens that continue `anchor`'s logical line.
    pub fn get_rest_of_line(&mut self, anchor: &Token) -> TokenStream {
        let mut line: Vec<Token> = Vec::new();
        loop {
            let next = self.touch();
            if next.is_eof() {
                break;
            }
            let prev = line.last().unwrap_or(anchor);
            if !prev.same_line(next) {
                break;
            }
            line.push(self.get());
        }
        TokenStream::from_tokens(line)
    }

    /// Consume tokens until `stop` holds for the stream or EOF is reached.
    pub fn get_while_not<F>(&mut self, mut stop: F) -> TokenStream
    where
        F: FnMut(&TokenStream) -> bool,
    {
        let mut taken = Vec::new();
        while !self.touch().is_eof() {
            if stop(self) {
                break;
            }
            taken.push(self.get());
        }
        TokenStream::from_tokens(taken)
    }

    /// Whether the lookahead starts a new logical line.
    pub fn at_line_start(&self) -> bool {
        match self.previous() {
            Some(prev) => !prev.same_line(self.touch()),
            None => true,
        }
    }

    /// Full text of every token; `raw` joins bare values with single spaces.
    pub fn to_text(&self, raw: bool) -> String {
        if raw {
            return self
                .tokens
                .iter()
                .map(Token::as_str)
                .collect::<Vec<_>>()
                .join(" ");
        }
        let mut out = String::new();
        for token in &self.tokens {
            token.push_to(&mut out, false);
        }
        out
    }

    pub fn write(&self, sink: &mut dyn io::Write, raw: bool) -> io::Result<()> {
        sink.write_all(self.to_text(raw).as_bytes())
    }
}

impl fmt::Display for TokenStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_text(false))
    }
}

impl<'a> IntoIterator for &'a TokenStream {
    type Item = &'a Token;
    type IntoIter = std::slice::Iter<'a, Token>;

    fn into_iter(self) -> Self::IntoIter {
        self.tokens.iter()
    }
}
