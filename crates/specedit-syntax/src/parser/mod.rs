//! # Parser - token stream to [`SpecModel`]
//!
//! Parsing is recursive descent over a [`TokenStream`], one [`SectionParser`]
//! per construct. A parser only ever looks at the lookahead to decide whether
//! it applies ([`SectionParser::recognizes`]) and then consumes exactly the
//! tokens of its construct.
//!
//! ## Driving the parse
//!
//! [`SpecParser`] runs two phases:
//!
//! 1. **Preamble**: definitions, `%if`, `%global` and `%define` until no
//!    preamble parser recognizes the lookahead.
//! 2. **Sections**: every registered parser is allowed. Sections that may
//!    appear only once per file (everything except `%description`, `%files`
//!    and `%package`) are retired after their first top-level match, so a
//!    second `%build` is left unparsed and reported as an unexpected token.
//!    Scriptlets qualified with a subpackage (`%post devel`) are tracked per
//!    qualifier; `%post -n devel` names a different package than `%post devel`.
//!
//! Anything left in the stream afterwards is a [`SpecError::BadToken`].
//!
//! ## Section boundaries
//!
//! Opaque bodies are captured verbatim until [`SpecParser::is_any_section_start`]
//! holds at the start of a logical line. Because the check runs on tokens,
//! `# %files later` inside a scriptlet is a comment attached to a token and
//! never ends the body.
//!
//! ## Custom handlers
//!
//! The registry is passed in explicitly ([`parse_with`]); replacing the
//! handler for one kind is a matter of [`ParserRegistry::register`].

mod changelog;
mod conditional;
mod definition;
mod macros;
mod package;
mod section;

pub use changelog::ChangelogParser;
pub use conditional::{ConditionalParser, IF_KEYWORDS};
pub use definition::{DefinitionParser, is_definition_keyword};
pub use macros::MacroParser;
pub use package::PackageParser;
pub use section::OpaqueSectionParser;

use std::cell::Cell;
use std::collections::HashSet;

use crate::error::{Result, SpecError};
use crate::model::{
    PackageId, Qualifier, SectionKind, SpecModel, Statement, StatementKind, peek_qualifier,
};
use crate::stream::TokenStream;
use crate::tokenizer::tokenize;

/// A parser for one kind of statement.
pub trait SectionParser {
    fn kind(&self) -> StatementKind;

    /// Whether the lookahead starts this construct. Must not consume.
    fn recognizes(&self, stream: &TokenStream) -> bool;

    /// Parse one statement; `Ok(None)` without consuming if not recognized.
    ///
    /// `parent` is the enclosing `%package`, `allowed` the parsers permitted
    /// for nested statements.
    fn parse(
        &self,
        stream: &mut TokenStream,
        parent: Option<PackageId>,
        allowed: &[&dyn SectionParser],
        ctx: &SpecParser<'_>,
    ) -> Result<Option<Statement>>;

    /// Whether this keyword ends an opaque section body.
    fn is_section_boundary(&self) -> bool {
        true
    }

    /// Whether this construct may start only one top-level statement.
    fn once_per_file(&self) -> bool {
        false
    }
}

/// The parsers used by [`SpecParser`], in matching order.
pub struct ParserRegistry {
    parsers: Vec<Box<dyn SectionParser>>,
}

impl Default for ParserRegistry {
    fn default() -> Self {
        let mut registry = Self::empty();
        registry.register(Box::new(ConditionalParser));
        registry.register(Box::new(DefinitionParser));
        registry.register(Box::new(MacroParser::global()));
        registry.register(Box::new(MacroParser::define()));
        for kind in SectionKind::ALL {
            registry.register(Box::new(OpaqueSectionParser::new(kind)));
        }
        registry.register(Box::new(PackageParser));
        registry.register(Box::new(ChangelogParser));
        registry
    }
}

impl ParserRegistry {
    pub fn empty() -> Self {
        Self {
            parsers: Vec::new(),
        }
    }

    /// Add a parser, replacing any registered for the same kind in place.
    pub fn register(&mut self, parser: Box<dyn SectionParser>) {
        let kind = parser.kind();
        match self.parsers.iter_mut().find(|p| p.kind() == kind) {
            Some(slot) => *slot = parser,
            None => self.parsers.push(parser),
        }
    }

    pub fn get(&self, kind: StatementKind) -> Option<&dyn SectionParser> {
        self.iter().find(|p| p.kind() == kind)
    }

    pub fn iter(&self) -> impl Iterator<Item = &dyn SectionParser> {
        self.parsers.iter().map(|p| p.as_ref() as &dyn SectionParser)
    }

    pub fn len(&self) -> usize {
        self.parsers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parsers.is_empty()
    }
}

/// Parse a spec file with the built-in parsers.
pub fn parse(text: &str) -> Result<SpecModel> {
    parse_with(text, &ParserRegistry::default())
}

/// Parse a spec file with an explicit set of parsers.
pub fn parse_with(text: &str, registry: &ParserRegistry) -> Result<SpecModel> {
    SpecParser::new(registry).parse(text)
}

/// Parse state shared by the section parsers.
pub struct SpecParser<'r> {
    registry: &'r ParserRegistry,
    next_package: Cell<u32>,
    nesting: Cell<usize>,
}

impl<'r> SpecParser<'r> {
    pub fn new(registry: &'r ParserRegistry) -> Self {
        Self {
            registry,
            next_package: Cell::new(0),
            nesting: Cell::new(0),
        }
    }

    pub fn registry(&self) -> &'r ParserRegistry {
        self.registry
    }

    pub fn parse(&self, text: &str) -> Result<SpecModel> {
        let mut stream = tokenize(text);
        let mut statements = self.parse_preamble(&mut stream)?;
        statements.extend(self.parse_sections(&mut stream)?);

        if !stream.is_exhausted() {
            return Err(SpecError::bad_token(
                stream.touch(),
                "no section may start here",
            ));
        }

        Ok(SpecModel::new(statements, stream.eof_token().clone()))
    }

    /// Registered parsers of the given kinds, in registry order.
    pub fn parsers_of(&self, kinds: &[StatementKind]) -> Vec<&'r dyn SectionParser> {
        self.registry
            .iter()
            .filter(|p| kinds.contains(&p.kind()))
            .collect()
    }

    /// Parse the preamble.
    ///
    /// A conditional that turns out to hold sections fails here with its
    /// cursor restored; the preamble ends before it and the section phase
    /// parses it again with every parser allowed.
    pub fn parse_preamble(&self, stream: &mut TokenStream) -> Result<Vec<Statement>> {
        let allowed = self.parsers_of(&StatementKind::PREAMBLE);
        let mut statements = Vec::new();
        while let Some(parser) = allowed.iter().find(|p| p.recognizes(stream)) {
            let start = stream.pointer();
            match self.parse_one(*parser, stream, None, &allowed) {
                Ok(Some(statement)) => statements.push(statement),
                Ok(None) => break,
                Err(SpecError::BadIf { line, .. }) if stream.pointer() == start => {
                    log::debug!("conditional on line {line} does not close in the preamble");
                    break;
                }
                Err(err) => return Err(err),
            }
        }
        Ok(statements)
    }

    pub fn parse_sections(&self, stream: &mut TokenStream) -> Result<Vec<Statement>> {
        let allowed: Vec<&dyn SectionParser> = self.registry.iter().collect();
        let mut consumed: HashSet<(StatementKind, Option<Qualifier>)> = HashSet::new();
        let mut statements = Vec::new();

        loop {
            let mut matched = None;
            for parser in &allowed {
                if !parser.recognizes(stream) {
                    continue;
                }
                let key = parser
                    .once_per_file()
                    .then(|| (parser.kind(), peek_qualifier(stream)));
                if key.as_ref().is_some_and(|key| consumed.contains(key)) {
                    log::debug!(
                        "{} on line {} was already consumed",
                        parser.kind(),
                        stream.touch().line
                    );
                    continue;
                }
                matched = Some((*parser, key));
                break;
            }
            let Some((parser, key)) = matched else {
                break;
            };

            let Some(statement) = self.parse_one(parser, stream, None, &allowed)? else {
                break;
            };
            if let Some(key) = key {
                log::debug!("retiring {} for the rest of the file", key.0);
                consumed.insert(key);
            }
            statements.push(statement);
        }

        Ok(statements)
    }

    /// Parse statements while any of `allowed` recognizes the lookahead.
    pub fn parse_loop(
        &self,
        stream: &mut TokenStream,
        parent: Option<PackageId>,
        allowed: &[&dyn SectionParser],
    ) -> Result<Vec<Statement>> {
        let mut statements = Vec::new();
        while let Some(parser) = allowed.iter().find(|p| p.recognizes(stream)) {
            match self.parse_one(*parser, stream, parent, allowed)? {
                Some(statement) => statements.push(statement),
                None => break,
            }
        }
        Ok(statements)
    }

    fn parse_one(
        &self,
        parser: &dyn SectionParser,
        stream: &mut TokenStream,
        parent: Option<PackageId>,
        allowed: &[&dyn SectionParser],
    ) -> Result<Option<Statement>> {
        let start = stream.pointer();
        log::debug!("parsing {} at line {}", parser.kind(), stream.touch().line);
        let statement = parser.parse(stream, parent, allowed, self)?;
        if statement.is_some() && stream.pointer() == start {
            return Err(SpecError::bad_token(
                stream.touch(),
                format!("parser for {} consumed nothing", parser.kind()),
            ));
        }
        Ok(statement)
    }

    /// Whether the lookahead is the keyword of any section boundary.
    pub fn is_any_section_start(&self, stream: &TokenStream) -> bool {
        self.registry
            .iter()
            .any(|p| p.is_section_boundary() && p.recognizes(stream))
    }

    /// Whether any registered parser recognizes the lookahead.
    pub fn is_keyword(&self, stream: &TokenStream) -> bool {
        self.registry.iter().any(|p| p.recognizes(stream))
    }

    /// Stop predicate for an opaque body starting at the current position.
    pub fn body_boundary(&self) -> BodyBoundary {
        BodyBoundary {
            nested: self.nesting.get() > 0,
            depth: 0,
        }
    }

    /// Run `f` with the parse marked as inside a conditional branch.
    pub fn nested<T>(&self, f: impl FnOnce() -> T) -> T {
        self.nesting.set(self.nesting.get() + 1);
        let out = f();
        self.nesting.set(self.nesting.get() - 1);
        out
    }

    pub(crate) fn allocate_package(&self) -> PackageId {
        let id = self.next_package.get();
        self.next_package.set(id + 1);
        PackageId::new(id)
    }
}

/// Decides where an opaque body ends.
///
/// A body ends at a section keyword that begins a new logical line. Inside a
/// conditional branch it also ends at the `%else` or `%endif` closing that
/// branch; conditionals opened within the body itself are balanced first.
pub struct BodyBoundary {
    nested: bool,
    depth: usize,
}

impl BodyBoundary {
    pub fn reached(&mut self, stream: &TokenStream, ctx: &SpecParser<'_>) -> bool {
        if !stream.at_line_start() {
            return false;
        }
        let token = stream.touch();
        if self.nested {
            if IF_KEYWORDS.iter().any(|k| token.is(k)) {
                self.depth += 1;
                return false;
            }
            if token.is("%endif") {
                if self.depth == 0 {
                    return true;
                }
                self.depth -= 1;
                return false;
            }
            if token.is("%else") && self.depth == 0 {
                return true;
            }
        }
        ctx.is_any_section_start(stream)
    }
}
