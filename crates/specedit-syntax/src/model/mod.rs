//! # Statement model
//!
//! A parsed spec file is a [`SpecModel`]: an ordered list of top-level
//! [`Statement`]s plus the document's EOF token. Statements own their tokens,
//! so rendering the model in order reproduces the source.
//!
//! Top-level statements are addressed by [`StatementId`], which stays stable
//! across inserts and removals. Definitions inside a `%package` point back at
//! their package through a [`PackageId`] instead of a reference.

mod changelog;
mod kind;
mod statement;

pub use changelog::{CHANGELOG_DATE_FORMAT, Changelog, ChangelogEntry};
pub use kind::{SectionKind, StatementKind};
pub use statement::{
    Conditional, Definition, MacroDefinition, Package, Qualifier, Section, Statement,
};

pub(crate) use statement::peek_qualifier;

use crate::error::{Result, SpecError};
use crate::token::Token;

/// Canonical order of sections, used to place a section that has no
/// existing instance to replace.
pub const SPEC_SECTION_ORDER: [StatementKind; 21] = [
    StatementKind::Section(SectionKind::Description),
    StatementKind::Package,
    StatementKind::Section(SectionKind::Prep),
    StatementKind::Section(SectionKind::Build),
    StatementKind::Section(SectionKind::Clean),
    StatementKind::Section(SectionKind::Install),
    StatementKind::Section(SectionKind::Check),
    StatementKind::Section(SectionKind::Post),
    StatementKind::Section(SectionKind::Preun),
    StatementKind::Section(SectionKind::Postun),
    StatementKind::Section(SectionKind::Pre),
    StatementKind::Section(SectionKind::Pretrans),
    StatementKind::Section(SectionKind::Posttrans),
    StatementKind::Section(SectionKind::Trigger),
    StatementKind::Section(SectionKind::Triggerin),
    StatementKind::Section(SectionKind::Triggerprein),
    StatementKind::Section(SectionKind::Triggerun),
    StatementKind::Section(SectionKind::Triggerpostun),
    StatementKind::Section(SectionKind::Verifyscript),
    StatementKind::Section(SectionKind::Files),
    StatementKind::Changelog,
];

/// Stable handle to a top-level statement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StatementId(u32);

/// Handle to a `%package` block, allocated in document order while parsing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PackageId(u32);

impl PackageId {
    pub(crate) fn new(index: u32) -> Self {
        Self(index)
    }

    pub fn index(self) -> u32 {
        self.0
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecModel {
    statements: Vec<(StatementId, Statement)>,
    eof: Token,
    next_id: u32,
}

impl Default for SpecModel {
    fn default() -> Self {
        Self::new(Vec::new(), Token::eof("", 1))
    }
}

impl SpecModel {
    pub fn new(statements: Vec<Statement>, eof: Token) -> Self {
        let mut model = Self {
            statements: Vec::with_capacity(statements.len()),
            eof,
            next_id: 0,
        };
        for statement in statements {
            model.push(statement);
        }
        model
    }

    pub fn len(&self) -> usize {
        self.statements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.statements.is_empty()
    }

    /// The document's EOF token; its prepend holds trailing whitespace and comments.
    pub fn eof_token(&self) -> &Token {
        &self.eof
    }

    pub fn statements(&self) -> impl Iterator<Item = &Statement> {
        self.statements.iter().map(|(_, statement)| statement)
    }

    pub fn statements_mut(&mut self) -> impl Iterator<Item = &mut Statement> {
        self.statements.iter_mut().map(|(_, statement)| statement)
    }

    pub fn iter(&self) -> impl Iterator<Item = (StatementId, &Statement)> {
        self.statements.iter().map(|(id, statement)| (*id, statement))
    }

    pub fn get(&self, id: StatementId) -> Option<&Statement> {
        self.position(id).map(|pos| &self.statements[pos].1)
    }

    pub fn get_mut(&mut self, id: StatementId) -> Option<&mut Statement> {
        self.position(id).map(|pos| &mut self.statements[pos].1)
    }

    /// Index of a statement in document order.
    pub fn position(&self, id: StatementId) -> Option<usize> {
        self.statements.iter().position(|(sid, _)| *sid == id)
    }

    pub fn push(&mut self, statement: Statement) -> StatementId {
        let index = self.statements.len();
        self.insert(index, statement)
    }

    /// Insert at a document position, clamped to the end.
    pub fn insert(&mut self, index: usize, statement: Statement) -> StatementId {
        let id = StatementId(self.next_id);
        self.next_id += 1;
        let index = index.min(self.statements.len());
        self.statements.insert(index, (id, statement));
        id
    }

    /// Top-level statements of `kind`, in document order.
    pub fn find_section(&self, kind: StatementKind) -> Vec<&Statement> {
        self.statements().filter(|s| s.kind() == kind).collect()
    }

    pub fn find_ids(&self, kind: StatementKind) -> Vec<StatementId> {
        self.iter()
            .filter(|(_, s)| s.kind() == kind)
            .map(|(id, _)| id)
            .collect()
    }

    /// Every definition in the file, including those under `%if` and in
    /// `%package` blocks, in document order.
    pub fn find_definitions_all(&self) -> Vec<&Definition> {
        let mut out = Vec::new();
        for statement in self.statements() {
            statement::collect_definitions(std::slice::from_ref(statement), &mut out);
        }
        out
    }

    /// Every `%package` block, including those under `%if`.
    pub fn packages(&self) -> Vec<&Package> {
        fn walk<'a>(statements: &'a [Statement], out: &mut Vec<&'a Package>) {
            for statement in statements {
                match statement {
                    Statement::Package(package) => out.push(package),
                    Statement::Conditional(conditional) => {
                        walk(&conditional.true_branch, out);
                        walk(&conditional.false_branch, out);
                    }
                    _ => {}
                }
            }
        }
        let mut out = Vec::new();
        for statement in self.statements() {
            walk(std::slice::from_ref(statement), &mut out);
        }
        out
    }

    pub fn packages_mut(&mut self) -> Vec<&mut Package> {
        fn walk<'a>(statement: &'a mut Statement, out: &mut Vec<&'a mut Package>) {
            match statement {
                Statement::Package(package) => out.push(package),
                Statement::Conditional(conditional) => {
                    let branches = conditional
                        .true_branch
                        .iter_mut()
                        .chain(conditional.false_branch.iter_mut());
                    for child in branches {
                        walk(child, out);
                    }
                }
                _ => {}
            }
        }
        let mut out = Vec::new();
        for statement in self.statements_mut() {
            walk(statement, &mut out);
        }
        out
    }

    pub fn package(&self, id: PackageId) -> Option<&Package> {
        self.packages().into_iter().find(|p| p.id == id)
    }

    /// Add a section, replacing an existing one of the same kind and qualifier.
    ///
    /// A new section goes after the last instance of its own kind if there is
    /// one. Otherwise [`SPEC_SECTION_ORDER`] is searched outward from its
    /// canonical index, earlier neighbour first; it is placed after the last
    /// instance of an earlier anchor or before the first instance of a later
    /// one.
    pub fn add(&mut self, mut statement: Statement) -> Result<StatementId> {
        let kind = statement.kind();
        if matches!(
            kind,
            StatementKind::Definition
                | StatementKind::Conditional
                | StatementKind::Global
                | StatementKind::Define
                | StatementKind::Package
        ) {
            return Err(SpecError::NotImplemented(format!("adding {kind} statements")));
        }

        statement.end_line();
        let qualifier = statement.qualifier_key();
        if let Some(pos) = self
            .statements
            .iter()
            .position(|(_, s)| s.kind() == kind && s.qualifier_key() == qualifier)
        {
            log::debug!("replacing {kind} at index {pos}");
            self.statements[pos].1 = statement;
            return Ok(self.statements[pos].0);
        }

        if let Some(last) = self.last_index_of(kind) {
            log::debug!("adding {kind} after its last instance at index {last}");
            return Ok(self.insert_line(last + 1, statement));
        }

        let Some(canonical) = SPEC_SECTION_ORDER.iter().position(|k| *k == kind) else {
            return Err(SpecError::NotImplemented(format!("adding {kind} statements")));
        };

        for distance in 1..SPEC_SECTION_ORDER.len() {
            if let Some(before) = canonical.checked_sub(distance) {
                let anchor = SPEC_SECTION_ORDER[before];
                if let Some(last) = self.last_index_of(anchor) {
                    log::debug!("adding {kind} after {anchor} at index {last}");
                    return Ok(self.insert_line(last + 1, statement));
                }
            }
            if let Some(&anchor) = SPEC_SECTION_ORDER.get(canonical + distance) {
                if let Some(first) = self.first_index_of(anchor) {
                    log::debug!("adding {kind} before {anchor} at index {first}");
                    return Ok(self.insert_line(first, statement));
                }
            }
        }

        Err(SpecError::NotFound(format!(
            "no existing section to place {kind} next to"
        )))
    }

    /// Insert a statement that ends its line, ending the line of the one
    /// before it too.
    fn insert_line(&mut self, index: usize, statement: Statement) -> StatementId {
        if let Some((_, before)) = index
            .checked_sub(1)
            .and_then(|i| self.statements.get_mut(i))
        {
            before.end_line();
        }
        self.insert(index, statement)
    }

    pub fn remove(&mut self, id: StatementId) -> Result<Statement> {
        let pos = self
            .position(id)
            .ok_or_else(|| SpecError::NotFound(format!("statement {id:?} is not in the model")))?;
        let (_, statement) = self.statements.remove(pos);
        log::debug!("removed {} at index {pos}", statement.kind());
        Ok(statement)
    }

    /// Keep only the top-level statements matching `keep`; returns how many
    /// were removed.
    pub fn retain<F>(&mut self, mut keep: F) -> usize
    where
        F: FnMut(&Statement) -> bool,
    {
        let before = self.statements.len();
        self.statements.retain(|(_, statement)| keep(statement));
        before - self.statements.len()
    }

    fn first_index_of(&self, kind: StatementKind) -> Option<usize> {
        self.statements.iter().position(|(_, s)| s.kind() == kind)
    }

    fn last_index_of(&self, kind: StatementKind) -> Option<usize> {
        self.statements.iter().rposition(|(_, s)| s.kind() == kind)
    }
}
