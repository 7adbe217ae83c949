//! `Provides:`, `Requires:` and `BuildRequires:` across the main package
//! and its subpackages.

use std::collections::HashMap;
use std::fmt;
use std::io;

use specedit_syntax::{
    Definition, Package, PackageId, Result, SpecError, SpecModel, Statement, StatementId, Token,
};

use super::SpecEditor;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DependencyKind {
    Provides,
    Requires,
    BuildRequires,
}

impl DependencyKind {
    pub fn tag(self) -> &'static str {
        match self {
            DependencyKind::Provides => "Provides",
            DependencyKind::Requires => "Requires",
            DependencyKind::BuildRequires => "BuildRequires",
        }
    }

    /// True for `Tag:` and for parametrized forms such as `Requires(post):`.
    pub fn matches(self, definition: &Definition) -> bool {
        match definition.tag().strip_prefix(self.tag()) {
            Some(rest) => rest.is_empty() || (rest.starts_with('(') && rest.ends_with(')')),
            None => false,
        }
    }
}

impl fmt::Display for DependencyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// Which package a dependency operation applies to.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PackageSelector {
    /// The main package, written `-`.
    Main,
    /// Every package, written `*`.
    All,
    Named(String),
}

impl PackageSelector {
    pub const MAIN: &'static str = "-";
    pub const ALL: &'static str = "*";

    /// Does this selector pick the package called `name` (`None` = main)?
    pub fn selects(&self, name: Option<&str>) -> bool {
        match self {
            PackageSelector::Main => name.is_none(),
            PackageSelector::All => true,
            PackageSelector::Named(wanted) => name == Some(wanted.as_str()),
        }
    }
}

impl From<&str> for PackageSelector {
    fn from(text: &str) -> Self {
        match text {
            Self::MAIN => PackageSelector::Main,
            Self::ALL => PackageSelector::All,
            name => PackageSelector::Named(name.to_string()),
        }
    }
}

impl fmt::Display for PackageSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PackageSelector::Main => f.write_str(Self::MAIN),
            PackageSelector::All => f.write_str(Self::ALL),
            PackageSelector::Named(name) => f.write_str(name),
        }
    }
}

fn package_names(model: &SpecModel) -> HashMap<PackageId, Option<&str>> {
    model
        .packages()
        .into_iter()
        .map(|package| (package.id, package.name()))
        .collect()
}

/// Give `added` the blank lines that followed `last`, so the new line
/// joins the group `last` ends instead of the next one.
fn take_trailing_lines(last: &mut Token, added: &mut Definition) {
    match last.append.find('\n') {
        Some(newline) => {
            let rest = last.append.split_off(newline + 1);
            added.last_token_mut().append.push_str(&rest);
        }
        None => last.end_line(),
    }
}

/// A new definition of `kind`, aligned like `anchor` when it has the same tag.
fn new_definition(
    kind: DependencyKind,
    value: &str,
    package: Option<PackageId>,
    anchor: Option<&Definition>,
) -> Definition {
    let mut definition = Definition::new(&format!("{}:", kind.tag()), value, package);
    if let Some(anchor) = anchor
        && anchor.tag() == kind.tag()
        && !anchor.value.is_empty()
        && anchor.name.append.chars().all(|c| c == ' ' || c == '\t')
    {
        definition.name.append = anchor.name.append.clone();
    }
    definition
}

/// Index of the definition to insert after: the last one with the same tag,
/// else the last one.
fn anchor_index<'a>(
    definitions: impl DoubleEndedIterator<Item = (usize, &'a Definition)> + Clone,
    kind: DependencyKind,
) -> Option<usize> {
    definitions
        .clone()
        .rev()
        .find(|(_, d)| d.tag() == kind.tag())
        .or_else(|| definitions.rev().next())
        .map(|(i, _)| i)
}

fn add_to_main(model: &mut SpecModel, kind: DependencyKind, value: &str) {
    let top_level: Vec<(StatementId, &Definition)> = model
        .iter()
        .filter_map(|(id, s)| s.as_definition().map(|d| (id, d)))
        .collect();
    let anchor = anchor_index(top_level.iter().enumerate().map(|(i, (_, d))| (i, *d)), kind)
        .map(|i| top_level[i].0);

    let Some(anchor_id) = anchor else {
        model.insert(0, Statement::Definition(new_definition(kind, value, None, None)));
        return;
    };

    let position = model.position(anchor_id).unwrap_or(0);
    let Some(Statement::Definition(anchor)) = model.get_mut(anchor_id) else {
        return;
    };
    let mut definition = new_definition(kind, value, None, Some(&*anchor));
    take_trailing_lines(anchor.last_token_mut(), &mut definition);
    log::debug!("adding {kind}: {value} to the main package at index {}", position + 1);
    model.insert(position + 1, Statement::Definition(definition));
}

fn add_to_package(package: &mut Package, kind: DependencyKind, value: &str) {
    let id = package.id;
    let anchor = anchor_index(
        package
            .definitions
            .iter()
            .enumerate()
            .filter_map(|(i, s)| s.as_definition().map(|d| (i, d))),
        kind,
    );

    match anchor {
        Some(index) => {
            let Statement::Definition(anchor) = &mut package.definitions[index] else {
                return;
            };
            let mut definition = new_definition(kind, value, Some(id), Some(&*anchor));
            take_trailing_lines(anchor.last_token_mut(), &mut definition);
            package.definitions.insert(index + 1, Statement::Definition(definition));
        }
        None => {
            let mut definition = new_definition(kind, value, Some(id), None);
            let last = match package.header.tokens_mut().last_mut() {
                Some(token) => token,
                None => &mut package.keyword,
            };
            take_trailing_lines(last, &mut definition);
            package.definitions.push(Statement::Definition(definition));
        }
    }
    log::debug!(
        "adding {kind}: {value} to %package {}",
        package.name().unwrap_or(PackageSelector::MAIN)
    );
}

fn is_match(statement: &Statement, kind: DependencyKind, value: &str) -> bool {
    statement
        .as_definition()
        .is_some_and(|d| kind.matches(d) && d.value_raw() == value)
}

impl SpecEditor {
    /// Write `package:value` for each matching dependency, in document order.
    ///
    /// No selectors means every package.
    pub fn dependencies_show(
        &self,
        kind: DependencyKind,
        packages: &[PackageSelector],
        sink: &mut dyn io::Write,
    ) -> Result<()> {
        let model = self.model();
        let names = package_names(model);
        for definition in model.find_definitions_all() {
            if !kind.matches(definition) {
                continue;
            }
            let name = definition.package.and_then(|id| names.get(&id).copied().flatten());
            if !packages.is_empty() && !packages.iter().any(|s| s.selects(name)) {
                continue;
            }
            writeln!(
                sink,
                "{}:{}",
                name.unwrap_or(PackageSelector::MAIN),
                definition.value_raw()
            )?;
        }
        Ok(())
    }

    /// Add one definition per item to the selected package.
    pub fn dependencies_add(
        &mut self,
        kind: DependencyKind,
        items: &[(PackageSelector, String)],
    ) -> Result<()> {
        for (selector, value) in items {
            let mut matched = false;
            if selector.selects(None) {
                add_to_main(self.model_mut(), kind, value);
                matched = true;
            }
            for package in self.model_mut().packages_mut() {
                if package.name().is_some() && selector.selects(package.name()) {
                    add_to_package(package, kind, value);
                    matched = true;
                }
            }
            if !matched {
                return Err(SpecError::NotFound(format!("no %package {selector}")));
            }
        }
        Ok(())
    }

    /// Remove the definitions whose value equals each item; returns how many
    /// were removed.
    pub fn dependencies_remove(
        &mut self,
        kind: DependencyKind,
        items: &[(PackageSelector, String)],
    ) -> Result<usize> {
        let mut total = 0;
        for (selector, value) in items {
            let mut removed = 0;
            if selector.selects(None) {
                removed += self.model_mut().retain(|s| !is_match(s, kind, value));
            }
            for package in self.model_mut().packages_mut() {
                if package.name().is_some() && selector.selects(package.name()) {
                    let before = package.definitions.len();
                    package.definitions.retain(|s| !is_match(s, kind, value));
                    removed += before - package.definitions.len();
                }
            }
            if removed == 0 {
                return Err(SpecError::NotFound(format!(
                    "no {kind}: {value} in package {selector}"
                )));
            }
            log::info!("removed {removed} {kind}: {value}");
            total += removed;
        }
        Ok(total)
    }
}

macro_rules! dependency_accessors {
    ($($kind:ident: $show:ident, $add:ident, $remove:ident;)*) => {
        impl SpecEditor {
            $(
                pub fn $show(&self, packages: &[PackageSelector], sink: &mut dyn io::Write) -> Result<()> {
                    self.dependencies_show(DependencyKind::$kind, packages, sink)
                }

                pub fn $add(&mut self, items: &[(PackageSelector, String)]) -> Result<()> {
                    self.dependencies_add(DependencyKind::$kind, items)
                }

                pub fn $remove(&mut self, items: &[(PackageSelector, String)]) -> Result<usize> {
                    self.dependencies_remove(DependencyKind::$kind, items)
                }
            )*
        }
    };
}

dependency_accessors! {
    Provides: provides_show, provides_add, provides_remove;
    Requires: requires_show, requires_add, requires_remove;
    BuildRequires: buildrequires_show, buildrequires_add, buildrequires_remove;
}
