/*!
 * # Editing
 *
 * [`SpecEditor`] wraps a parsed [`SpecModel`] with the operations a packaging
 * tool needs: show a section, replace a section body, list and change
 * dependencies, add a changelog entry, add or remove whole sections.
 *
 * Every edit works on the model and leaves unrelated tokens untouched, so
 * rendering after an edit differs from the input only where the edit was.
 *
 * ## Module Structure
 *
 * ```text
 * editing/
 * ├── mod.rs           # SpecEditor, section show/edit, package and section add/remove
 * ├── dependencies.rs  # Provides/Requires/BuildRequires listing and editing
 * └── changelog.rs     # building and inserting changelog entries
 * ```
 */

mod changelog;
mod dependencies;

pub use changelog::NewChangelogEntry;
pub use dependencies::{DependencyKind, PackageSelector};

use std::io;

use specedit_syntax::{
    ParserRegistry, RendererRegistry, Result, SectionKind, SpecError, SpecModel, Statement,
    StatementId, StatementKind, parse, parse_with, tokenize_fragment,
};

/// A parsed spec file plus the renderers used to print it.
pub struct SpecEditor {
    model: SpecModel,
    renderers: RendererRegistry,
}

impl SpecEditor {
    pub fn new(model: SpecModel) -> Self {
        Self::with_renderers(model, RendererRegistry::default())
    }

    pub fn with_renderers(model: SpecModel, renderers: RendererRegistry) -> Self {
        Self { model, renderers }
    }

    pub fn from_text(text: &str) -> Result<Self> {
        Ok(Self::new(parse(text)?))
    }

    /// Parse with custom handlers, e.g. a parser for a vendor-specific section.
    pub fn from_text_with(
        text: &str,
        parsers: &ParserRegistry,
        renderers: RendererRegistry,
    ) -> Result<Self> {
        Ok(Self::with_renderers(parse_with(text, parsers)?, renderers))
    }

    pub fn model(&self) -> &SpecModel {
        &self.model
    }

    pub fn model_mut(&mut self) -> &mut SpecModel {
        &mut self.model
    }

    pub fn into_model(self) -> SpecModel {
        self.model
    }

    pub fn renderers(&self) -> &RendererRegistry {
        &self.renderers
    }

    pub fn render(&self, sink: &mut dyn io::Write) -> Result<()> {
        self.renderers.render_model(&self.model, sink)
    }

    pub fn to_text(&self) -> Result<String> {
        let mut out = Vec::new();
        self.render(&mut out)?;
        Ok(String::from_utf8_lossy(&out).into_owned())
    }

    /// Render every top-level instance of `kind`.
    pub fn section_show(&self, kind: StatementKind, sink: &mut dyn io::Write) -> Result<()> {
        let found = self.model.find_section(kind);
        if found.is_empty() {
            return Err(SpecError::NotFound(format!("no {kind} section")));
        }
        for statement in found {
            self.renderers.render_statement(statement, sink)?;
        }
        Ok(())
    }

    /// Replace the body of the only instance of `kind`.
    ///
    /// For an opaque section the keyword and header stay and everything after
    /// them becomes `replacement`. For `%changelog` the entries are replaced.
    pub fn section_edit(&mut self, kind: StatementKind, replacement: &str) -> Result<()> {
        let ids = self.model.find_ids(kind);
        let id = match ids.as_slice() {
            [] => return Err(SpecError::NotFound(format!("no {kind} section"))),
            [id] => *id,
            _ => {
                return Err(SpecError::NotImplemented(format!(
                    "editing one of {} {kind} sections; select a package",
                    ids.len()
                )));
            }
        };

        match kind {
            StatementKind::Section(_) => self.replace_body(id, replacement),
            StatementKind::Changelog => self.replace_changelog(id, replacement),
            _ => Err(SpecError::NotImplemented(format!("editing {kind}"))),
        }
    }

    /// Replace the body of the `kind` section belonging to `package`.
    ///
    /// `None` and `-` select the section without a package argument.
    pub fn section_edit_for(
        &mut self,
        kind: SectionKind,
        package: Option<&str>,
        replacement: &str,
    ) -> Result<()> {
        let package = package.filter(|p| *p != PackageSelector::MAIN);
        let ids: Vec<StatementId> = self
            .model
            .iter()
            .filter(|(_, s)| s.kind() == StatementKind::from(kind) && s.qualifier() == package)
            .map(|(id, _)| id)
            .collect();
        let described = match package {
            Some(name) => format!("{} {name}", kind.keyword()),
            None => kind.keyword().to_string(),
        };
        match ids.as_slice() {
            [] => Err(SpecError::NotFound(format!("no {described} section"))),
            [id] => self.replace_body(*id, replacement),
            _ => Err(SpecError::NotImplemented(format!(
                "editing one of {} {described} sections",
                ids.len()
            ))),
        }
    }

    pub fn description_edit(&mut self, replacement: &str, package: Option<&str>) -> Result<()> {
        self.section_edit_for(SectionKind::Description, package, replacement)
    }

    pub fn changelog_show(&self, sink: &mut dyn io::Write) -> Result<()> {
        self.section_show(StatementKind::Changelog, sink)
    }

    pub fn package_show(&self, sink: &mut dyn io::Write) -> Result<()> {
        self.section_show(StatementKind::Package, sink)
    }

    /// Parse `text` as spec sections and add each one to the model,
    /// replacing an existing section of the same kind and package.
    ///
    /// Either every section is added or the model is left as it was.
    pub fn sections_add(&mut self, text: &str) -> Result<Vec<StatementId>> {
        let fragment = parse(text)?;
        let mut model = self.model.clone();
        let mut added = Vec::new();
        for statement in fragment.statements() {
            added.push(model.add(statement.clone())?);
        }
        self.model = model;
        log::info!("added {} section(s)", added.len());
        Ok(added)
    }

    pub fn package_add(&mut self, names: &[&str]) -> Result<()> {
        Err(SpecError::NotImplemented(format!(
            "adding %package {}",
            names.join(" ")
        )))
    }

    /// Remove the top-level `%package` blocks that match any selector.
    pub fn package_remove(&mut self, selectors: &[PackageSelector]) -> Result<usize> {
        let removed = self.model.retain(|statement| match statement {
            Statement::Package(package) => !selectors.iter().any(|s| s.selects(package.name())),
            _ => true,
        });
        if removed == 0 {
            let names: Vec<String> = selectors.iter().map(ToString::to_string).collect();
            return Err(SpecError::NotFound(format!(
                "no %package matching {}",
                names.join(", ")
            )));
        }
        log::info!("removed {removed} %package block(s)");
        Ok(removed)
    }

    fn replace_body(&mut self, id: StatementId, replacement: &str) -> Result<()> {
        let section = self
            .model
            .get_mut(id)
            .and_then(Statement::as_section_mut)
            .ok_or_else(|| SpecError::NotFound(format!("statement {id:?} is not a section")))?;
        section.set_body(tokenize_fragment(replacement));
        section.last_token_mut().end_line();
        log::debug!("replaced body of {}", section.kind.keyword());
        Ok(())
    }

    fn replace_changelog(&mut self, id: StatementId, replacement: &str) -> Result<()> {
        let parsed = parse(&format!("{}\n{replacement}", StatementKind::Changelog))?;
        let trailing = parsed.eof_token().prepend.clone();
        let mut entries = parsed
            .statements()
            .find_map(Statement::as_changelog)
            .map(|changelog| changelog.entries.clone())
            .unwrap_or_default();
        if let Some(last) = entries.last_mut().and_then(|e| e.message.tokens_mut().last_mut()) {
            last.append.push_str(&trailing);
        }

        let changelog = self
            .model
            .get_mut(id)
            .and_then(Statement::as_changelog_mut)
            .ok_or_else(|| SpecError::NotFound(format!("statement {id:?} is not a changelog")))?;
        changelog.entries = entries;
        changelog.last_token_mut().end_line();
        Ok(())
    }
}

macro_rules! section_accessors {
    ($($kind:ident: $show:ident $(, $edit:ident)?;)*) => {
        impl SpecEditor {
            $(
                #[doc = concat!("Render every `", stringify!($kind), "` section.")]
                pub fn $show(&self, sink: &mut dyn io::Write) -> Result<()> {
                    self.section_show(SectionKind::$kind.into(), sink)
                }

                $(
                    #[doc = concat!("Replace the body of the only `", stringify!($kind), "` section.")]
                    pub fn $edit(&mut self, replacement: &str) -> Result<()> {
                        self.section_edit(SectionKind::$kind.into(), replacement)
                    }
                )?
            )*
        }
    };
}

section_accessors! {
    Description: description_show;
    Prep: prep_show, prep_edit;
    Build: build_show, build_edit;
    Clean: clean_show, clean_edit;
    Install: install_show, install_edit;
    Check: check_show, check_edit;
    Post: post_show, post_edit;
    Preun: preun_show, preun_edit;
    Postun: postun_show, postun_edit;
    Pre: pre_show, pre_edit;
    Pretrans: pretrans_show, pretrans_edit;
    Posttrans: posttrans_show, posttrans_edit;
    Trigger: trigger_show, trigger_edit;
    Triggerin: triggerin_show, triggerin_edit;
    Triggerprein: triggerprein_show, triggerprein_edit;
    Triggerun: triggerun_show, triggerun_edit;
    Triggerpostun: triggerpostun_show, triggerpostun_edit;
    Verifyscript: verifyscript_show, verifyscript_edit;
    Files: files_show, files_edit;
}
