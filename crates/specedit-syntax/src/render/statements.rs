use std::io;

use crate::error::{Result, SpecError};
use crate::model::{SectionKind, Statement, StatementKind};

use super::{RendererRegistry, StatementRenderer};

fn mismatch(renderer: &dyn StatementRenderer) -> SpecError {
    SpecError::MissingRenderer(renderer.kind())
}

pub struct DefinitionRenderer;

impl StatementRenderer for DefinitionRenderer {
    fn kind(&self) -> StatementKind {
        StatementKind::Definition
    }

    fn render(&self, statement: &Statement, sink: &mut dyn io::Write, _ctx: &RendererRegistry) -> Result<()> {
        let Statement::Definition(definition) = statement else {
            return Err(mismatch(self));
        };
        definition.name.write(sink, false)?;
        definition.value.write(sink, false)?;
        Ok(())
    }
}

pub struct ConditionalRenderer;

impl StatementRenderer for ConditionalRenderer {
    fn kind(&self) -> StatementKind {
        StatementKind::Conditional
    }

    fn render(&self, statement: &Statement, sink: &mut dyn io::Write, ctx: &RendererRegistry) -> Result<()> {
        let Statement::Conditional(conditional) = statement else {
            return Err(mismatch(self));
        };
        conditional.if_token.write(sink, false)?;
        conditional.expression.write(sink, false)?;
        ctx.render_statements(&conditional.true_branch, sink)?;
        if let Some(else_token) = &conditional.else_token {
            else_token.write(sink, false)?;
        }
        ctx.render_statements(&conditional.false_branch, sink)?;
        conditional.endif_token.write(sink, false)?;
        Ok(())
    }
}

/// `%global` or `%define`, depending on the kind it is created for.
pub struct MacroRenderer {
    kind: StatementKind,
}

impl MacroRenderer {
    pub fn new(kind: StatementKind) -> Self {
        Self { kind }
    }
}

impl StatementRenderer for MacroRenderer {
    fn kind(&self) -> StatementKind {
        self.kind
    }

    fn render(&self, statement: &Statement, sink: &mut dyn io::Write, _ctx: &RendererRegistry) -> Result<()> {
        let (Statement::Global(definition) | Statement::Define(definition)) = statement else {
            return Err(mismatch(self));
        };
        definition.keyword.write(sink, false)?;
        definition.variable.write(sink, false)?;
        definition.value.write(sink, false)?;
        Ok(())
    }
}

pub struct SectionRenderer {
    kind: SectionKind,
}

impl SectionRenderer {
    pub fn new(kind: SectionKind) -> Self {
        Self { kind }
    }
}

impl StatementRenderer for SectionRenderer {
    fn kind(&self) -> StatementKind {
        StatementKind::Section(self.kind)
    }

    fn render(&self, statement: &Statement, sink: &mut dyn io::Write, _ctx: &RendererRegistry) -> Result<()> {
        let Statement::Section(section) = statement else {
            return Err(mismatch(self));
        };
        section.keyword.write(sink, false)?;
        section.header.write(sink, false)?;
        section.body.write(sink, false)?;
        Ok(())
    }
}

pub struct PackageRenderer;

impl StatementRenderer for PackageRenderer {
    fn kind(&self) -> StatementKind {
        StatementKind::Package
    }

    fn render(&self, statement: &Statement, sink: &mut dyn io::Write, ctx: &RendererRegistry) -> Result<()> {
        let Statement::Package(package) = statement else {
            return Err(mismatch(self));
        };
        package.keyword.write(sink, false)?;
        package.header.write(sink, false)?;
        ctx.render_statements(&package.definitions, sink)
    }
}

pub struct ChangelogRenderer;

impl StatementRenderer for ChangelogRenderer {
    fn kind(&self) -> StatementKind {
        StatementKind::Changelog
    }

    fn render(&self, statement: &Statement, sink: &mut dyn io::Write, _ctx: &RendererRegistry) -> Result<()> {
        let Statement::Changelog(changelog) = statement else {
            return Err(mismatch(self));
        };
        changelog.keyword.write(sink, false)?;
        for entry in &changelog.entries {
            for token in entry.tokens() {
                token.write(sink, false)?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Definition;
    use crate::render::statement_to_string;

    #[test]
    fn renderer_rejects_other_variants() {
        let statement = Statement::Definition(Definition::new("Name:", "foo", None));
        let err = SectionRenderer::new(SectionKind::Build)
            .render(&statement, &mut Vec::new(), &RendererRegistry::default())
            .unwrap_err();
        assert!(matches!(err, SpecError::MissingRenderer(_)));
    }

    #[test]
    fn single_statement_to_string() {
        let statement = Statement::Definition(Definition::new("Requires:", "bar", None));
        assert_eq!(
            statement_to_string(&statement, &RendererRegistry::default()).unwrap(),
            "Requires: bar\n"
        );
    }
}
