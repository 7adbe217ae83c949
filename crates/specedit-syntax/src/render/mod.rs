//! # Renderer - [`SpecModel`] back to text
//!
//! Rendering is the mirror of parsing: one [`StatementRenderer`] per
//! statement kind writes the tokens in the order the parser consumed them,
//! prepend and append included. After the last statement the document's EOF
//! prepend is written, so trailing blank lines and comments survive.
//!
//! Like the parsers, renderers live in an explicit [`RendererRegistry`].

mod statements;

pub use statements::{
    ChangelogRenderer, ConditionalRenderer, DefinitionRenderer, MacroRenderer, PackageRenderer,
    SectionRenderer,
};

use std::io;

use crate::error::{Result, SpecError};
use crate::model::{SectionKind, SpecModel, Statement, StatementKind};

/// Writes one kind of statement.
pub trait StatementRenderer {
    fn kind(&self) -> StatementKind;

    /// Write `statement`; `ctx` renders nested statements.
    fn render(
        &self,
        statement: &Statement,
        sink: &mut dyn io::Write,
        ctx: &RendererRegistry,
    ) -> Result<()>;
}

pub struct RendererRegistry {
    renderers: Vec<Box<dyn StatementRenderer>>,
}

impl Default for RendererRegistry {
    fn default() -> Self {
        let mut registry = Self::empty();
        registry.register(Box::new(DefinitionRenderer));
        registry.register(Box::new(ConditionalRenderer));
        registry.register(Box::new(MacroRenderer::new(StatementKind::Global)));
        registry.register(Box::new(MacroRenderer::new(StatementKind::Define)));
        for kind in SectionKind::ALL {
            registry.register(Box::new(SectionRenderer::new(kind)));
        }
        registry.register(Box::new(PackageRenderer));
        registry.register(Box::new(ChangelogRenderer));
        registry
    }
}

impl RendererRegistry {
    pub fn empty() -> Self {
        Self {
            renderers: Vec::new(),
        }
    }

    /// Add a renderer, replacing any registered for the same kind.
    pub fn register(&mut self, renderer: Box<dyn StatementRenderer>) {
        let kind = renderer.kind();
        match self.renderers.iter_mut().find(|r| r.kind() == kind) {
            Some(slot) => *slot = renderer,
            None => self.renderers.push(renderer),
        }
    }

    pub fn get(&self, kind: StatementKind) -> Option<&dyn StatementRenderer> {
        self.renderers
            .iter()
            .find(|r| r.kind() == kind)
            .map(|r| r.as_ref() as &dyn StatementRenderer)
    }

    /// Render one statement with the renderer registered for its kind.
    pub fn render_statement(&self, statement: &Statement, sink: &mut dyn io::Write) -> Result<()> {
        let kind = statement.kind();
        let renderer = self.get(kind).ok_or(SpecError::MissingRenderer(kind))?;
        renderer.render(statement, sink, self)
    }

    pub fn render_statements(&self, statements: &[Statement], sink: &mut dyn io::Write) -> Result<()> {
        for statement in statements {
            self.render_statement(statement, sink)?;
        }
        Ok(())
    }

    pub fn render_model(&self, model: &SpecModel, sink: &mut dyn io::Write) -> Result<()> {
        for statement in model.statements() {
            self.render_statement(statement, sink)?;
        }
        model.eof_token().write(sink, false)?;
        Ok(())
    }
}

/// Render a model with the built-in renderers.
pub fn render(model: &SpecModel, sink: &mut dyn io::Write) -> Result<()> {
    render_with(model, &RendererRegistry::default(), sink)
}

pub fn render_with(model: &SpecModel, registry: &RendererRegistry, sink: &mut dyn io::Write) -> Result<()> {
    registry.render_model(model, sink)
}

/// Render a model to a string with the built-in renderers.
pub fn render_to_string(model: &SpecModel) -> Result<String> {
    let mut out = Vec::new();
    render(model, &mut out)?;
    // Every token came from a `&str` or a `String`.
    Ok(String::from_utf8_lossy(&out).into_owned())
}

/// Render a single statement to a string.
pub fn statement_to_string(statement: &Statement, registry: &RendererRegistry) -> Result<String> {
    let mut out = Vec::new();
    registry.render_statement(statement, &mut out)?;
    Ok(String::from_utf8_lossy(&out).into_owned())
}
