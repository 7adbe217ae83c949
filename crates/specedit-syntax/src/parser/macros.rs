use crate::error::{Result, SpecError};
use crate::model::{MacroDefinition, PackageId, Statement, StatementKind};
use crate::stream::TokenStream;

use super::{SectionParser, SpecParser};

/// `%global NAME value` and `%define NAME value`.
///
/// The value is the rest of the variable's logical line and is never expanded.
pub struct MacroParser {
    keyword: &'static str,
    kind: StatementKind,
}

impl MacroParser {
    pub fn global() -> Self {
        Self {
            keyword: "%global",
            kind: StatementKind::Global,
        }
    }

    pub fn define() -> Self {
        Self {
            keyword: "%define",
            kind: StatementKind::Define,
        }
    }
}

impl SectionParser for MacroParser {
    fn kind(&self) -> StatementKind {
        self.kind
    }

    fn recognizes(&self, stream: &TokenStream) -> bool {
        stream.touch().is(self.keyword)
    }

    fn parse(
        &self,
        stream: &mut TokenStream,
        _parent: Option<PackageId>,
        _allowed: &[&dyn SectionParser],
        ctx: &SpecParser<'_>,
    ) -> Result<Option<Statement>> {
        if !self.recognizes(stream) {
            return Ok(None);
        }

        let keyword = stream.get();
        if stream.touch().is_eof() {
            return Err(SpecError::bad_token(
                &keyword,
                format!("{} needs a variable name", self.keyword),
            ));
        }
        if ctx.is_keyword(stream) {
            return Err(SpecError::bad_token(
                stream.touch(),
                format!("keyword used as {} variable name", self.keyword),
            ));
        }
        let variable = stream.get();
        let value = stream.get_rest_of_line(&variable);

        let definition = MacroDefinition {
            keyword,
            variable,
            value,
        };
        Ok(Some(match self.kind {
            StatementKind::Define => Statement::Define(definition),
            _ => Statement::Global(definition),
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{parse, render_to_string};
    use pretty_assertions::assert_eq;

    #[test]
    fn global_with_continued_value() {
        let text = "%global flags -O2 \\\n    -g\n%define empty\nName: foo\n";
        let model = parse(text).unwrap();
        let mut statements = model.statements();
        let Some(Statement::Global(global)) = statements.next() else {
            panic!("expected %global");
        };
        assert_eq!(global.name(), "flags");
        assert_eq!(global.value.to_text(true), "-O2 -g");
        let Some(Statement::Define(define)) = statements.next() else {
            panic!("expected %define");
        };
        assert_eq!(define.name(), "empty");
        assert!(define.value.is_empty());
        assert_eq!(render_to_string(&model).unwrap(), text);
    }

    #[test]
    fn missing_variable_is_bad_token() {
        let err = parse("Name: foo\n%global").unwrap_err();
        assert_eq!(err.line(), Some(2));
    }

    #[test]
    fn keyword_as_variable_is_bad_token() {
        let err = parse("%global\n%build\nmake\n").unwrap_err();
        assert!(err.is_bad_token());
        assert_eq!(err.line(), Some(2));
    }
}
