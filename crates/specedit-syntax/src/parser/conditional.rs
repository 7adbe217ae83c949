use crate::error::{Result, SpecError};
use crate::model::{Conditional, PackageId, Statement, StatementKind};
use crate::stream::TokenStream;

use super::{SectionParser, SpecParser};

/// Keywords that open a conditional.
pub const IF_KEYWORDS: [&str; 5] = ["%if", "%ifarch", "%ifnarch", "%ifos", "%ifnos"];

/// `%if ... [%else ...] %endif`, parsed structurally.
pub struct ConditionalParser;

impl SectionParser for ConditionalParser {
    fn kind(&self) -> StatementKind {
        StatementKind::Conditional
    }

    fn recognizes(&self, stream: &TokenStream) -> bool {
        let token = stream.touch();
        IF_KEYWORDS.iter().any(|k| token.is(k))
    }

    fn parse(
        &self,
        stream: &mut TokenStream,
        parent: Option<PackageId>,
        allowed: &[&dyn SectionParser],
        ctx: &SpecParser<'_>,
    ) -> Result<Option<Statement>> {
        if !self.recognizes(stream) {
            return Ok(None);
        }

        let start = stream.pointer();
        let if_token = stream.get();
        let expression = stream.get_rest_of_line(&if_token);

        let branches = ctx.nested(|| -> Result<_> {
            let true_branch = ctx.parse_loop(stream, parent, allowed)?;
            let mut else_token = None;
            let mut false_branch = Vec::new();
            if stream.touch().is("%else") {
                else_token = Some(stream.get());
                false_branch = ctx.parse_loop(stream, parent, allowed)?;
            }
            Ok((true_branch, else_token, false_branch))
        });
        let (true_branch, else_token, false_branch) = match branches {
            Ok(branches) => branches,
            Err(err) => {
                stream.set_pointer(start)?;
                return Err(err);
            }
        };

        if !stream.touch().is("%endif") {
            let found = stream.touch().to_string();
            stream.set_pointer(start)?;
            return Err(SpecError::BadIf {
                line: if_token.line,
                message: format!("expected %endif, found '{found}'"),
            });
        }
        let endif_token = stream.get();

        Ok(Some(Statement::Conditional(Conditional {
            if_token,
            expression,
            true_branch,
            else_token,
            false_branch,
            endif_token,
        })))
    }

    fn is_section_boundary(&self) -> bool {
        false
    }
}
