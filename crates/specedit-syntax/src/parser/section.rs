use crate::error::Result;
use crate::model::{PackageId, Section, SectionKind, Statement, StatementKind};
use crate::stream::TokenStream;

use super::{SectionParser, SpecParser};

/// A section whose body is kept as raw tokens.
pub struct OpaqueSectionParser {
    kind: SectionKind,
}

impl OpaqueSectionParser {
    pub fn new(kind: SectionKind) -> Self {
        Self { kind }
    }
}

impl SectionParser for OpaqueSectionParser {
    fn kind(&self) -> StatementKind {
        StatementKind::Section(self.kind)
    }

    fn recognizes(&self, stream: &TokenStream) -> bool {
        stream.touch().is(self.kind.keyword())
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
        let header = stream.get_rest_of_line(&keyword);
        let mut boundary = ctx.body_boundary();
        let body = stream.get_while_not(|s| boundary.reached(s, ctx));

        Ok(Some(Statement::Section(Section {
            kind: self.kind,
            keyword,
            header,
            body,
        })))
    }

    fn once_per_file(&self) -> bool {
        !self.kind.recurs_per_package()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse;
    use pretty_assertions::assert_eq;

    #[test]
    fn header_and_body_are_split() {
        let model = parse("%post -p /sbin/ldconfig\n\n%files devel\n%{_libdir}/*.so\n").unwrap();
        let sections: Vec<_> = model.statements().filter_map(Statement::as_section).collect();
        assert_eq!(sections[0].header.to_text(true), "-p /sbin/ldconfig");
        assert_eq!(sections[0].body_text(), "");
        assert_eq!(sections[0].qualifier(), None);
        assert_eq!(sections[1].qualifier(), Some("devel"));
        assert_eq!(sections[1].body_text(), "%{_libdir}/*.so\n");
    }

    #[test]
    fn body_runs_to_eof() {
        let model = parse("%install\nmake install DESTDIR=%{buildroot}\n\n").unwrap();
        let install = model.statements().next().and_then(Statement::as_section).unwrap();
        assert_eq!(install.body_text(), "make install DESTDIR=%{buildroot}\n\n");
    }
}
