use crate::error::Result;
use crate::model::{Package, PackageId, Statement, StatementKind};
use crate::stream::TokenStream;

use super::{SectionParser, SpecParser};

/// `%package [-n] NAME` followed by the subpackage's own preamble.
pub struct PackageParser;

impl SectionParser for PackageParser {
    fn kind(&self) -> StatementKind {
        StatementKind::Package
    }

    fn recognizes(&self, stream: &TokenStream) -> bool {
        stream.touch().is("%package")
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
        let id = ctx.allocate_package();
        let allowed = ctx.parsers_of(&StatementKind::PACKAGE_BODY);
        let definitions = ctx.parse_loop(stream, Some(id), &allowed)?;

        Ok(Some(Statement::Package(Package {
            keyword,
            header,
            definitions,
            id,
        })))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{parse, render_to_string};
    use pretty_assertions::assert_eq;

    const SPEC: &str = "\
Name: foo

%package -n libfoo
Summary: Library
%if 0%{?fedora}
Requires: bar
%endif

%package devel
Summary: Headers

%description
Foo.
";

    #[test]
    fn packages_own_their_definitions() {
        let model = parse(SPEC).unwrap();
        let packages = model.packages();
        assert_eq!(packages.len(), 2);
        assert_eq!(packages[0].name(), Some("libfoo"));
        assert_eq!(packages[0].definitions_all().len(), 2);
        assert_eq!(packages[1].name(), Some("devel"));

        let requires = model
            .find_definitions_all()
            .into_iter()
            .find(|d| d.tag() == "Requires")
            .unwrap();
        assert_eq!(requires.package, Some(packages[0].id));
        assert_eq!(render_to_string(&model).unwrap(), SPEC);
    }

    #[test]
    fn package_without_name_is_main() {
        let model = parse("Name: foo\n%package\nSummary: x\n").unwrap();
        assert_eq!(model.packages()[0].subpackage_name(), None);
    }
}
