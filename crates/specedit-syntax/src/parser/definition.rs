use std::sync::OnceLock;

use regex::Regex;

use crate::error::{Result, SpecError};
use crate::model::{Definition, PackageId, Statement, StatementKind};
use crate::stream::TokenStream;

use super::{SectionParser, SpecParser};

const DEFINITION_KEYWORDS: &[&str] = &[
    "Name:",
    "Version:",
    "Release:",
    "Epoch:",
    "Summary:",
    "License:",
    "Group:",
    "URL:",
    "Url:",
    "ExclusiveArch:",
    "ExcludeArch:",
    "ExclusiveOS:",
    "ExcludeOS:",
    "BuildArch:",
    "BuildArchitectures:",
    "BuildRoot:",
    "BuildRequires:",
    "BuildConflicts:",
    "Requires:",
    "Provides:",
    "Obsoletes:",
    "Conflicts:",
    "Recommends:",
    "Suggests:",
    "Supplements:",
    "Enhances:",
    "Source:",
    "Patch:",
    "NoSource:",
    "NoPatch:",
    "Vendor:",
    "Packager:",
    "Distribution:",
    "Prefix:",
    "AutoReq:",
    "AutoProv:",
    "AutoReqProv:",
];

fn parametrized_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^(BuildRequires|Requires|Provides)\([^)]*\):$")
            .expect("Invalid parametrized tag regex")
    })
}

fn numbered_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^(Source|Patch)[0-9]+:$").expect("Invalid numbered tag regex"))
}

/// Whether `word` is a preamble tag such as `Name:`, `Source1:` or `Requires(post):`.
pub fn is_definition_keyword(word: &str) -> bool {
    DEFINITION_KEYWORDS.contains(&word)
        || parametrized_regex().is_match(word)
        || numbered_regex().is_match(word)
}

/// `Tag: value` lines.
pub struct DefinitionParser;

impl SectionParser for DefinitionParser {
    fn kind(&self) -> StatementKind {
        StatementKind::Definition
    }

    fn recognizes(&self, stream: &TokenStream) -> bool {
        stream
            .touch()
            .value
            .as_deref()
            .is_some_and(is_definition_keyword)
    }

    fn parse(
        &self,
        stream: &mut TokenStream,
        parent: Option<PackageId>,
        _allowed: &[&dyn SectionParser],
        _ctx: &SpecParser<'_>,
    ) -> Result<Option<Statement>> {
        if !self.recognizes(stream) {
            return Ok(None);
        }

        let name = stream.get();
        if stream.touch().is_eof() {
            return Err(SpecError::bad_token(&name, "definition has no value"));
        }
        let value = stream.get_line();

        Ok(Some(Statement::Definition(Definition {
            name,
            value,
            package: parent,
        })))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse;
    use rstest::rstest;

    #[rstest]
    #[case("Name:", true)]
    #[case("Source0:", true)]
    #[case("Patch12:", true)]
    #[case("Requires(post):", true)]
    #[case("BuildRequires(pre,post):", true)]
    #[case("Source:", true)]
    #[case("SourceX:", false)]
    #[case("Name", false)]
    #[case("Conflicts(post):", false)]
    #[case("%build", false)]
    fn keyword_recognition(#[case] word: &str, #[case] expected: bool) {
        assert_eq!(is_definition_keyword(word), expected);
    }

    #[test]
    fn value_is_rest_of_logical_line() {
        let model = parse("Requires: foo >= 1.0, \\\n  bar\nName: x\n").unwrap();
        let definitions = model.find_definitions_all();
        assert_eq!(definitions[0].value_raw(), "foo >= 1.0, bar");
        assert_eq!(definitions[1].tag(), "Name");
    }

    #[test]
    fn missing_value_at_eof() {
        let err = parse("Name: foo\nVersion:").unwrap_err();
        assert!(err.is_bad_token());
        assert_eq!(err.line(), Some(2));
    }
}
