//! # specedit-syntax
//!
//! A lossless parser and renderer for RPM spec files.
//!
//! ## What "lossless" means here
//!
//! Editing tools that rewrite a spec file should change only what they were
//! asked to change. Every byte of the original (whitespace, comments, blank
//! lines, `\`-continued lines) must come back out unchanged:
//!
//! ```text
//! render(parse(text)) == text
//! ```
//!
//! ## Architecture Overview
//!
//! ```text
//! Source Text → Tokenizer → TokenStream → Parsers → SpecModel → Renderers → Text
//!               (chars)                   (registry)            (registry)
//! ```
//!
//! ### 1. Tokenizer ([`tokenizer`] module)
//!
//! The tokenizer reads a [`SourceBuffer`] character by character and produces
//! [`Token`]s. Formatting is not a token of its own: whitespace and comments
//! are attached to a neighbouring token as *prepend* or *append* text.
//!
//! ```text
//! "Name:  foo # x\n" → [Token("Name:", append "  "), Token("foo", append " # x\n")]
//! ```
//!
//! ### 2. Parsers ([`parser`] module)
//!
//! A [`ParserRegistry`] holds one [`SectionParser`] per construct. The driver
//! parses a preamble of definitions, then sections, retiring section
//! keywords that may only appear once per file.
//!
//! ### 3. Model ([`model`] module)
//!
//! [`SpecModel`] is the ordered list of top-level [`Statement`]s. Opaque
//! section bodies (`%build`, `%files`, …) are kept as raw tokens; `%if`,
//! `%package` and `%changelog` have structure.
//!
//! ### 4. Renderers ([`render`] module)
//!
//! A [`RendererRegistry`] writes each statement's tokens back in parse order.
//!
//! ## Module Structure
//!
//! ```text
//! specedit-syntax/
//! ├── lib.rs          # This file - public API and round-trip tests
//! ├── error.rs        # SpecError
//! ├── source.rs       # SourceBuffer
//! ├── token.rs        # Token
//! ├── stream.rs       # TokenStream cursor
//! ├── tokenizer.rs    # chars → tokens
//! ├── model/          # Statement variants, SpecModel, section order
//! ├── parser/         # SectionParser trait, registry, one parser per construct
//! └── render/         # StatementRenderer trait, registry, one renderer per construct
//! ```
//!
//! ## Quick Start
//!
//! ```
//! use specedit_syntax::{SectionKind, parse, render_to_string};
//!
//! let text = "Name: foo\n\n%build\nmake  # parallel later\n";
//! let model = parse(text).unwrap();
//!
//! let build = model.find_section(SectionKind::Build.into());
//! assert_eq!(build[0].as_section().unwrap().body_text(), "make  # parallel later\n");
//!
//! // Nothing is lost on the way back out.
//! assert_eq!(render_to_string(&model).unwrap(), text);
//! ```

pub mod error;
pub mod model;
pub mod parser;
pub mod render;
pub mod source;
pub mod stream;
pub mod token;
pub mod tokenizer;

pub use error::{Result, SpecError};
pub use model::{
    CHANGELOG_DATE_FORMAT, Changelog, ChangelogEntry, Conditional, Definition, MacroDefinition, Package,
    PackageId, Qualifier, SPEC_SECTION_ORDER, Section, SectionKind, SpecModel, Statement, StatementId, StatementKind,
};
pub use parser::{ParserRegistry, SectionParser, SpecParser, parse, parse_with};
pub use render::{
    RendererRegistry, StatementRenderer, render, render_to_string, render_with, statement_to_string,
};
pub use source::SourceBuffer;
pub use stream::TokenStream;
pub use token::Token;
pub use tokenizer::{tokenize, tokenize_fragment};

#[cfg(test)]
mod tests {
    use super::*;
    use insta::assert_snapshot;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    /// One line per statement, nested statements indented.
    fn format_model(model: &SpecModel) -> String {
        let mut lines = Vec::new();
        for statement in model.statements() {
            format_statement(statement, 0, &mut lines);
        }
        lines.join("\n")
    }

    fn format_statement(statement: &Statement, indent: usize, lines: &mut Vec<String>) {
        let prefix = "  ".repeat(indent);
        match statement {
            Statement::Definition(d) => {
                lines.push(format!("{prefix}Definition {} {:?}", d.name, d.value_raw()));
            }
            Statement::Conditional(c) => {
                lines.push(format!("{prefix}{} {:?}", c.if_token, c.expression.to_text(true)));
                for child in &c.true_branch {
                    format_statement(child, indent + 1, lines);
                }
                if c.else_token.is_some() {
                    lines.push(format!("{prefix}%else"));
                }
                for child in &c.false_branch {
                    format_statement(child, indent + 1, lines);
                }
            }
            Statement::Global(m) | Statement::Define(m) => {
                lines.push(format!("{prefix}{} {} {:?}", m.keyword, m.name(), m.value.to_text(true)));
            }
            Statement::Section(s) => {
                lines.push(format!(
                    "{prefix}{} header={:?} body={:?}",
                    s.keyword,
                    s.header.to_text(true),
                    s.body_text()
                ));
            }
            Statement::Package(p) => {
                lines.push(format!("{prefix}%package {:?}", p.name()));
                for child in &p.definitions {
                    format_statement(child, indent + 1, lines);
                }
            }
            Statement::Changelog(c) => {
                lines.push(format!("{prefix}%changelog"));
                for entry in &c.entries {
                    let date = entry
                        .date_parsed
                        .map(|d| d.to_string())
                        .unwrap_or_else(|| "-".to_string());
                    lines.push(format!(
                        "{prefix}  * {date} {:?} {} {:?} {:?}",
                        entry.user_name(),
                        entry.email_address(),
                        entry.version_str(),
                        entry.message_text()
                    ));
                }
            }
        }
    }

    const SAMPLE: &str = "\
Name: foo
Version: 1.0
%description
Hello
%changelog
* Mon Jan 01 2024 A B <a@example.com> - 1.0-1
- initial
";

    #[test]
    fn sample_model() {
        let model = parse(SAMPLE).unwrap();
        assert_snapshot!(format_model(&model), @r#"
        Definition Name: "foo"
        Definition Version: "1.0"
        %description header="" body="Hello\n"
        %changelog
          * 2024-01-01 "A B" a@example.com Some("1.0-1") "- initial\n"
        "#);
        assert_eq!(render_to_string(&model).unwrap(), SAMPLE);

        let description = model.find_section(SectionKind::Description.into());
        assert_eq!(description.len(), 1);
        assert_eq!(description[0].as_section().unwrap().body_text(), "Hello\n");

        let changelog = model.find_section(StatementKind::Changelog);
        let entry = &changelog[0].as_changelog().unwrap().entries[0];
        assert_eq!(entry.date_parsed, chrono::NaiveDate::from_ymd_opt(2024, 1, 1));
        assert_eq!(entry.message_text(), "- initial\n");
    }

    #[test]
    fn structured_model() {
        let text = "\
%global commit abc123
Name: foo
%if 0%{?fedora}
Requires: systemd
%else
Requires: initscripts
%endif

%description
Foo.

%package devel
Requires: %{name} = %{version}

%prep
%autosetup

%files
%license COPYING
";
        let model = parse(text).unwrap();
        assert_snapshot!(format_model(&model), @r#"
        %global commit "abc123"
        Definition Name: "foo"
        %if "0%{?fedora}"
          Definition Requires: "systemd"
        %else
          Definition Requires: "initscripts"
        %description header="" body="Foo.\n\n"
        %package Some("devel")
          Definition Requires: "%{name} = %{version}"
        %prep header="" body="%autosetup\n\n"
        %files header="" body="%license COPYING\n"
        "#);
        assert_eq!(render_to_string(&model).unwrap(), text);
    }

    #[rstest]
    #[case::empty("")]
    #[case::only_comments("# a spec with nothing in it\n\n")]
    #[case::no_trailing_newline("Name: foo\n%build\nmake")]
    #[case::trailing_comment("Name: foo\n%files\n/a\n\n# end of file\n")]
    #[case::crlf("Name: foo\r\nVersion: 1\r\n%build\r\nmake\r\n")]
    #[case::tabs("Name:\tfoo\nSummary:\t\tA\tthing\n")]
    #[case::continuation("%global flags \\\n  -O2 \\\n  -g\nName: foo\n")]
    #[case::comment_before_section("Name: foo\n\n# build it\n%build\nmake\n")]
    #[case::numbered_sources("Source0: a.tar.gz\nSource1: b.tar.gz\nPatch7: fix.patch\n")]
    #[case::parametrized("Requires(post): systemd\nRequires(preun): systemd\n")]
    #[case::scriptlet_options("Name: foo\n%post -p /sbin/ldconfig\n%postun -p /sbin/ldconfig\n")]
    #[case::triggers("Name: foo\n%triggerin -- bash\necho\n%triggerun -- bash\necho\n")]
    #[case::conditional_package("Name: foo\n%if %{with doc}\n%package doc\nSummary: docs\n%endif\n")]
    fn round_trip(#[case] text: &str) {
        let model = parse(text).unwrap();
        assert_eq!(render_to_string(&model).unwrap(), text);
    }

    #[test]
    fn eof_token_is_rendered_last() {
        let model = parse("Name: foo\n\n# trailing\n").unwrap();
        assert_eq!(model.eof_token().prepend, "# trailing\n");
    }
}
