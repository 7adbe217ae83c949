use crate::stream::TokenStream;
use crate::token::Token;
use crate::tokenizer::tokenize_fragment;

use super::changelog::Changelog;
use super::kind::{SectionKind, StatementKind};
use super::PackageId;

/// Section and package options whose next token is an argument, not a name.
const OPTIONS_WITH_ARGUMENT: [&str; 4] = ["-p", "-f", "-l", "-P"];

/// A parsed top-level or nested construct.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Statement {
    Definition(Definition),
    Conditional(Conditional),
    Global(MacroDefinition),
    Define(MacroDefinition),
    Section(Section),
    Package(Package),
    Changelog(Changelog),
}

impl Statement {
    pub fn kind(&self) -> StatementKind {
        match self {
            Statement::Definition(_) => StatementKind::Definition,
            Statement::Conditional(_) => StatementKind::Conditional,
            Statement::Global(_) => StatementKind::Global,
            Statement::Define(_) => StatementKind::Define,
            Statement::Section(section) => StatementKind::Section(section.kind),
            Statement::Package(_) => StatementKind::Package,
            Statement::Changelog(_) => StatementKind::Changelog,
        }
    }

    /// Subpackage argument of a section or package, used to tell repeated
    /// instances of one kind apart.
    pub fn qualifier(&self) -> Option<&str> {
        match self {
            Statement::Section(section) => section.qualifier(),
            Statement::Package(package) => package.name(),
            _ => None,
        }
    }

    /// The last token this statement renders, the one carrying its line ending.
    pub fn last_token_mut(&mut self) -> &mut Token {
        match self {
            Statement::Definition(definition) => definition.last_token_mut(),
            Statement::Conditional(conditional) => &mut conditional.endif_token,
            Statement::Global(definition) | Statement::Define(definition) => {
                match definition.value.tokens_mut().last_mut() {
                    Some(token) => token,
                    None => &mut definition.variable,
                }
            }
            Statement::Section(section) => section.last_token_mut(),
            Statement::Package(package) => package.last_token_mut(),
            Statement::Changelog(changelog) => changelog.last_token_mut(),
        }
    }

    /// Make sure whatever follows this statement starts on a new line.
    pub fn end_line(&mut self) {
        self.last_token_mut().end_line();
    }

    /// The subpackage argument together with how it was written, so that
    /// `%files devel` and `%files -n devel` stay distinct.
    pub fn qualifier_key(&self) -> Option<Qualifier> {
        match self {
            Statement::Section(section) => Qualifier::from_header(section.header.tokens()),
            Statement::Package(package) => Qualifier::from_header(package.header.tokens()),
            _ => None,
        }
    }

    pub fn as_definition(&self) -> Option<&Definition> {
        match self {
            Statement::Definition(definition) => Some(definition),
            _ => None,
        }
    }

    pub fn as_section(&self) -> Option<&Section> {
        match self {
            Statement::Section(section) => Some(section),
            _ => None,
        }
    }

    pub fn as_section_mut(&mut self) -> Option<&mut Section> {
        match self {
            Statement::Section(section) => Some(section),
            _ => None,
        }
    }

    pub fn as_package(&self) -> Option<&Package> {
        match self {
            Statement::Package(package) => Some(package),
            _ => None,
        }
    }

    pub fn as_package_mut(&mut self) -> Option<&mut Package> {
        match self {
            Statement::Package(package) => Some(package),
            _ => None,
        }
    }

    pub fn as_changelog(&self) -> Option<&Changelog> {
        match self {
            Statement::Changelog(changelog) => Some(changelog),
            _ => None,
        }
    }

    pub fn as_changelog_mut(&mut self) -> Option<&mut Changelog> {
        match self {
            Statement::Changelog(changelog) => Some(changelog),
            _ => None,
        }
    }
}

/// Collect every definition under `statements`, descending into both branches
/// of conditionals and into package bodies, in document order.
pub(crate) fn collect_definitions<'a>(statements: &'a [Statement], out: &mut Vec<&'a Definition>) {
    for statement in statements {
        match statement {
            Statement::Definition(definition) => out.push(definition),
            Statement::Conditional(conditional) => {
                collect_definitions(&conditional.true_branch, out);
                collect_definitions(&conditional.false_branch, out);
            }
            Statement::Package(package) => collect_definitions(&package.definitions, out),
            _ => {}
        }
    }
}

/// Index of the token naming a subpackage in a section or package header.
///
/// `-n NAME` names the package directly; other options are skipped along
/// with their arguments. Everything after `--` is a trigger condition.
fn qualifier_index(header: &[Token]) -> Option<usize> {
    let mut i = 0;
    while let Some(token) = header.get(i) {
        let value = token.as_str();
        if value == "-n" {
            return (i + 1 < header.len()).then_some(i + 1);
        }
        if value == "--" {
            return None;
        }
        if value.starts_with('-') {
            i += if OPTIONS_WITH_ARGUMENT.contains(&value) { 2 } else { 1 };
            continue;
        }
        return Some(i);
    }
    None
}

/// A subpackage as named in a section or package header.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Qualifier {
    pub name: String,
    /// `-n NAME`: the full package name rather than a suffix of the main one.
    pub full_name: bool,
}

impl Qualifier {
    fn from_header(header: &[Token]) -> Option<Self> {
        qualifier_index(header).map(|i| Qualifier {
            name: header[i].as_str().to_string(),
            full_name: i > 0 && header[i - 1].is("-n"),
        })
    }
}

/// A `Tag: value` preamble line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Definition {
    /// The tag token including its colon, e.g. `Requires(post):`.
    pub name: Token,
    pub value: TokenStream,
    /// Enclosing `%package`, `None` for the main package.
    pub package: Option<PackageId>,
}

impl Definition {
    /// A new single-line definition, e.g. `Definition::new("Provides:", "foo")`.
    pub fn new(name: &str, value: &str, package: Option<PackageId>) -> Self {
        let (append, value) = if value.is_empty() {
            ("\n", TokenStream::default())
        } else {
            (" ", tokenize_fragment(&format!("{value}\n")))
        };
        Self {
            name: Token::create(name, "", append),
            value,
            package,
        }
    }

    /// Tag name without the trailing colon.
    pub fn tag(&self) -> &str {
        let name = self.name.as_str();
        name.strip_suffix(':').unwrap_or(name)
    }

    /// The value as bare words joined by single spaces.
    pub fn value_raw(&self) -> String {
        self.value.to_text(true)
    }

    /// The token carrying the line ending.
    pub fn last_token_mut(&mut self) -> &mut Token {
        match self.value.tokens_mut().last_mut() {
            Some(token) => token,
            None => &mut self.name,
        }
    }
}

/// `%if`/`%ifarch` with its branches, never evaluated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Conditional {
    pub if_token: Token,
    pub expression: TokenStream,
    pub true_branch: Vec<Statement>,
    pub else_token: Option<Token>,
    pub false_branch: Vec<Statement>,
    pub endif_token: Token,
}

/// `%global NAME value` or `%define NAME value`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MacroDefinition {
    pub keyword: Token,
    pub variable: Token,
    pub value: TokenStream,
}

impl MacroDefinition {
    pub fn name(&self) -> &str {
        self.variable.as_str()
    }
}

/// An opaque-body section such as `%build` or `%files devel`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Section {
    pub kind: SectionKind,
    pub keyword: Token,
    /// Tokens sharing the keyword's logical line.
    pub header: TokenStream,
    pub body: TokenStream,
}

impl Section {
    /// A section with no header; `body` is kept verbatim.
    pub fn new(kind: SectionKind, body: &str) -> Self {
        Self {
            kind,
            keyword: Token::create(kind.keyword(), "", "\n"),
            header: TokenStream::default(),
            body: tokenize_fragment(body),
        }
    }

    /// Subpackage argument, e.g. `devel` in `%files devel` or `foo` in
    /// `%description -n foo`.
    pub fn qualifier(&self) -> Option<&str> {
        let tokens = self.header.tokens();
        qualifier_index(tokens).map(|i| tokens[i].as_str())
    }

    /// Replace the body, keeping the keyword and header.
    pub fn set_body(&mut self, body: TokenStream) {
        self.body = body;
    }

    pub fn last_token_mut(&mut self) -> &mut Token {
        self.body
            .tokens_mut()
            .last_mut()
            .or(self.header.tokens_mut().last_mut())
            .unwrap_or(&mut self.keyword)
    }

    pub fn body_text(&self) -> String {
        self.body.to_text(false)
    }
}

/// Qualifier of the section header that starts at the lookahead, without
/// consuming anything.
pub(crate) fn peek_qualifier(stream: &mut TokenStream) -> Option<Qualifier> {
    let start = stream.pointer();
    let keyword = stream.get();
    let header = stream.get_rest_of_line(&keyword);
    // `start` came from this stream, so restoring it cannot fail.
    let _ = stream.set_pointer(start);
    Qualifier::from_header(header.tokens())
}

/// A `%package` block with its own preamble.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Package {
    pub keyword: Token,
    pub header: TokenStream,
    pub definitions: Vec<Statement>,
    pub id: PackageId,
}

impl Package {
    /// The token naming this subpackage; `None` for the main package.
    pub fn subpackage_name(&self) -> Option<&Token> {
        let tokens = self.header.tokens();
        qualifier_index(tokens).map(|i| &tokens[i])
    }

    pub fn name(&self) -> Option<&str> {
        self.subpackage_name().map(Token::as_str)
    }

    pub fn last_token_mut(&mut self) -> &mut Token {
        match self.definitions.last_mut() {
            Some(statement) => statement.last_token_mut(),
            None => self
                .header
                .tokens_mut()
                .last_mut()
                .unwrap_or(&mut self.keyword),
        }
    }

    /// Every definition in this package, including those under conditionals.
    pub fn definitions_all(&self) -> Vec<&Definition> {
        let mut out = Vec::new();
        collect_definitions(&self.definitions, &mut out);
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tokenize;
    use rstest::rstest;

    fn header(text: &str) -> TokenStream {
        tokenize(text)
    }

    #[rstest]
    #[case("devel\n", Some("devel"))]
    #[case("-n libfoo\n", Some("libfoo"))]
    #[case("-p /sbin/ldconfig\n", None)]
    #[case("-p /sbin/ldconfig devel\n", Some("devel"))]
    #[case("-f files.list devel\n", Some("devel"))]
    #[case("-- bash\n", None)]
    #[case("\n", None)]
    fn section_qualifier(#[case] text: &str, #[case] expected: Option<&str>) {
        let section = Section {
            kind: SectionKind::Files,
            keyword: Token::word("%files"),
            header: header(text),
            body: TokenStream::default(),
        };
        assert_eq!(section.qualifier(), expected);
    }

    #[test]
    fn new_definition_renders_one_line() {
        let definition = Definition::new("Provides:", "foo >= 1.0", None);
        let mut text = definition.name.to_text(false);
        text.push_str(&definition.value.to_text(false));
        assert_eq!(text, "Provides: foo >= 1.0\n");
        assert_eq!(definition.tag(), "Provides");
        assert_eq!(definition.value_raw(), "foo >= 1.0");
    }

    #[test]
    fn new_section_keeps_body() {
        let section = Section::new(SectionKind::Check, "make test\n\n");
        assert_eq!(section.body_text(), "make test\n\n");
        assert_eq!(section.qualifier(), None);
    }

    #[test]
    fn peek_qualifier_restores_pointer() {
        let mut stream = tokenize("%post devel\n/sbin/ldconfig\n");
        let qualifier = peek_qualifier(&mut stream).unwrap();
        assert_eq!(qualifier.name, "devel");
        assert!(!qualifier.full_name);
        assert_eq!(stream.pointer(), 0);
    }

    #[rstest]
    #[case("devel\n", Some(("devel", false)))]
    #[case("-n devel\n", Some(("devel", true)))]
    #[case("-f files.list -n devel\n", Some(("devel", true)))]
    #[case("\n", None)]
    fn qualifier_key_keeps_full_name_flag(
        #[case] text: &str,
        #[case] expected: Option<(&str, bool)>,
    ) {
        let section = Statement::Section(Section {
            kind: SectionKind::Files,
            keyword: Token::word("%files"),
            header: header(text),
            body: TokenStream::default(),
        });
        let key = section.qualifier_key();
        assert_eq!(
            key.as_ref().map(|q| (q.name.as_str(), q.full_name)),
            expected
        );
    }
}
