//! Statement and section kinds.
//!
//! Every parser and renderer is keyed by a [`StatementKind`]. The opaque body
//! sections share one [`Statement::Section`](super::Statement::Section)
//! variant and are told apart by their [`SectionKind`].

use std::fmt;

/// The opaque-body sections: parsed as a keyword, a header line and raw body tokens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum SectionKind {
    Description,
    Prep,
    Build,
    Clean,
    Install,
    Check,
    Post,
    Preun,
    Postun,
    Pre,
    Pretrans,
    Posttrans,
    Trigger,
    Triggerin,
    Triggerprein,
    Triggerun,
    Triggerpostun,
    Verifyscript,
    Files,
}

impl SectionKind {
    pub const ALL: [SectionKind; 19] = [
        SectionKind::Description,
        SectionKind::Prep,
        SectionKind::Build,
        SectionKind::Clean,
        SectionKind::Install,
        SectionKind::Check,
        SectionKind::Post,
        SectionKind::Preun,
        SectionKind::Postun,
        SectionKind::Pre,
        SectionKind::Pretrans,
        SectionKind::Posttrans,
        SectionKind::Trigger,
        SectionKind::Triggerin,
        SectionKind::Triggerprein,
        SectionKind::Triggerun,
        SectionKind::Triggerpostun,
        SectionKind::Verifyscript,
        SectionKind::Files,
    ];

    /// The `%keyword` that opens this section.
    pub fn keyword(self) -> &'static str {
        match self {
            SectionKind::Description => "%description",
            SectionKind::Prep => "%prep",
            SectionKind::Build => "%build",
            SectionKind::Clean => "%clean",
            SectionKind::Install => "%install",
            SectionKind::Check => "%check",
            SectionKind::Post => "%post",
            SectionKind::Preun => "%preun",
            SectionKind::Postun => "%postun",
            SectionKind::Pre => "%pre",
            SectionKind::Pretrans => "%pretrans",
            SectionKind::Posttrans => "%posttrans",
            SectionKind::Trigger => "%trigger",
            SectionKind::Triggerin => "%triggerin",
            SectionKind::Triggerprein => "%triggerprein",
            SectionKind::Triggerun => "%triggerun",
            SectionKind::Triggerpostun => "%triggerpostun",
            SectionKind::Verifyscript => "%verifyscript",
            SectionKind::Files => "%files",
        }
    }

    /// Look a section up by keyword, with or without the leading `%`.
    pub fn from_keyword(keyword: &str) -> Option<SectionKind> {
        let bare = keyword.strip_prefix('%').unwrap_or(keyword);
        SectionKind::ALL
            .into_iter()
            .find(|kind| &kind.keyword()[1..] == bare)
    }

    /// Sections that may appear once per package rather than once per file.
    pub fn recurs_per_package(self) -> bool {
        matches!(self, SectionKind::Description | SectionKind::Files)
    }
}

impl fmt::Display for SectionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.keyword())
    }
}

/// Discriminant of a [`Statement`](super::Statement).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StatementKind {
    Definition,
    Conditional,
    Global,
    Define,
    Section(SectionKind),
    Package,
    Changelog,
}

impl StatementKind {
    /// Kinds allowed in the preamble, before the first section keyword.
    pub const PREAMBLE: [StatementKind; 4] = [
        StatementKind::Conditional,
        StatementKind::Definition,
        StatementKind::Global,
        StatementKind::Define,
    ];

    /// Kinds allowed inside a `%package` block.
    pub const PACKAGE_BODY: [StatementKind; 2] =
        [StatementKind::Conditional, StatementKind::Definition];

    /// Look a kind up by its section keyword (`build`, `%changelog`, `package`).
    pub fn from_keyword(keyword: &str) -> Option<StatementKind> {
        match keyword.strip_prefix('%').unwrap_or(keyword) {
            "package" => Some(StatementKind::Package),
            "changelog" => Some(StatementKind::Changelog),
            _ => SectionKind::from_keyword(keyword).map(StatementKind::Section),
        }
    }
}

impl From<SectionKind> for StatementKind {
    fn from(kind: SectionKind) -> Self {
        StatementKind::Section(kind)
    }
}

impl fmt::Display for StatementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StatementKind::Definition => f.write_str("definition"),
            StatementKind::Conditional => f.write_str("%if"),
            StatementKind::Global => f.write_str("%global"),
            StatementKind::Define => f.write_str("%define"),
            StatementKind::Section(kind) => write!(f, "{kind}"),
            StatementKind::Package => f.write_str("%package"),
            StatementKind::Changelog => f.write_str("%changelog"),
        }
    }
}
