use crate::error::{Result, SpecError};
use crate::model::{Changelog, ChangelogEntry, PackageId, Statement, StatementKind};
use crate::stream::TokenStream;
use crate::token::Token;

use super::{SectionParser, SpecParser};

/// `%changelog` with its `* date user <email> - version` entries.
pub struct ChangelogParser;

impl ChangelogParser {
    fn parse_entry(&self, stream: &mut TokenStream, ctx: &SpecParser<'_>) -> Result<ChangelogEntry> {
        let star = stream.get();
        let mut header = stream.get_rest_of_line(&star).into_tokens().into_iter().peekable();

        let mut date = Vec::with_capacity(4);
        while date.len() < 4 {
            let Some(token) = header.next() else {
                let last = date.last().unwrap_or(&star);
                return Err(SpecError::bad_token(
                    last,
                    "changelog entry needs a weekday, month, day and year",
                ));
            };
            date.push(token);
        }
        let date_parsed = ChangelogEntry::parse_date(&date);
        if date_parsed.is_none() {
            let text: Vec<_> = date.iter().map(Token::as_str).collect();
            log::warn!(
                "line {}: cannot parse changelog date '{}'",
                star.line,
                text.join(" ")
            );
        }

        let mut user = Vec::new();
        let email = loop {
            match header.next() {
                Some(token) if token.as_str().starts_with('<') => break token,
                Some(token) => user.push(token),
                None => {
                    let last = user.last().or(date.last()).unwrap_or(&star);
                    return Err(SpecError::bad_token(last, "changelog entry has no <email>"));
                }
            }
        };

        let version_delim = header.next_if(|t| t.is("-"));
        let version = header.next();

        // Anything else on the header line leads the message.
        let mut message: Vec<Token> = header.collect();
        let mut boundary = ctx.body_boundary();
        let body = stream.get_while_not(|s| {
            (s.at_line_start() && s.touch().is("*")) || boundary.reached(s, ctx)
        });
        message.extend(body.into_tokens());

        Ok(ChangelogEntry {
            star,
            date,
            date_parsed,
            user,
            email,
            version_delim,
            version,
            message: TokenStream::from_tokens(message),
        })
    }
}

impl SectionParser for ChangelogParser {
    fn kind(&self) -> StatementKind {
        StatementKind::Changelog
    }

    fn recognizes(&self, stream: &TokenStream) -> bool {
        stream.touch().is("%changelog")
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

        let mut changelog = Changelog::new(stream.get());
        while stream.touch().is("*") {
            let entry = self.parse_entry(stream, ctx)?;
            changelog.append_entry(entry);
        }
        log::debug!("parsed {} changelog entries", changelog.entries.len());

        Ok(Some(Statement::Changelog(changelog)))
    }

    fn once_per_file(&self) -> bool {
        true
    }
}
