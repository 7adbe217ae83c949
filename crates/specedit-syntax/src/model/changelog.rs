use chrono::NaiveDate;

use crate::stream::TokenStream;
use crate::token::Token;

/// Date format of a changelog entry header, e.g. `Mon Jan 01 2024`.
pub const CHANGELOG_DATE_FORMAT: &str = "%a %b %d %Y";

/// `%changelog` and its entries, newest first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Changelog {
    pub keyword: Token,
    pub entries: Vec<ChangelogEntry>,
}

impl Changelog {
    pub fn new(keyword: Token) -> Self {
        Self {
            keyword,
            entries: Vec::new(),
        }
    }

    /// Most recent entry, the first one in the file.
    pub fn newest(&self) -> Option<&ChangelogEntry> {
        self.entries.first()
    }

    /// Add an entry as the oldest.
    pub fn append_entry(&mut self, entry: ChangelogEntry) {
        self.entries.push(entry);
    }

    /// Add an entry as the newest, on the line after the keyword.
    pub fn insert_entry(&mut self, entry: ChangelogEntry) {
        self.keyword.end_line();
        self.entries.insert(0, entry);
    }

    pub fn last_token_mut(&mut self) -> &mut Token {
        match self.entries.last_mut() {
            Some(entry) => entry.last_token_mut(),
            None => &mut self.keyword,
        }
    }
}

/// One `* date user <email> - version` header plus its message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangelogEntry {
    pub star: Token,
    /// Weekday, month, day and year.
    pub date: Vec<Token>,
    /// `None` if the date tokens do not form a valid date.
    pub date_parsed: Option<NaiveDate>,
    pub user: Vec<Token>,
    pub email: Token,
    pub version_delim: Option<Token>,
    pub version: Option<Token>,
    pub message: TokenStream,
}

impl ChangelogEntry {
    /// Parse the four date tokens, `None` if they are not a valid date.
    pub fn parse_date(date: &[Token]) -> Option<NaiveDate> {
        let text = date.iter().map(Token::as_str).collect::<Vec<_>>().join(" ");
        NaiveDate::parse_from_str(&text, CHANGELOG_DATE_FORMAT).ok()
    }

    pub fn user_name(&self) -> String {
        self.user.iter().map(Token::as_str).collect::<Vec<_>>().join(" ")
    }

    /// The email without its angle brackets.
    pub fn email_address(&self) -> &str {
        let email = self.email.as_str();
        email
            .strip_prefix('<')
            .and_then(|e| e.strip_suffix('>'))
            .unwrap_or(email)
    }

    pub fn version_str(&self) -> Option<&str> {
        self.version.as_ref().map(Token::as_str)
    }

    pub fn message_text(&self) -> String {
        self.message.to_text(false)
    }

    pub fn last_token_mut(&mut self) -> &mut Token {
        self.message
            .tokens_mut()
            .last_mut()
            .or(self.version.as_mut())
            .or(self.version_delim.as_mut())
            .unwrap_or(&mut self.email)
    }

    /// All tokens in document order.
    pub fn tokens(&self) -> impl Iterator<Item = &Token> {
        std::iter::once(&self.star)
            .chain(self.date.iter())
            .chain(self.user.iter())
            .chain(std::iter::once(&self.email))
            .chain(self.version_delim.iter())
            .chain(self.version.iter())
            .chain(self.message.iter())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn words(text: &str) -> Vec<Token> {
        text.split(' ').map(|word| Token::word(word)).collect()
    }

    #[test]
    fn parses_valid_date() {
        assert_eq!(
            ChangelogEntry::parse_date(&words("Mon Jan 01 2024")),
            NaiveDate::from_ymd_opt(2024, 1, 1)
        );
    }

    #[test]
    fn rejects_mismatched_weekday() {
        assert_eq!(ChangelogEntry::parse_date(&words("Tue Jan 01 2024")), None);
    }

    #[test]
    fn rejects_garbage() {
        assert_eq!(ChangelogEntry::parse_date(&words("Xyz Foo 99 20x4")), None);
    }
}
