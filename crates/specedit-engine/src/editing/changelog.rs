use chrono::NaiveDate;
use specedit_syntax::{
    CHANGELOG_DATE_FORMAT, ChangelogEntry, Result, SpecError, Statement, StatementKind, Token,
    tokenize_fragment,
};

use super::SpecEditor;

/// What a packager supplies for a new changelog entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewChangelogEntry {
    pub date: NaiveDate,
    pub user: String,
    pub email: String,
    /// `None` reuses the version of the newest existing entry.
    pub version: Option<String>,
    pub message: String,
}

impl NewChangelogEntry {
    fn into_entry(self, version: String, separated: bool) -> ChangelogEntry {
        let date = self
            .date
            .format(CHANGELOG_DATE_FORMAT)
            .to_string()
            .split(' ')
            .map(|word| Token::word(word))
            .collect();

        let mut message = message_lines(&self.message);
        if separated {
            message.push('\n');
        }

        ChangelogEntry {
            star: Token::word("*"),
            date,
            date_parsed: Some(self.date),
            user: self.user.split_whitespace().map(|word| Token::word(word)).collect(),
            email: Token::word(format!("<{}>", self.email)),
            version_delim: Some(Token::word("-")),
            version: Some(Token::create(version, "", "\n")),
            message: tokenize_fragment(&message),
        }
    }
}

/// Each line of `message` as a `- ` bullet, unless it already is one.
fn message_lines(message: &str) -> String {
    let mut out = String::new();
    for line in message.lines() {
        if line.starts_with('-') {
            out.push_str(line);
        } else {
            out.push_str("- ");
            out.push_str(line);
        }
        out.push('\n');
    }
    if out.is_empty() {
        out.push_str("-\n");
    }
    out
}

impl SpecEditor {
    /// Add `entry` as the newest changelog entry.
    pub fn changelog_add(&mut self, entry: NewChangelogEntry) -> Result<()> {
        let ids = self.model().find_ids(StatementKind::Changelog);
        let id = match ids.as_slice() {
            [] => return Err(SpecError::NotFound("no %changelog section".to_string())),
            [id] => *id,
            _ => {
                return Err(SpecError::NotImplemented(format!(
                    "adding to one of {} %changelog sections",
                    ids.len()
                )));
            }
        };

        let Some(Statement::Changelog(changelog)) = self.model_mut().get_mut(id) else {
            return Err(SpecError::NotFound("no %changelog section".to_string()));
        };

        let version = match (&entry.version, changelog.newest().and_then(|e| e.version_str())) {
            (Some(version), _) => version.clone(),
            (None, Some(newest)) => newest.to_string(),
            (None, None) => {
                return Err(SpecError::NotFound(
                    "no version given and no changelog entry to take it from".to_string(),
                ));
            }
        };

        log::info!("adding changelog entry for {version}");
        let separated = !changelog.entries.is_empty();
        changelog.insert_entry(entry.into_entry(version, separated));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tests::{MULTI_PACKAGE_SPEC, SAMPLE_SPEC};
    use pretty_assertions::assert_eq;

    fn entry_text(entry: &ChangelogEntry) -> String {
        entry.tokens().map(|token| token.to_text(false)).collect()
    }

    fn new_entry(version: Option<&str>, message: &str) -> NewChangelogEntry {
        NewChangelogEntry {
            date: NaiveDate::from_ymd_opt(2024, 3, 4).unwrap(),
            user: "Jane Doe".to_string(),
            email: "jane@example.com".to_string(),
            version: version.map(str::to_owned),
            message: message.to_string(),
        }
    }

    #[test]
    fn test_message_lines_adds_bullets() {
        assert_eq!(message_lines("Fix build"), "- Fix build\n");
        assert_eq!(message_lines("- already\nsecond"), "- already\n- second\n");
        assert_eq!(message_lines(""), "-\n");
    }

    #[test]
    fn test_new_entry_renders_header_and_message() {
        let entry = new_entry(None, "Fix build").into_entry("1.0-2".to_string(), false);

        assert_eq!(
            entry_text(&entry),
            "* Mon Mar 04 2024 Jane Doe <jane@example.com> - 1.0-2\n- Fix build\n"
        );
    }

    #[test]
    fn test_changelog_add_reuses_newest_version() {
        // Given a changelog whose newest entry is 2.0-1
        let mut editor = SpecEditor::from_text(MULTI_PACKAGE_SPEC).unwrap();

        // When adding an entry without a version
        editor.changelog_add(new_entry(None, "Rebuild")).unwrap();

        // Then it is inserted first, with that version and a blank line after it
        let expected = MULTI_PACKAGE_SPEC.replace(
            "%changelog\n",
            "%changelog\n* Mon Mar 04 2024 Jane Doe <jane@example.com> - 2.0-1\n- Rebuild\n\n",
        );
        assert_eq!(editor.to_text().unwrap(), expected);
    }

    #[test]
    fn test_changelog_add_with_explicit_version() {
        let mut editor = SpecEditor::from_text(SAMPLE_SPEC).unwrap();

        editor.changelog_add(new_entry(Some("1.1-1"), "Update")).unwrap();

        let model = editor.model();
        let changelog = model.find_section(StatementKind::Changelog)[0]
            .as_changelog()
            .unwrap();
        let versions: Vec<_> = changelog.entries.iter().map(|e| e.version_str()).collect();
        assert_eq!(versions, vec![Some("1.1-1"), Some("1.0-1")]);
        assert_eq!(
            changelog.entries[0].date_parsed,
            NaiveDate::from_ymd_opt(2024, 3, 4)
        );
    }

    #[test]
    fn test_changelog_add_result_parses_back() {
        let mut editor = SpecEditor::from_text(SAMPLE_SPEC).unwrap();
        editor.changelog_add(new_entry(None, "Rebuild")).unwrap();
        let text = editor.to_text().unwrap();

        let reparsed = SpecEditor::from_text(&text).unwrap();

        assert_eq!(reparsed.to_text().unwrap(), text);
        let changelog = reparsed.model().find_section(StatementKind::Changelog)[0]
            .as_changelog()
            .unwrap();
        assert_eq!(changelog.entries.len(), 2);
        assert_eq!(changelog.entries[0].user_name(), "Jane Doe");
        assert_eq!(changelog.entries[0].email_address(), "jane@example.com");
    }

    #[test]
    fn test_changelog_add_to_empty_changelog_needs_version() {
        let mut editor = SpecEditor::from_text("Name: foo\n%description\nx\n%changelog\n").unwrap();

        let result = editor.changelog_add(new_entry(None, "Initial"));

        assert!(matches!(result, Err(SpecError::NotFound(_))));
    }

    #[test]
    fn test_changelog_add_to_empty_changelog_has_no_separator() {
        let mut editor = SpecEditor::from_text("Name: foo\n%description\nx\n%changelog\n").unwrap();

        editor.changelog_add(new_entry(Some("1.0-1"), "Initial")).unwrap();

        assert_eq!(
            editor.to_text().unwrap(),
            "Name: foo\n%description\nx\n%changelog\n* Mon Mar 04 2024 Jane Doe <jane@example.com> - 1.0-1\n- Initial\n"
        );
    }

    #[test]
    fn test_changelog_add_after_unterminated_keyword() {
        // Given %changelog as the last line, without a newline
        let mut editor = SpecEditor::from_text("Name: foo\n%changelog").unwrap();

        // When adding the first entry
        editor.changelog_add(new_entry(Some("1.0-1"), "init")).unwrap();

        // Then the entry starts on the next line and the result parses back
        let text = editor.to_text().unwrap();
        assert_eq!(
            text,
            "Name: foo\n%changelog\n* Mon Mar 04 2024 Jane Doe <jane@example.com> - 1.0-1\n- init\n"
        );
        let reparsed = SpecEditor::from_text(&text).unwrap();
        let changelog = reparsed.model().find_section(StatementKind::Changelog)[0]
            .as_changelog()
            .unwrap();
        assert_eq!(changelog.entries.len(), 1);
    }

    #[test]
    fn test_changelog_add_without_changelog_is_not_found() {
        let mut editor = SpecEditor::from_text("Name: foo\n%description\nx\n").unwrap();

        let result = editor.changelog_add(new_entry(Some("1.0-1"), "Initial"));

        assert!(matches!(result, Err(SpecError::NotFound(_))));
    }
}
