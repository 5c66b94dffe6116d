use serde::{Deserialize, Serialize};

use crate::tokenizer::tokenize;

/// One corpus line: `<title>TAB<description>`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    pub title: String,
    pub description: String,
}

impl Record {
    pub fn new(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self { title: title.into(), description: description.into() }
    }

    /// Split a corpus line at its first TAB. A line without one becomes a
    /// record with an empty description.
    pub fn parse_line(line: &str) -> Self {
        let line = line.trim_end_matches(['\r', '\n']);
        match line.split_once('\t') {
            Some((title, description)) => Self::new(title, description),
            None => Self::new(line, ""),
        }
    }

    /// Tokens of the title followed by those of the description.
    pub fn tokens(&self) -> impl Iterator<Item = String> + '_ {
        tokenize(&self.title).chain(tokenize(&self.description))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_on_first_tab() {
        let r = Record::parse_line("Up\tan animated\tfilm\r\n");
        assert_eq!(r.title, "Up");
        assert_eq!(r.description, "an animated\tfilm");
    }

    #[test]
    fn missing_tab_gives_empty_description() {
        let r = Record::parse_line("Just a title");
        assert_eq!(r, Record::new("Just a title", ""));
    }

    #[test]
    fn tokens_cover_both_fields() {
        let r = Record::new("Short Film", "animated");
        let t: Vec<String> = r.tokens().collect();
        assert_eq!(t, ["short", "film", "animated"]);
    }
}
