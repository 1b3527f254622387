//! Match targets.
//!
//! A [`Target`] is a line of text prepared for matching:
//!
//! ```text
//! raw_text         "I'm tired today! :)"
//! raw_words        ["I'm", "tired", "today!", ":)"]
//! substitutions    [["i am"], ["tired"], ["today!"], [":)"]]      (example)
//! tokenized_words  [["i", "am"], ["tired"], ["today"], []]
//! normalized       "i am tired today"
//! ```
//!
//! `tokenized_words` always has one entry per raw word, which is what lets a
//! capture in `normalized` be mapped back to the raw words it came from.
//! Tokens that end up empty after stripping non-alphanumerics are dropped, so
//! punctuation-only words (like `:)` above) leave an empty entry and add
//! nothing to `normalized`.

use log::debug;

use crate::error::{Error, Result};
use crate::script::Substitution;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Target {
    pub raw_text: String,
    pub raw_words: Vec<String>,
    pub tokenized_words: Vec<Vec<String>>,
    pub normalized: String,
}

impl Target {
    /// Build a target, running `substitutions` in order before tokenizing.
    ///
    /// Fails if a substitution changes the number of outer word lists.
    pub fn new(text: &str, substitutions: &[Substitution]) -> Result<Self> {
        let raw_words = split_on_whitespace(text);
        let mut lists: Vec<Vec<String>> = raw_words.iter().map(|w| vec![w.clone()]).collect();
        let expected = lists.len();

        for sub in substitutions {
            lists = (sub.apply)(text, lists);
            debug!("[target] {} returned {:?}", sub.name, lists);
            if lists.len() != expected {
                return Err(Error::Substitution { name: sub.name.clone(), expected, found: lists.len() });
            }
        }

        Ok(Self::from_word_lists(text, raw_words, &lists))
    }

    /// Build a target with no substitutions.
    pub fn plain(text: &str) -> Self {
        let raw_words = split_on_whitespace(text);
        let lists: Vec<Vec<String>> = raw_words.iter().map(|w| vec![w.clone()]).collect();
        Self::from_word_lists(text, raw_words, &lists)
    }

    fn from_word_lists(text: &str, raw_words: Vec<String>, lists: &[Vec<String>]) -> Self {
        let tokenized_words: Vec<Vec<String>> = lists
            .iter()
            .map(|list| {
                list.iter()
                    .flat_map(|chunk| chunk.split_whitespace())
                    .map(|word| kill_non_alphanumerics(&word.to_lowercase()))
                    .filter(|word| !word.is_empty())
                    .collect()
            })
            .collect();

        let normalized =
            tokenized_words.iter().filter(|list| !list.is_empty()).map(|list| list.join(" ")).collect::<Vec<_>>().join(" ");
        debug!("[target] normalized \"{}\" to \"{}\"", text, normalized);

        Target { raw_text: text.to_string(), raw_words, tokenized_words, normalized }
    }

    /// Byte offset in `normalized` where each raw word's tokens start.
    ///
    /// Raw words that produced no tokens get the offset of whatever follows.
    pub fn word_offsets(&self) -> Vec<usize> {
        let mut offsets = Vec::with_capacity(self.tokenized_words.len());
        let mut offset = 0;
        for list in &self.tokenized_words {
            offsets.push(offset);
            if !list.is_empty() {
                offset += list.join(" ").len() + 1;
            }
        }
        offsets
    }

    /// The raw words covering the normalized byte span `[start, end)`, joined by spaces.
    pub fn raw_span(&self, start: usize, end: usize) -> String {
        let offsets = self.word_offsets();
        let mut first = offsets.partition_point(|&o| o < start);
        let last = offsets.partition_point(|&o| o <= end);
        while first < last && self.tokenized_words[first].is_empty() {
            first += 1;
        }
        if first >= last {
            return String::new();
        }
        self.raw_words[first..last].join(" ")
    }
}

/// Split text into words on whitespace.
pub fn split_on_whitespace(text: &str) -> Vec<String> {
    text.split_whitespace().map(str::to_string).collect()
}

/// Drop everything that isn't a letter, digit or underscore.
pub fn kill_non_alphanumerics(text: &str) -> String {
    regex!(r"\w+").find_iter(text).map(|m| m.as_str()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sub(name: &str, f: impl Fn(&str, Vec<Vec<String>>) -> Vec<Vec<String>> + Send + Sync + 'static) -> Substitution {
        Substitution::new(name, f)
    }

    #[test]
    fn normalizes_case_and_punctuation() {
        let t = Target::plain("I'm tired today!");
        assert_eq!(t.raw_words, vec!["I'm", "tired", "today!"]);
        assert_eq!(t.tokenized_words, vec![vec!["im"], vec!["tired"], vec!["today"]]);
        assert_eq!(t.normalized, "im tired today");
    }

    #[test]
    fn punctuation_only_words_leave_empty_entries() {
        let t = Target::plain("Wazzup! :)");
        assert_eq!(t.tokenized_words.len(), 2);
        assert!(t.tokenized_words[1].is_empty());
        assert_eq!(t.normalized, "wazzup");
    }

    #[test]
    fn substitutions_can_expand_words() {
        let expand = sub("contractions", |_, lists| {
            lists
                .into_iter()
                .map(|list| {
                    list.into_iter().map(|w| if w.eq_ignore_ascii_case("i'm") { "i am".to_string() } else { w }).collect()
                })
                .collect()
        });
        let t = Target::new("I'm tired today!", &[expand]).unwrap();
        assert_eq!(t.tokenized_words.len(), t.raw_words.len());
        assert_eq!(t.normalized, "i am tired today");
        // "today" starts after "i am tired ".
        let start = t.normalized.find("today").unwrap();
        assert_eq!(t.raw_span(start, start + 5), "today!");
        assert_eq!(t.raw_span(0, 4), "I'm");
    }

    #[test]
    fn substitution_that_changes_length_is_reported_by_name() {
        let bad = sub("drop_first", |_, mut lists| {
            lists.remove(0);
            lists
        });
        let err = Target::new("one two", &[bad]).unwrap_err();
        match err {
            Error::Substitution { name, expected, found } => {
                assert_eq!(name, "drop_first");
                assert_eq!((expected, found), (2, 1));
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn raw_span_maps_back_to_raw_words() {
        let t = Target::plain("My Name Is Fred Flintstone!");
        let start = t.normalized.find("fred").unwrap();
        assert_eq!(t.raw_span(start, t.normalized.len()), "Fred Flintstone!");
    }

    #[test]
    fn raw_span_skips_punctuation_only_words_at_the_start() {
        let t = Target::plain("hello :) there");
        assert_eq!(t.normalized, "hello there");
        let start = t.normalized.find("there").unwrap();
        assert_eq!(t.raw_span(start, t.normalized.len()), "there");
    }
}
