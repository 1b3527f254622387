//! Tree walks over a parsed pattern.
//!
//! - `format`: canonical text (whitespace normalized, lowercase). Two patterns
//!   with the same canonical text are the same pattern.
//! - `score`: specificity. Literal words count for a lot, wildcards count
//!   against, brackets take their best alternative.
//! - `regex`: an equivalent regular expression fragment. Memo nodes become named
//!   groups `match0..matchN`, numbered left to right across the whole pattern
//!   via a shared counter.
//!
//! | node                        | score           | regex                                  |
//! |-----------------------------|-----------------|----------------------------------------|
//! | word(s)                     | 10 per word     | `words\b`                              |
//! | `*`                         | -2              | `(\w+\s){0,}?\w+\b`                    |
//! | `*N~M`, `@...`, `#...`      | -1              | `(W\s){N-1,M-1}?W\b`                   |
//! | space                       | 0               | `\s?`                                  |
//! | `%k:name`                   | 10              | value compiled as a simple pattern     |
//! | `[a|b]` / `(a|b)`           | max of branches | `(a|b)?` / `(a|b)`                     |
//! | `_X`                        | score of X      | `(?P<matchN>X)`                        |

use super::tree::{Node, Sequence, WildKind, Wildcard, parse};
use super::{Bindings, TokenSet, VarKind};
use crate::Value;
use crate::error::PatternError;

pub const WILDCARD_SCORE: i32 = -2;
pub const LIMITED_WILDCARD_SCORE: i32 = -1;
pub const SPACE_SCORE: i32 = 0;
pub const WORD_SCORE: i32 = 10;
pub const VARIABLE_SCORE: i32 = 10;

impl Sequence {
    pub fn format(&self) -> String {
        self.nodes.iter().map(Node::format).collect()
    }

    pub fn score(&self) -> i32 {
        self.nodes.iter().map(Node::score).sum()
    }

    pub fn regex(&self, bindings: &Bindings<'_>, counter: &mut usize) -> Result<String, PatternError> {
        let mut out = String::new();
        for node in &self.nodes {
            out.push_str(&node.regex(bindings, counter)?);
        }
        Ok(out)
    }
}

impl Node {
    pub fn format(&self) -> String {
        match self {
            Node::Wildcard(w) => w.format(),
            Node::Word(text) => text.clone(),
            Node::Memo(inner) => format!("_{}", inner.format()),
            Node::Space => " ".to_string(),
            Node::Variable { kind, name } => format!("%{}:{}", kind, name),
            Node::Optional(alts) => format!("[{}]", format_alternatives(alts)),
            Node::Group(alts) => format!("({})", format_alternatives(alts)),
        }
    }

    pub fn score(&self) -> i32 {
        match self {
            Node::Wildcard(w) => {
                if w.is_restricted() {
                    LIMITED_WILDCARD_SCORE
                } else {
                    WILDCARD_SCORE
                }
            }
            Node::Word(text) => text.split(' ').count() as i32 * WORD_SCORE,
            Node::Memo(inner) => inner.score(),
            Node::Space => SPACE_SCORE,
            Node::Variable { .. } => VARIABLE_SCORE,
            Node::Optional(alts) | Node::Group(alts) => alts.iter().map(Sequence::score).max().unwrap_or(0),
        }
    }

    pub fn regex(&self, bindings: &Bindings<'_>, counter: &mut usize) -> Result<String, PatternError> {
        Ok(match self {
            Node::Wildcard(w) => w.regex(),
            Node::Word(text) => format!(r"{}\b", regex::escape(text)),
            Node::Memo(inner) => {
                let n = *counter;
                *counter += 1;
                format!("(?P<match{}>{})", n, inner.regex(bindings, counter)?)
            }
            Node::Space => r"\s?".to_string(),
            Node::Variable { kind, name } => variable_regex(*kind, name, bindings)?,
            Node::Optional(alts) => format!("({})?", regex_alternatives(alts, bindings, counter)?),
            Node::Group(alts) => format!("({})", regex_alternatives(alts, bindings, counter)?),
        })
    }
}

impl Wildcard {
    pub fn format(&self) -> String {
        let sym = self.kind.symbol();
        match self.max {
            Some(max) if max == self.min => format!("{sym}{max}"),
            None if self.min == 1 => sym.to_string(),
            Some(max) if self.min == 1 => format!("{sym}~{max}"),
            Some(max) => format!("{sym}{}~{max}", self.min),
            None => format!("{sym}{}~", self.min),
        }
    }

    fn regex(&self) -> String {
        let word = match self.kind {
            WildKind::Alnum => r"\w+",
            WildKind::Alpha => r"[^_\d\W]+",
            WildKind::Digit => r"\d+",
        };
        if self.max == Some(1) {
            return format!(r"{word}\b");
        }
        // n-1 repetitions of "word and a space", then one last word.
        let lower = self.min - 1;
        let upper = self.max.map(|m| (m - 1).to_string()).unwrap_or_default();
        format!(r"({word}\s){{{lower},{upper}}}?{word}\b")
    }
}

fn format_alternatives(alts: &[Sequence]) -> String {
    alts.iter().map(Sequence::format).collect::<Vec<_>>().join("|")
}

fn regex_alternatives(alts: &[Sequence], bindings: &Bindings<'_>, counter: &mut usize) -> Result<String, PatternError> {
    let parts = alts.iter().map(|alt| alt.regex(bindings, counter)).collect::<Result<Vec<_>, _>>()?;
    Ok(parts.join("|"))
}

/// Look up a variable and splice its value in as a simple sub-pattern.
fn variable_regex(kind: VarKind, name: &str, bindings: &Bindings<'_>) -> Result<String, PatternError> {
    let value = bindings
        .lookup(kind, name)
        .ok_or_else(|| PatternError::VariableNotFound { kind, name: name.to_string() })?;
    let Value::Text(text) = value else {
        return Err(PatternError::BadVariableValue { kind, name: name.to_string() });
    };

    let wrap = |source: PatternError| PatternError::InVariable { kind, name: name.to_string(), source: Box::new(source) };
    let tree = parse(text, TokenSet::SIMPLE).map_err(wrap)?;
    // Simple patterns hold no memos or variables, so neither the counter nor
    // the bindings are consulted.
    let fragment = tree.regex(&Bindings::default(), &mut 0).map_err(wrap)?;
    Ok(format!(r"{fragment}\b"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tree(text: &str) -> Sequence {
        parse(text, TokenSet::FULL).unwrap()
    }

    #[test]
    fn canonical_text() {
        assert_eq!(tree("  Hello   THERE ").format(), "hello there");
        assert_eq!(tree("how [ are | is ] you").format(), "how [are|is] you");
        assert_eq!(tree("*1~ @3~3 #~4 *2~").format(), "* @3 #~4 *2~");
        assert_eq!(tree("_%A:Colors").format(), "_%a:colors");
    }

    #[test]
    fn scores() {
        assert_eq!(tree("hello there").score(), 20);
        assert_eq!(tree("*").score(), -2);
        assert_eq!(tree("*3~5").score(), -1);
        assert_eq!(tree("@").score(), -1);
        assert_eq!(tree("my name is _@~3").score(), 29);
        assert_eq!(tree("how [are you|is] it").score(), 40);
        assert_eq!(tree("is my name %u:name").score(), 40);
    }

    #[test]
    fn memo_numbering_runs_left_to_right_through_brackets() {
        let mut counter = 0;
        let source = tree("_* (_@|b) _#").regex(&Bindings::default(), &mut counter).unwrap();
        assert_eq!(counter, 3);

        let re = regex::Regex::new(&format!("^{source}$")).unwrap();
        let names = re.capture_names().flatten().collect::<Vec<_>>();
        assert_eq!(names, vec!["match0", "match1", "match2"]);

        let caps = re.captures("one two 5").unwrap();
        assert_eq!(&caps["match0"], "one");
        assert_eq!(&caps["match1"], "two");
        assert_eq!(&caps["match2"], "5");
    }

    #[test]
    fn wildcard_fragments() {
        assert_eq!(tree("*").regex(&Bindings::default(), &mut 0).unwrap(), r"(\w+\s){0,}?\w+\b");
        assert_eq!(tree("#1").regex(&Bindings::default(), &mut 0).unwrap(), r"\d+\b");
        assert_eq!(tree("@2~4").regex(&Bindings::default(), &mut 0).unwrap(), r"([^_\d\W]+\s){1,3}?[^_\d\W]+\b");
    }

    #[test]
    fn missing_variable_is_reported() {
        let err = tree("%b:mood").regex(&Bindings::default(), &mut 0).unwrap_err();
        assert!(matches!(err, PatternError::VariableNotFound { kind: VarKind::Bot, .. }));
    }
}
