//! The pattern language compiler.
//!
//! Pattern text goes through three stages:
//!
//! ```text
//! "my name is _@~3"
//!     │  Tokenizer            (pattern/tokenizer.rs)
//!     v
//! Word Space Word Space Word Space Memo Wildcard
//!     │  parse                (pattern/tree.rs)
//!     v
//! Sequence[Word("my name is"), Space, Memo(Wildcard(@, 1..=3))]
//!     │  format / score / regex  (pattern/compile.rs)
//!     v
//! "my name is _@~3", 29, ^my name is\b\s?(?P<match0>([^_\d\W]+\s){0,2}?[^_\d\W]+\b)$
//! ```
//!
//! [`Pattern`] bundles the results. Its regex is compiled once, when the pattern
//! is built, with whatever variables are known then (alternates and bot
//! variables). Patterns that reference user variables can't be compiled ahead
//! of time; they keep no regex and recompile on every match with the caller's
//! bindings.
//!
//! ## Pattern syntax
//!
//! | syntax                         | meaning                                    |
//! |--------------------------------|--------------------------------------------|
//! | `word`                         | literal, case-insensitive                  |
//! | `*`, `*N`, `*N~M`, `*~M`, `*N~`| words of alphanumerics/underscore          |
//! | `@...`, `#...`                 | same counts, alphabetic / digit words only |
//! | `_X`                           | capture X as `matchN`                      |
//! | `%a:name` `%b:name` `%u:name`  | alternate / bot / user variable            |
//! | `(a|b)` / `[a|b]`              | required / optional alternation            |

#[path = "pattern/compile.rs"]
mod compile;
#[path = "pattern/tokenizer.rs"]
mod tokenizer;
#[path = "pattern/tree.rs"]
mod tree;

#[cfg(test)]
#[path = "pattern/tests.rs"]
mod tests;

use std::fmt;

use log::{debug, warn};
use regex::Regex;

use crate::Variables;
use crate::error::PatternError;

pub use compile::{LIMITED_WILDCARD_SCORE, SPACE_SCORE, VARIABLE_SCORE, WILDCARD_SCORE, WORD_SCORE};
pub use tokenizer::{LexKind, Lexeme, TokenSet, Tokenizer};
pub use tree::{MAX_NESTING, Node, Sequence, WildKind, Wildcard, parse};

/// The three variable namespaces a pattern can reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VarKind {
    /// `%a:` — per-script alternates, fixed at load time.
    Alternate,
    /// `%b:` — engine-wide bot variables.
    Bot,
    /// `%u:` — variables of the user being replied to.
    User,
}

impl VarKind {
    pub fn from_char(c: char) -> Option<Self> {
        match c {
            'a' => Some(VarKind::Alternate),
            'b' => Some(VarKind::Bot),
            'u' => Some(VarKind::User),
            _ => None,
        }
    }

    pub fn as_char(self) -> char {
        match self {
            VarKind::Alternate => 'a',
            VarKind::Bot => 'b',
            VarKind::User => 'u',
        }
    }
}

impl fmt::Display for VarKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_char())
    }
}

/// Variable tables visible to a regex compile. Missing tables behave as empty.
#[derive(Debug, Clone, Copy, Default)]
pub struct Bindings<'a> {
    pub alternates: Option<&'a Variables>,
    pub bot: Option<&'a Variables>,
    pub user: Option<&'a Variables>,
}

impl<'a> Bindings<'a> {
    pub fn lookup(&self, kind: VarKind, name: &str) -> Option<&'a crate::Value> {
        let table = match kind {
            VarKind::Alternate => self.alternates,
            VarKind::Bot => self.bot,
            VarKind::User => self.user,
        };
        table.and_then(|t| t.get(name))
    }

    /// Same tables, with `alternates` replaced.
    pub fn with_alternates(self, alternates: &'a Variables) -> Self {
        Bindings { alternates: Some(alternates), ..self }
    }
}

/// One named capture of a successful match, as byte offsets into the text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Capture {
    pub name: String,
    /// `None` when the group sat in an optional branch that didn't take part.
    pub span: Option<(usize, usize)>,
}

/// A compiled pattern: parse tree, canonical text, score and (usually) a regex.
#[derive(Debug, Clone)]
pub struct Pattern {
    raw: String,
    tree: Option<Sequence>,
    formatted: String,
    score: i32,
    regex: Option<Regex>,
    alternates: Variables,
}

impl Pattern {
    /// A pattern that matches anything. Used as the missing previous-reply pattern.
    pub fn null() -> Self {
        Pattern {
            raw: String::new(),
            tree: None,
            formatted: String::new(),
            score: WILDCARD_SCORE,
            regex: None,
            alternates: Variables::new(),
        }
    }

    /// Parse and compile `raw`.
    ///
    /// `alternates` is kept with the pattern and consulted again on deferred
    /// compiles. `bindings` supplies whatever else is known now; a reference
    /// to a user variable that can't be resolved yet leaves the pattern
    /// without a cached regex instead of failing.
    pub fn new(raw: &str, alternates: &Variables, bindings: Bindings<'_>) -> Result<Self, PatternError> {
        Self::build(raw, TokenSet::FULL, alternates, bindings)
    }

    /// Parse `raw` with the restricted token set (no wildcards, memos or variables).
    pub fn simple(raw: &str) -> Result<Self, PatternError> {
        Self::build(raw, TokenSet::SIMPLE, &Variables::new(), Bindings::default())
    }

    fn build(raw: &str, tokens: TokenSet, alternates: &Variables, bindings: Bindings<'_>) -> Result<Self, PatternError> {
        if raw.is_empty() {
            return Ok(Self::null());
        }
        let tree = parse(raw, tokens)?;
        let formatted = tree.format();
        let score = tree.score();
        let mut pattern =
            Pattern { raw: raw.to_string(), tree: Some(tree), formatted, score, regex: None, alternates: alternates.clone() };

        match pattern.compile(bindings.with_alternates(alternates)) {
            Ok(regex) => pattern.regex = Some(regex),
            Err(err) if err.missing_variable() == Some(VarKind::User) => {
                warn!("[pattern] {err} in \"{}\", failed to cache regex", pattern.formatted);
            }
            Err(err) => return Err(err),
        }
        Ok(pattern)
    }

    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// Canonical text; the identity used for duplicate detection.
    pub fn formatted(&self) -> &str {
        &self.formatted
    }

    pub fn score(&self) -> i32 {
        self.score
    }

    pub fn tree(&self) -> Option<&Sequence> {
        self.tree.as_ref()
    }

    /// False for the null pattern.
    pub fn is_present(&self) -> bool {
        !self.raw.is_empty()
    }

    /// True when the regex has to be rebuilt on every match.
    pub fn is_deferred(&self) -> bool {
        self.tree.is_some() && self.regex.is_none()
    }

    /// The anchored regular expression source for this pattern under `bindings`.
    pub fn regex_source(&self, bindings: Bindings<'_>) -> Result<String, PatternError> {
        let Some(tree) = &self.tree else {
            return Ok(String::from(r"^.*$"));
        };
        Ok(format!("^{}$", tree.regex(&bindings, &mut 0)?))
    }

    fn compile(&self, bindings: Bindings<'_>) -> Result<Regex, PatternError> {
        Ok(Regex::new(&self.regex_source(bindings)?)?)
    }

    /// Match against normalized text.
    ///
    /// Returns the named captures on success. The null pattern matches
    /// everything with no captures. A deferred pattern that fails to compile
    /// with `bindings` logs a warning and doesn't match.
    pub fn captures(&self, text: &str, bindings: Bindings<'_>) -> Option<Vec<Capture>> {
        if self.tree.is_none() {
            return Some(Vec::new());
        }

        let compiled;
        let regex = match &self.regex {
            Some(regex) => regex,
            None => match self.compile(bindings.with_alternates(&self.alternates)) {
                Ok(regex) => {
                    compiled = regex;
                    &compiled
                }
                Err(err) => {
                    warn!("[pattern] {err} in \"{}\", match failed", self.formatted);
                    return None;
                }
            },
        };

        let caps = regex.captures(text)?;
        debug!("[pattern] \"{}\" matched \"{}\"", self.formatted, text);
        Some(
            regex
                .capture_names()
                .flatten()
                .map(|name| Capture { name: name.to_string(), span: caps.name(name).map(|m| (m.start(), m.end())) })
                .collect(),
        )
    }

    pub fn is_match(&self, text: &str, bindings: Bindings<'_>) -> bool {
        self.captures(text, bindings).is_some()
    }
}

impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.formatted)
    }
}
