//! Pattern tokenizer.
//!
//! Splits a (lowercased) pattern string into [`Lexeme`]s, lazily, covering the
//! whole input with no gaps. Each lexical rule is an anchored regex tried in a
//! fixed priority order; the first one that matches at the current offset wins.
//! Some rules also require a particular character (or end of input) right
//! after the match. The regex engine has no lookahead, so that check is done
//! by hand on the remainder.
//!
//! ```text
//! "my name is _@~3"
//!   Word("my") Space Word("name") Space Word("is") Space Memo("_") Wildcard("@~3")
//! ```
//!
//! Characters no rule accepts come out as `LexKind::Invalid`; the parser turns
//! those into syntax errors. In [`TokenSet::SIMPLE`] mode, wildcards, memo
//! markers and variables are disabled, so their characters fall through to
//! `Invalid` as well.

use regex::Regex;

bitflags::bitflags! {
    /// Which lexical rules are enabled.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct TokenSet: u16 {
        const WILDCARD   = 1 << 0;
        const MEMO       = 1 << 1;
        const WORD       = 1 << 2;
        const SPACE      = 1 << 3;
        const VARIABLE   = 1 << 4;
        const OPTIONAL   = 1 << 5;
        const GROUP      = 1 << 6;
        const TERMINATOR = 1 << 7;
        const PIPE       = 1 << 8;

        /// Everything; used for rule patterns.
        const FULL = Self::WILDCARD.bits()
            | Self::MEMO.bits()
            | Self::WORD.bits()
            | Self::SPACE.bits()
            | Self::VARIABLE.bits()
            | Self::OPTIONAL.bits()
            | Self::GROUP.bits()
            | Self::TERMINATOR.bits()
            | Self::PIPE.bits();

        /// Words, spaces and brackets only; used for alternates and variable values.
        const SIMPLE = Self::WORD.bits()
            | Self::SPACE.bits()
            | Self::OPTIONAL.bits()
            | Self::GROUP.bits()
            | Self::TERMINATOR.bits()
            | Self::PIPE.bits();
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LexKind {
    Wildcard,
    Memo,
    Word,
    Space,
    Variable,
    Optional,
    Group,
    Terminator,
    Pipe,
    Invalid,
}

/// One token: its kind and the exact substring it covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Lexeme<'a> {
    pub kind: LexKind,
    pub text: &'a str,
}

/// What must come right after a match for it to count.
#[derive(Debug, Clone, Copy)]
enum Follow {
    Anything,
    /// `]`, `)`, `|`, whitespace or end of input.
    Delimiter,
    /// One of the things a memo marker can apply to.
    MemoTarget,
}

struct LexRule {
    kind: LexKind,
    enabled_by: TokenSet,
    regex: &'static Regex,
    follow: Follow,
}

fn lex_rules() -> [LexRule; 9] {
    [
        LexRule {
            kind: LexKind::Wildcard,
            enabled_by: TokenSet::WILDCARD,
            regex: regex!(r"^[*#@]\d*~?\d*"),
            follow: Follow::Delimiter,
        },
        LexRule { kind: LexKind::Memo, enabled_by: TokenSet::MEMO, regex: regex!(r"^_"), follow: Follow::MemoTarget },
        LexRule {
            kind: LexKind::Word,
            enabled_by: TokenSet::WORD,
            regex: regex!(r"^[^_\W][\w-]*"),
            follow: Follow::Delimiter,
        },
        LexRule { kind: LexKind::Space, enabled_by: TokenSet::SPACE, regex: regex!(r"^\s+"), follow: Follow::Anything },
        LexRule {
            kind: LexKind::Variable,
            enabled_by: TokenSet::VARIABLE,
            regex: regex!(r"^%[abu]:[^_\d\W]\w*"),
            follow: Follow::Delimiter,
        },
        LexRule {
            kind: LexKind::Optional,
            enabled_by: TokenSet::OPTIONAL,
            regex: regex!(r"^\["),
            follow: Follow::Anything,
        },
        LexRule {
            kind: LexKind::Terminator,
            enabled_by: TokenSet::TERMINATOR,
            regex: regex!(r"^[\])]"),
            follow: Follow::Delimiter,
        },
        LexRule { kind: LexKind::Group, enabled_by: TokenSet::GROUP, regex: regex!(r"^\("), follow: Follow::Anything },
        LexRule { kind: LexKind::Pipe, enabled_by: TokenSet::PIPE, regex: regex!(r"^\|"), follow: Follow::Anything },
    ]
}

impl Follow {
    fn accepts(self, rest: &str) -> bool {
        let next = rest.chars().next();
        match self {
            Follow::Anything => true,
            Follow::Delimiter => match next {
                None => true,
                Some(c) => c == ']' || c == ')' || c == '|' || c.is_whitespace(),
            },
            Follow::MemoTarget => matches!(next, Some('*' | '#' | '@' | '%' | '(' | '[')),
        }
    }
}

/// Lazy token stream over a pattern string.
pub struct Tokenizer<'a> {
    rest: &'a str,
    rules: [LexRule; 9],
    enabled: TokenSet,
}

impl<'a> Tokenizer<'a> {
    pub fn new(input: &'a str, enabled: TokenSet) -> Self {
        Tokenizer { rest: input, rules: lex_rules(), enabled }
    }

    fn lex(&self) -> Option<Lexeme<'a>> {
        let rest = self.rest;
        for rule in self.rules.iter().filter(|r| self.enabled.contains(r.enabled_by)) {
            let Some(m) = rule.regex.find(rest) else {
                continue;
            };
            if rule.follow.accepts(&rest[m.end()..]) {
                return Some(Lexeme { kind: rule.kind, text: &rest[..m.end()] });
            }
        }
        // Nothing matched: one character of garbage.
        let len = rest.chars().next()?.len_utf8();
        Some(Lexeme { kind: LexKind::Invalid, text: &rest[..len] })
    }
}

impl<'a> Iterator for Tokenizer<'a> {
    type Item = Lexeme<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.rest.is_empty() {
            return None;
        }
        let lexeme = self.lex()?;
        self.rest = &self.rest[lexeme.text.len()..];
        Some(lexeme)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(input: &str, set: TokenSet) -> Vec<(LexKind, &str)> {
        Tokenizer::new(input, set).map(|l| (l.kind, l.text)).collect()
    }

    #[test]
    fn wildcard_with_range_is_one_token() {
        assert_eq!(kinds("*3~5", TokenSet::FULL), vec![(LexKind::Wildcard, "*3~5")]);
        assert_eq!(kinds("#~2 @", TokenSet::FULL), vec![
            (LexKind::Wildcard, "#~2"),
            (LexKind::Space, " "),
            (LexKind::Wildcard, "@")
        ]);
    }

    #[test]
    fn covers_input_without_gaps() {
        let input = "i _(like|love) [the] color _%a:colors";
        let joined: String = Tokenizer::new(input, TokenSet::FULL).map(|l| l.text).collect();
        assert_eq!(joined, input);
        assert!(Tokenizer::new(input, TokenSet::FULL).all(|l| l.kind != LexKind::Invalid));
    }

    #[test]
    fn variable_keeps_its_name() {
        assert_eq!(kinds("%u:first_name", TokenSet::FULL), vec![(LexKind::Variable, "%u:first_name")]);
    }

    #[test]
    fn variable_names_have_no_hyphens() {
        assert_eq!(kinds("%u:n-x", TokenSet::FULL)[0], (LexKind::Invalid, "%"));
        assert!(super::super::tree::parse("%u:n-x", TokenSet::FULL).is_err());
    }

    #[test]
    fn word_followed_by_junk_is_invalid() {
        let toks = kinds("hello!", TokenSet::FULL);
        assert_eq!(toks[0].0, LexKind::Invalid);
        assert_eq!(toks[0].1, "h");
    }

    #[test]
    fn memo_requires_a_target() {
        assert_eq!(kinds("_*", TokenSet::FULL), vec![(LexKind::Memo, "_"), (LexKind::Wildcard, "*")]);
        assert_eq!(kinds("_x", TokenSet::FULL)[0].0, LexKind::Invalid);
    }

    #[test]
    fn simple_mode_rejects_wildcards_and_variables() {
        assert_eq!(kinds("*", TokenSet::SIMPLE), vec![(LexKind::Invalid, "*")]);
        assert_eq!(kinds("%b:x", TokenSet::SIMPLE)[0].0, LexKind::Invalid);
        assert_eq!(kinds("(a|b)", TokenSet::SIMPLE), vec![
            (LexKind::Group, "("),
            (LexKind::Word, "a"),
            (LexKind::Pipe, "|"),
            (LexKind::Word, "b"),
            (LexKind::Terminator, ")")
        ]);
    }
}
