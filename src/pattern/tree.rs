//! Parse tree for patterns.
//!
//! The parser is recursive descent over the [`Tokenizer`] stream. Brackets and
//! memo markers recurse into [`Parser::sequence`] with a [`Stop`] condition;
//! each lexeme handler reports back whether the enclosing loop should keep
//! going ([`Step::Continue`]) or has just consumed its closing bracket
//! ([`Step::Closed`]).
//!
//! ```text
//! "how [are|is] _*"
//!
//! Sequence
//! ├─ Word("how")
//! ├─ Space
//! ├─ Optional
//! │   ├─ Sequence[Word("are")]
//! │   └─ Sequence[Word("is")]
//! ├─ Space
//! └─ Memo(Wildcard(*))
//! ```
//!
//! Normalizations done while building:
//!
//! - Leading spaces and runs of spaces collapse (a `Space` is only pushed after
//!   a non-space node); trailing spaces of a sequence or alternative are dropped.
//! - `Word Space Word` collapses into a single multi-word `Word`.

use super::VarKind;
use super::tokenizer::{LexKind, Lexeme, TokenSet, Tokenizer};
use crate::error::PatternError;

/// Deepest bracket nesting accepted.
pub const MAX_NESTING: usize = 32;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WildKind {
    /// `*`: words of alphanumerics and underscore.
    Alnum,
    /// `@`: alphabetic words.
    Alpha,
    /// `#`: digit strings.
    Digit,
}

impl WildKind {
    pub fn symbol(self) -> char {
        match self {
            WildKind::Alnum => '*',
            WildKind::Alpha => '@',
            WildKind::Digit => '#',
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Wildcard {
    pub kind: WildKind,
    /// At least 1.
    pub min: u32,
    /// `None` for unbounded, otherwise at least `min`.
    pub max: Option<u32>,
}

impl Wildcard {
    /// Parse the text of a wildcard lexeme, e.g. `*`, `@2`, `#~3`, `*2~5`.
    fn from_lexeme(text: &str) -> Result<Self, PatternError> {
        let mut chars = text.chars();
        let kind = match chars.next() {
            Some('*') => WildKind::Alnum,
            Some('@') => WildKind::Alpha,
            Some('#') => WildKind::Digit,
            _ => return Err(PatternError::UnexpectedCharacter(text.to_string())),
        };
        let counts = chars.as_str();
        let number = |s: &str| s.parse::<u32>().map_err(|_| PatternError::BadRepetition(text.to_string()));

        let (lower, tilde, upper) = match counts.split_once('~') {
            Some((lower, upper)) => (lower, true, upper),
            None => (counts, false, ""),
        };

        let mut min = 1;
        let mut max = None;
        if !lower.is_empty() {
            min = number(lower)?;
            max = Some(min);
        }
        if tilde {
            max = if upper.is_empty() { None } else { Some(number(upper)?) };
        }
        let min = min.max(1);
        let max = max.map(|m| m.max(min));
        Ok(Wildcard { kind, min, max })
    }

    /// True unless this is a bare `*`-style wildcard with default bounds.
    pub fn is_restricted(&self) -> bool {
        self.kind != WildKind::Alnum || self.min != 1 || self.max.is_some()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Wildcard(Wildcard),
    /// One or more lowercase words, single-space separated.
    Word(String),
    Memo(Box<Node>),
    Space,
    Variable { kind: VarKind, name: String },
    Optional(Vec<Sequence>),
    Group(Vec<Sequence>),
}

/// An ordered run of nodes: a whole pattern or one alternative of a bracket.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Sequence {
    pub nodes: Vec<Node>,
}

impl Sequence {
    fn push(&mut self, node: Node) {
        match node {
            Node::Space => {
                if matches!(self.nodes.last(), Some(last) if *last != Node::Space) {
                    self.nodes.push(Node::Space);
                }
            }
            Node::Word(text) => {
                let len = self.nodes.len();
                if len >= 2 && self.nodes[len - 1] == Node::Space {
                    if let Node::Word(prev) = &mut self.nodes[len - 2] {
                        prev.push(' ');
                        prev.push_str(&text);
                        self.nodes.pop();
                        return;
                    }
                }
                self.nodes.push(Node::Word(text));
            }
            other => self.nodes.push(other),
        }
    }

    fn trim_trailing_space(&mut self) {
        if self.nodes.last() == Some(&Node::Space) {
            self.nodes.pop();
        }
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

/// Where a nested parse stops.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Stop {
    /// Top level: run to the end of input.
    EndOfInput,
    /// Inside `[...]` or `(...)`: run until the matching closer.
    Closer(char),
    /// After a memo marker: take exactly one node.
    OneNode,
}

/// What the caller's loop should do after a lexeme was handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Step {
    Continue,
    Closed,
}

/// Result of parsing up to a [`Stop`].
enum Parsed {
    Nodes(Sequence),
    Alternatives(Vec<Sequence>),
}

struct Parser<'a> {
    tokens: Tokenizer<'a>,
    depth: usize,
}

/// Parse pattern text (lowercased first) into its root sequence.
pub fn parse(text: &str, enabled: TokenSet) -> Result<Sequence, PatternError> {
    let lowered = text.to_lowercase();
    let mut parser = Parser { tokens: Tokenizer::new(&lowered, enabled), depth: 0 };
    match parser.sequence(Stop::EndOfInput)? {
        Parsed::Nodes(seq) => Ok(seq),
        Parsed::Alternatives(_) => Err(PatternError::MisplacedPipe),
    }
}

impl<'a> Parser<'a> {
    fn sequence(&mut self, stop: Stop) -> Result<Parsed, PatternError> {
        let mut current = Sequence::default();
        let mut alternatives: Vec<Sequence> = Vec::new();

        loop {
            let Some(lexeme) = self.tokens.next() else {
                if let Stop::Closer(_) = stop {
                    return Err(PatternError::MissingTerminator);
                }
                break;
            };

            let step = self.handle(lexeme, stop, &mut current, &mut alternatives)?;
            if step == Step::Closed {
                return Ok(Parsed::Alternatives(alternatives));
            }
            if stop == Stop::OneNode && !current.is_empty() {
                break;
            }
        }

        current.trim_trailing_space();
        if current.is_empty() {
            return Err(PatternError::Empty);
        }
        Ok(Parsed::Nodes(current))
    }

    fn handle(
        &mut self,
        lexeme: Lexeme<'_>,
        stop: Stop,
        current: &mut Sequence,
        alternatives: &mut Vec<Sequence>,
    ) -> Result<Step, PatternError> {
        match lexeme.kind {
            LexKind::Invalid => return Err(PatternError::UnexpectedCharacter(lexeme.text.to_string())),
            LexKind::Space => current.push(Node::Space),
            LexKind::Word => current.push(Node::Word(lexeme.text.to_string())),
            LexKind::Wildcard => current.push(Node::Wildcard(Wildcard::from_lexeme(lexeme.text)?)),
            LexKind::Variable => current.push(variable_from_lexeme(lexeme.text)?),
            LexKind::Memo => {
                let inner = match self.nested(Stop::OneNode)? {
                    Parsed::Nodes(mut seq) => seq.nodes.remove(0),
                    Parsed::Alternatives(_) => return Err(PatternError::Empty),
                };
                current.push(Node::Memo(Box::new(inner)));
            }
            LexKind::Optional => current.push(Node::Optional(self.alternatives(']')?)),
            LexKind::Group => current.push(Node::Group(self.alternatives(')')?)),
            LexKind::Pipe => {
                if !matches!(stop, Stop::Closer(_)) {
                    return Err(PatternError::MisplacedPipe);
                }
                close_alternative(current, alternatives)?;
            }
            LexKind::Terminator => {
                let closer = lexeme.text.chars().next().unwrap_or(')');
                if stop != Stop::Closer(closer) {
                    return Err(PatternError::UnexpectedTerminator(closer));
                }
                close_alternative(current, alternatives)?;
                return Ok(Step::Closed);
            }
        }
        Ok(Step::Continue)
    }

    fn alternatives(&mut self, closer: char) -> Result<Vec<Sequence>, PatternError> {
        match self.nested(Stop::Closer(closer))? {
            Parsed::Alternatives(alts) => Ok(alts),
            Parsed::Nodes(_) => Err(PatternError::MissingTerminator),
        }
    }

    fn nested(&mut self, stop: Stop) -> Result<Parsed, PatternError> {
        if self.depth >= MAX_NESTING {
            return Err(PatternError::NestedTooDeep(MAX_NESTING));
        }
        self.depth += 1;
        let parsed = self.sequence(stop);
        self.depth -= 1;
        parsed
    }
}

fn close_alternative(current: &mut Sequence, alternatives: &mut Vec<Sequence>) -> Result<(), PatternError> {
    current.trim_trailing_space();
    if current.is_empty() {
        return Err(PatternError::EmptyAlternative);
    }
    alternatives.push(std::mem::take(current));
    Ok(())
}

fn variable_from_lexeme(text: &str) -> Result<Node, PatternError> {
    // Lexeme shape is `%k:name`.
    let mut chars = text.chars();
    chars.next();
    let kind = chars.next().and_then(VarKind::from_char);
    let name = text.get(3..).unwrap_or("");
    match kind {
        Some(kind) if !name.is_empty() => Ok(Node::Variable { kind, name: name.to_string() }),
        _ => Err(PatternError::UnexpectedCharacter(text.to_string())),
    }
}
