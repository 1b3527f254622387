//! Error taxonomy.
//!
//! Two layers:
//!
//! - [`PatternError`] is raised while tokenizing, parsing or compiling a single
//!   pattern (syntax problems and variable resolution problems).
//! - [`Error`] is what the engine surface returns. It attaches the rule or
//!   script a pattern came from, and adds the load-time and reply-time
//!   failures (no rules, runaway recursion, bad substitutions, bad reply
//!   templates).

use crate::pattern::VarKind;

/// Result type alias using [`Error`].
pub type Result<T> = std::result::Result<T, Error>;

/// Problems found in pattern text, or in the variables spliced into it.
#[derive(Debug, Clone, thiserror::Error)]
pub enum PatternError {
    #[error("found an unexpected character '{0}'")]
    UnexpectedCharacter(String),

    #[error("found an unexpected '{0}'")]
    UnexpectedTerminator(char),

    #[error("alternatives operator | must be used within parentheses or square brackets")]
    MisplacedPipe,

    #[error("alternatives between parentheses or square brackets can't be empty")]
    EmptyAlternative,

    #[error("missing a closing parenthesis or square bracket")]
    MissingTerminator,

    #[error("pattern string is empty")]
    Empty,

    #[error("brackets are nested more than {0} levels deep")]
    NestedTooDeep(usize),

    #[error("repetition count in '{0}' is too large")]
    BadRepetition(String),

    #[error("variable %{kind}:{name} is undefined")]
    VariableNotFound { kind: VarKind, name: String },

    #[error("value of variable %{kind}:{name} could not be used because it is not a string")]
    BadVariableValue { kind: VarKind, name: String },

    #[error("{source} in variable %{kind}:{name}")]
    InVariable { kind: VarKind, name: String, source: Box<PatternError> },

    #[error("compiled pattern was rejected by the regex engine: {0}")]
    Regex(#[from] regex::Error),
}

impl PatternError {
    /// The variable kind whose absence caused this error, looking through
    /// `InVariable` wrappers.
    pub fn missing_variable(&self) -> Option<VarKind> {
        match self {
            PatternError::VariableNotFound { kind, .. } => Some(*kind),
            PatternError::InVariable { source, .. } => source.missing_variable(),
            _ => None,
        }
    }

    /// True for the variable-resolution failures (as opposed to syntax errors).
    pub fn is_variable_error(&self) -> bool {
        match self {
            PatternError::VariableNotFound { .. } | PatternError::BadVariableValue { .. } => true,
            PatternError::InVariable { source, .. } => source.is_variable_error(),
            _ => false,
        }
    }
}

/// Errors surfaced by the engine.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A pattern of a rule failed to parse or compile while loading.
    #[error("{source} in {field} of {rule}")]
    Rule { rule: String, field: &'static str, source: PatternError },

    /// An alternates entry of a script is not a valid simple pattern.
    #[error("{source} in alternates[\"{key}\"] of {script}")]
    Alternate { script: String, key: String, source: PatternError },

    #[error(transparent)]
    Pattern(#[from] PatternError),

    /// A load pass finished with zero rules across all topics.
    #[error("no rules were found in {0} script(s)")]
    NoRulesFound(usize),

    /// Reply expansion went past the configured depth limit.
    #[error("could not find reply to \"{input}\", due to rules referencing other rules more than {limit} times")]
    RecursionTooDeep { input: String, limit: usize },

    /// A substitution returned a word list of the wrong outer length.
    #[error("return value of substitution {name} has {found} word lists, expected {expected}")]
    Substitution { name: String, expected: usize, found: usize },

    /// A reply template could not be filled in from the match.
    #[error("{reason} while processing the reply of {rule}")]
    Placeholder { rule: String, reason: String },
}

impl Error {
    /// Attach the rule name and which of its patterns failed.
    pub(crate) fn in_rule(rule: impl Into<String>, field: &'static str, source: PatternError) -> Self {
        Error::Rule { rule: rule.into(), field, source }
    }

    /// True when the error came from the recursion depth guard.
    pub fn is_recursion(&self) -> bool {
        matches!(self, Error::RecursionTooDeep { .. })
    }
}
