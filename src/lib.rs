extern crate self as banter;

use std::collections::HashMap;
use std::fmt;

#[macro_use]
mod macros;
mod api;
mod engine;
mod error;
pub mod pattern;
mod rules;
mod script;
pub mod scripts;
mod target;

pub use api::{Options, ReplyDetails};
pub use engine::{Engine, ReplyStep, UserInfo};
pub use error::{Error, PatternError, Result};
pub use pattern::{Bindings, Pattern, VarKind};
pub use rules::{Match, Rule, RulesDb, Topic};
pub use script::{Handler, Reply, RuleContext, RuleDef, Script, ScriptRules, Substitution};
pub use target::{Target, kill_non_alphanumerics, split_on_whitespace};

/// Name of the topic every engine starts in and falls back to.
pub const DEFAULT_TOPIC: &str = "all";

// --- Variables ----------------------------------------------------------------

/// A bot or user variable value.
///
/// Only `Text` values can be referenced from patterns (`%b:name`, `%u:name`);
/// the other kinds are for handler bookkeeping.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    Text(String),
    Int(i64),
    Bool(bool),
}

impl Value {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Text(text) => Some(text),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }
}

impl From<&str> for Value {
    fn from(text: &str) -> Self {
        Value::Text(text.to_string())
    }
}

impl From<String> for Value {
    fn from(text: String) -> Self {
        Value::Text(text)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Int(n)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Text(text) => f.write_str(text),
            Value::Int(n) => write!(f, "{n}"),
            Value::Bool(b) => write!(f, "{b}"),
        }
    }
}

/// A variable table, keyed by name.
pub type Variables = HashMap<String, Value>;
