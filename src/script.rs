//! The interface between rule sources and the engine.
//!
//! A rule source implements [`Script`]. On load the engine calls
//! [`Script::setup`] once, then [`Script::build`] to collect what the script
//! declares:
//!
//! ```text
//! Script::build ──> ScriptRules
//!                     ├─ alternates     ("colors" -> "(red|green|blue)")
//!                     ├─ rules          (pattern, previous, weight, handler)
//!                     └─ substitutions  (name, fn(raw, word lists) -> word lists)
//! ```
//!
//! A matched rule's handler gets a [`RuleContext`] and returns a [`Reply`].
//! The engine picks the text out of the reply, fills in `{placeholders}` from
//! the match and expands `<references>` into further replies.

use std::collections::VecDeque;
use std::fmt;

use rand::Rng;
use rand::distributions::{Distribution, WeightedIndex};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;

use crate::engine::UserInfo;
use crate::rules::Match;
use crate::target::Target;
use crate::{DEFAULT_TOPIC, Variables};

/// A rule body.
pub type Handler = Box<dyn Fn(&mut RuleContext<'_>) -> Reply + Send + Sync>;

type SubstituteFn = Box<dyn Fn(&str, Vec<Vec<String>>) -> Vec<Vec<String>> + Send + Sync>;

/// A rule source.
pub trait Script {
    /// Used to qualify rule names in diagnostics.
    fn name(&self) -> &str;

    /// The topic this script's rules and substitutions belong to. `None`
    /// keeps the script from being loaded at all.
    fn topic(&self) -> Option<&str> {
        Some(DEFAULT_TOPIC)
    }

    /// Called once per load, before any script is built.
    fn setup(&mut self, _bot: &mut Variables) {}

    /// Called the first time the engine sees `user`.
    fn setup_user(&self, _user: &str, _vars: &mut Variables) {}

    fn build(&self) -> ScriptRules;
}

/// Everything a script contributes to its topic.
#[derive(Default)]
pub struct ScriptRules {
    pub alternates: Vec<(String, String)>,
    pub rules: Vec<RuleDef>,
    pub substitutions: Vec<Substitution>,
}

impl ScriptRules {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn alternate(mut self, name: &str, pattern: &str) -> Self {
        self.alternates.push((name.to_string(), pattern.to_string()));
        self
    }

    pub fn rule(mut self, def: RuleDef) -> Self {
        self.rules.push(def);
        self
    }

    pub fn substitution(mut self, sub: Substitution) -> Self {
        self.substitutions.push(sub);
        self
    }
}

/// An uncompiled rule. Usually built with [`rule!`](crate::rule).
pub struct RuleDef {
    pub name: String,
    pub pattern: String,
    /// Pattern for the bot's previous reply; empty matches anything.
    pub previous: String,
    pub weight: i32,
    pub handler: Handler,
}

impl fmt::Debug for RuleDef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RuleDef")
            .field("name", &self.name)
            .field("pattern", &self.pattern)
            .field("previous", &self.previous)
            .field("weight", &self.weight)
            .field("handler", &"<function>")
            .finish()
    }
}

/// A rewrite of a message's word lists, run before tokenizing.
///
/// Receives the raw text and one list per raw word, and must return the same
/// number of lists. Substitutions of a topic run in registration order, each
/// seeing the output of the one before.
pub struct Substitution {
    pub name: String,
    pub apply: SubstituteFn,
}

impl Substitution {
    pub fn new(
        name: impl Into<String>,
        apply: impl Fn(&str, Vec<Vec<String>>) -> Vec<Vec<String>> + Send + Sync + 'static,
    ) -> Self {
        Substitution { name: name.into(), apply: Box::new(apply) }
    }
}

impl fmt::Debug for Substitution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Substitution").field("name", &self.name).finish()
    }
}

// --- Replies ------------------------------------------------------------------

/// What a handler returns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    Text(String),
    /// One of these, picked uniformly.
    Choices(Vec<String>),
    /// One of these, picked in proportion to its weight. Weights below 1
    /// count as 1.
    Weighted(Vec<(String, i32)>),
    Nothing,
}

impl Reply {
    /// Collapse to a single template string. Empty lists give `""`.
    pub fn pick(self, rng: &mut StdRng) -> String {
        match self {
            Reply::Text(text) => text,
            Reply::Choices(options) => options.choose(rng).cloned().unwrap_or_default(),
            Reply::Weighted(options) => pick_weighted(&options, rng).cloned().unwrap_or_default(),
            Reply::Nothing => String::new(),
        }
    }
}

fn pick_weighted<'a, T, R: Rng>(options: &'a [(T, i32)], rng: &mut R) -> Option<&'a T> {
    let weights = options.iter().map(|(_, w)| (*w).max(1) as u64);
    let dist = WeightedIndex::new(weights).ok()?;
    options.get(dist.sample(rng)).map(|(item, _)| item)
}

impl From<&str> for Reply {
    fn from(text: &str) -> Self {
        Reply::Text(text.to_string())
    }
}

impl From<String> for Reply {
    fn from(text: String) -> Self {
        Reply::Text(text)
    }
}

impl From<Vec<&str>> for Reply {
    fn from(options: Vec<&str>) -> Self {
        Reply::Choices(options.into_iter().map(str::to_string).collect())
    }
}

impl From<Vec<String>> for Reply {
    fn from(options: Vec<String>) -> Self {
        Reply::Choices(options)
    }
}

impl<const N: usize> From<[&str; N]> for Reply {
    fn from(options: [&str; N]) -> Self {
        Reply::Choices(options.iter().map(|s| s.to_string()).collect())
    }
}

impl From<Vec<(&str, i32)>> for Reply {
    fn from(options: Vec<(&str, i32)>) -> Self {
        Reply::Weighted(options.into_iter().map(|(s, w)| (s.to_string(), w)).collect())
    }
}

impl From<()> for Reply {
    fn from(_: ()) -> Self {
        Reply::Nothing
    }
}

/// Replace `{name}` with the match entry `name`. `{{` and `}}` are literal braces.
pub(crate) fn fill_placeholders(template: &str, matched: &Match) -> Result<String, String> {
    let mut out = String::with_capacity(template.len());
    let mut chars = template.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '{' if chars.peek() == Some(&'{') => {
                chars.next();
                out.push('{');
            }
            '{' => {
                let mut key = String::new();
                loop {
                    match chars.next() {
                        Some('}') => break,
                        Some('{') | None => return Err(format!("unbalanced '{{' in \"{template}\"")),
                        Some(c) => key.push(c),
                    }
                }
                let value = matched.get(&key).ok_or_else(|| format!("unknown match key '{key}'"))?;
                out.push_str(value);
            }
            '}' if chars.peek() == Some(&'}') => {
                chars.next();
                out.push('}');
            }
            '}' => return Err(format!("single '}}' in \"{template}\"")),
            c => out.push(c),
        }
    }
    Ok(out)
}

// --- Handler context ----------------------------------------------------------

/// What a handler can see and change while it runs.
pub struct RuleContext<'a> {
    user_id: &'a str,
    matched: &'a Match,
    user: &'a mut UserInfo,
    bot: &'a mut Variables,
    rng: &'a mut StdRng,
}

impl<'a> RuleContext<'a> {
    pub(crate) fn new(
        user_id: &'a str,
        matched: &'a Match,
        user: &'a mut UserInfo,
        bot: &'a mut Variables,
        rng: &'a mut StdRng,
    ) -> Self {
        RuleContext { user_id, matched, user, bot, rng }
    }

    /// A capture from the match, e.g. `"match0"` or `"reply_match1"`.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.matched.get(key)
    }

    /// The raw text behind a capture: `raw("match0")` reads `raw_match0`.
    pub fn raw(&self, key: &str) -> Option<&str> {
        match key.strip_prefix("reply_") {
            Some(rest) => self.matched.get(&format!("reply_raw_{rest}")),
            None => self.matched.get(&format!("raw_{key}")),
        }
    }

    pub fn matched(&self) -> &Match {
        self.matched
    }

    pub fn user_id(&self) -> &str {
        self.user_id
    }

    pub fn user_vars(&self) -> &Variables {
        &self.user.vars
    }

    pub fn user_vars_mut(&mut self) -> &mut Variables {
        &mut self.user.vars
    }

    pub fn bot_vars(&self) -> &Variables {
        self.bot
    }

    pub fn bot_vars_mut(&mut self) -> &mut Variables {
        self.bot
    }

    pub fn topic(&self) -> &str {
        &self.user.topic
    }

    /// Switch the user's topic. Takes effect for the rest of this reply,
    /// including references it expands.
    pub fn set_topic(&mut self, topic: &str) {
        self.user.topic = topic.to_string();
    }

    /// Recent messages from this user, newest first.
    pub fn messages(&self) -> &VecDeque<Target> {
        &self.user.messages
    }

    /// Recent replies to this user, newest first.
    pub fn replies(&self) -> &VecDeque<Target> {
        &self.user.replies
    }

    pub fn choose<'b, T>(&mut self, items: &'b [T]) -> Option<&'b T> {
        items.choose(&mut *self.rng)
    }

    pub fn choose_weighted<'b, T>(&mut self, items: &'b [(T, i32)]) -> Option<&'b T> {
        pick_weighted(items, &mut *self.rng)
    }
}
