use std::cmp::Ordering;
use std::collections::VecDeque;
use std::fmt;

use log::debug;

use super::Match;
use crate::Variables;
use crate::error::{Error, Result};
use crate::pattern::{Bindings, Pattern};
use crate::script::{Handler, Reply, RuleContext, RuleDef};
use crate::target::Target;

/// A compiled rule: message pattern, previous-reply pattern, weight and handler.
///
/// Rules order by weight, then message pattern score, then previous-reply
/// pattern score. Two rules are equal when all three are.
pub struct Rule {
    name: String,
    pattern: Pattern,
    previous: Pattern,
    weight: i32,
    handler: Handler,
}

impl Rule {
    /// Compile `def`. `name` is the fully qualified rule name used in errors.
    pub fn new(name: String, def: RuleDef, alternates: &Variables, bot: &Variables) -> Result<Self> {
        let bindings = Bindings { bot: Some(bot), ..Bindings::default() };
        let pattern = Pattern::new(&def.pattern, alternates, bindings).map_err(|e| Error::in_rule(&name, "pattern", e))?;
        // The message pattern can't be empty; only the previous-reply pattern has a null form.
        if !pattern.is_present() {
            return Err(Error::in_rule(&name, "pattern", crate::PatternError::Empty));
        }
        let previous =
            Pattern::new(&def.previous, alternates, bindings).map_err(|e| Error::in_rule(&name, "previous", e))?;
        Ok(Rule { name, pattern, previous, weight: def.weight, handler: def.handler })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn pattern(&self) -> &Pattern {
        &self.pattern
    }

    pub fn previous(&self) -> &Pattern {
        &self.previous
    }

    pub fn weight(&self) -> i32 {
        self.weight
    }

    /// Identity within a topic: the canonical text of both patterns.
    pub fn key(&self) -> (String, String) {
        (self.pattern.formatted().to_string(), self.previous.formatted().to_string())
    }

    /// Match `target`, and when this rule has a previous-reply pattern, the
    /// newest entry of `replies` too.
    pub fn matches(&self, target: &Target, replies: &VecDeque<Target>, bindings: Bindings<'_>) -> Option<Match> {
        let captures = self.pattern.captures(&target.normalized, bindings)?;
        let mut matched = Match::new();
        matched.add_captures("", &captures, target);

        if self.previous.is_present() {
            let Some(last) = replies.front() else {
                debug!("[rule] {} needs a previous reply and there is none", self.name);
                return None;
            };
            let captures = self.previous.captures(&last.normalized, bindings)?;
            matched.add_captures("reply_", &captures, last);
        }
        Some(matched)
    }

    pub(crate) fn call(&self, ctx: &mut RuleContext<'_>) -> Reply {
        (self.handler)(ctx)
    }
}

impl PartialEq for Rule {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Rule {}

impl PartialOrd for Rule {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Rule {
    fn cmp(&self, other: &Self) -> Ordering {
        self.weight
            .cmp(&other.weight)
            .then_with(|| self.pattern.score().cmp(&other.pattern.score()))
            .then_with(|| self.previous.score().cmp(&other.previous.score()))
    }
}

impl fmt::Debug for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Rule")
            .field("name", &self.name)
            .field("pattern", &self.pattern.formatted())
            .field("previous", &self.previous.formatted())
            .field("weight", &self.weight)
            .field("handler", &"<function>")
            .finish()
    }
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({}/{}/{})", self.name, self.weight, self.pattern.score(), self.previous.score())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn compile(pattern: &str, previous: &str, weight: i32) -> Rule {
        let def = RuleDef { weight, ..rule! { name: "r", pattern: pattern, previous: previous, reply: |_c| "" } };
        Rule::new(format!("test.{pattern}"), def, &Variables::new(), &Variables::new()).unwrap()
    }

    #[test]
    fn ordering_is_total_and_transitive() {
        let rules = vec![
            compile("*", "", 1),
            compile("hello", "", 1),
            compile("hello there", "", 1),
            compile("_*", "whos there", 1),
            compile("_*", "* who", 1),
            compile("google *", "", 10),
            compile("how are you", "", 2),
        ];
        for a in &rules {
            for b in &rules {
                let lt = a < b;
                let eq = a == b;
                let gt = a > b;
                assert_eq!([lt, eq, gt].iter().filter(|x| **x).count(), 1, "{a} vs {b}");
                for c in &rules {
                    if a < b && b < c {
                        assert!(a < c, "{a} < {b} < {c}");
                    }
                }
            }
        }
        assert!(rules[2] > rules[1]);
        assert!(rules[1] > rules[0]);
        assert!(rules[5] > rules[2]);
        // Same message pattern: the more specific previous-reply pattern wins.
        assert!(rules[3] > rules[4]);
    }

    #[test]
    fn previous_pattern_needs_history() {
        let rule = compile("_*", "whos there", 1);
        let target = Target::plain("Banana");
        let mut replies = VecDeque::new();
        assert!(rule.matches(&target, &replies, Bindings::default()).is_none());

        replies.push_front(Target::plain("Who's there?"));
        let m = rule.matches(&target, &replies, Bindings::default()).unwrap();
        assert_eq!(m.get("raw_match0"), Some("Banana"));

        replies.push_front(Target::plain("Something else"));
        assert!(rule.matches(&target, &replies, Bindings::default()).is_none());
    }

    #[test]
    fn previous_captures_are_prefixed() {
        let rule = compile("_(open|close) it", "* _(valve|switch) [*]", 1);
        let mut replies = VecDeque::new();
        replies.push_front(Target::plain("I found the Valve."));
        let m = rule.matches(&Target::plain("Open it!"), &replies, Bindings::default()).unwrap();
        assert_eq!(m.get("match0"), Some("open"));
        assert_eq!(m.get("reply_match0"), Some("valve"));
        assert_eq!(m.get("reply_raw_match0"), Some("Valve."));
    }

    #[test]
    fn bad_patterns_name_the_rule() {
        let def = rule! { name: "broken", pattern: "hello (there", reply: |_c| "" };
        let err = Rule::new("demo.broken".into(), def, &Variables::new(), &Variables::new()).unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("demo.broken"), "{msg}");
        assert!(msg.contains("pattern"), "{msg}");

        let def = rule! { name: "broken", pattern: "hi", previous: "x | y", reply: |_c| "" };
        let err = Rule::new("demo.broken".into(), def, &Variables::new(), &Variables::new()).unwrap_err();
        assert!(matches!(err, Error::Rule { field: "previous", .. }));
    }
}
