use std::collections::HashSet;

use log::{debug, warn};

use super::Rule;
use crate::script::Substitution;

/// The rules and substitutions of one topic.
///
/// Rules are kept in registration order; `sort_rules` maintains a cached
/// descending order that is rebuilt only after new rules arrive.
#[derive(Debug)]
pub struct Topic {
    name: String,
    rules: Vec<Rule>,
    keys: HashSet<(String, String)>,
    sorted: Vec<usize>,
    dirty: bool,
    substitutions: Vec<Substitution>,
}

impl Topic {
    pub fn new(name: &str) -> Self {
        Topic {
            name: name.to_string(),
            rules: Vec::new(),
            keys: HashSet::new(),
            sorted: Vec::new(),
            dirty: false,
            substitutions: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Add a rule. Returns false, and drops `rule`, if the topic already has
    /// a rule with the same pattern and previous-reply pattern.
    pub fn insert(&mut self, rule: Rule) -> bool {
        let key = rule.key();
        if self.keys.contains(&key) {
            let existing = self.rules.iter().find(|r| r.key() == key).map(Rule::name).unwrap_or("?");
            warn!(
                "[topic] ignoring duplicate rule {} in topic \"{}\": pattern \"{}\" previous \"{}\" already used by {}",
                rule.name(),
                self.name,
                key.0,
                key.1,
                existing
            );
            return false;
        }
        self.keys.insert(key);
        self.rules.push(rule);
        self.dirty = true;
        true
    }

    pub fn add_substitution(&mut self, sub: Substitution) {
        self.substitutions.push(sub);
    }

    pub fn substitutions(&self) -> &[Substitution] {
        &self.substitutions
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn is_sorted(&self) -> bool {
        !self.dirty
    }

    /// Rebuild the cached order if rules were added since the last sort.
    pub fn sort_rules(&mut self) {
        if !self.dirty {
            return;
        }
        let rules = &self.rules;
        let mut order: Vec<usize> = (0..rules.len()).collect();
        // Stable, so equal rules keep registration order.
        order.sort_by(|&a, &b| rules[b].cmp(&rules[a]));
        self.sorted = order;
        self.dirty = false;

        debug!("[topic] sorted {} rule(s) in topic \"{}\"", self.rules.len(), self.name);
        for rule in self.sorted_rules() {
            debug!("[topic]   {rule}: \"{}\" / \"{}\"", rule.pattern(), rule.previous());
        }
    }

    /// Rules in descending priority, as of the last `sort_rules`.
    pub fn sorted_rules(&self) -> impl Iterator<Item = &Rule> {
        self.sorted.iter().map(|&i| &self.rules[i])
    }

    /// Rules in registration order.
    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{RuleDef, Variables};

    fn compile(def: RuleDef) -> Rule {
        let name = format!("test.{}", def.name);
        Rule::new(name, def, &Variables::new(), &Variables::new()).unwrap()
    }

    #[test]
    fn duplicates_keep_the_first_rule() {
        let mut topic = Topic::new("all");
        assert!(topic.insert(compile(rule! { name: "first", pattern: "Hello  there", reply: |_c| "1" })));
        assert!(!topic.insert(compile(rule! { name: "second", pattern: "hello there", weight: 5, reply: |_c| "2" })));
        assert!(topic.insert(compile(rule! { name: "third", pattern: "hello there", previous: "hi", reply: |_c| "3" })));
        assert_eq!(topic.len(), 2);
        assert_eq!(topic.rules()[0].name(), "test.first");
    }

    #[test]
    fn sort_is_cached_until_new_rules_arrive() {
        let mut topic = Topic::new("all");
        topic.insert(compile(rule! { name: "star", pattern: "*", reply: |_c| "" }));
        topic.insert(compile(rule! { name: "hello", pattern: "hello", reply: |_c| "" }));
        assert!(!topic.is_sorted());

        topic.sort_rules();
        assert!(topic.is_sorted());
        let names: Vec<_> = topic.sorted_rules().map(Rule::name).collect();
        assert_eq!(names, vec!["test.hello", "test.star"]);

        topic.insert(compile(rule! { name: "heavy", pattern: "* or whatever", weight: 100, reply: |_c| "" }));
        assert!(!topic.is_sorted());
        topic.sort_rules();
        assert_eq!(topic.sorted_rules().next().map(Rule::name), Some("test.heavy"));
    }
}
