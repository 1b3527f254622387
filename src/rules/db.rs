use std::collections::BTreeMap;

use log::{debug, info};

use super::{Rule, Topic};
use crate::error::{Error, Result};
use crate::pattern::Pattern;
use crate::script::Script;
use crate::{DEFAULT_TOPIC, Value, Variables};

/// All loaded topics, plus the scripts that contributed to them.
///
/// The default topic always exists, even when no script uses it.
pub struct RulesDb {
    topics: BTreeMap<String, Topic>,
    scripts: Vec<Box<dyn Script>>,
}

impl Default for RulesDb {
    fn default() -> Self {
        Self::new()
    }
}

impl RulesDb {
    pub fn new() -> Self {
        let mut topics = BTreeMap::new();
        topics.insert(DEFAULT_TOPIC.to_string(), Topic::new(DEFAULT_TOPIC));
        RulesDb { topics, scripts: Vec::new() }
    }

    /// Build a database from `scripts`.
    ///
    /// Scripts without a topic are skipped. Every remaining script's `setup`
    /// runs before any rule is compiled, so patterns can reference bot
    /// variables set by any script. Fails on the first bad alternate or
    /// pattern, or if no script contributed a rule.
    pub fn load(scripts: Vec<Box<dyn Script>>, bot: &mut Variables) -> Result<Self> {
        let candidates = scripts.len();
        let mut db = RulesDb::new();
        db.scripts = scripts
            .into_iter()
            .filter(|script| {
                let keep = script.topic().is_some();
                if !keep {
                    debug!("[rules] skipping {}, it has no topic", script.name());
                }
                keep
            })
            .collect();

        for script in db.scripts.iter_mut() {
            script.setup(bot);
        }

        let mut total = 0;
        for script in &db.scripts {
            let topic_name = script.topic().unwrap_or(DEFAULT_TOPIC).to_string();
            let built = script.build();

            let mut alternates = Variables::new();
            for (key, raw) in &built.alternates {
                let pattern = Pattern::simple(raw).map_err(|source| Error::Alternate {
                    script: script.name().to_string(),
                    key: key.clone(),
                    source,
                })?;
                alternates.insert(key.to_lowercase(), Value::Text(pattern.formatted().to_string()));
            }

            let topic = db.topics.entry(topic_name.clone()).or_insert_with(|| Topic::new(&topic_name));
            for def in built.rules {
                let name = format!("{}.{}", script.name(), def.name);
                let rule = Rule::new(name, def, &alternates, bot)?;
                if topic.insert(rule) {
                    total += 1;
                }
            }
            for sub in built.substitutions {
                topic.add_substitution(sub);
            }
            debug!("[rules] loaded {} into topic \"{}\"", script.name(), topic_name);
        }

        if total == 0 {
            return Err(Error::NoRulesFound(candidates));
        }
        info!("[rules] loaded {} rule(s) in {} topic(s) from {} script(s)", total, db.topics.len(), db.scripts.len());
        db.sort_rules();
        Ok(db)
    }

    /// Drop every topic and script, leaving an empty default topic.
    pub fn clear(&mut self) {
        *self = RulesDb::new();
    }

    /// Sort every topic that has unsorted rules.
    pub fn sort_rules(&mut self) {
        for topic in self.topics.values_mut() {
            topic.sort_rules();
        }
    }

    pub fn topic(&self, name: &str) -> Option<&Topic> {
        self.topics.get(name)
    }

    pub fn has_topic(&self, name: &str) -> bool {
        self.topics.contains_key(name)
    }

    pub fn topic_names(&self) -> impl Iterator<Item = &str> {
        self.topics.keys().map(String::as_str)
    }

    pub fn scripts(&self) -> &[Box<dyn Script>] {
        &self.scripts
    }

    /// Hand back the scripts, leaving the database cleared.
    pub fn take_scripts(&mut self) -> Vec<Box<dyn Script>> {
        let scripts = std::mem::take(&mut self.scripts);
        self.clear();
        scripts
    }

    pub fn rule_count(&self) -> usize {
        self.topics.values().map(Topic::len).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ScriptRules;

    struct Colors;

    impl Script for Colors {
        fn name(&self) -> &str {
            "colors"
        }

        fn setup(&mut self, bot: &mut Variables) {
            bot.insert("mood".into(), "Good".into());
        }

        fn build(&self) -> ScriptRules {
            ScriptRules::new()
                .alternate("Colors", "( Red | green|BLUE )")
                .rule(rule! { name: "favorite", pattern: "my _* is _%a:colors", reply: |_c| "" })
                .rule(rule! { name: "mood", pattern: "are you in a %b:mood mood", reply: |_c| "" })
        }
    }

    struct Hidden;

    impl Script for Hidden {
        fn name(&self) -> &str {
            "hidden"
        }

        fn topic(&self) -> Option<&str> {
            None
        }

        fn build(&self) -> ScriptRules {
            ScriptRules::new().rule(rule! { name: "x", pattern: "x", reply: |_c| "" })
        }
    }

    struct Elsewhere;

    impl Script for Elsewhere {
        fn name(&self) -> &str {
            "elsewhere"
        }

        fn topic(&self) -> Option<&str> {
            Some("dance")
        }

        fn build(&self) -> ScriptRules {
            ScriptRules::new().rule(rule! { name: "y", pattern: "y", reply: |_c| "" })
        }
    }

    struct BadAlternate;

    impl Script for BadAlternate {
        fn name(&self) -> &str {
            "bad"
        }

        fn build(&self) -> ScriptRules {
            ScriptRules::new().alternate("oops", "_*").rule(rule! { name: "x", pattern: "x", reply: |_c| "" })
        }
    }

    #[test]
    fn loads_topics_and_resolves_variables() {
        let mut bot = Variables::new();
        let db = RulesDb::load(vec![Box::new(Colors), Box::new(Hidden), Box::new(Elsewhere)], &mut bot).unwrap();
        assert_eq!(bot.get("mood"), Some(&Value::from("Good")));
        assert_eq!(db.topic_names().collect::<Vec<_>>(), vec!["all", "dance"]);
        assert_eq!(db.scripts().len(), 2);
        assert_eq!(db.rule_count(), 3);

        let all = db.topic("all").unwrap();
        assert!(all.is_sorted());
        let favorite = all.rules().iter().find(|r| r.name() == "colors.favorite").unwrap();
        assert!(favorite.pattern().is_match("my car is green", Default::default()));
        let mood = all.rules().iter().find(|r| r.name() == "colors.mood").unwrap();
        assert!(mood.pattern().is_match("are you in a good mood", Default::default()));
    }

    #[test]
    fn zero_rules_is_an_error() {
        let mut bot = Variables::new();
        let err = RulesDb::load(vec![Box::new(Hidden)], &mut bot).err().unwrap();
        assert!(matches!(err, Error::NoRulesFound(1)));
    }

    #[test]
    fn alternates_must_be_simple() {
        let mut bot = Variables::new();
        let err = RulesDb::load(vec![Box::new(BadAlternate)], &mut bot).err().unwrap();
        match err {
            Error::Alternate { script, key, .. } => assert_eq!((script.as_str(), key.as_str()), ("bad", "oops")),
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn clear_keeps_the_default_topic() {
        let mut bot = Variables::new();
        let mut db = RulesDb::load(vec![Box::new(Elsewhere), Box::new(Colors)], &mut bot).unwrap();
        let scripts = db.take_scripts();
        assert_eq!(scripts.len(), 2);
        assert!(db.has_topic("all"));
        assert!(!db.has_topic("dance"));
        assert_eq!(db.rule_count(), 0);
    }
}
