//! The reply engine.
//!
//! ```text
//! reply(user, message)
//!   │  sort topics if needed, find or create UserInfo (setup_user on first contact)
//!   v
//! Session::reply_at(message, depth 0)                  (session.rs)
//!   │  Target::new with the topic's substitutions
//!   │  first rule in sorted order whose patterns match
//!   │  handler(RuleContext) -> Reply -> pick -> fill {placeholders}
//!   │  revert topic changes to unknown topics
//!   v
//! "<ref a> and <ref b>" ── reply_at(ref, depth + 1) for each, spliced back
//!   │
//!   v
//! UserInfo::remember(message, reply)                   (user.rs)
//! ```
//!
//! Replies can reference other replies, so a pair of rules that reference each
//! other would loop forever; `Options::depth_limit` stops that with
//! [`Error::RecursionTooDeep`].
//!
//! The engine is single threaded. Rule handlers get mutable access to the
//! user's state and to the bot variables through their [`RuleContext`](crate::RuleContext).
//!
//! - `session.rs`: the recursive search for one `reply` call.
//! - `user.rs`: per-user state and bounded history.
//! - `metrics.rs`: per-step traces for [`Engine::reply_verbose`].

#[path = "engine/metrics.rs"]
mod metrics;
#[path = "engine/session.rs"]
mod session;
#[path = "engine/user.rs"]
mod user;


use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::time::Instant;

use log::{info, warn};
use rand::SeedableRng;
use rand::rngs::StdRng;

pub use metrics::ReplyStep;
pub use user::UserInfo;

use crate::api::{Options, ReplyDetails};
use crate::error::Result;
use crate::rules::{RulesDb, Topic};
use crate::script::Script;
use crate::target::Target;
use crate::{DEFAULT_TOPIC, Variables};
use session::Session;

pub struct Engine {
    rules: RulesDb,
    bot: Variables,
    users: HashMap<String, UserInfo>,
    options: Options,
    rng: StdRng,
}

impl Default for Engine {
    fn default() -> Self {
        Self::new()
    }
}

impl Engine {
    pub fn new() -> Self {
        Self::with_options(Options::default())
    }

    pub fn with_options(options: Options) -> Self {
        let rng = match options.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Engine { rules: RulesDb::new(), bot: Variables::new(), users: HashMap::new(), options, rng }
    }

    pub fn options(&self) -> &Options {
        &self.options
    }

    /// Replace all rules with the ones `scripts` declare. Returns the number of rules loaded.
    ///
    /// The old rules are cleared first, so after a failed load the engine has
    /// no rules. Bot variables and users are kept.
    pub fn load_scripts(&mut self, scripts: Vec<Box<dyn Script>>) -> Result<usize> {
        self.rules.clear();
        self.rules = RulesDb::load(scripts, &mut self.bot)?;
        Ok(self.rules.rule_count())
    }

    /// Load the current scripts again, rerunning their `setup`.
    pub fn reload(&mut self) -> Result<usize> {
        let scripts = self.rules.take_scripts();
        self.load_scripts(scripts)
    }

    pub fn clear_rules(&mut self) {
        self.rules.clear();
    }

    pub fn rules(&self) -> &RulesDb {
        &self.rules
    }

    pub fn topics(&self) -> impl Iterator<Item = &str> {
        self.rules.topic_names()
    }

    /// Reply to `message` from `user_id`.
    pub fn reply(&mut self, user_id: &str, message: &str) -> Result<String> {
        self.run(user_id, message, None)
    }

    /// Like [`reply`](Self::reply), also returning a trace of every rule search.
    pub fn reply_verbose(&mut self, user_id: &str, message: &str) -> Result<ReplyDetails> {
        let started = Instant::now();
        let mut steps = Vec::new();
        let reply = self.run(user_id, message, Some(&mut steps))?;
        let topic_before = steps.first().map(|s| s.topic.clone()).unwrap_or_else(|| DEFAULT_TOPIC.to_string());
        let topic_after = self.users.get(user_id).map(|u| u.topic.clone()).unwrap_or_else(|| DEFAULT_TOPIC.to_string());

        Ok(ReplyDetails {
            user: user_id.to_string(),
            message: message.to_string(),
            reply,
            topic_before,
            topic_after,
            steps,
            total: started.elapsed(),
        })
    }

    fn run(&mut self, user_id: &str, message: &str, trace: Option<&mut Vec<ReplyStep>>) -> Result<String> {
        self.rules.sort_rules();
        let Engine { rules, bot, users, options, rng } = self;

        let user = match users.entry(user_id.to_string()) {
            Entry::Occupied(entry) => entry.into_mut(),
            Entry::Vacant(entry) => {
                let mut info = UserInfo::new(options.history_len);
                for script in rules.scripts() {
                    script.setup_user(user_id, &mut info.vars);
                }
                info!("[engine] new user {user_id}");
                entry.insert(info)
            }
        };
        if !rules.has_topic(&user.topic) {
            warn!(
                "[engine] user {user_id} was in topic \"{}\" which no longer exists, using \"{DEFAULT_TOPIC}\"",
                user.topic
            );
            user.topic = DEFAULT_TOPIC.to_string();
        }

        let mut session = Session {
            rules,
            bot,
            user_id,
            user: &mut *user,
            rng,
            depth_limit: options.depth_limit,
            message,
            trace,
        };
        let reply = session.reply_at(message, 0)?;

        let substitutions = rules.topic(&user.topic).map(Topic::substitutions).unwrap_or_default();
        let message_target = Target::new(message, substitutions)?;
        let reply_target = Target::new(&reply, substitutions)?;
        user.remember(message_target, reply_target);
        Ok(reply)
    }

    pub fn user(&self, user_id: &str) -> Option<&UserInfo> {
        self.users.get(user_id)
    }

    pub fn user_mut(&mut self, user_id: &str) -> Option<&mut UserInfo> {
        self.users.get_mut(user_id)
    }

    /// Forget a user. Their next message runs `setup_user` again.
    pub fn clear_user(&mut self, user_id: &str) -> bool {
        self.users.remove(user_id).is_some()
    }

    pub fn bot_vars(&self) -> &Variables {
        &self.bot
    }

    pub fn bot_vars_mut(&mut self) -> &mut Variables {
        &mut self.bot
    }
}
