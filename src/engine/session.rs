//! One `reply` call, from the top-level message down through every
//! `<reference>` it expands.

use std::time::Instant;

use log::{debug, info, warn};
use rand::rngs::StdRng;

use super::{ReplyStep, UserInfo};
use crate::error::{Error, Result};
use crate::pattern::Bindings;
use crate::rules::{RulesDb, Topic};
use crate::script::{RuleContext, fill_placeholders};
use crate::target::Target;
use crate::{DEFAULT_TOPIC, Variables};

/// Borrowed engine state for the duration of one reply.
pub(super) struct Session<'e> {
    pub rules: &'e RulesDb,
    pub bot: &'e mut Variables,
    pub user_id: &'e str,
    pub user: &'e mut UserInfo,
    pub rng: &'e mut StdRng,
    pub depth_limit: usize,
    /// The top-level message, for the recursion error.
    pub message: &'e str,
    pub trace: Option<&'e mut Vec<ReplyStep>>,
}

impl<'e> Session<'e> {
    /// The user's current topic, or the default topic if it has gone away.
    pub fn topic(&self) -> Option<&'e Topic> {
        let rules: &'e RulesDb = self.rules;
        rules.topic(&self.user.topic).or_else(|| rules.topic(DEFAULT_TOPIC))
    }

    /// Find the reply to `message` at `depth`, expanding references.
    pub fn reply_at(&mut self, message: &str, depth: usize) -> Result<String> {
        if depth > self.depth_limit {
            return Err(Error::RecursionTooDeep { input: self.message.to_string(), limit: self.depth_limit });
        }
        let started = Instant::now();

        let Some(topic) = self.topic() else {
            warn!("[session] no topic \"{}\" and no default topic to fall back to", self.user.topic);
            return Ok(String::new());
        };
        let topic_name = topic.name().to_string();
        let target = Target::new(message, topic.substitutions())?;
        debug!("[session] depth {depth}: searching topic \"{topic_name}\" for \"{}\"", target.normalized);

        let bindings = Bindings { alternates: None, bot: Some(&*self.bot), user: Some(&self.user.vars) };
        let mut tried = 0;
        let mut found = None;
        for rule in topic.sorted_rules() {
            tried += 1;
            if let Some(matched) = rule.matches(&target, &self.user.replies, bindings) {
                found = Some((rule, matched));
                break;
            }
        }

        let (rule_name, text) = match found {
            Some((rule, matched)) => {
                debug!("[session] matched {} with {:?}", rule.name(), matched);
                let before = self.user.topic.clone();
                let reply = {
                    let mut ctx =
                        RuleContext::new(self.user_id, &matched, &mut *self.user, &mut *self.bot, &mut *self.rng);
                    rule.call(&mut ctx)
                };
                self.check_topic_change(&before, rule.name());

                let template = reply.pick(&mut *self.rng);
                let text = fill_placeholders(&template, &matched)
                    .map_err(|reason| Error::Placeholder { rule: rule.name().to_string(), reason })?;
                (Some(rule.name().to_string()), text)
            }
            None => {
                debug!("[session] no rule matched \"{}\"", target.normalized);
                (None, String::new())
            }
        };

        if let Some(trace) = self.trace.as_deref_mut() {
            trace.push(ReplyStep {
                depth,
                topic: topic_name,
                input: message.to_string(),
                normalized: target.normalized.clone(),
                rules_tried: tried,
                rule: rule_name,
                output: text.clone(),
                duration: started.elapsed(),
            });
        }

        self.expand_references(text, depth)
    }

    /// Replace each `<reference>` with the reply to it, one level deeper.
    fn expand_references(&mut self, mut text: String, depth: usize) -> Result<String> {
        let references: Vec<(std::ops::Range<usize>, String)> = regex!(r"<(.*?)>")
            .captures_iter(&text)
            .filter_map(|caps| Some((caps.get(0)?.range(), caps.get(1)?.as_str().to_string())))
            .collect();
        if references.is_empty() {
            return Ok(text);
        }

        let mut replies = Vec::with_capacity(references.len());
        for (_, reference) in &references {
            debug!("[session] expanding <{reference}> at depth {}", depth + 1);
            replies.push(self.reply_at(reference, depth + 1)?);
        }
        // Back to front, so earlier ranges stay valid.
        for ((range, _), reply) in references.into_iter().zip(replies).rev() {
            text.replace_range(range, &reply);
        }
        Ok(text)
    }

    fn check_topic_change(&mut self, before: &str, rule: &str) {
        if self.user.topic == before {
            return;
        }
        if self.rules.has_topic(&self.user.topic) {
            info!("[session] {rule} changed topic of {} from \"{before}\" to \"{}\"", self.user_id, self.user.topic);
        } else {
            warn!(
                "[session] {rule} changed topic of {} to nonexistent \"{}\", using \"{DEFAULT_TOPIC}\"",
                self.user_id, self.user.topic
            );
            self.user.topic = DEFAULT_TOPIC.to_string();
        }
    }
}
