use crate::script::{RuleContext, Script, ScriptRules, Substitution};
use crate::{Value, Variables};

const BODY_PARTS: [&str; 5] = ["right foot", "left foot", "right arm", "left arm", "whole self"];

/// Bot variables, previous-reply rules and the way into the `dance` topic.
pub struct HokeyPokeyScript;

impl HokeyPokeyScript {
    pub fn new() -> Self {
        HokeyPokeyScript
    }
}

impl Default for HokeyPokeyScript {
    fn default() -> Self {
        Self::new()
    }
}

fn bot_text(ctx: &RuleContext<'_>, name: &str) -> String {
    ctx.bot_vars().get(name).map(Value::to_string).unwrap_or_default()
}

fn next_body_part(part: &str) -> &'static str {
    let idx = BODY_PARTS.iter().position(|p| *p == part).unwrap_or(BODY_PARTS.len() - 1);
    BODY_PARTS[(idx + 1) % BODY_PARTS.len()]
}

fn has_danced(ctx: &RuleContext<'_>) -> bool {
    ctx.bot_vars().get("danced").and_then(Value::as_bool).unwrap_or(false)
}

impl Script for HokeyPokeyScript {
    fn name(&self) -> &str {
        "dance"
    }

    fn setup(&mut self, bot: &mut Variables) {
        bot.insert("mood".to_string(), Value::from("good"));
        bot.insert("bodypart".to_string(), Value::from(BODY_PARTS[0]));
        bot.insert("danced".to_string(), Value::from(false));
    }

    fn build(&self) -> ScriptRules {
        ScriptRules::new()
            .rule(rule! {
                name: "help_fun_stuff",
                pattern: "help (hokey pokey|fun stuff|knock knock|jokes)",
                reply: |_ctx| vec![
                    "Tell me a knock knock joke please!",
                    "Do you know any knock knock jokes? Tell me one.",
                    "Ask me if I can do the hokey pokey.",
                ],
            })
            .rule(rule! {
                name: "help_dancing",
                pattern: "help (dancing|dance)",
                reply: |_ctx| "Say \"let's go dancing\" and I'll show you some moves.",
            })
            .rule(rule! {
                name: "how_are_you_doing",
                pattern: "how are you doing",
                reply: |ctx| format!("I'm in a {} mood.", bot_text(ctx, "mood")),
            })
            .rule(rule! {
                name: "get_grumpy",
                pattern: "get grumpy",
                reply: |ctx| {
                    ctx.bot_vars_mut().insert("mood".to_string(), Value::from("bad"));
                    "Now I'm grouchy."
                },
            })
            .rule(rule! {
                name: "get_happy",
                pattern: "get happy",
                reply: |ctx| {
                    ctx.bot_vars_mut().insert("mood".to_string(), Value::from("good"));
                    "I feel much better."
                },
            })
            .rule(rule! {
                name: "hey",
                pattern: "hey [there]",
                reply: |ctx| if bot_text(ctx, "mood") == "good" { "<hello>" } else { "Hay is for horses." },
            })
            .rule(rule! { name: "knock_knock", pattern: "knock knock", reply: |_ctx| "Who's there?" })
            .rule(rule! { name: "whos_there", pattern: "_*", previous: "whos there", reply: |_ctx| "{raw_match0} who?" })
            .rule(rule! {
                name: "punchline",
                pattern: "_*",
                previous: "* who",
                reply: |_ctx| "Lol {raw_match0}! That's a good one!",
            })
            .rule(rule! {
                name: "put_your_thing_in",
                pattern: "put your _* in",
                reply: |_ctx| "I put my {match0} in, I put my {match0} out, I shake it all about!",
            })
            .rule(rule! {
                name: "where_in_the_dance",
                pattern: "where are you in the dance",
                reply: |ctx| format!("I'm about to use my {}.", bot_text(ctx, "bodypart")),
            })
            .rule(rule! {
                name: "back_to_the_right_foot",
                pattern: "back to the right foot",
                reply: |ctx| {
                    ctx.bot_vars_mut().insert("bodypart".to_string(), Value::from(BODY_PARTS[0]));
                    "OK, I'm back on the right foot."
                },
            })
            .rule(rule! {
                name: "what_comes_next",
                pattern: "what would the next one be",
                reply: |ctx| {
                    let part = bot_text(ctx, "bodypart");
                    format!("After {part} comes {}.", next_body_part(&part))
                },
            })
            .rule(rule! {
                name: "skip_to_the_next_one",
                pattern: "skip to the next one",
                reply: |ctx| {
                    let next = next_body_part(&bot_text(ctx, "bodypart"));
                    ctx.bot_vars_mut().insert("bodypart".to_string(), Value::from(next));
                    format!("OK, when I dance I'll use my {next}.")
                },
            })
            .rule(rule! {
                name: "do_the_hokey_pokey",
                pattern: "[*] do the hokey pokey",
                reply: |ctx| {
                    let part = bot_text(ctx, "bodypart");
                    let vars = ctx.bot_vars_mut();
                    vars.insert("danced".to_string(), Value::from(true));
                    vars.insert("bodypart".to_string(), Value::from(next_body_part(&part)));
                    format!("<put your {part} in>")
                },
            })
            .rule(rule! {
                name: "have_you_done_the_hokey_pokey",
                pattern: "(have you done|did you do) the hokey pokey",
                reply: |ctx| if has_danced(ctx) { "Yes!" } else { "No, but I'd like to!" },
            })
            .rule(rule! {
                name: "do_you_know_the_hokey_pokey",
                pattern: "do you know [how to do] the hokey pokey",
                reply: |ctx| if has_danced(ctx) { "Yes!" } else { "I think so! I'd like to try!" },
            })
            .rule(rule! {
                name: "go_dancing",
                pattern: "[lets] go dancing",
                reply: |ctx| {
                    ctx.set_topic("dance");
                    "Let's dance! Tell me when you're done dancing. <dance move>"
                },
            })
    }
}

/// The `dance` topic. Everything said here is answered with dance moves
/// until the user is done.
pub struct DanceFloorScript;

impl Script for DanceFloorScript {
    fn name(&self) -> &str {
        "dancefloor"
    }

    fn topic(&self) -> Option<&str> {
        Some("dance")
    }

    fn build(&self) -> ScriptRules {
        ScriptRules::new()
            .substitution(Substitution::new("dancefloor.contractions", expand_contractions))
            .rule(rule! {
                name: "dance_move",
                pattern: "dance move",
                reply: |_ctx| vec!["Spin around!", "Step to the left!", "Shuffle your feet!", "Wave your arms!"],
            })
            .rule(rule! { name: "star", pattern: "*", reply: |_ctx| "Less talking, more dancing! <dance move>" })
            .rule(rule! {
                name: "cant_dance",
                pattern: "i (can not|do not know how to) dance",
                reply: |_ctx| "Sure you can! Just follow me. <dance move>",
            })
            .rule(rule! {
                name: "done",
                pattern: "[i am] (done|finished|tired) [dancing]",
                reply: |ctx| {
                    ctx.set_topic("all");
                    "Thanks for the dance!"
                },
            })
            .rule(rule! { name: "help", pattern: "help [*]", reply: |_ctx| "Say \"done dancing\" when you want to stop." })
    }
}

/// Expand a few contractions into separate words.
fn expand_contractions(_text: &str, lists: Vec<Vec<String>>) -> Vec<Vec<String>> {
    lists
        .into_iter()
        .map(|list| {
            list.into_iter()
                .map(|word| {
                    let expanded = match word.to_lowercase().as_str() {
                        "don't" => "do not",
                        "can't" => "can not",
                        "won't" => "will not",
                        "i'm" => "i am",
                        "you're" => "you are",
                        "i've" => "i have",
                        _ => return word,
                    };
                    expanded.to_string()
                })
                .collect()
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn body_parts_wrap_around() {
        assert_eq!(next_body_part("right foot"), "left foot");
        assert_eq!(next_body_part("whole self"), "right foot");
        assert_eq!(next_body_part("elbow"), "right foot");
    }

    #[test]
    fn contractions_keep_the_list_count() {
        let lists = vec![vec!["I'm".to_string()], vec!["fine,".to_string()], vec!["Don't".to_string()]];
        let out = expand_contractions("I'm fine, Don't", lists);
        assert_eq!(out, vec![vec!["i am".to_string()], vec!["fine,".to_string()], vec!["do not".to_string()]]);
    }
}
