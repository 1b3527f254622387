use crate::script::{Script, ScriptRules};
use crate::{Reply, Value};

/// A tour of the pattern language, one rule per feature.
pub struct TutorialScript {
    help_ideas: Vec<&'static str>,
}

impl TutorialScript {
    pub fn new() -> Self {
        TutorialScript { help_ideas: vec!["valve", "fun stuff", "dancing"] }
    }
}

impl Default for TutorialScript {
    fn default() -> Self {
        Self::new()
    }
}

impl Script for TutorialScript {
    fn name(&self) -> &str {
        "tutorial"
    }

    fn build(&self) -> ScriptRules {
        let ideas = self.help_ideas.clone();
        ScriptRules::new()
            .alternate("colors", "(red|yellow|orange|green|blue|indigo|violet)")
            .rule(rule! {
                name: "random_help",
                pattern: "random help",
                reply: |ctx| format!("<help {}>", ctx.choose(&ideas).copied().unwrap_or("fun stuff")),
            })
            .rule(rule! {
                name: "star",
                pattern: "*",
                reply: |_ctx| vec!["I don't understand that. <random help>", "Let's change the subject. <random help>"],
            })
            .rule(rule! { name: "hello_robot", pattern: "hello robot", reply: |_ctx| "Hello, carbon-based life form!" })
            .rule(rule! {
                name: "how_are_you",
                pattern: "how are you",
                weight: 2,
                reply: |_ctx| vec!["I'm great, how are you?", "Doing awesome, you?", "Great! You?", "I'm fine, thanks for asking!"],
            })
            .rule(rule! {
                name: "say_something_random",
                pattern: "say something random",
                reply: |ctx| {
                    let word = ctx.choose(&["it's fun", "potato"]).copied().unwrap_or("potato");
                    format!("I like being random because {word}.")
                },
            })
            .rule(rule! {
                name: "greetings",
                pattern: "greetings",
                reply: |_ctx| vec![("Hello!", 20), ("Buenas dias!", 25), ("Buongiorno!", 1)],
            })
            .rule(rule! {
                name: "told_me_to_say",
                pattern: "_* told me to say _*",
                reply: |_ctx| vec![
                    "Why would {raw_match0} tell you to say \"{match1}\"?",
                    "Are you just saying \"{match1}\" because {raw_match0} told you to?",
                ],
            })
            .rule(rule! { name: "age_number", pattern: "i am _#1 years old", reply: |_ctx| "{match0} isn't old at all!" })
            .rule(rule! { name: "who_is", pattern: "who is _*", reply: |_ctx| "I don't know who {match0} is." })
            .rule(rule! {
                name: "age_words",
                pattern: "i am @~3 years old",
                reply: |_ctx| "Tell me that again, but with a number this time.",
            })
            .rule(rule! { name: "age_any", pattern: "i am * years old", reply: |_ctx| "Can you use a number instead?" })
            .rule(rule! { name: "are_you_a_bot", pattern: "are you a (bot|robot|computer|machine)", reply: |_ctx| "Darn! You got me!" })
            .rule(rule! {
                name: "excited",
                pattern: "i am _(so|really|very) excited",
                reply: |_ctx| "What are you {match0} excited about?",
            })
            .rule(rule! {
                name: "favorite_color",
                pattern: "i _(like|love) the color _*",
                reply: |_ctx| vec![
                    "What a coincidence! I {match0} that color too!",
                    "The color {match1} is one of my favorites",
                    "Really? I {match0} the color {match1} too!",
                    "Oh I {match0} {match1} too!",
                ],
            })
            .rule(rule! { name: "how_you", pattern: "how [are] you", reply: |_ctx| "I'm great, you?" })
            .rule(rule! {
                name: "phone_number",
                pattern: "what is your (home|office|cell) [phone] number",
                reply: |_ctx| "You can reach me at: 1 (800) 555-1234.",
            })
            .rule(rule! { name: "car", pattern: "i have a [red|green|blue] car", reply: |_ctx| "I bet you like your car a lot." })
            .rule(rule! { name: "matrix", pattern: "[*] the matrix [*]", reply: |_ctx| "How do you know about the matrix?" })
            .rule(rule! {
                name: "what_color",
                pattern: "what color is my _(red|blue|green|yellow) _*",
                reply: |_ctx| "According to you, your {match1} is {match0}.",
            })
            .rule(rule! { name: "my_thing_color", pattern: "my _* is _%a:colors", reply: |_ctx| "I've always wanted a {match1} {match0}." })
            .rule(rule! { name: "google", pattern: "google _*", weight: 10, reply: |_ctx| "OK, I'll google it. Jk, I'm not Siri." })
            .rule(rule! { name: "or_whatever", pattern: "_* or whatever", weight: 100, reply: |_ctx| "Whatever. <{match0}>" })
            .rule(rule! { name: "hello", pattern: "hello", reply: |_ctx| vec!["Hi there!", "Hey!", "Howdy!"] })
            .rule(rule! { name: "hi", pattern: "hi", reply: |_ctx| "<hello>" })
            .rule(rule! {
                name: "my_name",
                pattern: "my name is _@~3",
                reply: |ctx| {
                    let name = ctx.raw("match0").unwrap_or_default().trim_end_matches(|c: char| c.is_ascii_punctuation()).to_string();
                    ctx.user_vars_mut().insert("name".to_string(), Value::from(name.as_str()));
                    format!("It's nice to meet you, {}.", escape_braces(&name))
                },
            })
            .rule(rule! {
                name: "what_is_my_name",
                pattern: "what is my name",
                reply: |ctx| match ctx.user_vars().get("name") {
                    None => Reply::from("You never told me your name."),
                    Some(name) => {
                        let name = escape_braces(&name.to_string());
                        Reply::from(vec![format!("Your name is {name}."), format!("You told me your name is {name}.")])
                    }
                },
            })
            .rule(rule! { name: "is_my_name", pattern: "is my name %u:name", reply: |_ctx| "That's what you told me!" })
    }
}

fn escape_braces(text: &str) -> String {
    text.replace('{', "{{").replace('}', "}}")
}
