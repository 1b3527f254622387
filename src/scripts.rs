//! Built-in example scripts.
//!
//! - `tutorial.rs`: a tour of the pattern language.
//! - `dance.rs`: bot variables, previous-reply rules (knock knock jokes) and
//!   a `dance` topic with its own substitutions.
//! - `valves.rs`: alternates, and a pretend water-valve controller kept in
//!   bot variables.

#[path = "scripts/dance.rs"]
mod dance;
#[path = "scripts/tutorial.rs"]
mod tutorial;
#[path = "scripts/valves.rs"]
mod valves;

pub use dance::{DanceFloorScript, HokeyPokeyScript};
pub use tutorial::TutorialScript;
pub use valves::ValveScript;

use crate::script::Script;

/// Every built-in script, ready for [`Engine::load_scripts`](crate::Engine::load_scripts).
pub fn builtin() -> Vec<Box<dyn Script>> {
    vec![
        Box::new(TutorialScript::new()),
        Box::new(HokeyPokeyScript::new()),
        Box::new(DanceFloorScript),
        Box::new(ValveScript),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Engine, Options};

    fn engine() -> Engine {
        let _ = env_logger::builder().is_test(true).try_init();
        let mut engine = Engine::with_options(Options { seed: Some(7), ..Options::default() });
        engine.load_scripts(builtin()).unwrap();
        engine
    }

    #[test]
    fn builtin_scripts_load() {
        let engine = engine();
        assert_eq!(engine.topics().collect::<Vec<_>>(), vec!["all", "dance"]);
        assert!(engine.rules().rule_count() > 50);
    }

    #[test]
    fn tutorial_conversation() {
        let mut engine = engine();
        assert_eq!(engine.reply("u", "Hello robot").unwrap(), "Hello, carbon-based life form!");
        assert_eq!(engine.reply("u", "I am 42 years old").unwrap(), "42 isn't old at all!");
        assert_eq!(
            engine.reply("u", "I am forty two years old").unwrap(),
            "Tell me that again, but with a number this time."
        );
        assert_eq!(engine.reply("u", "My car is Green").unwrap(), "I've always wanted a green car.");
        assert_eq!(engine.reply("u", "What color is my blue bike?").unwrap(), "According to you, your bike is blue.");
        assert_eq!(
            engine.reply("u", "My name is Fred Flintstone!").unwrap(),
            "It's nice to meet you, Fred Flintstone."
        );
        assert_eq!(engine.reply("u", "Is my name Fred Flintstone").unwrap(), "That's what you told me!");
        assert!(!engine.reply("u", "hi").unwrap().is_empty());
    }

    #[test]
    fn knock_knock() {
        let mut engine = engine();
        assert_eq!(engine.reply("u", "Knock knock").unwrap(), "Who's there?");
        assert_eq!(engine.reply("u", "Lettuce").unwrap(), "Lettuce who?");
        assert_eq!(engine.reply("u", "Lettuce in, it's cold!").unwrap(), "Lol Lettuce in, it's cold!! That's a good one!");
    }

    #[test]
    fn hokey_pokey_walks_the_body_parts() {
        let mut engine = engine();
        assert_eq!(engine.reply("u", "Have you done the hokey pokey?").unwrap(), "No, but I'd like to!");
        assert_eq!(
            engine.reply("u", "Can you do the hokey pokey?").unwrap(),
            "I put my right foot in, I put my right foot out, I shake it all about!"
        );
        assert_eq!(engine.reply("u", "Where are you in the dance?").unwrap(), "I'm about to use my left foot.");
        assert_eq!(engine.reply("u", "Did you do the hokey pokey").unwrap(), "Yes!");
    }

    #[test]
    fn dance_topic_round_trip() {
        let mut engine = engine();
        engine.reply("u", "Let's go dancing").unwrap();
        assert_eq!(engine.user("u").unwrap().topic, "dance");
        assert!(engine.reply("u", "I can't dance").unwrap().starts_with("Sure you can! Just follow me. "));
        engine.reply("u", "I'm done dancing").unwrap();
        assert_eq!(engine.user("u").unwrap().topic, "all");
    }

    #[test]
    fn valves_follow_up_questions() {
        let mut engine = engine();
        assert_eq!(engine.reply("u", "What is the shutoff valve status?").unwrap(), "The shutoff valve is closed.");
        assert_eq!(
            engine.reply("u", "Open it").unwrap(),
            "The drain valve is open. Please close it before opening the shutoff valve."
        );
        let which = engine.reply("u", "close it").unwrap();
        assert!(which == "What do you want me to close?" || which == "Which valve would you like to close?");
        assert!(engine.reply("u", "the drain valve").unwrap().starts_with("OK, I will tell the drain valve to close"));
        assert_eq!(engine.reply("u", "drain valve status").unwrap(), "The drain valve is closed.");
        assert!(engine.reply("u", "turn the water on").unwrap().starts_with("I'll tell the shutoff valve to open"));
        assert_eq!(
            engine.reply("u", "status").unwrap(),
            "The shutoff valve is open. The drain valve is closed. The water leak sensor is dry."
        );
    }

    #[test]
    fn leak_sensor_blocks_the_water() {
        let mut engine = engine();
        assert_eq!(engine.reply("u", "sensor wet").unwrap(), "Now the leak sensor is wet.");
        assert_eq!(
            engine.reply("u", "turn the water on").unwrap(),
            "The water leak sensor is wet. Please dry it and reset it before turning the water on."
        );
        assert_eq!(engine.bot_vars()["mainvalvestatus"].to_string(), "closed");
    }
}
