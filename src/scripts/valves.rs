use crate::script::{RuleContext, Script, ScriptRules};
use crate::{Value, Variables};

const MAIN_VALVE: &str = "mainvalvestatus";
const DRAIN_VALVE: &str = "drainvalvestatus";
const LEAK_SENSOR: &str = "leaksensorstatus";

const STALLS: [&str; 3] = [
    ". Give it a few seconds and text me 'status' and I'll let you know how the valves are doing.",
    ". Give me just a moment, then text me 'status' to make sure it worked.",
    ", and in a few seconds please text me 'status' to check on the valves.",
];

/// A pretend water system: a shutoff valve, a drain valve and a leak sensor,
/// all kept in bot variables.
pub struct ValveScript;

fn status(ctx: &RuleContext<'_>, name: &str) -> String {
    ctx.bot_vars().get(name).map(Value::to_string).unwrap_or_default()
}

fn set_status(ctx: &mut RuleContext<'_>, name: &str, value: &str) {
    ctx.bot_vars_mut().insert(name.to_string(), Value::from(value));
}

/// Closed valves report "closed", so "close" becomes "closed".
fn tell_valve(ctx: &mut RuleContext<'_>, name: &str, action: &str) {
    let state = if action == "close" { "closed" } else { action };
    set_status(ctx, name, state);
}

fn stall_for_time(ctx: &mut RuleContext<'_>) -> &'static str {
    ctx.choose(&STALLS).copied().unwrap_or(STALLS[0])
}

impl Script for ValveScript {
    fn name(&self) -> &str {
        "valves"
    }

    fn setup(&mut self, bot: &mut Variables) {
        bot.insert(LEAK_SENSOR.to_string(), Value::from("dry"));
        bot.insert(MAIN_VALVE.to_string(), Value::from("closed"));
        bot.insert(DRAIN_VALVE.to_string(), Value::from("open"));
    }

    fn build(&self) -> ScriptRules {
        ScriptRules::new()
            .alternate("mainvalve", "((shutoff|shut off|main [water]|city water) valve)")
            .alternate("drainvalve", "([water] drain valve)")
            .alternate("anyvalve", "((shutoff|shut off|main|main water|city water|[water] drain) valve)")
            .rule(rule! {
                name: "help_valves",
                pattern: "help [on] (valve|valves|water valves|%a:anyvalve)",
                reply: |_ctx| vec![
                    "I can turn the water on and off and drain the house by controlling the shutoff valve and the \
                     drain valve. Ask me \"What is the valve status?\" to get started.",
                    "Try telling me to turn the water on or off or to drain the house.",
                    "If you tell me \"sensor wet\" I'll pretend the leak sensor in the bathroom is wet. Then try \
                     telling me \"Turn the water on\" and see what I do.",
                ],
            })
            .rule(rule! {
                name: "open_main",
                pattern: "open [the] _%a:mainvalve",
                reply: |ctx| {
                    if status(ctx, DRAIN_VALVE) == "open" {
                        return "The drain valve is open. Please close it before opening the {match0}.".into();
                    }
                    if status(ctx, LEAK_SENSOR) == "wet" {
                        return "<leak sensor status> Please dry it and reset it before opening the {match0}.".into();
                    }
                    tell_valve(ctx, MAIN_VALVE, "open");
                    format!("I'll tell the {{match0}} to open{}", stall_for_time(ctx))
                },
            })
            .rule(rule! {
                name: "open_drain",
                pattern: "open [the] _%a:drainvalve",
                reply: |ctx| {
                    if status(ctx, MAIN_VALVE) == "open" {
                        return "The shutoff valve is open. Please close it first.".into();
                    }
                    tell_valve(ctx, DRAIN_VALVE, "open");
                    format!("I'll tell the {{match0}} to open{}", stall_for_time(ctx))
                },
            })
            .rule(rule! {
                name: "close_main",
                pattern: "close [the] _%a:mainvalve",
                reply: |ctx| {
                    tell_valve(ctx, MAIN_VALVE, "close");
                    format!("I'll tell the {{match0}} to close{}", stall_for_time(ctx))
                },
            })
            .rule(rule! {
                name: "close_drain",
                pattern: "close [the] _%a:drainvalve",
                reply: |ctx| {
                    tell_valve(ctx, DRAIN_VALVE, "close");
                    format!("I will tell the {{match0}} to close{}", stall_for_time(ctx))
                },
            })
            .rule(rule! {
                name: "open_close_it_both_mentioned",
                pattern: "_(open|close) it",
                previous: "([*] %a:mainvalve [*] %a:drainvalve [*]|[*] %a:drainvalve [*] %a:mainvalve [*])",
                reply: |_ctx| vec!["What do you want me to {match0}?", "Which valve would you like to {match0}?"],
            })
            .rule(rule! {
                name: "open_close_it_one_mentioned",
                pattern: "_(open|close) it",
                previous: "* _%a:anyvalve [*]",
                reply: |_ctx| "<{match0} the {reply_match0}>",
            })
            .rule(rule! { name: "open_close", pattern: "_(open|close) [it]", reply: |_ctx| "What do you want me to {match0}?" })
            .rule(rule! {
                name: "which_valve",
                pattern: "[the] _%a:anyvalve",
                previous: "(what do you want me|which valve would you like) to _(open|close)",
                reply: |_ctx| "OK, <{reply_match0} the {match0}>",
            })
            .rule(rule! {
                name: "water_on",
                pattern: "[turn [the]] water on",
                reply: |ctx| {
                    if status(ctx, MAIN_VALVE) == "open" {
                        return "It's already on.".into();
                    }
                    if status(ctx, LEAK_SENSOR) == "wet" {
                        return "<leak sensor status> Please dry it and reset it before turning the water on.".into();
                    }
                    if status(ctx, DRAIN_VALVE) == "open" {
                        tell_valve(ctx, DRAIN_VALVE, "close");
                        return "I closed the drain valve and <open shutoff valve>".into();
                    }
                    "<open shutoff valve>"
                },
            })
            .rule(rule! { name: "water_off", pattern: "[turn [the]] water off", reply: |_ctx| "<close shutoff valve>" })
            .rule(rule! {
                name: "drain",
                pattern: "drain [the] (water|house)",
                reply: |ctx| {
                    if status(ctx, DRAIN_VALVE) == "open" {
                        return "It's already drained.".into();
                    }
                    if status(ctx, MAIN_VALVE) == "open" {
                        tell_valve(ctx, MAIN_VALVE, "close");
                        return "I closed the main valve and <open drain valve>".into();
                    }
                    "<open drain valve>"
                },
            })
            .rule(rule! {
                name: "sensor_status",
                pattern: "[what is [the]] (water|leak) sensor status",
                reply: |ctx| format!("The water leak sensor is {}.", status(ctx, LEAK_SENSOR)),
            })
            .rule(rule! {
                name: "main_status",
                pattern: "_%a:mainvalve status",
                reply: |ctx| format!("The {{match0}} is {}.", status(ctx, MAIN_VALVE)),
            })
            .rule(rule! {
                name: "drain_status",
                pattern: "_%a:drainvalve status",
                reply: |ctx| format!("The {{match0}} is {}.", status(ctx, DRAIN_VALVE)),
            })
            .rule(rule! {
                name: "valve_status",
                pattern: "[tell me about|how is|what is] [the] valve status",
                reply: |_ctx| "<shutoff valve status> <drain valve status>",
            })
            .rule(rule! { name: "status", pattern: "status", reply: |_ctx| "<valve status> <water sensor status>" })
            .rule(rule! {
                name: "any_valve_status",
                pattern: "(tell me about the|how is the|what is [the]) _%a:anyvalve [status]",
                reply: |_ctx| "<{match0} status>",
            })
            .rule(rule! {
                name: "is_valve_open",
                pattern: "is the _%a:anyvalve (open|closed)",
                reply: |_ctx| "<{match0} status>",
            })
            .rule(rule! {
                name: "sensor_wet",
                pattern: "sensor wet",
                reply: |ctx| {
                    set_status(ctx, LEAK_SENSOR, "wet");
                    "Now the leak sensor is wet."
                },
            })
            .rule(rule! {
                name: "sensor_dry",
                pattern: "sensor dry",
                reply: |ctx| {
                    set_status(ctx, LEAK_SENSOR, "dry");
                    "Now the leak sensor is dry."
                },
            })
    }
}
