use super::*;
use crate::{Value, Variables};

fn pattern(raw: &str) -> Pattern {
    Pattern::new(raw, &Variables::new(), Bindings::default()).unwrap()
}

fn vars(entries: &[(&str, &str)]) -> Variables {
    entries.iter().map(|(k, v)| (k.to_string(), Value::from(*v))).collect()
}

fn matches(raw: &str, text: &str) -> bool {
    pattern(raw).is_match(text, Bindings::default())
}

#[test]
fn format_is_idempotent() {
    let cases = [
        "hello",
        "  how [are |  is]   you ",
        "_* told me to say _*",
        "i _(like|love) the color _*",
        "*2~5 @~3 #2~ [*~2]",
        "what is your (home|office|cell) [phone] number",
        "(thing [one|two])",
        "is my name %u:name",
        "_%a:mainvalve status",
        "[turn [the]] water on",
    ];
    for case in cases {
        let once = parse(case, TokenSet::FULL).unwrap().format();
        let twice = parse(&once, TokenSet::FULL).unwrap().format();
        assert_eq!(once, twice, "format not idempotent for {case:?}");
    }
}

#[test]
fn literal_words_raise_score_and_wider_wildcards_never_do() {
    let base = pattern("hello").score();
    assert!(pattern("hello there").score() > base);
    assert!(pattern("hello there friend").score() > pattern("hello there").score());

    assert!(pattern("*").score() <= pattern("*~3").score());
    assert!(pattern("*~3").score() <= pattern("*2").score());
    assert!(pattern("hello *").score() < pattern("hello there").score());
}

#[test]
fn exact_and_optional_matching() {
    assert!(matches("hello", "hello"));
    assert!(!matches("hello", "hello there"));
    assert!(!matches("hello", "say hello"));
    assert!(matches("hello [there]", "hello"));
    assert!(matches("hello [there]", "hello there"));
    assert!(!matches("hello [there]", "hello you"));
}

#[test]
fn groups_require_one_branch() {
    assert!(matches("are you a (bot|robot|computer)", "are you a robot"));
    assert!(!matches("are you a (bot|robot|computer)", "are you a"));
    assert!(matches("(thing [one|two])", "thing"));
    assert!(matches("(thing [one|two])", "thing two"));
}

#[test]
fn wildcard_repetition_bounds() {
    assert!(matches("i am _#1 years old", "i am 42 years old"));
    assert!(!matches("i am _#1 years old", "i am forty two years old"));
    assert!(matches("i am @~3 years old", "i am forty two years old"));
    assert!(!matches("i am @~3 years old", "i am 42 years old"));
    assert!(matches("*2 here", "two words here"));
    assert!(!matches("*2 here", "one here"));
    assert!(!matches("*2 here", "three more words here"));
    assert!(matches("*2~ here", "three more words here"));
    assert!(matches("[*] the matrix [*]", "the matrix"));
    assert!(matches("[*] the matrix [*]", "have you seen the matrix movie"));
}

#[test]
fn memo_captures_spans() {
    let p = pattern("_* told me to say _*");
    let text = "fred told me to say hello there";
    let caps = p.captures(text, Bindings::default()).unwrap();
    let by_name = |name: &str| {
        let cap = caps.iter().find(|c| c.name == name).unwrap();
        let (s, e) = cap.span.unwrap();
        &text[s..e]
    };
    assert_eq!(by_name("match0"), "fred");
    assert_eq!(by_name("match1"), "hello there");
}

#[test]
fn unmatched_optional_memo_has_no_span() {
    let p = pattern("my name is _@ [_@]");
    let caps = p.captures("my name is fred", Bindings::default()).unwrap();
    let second = caps.iter().find(|c| c.name == "match1").unwrap();
    assert_eq!(second.span, None);
}

#[test]
fn alternates_resolve_at_build_time() {
    let alternates = vars(&[("colors", "(red|green|blue)")]);
    let p = Pattern::new("my _* is _%a:colors", &alternates, Bindings::default()).unwrap();
    assert!(!p.is_deferred());
    assert!(p.is_match("my car is red", Bindings::default()));
    assert!(!p.is_match("my car is purple", Bindings::default()));
}

#[test]
fn missing_bot_variable_fails_the_build() {
    let err = Pattern::new("i feel %b:mood", &Variables::new(), Bindings::default()).unwrap_err();
    assert!(matches!(err, PatternError::VariableNotFound { kind: VarKind::Bot, .. }));
}

#[test]
fn user_variables_defer_compilation() {
    let p = Pattern::new("is my name %u:name", &Variables::new(), Bindings::default()).unwrap();
    assert!(p.is_deferred());

    let fred = vars(&[("name", "Fred")]);
    let bindings = Bindings { user: Some(&fred), ..Bindings::default() };
    assert!(p.is_match("is my name fred", bindings));
    assert!(!p.is_match("is my name barney", bindings));

    // No user table at all: logged and treated as no match.
    assert!(!p.is_match("is my name fred", Bindings::default()));
}

#[test]
fn non_text_variable_values_are_rejected() {
    let mut user = Variables::new();
    user.insert("age".to_string(), Value::Int(3));
    let p = Pattern::new("i am %u:age", &Variables::new(), Bindings::default()).unwrap();
    let bindings = Bindings { user: Some(&user), ..Bindings::default() };
    assert!(!p.is_match("i am 3", bindings));
    let err = p.regex_source(bindings).unwrap_err();
    assert!(matches!(err, PatternError::BadVariableValue { kind: VarKind::User, .. }));
}

#[test]
fn variable_values_must_be_simple_patterns() {
    let bot = vars(&[("thing", "*")]);
    let p = Pattern::new("%b:thing", &Variables::new(), Bindings { bot: Some(&bot), ..Bindings::default() });
    match p {
        Err(PatternError::InVariable { kind: VarKind::Bot, name, source }) => {
            assert_eq!(name, "thing");
            assert!(matches!(*source, PatternError::UnexpectedCharacter(_)));
        }
        other => panic!("expected InVariable error, got {other:?}"),
    }
}

#[test]
fn null_pattern_matches_anything() {
    let p = Pattern::null();
    assert!(!p.is_present());
    assert_eq!(p.score(), WILDCARD_SCORE);
    assert!(p.is_match("", Bindings::default()));
    assert!(p.is_match("whatever you like", Bindings::default()));

    let empty = Pattern::new("", &Variables::new(), Bindings::default()).unwrap();
    assert!(!empty.is_present());
}

#[test]
fn simple_patterns_reject_full_syntax() {
    assert!(Pattern::simple("(shutoff|main) valve").is_ok());
    assert!(Pattern::simple("_(a|b)").is_err());
    assert!(Pattern::simple("%u:x").is_err());
}
