#[macro_export]
macro_rules! regex {
    ($pat:literal) => {{
        static RE: once_cell::sync::Lazy<regex::Regex> =
            once_cell::sync::Lazy::new(|| regex::Regex::new($pat).unwrap());
        &*RE
    }};
}

/// Declare a rule for a [`ScriptRules`](crate::ScriptRules) list.
///
/// ```
/// use banter::{rule, Reply};
///
/// let def = rule! {
///     name: "hello",
///     pattern: "hello [there]",
///     weight: 2,
///     reply: |_ctx| Reply::from("Hi there!"),
/// };
/// assert_eq!(def.weight, 2);
/// ```
#[macro_export]
macro_rules! rule {
    (
        name: $name:expr,
        pattern: $pattern:expr
        $(, previous: $previous:expr)?
        $(, weight: $weight:expr)?
        , reply: |$ctx:ident| $body:expr
        $(,)?
    ) => {{
        $crate::RuleDef {
            name: ::std::string::String::from($name),
            pattern: ::std::string::String::from($pattern),
            previous: ::std::string::String::from($crate::rule!(@previous $($previous)?)),
            weight: { 1 $(- 1 + $weight)? },
            handler: ::std::boxed::Box::new(move |$ctx: &mut $crate::RuleContext<'_>| {
                let reply: $crate::Reply = ($body).into();
                reply
            }),
        }
    }};
    (@previous) => {
        ""
    };
    (@previous $previous:expr) => {
        $previous
    };
}
