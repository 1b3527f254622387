use banter::{ReplyDetails, ReplyStep};

mod ansi {
    pub const RESET: &str = "\x1b[0m";
    pub const DIM: &str = "\x1b[2m";
    pub const BOLD: &str = "\x1b[1m";

    pub const GREEN: &str = "\x1b[32m";
    pub const YELLOW: &str = "\x1b[33m";
    pub const BLUE: &str = "\x1b[34m";
    pub const CYAN: &str = "\x1b[36m";
    pub const GRAY: &str = "\x1b[90m";

    pub struct Palette {
        enabled: bool,
    }

    impl Palette {
        pub fn new(enabled: bool) -> Self {
            Self { enabled }
        }

        pub fn paint(&self, s: impl AsRef<str>, color: &str) -> String {
            if self.enabled { format!("{}{}{}", color, s.as_ref(), RESET) } else { s.as_ref().to_string() }
        }

        pub fn bold(&self, s: impl AsRef<str>) -> String {
            if self.enabled { format!("{}{}{}", BOLD, s.as_ref(), RESET) } else { s.as_ref().to_string() }
        }

        pub fn dim(&self, s: impl AsRef<str>) -> String {
            if self.enabled { format!("{}{}{}", DIM, s.as_ref(), RESET) } else { s.as_ref().to_string() }
        }
    }
}

pub fn print_reply(details: &ReplyDetails, color: bool) {
    let palette = ansi::Palette::new(color);
    println!(
        "\n{}",
        palette.bold(palette.paint(format!("⚙  {} said: \"{}\"", details.user, details.message), ansi::CYAN))
    );

    println!("\n{}", palette.paint("━━━ Rules ━━━", ansi::GRAY));
    if details.steps.is_empty() {
        println!("{}", palette.dim("  No rules searched"));
    }
    for step in &details.steps {
        print_step(step, &palette);
    }

    println!("\n{}", palette.paint("━━━ Reply ━━━", ansi::GRAY));
    if details.reply.is_empty() {
        println!("{}", palette.dim("  (empty reply)"));
        if details.top_rule().is_none() {
            println!("\n{}", palette.paint("Possible reasons:", ansi::YELLOW));
            println!("  • No rule in topic \"{}\" matched", details.topic_before);
            println!("  • A rule using a user variable couldn't compile (check the log)");
        }
    } else {
        println!("  {}", palette.bold(palette.paint(&details.reply, ansi::GREEN)));
    }
    if details.topic_before != details.topic_after {
        println!(
            "  {} {} → {}",
            palette.dim("topic:"),
            palette.paint(&details.topic_before, ansi::BLUE),
            palette.paint(&details.topic_after, ansi::BLUE)
        );
    }

    println!("\n{}", palette.paint("━━━ Timing ━━━", ansi::GRAY));
    let searching = details.steps.iter().map(|s| s.duration).sum::<std::time::Duration>();
    println!(
        "  Total: {}  │  Rule search: {}  │  Depth: {}",
        palette.paint(format!("{:?}", details.total), ansi::GREEN),
        palette.paint(format!("{:?}", searching), ansi::CYAN),
        palette.dim(details.max_depth().to_string()),
    );
    println!();
}

fn print_step(step: &ReplyStep, palette: &ansi::Palette) {
    let indent = "  ".repeat(step.depth + 1);
    let rule = match &step.rule {
        Some(rule) => palette.paint(format!("✓ {rule}"), ansi::GREEN),
        None => palette.dim("✗ no match"),
    };
    println!(
        "{indent}{} {} {} {}",
        palette.paint(format!("[{}]", step.depth), ansi::GRAY),
        palette.paint(format!("\"{}\"", step.normalized), ansi::YELLOW),
        palette.dim(format!("│ {} │ tried {}", step.topic, step.rules_tried)),
        rule,
    );
    if step.matched() {
        println!(
            "{indent}    {} {}  {}",
            palette.dim("→"),
            palette.paint(&step.output, ansi::BLUE),
            palette.dim(format!("{:?}", step.duration))
        );
    }
}
