mod debug_report;

use banter::{Engine, Options, ReplyDetails, scripts};
use std::io::{self, BufRead, IsTerminal, Write};

const DEFAULT_USER: &str = "local";

fn main() {
    let config = match parse_args() {
        Ok(config) => config,
        Err(err) => {
            eprintln!("{err}");
            std::process::exit(2);
        }
    };

    init_logging(config.debug);

    let mut engine = Engine::with_options(config.options.clone());
    if let Err(err) = engine.load_scripts(scripts::builtin()) {
        eprintln!("error: failed to load scripts: {err}");
        std::process::exit(1);
    }

    let result = match &config.message {
        Some(message) => reply_once(&mut engine, &config, message),
        None => repl(&mut engine, &config),
    };
    if let Err(err) = result {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}

struct CliConfig {
    message: Option<String>,
    user: String,
    options: Options,
    color: bool,
    trace: bool,
    debug: bool,
}

fn init_logging(debug: bool) {
    let mut builder = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"));
    if debug {
        builder.filter_module("banter", log::LevelFilter::Debug);
    }
    builder.format_timestamp(None).init();
}

fn reply_once(engine: &mut Engine, config: &CliConfig, message: &str) -> banter::Result<()> {
    if config.trace {
        let details = engine.reply_verbose(&config.user, message)?;
        debug_report::print_reply(&details, config.color);
    } else {
        println!("{}", engine.reply(&config.user, message)?);
    }
    Ok(())
}

/// Read messages from stdin, one per line, until EOF or `/quit`.
fn repl(engine: &mut Engine, config: &CliConfig) -> banter::Result<()> {
    let interactive = io::stdin().is_terminal();
    let mut trace = config.trace;
    if interactive {
        println!("banter {}. Type /help for commands.", env!("CARGO_PKG_VERSION"));
    }

    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();
    loop {
        if interactive {
            print!("> ");
            let _ = io::stdout().flush();
        }
        let Some(Ok(line)) = lines.next() else {
            break;
        };
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        match line {
            "/quit" | "/exit" => break,
            "/help" => println!("{}", repl_help()),
            "/botvars" => print_vars(engine.bot_vars()),
            "/uservars" => match engine.user(&config.user) {
                Some(user) => {
                    println!("topic = {}", user.topic);
                    print_vars(&user.vars);
                }
                None => println!("(no messages from {} yet)", config.user),
            },
            "/reload" => match engine.reload() {
                Ok(count) => println!("Reloaded {count} rules."),
                Err(err) => eprintln!("error: reload failed: {err}"),
            },
            "/trace" => {
                trace = !trace;
                println!("Trace {}.", if trace { "on" } else { "off" });
            }
            message => {
                // Errors from one message shouldn't end the session.
                let result = if trace {
                    engine.reply_verbose(&config.user, message).map(|d| report(&d, config.color))
                } else {
                    engine.reply(&config.user, message).map(|reply| println!("{reply}"))
                };
                if let Err(err) = result {
                    eprintln!("error: {err}");
                }
            }
        }
    }
    Ok(())
}

fn report(details: &ReplyDetails, color: bool) {
    debug_report::print_reply(details, color);
}

fn print_vars(vars: &banter::Variables) {
    let mut names = vars.keys().collect::<Vec<_>>();
    names.sort();
    for name in names {
        println!("{name} = {}", vars[name]);
    }
}

fn parse_args() -> Result<CliConfig, String> {
    let mut message: Option<String> = None;
    let mut user = DEFAULT_USER.to_string();
    let mut options = Options::default();
    let mut color = io::stdout().is_terminal();
    let mut trace = false;
    let mut debug = false;
    let mut args = std::env::args().skip(1).peekable();

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "-h" | "--help" => {
                print_help();
                std::process::exit(0);
            }
            "-V" | "--version" => {
                println!("banter {}", env!("CARGO_PKG_VERSION"));
                std::process::exit(0);
            }
            "--color" => color = true,
            "--no-color" => color = false,
            "--trace" => trace = true,
            "--debug" => debug = true,
            "--user" | "-u" => {
                user = args.next().ok_or_else(|| "error: --user expects a value".to_string())?;
            }
            "--depth" => {
                let value = args.next().ok_or_else(|| "error: --depth expects a value".to_string())?;
                options.depth_limit = parse_number("--depth", &value)?;
            }
            "--history" => {
                let value = args.next().ok_or_else(|| "error: --history expects a value".to_string())?;
                options.history_len = parse_number("--history", &value)?;
            }
            "--seed" => {
                let value = args.next().ok_or_else(|| "error: --seed expects a value".to_string())?;
                options.seed = Some(parse_number("--seed", &value)?);
            }
            "--" => {
                let rest = args.collect::<Vec<_>>().join(" ");
                if !rest.trim().is_empty() {
                    message = Some(rest);
                }
                break;
            }
            _ if arg.starts_with("--user=") => user = arg.trim_start_matches("--user=").to_string(),
            _ if arg.starts_with("--depth=") => {
                options.depth_limit = parse_number("--depth", arg.trim_start_matches("--depth="))?;
            }
            _ if arg.starts_with("--history=") => {
                options.history_len = parse_number("--history", arg.trim_start_matches("--history="))?;
            }
            _ if arg.starts_with("--seed=") => {
                options.seed = Some(parse_number("--seed", arg.trim_start_matches("--seed="))?);
            }
            _ if arg.starts_with('-') => {
                return Err(format!("error: unknown option '{arg}'"));
            }
            _ => {
                message = Some(std::iter::once(arg).chain(args).collect::<Vec<_>>().join(" "));
                break;
            }
        }
    }

    if user.trim().is_empty() {
        return Err("error: --user must not be empty".to_string());
    }

    Ok(CliConfig { message, user, options, color, trace, debug })
}

fn parse_number<T: std::str::FromStr>(flag: &str, value: &str) -> Result<T, String> {
    value.parse().map_err(|_| format!("error: invalid {flag} '{value}' (expected a non-negative integer)"))
}

fn print_help() {
    println!("{}", help_text());
}

fn repl_help() -> &'static str {
    "Commands:
  /botvars    Show bot variables.
  /uservars   Show your topic and user variables.
  /reload     Reload the scripts (reruns their setup).
  /trace      Toggle the per-reply trace.
  /quit       Leave."
}

fn help_text() -> String {
    format!(
        "banter {version}

Pattern-driven chat bot CLI, running the built-in scripts.

Usage:
  banter [OPTIONS] [--] <message...>
  banter [OPTIONS]                      (read messages from stdin, one per line)

Options:
  -u, --user <id>        User id to talk as. Default: {default_user}
  --depth <n>            Reference expansion depth limit. Default: {depth}
  --history <n>          Messages and replies remembered per user. Default: {history}
  --seed <n>             Seed random reply choice.
  --trace                Print which rules fired for each reply.
  --debug                Debug logging for the engine (RUST_LOG is honored too).
  --color                Force ANSI color output.
  --no-color             Disable ANSI color output.
  -h, --help             Show this help message.
  -V, --version          Print version information.

Exit codes:
  0  Success.
  1  Script load or reply error.
  2  Invalid arguments.
",
        version = env!("CARGO_PKG_VERSION"),
        default_user = DEFAULT_USER,
        depth = Options::DEFAULT_DEPTH_LIMIT,
        history = Options::DEFAULT_HISTORY_LEN,
    )
}
