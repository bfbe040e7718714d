//! Interactive REPL for the Exa MCP server.
//!
//! Launch with `exa-mcp repl` to enter interactive mode.
//! Type `/help` for available commands, Tab for completion.

use std::sync::Arc;

use rustyline::completion::{Completer, Pair};
use rustyline::config::CompletionType;
use rustyline::error::ReadlineError;
use rustyline::highlight::Highlighter;
use rustyline::hint::Hinter;
use rustyline::validate::Validator;
use rustyline::{
    Cmd, ConditionalEventHandler, Config, Editor, Event, EventContext, EventHandler, Helper,
    KeyEvent, RepeatCount,
};
use serde_json::{json, Value};
use tokio::runtime::Handle;

use crate::session::CapabilitySession;
use crate::tools::search::{describe_search_parameters, TOOL_NAME};
use crate::tools::ToolRegistry;

/// Available REPL commands.
const COMMANDS: &[(&str, &str)] = &[
    ("/auth", "Bind an Exa API key"),
    ("/search", "Run a search: /search <query> or /search {json args}"),
    ("/tools", "List available MCP tools"),
    ("/schema", "Print the search input schema"),
    ("/info", "Show server capabilities"),
    ("/clear", "Clear the screen"),
    ("/help", "Show available commands"),
    ("/exit", "Quit the REPL"),
];

/// REPL helper for tab completion.
#[derive(Default)]
struct ExaHelper;

impl Completer for ExaHelper {
    type Candidate = Pair;

    fn complete(
        &self,
        line: &str,
        pos: usize,
        _ctx: &rustyline::Context<'_>,
    ) -> rustyline::Result<(usize, Vec<Pair>)> {
        let input = &line[..pos];

        if input.contains(' ') {
            return Ok((pos, Vec::new()));
        }

        let matches: Vec<Pair> = COMMANDS
            .iter()
            .filter(|(cmd, _)| cmd.starts_with(input))
            .map(|(cmd, desc)| Pair {
                display: format!("{cmd:<16} {desc}"),
                replacement: format!("{cmd} "),
            })
            .collect();
        Ok((0, matches))
    }
}

impl Hinter for ExaHelper {
    type Hint = String;

    fn hint(&self, line: &str, pos: usize, _ctx: &rustyline::Context<'_>) -> Option<String> {
        if pos < line.len() || line.is_empty() {
            return None;
        }
        if line.starts_with('/') && !line.contains(' ') {
            for (cmd, _) in COMMANDS {
                if cmd.starts_with(line) && *cmd != line {
                    return Some(cmd[line.len()..].to_string());
                }
            }
        }
        None
    }
}

impl Highlighter for ExaHelper {}
impl Validator for ExaHelper {}
impl Helper for ExaHelper {}

struct TabCompleteOrAcceptHint;

impl ConditionalEventHandler for TabCompleteOrAcceptHint {
    fn handle(
        &self,
        _evt: &Event,
        _n: RepeatCount,
        _positive: bool,
        ctx: &EventContext<'_>,
    ) -> Option<Cmd> {
        if ctx.has_hint() {
            Some(Cmd::CompleteHint)
        } else {
            Some(Cmd::Complete)
        }
    }
}

/// Run the interactive REPL.
///
/// Blocks the calling thread; async work is driven on `runtime`, so call this
/// from a blocking context (e.g. `spawn_blocking`).
pub fn run(runtime: Handle, session: Arc<CapabilitySession>) -> anyhow::Result<()> {
    eprintln!();
    eprintln!(
        "  \x1b[32m\u{25c9}\x1b[0m \x1b[1mexa-mcp v{}\x1b[0m \x1b[90m\u{2014} Semantic web search\x1b[0m",
        env!("CARGO_PKG_VERSION")
    );
    eprintln!();
    eprintln!(
        "    Press \x1b[36m/\x1b[0m to browse commands, \x1b[90mTab\x1b[0m to complete, \x1b[90m/exit\x1b[0m to quit."
    );
    eprintln!();

    let config = Config::builder()
        .history_ignore_space(true)
        .auto_add_history(true)
        .completion_type(CompletionType::List)
        .completion_prompt_limit(20)
        .build();

    let mut rl: Editor<ExaHelper, rustyline::history::DefaultHistory> =
        Editor::with_config(config)?;
    rl.set_helper(Some(ExaHelper));
    rl.bind_sequence(
        KeyEvent::from('\t'),
        EventHandler::Conditional(Box::new(TabCompleteOrAcceptHint)),
    );

    let home = std::env::var("HOME")
        .or_else(|_| std::env::var("USERPROFILE"))
        .unwrap_or_else(|_| ".".to_string());
    let hist_path = std::path::PathBuf::from(&home).join(".exa_mcp_history");
    if hist_path.exists() {
        let _ = rl.load_history(&hist_path);
    }

    let prompt = " \x1b[36mexa>\x1b[0m ";

    loop {
        match rl.readline(prompt) {
            Ok(line) => {
                let line = line.trim();
                if line.is_empty() {
                    continue;
                }

                let input = line.strip_prefix('/').unwrap_or(line);
                if input.is_empty() {
                    cmd_help();
                    continue;
                }

                let mut parts = input.splitn(2, ' ');
                let cmd = parts.next().unwrap_or("");
                let args = parts.next().unwrap_or("").trim();

                match cmd {
                    "exit" | "quit" => {
                        eprintln!("  \x1b[90m\u{2728}\x1b[0m Goodbye!");
                        break;
                    }
                    "help" | "h" | "?" => cmd_help(),
                    "clear" | "cls" => eprint!("\x1b[2J\x1b[H"),
                    "info" => cmd_info(&runtime, &session),
                    "tools" => cmd_tools(),
                    "schema" => cmd_schema(),
                    "auth" => cmd_auth(args, &runtime, &session),
                    "search" => cmd_search(args, &runtime, &session),
                    _ => {
                        eprintln!("  Unknown command '/{cmd}'. Type /help for commands.");
                    }
                }
            }
            Err(ReadlineError::Interrupted) => {
                eprintln!("  \x1b[90m(Ctrl+C)\x1b[0m Type \x1b[1m/exit\x1b[0m to quit.");
            }
            Err(ReadlineError::Eof) => {
                eprintln!("  \x1b[90m\u{2728}\x1b[0m Goodbye!");
                break;
            }
            Err(err) => {
                eprintln!("  Error: {err}");
                break;
            }
        }
    }

    let _ = rl.save_history(&hist_path);

    Ok(())
}

fn cmd_help() {
    eprintln!();
    eprintln!("  Commands:");
    eprintln!();
    for (cmd, desc) in COMMANDS {
        eprintln!("    {cmd:<18} {desc}");
    }
    eprintln!();
    eprintln!("  Tip: /search accepts plain text or a JSON object of tool arguments.");
    eprintln!();
}

fn cmd_info(runtime: &Handle, session: &CapabilitySession) {
    let capabilities = crate::types::InitializeResult::default_result();
    let tools = ToolRegistry::list_tools();
    let authenticated = runtime.block_on(session.is_authenticated());
    eprintln!();
    eprintln!(
        "  Server:        {} v{}",
        capabilities.server_info.name, capabilities.server_info.version
    );
    eprintln!("  Protocol:      {}", capabilities.protocol_version);
    eprintln!("  Tools:         {}", tools.len());
    eprintln!("  Authenticated: {}", if authenticated { "yes" } else { "no" });
    eprintln!();
}

fn cmd_tools() {
    let tools = ToolRegistry::list_tools();
    eprintln!();
    eprintln!("  {} MCP tools available:", tools.len());
    eprintln!();
    for tool in &tools {
        eprintln!(
            "    {:<28} {}",
            tool.name,
            tool.description.as_deref().unwrap_or("")
        );
    }
    eprintln!();
}

fn cmd_schema() {
    match serde_json::to_string_pretty(&describe_search_parameters()) {
        Ok(text) => println!("{text}"),
        Err(e) => eprintln!("  Error: {e}"),
    }
}

fn cmd_auth(args: &str, runtime: &Handle, session: &CapabilitySession) {
    let Some(key) = args.split_whitespace().next() else {
        eprintln!("  Usage: /auth <api-key>");
        return;
    };
    runtime.block_on(session.authenticate(key));
    eprintln!("  API key bound.");
}

/// Plain text becomes `{"query": text}`; a leading `{` is parsed as JSON args.
fn search_arguments(args: &str) -> Result<Value, serde_json::Error> {
    if args.starts_with('{') {
        serde_json::from_str(args)
    } else {
        Ok(json!({ "query": args }))
    }
}

fn cmd_search(args: &str, runtime: &Handle, session: &CapabilitySession) {
    if args.is_empty() {
        eprintln!("  Usage: /search <query>");
        return;
    }

    let arguments = match search_arguments(args) {
        Ok(v) => v,
        Err(e) => {
            eprintln!("  Invalid JSON arguments: {e}");
            return;
        }
    };

    let result = runtime.block_on(ToolRegistry::call(TOOL_NAME, Some(arguments), session));
    let text = result.first_text().unwrap_or_default();

    if result.is_error == Some(true) {
        eprintln!("  {text}");
        return;
    }

    let pretty = serde_json::from_str::<Value>(text)
        .ok()
        .and_then(|v| serde_json::to_string_pretty(&v).ok())
        .unwrap_or_else(|| text.to_string());
    println!("{pretty}");
}
