// tagcalc - build calculations from named quantities and operator tags

mod exit_codes;
mod logging;

use std::io::{self, Read, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use log::debug;

use tagcalc_cli::script;
use tagcalc_cli::source::Source;
use tagcalc_cli::{tui, util};
use tagcalc_config::Settings;
use tagcalc_engine::formula::format_number;
use tagcalc_engine::{
    evaluate, EvalResult, FormulaStore, InteractionController, SuggestionCache, SuggestionSource,
};
use tagcalc_suggest_client::SuggestError;

use exit_codes::{
    suggest_exit_code, EXIT_EVAL_ERROR, EXIT_SUCCESS, EXIT_TUI_IO, EXIT_TUI_NO_TTY, EXIT_USAGE,
};

#[derive(Parser)]
#[command(name = "tagcalc")]
#[command(about = "Build calculations from named quantities and operator tags")]
#[command(long_version = long_version())]
#[command(version)]
#[command(subcommand_required = false)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Autocomplete endpoint (scheme + host); overrides settings
    #[arg(long, global = true, env = "TAGCALC_ENDPOINT")]
    endpoint: Option<String>,

    /// Read suggestions from a JSON file instead of the endpoint
    #[arg(long, global = true, value_name = "PATH")]
    suggestions_file: Option<PathBuf>,

    /// Settings file to use instead of the default location
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Reject an operator that cannot follow the calculation
    #[arg(long, global = true)]
    strict: bool,

    /// Append logs to this file (the only log sink in interactive mode)
    #[arg(long, global = true, value_name = "PATH")]
    log_file: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Interactive formula editor (default)
    Tui,

    /// Evaluate a calculation string
    #[command(after_help = "\
Examples:
  tagcalc eval '2+3*4'        # 14
  tagcalc eval '2^3^2'        # 512
  tagcalc eval '2++'          # Error (exit 3)")]
    Eval {
        /// Calculation, e.g. 18*58+(2-1)
        expr: String,
    },

    /// List suggestions, optionally filtered by a name fragment
    Suggestions {
        /// Case-insensitive name fragment
        query: Option<String>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Replay an event script from stdin and print the resulting formula
    #[command(after_help = "\
Script lines:
  type <text>            set the input text
  down | up | enter      navigation keys
  key <char>             a single key press (operators: + - * / ( ) ^)
  click-tag <i>          re-open tag i for editing
  remove-tag <i>         remove tag i
  click-suggestion <i>   fill the input from dropdown row i
  replace-tag <i> <name> replace tag i

Example:
  printf 'type water\\nenter\\nkey *\\ntype salt\\nenter\\n' | tagcalc run")]
    Run {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show the settings file location and the effective settings
    Config,
}

fn long_version() -> &'static str {
    if cfg!(debug_assertions) {
        concat!(
            env!("CARGO_PKG_VERSION"),
            " (", env!("GIT_COMMIT_HASH"), ")",
            "\nengine:  tagcalc-engine ", env!("CARGO_PKG_VERSION"),
            "\nbuild:   debug",
            "\ntarget:  ", env!("TARGET"),
        )
    } else {
        concat!(
            env!("CARGO_PKG_VERSION"),
            " (", env!("GIT_COMMIT_HASH"), ")",
            "\nengine:  tagcalc-engine ", env!("CARGO_PKG_VERSION"),
            "\nbuild:   release",
            "\ntarget:  ", env!("TARGET"),
        )
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let interactive = matches!(cli.command, None | Some(Commands::Tui));
    let logged = match (&cli.log_file, interactive) {
        (Some(path), _) => logging::init_file(path, "debug"),
        // The editor owns the terminal
        (None, true) => Ok(()),
        (None, false) => logging::init_stderr("warn"),
    };
    if let Err(e) = logged {
        eprintln!("warning: {}", e);
    }

    let result = match cli.command {
        None | Some(Commands::Tui) => cmd_tui(&cli.endpoint, &cli.suggestions_file, &cli.config, cli.strict),
        Some(Commands::Eval { ref expr }) => cmd_eval(expr),
        Some(Commands::Suggestions { ref query, json }) => {
            cmd_suggestions(&cli.endpoint, &cli.suggestions_file, &cli.config, query.as_deref(), json)
        }
        Some(Commands::Run { json }) => {
            cmd_run(&cli.endpoint, &cli.suggestions_file, &cli.config, cli.strict, json)
        }
        Some(Commands::Config) => cmd_config(&cli.config),
    };

    match result {
        Ok(()) => ExitCode::from(EXIT_SUCCESS),
        Err(CliError { code, message, hint }) => {
            if !message.is_empty() {
                eprintln!("error: {}", message);
            }
            if let Some(hint) = hint {
                eprintln!("hint:  {}", hint);
            }
            ExitCode::from(code)
        }
    }
}

#[derive(Debug)]
pub struct CliError {
    pub code: u8,
    pub message: String,
    pub hint: Option<String>,
}

impl CliError {
    pub fn args(msg: impl Into<String>) -> Self {
        Self { code: EXIT_USAGE, message: msg.into(), hint: None }
    }

    pub fn io(msg: impl Into<String>) -> Self {
        Self { code: exit_codes::EXIT_ERROR, message: msg.into(), hint: None }
    }

    pub fn eval(msg: impl Into<String>) -> Self {
        Self { code: EXIT_EVAL_ERROR, message: msg.into(), hint: None }
    }

    pub fn tui(msg: impl Into<String>) -> Self {
        Self { code: EXIT_TUI_IO, message: msg.into(), hint: None }
    }

    /// Create error from a suggestion source error with proper exit code.
    pub fn suggest(err: SuggestError) -> Self {
        let code = suggest_exit_code(&err);
        let hint = match &err {
            SuggestError::Network(_) => {
                Some("check --endpoint, or use --suggestions-file to work offline".to_string())
            }
            SuggestError::Parse(_) => {
                Some("expected a JSON array of {name, category, value, id}".to_string())
            }
            _ => None,
        };
        Self { code, message: err.to_string(), hint }
    }

    /// Add a hint to an existing error.
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}

// ============================================================================
// Shared setup
// ============================================================================

fn load_settings(config: &Option<PathBuf>, strict: bool) -> Result<Settings, CliError> {
    let mut settings = match config {
        Some(path) if !path.exists() => {
            return Err(CliError::args(format!("settings file not found: {}", path.display()))
                .with_hint(format!("default location: {}", Settings::config_path_display())));
        }
        Some(path) => Settings::load_from(path),
        None => Settings::load(),
    };
    if strict {
        settings.strict_operators = true;
    }
    Ok(settings)
}

fn select_source(
    settings: &Settings,
    endpoint: &Option<String>,
    file: &Option<PathBuf>,
) -> Result<Source, CliError> {
    Source::select(settings, endpoint.clone(), file.clone()).map_err(CliError::suggest)
}

// ============================================================================
// tui
// ============================================================================

fn cmd_tui(
    endpoint: &Option<String>,
    file: &Option<PathBuf>,
    config: &Option<PathBuf>,
    strict: bool,
) -> Result<(), CliError> {
    if !atty::is(atty::Stream::Stdin) || !atty::is(atty::Stream::Stdout) {
        return Err(CliError {
            code: EXIT_TUI_NO_TTY,
            message: "interactive mode needs a terminal".to_string(),
            hint: Some("pipe an event script into `tagcalc run` instead".to_string()),
        });
    }

    let settings = load_settings(config, strict)?;
    let source = select_source(&settings, endpoint, file)?;
    let controller = InteractionController::new(FormulaStore::shared(), settings.controller_options());
    tui::run(controller, source, settings.max_dropdown_rows).map_err(CliError::tui)
}

// ============================================================================
// eval
// ============================================================================

fn cmd_eval(expr: &str) -> Result<(), CliError> {
    let result = evaluate(expr);
    println!("{}", result);
    match result {
        EvalResult::Error(e) => Err(CliError::eval(e.to_string())),
        _ => Ok(()),
    }
}

// ============================================================================
// suggestions
// ============================================================================

fn cmd_suggestions(
    endpoint: &Option<String>,
    file: &Option<PathBuf>,
    config: &Option<PathBuf>,
    query: Option<&str>,
    json: bool,
) -> Result<(), CliError> {
    let settings = load_settings(config, false)?;
    let source = select_source(&settings, endpoint, file)?;
    let list = source.fetch_all().map_err(CliError::suggest)?;
    debug!("{} suggestions from {}", list.len(), source.describe());

    let list = match query {
        Some(q) => SuggestionCache::Ready(list).filter(q),
        None => list,
    };

    let stdout = io::stdout();
    let mut out = stdout.lock();
    if json {
        let text = serde_json::to_string_pretty(&list)
            .map_err(|e| CliError::io(format!("JSON serialization error: {}", e)))?;
        writeln!(out, "{}", text).map_err(|e| CliError::io(e.to_string()))?;
        return Ok(());
    }

    for s in &list {
        writeln!(out, "{}  {}", util::spread(&s.name, &s.category, 40), format_number(s.value))
            .map_err(|e| CliError::io(e.to_string()))?;
    }
    Ok(())
}

// ============================================================================
// run
// ============================================================================

fn cmd_run(
    endpoint: &Option<String>,
    file: &Option<PathBuf>,
    config: &Option<PathBuf>,
    strict: bool,
    json: bool,
) -> Result<(), CliError> {
    let mut input = String::new();
    io::stdin()
        .read_to_string(&mut input)
        .map_err(|e| CliError::io(format!("failed to read stdin: {}", e)))?;
    let events = script::parse_script(&input).map_err(CliError::args)?;

    let settings = load_settings(config, strict)?;
    let source = select_source(&settings, endpoint, file)?;

    let mut controller =
        InteractionController::new(FormulaStore::shared(), settings.controller_options());
    controller.begin_loading();
    match source.fetch_all() {
        Ok(list) => controller.load_suggestions(list),
        // Same as the editor: operators still work, nothing can be committed
        Err(e) => controller.suggestions_failed(e.to_string()),
    }

    let report = script::run_script(&mut controller, &events);

    let stdout = io::stdout();
    let mut out = stdout.lock();
    if json {
        let text = serde_json::to_string_pretty(&report)
            .map_err(|e| CliError::io(format!("JSON serialization error: {}", e)))?;
        writeln!(out, "{}", text).map_err(|e| CliError::io(e.to_string()))?;
    } else {
        writeln!(out, "formula:     {}", report.formula.join(" "))
            .and_then(|_| writeln!(out, "calculation: {}", report.calculation))
            .and_then(|_| writeln!(out, "result:      {}", report.result))
            .map_err(|e| CliError::io(e.to_string()))?;
    }

    if report.error {
        // Already printed; only the exit code matters
        return Err(CliError::eval(""));
    }
    Ok(())
}

// ============================================================================
// config
// ============================================================================

fn cmd_config(config: &Option<PathBuf>) -> Result<(), CliError> {
    let path = match config {
        Some(path) => path.display().to_string(),
        None => Settings::config_path_display(),
    };
    let settings = load_settings(config, false)?;
    let text = serde_json::to_string_pretty(&settings)
        .map_err(|e| CliError::io(format!("JSON serialization error: {}", e)))?;
    println!("# {}", path);
    println!("{}", text);
    Ok(())
}
