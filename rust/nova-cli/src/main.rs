//! NovaLang CLI — run scripts, explore in a REPL, dump ASTs.

mod repl;

use clap::{Parser as ClapParser, Subcommand};
use nova_compiler::diagnostics::DiagnosticKind;
use std::path::{Path, PathBuf};

// Exit codes: 0 success, 1 runtime error, 2 lex/parse error, 64 usage error.
const EXIT_RUNTIME: i32 = 1;
const EXIT_SYNTAX: i32 = 2;
const EXIT_USAGE: i32 = 64;

#[derive(ClapParser)]
#[command(
    name = "nova",
    version,
    about = "The NovaLang programming language — functional-first scripting",
    help_template = "\
{before-help}{name} {version}
{about-with-newline}
{usage-heading} {usage}

{all-args}{after-help}

Examples:
  nova run script.nova        Evaluate a script
  nova repl                   Start an interactive session
  nova ast script.nova        Print the AST as JSON
"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Evaluate a NovaLang script
    Run {
        /// Path to the script
        file: PathBuf,
    },
    /// Start an interactive session
    Repl,
    /// Parse a script and print its AST as JSON
    Ast {
        /// Path to the script
        file: PathBuf,

        /// Pretty-print the JSON
        #[arg(long)]
        pretty: bool,
    },
}

fn main() {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => {
            // clap renders --help/--version on stdout (exit 0) and real
            // usage mistakes on stderr.
            let is_usage_error = err.use_stderr();
            let _ = err.print();
            std::process::exit(if is_usage_error { EXIT_USAGE } else { 0 });
        }
    };
    let code = match cli.command {
        Commands::Run { file } => cmd_run(&file),
        Commands::Repl => repl::run(),
        Commands::Ast { file, pretty } => cmd_ast(&file, pretty),
    };
    std::process::exit(code);
}

fn read_source(file: &Path) -> Result<String, i32> {
    std::fs::read_to_string(file).map_err(|err| {
        eprintln!("nova: cannot read {}: {}", file.display(), err);
        EXIT_USAGE
    })
}

fn diagnostic_exit(kind: DiagnosticKind) -> i32 {
    match kind {
        DiagnosticKind::RuntimeError => EXIT_RUNTIME,
        DiagnosticKind::LexError | DiagnosticKind::ParseError => EXIT_SYNTAX,
    }
}

fn cmd_run(file: &Path) -> i32 {
    let source = match read_source(file) {
        Ok(source) => source,
        Err(code) => return code,
    };
    let mut interp = nova_rt::Interpreter::new();
    match interp.evaluate(&source) {
        Ok(_) => 0,
        Err(diag) => {
            eprintln!(
                "{}",
                diag.render_with_source(&file.display().to_string(), &source)
            );
            diagnostic_exit(diag.kind)
        }
    }
}

fn cmd_ast(file: &Path, pretty: bool) -> i32 {
    let source = match read_source(file) {
        Ok(source) => source,
        Err(code) => return code,
    };
    match nova_compiler::parse(&source) {
        Ok(program) => {
            let rendered = if pretty {
                serde_json::to_string_pretty(&program)
            } else {
                serde_json::to_string(&program)
            };
            match rendered {
                Ok(json) => {
                    println!("{}", json);
                    0
                }
                Err(err) => {
                    eprintln!("nova: cannot serialize AST: {}", err);
                    EXIT_RUNTIME
                }
            }
        }
        Err(diag) => {
            eprintln!(
                "{}",
                diag.render_with_source(&file.display().to_string(), &source)
            );
            diagnostic_exit(diag.kind)
        }
    }
}
