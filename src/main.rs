//! `corvidc` - command-line driver for the Corvid compiler frontend.
//!
//! Runs one source file through lex -> parse -> check and prints
//! diagnostics in the `{file}:{line}:{column}: {message}` format shared
//! by every stage. There is no codegen backend in this frontend, so type
//! checking is the deepest pipeline stage a user can reach; `--dump-tokens`
//! and `--dump-ast` expose the earlier stages for inspection.

mod mode;

use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;

use corvid_ast::AstArena;
use corvid_base::{DiagnosticBag, Severity};
use corvid_check::Checker;
use corvid_lexer::Lexer;
use corvid_parser::Parser as CorvidParser;

use mode::{detect_mode, Mode};

/// Lex, parse, and type-check a Corvid source file.
#[derive(Parser)]
#[command(name = "corvidc")]
#[command(about = "Corvid compiler frontend", long_about = None)]
#[command(version)]
struct Cli {
    /// Path to the `.cv` source file to compile.
    file: PathBuf,

    /// Print every token instead of compiling.
    #[arg(long)]
    dump_tokens: bool,

    /// Print the parsed AST alongside the usual diagnostics.
    #[arg(long)]
    dump_ast: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(&cli) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> Result<bool, String> {
    let source = fs::read_to_string(&cli.file).map_err(|e| format!("{}: {e}", cli.file.display()))?;
    if detect_mode(&cli.file, &source) == Mode::Unknown {
        eprintln!(
            "warning: {} does not look like Corvid source (no .cv extension or leading `package`)",
            cli.file.display()
        );
    }
    let file_name = cli.file.to_string_lossy().to_string();

    if cli.dump_tokens {
        dump_tokens(&file_name, &source);
        return Ok(true);
    }

    let arena = AstArena::new();
    let parsed = CorvidParser::new(&arena, file_name, source).parse();
    if cli.dump_ast {
        println!("{:#?}", parsed.unit);
    }
    if parsed.diagnostics.has_errors() {
        print_diagnostics(&parsed.diagnostics);
        return Ok(false);
    }

    let checked = Checker::new(&parsed.interner).check(&parsed.unit);
    print_diagnostics(&parsed.diagnostics);
    print_diagnostics(&checked.diagnostics);
    if !checked.diagnostics.has_errors() {
        println!(
            "ok: {} ({} declarations, {} diagnostics)",
            cli.file.display(),
            parsed.unit.declarations.len(),
            checked.diagnostics.len()
        );
    }
    Ok(!checked.diagnostics.has_errors())
}

fn dump_tokens(file_name: &str, source: &str) {
    let mut lexer = Lexer::from_source(file_name.to_string(), source.to_string());
    loop {
        let token = lexer.next_token();
        let is_eof = token.is_eof();
        println!("{} {:?} {:?}", token.position, token.kind, token.lexeme);
        if is_eof {
            break;
        }
    }
}

fn print_diagnostics(diagnostics: &DiagnosticBag) {
    for diagnostic in diagnostics.iter() {
        let label = match diagnostic.severity {
            Severity::Error => "error",
            Severity::Warning => "warning",
        };
        eprintln!("{label}: {diagnostic}");
    }
}
