use clap::Parser as ClapParser;
use jlox::diagnostics::Diagnostics;
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use std::process::ExitCode;

const PROMPT: &str = "> ";
const HISTORY_FILE: &str = ".jlox_history";

const EXIT_USAGE: u8 = 64;
const EXIT_DATA_ERROR: u8 = 65;
const EXIT_SOFTWARE_ERROR: u8 = 70;

/// A tree-walking interpreter for Lox.
///
/// Run with no arguments for an interactive prompt, or pass a single
/// script path to execute it.
#[derive(ClapParser, Debug)]
#[command(name = "jlox", disable_help_flag = true, disable_version_flag = true)]
struct CliArgs {
    #[arg(trailing_var_arg = true)]
    script: Vec<String>,
}

fn main() -> ExitCode {
    let args = CliArgs::parse();

    match args.script.len() {
        0 => {
            run_prompt();
            ExitCode::SUCCESS
        }
        1 => ExitCode::from(run_file(&args.script[0])),
        _ => {
            println!("Usage: jlox [script]");
            ExitCode::from(EXIT_USAGE)
        }
    }
}

fn run_file(path: &str) -> u8 {
    let source = match std::fs::read_to_string(path) {
        Ok(source) => source,
        Err(err) => {
            eprintln!("Could not read file '{path}': {err}");
            return EXIT_SOFTWARE_ERROR;
        }
    };

    let diagnostics = Diagnostics::new();
    jlox::run(&source, &diagnostics);

    if diagnostics.had_error() {
        EXIT_DATA_ERROR
    } else if diagnostics.had_runtime_error() {
        EXIT_SOFTWARE_ERROR
    } else {
        0
    }
}

fn run_prompt() {
    let mut editor = match DefaultEditor::new() {
        Ok(editor) => editor,
        Err(err) => {
            eprintln!("Could not start line editor: {err}");
            return;
        }
    };
    let _ = editor.load_history(HISTORY_FILE);

    loop {
        match editor.readline(PROMPT) {
            Ok(line) => {
                let _ = editor.add_history_entry(line.as_str());
                // Fresh Diagnostics per line: a compile error on one
                // REPL line must not poison the next.
                let diagnostics = Diagnostics::new();
                jlox::run(&line, &diagnostics);
            }
            Err(ReadlineError::Interrupted) => continue,
            Err(ReadlineError::Eof) => break,
            Err(err) => {
                eprintln!("Readline error: {err}");
                break;
            }
        }
    }

    let _ = editor.save_history(HISTORY_FILE);
}
