pub mod ast;
pub mod diagnostics;
pub mod environment;
pub mod error;
pub mod interpreter;
pub mod parser;
pub mod resolver;
pub mod scanner;
pub mod token;
pub mod value;

use diagnostics::Diagnostics;
use interpreter::Interpreter;
use parser::Parser;
use resolver::Resolver;
use scanner::Scanner;

/// Runs one source unit (a whole script, or a single REPL line)
/// through the full scan -> parse -> resolve -> interpret pipeline.
/// Evaluation is skipped entirely if scanning/parsing/resolving
/// reported any error, since compile errors suppress evaluation.
pub fn run(source: &str, diagnostics: &Diagnostics) {
    let tokens = Scanner::new(source).scan_tokens(diagnostics);
    let statements = Parser::new(tokens, diagnostics).parse();

    if diagnostics.had_error() {
        return;
    }

    let locals = Resolver::new(diagnostics).resolve(&statements);

    if diagnostics.had_error() {
        return;
    }

    Interpreter::new(&locals, diagnostics).interpret(&statements);
}
