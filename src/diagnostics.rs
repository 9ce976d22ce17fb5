use crate::token::{Token, TokenKind};
use std::cell::Cell;

/// Replaces the textbook's static `hadError`/`hadRuntimeError` globals
/// with an explicit sink threaded through the scanner, parser,
/// resolver, and interpreter. One instance per "run", meaning once per
/// script execution, or once per REPL line, so an error on one REPL
/// line never poisons the next.
#[derive(Default)]
pub struct Diagnostics {
    had_error: Cell<bool>,
    had_runtime_error: Cell<bool>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Diagnostics::default()
    }

    pub fn had_error(&self) -> bool {
        self.had_error.get()
    }

    pub fn had_runtime_error(&self) -> bool {
        self.had_runtime_error.get()
    }

    /// `[line N] Error: MESSAGE`, for scanner-level diagnostics.
    pub fn error(&self, line: usize, message: &str) {
        self.report(line, "", message);
    }

    /// `[line N] Error at 'LEXEME': MESSAGE` (or `at end`), for parser
    /// and resolver diagnostics anchored to a token.
    pub fn error_at(&self, token: &Token, message: &str) {
        if token.kind == TokenKind::Eof {
            self.report(token.line, " at end", message);
        } else {
            self.report(token.line, &format!(" at '{}'", token.lexeme), message);
        }
    }

    fn report(&self, line: usize, location: &str, message: &str) {
        eprintln!("[line {}] Error{}: {}", line, location, message);
        self.had_error.set(true);
    }

    /// `RuntimeError [line N]: MESSAGE`.
    pub fn runtime_error(&self, err: &crate::error::RuntimeError) {
        eprintln!(
            "RuntimeError [line {}]: {}",
            err.token.line, err.message
        );
        self.had_runtime_error.set(true);
    }
}
