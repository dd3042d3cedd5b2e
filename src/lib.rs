//! Loam Compiler
//!
//! A batch compiler for the Loam language: integer variables with flat
//! scoping, `if`/`elif`/`else` conditionals, and the `loopc` pre-test loop.
//! Source text is lowered to a control-flow-graph IR for an external
//! backend.

pub mod analyzer;
pub mod error;
pub mod ir;
pub mod lexer;
pub mod parser;

pub use error::{CompilerError, CompilerResult};

use analyzer::SemanticChecker;
use lexer::Tokenizer;
use parser::ast::Program;
use parser::Parser;

/// Run the front end: lex, parse, and semantically check one source unit.
///
/// # Errors
/// Returns the first syntax or semantic error; no partial AST survives a
/// failure.
pub fn check(source: &str) -> CompilerResult<Program> {
    let mut parser = Parser::new(Tokenizer::new(source));
    let program = parser.parse()?;
    SemanticChecker::new().check_program(&program)?;
    Ok(program)
}

/// Run the whole pipeline: lex, parse, check, and lower one source unit.
///
/// The stages run synchronously and in strict sequence; each compilation
/// owns its own cursor, AST, name set, and lowering state. On failure no
/// partial module is returned.
///
/// # Errors
/// Returns the first syntax, semantic, or lowering error.
pub fn compile(source: &str, module_name: &str) -> CompilerResult<ir::Module> {
    let program = check(source)?;
    ir::lower_program(&program, module_name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use error::{SemanticError, SyntaxError};

    #[test]
    fn test_compile_valid_program() {
        let module = compile("int a = 1; a += 2;", "unit").expect("compile failed");
        assert_eq!(module.name, "unit");
        assert_eq!(module.functions.len(), 1);
        assert_eq!(module.functions[0].name, "main");
    }

    #[test]
    fn test_compile_reports_syntax_error() {
        let err = compile("int a = 1", "unit").unwrap_err();
        assert!(matches!(
            err,
            CompilerError::Syntax {
                kind: SyntaxError::MissingSemicolon,
                ..
            }
        ));
    }

    #[test]
    fn test_no_module_on_semantic_error() {
        let err = compile("int a = 1; int a = 2;", "unit").unwrap_err();
        assert_eq!(
            err,
            CompilerError::Semantic(SemanticError::RedeclaredVariable("a".to_string()))
        );
    }

    #[test]
    fn test_check_stops_before_lowering() {
        // Division by zero is caught by the checker even though lowering
        // would also choke on nothing here.
        let err = check("int a = 5; a = a / 0;").unwrap_err();
        assert_eq!(err, CompilerError::Semantic(SemanticError::DivisionByZero));
    }
}
