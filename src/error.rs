use thiserror::Error;

/// Compiler result type.
pub type CompilerResult<T> = Result<T, CompilerError>;

/// Top-level compiler error.
///
/// Every stage reports failure through one of these variants; the first
/// error aborts the compilation of the current source unit and no IR is
/// produced.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CompilerError {
    /// Structural errors raised by the parser
    #[error("Syntax error at {location}: {kind}")]
    Syntax {
        location: SourceLocation,
        kind: SyntaxError,
    },

    /// Declaration and divisor errors raised by the semantic checker
    #[error("Semantic error: {0}")]
    Semantic(SemanticError),

    /// Contract violations detected while building the IR
    #[error("Lowering error: {0}")]
    Lowering(LoweringError),
}

/// Syntax error kinds.
///
/// Each variant names one structural rule of the grammar; the parser stops
/// at the first violation.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SyntaxError {
    #[error("expected ';' after statement")]
    MissingSemicolon,

    #[error("expected ':' after condition")]
    MissingColon,

    #[error("expected ')' to close group")]
    MissingClosingParen,

    #[error("expected 'begin' after ':'")]
    ExpectedBegin,

    #[error("expected 'end' to close block")]
    MissingEnd,

    #[error("expected '=' in assignment")]
    ExpectedAssignment,

    #[error("declaration has more values than variables")]
    TooManyInitializers,

    #[error("expected a variable name")]
    ExpectedVariableName,

    #[error("expected a relational operator")]
    ExpectedRelationalOperator,

    #[error("expected a number, variable, or '('")]
    ExpectedFactor,

    #[error("declarations are only allowed at the top level")]
    DeclarationInNestedBlock,

    #[error("integer literal '{0}' is out of range")]
    IntegerOutOfRange(String),

    #[error("unexpected token '{0}'")]
    UnexpectedToken(String),
}

/// Semantic error kinds.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SemanticError {
    #[error("variable '{0}' is already declared")]
    RedeclaredVariable(String),

    #[error("variable '{0}' is not declared")]
    UndeclaredVariable(String),

    #[error("division by zero")]
    DivisionByZero,
}

/// Lowering error kinds.
///
/// These are contract violations on constructs the backend cannot express,
/// not user-facing language rules: the front end accepts the program and
/// the IR builder rejects it.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LoweringError {
    #[error("exponent must be a literal integer")]
    NonConstantExponent,

    #[error("exponent must be positive, got {0}")]
    NonPositiveExponent(i32),
}

/// Source position for error reporting, 1-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SourceLocation {
    pub line: usize,
    pub column: usize,
}

impl SourceLocation {
    /// Create a new source location.
    pub fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }
}

impl std::fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

impl CompilerError {
    /// Create a syntax error.
    pub fn syntax(location: SourceLocation, kind: SyntaxError) -> Self {
        Self::Syntax { location, kind }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_source_location_display() {
        let loc = SourceLocation::new(10, 5);
        assert_eq!(loc.to_string(), "10:5");
    }

    #[test]
    fn test_syntax_error_display() {
        let err = CompilerError::syntax(SourceLocation::new(3, 7), SyntaxError::MissingSemicolon);
        let msg = err.to_string();
        assert!(msg.contains("3:7"));
        assert!(msg.contains("expected ';'"));
    }

    #[test]
    fn test_semantic_error_display() {
        let err = CompilerError::Semantic(SemanticError::RedeclaredVariable("a".to_string()));
        assert!(err.to_string().contains("'a' is already declared"));
    }

    #[test]
    fn test_lowering_error_display() {
        let err = CompilerError::Lowering(LoweringError::NonPositiveExponent(-2));
        assert!(err.to_string().contains("got -2"));
    }
}
