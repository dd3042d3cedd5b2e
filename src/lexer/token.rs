use std::fmt;

use crate::error::SourceLocation;

/// Token with the exact source text it was lexed from.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub lexeme: String,
    pub location: SourceLocation,
}

impl Token {
    /// Create a new token.
    pub fn new(kind: TokenKind, lexeme: String, location: SourceLocation) -> Self {
        Self {
            kind,
            lexeme,
            location,
        }
    }
}

/// Token types in the Loam language.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenKind {
    // Literals
    IntLiteral,

    // Identifiers and keywords
    Identifier,
    Keyword(Keyword),

    // Operators
    Operator(Operator),

    // Delimiters
    LeftParen,  // (
    RightParen, // )
    Colon,      // :
    Comma,      // ,
    Semicolon,  // ;

    // Special
    Eof,
    /// Byte the lexer does not recognize. Never a lex-time failure; the
    /// parser rejects it wherever a valid token is required.
    Unknown,
}

/// Loam language keywords.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Keyword {
    Int,
    If,
    Elif,
    Else,
    Loopc,
    And,
    Or,
    True,
    False,
    Begin,
    End,
}

impl Keyword {
    /// Parse a keyword from a string.
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "int" => Some(Self::Int),
            "if" => Some(Self::If),
            "elif" => Some(Self::Elif),
            "else" => Some(Self::Else),
            "loopc" => Some(Self::Loopc),
            "and" => Some(Self::And),
            "or" => Some(Self::Or),
            "true" => Some(Self::True),
            "false" => Some(Self::False),
            "begin" => Some(Self::Begin),
            "end" => Some(Self::End),
            _ => None,
        }
    }

    /// Get the string representation of a keyword.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Int => "int",
            Self::If => "if",
            Self::Elif => "elif",
            Self::Else => "else",
            Self::Loopc => "loopc",
            Self::And => "and",
            Self::Or => "or",
            Self::True => "true",
            Self::False => "false",
            Self::Begin => "begin",
            Self::End => "end",
        }
    }
}

impl fmt::Display for Keyword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Operators in the Loam language.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operator {
    // Arithmetic
    Plus,    // +
    Minus,   // -
    Star,    // *
    Slash,   // /
    Percent, // %
    Caret,   // ^

    // Comparison
    Equal,        // ==
    NotEqual,     // !=
    Less,         // <
    LessEqual,    // <=
    Greater,      // >
    GreaterEqual, // >=

    // Assignment
    Assign,        // =
    PlusAssign,    // +=
    MinusAssign,   // -=
    StarAssign,    // *=
    SlashAssign,   // /=
    PercentAssign, // %=
}

impl Operator {
    /// Get the string representation of an operator.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Plus => "+",
            Self::Minus => "-",
            Self::Star => "*",
            Self::Slash => "/",
            Self::Percent => "%",
            Self::Caret => "^",
            Self::Equal => "==",
            Self::NotEqual => "!=",
            Self::Less => "<",
            Self::LessEqual => "<=",
            Self::Greater => ">",
            Self::GreaterEqual => ">=",
            Self::Assign => "=",
            Self::PlusAssign => "+=",
            Self::MinusAssign => "-=",
            Self::StarAssign => "*=",
            Self::SlashAssign => "/=",
            Self::PercentAssign => "%=",
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keyword_from_str() {
        assert_eq!(Keyword::from_str("int"), Some(Keyword::Int));
        assert_eq!(Keyword::from_str("loopc"), Some(Keyword::Loopc));
        assert_eq!(Keyword::from_str("elif"), Some(Keyword::Elif));
        assert_eq!(Keyword::from_str("begin"), Some(Keyword::Begin));
        assert_eq!(Keyword::from_str("invalid"), None);
        assert_eq!(Keyword::from_str("loop"), None);
    }

    #[test]
    fn test_keyword_as_str() {
        assert_eq!(Keyword::Int.as_str(), "int");
        assert_eq!(Keyword::Loopc.as_str(), "loopc");
        assert_eq!(Keyword::End.as_str(), "end");
    }

    #[test]
    fn test_operator_as_str() {
        assert_eq!(Operator::Plus.as_str(), "+");
        assert_eq!(Operator::Equal.as_str(), "==");
        assert_eq!(Operator::Caret.as_str(), "^");
        assert_eq!(Operator::PercentAssign.as_str(), "%=");
    }

    #[test]
    fn test_token_creation() {
        let token = Token::new(
            TokenKind::Identifier,
            "counter".to_string(),
            crate::error::SourceLocation::new(1, 5),
        );
        assert_eq!(token.kind, TokenKind::Identifier);
        assert_eq!(token.lexeme, "counter");
        assert_eq!(token.location.line, 1);
        assert_eq!(token.location.column, 5);
    }
}
