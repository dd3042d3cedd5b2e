use std::mem;

use super::ast::*;
use crate::error::{CompilerError, CompilerResult, SyntaxError};
use crate::lexer::token::{Keyword, Operator, TokenKind};
use crate::lexer::{Token, Tokenizer};

/// Recursive descent parser for the Loam language.
///
/// Pulls tokens lazily from the tokenizer and keeps exactly one lookahead
/// token; there is no backtracking. The first structural mismatch aborts
/// parsing with a syntax error and no partial AST is returned.
pub struct Parser {
    tokenizer: Tokenizer,
    current: Token,
}

impl Parser {
    /// Create a new parser over a token stream.
    pub fn new(mut tokenizer: Tokenizer) -> Self {
        let current = tokenizer.next_token();
        Self { tokenizer, current }
    }

    /// Parse the token stream into an AST.
    ///
    /// # Errors
    /// Returns `CompilerError::Syntax` if parsing fails
    pub fn parse(&mut self) -> CompilerResult<Program> {
        let mut statements = Vec::new();

        // The program ends at the first token that starts no statement.
        loop {
            match &self.current.kind {
                TokenKind::Identifier => statements.push(self.parse_assignment()?),
                TokenKind::Keyword(Keyword::Int) => {
                    statements.extend(self.parse_declaration()?);
                }
                TokenKind::Keyword(Keyword::If) => statements.push(self.parse_if()?),
                TokenKind::Keyword(Keyword::Loopc) => statements.push(self.parse_loop()?),
                _ => break,
            }
        }

        Ok(Program::new(statements))
    }

    /// Parse a declaration statement: "int" ident ("," ident)* ("=" expr ("," expr)*)? ";"
    ///
    /// Each declared name becomes its own `Declaration` statement, values
    /// consumed left-to-right. Missing values zero-fill; surplus values are
    /// an error.
    fn parse_declaration(&mut self) -> CompilerResult<Vec<Statement>> {
        self.advance(); // int

        let mut names = vec![self.consume_variable_name()?];
        while self.match_token(TokenKind::Comma) {
            names.push(self.consume_variable_name()?);
        }

        let mut values = Vec::new();
        if !self.check_token(TokenKind::Semicolon) {
            if !self.match_operator(Operator::Assign) {
                return Err(self.error(SyntaxError::ExpectedAssignment));
            }
            values.push(self.parse_expression()?);
            while self.match_token(TokenKind::Comma) {
                values.push(self.parse_expression()?);
            }
        }

        if values.len() > names.len() {
            return Err(self.error(SyntaxError::TooManyInitializers));
        }

        self.consume_semicolon()?;

        let mut values = values.into_iter();
        Ok(names
            .into_iter()
            .map(|name| Statement::Declaration {
                name,
                initializer: values.next().unwrap_or(Expression::Number(0)),
            })
            .collect())
    }

    /// Parse an assignment statement, desugaring compound operators.
    ///
    /// `x op= e` becomes `x = x op e` in the AST, so later stages only ever
    /// see plain assignments.
    fn parse_assignment(&mut self) -> CompilerResult<Statement> {
        let target = self.consume_variable_name()?;

        let compound = match &self.current.kind {
            TokenKind::Operator(Operator::PlusAssign) => Some(ArithOp::Add),
            TokenKind::Operator(Operator::MinusAssign) => Some(ArithOp::Sub),
            TokenKind::Operator(Operator::StarAssign) => Some(ArithOp::Mul),
            TokenKind::Operator(Operator::SlashAssign) => Some(ArithOp::Div),
            TokenKind::Operator(Operator::PercentAssign) => Some(ArithOp::Mod),
            _ => None,
        };

        let value = if let Some(op) = compound {
            self.advance();
            let rhs = self.parse_expression()?;
            Expression::binary(op, Expression::Identifier(target.clone()), rhs)
        } else if self.match_operator(Operator::Assign) {
            self.parse_expression()?
        } else {
            return Err(self.error(SyntaxError::ExpectedAssignment));
        };

        self.consume_semicolon()?;
        Ok(Statement::Assignment { target, value })
    }

    /// Parse an if statement with its elif ladder and optional else branch.
    fn parse_if(&mut self) -> CompilerResult<Statement> {
        self.advance(); // if

        let condition = self.parse_condition()?;
        let body = self.parse_bracketed_body()?;

        let mut elif_branches = Vec::new();
        while self.check_keyword(Keyword::Elif) {
            self.advance();
            let condition = self.parse_condition()?;
            let body = self.parse_bracketed_body()?;
            elif_branches.push(ElifBranch { condition, body });
        }

        let else_body = if self.match_keyword(Keyword::Else) {
            Some(self.parse_bracketed_body()?)
        } else {
            None
        };

        Ok(Statement::If {
            condition,
            body,
            elif_branches,
            else_body,
        })
    }

    /// Parse a pre-test loop statement.
    fn parse_loop(&mut self) -> CompilerResult<Statement> {
        self.advance(); // loopc

        let condition = self.parse_condition()?;
        let body = self.parse_bracketed_body()?;

        Ok(Statement::Loop { condition, body })
    }

    /// Parse ":" "begin" statement* "end" around a nested body.
    fn parse_bracketed_body(&mut self) -> CompilerResult<Vec<Statement>> {
        if !self.match_token(TokenKind::Colon) {
            return Err(self.error(SyntaxError::MissingColon));
        }
        if !self.match_keyword(Keyword::Begin) {
            return Err(self.error(SyntaxError::ExpectedBegin));
        }

        let body = self.parse_block_body()?;

        if !self.match_keyword(Keyword::End) {
            return Err(self.error(SyntaxError::MissingEnd));
        }
        Ok(body)
    }

    /// Parse the statements of a nested block.
    ///
    /// Declarations are rejected here: the language is flat-scoped and only
    /// the outermost statement sequence may introduce variables.
    fn parse_block_body(&mut self) -> CompilerResult<Vec<Statement>> {
        let mut statements = Vec::new();

        loop {
            match &self.current.kind {
                TokenKind::Identifier => statements.push(self.parse_assignment()?),
                TokenKind::Keyword(Keyword::Int) => {
                    return Err(self.error(SyntaxError::DeclarationInNestedBlock));
                }
                TokenKind::Keyword(Keyword::If) => statements.push(self.parse_if()?),
                TokenKind::Keyword(Keyword::Loopc) => statements.push(self.parse_loop()?),
                _ => break,
            }
        }

        Ok(statements)
    }

    /// Parse a condition: subcondition (("and"|"or") condition)?
    ///
    /// The connectives are right-associative and bind loosest.
    fn parse_condition(&mut self) -> CompilerResult<Expression> {
        let left = self.parse_subcondition()?;

        if self.match_keyword(Keyword::And) {
            let right = self.parse_condition()?;
            Ok(Expression::logical(BoolOp::And, left, right))
        } else if self.match_keyword(Keyword::Or) {
            let right = self.parse_condition()?;
            Ok(Expression::logical(BoolOp::Or, left, right))
        } else {
            Ok(left)
        }
    }

    /// Parse a single subcondition: a parenthesized condition, a boolean
    /// literal, or `expr relop expr`.
    fn parse_subcondition(&mut self) -> CompilerResult<Expression> {
        if self.match_token(TokenKind::LeftParen) {
            let inner = self.parse_condition()?;
            if !self.match_token(TokenKind::RightParen) {
                return Err(self.error(SyntaxError::MissingClosingParen));
            }
            return Ok(inner);
        }

        if self.match_keyword(Keyword::True) {
            return Ok(Expression::Boolean(true));
        }
        if self.match_keyword(Keyword::False) {
            return Ok(Expression::Boolean(false));
        }

        let left = self.parse_expression()?;

        let op = match &self.current.kind {
            TokenKind::Operator(Operator::Less) => BoolOp::Less,
            TokenKind::Operator(Operator::LessEqual) => BoolOp::LessEqual,
            TokenKind::Operator(Operator::Greater) => BoolOp::Greater,
            TokenKind::Operator(Operator::GreaterEqual) => BoolOp::GreaterEqual,
            TokenKind::Operator(Operator::Equal) => BoolOp::Equal,
            TokenKind::Operator(Operator::NotEqual) => BoolOp::NotEqual,
            _ => return Err(self.error(SyntaxError::ExpectedRelationalOperator)),
        };
        self.advance();

        let right = self.parse_expression()?;
        Ok(Expression::logical(op, left, right))
    }

    /// Parse an expression: term (("+"|"-") term)*
    fn parse_expression(&mut self) -> CompilerResult<Expression> {
        let mut left = self.parse_term()?;

        loop {
            let op = match &self.current.kind {
                TokenKind::Operator(Operator::Plus) => ArithOp::Add,
                TokenKind::Operator(Operator::Minus) => ArithOp::Sub,
                _ => break,
            };
            self.advance();
            let right = self.parse_term()?;
            left = Expression::binary(op, left, right);
        }

        Ok(left)
    }

    /// Parse a term: power (("*"|"/"|"%") power)*
    fn parse_term(&mut self) -> CompilerResult<Expression> {
        let mut left = self.parse_power()?;

        loop {
            let op = match &self.current.kind {
                TokenKind::Operator(Operator::Star) => ArithOp::Mul,
                TokenKind::Operator(Operator::Slash) => ArithOp::Div,
                TokenKind::Operator(Operator::Percent) => ArithOp::Mod,
                _ => break,
            };
            self.advance();
            let right = self.parse_power()?;
            left = Expression::binary(op, left, right);
        }

        Ok(left)
    }

    /// Parse a power: factor ("^" factor)*
    ///
    /// Exponents must reduce to literal integers, but that is a lowering
    /// concern; the grammar accepts any factor on the right.
    fn parse_power(&mut self) -> CompilerResult<Expression> {
        let mut left = self.parse_factor()?;

        while self.match_operator(Operator::Caret) {
            let right = self.parse_factor()?;
            left = Expression::binary(ArithOp::Pow, left, right);
        }

        Ok(left)
    }

    /// Parse a factor: number, identifier, or parenthesized expression.
    fn parse_factor(&mut self) -> CompilerResult<Expression> {
        match &self.current.kind {
            TokenKind::IntLiteral => {
                let token = self.advance();
                let value = token.lexeme.parse::<i32>().map_err(|_| {
                    CompilerError::syntax(
                        token.location,
                        SyntaxError::IntegerOutOfRange(token.lexeme.clone()),
                    )
                })?;
                Ok(Expression::Number(value))
            }
            TokenKind::Identifier => {
                let token = self.advance();
                Ok(Expression::Identifier(token.lexeme))
            }
            TokenKind::LeftParen => {
                self.advance();
                let expr = self.parse_expression()?;
                if !self.match_token(TokenKind::RightParen) {
                    return Err(self.error(SyntaxError::MissingClosingParen));
                }
                Ok(expr)
            }
            _ => Err(self.error(SyntaxError::ExpectedFactor)),
        }
    }

    // Helper methods for token manipulation

    /// Replace the lookahead with the next token and return the old one.
    fn advance(&mut self) -> Token {
        let next = self.tokenizer.next_token();
        mem::replace(&mut self.current, next)
    }

    fn check_token(&self, kind: TokenKind) -> bool {
        self.current.kind == kind
    }

    fn check_keyword(&self, keyword: Keyword) -> bool {
        matches!(self.current.kind, TokenKind::Keyword(k) if k == keyword)
    }

    fn match_token(&mut self, kind: TokenKind) -> bool {
        if self.check_token(kind) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn match_keyword(&mut self, keyword: Keyword) -> bool {
        if self.check_keyword(keyword) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn match_operator(&mut self, operator: Operator) -> bool {
        if matches!(self.current.kind, TokenKind::Operator(op) if op == operator) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn consume_variable_name(&mut self) -> CompilerResult<String> {
        if matches!(self.current.kind, TokenKind::Identifier) {
            Ok(self.advance().lexeme)
        } else {
            Err(self.error(SyntaxError::ExpectedVariableName))
        }
    }

    fn consume_semicolon(&mut self) -> CompilerResult<()> {
        if self.match_token(TokenKind::Semicolon) {
            Ok(())
        } else {
            Err(self.error(SyntaxError::MissingSemicolon))
        }
    }

    fn error(&self, kind: SyntaxError) -> CompilerError {
        CompilerError::syntax(self.current.location, kind)
    }
}
