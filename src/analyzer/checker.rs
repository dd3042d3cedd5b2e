use std::collections::HashSet;

use crate::error::{CompilerError, CompilerResult, SemanticError};
use crate::parser::ast::{ArithOp, ElifBranch, Expression, Program, Statement};

/// Declaration and divisor checker for the Loam AST.
///
/// One pre-order walk over the program with a single flat set of declared
/// names. The language is intentionally not lexically scoped: a variable
/// declared anywhere is visible to every statement that follows it, at any
/// nesting depth, and the parser separately guarantees declarations only
/// occur at the top level. Checking stops at the first violation.
pub struct SemanticChecker {
    declared: HashSet<String>,
}

impl SemanticChecker {
    /// Create a new semantic checker.
    pub fn new() -> Self {
        Self {
            declared: HashSet::new(),
        }
    }

    /// Check a program.
    ///
    /// # Errors
    /// Returns `CompilerError::Semantic` on the first redeclared variable,
    /// undeclared variable reference, or literal zero divisor.
    pub fn check_program(&mut self, program: &Program) -> CompilerResult<()> {
        for statement in &program.statements {
            self.check_statement(statement)?;
        }
        Ok(())
    }

    fn check_statement(&mut self, statement: &Statement) -> CompilerResult<()> {
        match statement {
            Statement::Declaration { name, initializer } => {
                // The name is visible to its own initializer, matching the
                // single-pass insert-then-check order of the walk.
                if !self.declared.insert(name.clone()) {
                    return Err(CompilerError::Semantic(SemanticError::RedeclaredVariable(
                        name.clone(),
                    )));
                }
                self.check_expression(initializer)
            }

            Statement::Assignment { target, value } => {
                if !self.declared.contains(target) {
                    return Err(CompilerError::Semantic(SemanticError::UndeclaredVariable(
                        target.clone(),
                    )));
                }
                self.check_expression(value)
            }

            Statement::If {
                condition,
                body,
                elif_branches,
                else_body,
            } => {
                self.check_expression(condition)?;
                self.check_body(body)?;
                for ElifBranch { condition, body } in elif_branches {
                    self.check_expression(condition)?;
                    self.check_body(body)?;
                }
                if let Some(body) = else_body {
                    self.check_body(body)?;
                }
                Ok(())
            }

            Statement::Loop { condition, body } => {
                self.check_expression(condition)?;
                self.check_body(body)
            }
        }
    }

    fn check_body(&mut self, body: &[Statement]) -> CompilerResult<()> {
        for statement in body {
            self.check_statement(statement)?;
        }
        Ok(())
    }

    fn check_expression(&mut self, expression: &Expression) -> CompilerResult<()> {
        match expression {
            Expression::Number(_) | Expression::Boolean(_) => Ok(()),

            Expression::Identifier(name) => {
                if self.declared.contains(name) {
                    Ok(())
                } else {
                    Err(CompilerError::Semantic(SemanticError::UndeclaredVariable(
                        name.clone(),
                    )))
                }
            }

            Expression::Binary { op, left, right } => {
                self.check_expression(left)?;
                self.check_expression(right)?;
                if matches!(op, ArithOp::Div | ArithOp::Mod) && right.as_number() == Some(0) {
                    return Err(CompilerError::Semantic(SemanticError::DivisionByZero));
                }
                Ok(())
            }

            Expression::Logical { left, right, .. } => {
                self.check_expression(left)?;
                self.check_expression(right)
            }
        }
    }
}

impl Default for SemanticChecker {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::Tokenizer;
    use crate::parser::Parser;

    fn check_source(source: &str) -> CompilerResult<()> {
        let program = Parser::new(Tokenizer::new(source))
            .parse()
            .expect("parse failed");
        SemanticChecker::new().check_program(&program)
    }

    fn semantic_kind(result: CompilerResult<()>) -> SemanticError {
        match result {
            Err(CompilerError::Semantic(kind)) => kind,
            other => panic!("expected semantic error, got {other:?}"),
        }
    }

    #[test]
    fn test_valid_program_passes() {
        check_source("int a, b; a = 3; b = a % 2;").expect("check failed");
    }

    #[test]
    fn test_redeclared_variable() {
        let kind = semantic_kind(check_source("int a = 1; int a = 2;"));
        assert_eq!(kind, SemanticError::RedeclaredVariable("a".to_string()));
    }

    #[test]
    fn test_undeclared_variable_in_assignment_target() {
        let kind = semantic_kind(check_source("a = 1;"));
        assert_eq!(kind, SemanticError::UndeclaredVariable("a".to_string()));
    }

    #[test]
    fn test_undeclared_variable_in_expression() {
        let kind = semantic_kind(check_source("int a; a = b + 1;"));
        assert_eq!(kind, SemanticError::UndeclaredVariable("b".to_string()));
    }

    #[test]
    fn test_undeclared_variable_in_condition() {
        let kind = semantic_kind(check_source("int a; if b > 0: begin a = 1; end"));
        assert_eq!(kind, SemanticError::UndeclaredVariable("b".to_string()));
    }

    #[test]
    fn test_literal_zero_divisor() {
        let kind = semantic_kind(check_source("int a = 5; a = a / 0;"));
        assert_eq!(kind, SemanticError::DivisionByZero);
    }

    #[test]
    fn test_literal_zero_modulus() {
        let kind = semantic_kind(check_source("int a = 5; a = a % 0;"));
        assert_eq!(kind, SemanticError::DivisionByZero);
    }

    #[test]
    fn test_variable_divisor_is_accepted() {
        // Only a literal zero divisor is statically detectable.
        check_source("int a, b = 5, 0; a = a / b;").expect("check failed");
    }

    #[test]
    fn test_flat_scope_visibility_inside_nested_blocks() {
        check_source(
            "int a = 5; int b; \
             if a > 3: begin b = a + 1; loopc b > 0: begin b -= 1; end end",
        )
        .expect("check failed");
    }

    #[test]
    fn test_declaration_initializer_sees_its_own_name() {
        // Matches the walk order: the name is inserted before the
        // initializer is checked.
        check_source("int a = a;").expect("check failed");
    }

    #[test]
    fn test_first_error_wins() {
        // Both an undeclared use and a zero divisor: the earlier statement
        // reports first.
        let kind = semantic_kind(check_source("int a; a = b; a = a / 0;"));
        assert_eq!(kind, SemanticError::UndeclaredVariable("b".to_string()));
    }
}
