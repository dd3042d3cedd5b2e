//! Lowering from the AST to the control-flow-graph IR.

use std::collections::HashMap;

use super::builder::FuncBuilder;
use super::instr::{CmpOp, InstrKind, Terminator};
use super::types::{Constant, IrType, Module, VReg};
use crate::error::{CompilerError, CompilerResult, LoweringError};
use crate::parser::ast::{ArithOp, BoolOp, ElifBranch, Expression, Program, Statement};

/// Lowers a validated program into one entry procedure.
///
/// Variables are memory slots, not registers: each declared name maps to an
/// alloca in the entry block and every read/write goes through load/store.
/// Lowering assumes the semantic pass already ran; it does not re-validate
/// declaration or scope rules.
struct Lowering {
    builder: FuncBuilder,
    slots: HashMap<String, VReg>,
}

/// Lower a program to an IR module containing its entry procedure.
///
/// # Errors
/// Returns `CompilerError::Lowering` when `^` is applied with a non-literal
/// or non-positive exponent.
pub fn lower_program(program: &Program, module_name: &str) -> CompilerResult<Module> {
    let mut lowering = Lowering::new();
    lowering.lower_body(&program.statements)?;

    let status = lowering.builder.emit(InstrKind::Const(Constant::Int(0)));
    lowering.builder.ret(Some(status));

    let mut module = Module::new(module_name);
    module
        .functions
        .push(lowering.builder.finish("main", IrType::I32));
    Ok(module)
}

impl Lowering {
    fn new() -> Self {
        Self {
            builder: FuncBuilder::new(),
            slots: HashMap::new(),
        }
    }

    fn lower_body(&mut self, statements: &[Statement]) -> CompilerResult<()> {
        for statement in statements {
            self.lower_statement(statement)?;
        }
        Ok(())
    }

    fn lower_statement(&mut self, statement: &Statement) -> CompilerResult<()> {
        match statement {
            Statement::Declaration { name, initializer } => {
                let value = self.lower_expression(initializer)?;
                let slot = self.slot_for(name);
                self.builder.emit_void(InstrKind::Store(slot, value));
                Ok(())
            }

            Statement::Assignment { target, value } => {
                let value = self.lower_expression(value)?;
                let slot = self.slot_for(target);
                self.builder.emit_void(InstrKind::Store(slot, value));
                Ok(())
            }

            Statement::If {
                condition,
                body,
                elif_branches,
                else_body,
            } => self.lower_if(condition, body, elif_branches, else_body.as_deref()),

            Statement::Loop { condition, body } => self.lower_loop(condition, body),
        }
    }

    /// Lower an if/elif/else ladder.
    ///
    /// One condition block and one body block per branch plus one shared
    /// after block. Each condition block's true edge targets its own body;
    /// the false edge targets the next condition block, the else body, or
    /// the after block. Every body converges on the after block. Wiring
    /// happens in source order of the chain.
    fn lower_if(
        &mut self,
        condition: &Expression,
        body: &[Statement],
        elif_branches: &[ElifBranch],
        else_body: Option<&[Statement]>,
    ) -> CompilerResult<()> {
        let cond_block = self.builder.create_block("if.cond");
        let body_block = self.builder.create_block("if.body");
        let after_block = self.builder.create_block("after.if");

        self.builder.br(cond_block);

        self.builder.switch_to(cond_block);
        let cond_value = self.lower_expression(condition)?;

        self.builder.switch_to(body_block);
        self.lower_body(body)?;
        self.builder.br(after_block);

        // The false edge of each condition block is only known once the
        // next link of the chain exists.
        let mut prev_cond_block = cond_block;
        let mut prev_cond_value = cond_value;
        let mut prev_body_block = body_block;

        for branch in elif_branches {
            let elif_cond_block = self.builder.create_block("elif.cond");
            let elif_body_block = self.builder.create_block("elif.body");

            self.builder.set_terminator(
                prev_cond_block,
                Terminator::CondBr {
                    cond: prev_cond_value,
                    then_block: prev_body_block,
                    else_block: elif_cond_block,
                },
            );

            self.builder.switch_to(elif_cond_block);
            let elif_cond_value = self.lower_expression(&branch.condition)?;

            self.builder.switch_to(elif_body_block);
            self.lower_body(&branch.body)?;
            self.builder.br(after_block);

            prev_cond_block = elif_cond_block;
            prev_cond_value = elif_cond_value;
            prev_body_block = elif_body_block;
        }

        let false_target = match else_body {
            Some(body) => {
                let else_block = self.builder.create_block("else.body");
                self.builder.switch_to(else_block);
                self.lower_body(body)?;
                self.builder.br(after_block);
                else_block
            }
            None => after_block,
        };

        self.builder.set_terminator(
            prev_cond_block,
            Terminator::CondBr {
                cond: prev_cond_value,
                then_block: prev_body_block,
                else_block: false_target,
            },
        );

        self.builder.switch_to(after_block);
        Ok(())
    }

    /// Lower a pre-test loop: zero or more iterations.
    fn lower_loop(&mut self, condition: &Expression, body: &[Statement]) -> CompilerResult<()> {
        let cond_block = self.builder.create_block("loop.cond");
        let body_block = self.builder.create_block("loop.body");
        let after_block = self.builder.create_block("after.loop");

        self.builder.br(cond_block);

        self.builder.switch_to(cond_block);
        let cond_value = self.lower_expression(condition)?;
        self.builder.cond_br(cond_value, body_block, after_block);

        self.builder.switch_to(body_block);
        self.lower_body(body)?;
        self.builder.br(cond_block);

        self.builder.switch_to(after_block);
        Ok(())
    }

    fn lower_expression(&mut self, expression: &Expression) -> CompilerResult<VReg> {
        match expression {
            Expression::Number(value) => {
                Ok(self.builder.emit(InstrKind::Const(Constant::Int(*value))))
            }

            Expression::Boolean(value) => {
                Ok(self.builder.emit(InstrKind::Const(Constant::Bool(*value))))
            }

            Expression::Identifier(name) => {
                let slot = self.slot_for(name);
                Ok(self.builder.emit(InstrKind::Load(slot)))
            }

            Expression::Binary { op, left, right } => self.lower_binary(*op, left, right),

            Expression::Logical { op, left, right } => {
                // Both operands are always evaluated; `and`/`or` combine
                // the finished values eagerly, with no short-circuit.
                let left = self.lower_expression(left)?;
                let right = self.lower_expression(right)?;
                let kind = match op {
                    BoolOp::And => InstrKind::And(left, right),
                    BoolOp::Or => InstrKind::Or(left, right),
                    BoolOp::Less => InstrKind::ICmp(CmpOp::Slt, left, right),
                    BoolOp::LessEqual => InstrKind::ICmp(CmpOp::Sle, left, right),
                    BoolOp::Greater => InstrKind::ICmp(CmpOp::Sgt, left, right),
                    BoolOp::GreaterEqual => InstrKind::ICmp(CmpOp::Sge, left, right),
                    BoolOp::Equal => InstrKind::ICmp(CmpOp::Eq, left, right),
                    BoolOp::NotEqual => InstrKind::ICmp(CmpOp::Ne, left, right),
                };
                Ok(self.builder.emit(kind))
            }
        }
    }

    fn lower_binary(
        &mut self,
        op: ArithOp,
        left: &Expression,
        right: &Expression,
    ) -> CompilerResult<VReg> {
        if op == ArithOp::Pow {
            return self.lower_pow(left, right);
        }
        if op == ArithOp::Mod {
            return self.lower_mod(left, right);
        }

        let left = self.lower_expression(left)?;
        let right = self.lower_expression(right)?;
        let kind = match op {
            ArithOp::Add => InstrKind::Add(left, right),
            ArithOp::Sub => InstrKind::Sub(left, right),
            ArithOp::Mul => InstrKind::Mul(left, right),
            ArithOp::Div => InstrKind::SDiv(left, right),
            ArithOp::Mod | ArithOp::Pow => unreachable!("handled above"),
        };
        Ok(self.builder.emit(kind))
    }

    /// Exponentiation unrolls to repeated multiplication at compile time.
    ///
    /// The exponent must be a literal integer >= 1; there is no runtime
    /// exponentiation.
    fn lower_pow(&mut self, base: &Expression, exponent: &Expression) -> CompilerResult<VReg> {
        let power = exponent
            .as_number()
            .ok_or(CompilerError::Lowering(LoweringError::NonConstantExponent))?;
        if power < 1 {
            return Err(CompilerError::Lowering(LoweringError::NonPositiveExponent(
                power,
            )));
        }

        let base = self.lower_expression(base)?;
        let mut result = base;
        for _ in 1..power {
            result = self.builder.emit(InstrKind::Mul(result, base));
        }
        Ok(result)
    }

    /// `%` synthesized as `left - (left / right) * right`, matching signed
    /// truncating division.
    fn lower_mod(&mut self, left: &Expression, right: &Expression) -> CompilerResult<VReg> {
        let left = self.lower_expression(left)?;
        let right = self.lower_expression(right)?;
        let quotient = self.builder.emit(InstrKind::SDiv(left, right));
        let product = self.builder.emit(InstrKind::Mul(quotient, right));
        Ok(self.builder.emit(InstrKind::Sub(left, product)))
    }

    /// The slot for a variable, allocated in the entry block on first use.
    fn slot_for(&mut self, name: &str) -> VReg {
        if let Some(&slot) = self.slots.get(name) {
            return slot;
        }
        let slot = self.builder.alloc_slot();
        self.slots.insert(name.to_string(), slot);
        slot
    }
}
