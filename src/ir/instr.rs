//! IR instructions and block terminators.

use std::fmt;

use super::types::{BlockId, Constant, IrType, VReg};

/// An instruction in the IR.
#[derive(Debug, Clone, PartialEq)]
pub struct Instruction {
    /// Result register (None for void instructions)
    pub result: Option<VReg>,
    /// The instruction kind
    pub kind: InstrKind,
}

impl Instruction {
    pub fn new(result: Option<VReg>, kind: InstrKind) -> Self {
        Self { result, kind }
    }
}

/// Kinds of instructions.
#[derive(Debug, Clone, PartialEq)]
pub enum InstrKind {
    /// Load a constant value
    Const(Constant),

    /// Integer addition
    Add(VReg, VReg),
    /// Integer subtraction
    Sub(VReg, VReg),
    /// Integer multiplication
    Mul(VReg, VReg),
    /// Signed integer division
    SDiv(VReg, VReg),

    /// Bitwise AND (eager logical `and`)
    And(VReg, VReg),
    /// Bitwise OR (eager logical `or`)
    Or(VReg, VReg),

    /// Signed integer comparison
    ICmp(CmpOp, VReg, VReg),

    /// Allocate a storage slot in the procedure frame
    Alloca(IrType),
    /// Load from a slot
    Load(VReg),
    /// Store to a slot (ptr, value)
    Store(VReg, VReg),
}

/// Comparison predicates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CmpOp {
    /// Equal
    Eq,
    /// Not equal
    Ne,
    /// Signed less than
    Slt,
    /// Signed less than or equal
    Sle,
    /// Signed greater than
    Sgt,
    /// Signed greater than or equal
    Sge,
}

impl fmt::Display for CmpOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CmpOp::Eq => write!(f, "eq"),
            CmpOp::Ne => write!(f, "ne"),
            CmpOp::Slt => write!(f, "slt"),
            CmpOp::Sle => write!(f, "sle"),
            CmpOp::Sgt => write!(f, "sgt"),
            CmpOp::Sge => write!(f, "sge"),
        }
    }
}

/// Block terminators.
#[derive(Debug, Clone, PartialEq)]
pub enum Terminator {
    /// Return from the procedure
    Ret(Option<VReg>),
    /// Unconditional branch
    Br(BlockId),
    /// Conditional branch
    CondBr {
        cond: VReg,
        then_block: BlockId,
        else_block: BlockId,
    },
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(result) = self.result {
            write!(f, "{result} = ")?;
        }
        match &self.kind {
            InstrKind::Const(c) => write!(f, "const {c}"),
            InstrKind::Add(a, b) => write!(f, "add {a}, {b}"),
            InstrKind::Sub(a, b) => write!(f, "sub {a}, {b}"),
            InstrKind::Mul(a, b) => write!(f, "mul {a}, {b}"),
            InstrKind::SDiv(a, b) => write!(f, "sdiv {a}, {b}"),
            InstrKind::And(a, b) => write!(f, "and {a}, {b}"),
            InstrKind::Or(a, b) => write!(f, "or {a}, {b}"),
            InstrKind::ICmp(op, a, b) => write!(f, "icmp {op} {a}, {b}"),
            InstrKind::Alloca(ty) => write!(f, "alloca {ty}"),
            InstrKind::Load(ptr) => write!(f, "load {ptr}"),
            InstrKind::Store(ptr, value) => write!(f, "store {ptr}, {value}"),
        }
    }
}

impl fmt::Display for Terminator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Terminator::Ret(None) => write!(f, "ret void"),
            Terminator::Ret(Some(v)) => write!(f, "ret {v}"),
            Terminator::Br(block) => write!(f, "br {block}"),
            Terminator::CondBr {
                cond,
                then_block,
                else_block,
            } => write!(f, "br {cond}, {then_block}, {else_block}"),
        }
    }
}
