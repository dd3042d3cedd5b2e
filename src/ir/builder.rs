//! Builder for constructing a single procedure's control-flow graph.

use super::instr::{InstrKind, Instruction, Terminator};
use super::types::{BasicBlock, BlockId, Function, IrType, VReg};

/// Builder for one function's blocks and registers.
///
/// Unlike a purely sequential emitter, the insert point can move back to any
/// existing block and terminators can be set after the fact; the elif chain
/// wires each condition block's false edge only once the next branch's
/// condition block exists.
pub struct FuncBuilder {
    next_vreg: u32,
    blocks: Vec<BasicBlock>,
    current: BlockId,
}

impl FuncBuilder {
    /// Create a builder with an empty entry block as the insert point.
    pub fn new() -> Self {
        let entry = BasicBlock::new(BlockId(0)).with_label("entry");
        Self {
            next_vreg: 0,
            blocks: vec![entry],
            current: BlockId(0),
        }
    }

    /// Create a fresh virtual register.
    pub fn fresh_vreg(&mut self) -> VReg {
        let vreg = VReg(self.next_vreg);
        self.next_vreg += 1;
        vreg
    }

    /// Create a new labeled block. Block ids are also indices into the
    /// function's block list.
    pub fn create_block(&mut self, label: &str) -> BlockId {
        let id = BlockId(self.blocks.len() as u32);
        self.blocks.push(BasicBlock::new(id).with_label(label));
        id
    }

    /// Move the insert point to the given block.
    pub fn switch_to(&mut self, block: BlockId) {
        self.current = block;
    }

    /// The block instructions are currently inserted into.
    pub fn current_block(&self) -> BlockId {
        self.current
    }

    fn block_mut(&mut self, id: BlockId) -> &mut BasicBlock {
        &mut self.blocks[id.0 as usize]
    }

    /// Emit an instruction producing a value into the current block.
    pub fn emit(&mut self, kind: InstrKind) -> VReg {
        let result = self.fresh_vreg();
        let current = self.current;
        self.block_mut(current)
            .instructions
            .push(Instruction::new(Some(result), kind));
        result
    }

    /// Emit a void instruction into the current block.
    pub fn emit_void(&mut self, kind: InstrKind) {
        let current = self.current;
        self.block_mut(current)
            .instructions
            .push(Instruction::new(None, kind));
    }

    /// Allocate a variable slot.
    ///
    /// The alloca always lands in the entry block, wherever the insert
    /// point is: all storage lives for the whole procedure.
    pub fn alloc_slot(&mut self) -> VReg {
        let result = self.fresh_vreg();
        self.block_mut(BlockId(0))
            .instructions
            .push(Instruction::new(Some(result), InstrKind::Alloca(IrType::I32)));
        result
    }

    /// Set the terminator of an arbitrary block.
    pub fn set_terminator(&mut self, block: BlockId, terminator: Terminator) {
        self.block_mut(block).terminator = Some(terminator);
    }

    /// Terminate the current block with an unconditional branch.
    pub fn br(&mut self, target: BlockId) {
        let current = self.current;
        self.set_terminator(current, Terminator::Br(target));
    }

    /// Terminate the current block with a conditional branch.
    pub fn cond_br(&mut self, cond: VReg, then_block: BlockId, else_block: BlockId) {
        let current = self.current;
        self.set_terminator(
            current,
            Terminator::CondBr {
                cond,
                then_block,
                else_block,
            },
        );
    }

    /// Terminate the current block with a return.
    pub fn ret(&mut self, value: Option<VReg>) {
        let current = self.current;
        self.set_terminator(current, Terminator::Ret(value));
    }

    /// Finish building and return the function.
    pub fn finish(self, name: impl Into<String>, ret_type: IrType) -> Function {
        Function::new(name, ret_type, self.blocks)
    }
}

impl Default for FuncBuilder {
    fn default() -> Self {
        Self::new()
    }
}
