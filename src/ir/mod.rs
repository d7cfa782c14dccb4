//! The IR this pass operates over, plus a pretty-printer.
//!
//! # Erasure model
//!
//! Instructions are never physically removed from a block's `Vec` mid-pass:
//! a scalar instruction folded into a vector is overwritten in place with
//! `Instruction::Dead`, a tombstone (`ir::Instruction::Dead`). This keeps
//! every index a `PackList` or `Pair` already holds valid for the rest of
//! the current fixpoint iteration. `BasicBlock::compact` drops tombstones
//! between iterations, once nothing still references them by index.
//!
//! # Vector representation
//!
//! This IR has no first-class vector type or vector-typed `Value`; the pass
//! represents a width-2 vector purely operationally, as a pair of
//! `__slp_insert_lane`/`__slp_extract_lane` pseudo-calls built directly by
//! `passes::slp::rewrite` (see that module for why: the rewrite needs to
//! queue several insertions at different anchor points and replay the block
//! in one linear pass, which a single insertion cursor can't do without the
//! same index-shifting problem a tombstone-and-compact model exists to
//! avoid). That keeps `IrType` exactly as rich as the scalar source program
//! needs it to be (`spec.md` never asks for a vector *type*, only a vector
//! *instruction*), while still giving every constructed vector value a
//! `Value` identity that def-use and dominance queries treat like any other
//! instruction result.

pub mod display;
pub mod ir;

pub use ir::{
    for_each_operand_in_instruction, for_each_operand_in_terminator, BasicBlock, BlockId, CmpPred,
    Instruction, IrBinOp, IrConst, IrFunction, IrModule, IrType, Operand, ScalarKind, Terminator,
    Value,
};
