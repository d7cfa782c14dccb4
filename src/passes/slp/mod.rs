//! Superword-level parallelism vectorization: find pairs of isomorphic,
//! independent scalar instructions in a basic block and fuse them into a
//! single width-2 vector instruction wherever that's both legal and
//! profitable.
//!
//! Pipeline, per block, per fixpoint iteration (`driver::run_on_block`):
//! seed search (`seed`) → pack growth (`pack`) → profitability scoring
//! (`score`) → schedulability check (`schedule`) → rewrite (`rewrite`).

pub mod driver;
pub mod pack;
pub mod rewrite;
pub mod schedule;
pub mod score;
pub mod seed;
pub mod stats;

use crate::common::config::SlpConfig;
use crate::ir::IrModule;

pub use stats::SlpStats;

/// Runs the pass over every function in `module`, returning aggregate
/// statistics across all of them.
pub fn run(module: &mut IrModule, config: &SlpConfig) -> SlpStats {
    let mut stats = SlpStats::new();
    for func in &mut module.functions {
        driver::run_on_function(func, config, &mut stats);
    }
    stats
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::{BasicBlock, BlockId, Instruction, IrBinOp, IrConst, IrFunction, IrType, Operand, ScalarKind, Terminator, Value};

    #[test]
    fn run_aggregates_stats_across_functions() {
        // Each function gets a two-level operand chain (a flat pair of
        // constant-only adds never grows past one pair, see
        // `pack::collect_isomorphic_insts`'s doc comment).
        let mut module = IrModule::new();
        for fi in 0..2 {
            let mut func = IrFunction::new(format!("f{fi}"), IrType::Void, vec![], false);
            let mut block = BasicBlock::new(BlockId(0), Terminator::Return(None));
            block.instructions.push(Instruction::BinOp {
                dest: Value(0),
                op: IrBinOp::Add,
                ty: IrType::Scalar(ScalarKind::I32),
                lhs: Operand::Const(IrConst::I32(1)),
                rhs: Operand::Const(IrConst::I32(2)),
            });
            block.instructions.push(Instruction::BinOp {
                dest: Value(1),
                op: IrBinOp::Add,
                ty: IrType::Scalar(ScalarKind::I32),
                lhs: Operand::Const(IrConst::I32(3)),
                rhs: Operand::Const(IrConst::I32(4)),
            });
            block.instructions.push(Instruction::BinOp {
                dest: Value(2),
                op: IrBinOp::Add,
                ty: IrType::Scalar(ScalarKind::I32),
                lhs: Operand::Value(Value(0)),
                rhs: Operand::Const(IrConst::I32(10)),
            });
            block.instructions.push(Instruction::BinOp {
                dest: Value(3),
                op: IrBinOp::Add,
                ty: IrType::Scalar(ScalarKind::I32),
                lhs: Operand::Value(Value(1)),
                rhs: Operand::Const(IrConst::I32(20)),
            });
            func.reserve_value(Value(3));
            func.blocks.push(block);
            module.functions.push(func);
        }

        let stats = run(&mut module, &SlpConfig::default());
        assert_eq!(stats.count(2), 2);
    }
}
