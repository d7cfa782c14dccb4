//! Pack construction: growing a seed pair into a `PackList` by walking
//! matching operand chains (`spec.md` §4.2's `CollectIsomorphicInsts`).
//!
//! The original recursive formulation is restated here as an explicit
//! work-stack (`spec.md` §9 Open Question: unbounded operand-chain depth
//! should not grow the Rust call stack for a pass meant to run on
//! arbitrarily large straight-line blocks).

use crate::common::fx_hash::FxHashSet;
use crate::ir::{BasicBlock, IrFunction, Operand};

use super::seed::{is_isomorphic, local_def, should_vectorize, IsoBlock};

/// One matched instruction pair, stored as same-block instruction indices
/// with `lo` always the dominating (earlier) side — dominance within a
/// single-entry single-exit block is exactly program order, so `lo < hi`
/// always holds for a pair that passed `should_vectorize`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pair {
    pub lo: usize,
    pub hi: usize,
}

/// A set of pairs discovered from one seed, in dominance order (`lo`
/// ascending), plus the set of instruction indices already claimed by some
/// pair in the list and the list's profitability score once computed.
#[derive(Debug, Clone, Default)]
pub struct PackList {
    pub pairs: Vec<Pair>,
    pub visited: FxHashSet<usize>,
    pub score: i32,
}

impl PackList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// Inserts a pair, keeping `pairs` sorted by `lo` ascending (dominance
    /// order), and marks both sides visited. No-op if either side is
    /// already claimed — callers are expected to have checked that first.
    fn add_pair(&mut self, lo: usize, hi: usize) {
        let at = self.pairs.partition_point(|p| p.lo < lo);
        self.pairs.insert(at, Pair { lo, hi });
        self.visited.insert(lo);
        self.visited.insert(hi);
    }
}

/// Grows a `PackList` from the seed pair `(seed_i, seed_j)` by repeatedly
/// matching operand slots and pushing newly-discovered isomorphic operand
/// pairs onto a work stack, same as a recursive descent but with an
/// explicit `Vec` standing in for the call stack.
///
/// Returns `None` if the seed itself isn't eligible; an eligible seed
/// always yields `Some`, even a list of size 1 (the caller filters those
/// out before scoring, per `spec.md` §4.3's "lists of fewer than two pairs
/// are not worth vectorizing").
pub fn collect_isomorphic_insts(block: &BasicBlock, func: &IrFunction, seed_i: usize, seed_j: usize) -> Option<PackList> {
    if !should_vectorize(block, seed_i, seed_j) {
        return None;
    }

    let mut list = PackList::new();
    let mut stack = vec![(seed_i, seed_j)];
    let iso = IsoBlock::new(block, func);

    while let Some((i, j)) = stack.pop() {
        if !should_vectorize(block, i, j) {
            continue;
        }
        if list.visited.contains(&i) || list.visited.contains(&j) {
            continue;
        }
        let (lo, hi) = if i < j { (i, j) } else { (j, i) };
        list.add_pair(lo, hi);

        let inst_i = &block.instructions[i];
        let inst_j = &block.instructions[j];
        for k in 0..inst_i.arity() {
            let (Some(op_i), Some(op_j)) = (inst_i.operand(k), inst_j.operand(k)) else { continue };
            if let (Operand::Value(vi), Operand::Value(vj)) = (op_i, op_j) {
                let (Some(oi), Some(oj)) = (local_def(block, vi), local_def(block, vj)) else { continue };
                if is_isomorphic(&iso, oi, oj) {
                    stack.push((oi, oj));
                }
            }
            // Constant operand pairs need no further growth: they either
            // already matched in `is_isomorphic`'s type check or the pair
            // was rejected there.
        }
    }

    Some(list)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::{BasicBlock, BlockId, IrBinOp, IrConst, IrFunction, IrType, Operand, ScalarKind, Terminator, Value};

    fn add(dest: u32, lhs: Operand, rhs: Operand) -> crate::ir::Instruction {
        crate::ir::Instruction::BinOp { dest: Value(dest), op: IrBinOp::Add, ty: IrType::Scalar(ScalarKind::I32), lhs, rhs }
    }

    #[test]
    fn grows_through_matching_operand_chain() {
        let mut func = IrFunction::new("f".into(), IrType::Void, vec![], false);
        let mut block = BasicBlock::new(BlockId(0), Terminator::Return(None));
        // %0 = add 1, 2 ; %1 = add 3, 4 ; %2 = add %0, 10 ; %3 = add %1, 20
        block.instructions.push(add(0, Operand::Const(IrConst::I32(1)), Operand::Const(IrConst::I32(2))));
        block.instructions.push(add(1, Operand::Const(IrConst::I32(3)), Operand::Const(IrConst::I32(4))));
        block.instructions.push(add(2, Operand::Value(Value(0)), Operand::Const(IrConst::I32(10))));
        block.instructions.push(add(3, Operand::Value(Value(1)), Operand::Const(IrConst::I32(20))));
        func.blocks.push(block.clone());

        let list = collect_isomorphic_insts(&block, &func, 2, 3).expect("seed eligible");
        assert_eq!(list.len(), 2);
        assert!(list.pairs.contains(&Pair { lo: 0, hi: 1 }));
        assert!(list.pairs.contains(&Pair { lo: 2, hi: 3 }));
    }

    #[test]
    fn ineligible_seed_yields_none() {
        let mut func = IrFunction::new("f".into(), IrType::Void, vec![], false);
        let mut block = BasicBlock::new(BlockId(0), Terminator::Return(None));
        block.instructions.push(add(0, Operand::Const(IrConst::I32(1)), Operand::Const(IrConst::I32(2))));
        func.blocks.push(block.clone());
        assert!(collect_isomorphic_insts(&block, &func, 0, 0).is_none());
    }

    #[test]
    fn stops_growth_at_mismatched_operand_types() {
        let mut func = IrFunction::new("f".into(), IrType::Void, vec![], false);
        let mut block = BasicBlock::new(BlockId(0), Terminator::Return(None));
        block.instructions.push(add(0, Operand::Const(IrConst::I32(1)), Operand::Const(IrConst::I32(2))));
        block.instructions.push(crate::ir::Instruction::BinOp {
            dest: Value(1),
            op: IrBinOp::FAdd,
            ty: IrType::Scalar(ScalarKind::F32),
            lhs: Operand::Const(IrConst::F32(1.0)),
            rhs: Operand::Const(IrConst::F32(2.0)),
        });
        block.instructions.push(add(2, Operand::Value(Value(0)), Operand::Const(IrConst::I32(10))));
        block.instructions.push(add(3, Operand::Value(Value(1)), Operand::Const(IrConst::I32(20))));
        func.blocks.push(block.clone());

        // seed (2,3) itself rejected: BinOp opcodes both add, fine, but
        // this seed's own types/operand-0 types differ (i32 vs f32 values)
        // so the seed pair never becomes isomorphic in the first place.
        let list = collect_isomorphic_insts(&block, &func, 2, 3);
        assert!(list.is_none() || list.unwrap().len() <= 1);
    }
}
