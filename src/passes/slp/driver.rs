//! Per-block search-and-apply loop (`spec.md` §4.7): scan every instruction
//! pair for the best-scoring pack, vectorize it, and repeat against the
//! updated block until nothing changes or the iteration cap is hit.
//!
//! Mirrors the teacher compiler's fixpoint-loop pass shape
//! (`passes::cfg_simplify::run`): `loop { changed = sub-passes; if changed
//! == 0 { break } }`, just specialized to a single block-local search
//! instead of several independent simplifications.

use crate::common::config::SlpConfig;
use crate::ir::{BasicBlock, IrFunction};

use super::pack::{collect_isomorphic_insts, PackList};
use super::rewrite::vectorize;
use super::score::score;
use super::seed::{is_isomorphic, IsoBlock};
use super::stats::SlpStats;

/// Finds the best-scoring `PackList` seeded from any isomorphic pair in
/// `block`, searching last-instruction-first the way `spec.md` §4.7
/// specifies (favoring packs anchored near a block's uses, which tend to
/// be store-shaped and thus closer to the actual memory traffic worth
/// vectorizing).
fn find_best_list(block: &BasicBlock, func: &IrFunction) -> Option<PackList> {
    let iso = IsoBlock::new(block, func);
    let mut best: Option<PackList> = None;

    for i in (0..block.instructions.len()).rev() {
        if block.instructions[i].is_dead() {
            continue;
        }
        for j in 0..i {
            if block.instructions[j].is_dead() {
                continue;
            }
            if !is_isomorphic(&iso, i, j) {
                continue;
            }
            let Some(mut candidate) = collect_isomorphic_insts(block, func, i, j) else { continue };
            if candidate.len() < 2 {
                continue;
            }
            score(block, &mut candidate);
            match &best {
                None => best = Some(candidate),
                Some(current) if candidate.score < current.score => best = Some(candidate),
                _ => {}
            }
        }
    }
    best
}

/// Runs the fixpoint loop for a single block: repeatedly find-and-apply the
/// best pack until no pack is found or `config.max_iterations` is reached.
/// Returns the number of packs actually vectorized, for the caller's
/// "changed" accounting and statistics.
pub fn run_on_block(block: &mut BasicBlock, func: &mut IrFunction, config: &SlpConfig, stats: &mut SlpStats) -> usize {
    let mut applied = 0;
    let mut iterations = 0;

    loop {
        if iterations >= config.max_iterations {
            break;
        }
        iterations += 1;

        let Some(best) = find_best_list(block, func) else { break };
        if !vectorize(&best, block, func) {
            // Every pair in the list failed scheduling at rewrite time even
            // though each passed its pre-check; nothing else to try this
            // iteration, and re-searching would just find the same list.
            break;
        }
        block.compact();
        stats.record(best.len());
        applied += 1;
    }

    applied
}

/// Runs the pass over every block of `func`.
pub fn run_on_function(func: &mut IrFunction, config: &SlpConfig, stats: &mut SlpStats) -> usize {
    let mut total = 0;
    for bi in 0..func.blocks.len() {
        let mut block = std::mem::replace(&mut func.blocks[bi], BasicBlock::new(crate::ir::BlockId(0), crate::ir::Terminator::Unreachable));
        total += run_on_block(&mut block, func, config, stats);
        func.blocks[bi] = block;
    }
    total
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::{BlockId, Instruction, IrBinOp, IrConst, IrFunction, IrType, Operand, ScalarKind, Terminator, Value};

    fn add(dest: u32, lhs: Operand, rhs: Operand) -> Instruction {
        Instruction::BinOp { dest: Value(dest), op: IrBinOp::Add, ty: IrType::Scalar(ScalarKind::I32), lhs, rhs }
    }

    #[test]
    fn vectorizes_one_independent_pair_and_stops() {
        let mut func = IrFunction::new("f".into(), IrType::Void, vec![], false);
        let mut block = BasicBlock::new(BlockId(0), Terminator::Return(None));
        block.instructions.push(add(0, Operand::Const(IrConst::I32(1)), Operand::Const(IrConst::I32(2))));
        block.instructions.push(add(1, Operand::Const(IrConst::I32(3)), Operand::Const(IrConst::I32(4))));
        block.instructions.push(add(2, Operand::Value(Value(0)), Operand::Const(IrConst::I32(10))));
        block.instructions.push(add(3, Operand::Value(Value(1)), Operand::Const(IrConst::I32(20))));
        func.reserve_value(Value(3));
        func.blocks.push(block);

        let config = SlpConfig::default();
        let mut stats = SlpStats::new();
        let applied = run_on_function(&mut func, &config, &mut stats);
        assert_eq!(applied, 1);
        assert_eq!(stats.count(2), 1);
    }

    #[test]
    fn no_isomorphic_pairs_means_nothing_applied() {
        let mut func = IrFunction::new("f".into(), IrType::Void, vec![], false);
        let mut block = BasicBlock::new(BlockId(0), Terminator::Return(None));
        block.instructions.push(add(0, Operand::Const(IrConst::I32(1)), Operand::Const(IrConst::I32(2))));
        block.instructions.push(Instruction::BinOp {
            dest: Value(1),
            op: IrBinOp::FAdd,
            ty: IrType::Scalar(ScalarKind::F64),
            lhs: Operand::Const(IrConst::F64(1.0)),
            rhs: Operand::Const(IrConst::F64(2.0)),
        });
        func.reserve_value(Value(1));
        func.blocks.push(block);

        let config = SlpConfig::default();
        let mut stats = SlpStats::new();
        let applied = run_on_function(&mut func, &config, &mut stats);
        assert_eq!(applied, 0);
        assert_eq!(stats.total(), 0);
    }

    #[test]
    fn iteration_cap_bounds_repeated_passes() {
        // Six independent two-instruction lanes give three disjoint
        // vectorizable packs once fully converged, but the cap of 2
        // iterations must stop the fixpoint loop one pack short.
        let mut func = IrFunction::new("f".into(), IrType::Void, vec![], false);
        let mut block = BasicBlock::new(BlockId(0), Terminator::Return(None));
        for lane in 0..6u32 {
            let base = lane * 2;
            block.instructions.push(add(base, Operand::Const(IrConst::I32(lane as i32)), Operand::Const(IrConst::I32(lane as i32))));
            block.instructions.push(add(base + 1, Operand::Value(Value(base)), Operand::Const(IrConst::I32(lane as i32))));
        }
        func.reserve_value(Value(11));
        func.blocks.push(block);

        let config = SlpConfig { max_iterations: 2 };
        let mut stats = SlpStats::new();
        let applied = run_on_function(&mut func, &config, &mut stats);
        assert_eq!(applied, 2);
        assert_eq!(stats.count(2), 2);
    }
}
