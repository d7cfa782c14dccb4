//! Schedulability (`spec.md` §4.5): finding, for one pair, a single block
//! position that is dominated by both members' operands and that itself
//! dominates every use of both members. Dominance within a single-entry
//! single-exit block collapses to index comparison (`a` dominates `b` iff
//! `a <= b`), so this never needs a real dominator tree.

use crate::ir::{BasicBlock, Operand};

use super::pack::Pair;
use super::seed::local_def;

/// Finds an insertion index for `pair`, or `None` if no position in the
/// block satisfies both constraints (`spec.md` §4.5's "abandon the pair" —
/// whole-list abandonment, not per-pair repair, is handled by the caller).
pub fn is_transformable(block: &BasicBlock, pair: Pair) -> Option<usize> {
    let inst_lo = &block.instructions[pair.lo];
    let inst_hi = &block.instructions[pair.hi];

    let users_lo = block.instructions[pair.lo].dest().map(|v| block.users_of(v));
    let users_hi = block.instructions[pair.hi].dest().map(|v| block.users_of(v));
    let term_user_lo = inst_lo.dest().is_some_and(|v| block.has_terminator_user(v));
    let term_user_hi = inst_hi.dest().is_some_and(|v| block.has_terminator_user(v));

    'positions: for k in 0..block.instructions.len() {
        for slot in 0..inst_lo.arity() {
            let (Some(a), Some(b)) = (inst_lo.operand(slot), inst_hi.operand(slot)) else { continue };
            if let (Operand::Value(va), Operand::Value(vb)) = (a, b) {
                let oa = local_def(block, va);
                let ob = local_def(block, vb);
                if oa.map_or(true, |i| i > k) || ob.map_or(true, |i| i > k) {
                    continue 'positions;
                }
            }
        }
        if let Some(users) = &users_lo {
            if users.iter().any(|&u| u < k) {
                continue 'positions;
            }
        }
        if let Some(users) = &users_hi {
            if users.iter().any(|&u| u < k) {
                continue 'positions;
            }
        }
        // A terminator use is always dominated by any in-block position,
        // since the terminator conceptually sits after every instruction.
        let _ = (term_user_lo, term_user_hi);
        return Some(k);
    }
    None
}
