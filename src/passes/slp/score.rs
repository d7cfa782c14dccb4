//! Profitability scoring (`spec.md` §4.4). Lower is better: floating-point
//! pairs are worth more than integer ones, and a pack that still needs to
//! cross back out to scalar (a lane used outside the list, or an operand
//! fed in from outside the list) erodes that benefit.

use crate::ir::{BasicBlock, IrType};

use super::pack::PackList;

fn used_outside(block: &BasicBlock, list: &PackList, idx: usize) -> bool {
    let Some(value) = block.instructions[idx].dest() else { return false };
    if block.has_terminator_user(value) {
        return true;
    }
    block.users_of(value).into_iter().any(|u| !list.visited.contains(&u))
}

fn not_defined_in_list(block: &BasicBlock, list: &PackList, idx: usize) -> i32 {
    let inst = &block.instructions[idx];
    let mut extra = 0;
    inst.for_each_operand(|op| {
        if let crate::ir::Operand::Value(v) = op {
            if let Some(def_idx) = super::seed::local_def(block, v) {
                if !list.visited.contains(&def_idx) {
                    extra += 1;
                }
            }
        }
    });
    extra
}

/// Computes `list`'s score in place, matching `spec.md` §4.4 exactly:
/// -4 per floating-point pair, -1 per integer/pointer pair, +1 for each
/// pair member used outside the list, +1 for each operand (of either
/// member) defined outside the list.
pub fn score(block: &BasicBlock, list: &mut PackList) {
    let mut total = 0;
    for pair in &list.pairs {
        let ty = block.instructions[pair.lo].ty();
        total += if matches!(ty, IrType::Scalar(k) if k.is_float()) { -4 } else { -1 };
        total += used_outside(block, list, pair.lo) as i32;
        total += used_outside(block, list, pair.hi) as i32;
        total += not_defined_in_list(block, list, pair.lo);
        total += not_defined_in_list(block, list, pair.hi);
    }
    list.score = total;
}
