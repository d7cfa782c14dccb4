//! The rewrite itself (`spec.md` §4.6): given a scheduled `PackList`, emit
//! one vector instruction per pair plus whatever operand packs its inputs
//! still need, then replace each original scalar definition with either an
//! extract-lane (if it still has outside uses) or nothing at all.
//!
//! Every new instruction keeps the *original* destination `Value` of the
//! scalar it stands in for, rather than rewriting every use site: since
//! value identity in this IR is just an opaque id, reusing it is exactly
//! equivalent to a use-list walk-and-replace, without needing one.

use crate::common::diagnostics::warn_no_insertion_point;
use crate::common::fx_hash::FxHashMap;
use crate::ir::{BasicBlock, Instruction, IrConst, IrFunction, IrType, Operand, Value};

use super::pack::PackList;
use super::schedule::is_transformable;
use super::seed::local_def;

/// One instruction queued for insertion at a specific original-index
/// position, applied in a single linear rebuild pass so that inserting
/// early in the block never invalidates a later insertion's recorded index.
struct PendingInsert {
    before_index: usize,
    inst: Instruction,
}

/// Runs the full two-phase rewrite for `list` against `block`, returning
/// `true` if the whole list was vectorized, `false` if it was abandoned.
/// `func` supplies fresh `Value` ids for the new vector instructions and
/// operand packs.
///
/// Abandons the *whole list* — no pair applied, `block` left untouched — the
/// moment any single pair can't be built: a failed scheduling check
/// (`is_transformable`), or a load whose pointer operand would itself need a
/// fresh pack built on the fly (`spec.md` §4.6 calls this out as unsafe to
/// synthesize, since a load's address must already exist in memory, not be
/// assembled at runtime). This is the "safe" resolution `spec.md` §9's Open
/// Questions section recommends for the load-operand case, generalized to
/// every other way a pair can fail to build: nothing is mutated in `block`
/// until every pair in `list` is confirmed buildable.
pub fn vectorize(list: &PackList, block: &mut BasicBlock, func: &mut IrFunction) -> bool {
    let mut insertion_points = Vec::with_capacity(list.pairs.len());
    for &pair in &list.pairs {
        match is_transformable(block, pair) {
            Some(idx) => insertion_points.push(idx),
            None => {
                warn_no_insertion_point(&func.name, block.label.0);
                return false; // whole-list abandonment, spec.md §4.5/§9
            }
        }
    }

    let mut op2vec: FxHashMap<usize, Value> = FxHashMap::default();
    let mut pending: Vec<PendingInsert> = Vec::new();
    let mut replaced: FxHashMap<usize, (Value, u32, bool)> = FxHashMap::default(); // idx -> (vector, lane, is_alloca)
    let mut any_built = false;

    for (p, &pair) in list.pairs.iter().enumerate() {
        let anchor = insertion_points[p];
        let inst_lo = block.instructions[pair.lo].clone();
        let inst_hi = block.instructions[pair.hi].clone();

        let mut aborted = false;
        let mut operand_values: Vec<Option<Operand>> = vec![None; inst_lo.arity()];

        for slot in 0..inst_lo.arity() {
            let (Some(op_lo), Some(op_hi)) = (inst_lo.operand(slot), inst_hi.operand(slot)) else { continue };
            match (op_lo, op_hi) {
                (Operand::Value(vlo), Operand::Value(vhi)) => {
                    let (Some(olo), Some(ohi)) = (local_def(block, vlo), local_def(block, vhi)) else {
                        aborted = true;
                        break;
                    };
                    if let Some(&v) = op2vec.get(&olo) {
                        operand_values[slot] = Some(Operand::Value(v));
                        continue;
                    }
                    if inst_lo.is_load() {
                        // A load's pointer must already be a vector alloca
                        // from an earlier pair in this same list; synthesizing
                        // one here would read through a pointer nothing
                        // actually wrote.
                        aborted = true;
                        break;
                    }
                    let packed = func.fresh_value();
                    let anchor_op = olo.max(ohi) + 1;
                    pending.push(PendingInsert { before_index: anchor_op, inst: assemble_inst(packed, Operand::Value(vlo), Operand::Value(vhi)) });
                    op2vec.insert(olo, packed);
                    op2vec.insert(ohi, packed);
                    operand_values[slot] = Some(Operand::Value(packed));
                }
                (Operand::Const(ca), Operand::Const(cb)) => {
                    // Two matching constants pack losslessly into a single
                    // scalar (every lane reads the same value); two
                    // different constants need a real two-lane pack, or the
                    // lane that doesn't match would silently read the wrong
                    // one's data.
                    if ca == cb {
                        operand_values[slot] = Some(Operand::Const(ca));
                    } else {
                        let packed = func.fresh_value();
                        pending.push(PendingInsert {
                            before_index: anchor,
                            inst: assemble_inst(packed, Operand::Const(ca), Operand::Const(cb)),
                        });
                        operand_values[slot] = Some(Operand::Value(packed));
                    }
                }
                _ => {
                    aborted = true;
                    break;
                }
            }
        }

        if aborted {
            return false;
        }

        let vector_dest = func.fresh_value();
        let Some(built) = build_pair_instruction(&inst_lo, vector_dest, &operand_values) else { return false };
        pending.push(PendingInsert { before_index: anchor, inst: built });
        op2vec.insert(pair.lo, vector_dest);
        op2vec.insert(pair.hi, vector_dest);
        any_built = true;

        if let Some(dest) = inst_lo.dest() {
            if has_outside_use(block, list, pair.lo, dest) {
                replaced.insert(pair.lo, (vector_dest, 0, inst_lo.is_alloca()));
            }
        }
        if let Some(dest) = inst_hi.dest() {
            if has_outside_use(block, list, pair.hi, dest) {
                replaced.insert(pair.hi, (vector_dest, 1, inst_hi.is_alloca()));
            }
        }
    }

    if !any_built {
        return false;
    }

    rebuild_block(block, pending, &list.visited, &replaced, func);
    true
}

fn has_outside_use(block: &BasicBlock, list: &PackList, _idx: usize, value: Value) -> bool {
    if block.has_terminator_user(value) {
        return true;
    }
    block.users_of(value).into_iter().any(|u| !list.visited.contains(&u))
}

/// Builds the vector instruction that replaces a pair's two scalar
/// instructions, mirroring `spec.md` §4.6's per-opcode builder table.
/// Returns `None` for an opcode this builder doesn't know how to pack
/// (never reached in practice: `should_vectorize` only lets BinOp, Alloca,
/// Load, and Store pairs this far).
fn build_pair_instruction(template: &Instruction, dest: Value, operands: &[Option<Operand>]) -> Option<Instruction> {
    match template {
        Instruction::BinOp { op, ty, .. } => Some(Instruction::BinOp {
            dest,
            op: *op,
            ty: *ty,
            lhs: operands.first().copied().flatten()?,
            rhs: operands.get(1).copied().flatten()?,
        }),
        Instruction::Alloca { pointee, count, .. } => Some(Instruction::Alloca { dest, pointee: *pointee, count: count * 2 }),
        Instruction::Load { ty, .. } => Some(Instruction::Load { dest, ty: *ty, ptr: operands.first().copied().flatten()?, volatile: false }),
        Instruction::Store { .. } => Some(Instruction::Store {
            val: operands.first().copied().flatten()?,
            ptr: operands.get(1).copied().flatten()?,
            volatile: false,
        }),
        _ => None,
    }
}

/// Builds the two-lane pack for an operand pair that wasn't already
/// vectorized by an earlier pair in the list (`spec.md` §4.6's `AssembleVec2`).
/// Always a genuine two-lane encoding, never collapsed to a single scalar —
/// this IR has no vector-constant representation, so dropping either lane's
/// real value here would corrupt it.
fn assemble_inst(dest: Value, a: Operand, b: Operand) -> Instruction {
    Instruction::Call { dest: Some(dest), callee: "__slp_assemble_vec2".to_string(), args: vec![a, b] }
}

/// Replays the block as a flat instruction vector: pending inserts land
/// immediately before their anchor index, an original index that was folded
/// into a pair becomes either an extract-lane (still has outside uses) or a
/// tombstone (fully absorbed into the pack).
fn rebuild_block(
    block: &mut BasicBlock,
    pending: Vec<PendingInsert>,
    folded: &crate::common::fx_hash::FxHashSet<usize>,
    replaced: &FxHashMap<usize, (Value, u32, bool)>,
    func: &mut IrFunction,
) {
    let old_len = block.instructions.len();
    let mut inserts_before: Vec<Vec<Instruction>> = vec![Vec::new(); old_len + 1];
    for p in pending {
        let idx = p.before_index.min(old_len);
        inserts_before[idx].push(p.inst);
    }

    let mut rebuilt = Vec::with_capacity(old_len + inserts_before.iter().map(Vec::len).sum::<usize>());
    for idx in 0..old_len {
        rebuilt.append(&mut inserts_before[idx]);
        if folded.contains(&idx) {
            if let Some(&(vector, lane, is_alloca)) = replaced.get(&idx) {
                let dest = block.instructions[idx].dest().expect("replaced slot always has a dest");
                rebuilt.push(extract_lane_inst(dest, vector, lane, is_alloca));
            } else {
                rebuilt.push(Instruction::Dead);
            }
        } else {
            rebuilt.push(std::mem::replace(&mut block.instructions[idx], Instruction::Dead));
        }
    }
    rebuilt.append(&mut inserts_before[old_len]);
    block.instructions = rebuilt;
    let _ = func;
}

fn extract_lane_inst(dest: Value, vector: Value, lane: u32, is_alloca: bool) -> Instruction {
    if is_alloca {
        Instruction::GetElementPtr { dest, base: Operand::Value(vector), index: Operand::Const(IrConst::I32(lane as i32)) }
    } else {
        Instruction::Call { dest: Some(dest), callee: format!("__slp_extract_lane{lane}"), args: vec![Operand::Value(vector)] }
    }
}
