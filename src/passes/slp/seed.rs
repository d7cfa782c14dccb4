//! Seed-pair predicates: which opcodes are eligible at all (`should_vectorize`),
//! whether two eligible instructions have matching shape (`is_isomorphic`),
//! and whether one instruction's backward slice reaches another
//! (`depends_on`), used to reject pairs that would require one half of the
//! pair to read the other's result.

use crate::common::fx_hash::FxHashSet;
use crate::ir::{BasicBlock, Instruction, IrFunction, Operand, Value};

/// Finds the index, within `block`, of the instruction defining `value`, if
/// any. Cross-block definitions (e.g. a loop-carried phi) return `None`;
/// every pair this pass ever builds is same-block by construction, so a
/// caller seeing `None` here should treat the pair as unvectorizable rather
/// than chase the definition elsewhere.
pub fn local_def(block: &BasicBlock, value: Value) -> Option<usize> {
    block.instructions.iter().position(|inst| inst.dest() == Some(value))
}

fn is_int_float_ptr(inst: &Instruction) -> bool {
    let ty = inst.ty();
    ty.is_integer() || ty.is_float() || ty.is_pointer()
}

/// Resolves a pointer operand back to the alloca it directly names, as
/// `spec.md` §4.1 requires: "the pointer is itself an Alloca in the same
/// block, not merely derived from one." A `GetElementPtr` result or a
/// cross-block value fails this check even though it may well point into an
/// eligible alloca transitively.
fn resolves_to_scalar_alloca(block: &BasicBlock, ptr: Operand) -> bool {
    let Operand::Value(v) = ptr else { return false };
    let Some(idx) = local_def(block, v) else { return false };
    block.instructions[idx].is_alloca()
}

/// `true` if `block[j]` is in the backward slice of `block[i]`: following
/// `i`'s operand chain (through same-block defs only) ever reaches `j`.
/// Used to reject a pair where one side is computed from the other, which
/// would make packing them into one vector instruction a cycle.
pub fn depends_on(block: &BasicBlock, i: usize, j: usize) -> bool {
    let mut stack = vec![i];
    let mut seen = FxHashSet::default();
    while let Some(k) = stack.pop() {
        if k == j {
            return true;
        }
        if !seen.insert(k) {
            continue;
        }
        let inst = &block.instructions[k];
        inst.for_each_operand(|op| {
            if let Operand::Value(v) = op {
                if let Some(idx) = local_def(block, v) {
                    stack.push(idx);
                }
            }
        });
    }
    false
}

/// Opcode-and-shape eligibility for a seed or recursively-discovered pair.
/// This is the single gate deciding which instructions can ever end up in a
/// `PackList`: everything downstream (`pack::collect_isomorphic_insts`,
/// scoring, scheduling) assumes every pair it touches already passed this.
pub fn should_vectorize(block: &BasicBlock, i: usize, j: usize) -> bool {
    if i == j {
        return false;
    }
    let inst_i = &block.instructions[i];
    let inst_j = &block.instructions[j];
    if inst_i.is_dead() || inst_j.is_dead() {
        return false;
    }
    if !is_int_float_ptr(inst_i) {
        return false;
    }

    match (inst_i, inst_j) {
        (Instruction::Load { volatile, ptr, .. }, Instruction::Load { .. }) => {
            !*volatile && resolves_to_scalar_alloca(block, *ptr)
        }
        (Instruction::Store { volatile, ptr, .. }, Instruction::Store { .. }) => {
            !*volatile && resolves_to_scalar_alloca(block, *ptr)
        }
        (Instruction::BinOp { .. }, Instruction::BinOp { .. })
        | (Instruction::Alloca { .. }, Instruction::Alloca { .. }) => !depends_on(block, i, j) && !depends_on(block, j, i),
        // Cmp, Cast, Select, GetElementPtr, Call, Phi, LabelAddr, Copy, Dead,
        // and any opcode mismatch: never eligible (`spec.md` §4.1's reject list).
        _ => false,
    }
}

/// Structural isomorphism: same opcode, same result type, same operand
/// count, and each operand slot either both constants of matching type or
/// both same-block instructions of matching type. A constant paired against
/// an instruction operand is never isomorphic — this is deliberately more
/// permissive than a from-scratch implementation that rejects any constant
/// operand outright, since two matching-typed constant lanes pack into a
/// constant vector for free (`spec.md` §4.2; this widens the original's
/// all-instructions-only rule without weakening the pair's actual safety).
pub fn is_isomorphic(block: &IsoBlock, i: usize, j: usize) -> bool {
    let inst_i = &block.block.instructions[i];
    let inst_j = &block.block.instructions[j];
    if inst_i.is_dead() || inst_j.is_dead() {
        return false;
    }
    if std::mem::discriminant(inst_i) != std::mem::discriminant(inst_j) {
        return false;
    }
    match (inst_i, inst_j) {
        (Instruction::BinOp { op: op_i, .. }, Instruction::BinOp { op: op_j, .. }) if op_i != op_j => return false,
        (Instruction::Cmp { pred: pred_i, .. }, Instruction::Cmp { pred: pred_j, .. }) if pred_i != pred_j => return false,
        _ => {}
    }
    if inst_i.ty() != inst_j.ty() {
        return false;
    }
    if inst_i.arity() != inst_j.arity() {
        return false;
    }
    for k in 0..inst_i.arity() {
        let (Some(a), Some(b)) = (inst_i.operand(k), inst_j.operand(k)) else { return false };
        match (a, b) {
            (Operand::Const(ca), Operand::Const(cb)) => {
                if ca.ty() != cb.ty() {
                    return false;
                }
            }
            (Operand::Value(va), Operand::Value(vb)) => {
                let ta = block.value_type(block.block, va);
                let tb = block.value_type(block.block, vb);
                if ta != tb {
                    return false;
                }
            }
            _ => return false,
        }
    }
    true
}

/// Thin wrapper carrying the whole function alongside the block being
/// scanned, so `is_isomorphic` can resolve an operand's type even when the
/// operand's defining instruction sits in a different block (e.g. a loop
/// preheader constant feeding a phi-free straight-line body). The pair
/// itself is still rejected elsewhere if it isn't same-block — this only
/// affects whether two *operands* are judged type-equal.
pub struct IsoBlock<'a> {
    pub block: &'a BasicBlock,
    pub func: &'a IrFunction,
}

impl<'a> IsoBlock<'a> {
    pub fn new(block: &'a BasicBlock, func: &'a IrFunction) -> Self {
        Self { block, func }
    }

    fn value_type(&self, block: &BasicBlock, v: Value) -> crate::ir::IrType {
        if let Some(idx) = local_def(block, v) {
            return block.instructions[idx].ty();
        }
        self.func
            .locate(v)
            .map(|(bi, ii)| self.func.blocks[bi].instructions[ii].ty())
            .unwrap_or(crate::ir::IrType::Void)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::{BasicBlock, BlockId, IrBinOp, IrConst, IrType, Operand, ScalarKind, Terminator};

    fn add(dest: u32, lhs: Operand, rhs: Operand, ty: IrType) -> Instruction {
        Instruction::BinOp { dest: Value(dest), op: IrBinOp::Add, ty, lhs, rhs }
    }

    #[test]
    fn should_vectorize_rejects_self_pair() {
        let mut block = BasicBlock::new(BlockId(0), Terminator::Return(None));
        block.instructions.push(add(0, Operand::Const(IrConst::I32(1)), Operand::Const(IrConst::I32(2)), IrType::Scalar(ScalarKind::I32)));
        assert!(!should_vectorize(&block, 0, 0));
    }

    #[test]
    fn should_vectorize_accepts_independent_binops() {
        let mut block = BasicBlock::new(BlockId(0), Terminator::Return(None));
        block.instructions.push(add(0, Operand::Const(IrConst::I32(1)), Operand::Const(IrConst::I32(2)), IrType::Scalar(ScalarKind::I32)));
        block.instructions.push(add(1, Operand::Const(IrConst::I32(3)), Operand::Const(IrConst::I32(4)), IrType::Scalar(ScalarKind::I32)));
        assert!(should_vectorize(&block, 0, 1));
    }

    #[test]
    fn should_vectorize_rejects_dependent_chain() {
        let mut block = BasicBlock::new(BlockId(0), Terminator::Return(None));
        block.instructions.push(add(0, Operand::Const(IrConst::I32(1)), Operand::Const(IrConst::I32(2)), IrType::Scalar(ScalarKind::I32)));
        block.instructions.push(add(1, Operand::Value(Value(0)), Operand::Const(IrConst::I32(4)), IrType::Scalar(ScalarKind::I32)));
        assert!(!should_vectorize(&block, 0, 1));
        assert!(!should_vectorize(&block, 1, 0));
    }

    #[test]
    fn should_vectorize_rejects_cmp_opcode() {
        let mut block = BasicBlock::new(BlockId(0), Terminator::Return(None));
        block.instructions.push(Instruction::Cmp {
            dest: Value(0),
            pred: crate::ir::CmpPred::Eq,
            lhs: Operand::Const(IrConst::I32(1)),
            rhs: Operand::Const(IrConst::I32(2)),
        });
        block.instructions.push(Instruction::Cmp {
            dest: Value(1),
            pred: crate::ir::CmpPred::Eq,
            lhs: Operand::Const(IrConst::I32(3)),
            rhs: Operand::Const(IrConst::I32(4)),
        });
        assert!(!should_vectorize(&block, 0, 1));
    }

    #[test]
    fn load_requires_direct_scalar_alloca_pointer() {
        let mut block = BasicBlock::new(BlockId(0), Terminator::Return(None));
        block.instructions.push(Instruction::Alloca { dest: Value(0), pointee: ScalarKind::I32, count: 1 });
        block.instructions.push(Instruction::Alloca { dest: Value(1), pointee: ScalarKind::I32, count: 1 });
        block.instructions.push(Instruction::Load { dest: Value(2), ty: IrType::Scalar(ScalarKind::I32), ptr: Operand::Value(Value(0)), volatile: false });
        block.instructions.push(Instruction::Load { dest: Value(3), ty: IrType::Scalar(ScalarKind::I32), ptr: Operand::Value(Value(1)), volatile: false });
        assert!(should_vectorize(&block, 2, 3));
    }

    #[test]
    fn volatile_load_is_rejected() {
        let mut block = BasicBlock::new(BlockId(0), Terminator::Return(None));
        block.instructions.push(Instruction::Alloca { dest: Value(0), pointee: ScalarKind::I32, count: 1 });
        block.instructions.push(Instruction::Alloca { dest: Value(1), pointee: ScalarKind::I32, count: 1 });
        block.instructions.push(Instruction::Load { dest: Value(2), ty: IrType::Scalar(ScalarKind::I32), ptr: Operand::Value(Value(0)), volatile: true });
        block.instructions.push(Instruction::Load { dest: Value(3), ty: IrType::Scalar(ScalarKind::I32), ptr: Operand::Value(Value(1)), volatile: false });
        assert!(!should_vectorize(&block, 2, 3));
    }

    #[test]
    fn is_isomorphic_rejects_mismatched_binops_of_the_same_type() {
        let mut block = BasicBlock::new(BlockId(0), Terminator::Return(None));
        block.instructions.push(add(0, Operand::Const(IrConst::I32(1)), Operand::Const(IrConst::I32(2)), IrType::Scalar(ScalarKind::I32)));
        block.instructions.push(Instruction::BinOp {
            dest: Value(1),
            op: IrBinOp::Sub,
            ty: IrType::Scalar(ScalarKind::I32),
            lhs: Operand::Const(IrConst::I32(3)),
            rhs: Operand::Const(IrConst::I32(4)),
        });
        let func = IrFunction::new("f".to_string(), IrType::Void, vec![], false);
        let iso = IsoBlock::new(&block, &func);
        assert!(!is_isomorphic(&iso, 0, 1));
    }
}
