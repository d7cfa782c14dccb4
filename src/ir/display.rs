//! Pretty-printers used by the demo driver to show before/after IR and by
//! `log::debug!` call sites inside the pass. Not meant to round-trip; this
//! is a human-readable dump, not a parser's input format.

use std::fmt;

use crate::ir::ir::{
    BasicBlock, CmpPred, Instruction, IrConst, IrFunction, IrModule, Operand, Terminator, Value,
};

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "%{}", self.0)
    }
}

impl fmt::Display for IrConst {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IrConst::I8(v) => write!(f, "{v}"),
            IrConst::I16(v) => write!(f, "{v}"),
            IrConst::I32(v) => write!(f, "{v}"),
            IrConst::I64(v) => write!(f, "{v}"),
            IrConst::F32(v) => write!(f, "{v}"),
            IrConst::F64(v) => write!(f, "{v}"),
            IrConst::Zero => write!(f, "zeroinitializer"),
        }
    }
}

impl fmt::Display for Operand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operand::Value(v) => write!(f, "{v}"),
            Operand::Const(c) => write!(f, "{c}"),
        }
    }
}

impl fmt::Display for CmpPred {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            CmpPred::Eq => "eq",
            CmpPred::Ne => "ne",
            CmpPred::Slt => "slt",
            CmpPred::Sle => "sle",
            CmpPred::Sgt => "sgt",
            CmpPred::Sge => "sge",
            CmpPred::Ult => "ult",
            CmpPred::Ule => "ule",
            CmpPred::Ugt => "ugt",
            CmpPred::Uge => "uge",
        };
        write!(f, "{s}")
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Instruction::BinOp { dest, op, ty, lhs, rhs } => {
                write!(f, "{dest} = {} {ty} {lhs}, {rhs}", op.mnemonic())
            }
            Instruction::Alloca { dest, pointee, count } => {
                write!(f, "{dest} = alloca {:?} x {count}", pointee)
            }
            Instruction::Load { dest, ty, ptr, volatile } => {
                write!(f, "{dest} = load{} {ty}, {ptr}", if *volatile { " volatile" } else { "" })
            }
            Instruction::Store { val, ptr, volatile } => {
                write!(f, "store{} {val}, {ptr}", if *volatile { " volatile" } else { "" })
            }
            Instruction::Copy { dest, src } => write!(f, "{dest} = copy {src}"),
            Instruction::Phi { dest, ty, incoming } => {
                write!(f, "{dest} = phi {ty} ")?;
                for (i, (op, bb)) in incoming.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "[{op}, bb{}]", bb.0)?;
                }
                Ok(())
            }
            Instruction::Cmp { dest, pred, lhs, rhs } => write!(f, "{dest} = cmp {pred} {lhs}, {rhs}"),
            Instruction::Cast { dest, ty, src } => write!(f, "{dest} = cast {ty} {src}"),
            Instruction::Select { dest, cond, true_val, false_val } => {
                write!(f, "{dest} = select {cond}, {true_val}, {false_val}")
            }
            Instruction::GetElementPtr { dest, base, index } => write!(f, "{dest} = gep {base}, {index}"),
            Instruction::Call { dest, callee, args } => {
                if let Some(d) = dest {
                    write!(f, "{d} = call {callee}(")?;
                } else {
                    write!(f, "call {callee}(")?;
                }
                for (i, a) in args.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{a}")?;
                }
                write!(f, ")")
            }
            Instruction::LabelAddr { dest, label } => write!(f, "{dest} = labeladdr bb{}", label.0),
            Instruction::Dead => write!(f, "<dead>"),
        }
    }
}

impl fmt::Display for Terminator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Terminator::Branch(b) => write!(f, "br bb{}", b.0),
            Terminator::CondBranch { cond, true_label, false_label } => {
                write!(f, "brcond {cond}, bb{}, bb{}", true_label.0, false_label.0)
            }
            Terminator::IndirectBranch { address, possible_targets } => {
                write!(f, "ibr {address} [")?;
                for (i, t) in possible_targets.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "bb{}", t.0)?;
                }
                write!(f, "]")
            }
            Terminator::Return(Some(op)) => write!(f, "ret {op}"),
            Terminator::Return(None) => write!(f, "ret"),
            Terminator::Unreachable => write!(f, "unreachable"),
        }
    }
}

impl fmt::Display for BasicBlock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "bb{}:", self.label.0)?;
        for inst in &self.instructions {
            if inst.is_dead() {
                continue;
            }
            writeln!(f, "  {inst}")?;
        }
        writeln!(f, "  {}", self.terminator)
    }
}

impl fmt::Display for IrFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "fn {}(", self.name)?;
        for (i, (name, ty)) in self.params.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{name}: {ty}")?;
        }
        writeln!(f, ") -> {} {{", self.return_type)?;
        for block in &self.blocks {
            write!(f, "{block}")?;
        }
        write!(f, "}}")
    }
}

impl fmt::Display for IrModule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, func) in self.functions.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            writeln!(f, "{func}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::ir::{BlockId, IrBinOp, IrType, ScalarKind};

    #[test]
    fn displays_binop_instruction() {
        let inst = Instruction::BinOp {
            dest: Value(2),
            op: IrBinOp::Add,
            ty: IrType::Scalar(ScalarKind::I32),
            lhs: Operand::Value(Value(0)),
            rhs: Operand::Value(Value(1)),
        };
        assert_eq!(inst.to_string(), "%2 = add i32 %0, %1");
    }

    #[test]
    fn displays_block_skipping_dead_instructions() {
        let mut block = BasicBlock::new(BlockId(0), Terminator::Return(None));
        block.instructions.push(Instruction::Copy { dest: Value(0), src: Operand::Const(IrConst::I32(1)) });
        block.instructions.push(Instruction::Dead);
        let rendered = block.to_string();
        assert!(rendered.contains("%0 = copy 1"));
        assert!(!rendered.contains("<dead>"));
    }
}
