//! A small demo driver: builds a sample `IrModule` with a few scalar
//! instructions, runs the SLP pass, and prints before/after IR plus the
//! resulting pack-size statistics. Stands in for the teacher compiler's
//! full preprocess→lex→parse→sema→lower→optimize→codegen pipeline, which
//! this crate has no front end or back end to drive.

use log::info;

use crate::common::config::SlpConfig;
use crate::ir::{
    BasicBlock, BlockId, Instruction, IrBinOp, IrConst, IrFunction, IrModule, IrType, Operand,
    ScalarKind, Terminator,
};
use crate::passes;

/// Runs the SLP pass over `module` and prints a before/after report plus
/// the aggregate pack-size statistics, using `config` for the per-block
/// iteration cap.
pub fn run_demo(mut module: IrModule, config: &SlpConfig) {
    info!("slp demo: {} function(s) loaded", module.functions.len());
    println!("-- before --");
    println!("{module}");

    let stats = passes::run_passes(&mut module, config);

    println!("-- after --");
    println!("{module}");
    print!("{stats}");
}

/// Builds a sample module with one function whose entry block contains two
/// independent scalar stores through two int allocas — a minimal case the
/// pass should fuse into one vector store.
pub fn sample_module() -> IrModule {
    let mut func = IrFunction::new("axpy_pair".to_string(), IrType::Void, vec![], false);
    let mut block = BasicBlock::new(BlockId(0), Terminator::Return(None));

    let a = func.fresh_value();
    let b = func.fresh_value();
    block.instructions.push(Instruction::Alloca { dest: a, pointee: ScalarKind::I32, count: 1 });
    block.instructions.push(Instruction::Alloca { dest: b, pointee: ScalarKind::I32, count: 1 });

    let sum_a = func.fresh_value();
    let sum_b = func.fresh_value();
    block.instructions.push(Instruction::BinOp {
        dest: sum_a,
        op: IrBinOp::Add,
        ty: IrType::Scalar(ScalarKind::I32),
        lhs: Operand::Const(IrConst::I32(1)),
        rhs: Operand::Const(IrConst::I32(2)),
    });
    block.instructions.push(Instruction::BinOp {
        dest: sum_b,
        op: IrBinOp::Add,
        ty: IrType::Scalar(ScalarKind::I32),
        lhs: Operand::Const(IrConst::I32(3)),
        rhs: Operand::Const(IrConst::I32(4)),
    });

    block.instructions.push(Instruction::Store { val: Operand::Value(sum_a), ptr: Operand::Value(a), volatile: false });
    block.instructions.push(Instruction::Store { val: Operand::Value(sum_b), ptr: Operand::Value(b), volatile: false });

    func.blocks.push(block);

    let mut module = IrModule::new();
    module.functions.push(func);
    module
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sample_module_has_one_function_with_six_instructions() {
        let module = sample_module();
        assert_eq!(module.functions.len(), 1);
        assert_eq!(module.functions[0].blocks[0].instructions.len(), 6);
    }
}
