//! The SSA IR this pass operates over: functions of basic blocks of typed
//! instructions (`spec.md` §3). Deliberately small — just enough opcode
//! variety to exercise `ShouldVectorize`'s allow/reject list and the
//! rewrite's load/store/alloca special cases.

use std::fmt;

/// A single SSA definition. Equality is by id, matching `spec.md`'s
/// "equality is identity" rule for instruction handles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Value(pub u32);

/// A basic block identifier, unique within a function.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BlockId(pub u32);

/// Scalar type kinds, matching the type-kind classification `spec.md` §6
/// requires: "half, float, double, x86_fp80, fp128, ppc_fp128, integer."
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScalarKind {
    I8,
    I16,
    I32,
    I64,
    Half,
    F32,
    F64,
    X86Fp80,
    Fp128,
    PpcFp128,
}

impl ScalarKind {
    pub fn is_integer(self) -> bool {
        matches!(self, ScalarKind::I8 | ScalarKind::I16 | ScalarKind::I32 | ScalarKind::I64)
    }

    pub fn is_float(self) -> bool {
        !self.is_integer()
    }

    pub fn size(self) -> usize {
        match self {
            ScalarKind::I8 => 1,
            ScalarKind::I16 | ScalarKind::Half => 2,
            ScalarKind::I32 | ScalarKind::F32 => 4,
            ScalarKind::I64 | ScalarKind::F64 => 8,
            ScalarKind::X86Fp80 => 10,
            ScalarKind::Fp128 | ScalarKind::PpcFp128 => 16,
        }
    }
}

/// A value's type. `Ptr` carries no pointee here: pointee classification is
/// only meaningful for allocas, and lives on `Instruction::Alloca` itself
/// (see `Instruction::pointee_kind`), matching `spec.md` §6's "pointee type
/// of a pointer type" as a query answerable from the defining alloca.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IrType {
    Scalar(ScalarKind),
    Ptr,
    Void,
}

impl IrType {
    pub fn is_integer(self) -> bool {
        matches!(self, IrType::Scalar(k) if k.is_integer())
    }

    pub fn is_float(self) -> bool {
        matches!(self, IrType::Scalar(k) if k.is_float())
    }

    pub fn is_pointer(self) -> bool {
        matches!(self, IrType::Ptr)
    }
}

impl fmt::Display for IrType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IrType::Scalar(ScalarKind::I8) => write!(f, "i8"),
            IrType::Scalar(ScalarKind::I16) => write!(f, "i16"),
            IrType::Scalar(ScalarKind::I32) => write!(f, "i32"),
            IrType::Scalar(ScalarKind::I64) => write!(f, "i64"),
            IrType::Scalar(ScalarKind::Half) => write!(f, "half"),
            IrType::Scalar(ScalarKind::F32) => write!(f, "float"),
            IrType::Scalar(ScalarKind::F64) => write!(f, "double"),
            IrType::Scalar(ScalarKind::X86Fp80) => write!(f, "x86_fp80"),
            IrType::Scalar(ScalarKind::Fp128) => write!(f, "fp128"),
            IrType::Scalar(ScalarKind::PpcFp128) => write!(f, "ppc_fp128"),
            IrType::Ptr => write!(f, "ptr"),
            IrType::Void => write!(f, "void"),
        }
    }
}

/// A constant value. `Zero` is an untyped placeholder used by the pack
/// builder before a lane's real constant is known.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum IrConst {
    I8(i8),
    I16(i16),
    I32(i32),
    I64(i64),
    F32(f32),
    F64(f64),
    Zero,
}

impl IrConst {
    pub fn ty(self) -> IrType {
        match self {
            IrConst::I8(_) => IrType::Scalar(ScalarKind::I8),
            IrConst::I16(_) => IrType::Scalar(ScalarKind::I16),
            IrConst::I32(_) => IrType::Scalar(ScalarKind::I32),
            IrConst::I64(_) => IrType::Scalar(ScalarKind::I64),
            IrConst::F32(_) => IrType::Scalar(ScalarKind::F32),
            IrConst::F64(_) => IrType::Scalar(ScalarKind::F64),
            IrConst::Zero => IrType::Void,
        }
    }
}

/// An instruction operand: either another SSA value or a constant.
/// Per `spec.md` §4.2, a constant operand makes a pair non-isomorphic
/// (conservative) and is never recursed through during pack growth.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Operand {
    Value(Value),
    Const(IrConst),
}

impl Operand {
    pub fn as_value(self) -> Option<Value> {
        match self {
            Operand::Value(v) => Some(v),
            Operand::Const(_) => None,
        }
    }
}

/// The integer/bitwise/float arithmetic opcodes `spec.md` §4.1 allows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IrBinOp {
    Add,
    Sub,
    Mul,
    UDiv,
    SDiv,
    URem,
    SRem,
    And,
    Or,
    Xor,
    Shl,
    LShr,
    AShr,
    FAdd,
    FSub,
    FMul,
    FDiv,
    FRem,
}

impl IrBinOp {
    pub fn is_float(self) -> bool {
        matches!(self, IrBinOp::FAdd | IrBinOp::FSub | IrBinOp::FMul | IrBinOp::FDiv | IrBinOp::FRem)
    }

    pub fn mnemonic(self) -> &'static str {
        match self {
            IrBinOp::Add => "add",
            IrBinOp::Sub => "sub",
            IrBinOp::Mul => "mul",
            IrBinOp::UDiv => "udiv",
            IrBinOp::SDiv => "sdiv",
            IrBinOp::URem => "urem",
            IrBinOp::SRem => "srem",
            IrBinOp::And => "and",
            IrBinOp::Or => "or",
            IrBinOp::Xor => "xor",
            IrBinOp::Shl => "shl",
            IrBinOp::LShr => "lshr",
            IrBinOp::AShr => "ashr",
            IrBinOp::FAdd => "fadd",
            IrBinOp::FSub => "fsub",
            IrBinOp::FMul => "fmul",
            IrBinOp::FDiv => "fdiv",
            IrBinOp::FRem => "frem",
        }
    }
}

/// Integer comparison predicates. `Cmp` is never vectorizable by this pass
/// (`spec.md` §4.1 rejects compares); it exists so blocks can contain real
/// rejected opcodes for `ShouldVectorize` to reject.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CmpPred {
    Eq,
    Ne,
    Slt,
    Sle,
    Sgt,
    Sge,
    Ult,
    Ule,
    Ugt,
    Uge,
}

/// One instruction in a basic block.
///
/// Only `BinOp`, `Alloca`, `Load`, and `Store` are ever vectorizable
/// (`spec.md` §4.1). `Cmp`, `Cast`, `Select`, `GetElementPtr`, `Call`, and
/// `Phi` exist so a block can contain realistic rejected opcodes; `Copy`
/// and `LabelAddr` round out the set of things a lowering pass would emit.
/// `Dead` is an internal tombstone for erased instructions (see `ir::mod`
/// erasure model) and is never hand-constructed or seeded as a pack
/// candidate; it only ever appears via `BasicBlock::compact`'s erasure path.
#[derive(Debug, Clone, PartialEq)]
pub enum Instruction {
    BinOp { dest: Value, op: IrBinOp, ty: IrType, lhs: Operand, rhs: Operand },
    Alloca { dest: Value, pointee: ScalarKind, count: u32 },
    Load { dest: Value, ty: IrType, ptr: Operand, volatile: bool },
    Store { val: Operand, ptr: Operand, volatile: bool },
    Copy { dest: Value, src: Operand },
    Phi { dest: Value, ty: IrType, incoming: Vec<(Operand, BlockId)> },
    Cmp { dest: Value, pred: CmpPred, lhs: Operand, rhs: Operand },
    Cast { dest: Value, ty: IrType, src: Operand },
    Select { dest: Value, cond: Operand, true_val: Operand, false_val: Operand },
    GetElementPtr { dest: Value, base: Operand, index: Operand },
    Call { dest: Option<Value>, callee: String, args: Vec<Operand> },
    LabelAddr { dest: Value, label: BlockId },
    /// Tombstone for an erased instruction; see the erasure model in `ir::mod`.
    Dead,
}

impl Instruction {
    pub fn dest(&self) -> Option<Value> {
        match self {
            Instruction::BinOp { dest, .. }
            | Instruction::Alloca { dest, .. }
            | Instruction::Load { dest, .. }
            | Instruction::Copy { dest, .. }
            | Instruction::Phi { dest, .. }
            | Instruction::Cmp { dest, .. }
            | Instruction::Cast { dest, .. }
            | Instruction::Select { dest, .. }
            | Instruction::GetElementPtr { dest, .. }
            | Instruction::LabelAddr { dest, .. } => Some(*dest),
            Instruction::Call { dest, .. } => *dest,
            Instruction::Store { .. } | Instruction::Dead => None,
        }
    }

    pub fn ty(&self) -> IrType {
        match self {
            Instruction::BinOp { ty, .. } | Instruction::Load { ty, .. } | Instruction::Cast { ty, .. } => *ty,
            Instruction::Alloca { .. } => IrType::Ptr,
            Instruction::Copy { src, .. } => match src {
                Operand::Const(c) => c.ty(),
                Operand::Value(_) => IrType::Void, // resolved via the function's value types in practice
            },
            Instruction::Phi { ty, .. } => *ty,
            Instruction::Cmp { .. } => IrType::Scalar(ScalarKind::I32), // boolean-as-i32, never vectorized
            Instruction::Select { .. } => IrType::Void,
            Instruction::GetElementPtr { .. } => IrType::Ptr,
            Instruction::Call { .. } => IrType::Void,
            Instruction::Store { .. } | Instruction::LabelAddr { .. } | Instruction::Dead => IrType::Void,
        }
    }

    /// Number of operand "slots" this instruction has, for `spec.md` §4.2's
    /// arity check. Note `Store`'s operand 0 is the value, operand 1 the
    /// pointer (`spec.md` §9's flagged ordering).
    pub fn arity(&self) -> usize {
        match self {
            Instruction::BinOp { .. } | Instruction::Cmp { .. } | Instruction::Store { .. } => 2,
            Instruction::Load { .. } | Instruction::Copy { .. } | Instruction::Cast { .. } => 1,
            Instruction::Select { .. } => 3,
            Instruction::GetElementPtr { .. } => 2,
            Instruction::Alloca { .. } | Instruction::Phi { .. } | Instruction::Call { .. }
            | Instruction::LabelAddr { .. } | Instruction::Dead => 0,
        }
    }

    /// Operand at `index`, following the same ordering as `arity`.
    pub fn operand(&self, index: usize) -> Option<Operand> {
        match (self, index) {
            (Instruction::BinOp { lhs, .. }, 0) => Some(*lhs),
            (Instruction::BinOp { rhs, .. }, 1) => Some(*rhs),
            (Instruction::Cmp { lhs, .. }, 0) => Some(*lhs),
            (Instruction::Cmp { rhs, .. }, 1) => Some(*rhs),
            (Instruction::Store { val, .. }, 0) => Some(*val),
            (Instruction::Store { ptr, .. }, 1) => Some(*ptr),
            (Instruction::Load { ptr, .. }, 0) => Some(*ptr),
            (Instruction::Copy { src, .. }, 0) => Some(*src),
            (Instruction::Cast { src, .. }, 0) => Some(*src),
            (Instruction::Select { cond, .. }, 0) => Some(*cond),
            (Instruction::Select { true_val, .. }, 1) => Some(*true_val),
            (Instruction::Select { false_val, .. }, 2) => Some(*false_val),
            (Instruction::GetElementPtr { base, .. }, 0) => Some(*base),
            (Instruction::GetElementPtr { index: idx, .. }, 1) => Some(*idx),
            _ => None,
        }
    }

    pub fn is_load(&self) -> bool {
        matches!(self, Instruction::Load { .. })
    }

    pub fn is_store(&self) -> bool {
        matches!(self, Instruction::Store { .. })
    }

    pub fn is_alloca(&self) -> bool {
        matches!(self, Instruction::Alloca { .. })
    }

    pub fn is_dead(&self) -> bool {
        matches!(self, Instruction::Dead)
    }

    pub fn is_volatile(&self) -> bool {
        match self {
            Instruction::Load { volatile, .. } | Instruction::Store { volatile, .. } => *volatile,
            _ => false,
        }
    }

    /// Pointee scalar kind, for allocas only. `spec.md` §4.1's scalar-alloca
    /// condition on loads/stores is checked by resolving their pointer
    /// operand back to its alloca and calling this.
    pub fn pointee_kind(&self) -> Option<ScalarKind> {
        match self {
            Instruction::Alloca { pointee, .. } => Some(*pointee),
            _ => None,
        }
    }

    /// Calls `f` once per operand, in the order `operand`/`arity` use.
    /// Mirrors the teacher compiler's `for_each_operand_in_instruction`.
    pub fn for_each_operand(&self, mut f: impl FnMut(Operand)) {
        for i in 0..self.arity() {
            if let Some(op) = self.operand(i) {
                f(op);
            }
        }
        if let Instruction::Phi { incoming, .. } = self {
            for (op, _) in incoming {
                f(*op);
            }
        }
        if let Instruction::Call { args, .. } = self {
            for op in args {
                f(*op);
            }
        }
    }
}

/// A block terminator. Never part of `BasicBlock::instructions`, so `spec.md`
/// §4.1's "I is not a terminator" check is satisfied by construction: seed
/// search only ever enumerates `instructions`, never the terminator.
#[derive(Debug, Clone, PartialEq)]
pub enum Terminator {
    Branch(BlockId),
    CondBranch { cond: Operand, true_label: BlockId, false_label: BlockId },
    IndirectBranch { address: Operand, possible_targets: Vec<BlockId> },
    Return(Option<Operand>),
    Unreachable,
}

impl Terminator {
    pub fn for_each_operand(&self, mut f: impl FnMut(Operand)) {
        match self {
            Terminator::CondBranch { cond, .. } => f(*cond),
            Terminator::IndirectBranch { address, .. } => f(*address),
            Terminator::Return(Some(op)) => f(*op),
            Terminator::Branch(_) | Terminator::Return(None) | Terminator::Unreachable => {}
        }
    }
}

/// Matches the teacher compiler's free-function naming for operand
/// iteration (`for_each_operand_in_instruction`/`for_each_operand_in_terminator`).
pub fn for_each_operand_in_instruction(inst: &Instruction, f: impl FnMut(Operand)) {
    inst.for_each_operand(f);
}

pub fn for_each_operand_in_terminator(term: &Terminator, f: impl FnMut(Operand)) {
    term.for_each_operand(f);
}

/// A maximal straight-line sequence with a single entry and single exit.
#[derive(Debug, Clone, PartialEq)]
pub struct BasicBlock {
    pub label: BlockId,
    pub instructions: Vec<Instruction>,
    pub terminator: Terminator,
}

impl BasicBlock {
    pub fn new(label: BlockId, terminator: Terminator) -> Self {
        Self { label, instructions: Vec::new(), terminator }
    }

    /// Index of the first non-dead instruction at or after `from`, if any.
    pub fn next_live(&self, from: usize) -> Option<usize> {
        (from..self.instructions.len()).find(|&i| !self.instructions[i].is_dead())
    }

    /// Drops every `Dead` tombstone, compacting the instruction list.
    /// Called once between driver fixpoint iterations (see `ir::mod`
    /// erasure model); never mid-rewrite, since that would invalidate the
    /// indices a `PackList` already holds.
    pub fn compact(&mut self) {
        self.instructions.retain(|inst| !inst.is_dead());
    }

    /// All users of `value` among this block's own instructions (and its
    /// terminator), returned as instruction indices. `spec.md` restricts
    /// dominance/scheduling queries to same-block position, so this is the
    /// only user-enumeration the core pass needs (see `spec.md` §6's note
    /// that the cross-block dominance path is unreachable from the core).
    pub fn users_of(&self, value: Value) -> Vec<usize> {
        let mut users = Vec::new();
        for (i, inst) in self.instructions.iter().enumerate() {
            let mut found = false;
            inst.for_each_operand(|op| {
                if op.as_value() == Some(value) {
                    found = true;
                }
            });
            if found {
                users.push(i);
            }
        }
        users
    }

    /// `true` if `value` has any user outside this block's own instruction
    /// list (its terminator, counted as "external" for scoring purposes
    /// since it is never itself part of a pack).
    pub fn has_terminator_user(&self, value: Value) -> bool {
        let mut found = false;
        self.terminator.for_each_operand(|op| {
            if op.as_value() == Some(value) {
                found = true;
            }
        });
        found
    }
}

/// A function: a name, signature, and its basic blocks. `blocks[0]` is
/// always the entry block.
#[derive(Debug, Clone)]
pub struct IrFunction {
    pub name: String,
    pub return_type: IrType,
    pub params: Vec<(String, IrType)>,
    pub is_variadic: bool,
    pub blocks: Vec<BasicBlock>,
    next_value: u32,
}

impl IrFunction {
    pub fn new(name: String, return_type: IrType, params: Vec<(String, IrType)>, is_variadic: bool) -> Self {
        Self { name, return_type, params, is_variadic, blocks: Vec::new(), next_value: 0 }
    }

    /// Allocates a fresh SSA value id, unique within this function.
    pub fn fresh_value(&mut self) -> Value {
        let v = Value(self.next_value);
        self.next_value += 1;
        v
    }

    /// Ensures subsequently allocated values don't collide with `v`.
    /// Used when constructing a function by hand in tests with explicit ids.
    pub fn reserve_value(&mut self, v: Value) {
        if v.0 >= self.next_value {
            self.next_value = v.0 + 1;
        }
    }

    pub fn block_index(&self, id: BlockId) -> Option<usize> {
        self.blocks.iter().position(|b| b.label == id)
    }

    /// Locates the block and index of the instruction defining `value`,
    /// searching every block in the function (definitions are global,
    /// `spec.md` §3's "operands reference defining instructions" holds
    /// regardless of which block the use sits in).
    pub fn locate(&self, value: Value) -> Option<(usize, usize)> {
        for (bi, block) in self.blocks.iter().enumerate() {
            for (ii, inst) in block.instructions.iter().enumerate() {
                if inst.dest() == Some(value) {
                    return Some((bi, ii));
                }
            }
        }
        None
    }

    pub fn inst_at(&self, bi: usize, ii: usize) -> &Instruction {
        &self.blocks[bi].instructions[ii]
    }
}

/// A module: a set of functions.
#[derive(Debug, Clone, Default)]
pub struct IrModule {
    pub functions: Vec<IrFunction>,
}

impl IrModule {
    pub fn new() -> Self {
        Self::default()
    }

    /// Runs `f` over every function, summing the `usize` each invocation
    /// returns. Matches the teacher compiler's `IrModule::for_each_function`
    /// driver-loop shape (`passes::cfg_simplify::run`).
    pub fn for_each_function(&mut self, mut f: impl FnMut(&mut IrFunction) -> usize) -> usize {
        self.functions.iter_mut().map(|func| f(func)).sum()
    }
}
