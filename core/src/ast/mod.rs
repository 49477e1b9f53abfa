//! Checked syntax tree consumed by the code generator.
//!
//! The front end hands over a program whose expressions already carry their
//! resolved [`Type`] and whose identifiers already point at their declaration.
//! Nodes are plain sum types: the generator matches on them exhaustively, so a
//! new node kind cannot be forgotten anywhere the tree is walked.
//!
//! There are no parent links. The only question the generator would ask a parent
//! ("is this element access the target of an assignment?") is answered by the
//! translator passing the context down.
//!
//! Declarations of locals and parameters carry the checker's [`LocalId`], not a
//! slot index. Slots are assigned during generation and kept by the frame.

mod ty;

pub mod build;

use serde::{Deserialize, Serialize};

use crate::jvm::MethodDescriptor;
use crate::stdlib::Builtin;

pub use ty::{ArrayType, Type};

/// Index of a top-level declaration in [`Program::decls`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DeclId(pub u32);

impl DeclId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Symbol number the checker gave a local variable or parameter.
///
/// Unique within the program; never reused for a different declaration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LocalId(pub u32);

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Program {
    pub decls: Vec<Decl>,
}

impl Program {
    pub fn decl(&self, id: DeclId) -> Option<&Decl> {
        self.decls.get(id.index())
    }

    pub fn globals(&self) -> impl Iterator<Item = &GlobalVar> {
        self.decls.iter().filter_map(|decl| match decl {
            Decl::Global(global) => Some(global),
            Decl::Function(_) => None,
        })
    }

    pub fn functions(&self) -> impl Iterator<Item = &FuncDecl> {
        self.decls.iter().filter_map(|decl| match decl {
            Decl::Function(func) => Some(func),
            Decl::Global(_) => None,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Decl {
    Global(GlobalVar),
    Function(FuncDecl),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GlobalVar {
    pub name: String,
    pub ty: Type,
    #[serde(default)]
    pub init: Option<Expr>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocalVar {
    pub id: LocalId,
    pub name: String,
    pub ty: Type,
    #[serde(default)]
    pub init: Option<Expr>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Param {
    pub id: LocalId,
    pub name: String,
    pub ty: Type,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FuncDecl {
    pub name: String,
    pub ret: Type,
    #[serde(default)]
    pub params: Vec<Param>,
    pub body: Block,
}

impl FuncDecl {
    /// Name of the program entry point.
    pub const ENTRY: &'static str = "main";

    pub fn is_entry(&self) -> bool {
        self.name == Self::ENTRY
    }

    /// Target signature of this function as an instance method.
    ///
    /// Built from the declared parameters, never from a call site's arguments.
    pub fn descriptor(&self) -> MethodDescriptor {
        MethodDescriptor::new(
            self.params.iter().map(|param| param.ty.descriptor()).collect(),
            self.ret.descriptor(),
        )
    }
}

/// A compound statement: local declarations first, then statements.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Block {
    #[serde(default)]
    pub decls: Vec<LocalVar>,
    #[serde(default)]
    pub stmts: Vec<Stmt>,
}

impl Block {
    pub fn is_empty(&self) -> bool {
        self.decls.is_empty() && self.stmts.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Stmt {
    Compound(Block),
    If {
        cond: Expr,
        then: Box<Stmt>,
        #[serde(default)]
        otherwise: Option<Box<Stmt>>,
    },
    While {
        cond: Expr,
        body: Box<Stmt>,
    },
    For {
        #[serde(default)]
        init: Option<Expr>,
        #[serde(default)]
        cond: Option<Expr>,
        #[serde(default)]
        step: Option<Expr>,
        body: Box<Stmt>,
    },
    Break,
    Continue,
    Return(Option<Expr>),
    Expr(Expr),
    Empty,
}

/// An expression together with the type the checker resolved for it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Expr {
    pub ty: Type,
    pub kind: ExprKind,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ExprKind {
    Int(i32),
    Float(f32),
    Bool(bool),
    Str(String),
    Var(VarRef),
    Unary {
        op: UnaryOp,
        operand: Box<Expr>,
    },
    Binary {
        op: BinaryOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },
    Assign {
        target: Box<Expr>,
        value: Box<Expr>,
    },
    Index {
        array: Box<Expr>,
        index: Box<Expr>,
    },
    Call {
        name: String,
        callee: Callee,
        #[serde(default)]
        args: Vec<Expr>,
    },
    /// Brace-enclosed array initializer; only valid as a declaration's initializer.
    Init(Vec<Expr>),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VarRef {
    pub name: String,
    pub binding: Binding,
}

/// The declaration an identifier resolved to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Binding {
    Global(DeclId),
    Local(LocalId),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Callee {
    Builtin(Builtin),
    Function(DeclId),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UnaryOp {
    Not,
    Neg,
    Plus,
    /// Implicit int to float widening inserted by the checker.
    IntToFloat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    And,
    Or,
}

impl BinaryOp {
    pub fn is_comparison(self) -> bool {
        matches!(
            self,
            BinaryOp::Eq | BinaryOp::Ne | BinaryOp::Lt | BinaryOp::Le | BinaryOp::Gt | BinaryOp::Ge
        )
    }

    pub fn is_logical(self) -> bool {
        matches!(self, BinaryOp::And | BinaryOp::Or)
    }
}
