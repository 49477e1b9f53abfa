//! Shorthand constructors for checked trees.
//!
//! Used by tests and by embedders that synthesize programs directly instead of
//! going through a front end. Result types are derived the way the checker
//! derives them, so a tree built here is as well-formed as its inputs.

use crate::stdlib::Builtin;

use super::{
    BinaryOp, Binding, Block, Callee, Decl, DeclId, Expr, ExprKind, FuncDecl, GlobalVar, LocalId,
    LocalVar, Param, Program, Stmt, Type, UnaryOp, VarRef,
};

pub fn program(decls: Vec<Decl>) -> Program {
    Program { decls }
}

pub fn global(name: &str, ty: Type, init: Option<Expr>) -> Decl {
    Decl::Global(GlobalVar {
        name: name.to_string(),
        ty,
        init,
    })
}

pub fn function(name: &str, ret: Type, params: Vec<Param>, body: Block) -> Decl {
    Decl::Function(FuncDecl {
        name: name.to_string(),
        ret,
        params,
        body,
    })
}

pub fn param(id: u32, name: &str, ty: Type) -> Param {
    Param {
        id: LocalId(id),
        name: name.to_string(),
        ty,
    }
}

pub fn local(id: u32, name: &str, ty: Type, init: Option<Expr>) -> LocalVar {
    LocalVar {
        id: LocalId(id),
        name: name.to_string(),
        ty,
        init,
    }
}

pub fn block(decls: Vec<LocalVar>, stmts: Vec<Stmt>) -> Block {
    Block { decls, stmts }
}

pub fn compound(decls: Vec<LocalVar>, stmts: Vec<Stmt>) -> Stmt {
    Stmt::Compound(block(decls, stmts))
}

pub fn expr_stmt(expr: Expr) -> Stmt {
    Stmt::Expr(expr)
}

pub fn if_then(cond: Expr, then: Stmt) -> Stmt {
    Stmt::If {
        cond,
        then: Box::new(then),
        otherwise: None,
    }
}

pub fn if_else(cond: Expr, then: Stmt, otherwise: Stmt) -> Stmt {
    Stmt::If {
        cond,
        then: Box::new(then),
        otherwise: Some(Box::new(otherwise)),
    }
}

pub fn while_loop(cond: Expr, body: Stmt) -> Stmt {
    Stmt::While {
        cond,
        body: Box::new(body),
    }
}

pub fn for_loop(init: Option<Expr>, cond: Option<Expr>, step: Option<Expr>, body: Stmt) -> Stmt {
    Stmt::For {
        init,
        cond,
        step,
        body: Box::new(body),
    }
}

pub fn ret(value: Option<Expr>) -> Stmt {
    Stmt::Return(value)
}

pub fn int(value: i32) -> Expr {
    Expr {
        ty: Type::Int,
        kind: ExprKind::Int(value),
    }
}

pub fn float(value: f32) -> Expr {
    Expr {
        ty: Type::Float,
        kind: ExprKind::Float(value),
    }
}

pub fn boolean(value: bool) -> Expr {
    Expr {
        ty: Type::Boolean,
        kind: ExprKind::Bool(value),
    }
}

pub fn string(value: &str) -> Expr {
    Expr {
        ty: Type::String,
        kind: ExprKind::Str(value.to_string()),
    }
}

pub fn local_ref(id: u32, name: &str, ty: Type) -> Expr {
    var(name, Binding::Local(LocalId(id)), ty)
}

pub fn global_ref(decl: u32, name: &str, ty: Type) -> Expr {
    var(name, Binding::Global(DeclId(decl)), ty)
}

fn var(name: &str, binding: Binding, ty: Type) -> Expr {
    Expr {
        ty,
        kind: ExprKind::Var(VarRef {
            name: name.to_string(),
            binding,
        }),
    }
}

pub fn unary(op: UnaryOp, operand: Expr) -> Expr {
    let ty = match op {
        UnaryOp::Not => Type::Boolean,
        UnaryOp::IntToFloat => Type::Float,
        UnaryOp::Neg | UnaryOp::Plus => operand.ty.clone(),
    };
    Expr {
        ty,
        kind: ExprKind::Unary {
            op,
            operand: Box::new(operand),
        },
    }
}

/// Widens an int operand to float.
pub fn i2f(operand: Expr) -> Expr {
    unary(UnaryOp::IntToFloat, operand)
}

pub fn binary(op: BinaryOp, left: Expr, right: Expr) -> Expr {
    let ty = if op.is_comparison() || op.is_logical() {
        Type::Boolean
    } else {
        left.ty.clone()
    };
    Expr {
        ty,
        kind: ExprKind::Binary {
            op,
            left: Box::new(left),
            right: Box::new(right),
        },
    }
}

pub fn assign(target: Expr, value: Expr) -> Expr {
    Expr {
        ty: target.ty.clone(),
        kind: ExprKind::Assign {
            target: Box::new(target),
            value: Box::new(value),
        },
    }
}

pub fn index(array: Expr, index: Expr) -> Expr {
    let ty = array.ty.element().cloned().unwrap_or(Type::Void);
    Expr {
        ty,
        kind: ExprKind::Index {
            array: Box::new(array),
            index: Box::new(index),
        },
    }
}

pub fn builtin(builtin: Builtin, args: Vec<Expr>) -> Expr {
    Expr {
        ty: builtin.result_type(),
        kind: ExprKind::Call {
            name: builtin.name().to_string(),
            callee: Callee::Builtin(builtin),
            args,
        },
    }
}

pub fn call(decl: u32, name: &str, ret: Type, args: Vec<Expr>) -> Expr {
    Expr {
        ty: ret,
        kind: ExprKind::Call {
            name: name.to_string(),
            callee: Callee::Function(DeclId(decl)),
            args,
        },
    }
}

pub fn init(elem: Type, elems: Vec<Expr>) -> Expr {
    Expr {
        ty: Type::array(elem, Some(elems.len() as u32)),
        kind: ExprKind::Init(elems),
    }
}
