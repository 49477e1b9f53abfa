//! Type-directed instruction selection.
//!
//! Pure functions from resolved types (and literal values) to the instruction
//! variant the target needs. Int and boolean share the int family everywhere
//! except array elements, where booleans use `baload`/`bastore`.

use smallvec::{SmallVec, smallvec};

use super::CodegenError;
use crate::ast::{BinaryOp, Type};
use crate::jvm::{
    ArithOp, Cond, Constant, ElementKind, Instruction, LocalKind, NumericKind, Slot,
};

fn malformed(what: &str, ty: &Type) -> CodegenError {
    CodegenError::Malformed(format!("{what} of type {ty}"))
}

pub fn local_kind(ty: &Type) -> Result<LocalKind, CodegenError> {
    match ty {
        Type::Int | Type::Boolean => Ok(LocalKind::Int),
        Type::Float => Ok(LocalKind::Float),
        Type::Array(_) | Type::String => Ok(LocalKind::Reference),
        Type::Void => Err(malformed("variable", ty)),
    }
}

pub fn element_kind(elem: &Type) -> Result<ElementKind, CodegenError> {
    match elem {
        Type::Int => Ok(ElementKind::Int),
        Type::Float => Ok(ElementKind::Float),
        Type::Boolean => Ok(ElementKind::Boolean),
        _ => Err(malformed("array element", elem)),
    }
}

pub fn numeric_kind(ty: &Type) -> Result<NumericKind, CodegenError> {
    match ty {
        Type::Int | Type::Boolean => Ok(NumericKind::Int),
        Type::Float => Ok(NumericKind::Float),
        _ => Err(malformed("operand", ty)),
    }
}

pub fn load(ty: &Type, slot: Slot) -> Result<Instruction, CodegenError> {
    Ok(Instruction::Load(local_kind(ty)?, slot))
}

pub fn store(ty: &Type, slot: Slot) -> Result<Instruction, CodegenError> {
    Ok(Instruction::Store(local_kind(ty)?, slot))
}

pub fn array_load(elem: &Type) -> Result<Instruction, CodegenError> {
    Ok(Instruction::ArrayLoad(element_kind(elem)?))
}

pub fn array_store(elem: &Type) -> Result<Instruction, CodegenError> {
    Ok(Instruction::ArrayStore(element_kind(elem)?))
}

pub fn new_array(elem: &Type) -> Result<Instruction, CodegenError> {
    Ok(Instruction::NewArray(element_kind(elem)?))
}

/// Narrowest encoding of an int constant.
pub fn int_const(value: i32) -> Instruction {
    match value {
        -1 => Instruction::IconstM1,
        0..=5 => Instruction::Iconst(value as u8),
        _ => {
            if let Ok(byte) = i8::try_from(value) {
                Instruction::Bipush(byte)
            } else if let Ok(short) = i16::try_from(value) {
                Instruction::Sipush(short)
            } else {
                Instruction::Ldc(Constant::Int(value))
            }
        }
    }
}

pub fn float_const(value: f32) -> Instruction {
    if value == 0.0 {
        Instruction::Fconst(0)
    } else if value == 1.0 {
        Instruction::Fconst(1)
    } else if value == 2.0 {
        Instruction::Fconst(2)
    } else {
        Instruction::Ldc(Constant::Float(value))
    }
}

pub fn bool_const(value: bool) -> Instruction {
    Instruction::Iconst(u8::from(value))
}

/// Default value stored into a global declared without an initializer.
pub fn zero(ty: &Type) -> Result<Instruction, CodegenError> {
    match ty {
        Type::Float => Ok(Instruction::Fconst(0)),
        Type::Int | Type::Boolean => Ok(Instruction::Iconst(0)),
        _ => Err(malformed("default value", ty)),
    }
}

/// Arithmetic operator to its instruction sequence. Every sequence pops two and
/// pushes one.
pub fn arithmetic(
    op: BinaryOp,
    kind: NumericKind,
) -> Result<SmallVec<[Instruction; 2]>, CodegenError> {
    let seq = match op {
        BinaryOp::Add => smallvec![Instruction::Arith(kind, ArithOp::Add)],
        BinaryOp::Sub => smallvec![
            Instruction::Neg(kind),
            Instruction::Arith(kind, ArithOp::Add)
        ],
        BinaryOp::Mul => smallvec![Instruction::Arith(kind, ArithOp::Mul)],
        BinaryOp::Div => smallvec![Instruction::Arith(kind, ArithOp::Div)],
        _ => {
            return Err(CodegenError::Malformed(format!(
                "{op:?} is not an arithmetic operator"
            )));
        }
    };
    Ok(seq)
}

pub fn condition(op: BinaryOp) -> Result<Cond, CodegenError> {
    match op {
        BinaryOp::Eq => Ok(Cond::Eq),
        BinaryOp::Ne => Ok(Cond::Ne),
        BinaryOp::Lt => Ok(Cond::Lt),
        BinaryOp::Le => Ok(Cond::Le),
        BinaryOp::Gt => Ok(Cond::Gt),
        BinaryOp::Ge => Ok(Cond::Ge),
        _ => Err(CodegenError::Malformed(format!(
            "{op:?} is not a comparison"
        ))),
    }
}

pub fn value_return(ty: &Type) -> Result<Instruction, CodegenError> {
    Ok(Instruction::ValueReturn(numeric_kind(ty)?))
}
