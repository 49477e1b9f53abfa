//! Target-side model: the Jasmin instruction set, type descriptors and the
//! append-only stream generated code is written into.

mod code;
mod descriptor;
mod instruction_set;

pub use code::{ClassCode, CodeStream, MethodLimits};
pub use descriptor::{Descriptor, FieldRef, MethodDescriptor, MethodRef};
pub use instruction_set::{
    ArithOp, Cond, Constant, ElementKind, InvokeKind, Instruction, Label, LocalKind, NumericKind,
    Slot,
};
