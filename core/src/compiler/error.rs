//! Code generation errors.

use thiserror::Error;

/// Errors that abort code generation.
///
/// None of these is a diagnostic for the program's author: a checked tree either
/// breaks the front end's contract ([`ErrorClass::Upstream`]) or exposes a defect in
/// the generator itself ([`ErrorClass::Internal`]). Either way no output is produced.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CodegenError {
    #[error("operand stack underflow: popping {requested} with depth {depth}")]
    StackUnderflow { requested: usize, depth: usize },

    #[error("`{0}` outside of any loop")]
    NoEnclosingLoop(&'static str),

    #[error("variable declared outside of any scope")]
    NoEnclosingScope,

    #[error("statement left {0} values on the operand stack")]
    ResidualStack(usize),

    #[error("unbalanced label stacks at end of `{0}`")]
    UnbalancedLabels(String),

    #[error("unresolved binding for `{0}`")]
    UnresolvedBinding(String),

    #[error("slot for `{0}` assigned twice")]
    SlotReassigned(String),

    #[error("malformed tree: {0}")]
    Malformed(String),

    #[error("unsupported {0}")]
    Unsupported(String),

    #[error("too many local variables (limit: 65535)")]
    TooManyLocals,
}

/// Which side of the checker/generator boundary an error points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    /// The checked tree violates the input contract.
    Upstream,
    /// The generator broke one of its own invariants.
    Internal,
}

impl CodegenError {
    pub fn class(&self) -> ErrorClass {
        match self {
            CodegenError::UnresolvedBinding(_)
            | CodegenError::Malformed(_)
            | CodegenError::Unsupported(_)
            | CodegenError::TooManyLocals => ErrorClass::Upstream,
            CodegenError::StackUnderflow { .. }
            | CodegenError::NoEnclosingLoop(_)
            | CodegenError::NoEnclosingScope
            | CodegenError::ResidualStack(_)
            | CodegenError::UnbalancedLabels(_)
            | CodegenError::SlotReassigned(_) => ErrorClass::Internal,
        }
    }
}
