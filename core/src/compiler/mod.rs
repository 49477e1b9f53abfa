//! Code generator for checked VC programs.
//!
//! This module transforms a checked [`Program`](crate::ast::Program) into the
//! Jasmin assembly of one class.
//!
//! ## Design
//!
//! - Pattern matching over the tree's sum types; no visitor
//! - One [`Frame`] per method tracks stack depth, slots and labels precisely
//! - Stack depth follows each emitted instruction's stack effect, so the
//!   reported `.limit stack` is the exact high-water mark
//! - Array element expressions get an explicit load/store context from their
//!   parent instead of a back-pointer
//! - Every error is fatal: no partial class is ever returned

mod emitter;
mod error;
pub mod frame;
pub mod select;

#[cfg(test)]
pub(crate) mod stack_sim;
#[cfg(test)]
pub(crate) mod test_vm;

pub use emitter::Emitter;
pub use error::{CodegenError, ErrorClass};
pub use frame::{Frame, FrameKind};
