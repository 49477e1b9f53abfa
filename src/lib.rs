//! VC - Jasmin code generator for the VC teaching language
//!
//! # Overview
//!
//! The front end of a VC compiler (parser and checker) produces a checked
//! syntax tree: every expression carries its type and every identifier points
//! at its declaration. This crate turns that tree into the Jasmin assembly of
//! one JVM class, ready for the `jasmin` assembler.
//!
//! Each VC function becomes an instance method; `main` becomes the static
//! entry point and creates the instance the other methods are called on.
//! Global variables become static fields initialized in `<clinit>`. Built-in
//! I/O functions are static methods of `VC/lang/System`.
//!
//! # Quick Start
//!
//! ```
//! use vc::ast::{BinaryOp, Type, build::*};
//! use vc::stdlib::Builtin;
//! use vc::CompilationOptions;
//!
//! // void main() { putIntLn(6 * 7); }
//! let program = program(vec![function(
//!     "main",
//!     Type::Void,
//!     vec![],
//!     block(
//!         vec![],
//!         vec![expr_stmt(builtin(
//!             Builtin::PutIntLn,
//!             vec![binary(BinaryOp::Mul, int(6), int(7))],
//!         ))],
//!     ),
//! )]);
//!
//! let class = vc::compile(&program, &CompilationOptions::new("Answer")).unwrap();
//! let text = class.to_text();
//! assert!(text.starts_with(".class public Answer\n"));
//! assert!(text.contains("    imul\n"));
//! ```
//!
//! Programs can also be read from their JSON form (see [`ast::Program`]), which
//! is what the `vcc` command line tool consumes.

// Re-export public API from vc_core
pub use vc_core::api::{
    CompilationOptions, Error, OUTPUT_EXTENSION, compile, compile_to_file, output_path,
};

// Re-export the tree and the generated code
pub use vc_core::ast::{self, Program};
pub use vc_core::jvm::{self, ClassCode};
pub use vc_core::stdlib;

// Re-export errors
pub use vc_core::compiler::{CodegenError, ErrorClass};
