//! Public API for the VC code generator.
//!
//! # Example
//!
//! ```
//! use vc_core::api::{self, CompilationOptions};
//! use vc_core::ast::{Type, build::*};
//! use vc_core::stdlib::Builtin;
//!
//! // void main() { putIntLn(42); }
//! let program = program(vec![function(
//!     "main",
//!     Type::Void,
//!     vec![],
//!     block(vec![], vec![expr_stmt(builtin(Builtin::PutIntLn, vec![int(42)]))]),
//! )]);
//!
//! let class = api::compile(&program, &CompilationOptions::new("Answer")).unwrap();
//! assert!(class.to_text().contains("invokestatic VC/lang/System/putIntLn(I)V"));
//! ```

pub mod error;
pub mod options;

use std::path::{Path, PathBuf};

use tracing::info;

pub use error::Error;
pub use options::{CompilationOptions, OUTPUT_EXTENSION, output_path};

use crate::ast::Program;
use crate::compiler::Emitter;
use crate::jvm::ClassCode;

/// Generates the class for a checked program.
pub fn compile(program: &Program, options: &CompilationOptions) -> Result<ClassCode, Error> {
    Ok(Emitter::compile(program, options)?)
}

/// Generates the class and writes it to `path`.
///
/// Nothing is written if generation fails.
pub fn compile_to_file(
    program: &Program,
    options: &CompilationOptions,
    path: &Path,
) -> Result<ClassCode, Error> {
    let class = compile(program, options)?;
    class.dump(path).map_err(|source| Error::Output {
        path: PathBuf::from(path),
        source,
    })?;
    info!(class = %class.class_name, path = %path.display(), lines = class.code.len(), "wrote class");
    Ok(class)
}
