//! Public error types for the VC code generator API.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::compiler::CodegenError;

/// Public error type for all API operations.
#[derive(Debug, Error)]
pub enum Error {
    /// Generation aborted; nothing was written.
    #[error("code generation failed: {0}")]
    Codegen(#[from] CodegenError),

    /// The assembly could not be written.
    #[error("cannot write `{}`", path.display())]
    Output {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}
