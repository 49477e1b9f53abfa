//! Configuration options for the VC code generator.

use std::path::{Path, PathBuf};

/// Extension of generated assembly files.
pub const OUTPUT_EXTENSION: &str = "j";

/// Configuration options for compilation.
///
/// # Example
///
/// ```
/// use vc_core::api::CompilationOptions;
///
/// let options = CompilationOptions::for_source("tests/gcd.vc".as_ref());
/// assert_eq!(options.class_name, "gcd");
/// assert!(options.comments);
///
/// let quiet = CompilationOptions::new("Gcd").with_comments(false);
/// assert!(!quiet.comments);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompilationOptions {
    /// Name of the generated class. Also the type of the entry function's
    /// program instance and the owner of every field and method.
    pub class_name: String,

    /// Emit the explanatory `;` lines around synthesized code.
    ///
    /// Default: true
    pub comments: bool,
}

impl CompilationOptions {
    /// Class name used when none can be derived from the input.
    pub const DEFAULT_CLASS: &'static str = "Main";

    pub fn new(class_name: impl Into<String>) -> Self {
        Self {
            class_name: class_name.into(),
            comments: true,
        }
    }

    /// Options for the program read from `path`: the class is named after
    /// the file's base name.
    pub fn for_source(path: &Path) -> Self {
        let class_name = path
            .file_stem()
            .and_then(|stem| stem.to_str())
            .filter(|stem| !stem.is_empty())
            .unwrap_or(Self::DEFAULT_CLASS);
        Self::new(class_name)
    }

    pub fn with_comments(mut self, comments: bool) -> Self {
        self.comments = comments;
        self
    }
}

impl Default for CompilationOptions {
    fn default() -> Self {
        Self::new(Self::DEFAULT_CLASS)
    }
}

/// Where the assembly for `input` is written: same directory and base name,
/// extension `.j`.
pub fn output_path(input: &Path) -> PathBuf {
    input.with_extension(OUTPUT_EXTENSION)
}
