use core::fmt;
use std::io::{self, Write};
use std::path::Path;

use super::Instruction;

/// Ordered, append-only sequence of assembly lines.
///
/// Lines are never reordered or removed once appended. The stream is rendered
/// once, after generation has finished.
#[derive(Clone, Default, PartialEq)]
pub struct CodeStream {
    lines: Vec<Instruction>,
}

impl CodeStream {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(&mut self, instruction: Instruction) {
        self.lines.push(instruction);
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Instruction> {
        self.lines.iter()
    }

    pub fn as_slice(&self) -> &[Instruction] {
        &self.lines
    }

    pub fn write_to<W: Write>(&self, out: &mut W) -> io::Result<()> {
        write!(out, "{self}")
    }

    pub fn to_text(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for CodeStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for line in &self.lines {
            if line.is_flush() {
                writeln!(f, "{line}")?;
            } else {
                writeln!(f, "    {line}")?;
            }
        }
        Ok(())
    }
}

impl fmt::Debug for CodeStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "CodeStream {{")?;
        for (addr, line) in self.lines.iter().enumerate() {
            writeln!(f, "  {addr:4}  {line}")?;
        }
        write!(f, "}}")
    }
}

impl<'a> IntoIterator for &'a CodeStream {
    type Item = &'a Instruction;
    type IntoIter = core::slice::Iter<'a, Instruction>;

    fn into_iter(self) -> Self::IntoIter {
        self.lines.iter()
    }
}

/// Method-level metadata written into each method's `.limit` directives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodLimits {
    pub name: String,
    pub max_stack: u32,
    pub max_locals: u32,
}

/// A fully generated class.
#[derive(Debug, Clone, PartialEq)]
pub struct ClassCode {
    pub class_name: String,
    pub code: CodeStream,
    /// One entry per emitted method, in emission order.
    pub methods: Vec<MethodLimits>,
}

impl ClassCode {
    pub fn method(&self, name: &str) -> Option<&MethodLimits> {
        self.methods.iter().find(|method| method.name == name)
    }

    /// The lines between a method's `.method` directive and its `.end method`,
    /// both exclusive.
    pub fn method_body(&self, name: &str) -> Option<&[Instruction]> {
        let lines = self.code.as_slice();
        let start = lines.iter().position(|line| {
            matches!(line, Instruction::Method { name: method, .. } if method == name)
        })? + 1;
        let len = lines[start..]
            .iter()
            .position(|line| matches!(line, Instruction::EndMethod))?;
        Some(&lines[start..start + len])
    }

    pub fn to_text(&self) -> String {
        self.code.to_text()
    }

    /// Writes the assembly listing to `path`, replacing any existing file.
    pub fn dump(&self, path: &Path) -> io::Result<()> {
        let mut out = io::BufWriter::new(std::fs::File::create(path)?);
        self.code.write_to(&mut out)?;
        out.flush()
    }
}
