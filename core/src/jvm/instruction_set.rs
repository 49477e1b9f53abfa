//! Jasmin instruction set
//!
//! Every line the generator can put into a class file listing is one
//! [`Instruction`]: assembler directives, labels, comments and opcodes alike.
//! Rendering is exact: `Display` produces the line as the assembler reads it,
//! without indentation (the [`CodeStream`](super::CodeStream) lays lines out).
//!
//! # Typed families
//!
//! Opcodes that exist in several typed flavours (`iload`/`fload`/`aload`,
//! `iadd`/`fadd`, `iaload`/`faload`/`baload`, ...) are one variant parameterized
//! by a kind, so selection logic picks a kind and never builds opcode strings.
//!
//! # Stack Discipline
//!
//! Stack effect notation: `[..., operand1, operand2] -> [..., result]`.
//! [`Instruction::stack_effect`] reports the same information as a
//! `(pops, pushes)` pair, which is what test tooling replays.

use core::fmt;

use super::{Descriptor, FieldRef, MethodDescriptor, MethodRef};

/// Local-variable slot index.
pub type Slot = u16;

/// Branch target, unique within one method. Rendered as `L<n>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Label(pub u32);

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "L{}", self.0)
    }
}

/// Type family of a local-variable load or store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LocalKind {
    /// int and boolean
    Int,
    Float,
    /// arrays and object references
    Reference,
}

impl LocalKind {
    fn prefix(self) -> char {
        match self {
            LocalKind::Int => 'i',
            LocalKind::Float => 'f',
            LocalKind::Reference => 'a',
        }
    }
}

/// Element type of a primitive array.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ElementKind {
    Int,
    Float,
    Boolean,
}

impl ElementKind {
    fn prefix(self) -> char {
        match self {
            ElementKind::Int => 'i',
            ElementKind::Float => 'f',
            ElementKind::Boolean => 'b',
        }
    }

    /// Operand of `newarray`.
    pub fn type_name(self) -> &'static str {
        match self {
            ElementKind::Int => "int",
            ElementKind::Float => "float",
            ElementKind::Boolean => "boolean",
        }
    }
}

/// Numeric family of arithmetic and value returns. Booleans travel as ints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NumericKind {
    Int,
    Float,
}

impl NumericKind {
    fn prefix(self) -> char {
        match self {
            NumericKind::Int => 'i',
            NumericKind::Float => 'f',
        }
    }
}

/// Arithmetic opcodes. There is no subtract: it is emitted as negate then add.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArithOp {
    Add,
    Mul,
    Div,
}

impl ArithOp {
    fn suffix(self) -> &'static str {
        match self {
            ArithOp::Add => "add",
            ArithOp::Mul => "mul",
            ArithOp::Div => "div",
        }
    }
}

/// Branch condition shared by `if<cond>` and `if_icmp<cond>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Cond {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
}

impl Cond {
    pub fn suffix(self) -> &'static str {
        match self {
            Cond::Eq => "eq",
            Cond::Ne => "ne",
            Cond::Lt => "lt",
            Cond::Le => "le",
            Cond::Gt => "gt",
            Cond::Ge => "ge",
        }
    }

    /// Evaluates the condition against a comparison result or a pair of ints.
    pub fn holds(self, left: i32, right: i32) -> bool {
        match self {
            Cond::Eq => left == right,
            Cond::Ne => left != right,
            Cond::Lt => left < right,
            Cond::Le => left <= right,
            Cond::Gt => left > right,
            Cond::Ge => left >= right,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InvokeKind {
    Static,
    Virtual,
    Special,
    Nonvirtual,
}

impl InvokeKind {
    fn mnemonic(self) -> &'static str {
        match self {
            InvokeKind::Static => "invokestatic",
            InvokeKind::Virtual => "invokevirtual",
            InvokeKind::Special => "invokespecial",
            InvokeKind::Nonvirtual => "invokenonvirtual",
        }
    }

    /// Whether the call consumes an object reference below its arguments.
    pub fn has_receiver(self) -> bool {
        !matches!(self, InvokeKind::Static)
    }
}

/// Operand of `ldc`.
#[derive(Debug, Clone, PartialEq)]
pub enum Constant {
    Int(i32),
    Float(f32),
    String(String),
}

impl fmt::Display for Constant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Constant::Int(value) => write!(f, "{value}"),
            Constant::Float(value) => write_float(f, *value),
            Constant::String(value) => {
                write!(f, "\"")?;
                for ch in value.chars() {
                    match ch {
                        '"' => write!(f, "\\\"")?,
                        '\\' => write!(f, "\\\\")?,
                        '\n' => write!(f, "\\n")?,
                        '\t' => write!(f, "\\t")?,
                        '\r' => write!(f, "\\r")?,
                        _ => write!(f, "{ch}")?,
                    }
                }
                write!(f, "\"")
            }
        }
    }
}

/// Writes a float literal so it always reads back as a float: Debug keeps the
/// fractional part (`3.0`, not `3`), and exponent forms get a dotted mantissa
/// (`1.0E-7`, not `1e-7`).
fn write_float(f: &mut fmt::Formatter<'_>, value: f32) -> fmt::Result {
    let text = format!("{value:?}");
    match text.split_once('e') {
        Some((mantissa, exponent)) if mantissa.contains('.') => {
            write!(f, "{mantissa}E{exponent}")
        }
        Some((mantissa, exponent)) => write!(f, "{mantissa}.0E{exponent}"),
        None => f.write_str(&text),
    }
}

/// One line of Jasmin assembly.
#[derive(Debug, Clone, PartialEq)]
pub enum Instruction {
    // ========================================================================
    // Directives
    // ========================================================================
    /// `.class public <name>`
    Class(String),
    /// `.super <name>`
    Super(String),
    /// `.field static <name> <descriptor>`
    Field { name: String, descriptor: Descriptor },
    /// `.method <modifiers> <name><descriptor>`
    Method {
        modifiers: &'static str,
        name: String,
        descriptor: MethodDescriptor,
    },
    /// `.var <slot> is <name> <descriptor> from <from> to <to>`
    Var {
        slot: Slot,
        name: String,
        descriptor: Descriptor,
        from: Label,
        to: Label,
    },
    /// `.limit locals <n>`
    LimitLocals(u32),
    /// `.limit stack <n>`
    LimitStack(u32),
    /// `.end method`
    EndMethod,
    /// `L<n>:`
    Label(Label),
    /// `; <text>`
    Comment(String),
    /// Empty line.
    Blank,

    // ========================================================================
    // Constants
    // ========================================================================
    /// Stack: [...] -> [...]
    Nop,
    /// Stack: [...] -> [..., -1]
    IconstM1,
    /// `iconst_<n>`, n in 0..=5
    /// Stack: [...] -> [..., n]
    Iconst(u8),
    /// `fconst_<n>`, n in 0..=2
    /// Stack: [...] -> [..., n]
    Fconst(u8),
    /// Stack: [...] -> [..., byte]
    Bipush(i8),
    /// Stack: [...] -> [..., short]
    Sipush(i16),
    /// Stack: [...] -> [..., constant]
    Ldc(Constant),

    // ========================================================================
    // Locals, arrays, statics
    // ========================================================================
    /// `<k>load`, with the `_<n>` short form for slots 0..=3
    /// Stack: [...] -> [..., value]
    Load(LocalKind, Slot),
    /// `<k>store`, with the `_<n>` short form for slots 0..=3
    /// Stack: [..., value] -> [...]
    Store(LocalKind, Slot),
    /// Stack: [..., array, index] -> [..., value]
    ArrayLoad(ElementKind),
    /// Stack: [..., array, index, value] -> [...]
    ArrayStore(ElementKind),
    /// Stack: [...] -> [..., value]
    GetStatic(FieldRef),
    /// Stack: [..., value] -> [...]
    PutStatic(FieldRef),

    // ========================================================================
    // Stack manipulation
    // ========================================================================
    /// Stack: [..., a] -> [...]
    Pop,
    /// Stack: [..., a] -> [..., a, a]
    Dup,
    /// Stack: [..., c, b, a] -> [..., a, c, b, a]
    DupX2,

    // ========================================================================
    // Arithmetic & conversion
    // ========================================================================
    /// Stack: [..., a, b] -> [..., a op b]
    Arith(NumericKind, ArithOp),
    /// Stack: [..., a] -> [..., -a]
    Neg(NumericKind),
    /// Stack: [..., int] -> [..., float]
    I2f,
    /// Stack: [..., a: Float, b: Float] -> [..., -1 | 0 | 1]
    Fcmpg,

    // ========================================================================
    // Control flow
    // ========================================================================
    /// Branch when the int on top of the stack compared with zero satisfies the condition.
    /// Stack: [..., a] -> [...]
    If(Cond, Label),
    /// Stack: [..., a: Int, b: Int] -> [...]
    IfIcmp(Cond, Label),
    /// Stack: [...] -> [...]
    Goto(Label),
    /// Stack: [...] -> []
    Return,
    /// `ireturn` / `freturn`
    /// Stack: [..., value] -> []
    ValueReturn(NumericKind),

    // ========================================================================
    // Objects & calls
    // ========================================================================
    /// Stack: [..., receiver?, args...] -> [..., result?]
    Invoke(InvokeKind, MethodRef),
    /// Stack: [...] -> [..., object]
    New(String),
    /// Stack: [..., count] -> [..., array]
    NewArray(ElementKind),
}

impl Instruction {
    /// Opcode family of an executable instruction, `None` for directives,
    /// labels, comments and blank lines.
    ///
    /// Short forms are not distinguished: `iload_1` and `iload 7` are both `"iload"`.
    pub fn mnemonic(&self) -> Option<&'static str> {
        use Instruction::*;
        let name = match self {
            Class(_) | Super(_) | Field { .. } | Method { .. } | Var { .. } | LimitLocals(_)
            | LimitStack(_) | EndMethod | Instruction::Label(_) | Comment(_) | Blank => return None,
            Nop => "nop",
            IconstM1 => "iconst_m1",
            Iconst(_) => "iconst",
            Fconst(_) => "fconst",
            Bipush(_) => "bipush",
            Sipush(_) => "sipush",
            Ldc(_) => "ldc",
            Load(LocalKind::Int, _) => "iload",
            Load(LocalKind::Float, _) => "fload",
            Load(LocalKind::Reference, _) => "aload",
            Store(LocalKind::Int, _) => "istore",
            Store(LocalKind::Float, _) => "fstore",
            Store(LocalKind::Reference, _) => "astore",
            ArrayLoad(ElementKind::Int) => "iaload",
            ArrayLoad(ElementKind::Float) => "faload",
            ArrayLoad(ElementKind::Boolean) => "baload",
            ArrayStore(ElementKind::Int) => "iastore",
            ArrayStore(ElementKind::Float) => "fastore",
            ArrayStore(ElementKind::Boolean) => "bastore",
            GetStatic(_) => "getstatic",
            PutStatic(_) => "putstatic",
            Pop => "pop",
            Dup => "dup",
            DupX2 => "dup_x2",
            Arith(NumericKind::Int, ArithOp::Add) => "iadd",
            Arith(NumericKind::Int, ArithOp::Mul) => "imul",
            Arith(NumericKind::Int, ArithOp::Div) => "idiv",
            Arith(NumericKind::Float, ArithOp::Add) => "fadd",
            Arith(NumericKind::Float, ArithOp::Mul) => "fmul",
            Arith(NumericKind::Float, ArithOp::Div) => "fdiv",
            Neg(NumericKind::Int) => "ineg",
            Neg(NumericKind::Float) => "fneg",
            I2f => "i2f",
            Fcmpg => "fcmpg",
            If(Cond::Eq, _) => "ifeq",
            If(Cond::Ne, _) => "ifne",
            If(Cond::Lt, _) => "iflt",
            If(Cond::Le, _) => "ifle",
            If(Cond::Gt, _) => "ifgt",
            If(Cond::Ge, _) => "ifge",
            IfIcmp(Cond::Eq, _) => "if_icmpeq",
            IfIcmp(Cond::Ne, _) => "if_icmpne",
            IfIcmp(Cond::Lt, _) => "if_icmplt",
            IfIcmp(Cond::Le, _) => "if_icmple",
            IfIcmp(Cond::Gt, _) => "if_icmpgt",
            IfIcmp(Cond::Ge, _) => "if_icmpge",
            Goto(_) => "goto",
            Return => "return",
            ValueReturn(NumericKind::Int) => "ireturn",
            ValueReturn(NumericKind::Float) => "freturn",
            Invoke(kind, _) => kind.mnemonic(),
            New(_) => "new",
            NewArray(_) => "newarray",
        };
        Some(name)
    }

    /// Operand-stack effect as `(pops, pushes)`.
    ///
    /// Returns consume only their own operand here; whatever else is left on the
    /// stack at a return is a defect the caller checks separately.
    pub fn stack_effect(&self) -> (usize, usize) {
        use Instruction::*;
        match self {
            Class(_) | Super(_) | Field { .. } | Method { .. } | Var { .. } | LimitLocals(_)
            | LimitStack(_) | EndMethod | Instruction::Label(_) | Comment(_) | Blank | Nop | Goto(_)
            | Return => (0, 0),
            IconstM1 | Iconst(_) | Fconst(_) | Bipush(_) | Sipush(_) | Ldc(_) | Load(..)
            | GetStatic(_) | New(_) => (0, 1),
            Store(..) | PutStatic(_) | Pop | If(..) | ValueReturn(_) => (1, 0),
            ArrayLoad(_) | Arith(..) | Fcmpg => (2, 1),
            ArrayStore(_) => (3, 0),
            Dup => (1, 2),
            DupX2 => (3, 4),
            Neg(_) | I2f | NewArray(_) => (1, 1),
            IfIcmp(..) => (2, 0),
            Invoke(kind, method) => {
                let receiver = usize::from(kind.has_receiver());
                (
                    method.descriptor.params.len() + receiver,
                    method.descriptor.ret.width(),
                )
            }
        }
    }

    /// Label this instruction may transfer control to.
    pub fn branch_target(&self) -> Option<Label> {
        match self {
            Instruction::If(_, label) | Instruction::IfIcmp(_, label) | Instruction::Goto(label) => {
                Some(*label)
            }
            _ => None,
        }
    }

    /// Whether control never falls through to the next line.
    pub fn ends_block(&self) -> bool {
        matches!(
            self,
            Instruction::Goto(_) | Instruction::Return | Instruction::ValueReturn(_)
        )
    }

    /// Whether the line is written at column 0 rather than indented.
    pub fn is_flush(&self) -> bool {
        matches!(
            self,
            Instruction::Class(_)
                | Instruction::Super(_)
                | Instruction::Field { .. }
                | Instruction::Method { .. }
                | Instruction::EndMethod
                | Instruction::Label(_)
                | Instruction::Comment(_)
                | Instruction::Blank
        )
    }
}

fn write_local(f: &mut fmt::Formatter<'_>, op: &str, kind: LocalKind, slot: Slot) -> fmt::Result {
    if slot <= 3 {
        write!(f, "{}{op}_{slot}", kind.prefix())
    } else {
        write!(f, "{}{op} {slot}", kind.prefix())
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use Instruction::*;
        match self {
            Class(name) => write!(f, ".class public {name}"),
            Super(name) => write!(f, ".super {name}"),
            Field { name, descriptor } => write!(f, ".field static {name} {descriptor}"),
            Method {
                modifiers,
                name,
                descriptor,
            } => {
                if modifiers.is_empty() {
                    write!(f, ".method {name}{descriptor}")
                } else {
                    write!(f, ".method {modifiers} {name}{descriptor}")
                }
            }
            Var {
                slot,
                name,
                descriptor,
                from,
                to,
            } => write!(f, ".var {slot} is {name} {descriptor} from {from} to {to}"),
            LimitLocals(n) => write!(f, ".limit locals {n}"),
            LimitStack(n) => write!(f, ".limit stack {n}"),
            EndMethod => write!(f, ".end method"),
            Instruction::Label(label) => write!(f, "{label}:"),
            Comment(text) => write!(f, "; {text}"),
            Blank => Ok(()),

            Iconst(n) => write!(f, "iconst_{n}"),
            Fconst(n) => write!(f, "fconst_{n}"),
            Bipush(value) => write!(f, "bipush {value}"),
            Sipush(value) => write!(f, "sipush {value}"),
            Ldc(constant) => write!(f, "ldc {constant}"),
            Load(kind, slot) => write_local(f, "load", *kind, *slot),
            Store(kind, slot) => write_local(f, "store", *kind, *slot),
            ArrayLoad(kind) => write!(f, "{}aload", kind.prefix()),
            ArrayStore(kind) => write!(f, "{}astore", kind.prefix()),
            GetStatic(field) => write!(f, "getstatic {field}"),
            PutStatic(field) => write!(f, "putstatic {field}"),
            Arith(kind, op) => write!(f, "{}{}", kind.prefix(), op.suffix()),
            Neg(kind) => write!(f, "{}neg", kind.prefix()),
            If(cond, label) => write!(f, "if{} {label}", cond.suffix()),
            IfIcmp(cond, label) => write!(f, "if_icmp{} {label}", cond.suffix()),
            Goto(label) => write!(f, "goto {label}"),
            ValueReturn(kind) => write!(f, "{}return", kind.prefix()),
            Invoke(kind, method) => write!(f, "{} {method}", kind.mnemonic()),
            New(class) => write!(f, "new {class}"),
            NewArray(kind) => write!(f, "newarray {}", kind.type_name()),

            Nop | IconstM1 | Pop | Dup | DupX2 | I2f | Fcmpg | Return => {
                // Operand-free: the mnemonic is the whole line.
                write!(f, "{}", self.mnemonic().unwrap_or_default())
            }
        }
    }
}
