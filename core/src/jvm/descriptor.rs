//! Type and member descriptors in the target's textual notation.

use core::fmt;

/// Field/value type descriptor: `I`, `F`, `Z`, `V`, `L<class>;` or `[<elem>`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Descriptor {
    Int,
    Float,
    Boolean,
    Void,
    Object(String),
    Array(Box<Descriptor>),
}

impl Descriptor {
    pub const STRING_CLASS: &'static str = "java/lang/String";

    pub fn string() -> Self {
        Descriptor::Object(Self::STRING_CLASS.to_string())
    }

    pub fn object(class: &str) -> Self {
        Descriptor::Object(class.to_string())
    }

    pub fn array_of(elem: Descriptor) -> Self {
        Descriptor::Array(Box::new(elem))
    }

    pub fn is_void(&self) -> bool {
        matches!(self, Descriptor::Void)
    }

    /// Number of operand-stack entries a value of this type occupies.
    pub fn width(&self) -> usize {
        if self.is_void() { 0 } else { 1 }
    }
}

impl fmt::Display for Descriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Descriptor::Int => write!(f, "I"),
            Descriptor::Float => write!(f, "F"),
            Descriptor::Boolean => write!(f, "Z"),
            Descriptor::Void => write!(f, "V"),
            Descriptor::Object(class) => write!(f, "L{class};"),
            Descriptor::Array(elem) => write!(f, "[{elem}"),
        }
    }
}

/// Method signature: `(<params>)<ret>`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MethodDescriptor {
    pub params: Vec<Descriptor>,
    pub ret: Descriptor,
}

impl MethodDescriptor {
    pub fn new(params: Vec<Descriptor>, ret: Descriptor) -> Self {
        Self { params, ret }
    }

    /// `()V`
    pub fn void() -> Self {
        Self::new(Vec::new(), Descriptor::Void)
    }
}

impl fmt::Display for MethodDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(")?;
        for param in &self.params {
            write!(f, "{param}")?;
        }
        write!(f, "){}", self.ret)
    }
}

/// Fully qualified method reference, e.g. `VC/lang/System/putInt(I)V`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MethodRef {
    pub class: String,
    pub name: String,
    pub descriptor: MethodDescriptor,
}

impl MethodRef {
    pub fn new(class: impl Into<String>, name: impl Into<String>, descriptor: MethodDescriptor) -> Self {
        Self {
            class: class.into(),
            name: name.into(),
            descriptor,
        }
    }
}

impl fmt::Display for MethodRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}{}", self.class, self.name, self.descriptor)
    }
}

/// Static field reference as written after `getstatic`/`putstatic`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FieldRef {
    pub class: String,
    pub name: String,
    pub descriptor: Descriptor,
}

impl FieldRef {
    pub fn new(class: impl Into<String>, name: impl Into<String>, descriptor: Descriptor) -> Self {
        Self {
            class: class.into(),
            name: name.into(),
            descriptor,
        }
    }
}

impl fmt::Display for FieldRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{} {}", self.class, self.name, self.descriptor)
    }
}
