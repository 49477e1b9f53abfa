use core::fmt;

use serde::{Deserialize, Serialize};

use crate::jvm::Descriptor;

/// Resolved semantic type of an expression or declaration.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Type {
    Int,
    Float,
    Boolean,
    String,
    Void,
    Array(ArrayType),
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ArrayType {
    pub elem: Box<Type>,
    /// Declared length. Absent for array parameters such as `int a[]`.
    #[serde(default)]
    pub len: Option<u32>,
}

impl Type {
    pub fn array(elem: Type, len: Option<u32>) -> Self {
        Type::Array(ArrayType {
            elem: Box::new(elem),
            len,
        })
    }

    pub fn is_void(&self) -> bool {
        matches!(self, Type::Void)
    }

    /// Element type, if this is an array type.
    pub fn element(&self) -> Option<&Type> {
        match self {
            Type::Array(array) => Some(&array.elem),
            _ => None,
        }
    }

    /// Type descriptor used in signatures, fields and `.var` annotations.
    pub fn descriptor(&self) -> Descriptor {
        match self {
            Type::Int => Descriptor::Int,
            Type::Float => Descriptor::Float,
            Type::Boolean => Descriptor::Boolean,
            Type::Void => Descriptor::Void,
            Type::String => Descriptor::string(),
            Type::Array(array) => Descriptor::Array(Box::new(array.elem.descriptor())),
        }
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Type::Int => write!(f, "int"),
            Type::Float => write!(f, "float"),
            Type::Boolean => write!(f, "boolean"),
            Type::String => write!(f, "string"),
            Type::Void => write!(f, "void"),
            Type::Array(ArrayType { elem, len: Some(len) }) => write!(f, "{elem}[{len}]"),
            Type::Array(ArrayType { elem, len: None }) => write!(f, "{elem}[]"),
        }
    }
}
