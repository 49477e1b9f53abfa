//! VC Standard Library
//!
//! The runtime library is a single class, `VC/lang/System`, with static I/O
//! methods. The generator never sees their implementation: it only needs the
//! closed table of names and signatures below, and every call to one of them
//! is a plain `invokestatic`.
//!
//! Each primitive writes (or reads) one value of a type, with and without a
//! trailing newline; `putLn` writes just the newline.

use serde::{Deserialize, Serialize};

use crate::ast::Type;
use crate::jvm::{MethodDescriptor, MethodRef};

/// Class that owns every built-in.
pub const SYSTEM_CLASS: &str = "VC/lang/System";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Builtin {
    GetInt,
    PutInt,
    PutIntLn,
    GetFloat,
    PutFloat,
    PutFloatLn,
    PutBool,
    PutBoolLn,
    PutString,
    PutStringLn,
    PutLn,
}

impl Builtin {
    pub const ALL: [Builtin; 11] = [
        Builtin::GetInt,
        Builtin::PutInt,
        Builtin::PutIntLn,
        Builtin::GetFloat,
        Builtin::PutFloat,
        Builtin::PutFloatLn,
        Builtin::PutBool,
        Builtin::PutBoolLn,
        Builtin::PutString,
        Builtin::PutStringLn,
        Builtin::PutLn,
    ];

    /// Source-level spelling, which is also the method name.
    pub fn name(self) -> &'static str {
        match self {
            Builtin::GetInt => "getInt",
            Builtin::PutInt => "putInt",
            Builtin::PutIntLn => "putIntLn",
            Builtin::GetFloat => "getFloat",
            Builtin::PutFloat => "putFloat",
            Builtin::PutFloatLn => "putFloatLn",
            Builtin::PutBool => "putBool",
            Builtin::PutBoolLn => "putBoolLn",
            Builtin::PutString => "putString",
            Builtin::PutStringLn => "putStringLn",
            Builtin::PutLn => "putLn",
        }
    }

    pub fn from_name(name: &str) -> Option<Builtin> {
        Self::ALL.into_iter().find(|builtin| builtin.name() == name)
    }

    /// Parameter type, if the primitive takes one.
    pub fn param(self) -> Option<Type> {
        match self {
            Builtin::PutInt | Builtin::PutIntLn => Some(Type::Int),
            Builtin::PutFloat | Builtin::PutFloatLn => Some(Type::Float),
            Builtin::PutBool | Builtin::PutBoolLn => Some(Type::Boolean),
            Builtin::PutString | Builtin::PutStringLn => Some(Type::String),
            Builtin::GetInt | Builtin::GetFloat | Builtin::PutLn => None,
        }
    }

    pub fn result_type(self) -> Type {
        match self {
            Builtin::GetInt => Type::Int,
            Builtin::GetFloat => Type::Float,
            _ => Type::Void,
        }
    }

    pub fn descriptor(self) -> MethodDescriptor {
        MethodDescriptor::new(
            self.param().iter().map(Type::descriptor).collect(),
            self.result_type().descriptor(),
        )
    }

    pub fn method(self) -> MethodRef {
        MethodRef::new(SYSTEM_CLASS, self.name(), self.descriptor())
    }
}

/// Every built-in's call target, in table order.
pub fn signatures() -> impl Iterator<Item = MethodRef> {
    Builtin::ALL.into_iter().map(Builtin::method)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_signature_table() {
        let table: Vec<String> = signatures().map(|method| method.to_string()).collect();
        assert_eq!(
            table,
            vec![
                "VC/lang/System/getInt()I",
                "VC/lang/System/putInt(I)V",
                "VC/lang/System/putIntLn(I)V",
                "VC/lang/System/getFloat()F",
                "VC/lang/System/putFloat(F)V",
                "VC/lang/System/putFloatLn(F)V",
                "VC/lang/System/putBool(Z)V",
                "VC/lang/System/putBoolLn(Z)V",
                "VC/lang/System/putString(Ljava/lang/String;)V",
                "VC/lang/System/putStringLn(Ljava/lang/String;)V",
                "VC/lang/System/putLn()V",
            ]
        );
    }

    #[test]
    fn test_from_name() {
        for builtin in Builtin::ALL {
            assert_eq!(Builtin::from_name(builtin.name()), Some(builtin));
        }
        assert_eq!(Builtin::from_name("putint"), None);
        assert_eq!(Builtin::from_name("main"), None);
    }

    #[test]
    fn test_serde_spelling() {
        let json = serde_json::to_string(&Builtin::PutFloatLn).unwrap();
        assert_eq!(json, "\"putFloatLn\"");
        let back: Builtin = serde_json::from_str("\"getInt\"").unwrap();
        assert_eq!(back, Builtin::GetInt);
    }
}
