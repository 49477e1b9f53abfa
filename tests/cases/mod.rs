use vc::ast::{Decl, LocalVar, Stmt, Type, build::*};
use vc::{ClassCode, CompilationOptions, Program};

/// Compiles `program` into class `class_name` and compares the whole file.
#[allow(unused_macros)]
macro_rules! codegen_case {
    (
        $name:ident,
        class: $class:expr,
        $(comments: $comments:expr,)?
        program: $program:expr,
        expected: $expected:expr $(,)?
    ) => {
        #[test]
        fn $name() {
            #[allow(unused_mut)]
            let mut options = vc::CompilationOptions::new($class);
            $(options = options.with_comments($comments);)?
            let class = vc::compile(&$program, &options).unwrap();
            pretty_assertions::assert_eq!(class.to_text(), $expected);
        }
    };
}

#[allow(dead_code)]
pub fn compile(program: &Program) -> ClassCode {
    vc::compile(program, &CompilationOptions::new("Main")).unwrap()
}

#[allow(dead_code)]
pub fn entry(decls: Vec<LocalVar>, stmts: Vec<Stmt>) -> Decl {
    function("main", Type::Void, vec![], block(decls, stmts))
}
