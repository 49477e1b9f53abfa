//! Tree-walking translator from a checked program to Jasmin assembly.

use tracing::{debug, trace};

use super::frame::{ARGV_SLOT, Frame, FrameKind, INSTANCE_SLOT, RECEIVER_SLOT};
use super::{CodegenError, select};
use crate::api::CompilationOptions;
use crate::ast::{
    ArrayType, BinaryOp, Binding, Block, Callee, Decl, DeclId, Expr, ExprKind, FuncDecl,
    GlobalVar, LocalVar, Program, Stmt, Type, UnaryOp, VarRef,
};
use crate::jvm::{
    ClassCode, CodeStream, Cond, Constant, Descriptor, FieldRef, Instruction, InvokeKind, Label,
    LocalKind, MethodDescriptor, MethodLimits, MethodRef, NumericKind,
};
use crate::stdlib::Builtin;

const OBJECT_CLASS: &str = "java/lang/Object";
const CONSTRUCTOR: &str = "<init>";
const STATIC_INIT: &str = "<clinit>";

/// How an array element expression is translated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Access {
    /// Leave the element's value.
    Load,
    /// Leave the array reference and index for a following store.
    Store,
}

/// Translates one program into one class.
///
/// Every method gets its own [`Frame`], passed down the recursion by mutable
/// reference. Stack depth is accounted for instruction by instruction through
/// [`Instruction::stack_effect`], so the frame's depth is always the net effect
/// of what has been appended for the current method.
pub struct Emitter<'p> {
    program: &'p Program,
    options: &'p CompilationOptions,
    code: CodeStream,
    methods: Vec<MethodLimits>,
}

impl<'p> Emitter<'p> {
    pub fn new(program: &'p Program, options: &'p CompilationOptions) -> Self {
        Self {
            program,
            options,
            code: CodeStream::new(),
            methods: Vec::new(),
        }
    }

    /// Convenience method to compile a program in one call.
    pub fn compile(
        program: &'p Program,
        options: &'p CompilationOptions,
    ) -> Result<ClassCode, CodegenError> {
        let mut emitter = Self::new(program, options);
        emitter.class()?;
        Ok(emitter.finish())
    }

    pub fn finish(self) -> ClassCode {
        ClassCode {
            class_name: self.options.class_name.clone(),
            code: self.code,
            methods: self.methods,
        }
    }

    // === Instruction Emission ===

    /// Appends an executable instruction and applies its stack effect.
    fn emit(&mut self, frame: &mut Frame, instruction: Instruction) -> Result<(), CodegenError> {
        let (pops, pushes) = instruction.stack_effect();
        frame.pop_n(pops)?;
        frame.push_n(pushes);
        self.code.append(instruction);
        Ok(())
    }

    /// Appends a line with no stack effect: a directive, label or blank.
    fn write(&mut self, instruction: Instruction) {
        self.code.append(instruction);
    }

    fn comment(&mut self, text: &str) {
        if self.options.comments {
            self.code.append(Instruction::Comment(text.to_string()));
        }
    }

    fn class_name(&self) -> &'p str {
        let options: &'p CompilationOptions = self.options;
        &options.class_name
    }

    // === Class Structure ===

    fn class(&mut self) -> Result<(), CodegenError> {
        let program = self.program;
        debug!(class = %self.options.class_name, decls = program.decls.len(), "compiling class");

        self.write(Instruction::Class(self.class_name().to_string()));
        self.write(Instruction::Super(OBJECT_CLASS.to_string()));
        self.write(Instruction::Blank);

        // Fields must precede every method.
        for global in program.globals() {
            self.write(Instruction::Field {
                name: global.name.clone(),
                descriptor: global.ty.descriptor(),
            });
        }
        self.write(Instruction::Blank);

        self.static_initializer()?;
        self.constructor();

        for func in program.functions() {
            self.function(func)?;
        }
        Ok(())
    }

    /// `<clinit>`: runs every global initializer in declaration order.
    fn static_initializer(&mut self) -> Result<(), CodegenError> {
        let program = self.program;

        self.comment("standard class static initializer");
        self.write(Instruction::Method {
            modifiers: "static",
            name: STATIC_INIT.to_string(),
            descriptor: MethodDescriptor::void(),
        });
        self.write(Instruction::Blank);

        let mut frame = Frame::new(FrameKind::StaticInit);
        for global in program.globals() {
            self.global_initializer(&mut frame, global)?;
        }

        self.write(Instruction::Blank);
        self.comment("set limits used by this method");
        let limits = frame.finish(STATIC_INIT)?;
        self.write(Instruction::LimitLocals(limits.max_locals));
        self.write(Instruction::LimitStack(limits.max_stack));
        self.write(Instruction::Return);
        self.write(Instruction::EndMethod);
        self.write(Instruction::Blank);

        debug!(method = STATIC_INIT, max_stack = limits.max_stack, max_locals = limits.max_locals, "method done");
        self.methods.push(limits);
        Ok(())
    }

    fn global_initializer(&mut self, frame: &mut Frame, global: &GlobalVar) -> Result<(), CodegenError> {
        match &global.ty {
            Type::Array(array) => {
                let len = array_length(&global.name, array, global.init.as_ref())?;
                self.new_array(frame, &array.elem, len)?;
                if let Some(init) = &global.init {
                    self.array_initializer(frame, &array.elem, len, init)?;
                }
            }
            ty => match &global.init {
                Some(init) => self.expr(frame, init)?,
                None => self.emit(frame, select::zero(ty)?)?,
            },
        }
        let field = self.field_ref(&global.name, &global.ty);
        self.emit(frame, Instruction::PutStatic(field))
    }

    /// Default constructor delegating to `Object`.
    fn constructor(&mut self) {
        self.comment("standard constructor initializer");
        self.write(Instruction::Method {
            modifiers: "public",
            name: CONSTRUCTOR.to_string(),
            descriptor: MethodDescriptor::void(),
        });
        self.write(Instruction::LimitStack(1));
        self.write(Instruction::LimitLocals(1));
        self.write(Instruction::Load(LocalKind::Reference, RECEIVER_SLOT));
        self.write(Instruction::Invoke(
            InvokeKind::Special,
            MethodRef::new(OBJECT_CLASS, CONSTRUCTOR, MethodDescriptor::void()),
        ));
        self.write(Instruction::Return);
        self.write(Instruction::EndMethod);
        self.methods.push(MethodLimits {
            name: CONSTRUCTOR.to_string(),
            max_stack: 1,
            max_locals: 1,
        });
    }

    fn function(&mut self, func: &FuncDecl) -> Result<(), CodegenError> {
        let kind = if func.is_entry() {
            if !func.params.is_empty() {
                return Err(CodegenError::Malformed(format!(
                    "`{}` declared with parameters",
                    FuncDecl::ENTRY
                )));
            }
            FrameKind::Entry
        } else {
            FrameKind::Method
        };

        self.write(Instruction::Blank);
        self.write(match kind {
            FrameKind::Entry => Instruction::Method {
                modifiers: "public static",
                name: func.name.clone(),
                descriptor: MethodDescriptor::new(
                    vec![Descriptor::array_of(Descriptor::string())],
                    Descriptor::Void,
                ),
            },
            _ => Instruction::Method {
                modifiers: "",
                name: func.name.clone(),
                descriptor: func.descriptor(),
            },
        });

        debug!(function = %func.name, ?kind, "compiling method");
        let mut frame = Frame::new(kind);
        self.block(&mut frame, &func.body, Some(func))?;
        self.end_method(frame, func)
    }

    fn end_method(&mut self, mut frame: Frame, func: &FuncDecl) -> Result<(), CodegenError> {
        // Falling off the end is legal for void functions, so the return is
        // always there for them.
        if func.ret.is_void() {
            self.write(Instruction::Blank);
            self.comment("return may not be present in a VC function returning void");
            self.comment("The following return inserted by the VC compiler");
            self.emit(&mut frame, Instruction::Return)?;
        } else if frame.is_entry() {
            self.emit(&mut frame, Instruction::Return)?;
        } else {
            self.emit(&mut frame, Instruction::Nop)?;
        }

        self.write(Instruction::Blank);
        self.comment("set limits used by this method");
        let limits = frame.finish(&func.name)?;
        self.write(Instruction::LimitLocals(limits.max_locals));
        self.write(Instruction::LimitStack(limits.max_stack));
        self.write(Instruction::EndMethod);

        debug!(method = %func.name, max_stack = limits.max_stack, max_locals = limits.max_locals, "method done");
        self.methods.push(limits);
        Ok(())
    }

    // === Declarations ===

    /// Translates a compound statement. `owner` is set for a function's outermost body.
    fn block(
        &mut self,
        frame: &mut Frame,
        block: &Block,
        owner: Option<&FuncDecl>,
    ) -> Result<(), CodegenError> {
        if block.is_empty() {
            // No scope labels to annotate with, but parameters still occupy slots.
            if let Some(func) = owner {
                for param in &func.params {
                    frame.declare(param.id, &param.name)?;
                }
            }
            return Ok(());
        }

        let (start, end) = frame.enter_scope();
        self.write(Instruction::Label(start));
        if let Some(func) = owner {
            self.bind_implicit_slots(frame, func)?;
        }
        for decl in &block.decls {
            self.local_var(frame, decl)?;
        }
        for stmt in &block.stmts {
            self.stmt(frame, stmt)?;
        }
        self.write(Instruction::Label(end));
        frame.exit_scope()
    }

    /// Annotates the reserved slots and binds the parameters.
    ///
    /// The entry function also creates the program instance every intra-class
    /// call from it goes through.
    fn bind_implicit_slots(&mut self, frame: &mut Frame, func: &FuncDecl) -> Result<(), CodegenError> {
        let (from, to) = frame.scope()?;
        let class = self.class_name();

        if frame.is_entry() {
            self.write(Instruction::Var {
                slot: ARGV_SLOT,
                name: "argv".to_string(),
                descriptor: Descriptor::array_of(Descriptor::string()),
                from,
                to,
            });
            self.write(Instruction::Var {
                slot: INSTANCE_SLOT,
                name: "vc$".to_string(),
                descriptor: Descriptor::object(class),
                from,
                to,
            });
            self.emit(frame, Instruction::New(class.to_string()))?;
            self.emit(frame, Instruction::Dup)?;
            self.emit(
                frame,
                Instruction::Invoke(
                    InvokeKind::Nonvirtual,
                    MethodRef::new(class, CONSTRUCTOR, MethodDescriptor::void()),
                ),
            )?;
            self.emit(frame, Instruction::Store(LocalKind::Reference, INSTANCE_SLOT))?;
        } else {
            self.write(Instruction::Var {
                slot: RECEIVER_SLOT,
                name: "this".to_string(),
                descriptor: Descriptor::object(class),
                from,
                to,
            });
        }

        for param in &func.params {
            let slot = frame.declare(param.id, &param.name)?;
            self.write(Instruction::Var {
                slot,
                name: param.name.clone(),
                descriptor: param.ty.descriptor(),
                from,
                to,
            });
        }
        Ok(())
    }

    fn local_var(&mut self, frame: &mut Frame, decl: &LocalVar) -> Result<(), CodegenError> {
        let slot = frame.declare(decl.id, &decl.name)?;
        let (from, to) = frame.scope()?;
        self.write(Instruction::Var {
            slot,
            name: decl.name.clone(),
            descriptor: decl.ty.descriptor(),
            from,
            to,
        });

        match &decl.ty {
            // Arrays are allocated whether or not there is an initializer.
            Type::Array(array) => {
                let len = array_length(&decl.name, array, decl.init.as_ref())?;
                self.new_array(frame, &array.elem, len)?;
                if let Some(init) = &decl.init {
                    self.array_initializer(frame, &array.elem, len, init)?;
                }
                self.emit(frame, Instruction::Store(LocalKind::Reference, slot))
            }
            ty => match &decl.init {
                Some(init) => {
                    self.expr(frame, init)?;
                    self.emit(frame, select::store(ty, slot)?)
                }
                None => Ok(()),
            },
        }
    }

    fn new_array(&mut self, frame: &mut Frame, elem: &Type, len: u32) -> Result<(), CodegenError> {
        let len = i32::try_from(len)
            .map_err(|_| CodegenError::Malformed(format!("array length {len} out of range")))?;
        self.emit(frame, select::int_const(len))?;
        self.emit(frame, select::new_array(elem)?)
    }

    /// Fills the array on top of the stack, leaving the reference in place.
    fn array_initializer(
        &mut self,
        frame: &mut Frame,
        elem: &Type,
        len: u32,
        init: &Expr,
    ) -> Result<(), CodegenError> {
        let ExprKind::Init(elems) = &init.kind else {
            return Err(CodegenError::Malformed(
                "array declared with a non-initializer".to_string(),
            ));
        };
        if elems.len() > len as usize {
            return Err(CodegenError::Malformed(format!(
                "{} initializers for an array of length {len}",
                elems.len()
            )));
        }
        for (index, value) in elems.iter().enumerate() {
            self.emit(frame, Instruction::Dup)?;
            self.emit(frame, select::int_const(index as i32))?;
            self.expr(frame, value)?;
            self.emit(frame, select::array_store(elem)?)?;
        }
        Ok(())
    }

    // === Statements ===

    fn stmt(&mut self, frame: &mut Frame, stmt: &Stmt) -> Result<(), CodegenError> {
        match stmt {
            Stmt::Compound(block) => self.block(frame, block, None),
            Stmt::If {
                cond,
                then,
                otherwise,
            } => {
                let else_label = frame.new_label();
                let next = frame.new_label();
                self.expr(frame, cond)?;
                self.emit(frame, Instruction::If(Cond::Eq, else_label))?;
                self.stmt(frame, then)?;
                self.emit(frame, Instruction::Goto(next))?;
                self.write(Instruction::Label(else_label));
                if let Some(otherwise) = otherwise {
                    self.stmt(frame, otherwise)?;
                }
                self.write(Instruction::Label(next));
                Ok(())
            }
            Stmt::While { cond, body } => {
                let cont = frame.new_label();
                let brk = frame.new_label();
                frame.enter_loop(brk, cont);
                self.write(Instruction::Label(cont));
                self.expr(frame, cond)?;
                self.emit(frame, Instruction::If(Cond::Eq, brk))?;
                self.stmt(frame, body)?;
                self.emit(frame, Instruction::Goto(cont))?;
                self.write(Instruction::Label(brk));
                frame.exit_loop()
            }
            Stmt::For {
                init,
                cond,
                step,
                body,
            } => {
                let start = frame.new_label();
                let cont = frame.new_label();
                let brk = frame.new_label();
                frame.enter_loop(brk, cont);

                if let Some(init) = init {
                    self.discarded(frame, init)?;
                }
                self.emit(frame, Instruction::Goto(start))?;

                // `continue` runs the step before testing again.
                self.write(Instruction::Label(cont));
                if let Some(step) = step {
                    self.discarded(frame, step)?;
                }

                self.write(Instruction::Label(start));
                match cond {
                    Some(cond) => self.expr(frame, cond)?,
                    None => self.emit(frame, select::bool_const(true))?,
                }
                self.emit(frame, Instruction::If(Cond::Eq, brk))?;
                self.stmt(frame, body)?;
                self.emit(frame, Instruction::Goto(cont))?;
                self.write(Instruction::Label(brk));
                frame.exit_loop()
            }
            Stmt::Break => {
                let target = frame.break_target()?;
                self.emit(frame, Instruction::Goto(target))
            }
            Stmt::Continue => {
                let target = frame.continue_target()?;
                self.emit(frame, Instruction::Goto(target))
            }
            Stmt::Return(value) => self.return_stmt(frame, value.as_ref()),
            Stmt::Expr(expr) => self.discarded(frame, expr),
            Stmt::Empty => Ok(()),
        }
    }

    /// Translates an expression kept only for its side effects.
    fn discarded(&mut self, frame: &mut Frame, expr: &Expr) -> Result<(), CodegenError> {
        let before = frame.stack_size();
        self.expr(frame, expr)?;
        match frame.stack_size().saturating_sub(before) {
            0 => Ok(()),
            1 => self.emit(frame, Instruction::Pop),
            n => Err(CodegenError::ResidualStack(n)),
        }
    }

    fn return_stmt(&mut self, frame: &mut Frame, value: Option<&Expr>) -> Result<(), CodegenError> {
        // `main` is `void` on the target whatever its declared result.
        if frame.is_entry() {
            return self.emit(frame, Instruction::Return);
        }
        match value {
            Some(value) => {
                self.expr(frame, value)?;
                self.emit(frame, select::value_return(&value.ty)?)
            }
            None => self.emit(frame, Instruction::Return),
        }
    }

    // === Expressions ===

    fn expr(&mut self, frame: &mut Frame, expr: &Expr) -> Result<(), CodegenError> {
        match &expr.kind {
            ExprKind::Int(value) => self.emit(frame, select::int_const(*value)),
            ExprKind::Float(value) => self.emit(frame, select::float_const(*value)),
            ExprKind::Bool(value) => self.emit(frame, select::bool_const(*value)),
            ExprKind::Str(value) => self.emit(frame, Instruction::Ldc(Constant::String(value.clone()))),
            ExprKind::Var(var) => self.load_var(frame, var, &expr.ty),
            ExprKind::Unary { op, operand } => self.unary(frame, *op, operand),
            ExprKind::Binary { op, left, right } => self.binary(frame, *op, left, right),
            ExprKind::Assign { target, value } => self.assign(frame, target, value),
            ExprKind::Index { array, index } => {
                self.element(frame, array, index, &expr.ty, Access::Load)
            }
            ExprKind::Call { name, callee, args } => self.call(frame, name, *callee, args),
            ExprKind::Init(_) => Err(CodegenError::Malformed(
                "array initializer outside of a declaration".to_string(),
            )),
        }
    }

    fn load_var(&mut self, frame: &mut Frame, var: &VarRef, ty: &Type) -> Result<(), CodegenError> {
        match var.binding {
            Binding::Global(id) => {
                let global = self.global(id, &var.name)?;
                let field = self.field_ref(&global.name, &global.ty);
                self.emit(frame, Instruction::GetStatic(field))
            }
            Binding::Local(id) => {
                let slot = frame
                    .slot_of(id)
                    .ok_or_else(|| CodegenError::UnresolvedBinding(var.name.clone()))?;
                self.emit(frame, select::load(ty, slot)?)
            }
        }
    }

    fn store_var(&mut self, frame: &mut Frame, var: &VarRef, ty: &Type) -> Result<(), CodegenError> {
        match var.binding {
            Binding::Global(id) => {
                let global = self.global(id, &var.name)?;
                let field = self.field_ref(&global.name, &global.ty);
                self.emit(frame, Instruction::PutStatic(field))
            }
            Binding::Local(id) => {
                let slot = frame
                    .slot_of(id)
                    .ok_or_else(|| CodegenError::UnresolvedBinding(var.name.clone()))?;
                self.emit(frame, select::store(ty, slot)?)
            }
        }
    }

    fn unary(&mut self, frame: &mut Frame, op: UnaryOp, operand: &Expr) -> Result<(), CodegenError> {
        self.expr(frame, operand)?;
        match op {
            // No boolean not: compare with false instead.
            UnaryOp::Not => {
                self.emit(frame, select::bool_const(false))?;
                self.compare(frame, Cond::Eq, NumericKind::Int)
            }
            UnaryOp::Neg => self.emit(frame, Instruction::Neg(select::numeric_kind(&operand.ty)?)),
            UnaryOp::Plus => Ok(()),
            UnaryOp::IntToFloat => self.emit(frame, Instruction::I2f),
        }
    }

    fn binary(
        &mut self,
        frame: &mut Frame,
        op: BinaryOp,
        left: &Expr,
        right: &Expr,
    ) -> Result<(), CodegenError> {
        if op.is_logical() {
            return self.short_circuit(frame, op, left, right);
        }

        self.expr(frame, left)?;
        self.expr(frame, right)?;
        let kind = select::numeric_kind(&left.ty)?;
        if op.is_comparison() {
            return self.compare(frame, select::condition(op)?, kind);
        }
        for instruction in select::arithmetic(op, kind)? {
            self.emit(frame, instruction)?;
        }
        Ok(())
    }

    /// Consumes the two operands on the stack and leaves 1 if `cond` holds, else 0.
    fn compare(&mut self, frame: &mut Frame, cond: Cond, kind: NumericKind) -> Result<(), CodegenError> {
        let on_true = frame.new_label();
        let next = frame.new_label();
        match kind {
            NumericKind::Int => self.emit(frame, Instruction::IfIcmp(cond, on_true))?,
            NumericKind::Float => {
                self.emit(frame, Instruction::Fcmpg)?;
                self.emit(frame, Instruction::If(cond, on_true))?;
            }
        }
        self.materialize(frame, 0, on_true, 1, next)
    }

    /// `&&` and `||`: the right operand is skipped once the left decides the result.
    fn short_circuit(
        &mut self,
        frame: &mut Frame,
        op: BinaryOp,
        left: &Expr,
        right: &Expr,
    ) -> Result<(), CodegenError> {
        // (branch taken on, value when neither operand branches, value when one does)
        let (exit_cond, fallthrough, decided) = match op {
            BinaryOp::And => (Cond::Eq, 1, 0),
            BinaryOp::Or => (Cond::Ne, 0, 1),
            _ => {
                return Err(CodegenError::Malformed(format!(
                    "{op:?} is not a logical operator"
                )));
            }
        };
        let exit = frame.new_label();
        let next = frame.new_label();
        trace!(?op, %exit, %next, "short circuit");

        self.expr(frame, left)?;
        self.emit(frame, Instruction::If(exit_cond, exit))?;
        self.expr(frame, right)?;
        self.emit(frame, Instruction::If(exit_cond, exit))?;
        self.materialize(frame, fallthrough, exit, decided, next)
    }

    /// Pushes `fallthrough` on the straight path and `branched` at `target`,
    /// joining both at `next`.
    fn materialize(
        &mut self,
        frame: &mut Frame,
        fallthrough: u8,
        target: Label,
        branched: u8,
        next: Label,
    ) -> Result<(), CodegenError> {
        self.emit(frame, Instruction::Iconst(fallthrough))?;
        self.emit(frame, Instruction::Goto(next))?;
        // `target` is only reached by branching, before the constant above.
        frame.pop()?;
        self.write(Instruction::Label(target));
        self.emit(frame, Instruction::Iconst(branched))?;
        self.write(Instruction::Label(next));
        Ok(())
    }

    /// Assignment leaves the assigned value, so it can be chained or discarded.
    fn assign(&mut self, frame: &mut Frame, target: &Expr, value: &Expr) -> Result<(), CodegenError> {
        match &target.kind {
            ExprKind::Var(var) => {
                self.expr(frame, value)?;
                self.emit(frame, Instruction::Dup)?;
                self.store_var(frame, var, &target.ty)
            }
            ExprKind::Index { array, index } => {
                self.element(frame, array, index, &target.ty, Access::Store)?;
                self.expr(frame, value)?;
                self.emit(frame, Instruction::DupX2)?;
                self.emit(frame, select::array_store(&value.ty)?)
            }
            _ => Err(CodegenError::Malformed(
                "assignment to something other than a variable or element".to_string(),
            )),
        }
    }

    fn element(
        &mut self,
        frame: &mut Frame,
        array: &Expr,
        index: &Expr,
        elem: &Type,
        access: Access,
    ) -> Result<(), CodegenError> {
        self.expr(frame, array)?;
        self.expr(frame, index)?;
        match access {
            Access::Load => self.emit(frame, select::array_load(elem)?),
            Access::Store => Ok(()),
        }
    }

    fn call(
        &mut self,
        frame: &mut Frame,
        name: &str,
        callee: Callee,
        args: &[Expr],
    ) -> Result<(), CodegenError> {
        match callee {
            Callee::Builtin(builtin) => self.builtin_call(frame, builtin, args),
            Callee::Function(id) => {
                let func = self.function_decl(id, name)?;
                let receiver = match frame.kind() {
                    _ if func.is_entry() => {
                        return Err(CodegenError::Unsupported(format!(
                            "call to `{}`",
                            FuncDecl::ENTRY
                        )));
                    }
                    FrameKind::Entry => INSTANCE_SLOT,
                    FrameKind::Method => RECEIVER_SLOT,
                    FrameKind::StaticInit => {
                        return Err(CodegenError::Unsupported(format!(
                            "call to `{name}` in a global initializer"
                        )));
                    }
                };
                check_arity(name, func.params.len(), args.len())?;

                self.emit(frame, Instruction::Load(LocalKind::Reference, receiver))?;
                for arg in args {
                    self.expr(frame, arg)?;
                }
                // The signature comes from the declaration, not from the arguments.
                let method = MethodRef::new(self.class_name(), func.name.as_str(), func.descriptor());
                self.emit(frame, Instruction::Invoke(InvokeKind::Virtual, method))
            }
        }
    }

    fn builtin_call(&mut self, frame: &mut Frame, builtin: Builtin, args: &[Expr]) -> Result<(), CodegenError> {
        let method = builtin.method();
        check_arity(builtin.name(), method.descriptor.params.len(), args.len())?;
        for arg in args {
            self.expr(frame, arg)?;
        }
        self.emit(frame, Instruction::Invoke(InvokeKind::Static, method))
    }

    // === Lookups ===

    fn global(&self, id: DeclId, name: &str) -> Result<&'p GlobalVar, CodegenError> {
        let program: &'p Program = self.program;
        match program.decl(id) {
            Some(Decl::Global(global)) => Ok(global),
            _ => Err(CodegenError::UnresolvedBinding(name.to_string())),
        }
    }

    fn function_decl(&self, id: DeclId, name: &str) -> Result<&'p FuncDecl, CodegenError> {
        let program: &'p Program = self.program;
        match program.decl(id) {
            Some(Decl::Function(func)) => Ok(func),
            _ => Err(CodegenError::UnresolvedBinding(name.to_string())),
        }
    }

    fn field_ref(&self, name: &str, ty: &Type) -> FieldRef {
        FieldRef::new(self.class_name(), name, ty.descriptor())
    }
}

fn check_arity(name: &str, expected: usize, found: usize) -> Result<(), CodegenError> {
    if expected != found {
        return Err(CodegenError::Malformed(format!(
            "`{name}` takes {expected} arguments but {found} were supplied"
        )));
    }
    Ok(())
}

/// Declared length of an array, or the initializer's length for `T a[] = {...}`.
fn array_length(name: &str, array: &ArrayType, init: Option<&Expr>) -> Result<u32, CodegenError> {
    match (array.len, init.map(|init| &init.kind)) {
        (Some(len), _) => Ok(len),
        (None, Some(ExprKind::Init(elems))) => u32::try_from(elems.len())
            .map_err(|_| CodegenError::Malformed(format!("array `{name}` is too long"))),
        (None, _) => Err(CodegenError::Malformed(format!(
            "array `{name}` declared without a length"
        ))),
    }
}
