//! Small interpreter for generated classes, used to check runtime behavior.
//!
//! Covers exactly the instructions the generator emits. Built-ins write to an
//! in-memory buffer and read from a queue supplied by the test.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

use hashbrown::HashMap;

use crate::jvm::{
    ArithOp, ClassCode, Constant, ElementKind, Instruction, InvokeKind, Label, NumericKind,
};

const STEP_LIMIT: usize = 1_000_000;

#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Int(i32),
    Float(f32),
    Str(String),
    Array(Rc<RefCell<Vec<Value>>>),
    Object,
}

impl Value {
    fn int(&self) -> i32 {
        match self {
            Value::Int(value) => *value,
            other => panic!("expected an int, got {other:?}"),
        }
    }

    fn float(&self) -> f32 {
        match self {
            Value::Float(value) => *value,
            other => panic!("expected a float, got {other:?}"),
        }
    }

    fn array(&self) -> Rc<RefCell<Vec<Value>>> {
        match self {
            Value::Array(array) => array.clone(),
            other => panic!("expected an array, got {other:?}"),
        }
    }
}

pub struct TestVm<'c> {
    class: &'c ClassCode,
    statics: HashMap<String, Value>,
    input: VecDeque<Value>,
    /// Everything written by the `put*` built-ins.
    pub output: String,
    /// Names of the built-ins called, in order.
    pub builtin_calls: Vec<String>,
    label_hits: HashMap<(String, Label), usize>,
    steps: usize,
}

impl<'c> TestVm<'c> {
    pub fn new(class: &'c ClassCode) -> Self {
        Self {
            class,
            statics: HashMap::new(),
            input: VecDeque::new(),
            output: String::new(),
            builtin_calls: Vec::new(),
            label_hits: HashMap::new(),
            steps: 0,
        }
    }

    pub fn with_input(mut self, input: impl IntoIterator<Item = Value>) -> Self {
        self.input.extend(input);
        self
    }

    /// Runs the static initializer, then `main`.
    pub fn run_main(&mut self) {
        self.invoke("<clinit>", Vec::new());
        let argv = Value::Array(Rc::new(RefCell::new(Vec::new())));
        self.invoke("main", vec![argv]);
    }

    /// Runs the static initializer, then calls an instance method.
    pub fn call(&mut self, name: &str, args: Vec<Value>) -> Option<Value> {
        self.invoke("<clinit>", Vec::new());
        let mut locals = vec![Value::Object];
        locals.extend(args);
        self.invoke(name, locals)
    }

    pub fn static_value(&self, name: &str) -> Option<&Value> {
        self.statics.get(name)
    }

    /// How many times execution passed `label` in `method`.
    pub fn label_hits(&self, method: &str, label: Label) -> usize {
        self.label_hits
            .get(&(method.to_string(), label))
            .copied()
            .unwrap_or(0)
    }

    fn invoke(&mut self, name: &str, args: Vec<Value>) -> Option<Value> {
        let class = self.class;
        let body = class
            .method_body(name)
            .unwrap_or_else(|| panic!("no method `{name}`"));
        let max_locals = class
            .method(name)
            .map(|limits| limits.max_locals as usize)
            .unwrap_or(0);
        let labels: HashMap<Label, usize> = body
            .iter()
            .enumerate()
            .filter_map(|(pc, line)| match line {
                Instruction::Label(label) => Some((*label, pc)),
                _ => None,
            })
            .collect();

        let mut locals = args;
        let slots = max_locals.max(locals.len());
        locals.resize(slots, Value::Int(0));
        let mut stack: Vec<Value> = Vec::new();
        let mut pc = 0;

        loop {
            self.steps += 1;
            assert!(self.steps < STEP_LIMIT, "step limit exceeded");
            let line = body
                .get(pc)
                .unwrap_or_else(|| panic!("`{name}` fell off the end"));
            pc += 1;

            match line {
                Instruction::Label(label) => {
                    *self.label_hits.entry((name.to_string(), *label)).or_default() += 1;
                }
                Instruction::Nop
                | Instruction::Var { .. }
                | Instruction::LimitLocals(_)
                | Instruction::LimitStack(_)
                | Instruction::Comment(_)
                | Instruction::Blank => {}
                Instruction::IconstM1 => stack.push(Value::Int(-1)),
                Instruction::Iconst(n) => stack.push(Value::Int(i32::from(*n))),
                Instruction::Fconst(n) => stack.push(Value::Float(f32::from(*n))),
                Instruction::Bipush(n) => stack.push(Value::Int(i32::from(*n))),
                Instruction::Sipush(n) => stack.push(Value::Int(i32::from(*n))),
                Instruction::Ldc(Constant::Int(n)) => stack.push(Value::Int(*n)),
                Instruction::Ldc(Constant::Float(n)) => stack.push(Value::Float(*n)),
                Instruction::Ldc(Constant::String(s)) => stack.push(Value::Str(s.clone())),
                Instruction::Load(_, slot) => stack.push(locals[*slot as usize].clone()),
                Instruction::Store(_, slot) => locals[*slot as usize] = pop(&mut stack),
                Instruction::ArrayLoad(_) => {
                    let index = pop(&mut stack).int() as usize;
                    let array = pop(&mut stack).array();
                    let value = array.borrow()[index].clone();
                    stack.push(value);
                }
                Instruction::ArrayStore(_) => {
                    let value = pop(&mut stack);
                    let index = pop(&mut stack).int() as usize;
                    let array = pop(&mut stack).array();
                    array.borrow_mut()[index] = value;
                }
                Instruction::GetStatic(field) => {
                    let value = self
                        .statics
                        .get(&field.name)
                        .cloned()
                        .unwrap_or_else(|| panic!("static `{}` read before init", field.name));
                    stack.push(value);
                }
                Instruction::PutStatic(field) => {
                    let value = pop(&mut stack);
                    self.statics.insert(field.name.clone(), value);
                }
                Instruction::Pop => {
                    pop(&mut stack);
                }
                Instruction::Dup => {
                    let top = pop(&mut stack);
                    stack.push(top.clone());
                    stack.push(top);
                }
                Instruction::DupX2 => {
                    let a = pop(&mut stack);
                    let b = pop(&mut stack);
                    let c = pop(&mut stack);
                    stack.extend([a.clone(), c, b, a]);
                }
                Instruction::Arith(kind, op) => {
                    let right = pop(&mut stack);
                    let left = pop(&mut stack);
                    stack.push(arith(*kind, *op, &left, &right));
                }
                Instruction::Neg(NumericKind::Int) => {
                    let value = pop(&mut stack).int();
                    stack.push(Value::Int(value.wrapping_neg()));
                }
                Instruction::Neg(NumericKind::Float) => {
                    let value = pop(&mut stack).float();
                    stack.push(Value::Float(-value));
                }
                Instruction::I2f => {
                    let value = pop(&mut stack).int();
                    stack.push(Value::Float(value as f32));
                }
                Instruction::Fcmpg => {
                    let right = pop(&mut stack).float();
                    let left = pop(&mut stack).float();
                    let result = if left < right {
                        -1
                    } else if left == right {
                        0
                    } else {
                        // Greater, or either is NaN.
                        1
                    };
                    stack.push(Value::Int(result));
                }
                Instruction::If(cond, label) => {
                    if cond.holds(pop(&mut stack).int(), 0) {
                        pc = labels[label];
                    }
                }
                Instruction::IfIcmp(cond, label) => {
                    let right = pop(&mut stack).int();
                    let left = pop(&mut stack).int();
                    if cond.holds(left, right) {
                        pc = labels[label];
                    }
                }
                Instruction::Goto(label) => pc = labels[label],
                Instruction::Return => return None,
                Instruction::ValueReturn(_) => return Some(pop(&mut stack)),
                Instruction::Invoke(kind, method) => {
                    let argc = method.descriptor.params.len();
                    let args = stack.split_off(stack.len() - argc);
                    match kind {
                        InvokeKind::Static => {
                            if let Some(result) = self.builtin(&method.name, &args) {
                                stack.push(result);
                            }
                        }
                        InvokeKind::Special | InvokeKind::Nonvirtual => {
                            // Constructors have nothing to run here.
                            pop(&mut stack);
                        }
                        InvokeKind::Virtual => {
                            let receiver = pop(&mut stack);
                            let mut frame = vec![receiver];
                            frame.extend(args);
                            if let Some(result) = self.invoke(&method.name, frame) {
                                stack.push(result);
                            }
                        }
                    }
                }
                Instruction::New(_) => stack.push(Value::Object),
                Instruction::NewArray(kind) => {
                    let len = pop(&mut stack).int() as usize;
                    let zero = match kind {
                        ElementKind::Float => Value::Float(0.0),
                        ElementKind::Int | ElementKind::Boolean => Value::Int(0),
                    };
                    stack.push(Value::Array(Rc::new(RefCell::new(vec![zero; len]))));
                }
                Instruction::Class(_)
                | Instruction::Super(_)
                | Instruction::Field { .. }
                | Instruction::Method { .. }
                | Instruction::EndMethod => panic!("directive {line} inside a method body"),
            }
        }
    }

    fn builtin(&mut self, name: &str, args: &[Value]) -> Option<Value> {
        self.builtin_calls.push(name.to_string());
        let text = |value: &Value| match value {
            Value::Int(n) => n.to_string(),
            Value::Float(n) => format!("{n:?}"),
            Value::Str(s) => s.clone(),
            other => panic!("cannot print {other:?}"),
        };
        match name {
            "getInt" | "getFloat" => {
                return Some(self.input.pop_front().expect("input exhausted"));
            }
            "putInt" | "putFloat" | "putString" => self.output.push_str(&text(&args[0])),
            "putIntLn" | "putFloatLn" | "putStringLn" => {
                self.output.push_str(&text(&args[0]));
                self.output.push('\n');
            }
            "putBool" => self.output.push_str(bool_text(&args[0])),
            "putBoolLn" => {
                self.output.push_str(bool_text(&args[0]));
                self.output.push('\n');
            }
            "putLn" => self.output.push('\n'),
            other => panic!("unknown built-in `{other}`"),
        }
        None
    }
}

fn pop(stack: &mut Vec<Value>) -> Value {
    stack.pop().expect("operand stack underflow")
}

fn bool_text(value: &Value) -> &'static str {
    if value.int() != 0 { "true" } else { "false" }
}

fn arith(kind: NumericKind, op: ArithOp, left: &Value, right: &Value) -> Value {
    match kind {
        NumericKind::Int => {
            let (a, b) = (left.int(), right.int());
            Value::Int(match op {
                ArithOp::Add => a.wrapping_add(b),
                ArithOp::Mul => a.wrapping_mul(b),
                ArithOp::Div => a.wrapping_div(b),
            })
        }
        NumericKind::Float => {
            let (a, b) = (left.float(), right.float());
            Value::Float(match op {
                ArithOp::Add => a + b,
                ArithOp::Mul => a * b,
                ArithOp::Div => a / b,
            })
        }
    }
}
