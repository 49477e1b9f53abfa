//! Per-method compilation state.

use hashbrown::HashMap;
use smallvec::SmallVec;
use tracing::trace;

use super::CodegenError;
use crate::ast::LocalId;
use crate::jvm::{Label, MethodLimits, Slot};

/// Slot of the entry function's argument vector.
pub const ARGV_SLOT: Slot = 0;
/// Slot of the entry function's program instance.
pub const INSTANCE_SLOT: Slot = 1;
/// Slot of `this` in every other method.
pub const RECEIVER_SLOT: Slot = 0;

/// What kind of method a frame belongs to. Decides which low slots are taken
/// before any declaration is seen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameKind {
    /// `main`: slot 0 holds `argv`, slot 1 the program instance.
    Entry,
    /// Any other function, compiled as an instance method: slot 0 holds `this`.
    Method,
    /// The static initializer running global initializers. No implicit slots.
    StaticInit,
}

impl FrameKind {
    pub fn reserved_slots(self) -> u32 {
        match self {
            FrameKind::Entry => 2,
            FrameKind::Method => 1,
            FrameKind::StaticInit => 0,
        }
    }
}

type LabelStack = SmallVec<[Label; 4]>;

/// Bookkeeping for one method being translated.
///
/// Tracks the operand-stack depth implied by the instructions emitted so far
/// (never by re-reading them), hands out slots and labels, and keeps the
/// scope and loop label stacks. One frame per method, never shared.
#[derive(Debug)]
pub struct Frame {
    kind: FrameKind,

    /// Current operand-stack depth
    stack_size: usize,

    /// High-water mark of `stack_size`
    max_stack: usize,

    next_slot: u32,
    next_label: u32,

    /// Slot assigned to each declared local or parameter.
    ///
    /// Slots are never reclaimed: a variable in a closed scope keeps its slot.
    slots: HashMap<LocalId, Slot>,

    scope_start: LabelStack,
    scope_end: LabelStack,
    break_targets: LabelStack,
    continue_targets: LabelStack,
}

impl Frame {
    pub fn new(kind: FrameKind) -> Self {
        Self {
            kind,
            stack_size: 0,
            max_stack: 0,
            next_slot: kind.reserved_slots(),
            next_label: 0,
            slots: HashMap::new(),
            scope_start: SmallVec::new(),
            scope_end: SmallVec::new(),
            break_targets: SmallVec::new(),
            continue_targets: SmallVec::new(),
        }
    }

    pub fn kind(&self) -> FrameKind {
        self.kind
    }

    pub fn is_entry(&self) -> bool {
        self.kind == FrameKind::Entry
    }

    // === Stack Management ===

    pub fn push(&mut self) {
        self.push_n(1);
    }

    pub fn push_n(&mut self, n: usize) {
        self.stack_size += n;
        if self.stack_size > self.max_stack {
            self.max_stack = self.stack_size;
        }
    }

    pub fn pop(&mut self) -> Result<(), CodegenError> {
        self.pop_n(1)
    }

    pub fn pop_n(&mut self, n: usize) -> Result<(), CodegenError> {
        if self.stack_size < n {
            return Err(CodegenError::StackUnderflow {
                requested: n,
                depth: self.stack_size,
            });
        }
        self.stack_size -= n;
        Ok(())
    }

    pub fn stack_size(&self) -> usize {
        self.stack_size
    }

    pub fn max_stack(&self) -> usize {
        self.max_stack
    }

    // === Local Variable Management ===

    /// Hands out the next unused slot.
    pub fn new_slot(&mut self) -> Result<Slot, CodegenError> {
        let slot = Slot::try_from(self.next_slot).map_err(|_| CodegenError::TooManyLocals)?;
        self.next_slot += 1;
        Ok(slot)
    }

    /// Assigns a fresh slot to a declaration. Each declaration is bound once.
    pub fn declare(&mut self, id: LocalId, name: &str) -> Result<Slot, CodegenError> {
        if self.slots.contains_key(&id) {
            return Err(CodegenError::SlotReassigned(name.to_string()));
        }
        let slot = self.new_slot()?;
        self.slots.insert(id, slot);
        Ok(slot)
    }

    pub fn slot_of(&self, id: LocalId) -> Option<Slot> {
        self.slots.get(&id).copied()
    }

    /// Number of slots used so far, reserved ones included.
    pub fn slot_count(&self) -> u32 {
        self.next_slot
    }

    // === Labels ===

    pub fn new_label(&mut self) -> Label {
        let label = Label(self.next_label);
        self.next_label += 1;
        label
    }

    /// Allocates and pushes a scope start/end pair.
    pub fn enter_scope(&mut self) -> (Label, Label) {
        let start = self.new_label();
        let end = self.new_label();
        trace!(%start, %end, "enter scope");
        self.scope_start.push(start);
        self.scope_end.push(end);
        (start, end)
    }

    pub fn exit_scope(&mut self) -> Result<(), CodegenError> {
        match (self.scope_start.pop(), self.scope_end.pop()) {
            (Some(_), Some(_)) => Ok(()),
            _ => Err(CodegenError::NoEnclosingScope),
        }
    }

    /// Start and end labels of the innermost scope.
    pub fn scope(&self) -> Result<(Label, Label), CodegenError> {
        match (self.scope_start.last(), self.scope_end.last()) {
            (Some(&start), Some(&end)) => Ok((start, end)),
            _ => Err(CodegenError::NoEnclosingScope),
        }
    }

    pub fn enter_loop(&mut self, break_target: Label, continue_target: Label) {
        trace!(%break_target, %continue_target, "enter loop");
        self.break_targets.push(break_target);
        self.continue_targets.push(continue_target);
    }

    pub fn exit_loop(&mut self) -> Result<(), CodegenError> {
        self.break_targets
            .pop()
            .ok_or(CodegenError::NoEnclosingLoop("break"))?;
        self.continue_targets
            .pop()
            .ok_or(CodegenError::NoEnclosingLoop("continue"))?;
        Ok(())
    }

    pub fn break_target(&self) -> Result<Label, CodegenError> {
        self.break_targets
            .last()
            .copied()
            .ok_or(CodegenError::NoEnclosingLoop("break"))
    }

    pub fn continue_target(&self) -> Result<Label, CodegenError> {
        self.continue_targets
            .last()
            .copied()
            .ok_or(CodegenError::NoEnclosingLoop("continue"))
    }

    /// Closes the frame and reports the method's limits.
    ///
    /// Fails if any label stack is still open or a value is left on the stack.
    pub fn finish(self, name: &str) -> Result<MethodLimits, CodegenError> {
        if !self.scope_start.is_empty()
            || !self.scope_end.is_empty()
            || !self.break_targets.is_empty()
            || !self.continue_targets.is_empty()
        {
            return Err(CodegenError::UnbalancedLabels(name.to_string()));
        }
        if self.stack_size != 0 {
            return Err(CodegenError::ResidualStack(self.stack_size));
        }
        Ok(MethodLimits {
            name: name.to_string(),
            max_stack: self.max_stack as u32,
            max_locals: self.next_slot,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_stack_high_water_mark() {
        let mut frame = Frame::new(FrameKind::Method);
        frame.push();
        frame.push_n(2);
        frame.pop_n(2).unwrap();
        frame.push();
        assert_eq!(frame.stack_size(), 2);
        assert_eq!(frame.max_stack(), 3);
        frame.pop_n(2).unwrap();
        assert_eq!(frame.stack_size(), 0);
        assert_eq!(frame.max_stack(), 3);
    }

    #[test]
    fn test_pop_underflow() {
        let mut frame = Frame::new(FrameKind::Method);
        frame.push();
        assert_eq!(
            frame.pop_n(2),
            Err(CodegenError::StackUnderflow {
                requested: 2,
                depth: 1
            })
        );
        // A failed pop leaves the depth alone.
        assert_eq!(frame.stack_size(), 1);
    }

    #[test]
    fn test_reserved_slots() {
        let mut entry = Frame::new(FrameKind::Entry);
        assert_eq!(entry.declare(LocalId(0), "x").unwrap(), 2);

        let mut method = Frame::new(FrameKind::Method);
        assert_eq!(method.declare(LocalId(0), "x").unwrap(), 1);

        let mut init = Frame::new(FrameKind::StaticInit);
        assert_eq!(init.new_slot().unwrap(), 0);
    }

    #[test]
    fn test_slots_in_declaration_order() {
        let mut frame = Frame::new(FrameKind::Method);
        assert_eq!(frame.declare(LocalId(7), "a").unwrap(), 1);
        assert_eq!(frame.declare(LocalId(3), "b").unwrap(), 2);
        assert_eq!(frame.declare(LocalId(9), "c").unwrap(), 3);
        assert_eq!(frame.slot_of(LocalId(3)), Some(2));
        assert_eq!(frame.slot_of(LocalId(4)), None);
        assert_eq!(frame.slot_count(), 4);
    }

    #[test]
    fn test_slot_assigned_once() {
        let mut frame = Frame::new(FrameKind::Method);
        frame.declare(LocalId(1), "a").unwrap();
        assert_eq!(
            frame.declare(LocalId(1), "a"),
            Err(CodegenError::SlotReassigned("a".to_string()))
        );
        assert_eq!(frame.slot_count(), 2);
    }

    #[test]
    fn test_too_many_locals() {
        let mut frame = Frame::new(FrameKind::StaticInit);
        for _ in 0..=u16::MAX as u32 {
            frame.new_slot().unwrap();
        }
        assert_eq!(frame.new_slot(), Err(CodegenError::TooManyLocals));
    }

    #[test]
    fn test_labels_are_fresh() {
        let mut frame = Frame::new(FrameKind::Method);
        assert_eq!(frame.new_label(), Label(0));
        assert_eq!(frame.enter_scope(), (Label(1), Label(2)));
        assert_eq!(frame.new_label(), Label(3));
        assert_eq!(frame.scope().unwrap(), (Label(1), Label(2)));
    }

    #[test]
    fn test_innermost_loop_wins() {
        let mut frame = Frame::new(FrameKind::Method);
        frame.enter_loop(Label(1), Label(0));
        frame.enter_loop(Label(3), Label(2));
        assert_eq!(frame.break_target().unwrap(), Label(3));
        assert_eq!(frame.continue_target().unwrap(), Label(2));
        frame.exit_loop().unwrap();
        assert_eq!(frame.break_target().unwrap(), Label(1));
        assert_eq!(frame.continue_target().unwrap(), Label(0));
        frame.exit_loop().unwrap();
        assert_eq!(frame.break_target(), Err(CodegenError::NoEnclosingLoop("break")));
        assert_eq!(
            frame.continue_target(),
            Err(CodegenError::NoEnclosingLoop("continue"))
        );
    }

    #[test]
    fn test_scope_outside_block() {
        let mut frame = Frame::new(FrameKind::Method);
        assert_eq!(frame.scope(), Err(CodegenError::NoEnclosingScope));
        assert_eq!(frame.exit_scope(), Err(CodegenError::NoEnclosingScope));
    }

    #[test]
    fn test_finish_reports_limits() {
        let mut frame = Frame::new(FrameKind::Entry);
        frame.enter_scope();
        frame.push_n(2);
        frame.pop_n(2).unwrap();
        frame.declare(LocalId(0), "i").unwrap();
        frame.exit_scope().unwrap();
        assert_eq!(
            frame.finish("main").unwrap(),
            MethodLimits {
                name: "main".to_string(),
                max_stack: 2,
                max_locals: 3,
            }
        );
    }

    #[test]
    fn test_finish_rejects_open_labels() {
        let mut frame = Frame::new(FrameKind::Method);
        frame.enter_loop(Label(1), Label(0));
        assert_eq!(
            frame.finish("f"),
            Err(CodegenError::UnbalancedLabels("f".to_string()))
        );

        let mut frame = Frame::new(FrameKind::Method);
        frame.push();
        assert_eq!(frame.finish("f"), Err(CodegenError::ResidualStack(1)));
    }
}
