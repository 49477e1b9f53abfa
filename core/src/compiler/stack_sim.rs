//! Replays generated methods along every branch to check stack accounting.

use hashbrown::HashMap;

use crate::jvm::{ClassCode, Instruction, Label};

/// Simulates one method body and returns its true maximum stack depth.
///
/// Walks every reachable path. Fails if an instruction underflows, a label is
/// reached with two different depths, `return` sees a non-empty stack,
/// `ireturn`/`freturn` sees anything but its one value, or control falls off
/// the end of the body.
pub fn simulate(body: &[Instruction]) -> Result<usize, String> {
    let labels: HashMap<Label, usize> = body
        .iter()
        .enumerate()
        .filter_map(|(pc, line)| match line {
            Instruction::Label(label) => Some((*label, pc)),
            _ => None,
        })
        .collect();

    let mut depth_at: Vec<Option<usize>> = vec![None; body.len()];
    let mut worklist = vec![(0usize, 0usize)];
    let mut max_depth = 0;

    while let Some((pc, depth)) = worklist.pop() {
        let Some(line) = body.get(pc) else {
            return Err(format!("control falls off the end with depth {depth}"));
        };
        match depth_at[pc] {
            Some(seen) if seen == depth => continue,
            Some(seen) => {
                return Err(format!("line {pc} ({line}) reached with depth {seen} and {depth}"));
            }
            None => depth_at[pc] = Some(depth),
        }

        let (pops, pushes) = line.stack_effect();
        if depth < pops {
            return Err(format!("line {pc} ({line}) pops {pops} with depth {depth}"));
        }
        match line {
            Instruction::Return if depth != 0 => {
                return Err(format!("line {pc}: return with depth {depth}"));
            }
            Instruction::ValueReturn(_) if depth != 1 => {
                return Err(format!("line {pc} ({line}) with depth {depth}"));
            }
            _ => {}
        }

        let next = depth - pops + pushes;
        max_depth = max_depth.max(next);

        if let Some(target) = line.branch_target() {
            let target_pc = labels
                .get(&target)
                .ok_or_else(|| format!("branch to undefined label {target}"))?;
            worklist.push((*target_pc, next));
        }
        if !line.ends_block() {
            worklist.push((pc + 1, next));
        }
    }
    Ok(max_depth)
}

/// Simulates every method of a class and checks each reported `.limit stack`.
pub fn check_class(class: &ClassCode) -> Result<(), String> {
    for limits in &class.methods {
        let body = class
            .method_body(&limits.name)
            .ok_or_else(|| format!("no body for `{}`", limits.name))?;
        let simulated = simulate(body).map_err(|err| format!("`{}`: {err}", limits.name))?;
        if simulated != limits.max_stack as usize {
            return Err(format!(
                "`{}`: reported max stack {} but simulated {simulated}",
                limits.name, limits.max_stack
            ));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::jvm::{Cond, NumericKind};

    #[test]
    fn test_branch_depths_must_agree() {
        let body = [
            Instruction::Iconst(1),
            Instruction::If(Cond::Eq, Label(0)),
            Instruction::Iconst(1),
            Instruction::Label(Label(0)),
            Instruction::Goto(Label(0)),
        ];
        // Both paths meet at L0 and never leave it, so the only possible
        // failure is the depth mismatch, whichever path is walked first.
        let err = simulate(&body).unwrap_err();
        assert!(err.contains("reached with depth"), "{err}");
        assert!(err.starts_with("line 3"), "{err}");
    }

    #[test]
    fn test_value_return_needs_one_value() {
        let body = [
            Instruction::Iconst(1),
            Instruction::Iconst(2),
            Instruction::ValueReturn(NumericKind::Int),
        ];
        assert!(simulate(&body).is_err());

        let body = [Instruction::Iconst(2), Instruction::ValueReturn(NumericKind::Int)];
        assert_eq!(simulate(&body), Ok(1));
    }

    #[test]
    fn test_falling_off_the_end() {
        assert!(simulate(&[Instruction::Nop]).is_err());
    }
}
