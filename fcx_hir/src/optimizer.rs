//! The minimal optimizer (§4.6): constant folding + dead-code elimination at
//! `-O1` and above, copy-propagation added at `-O2`, `-O3` iterating the
//! pass set to a fixed point or a bounded round count, `-Os` behaving like
//! `-O2` but skipping rewrites that could grow code size.
//!
//! Passes preserve block id stability and CFG shape — they delete
//! instructions, never blocks, matching §4.6's invariant.

use crate::function::HirFunction;
use crate::instruction::{HirOp, Instruction};
use crate::module::HirModule;
use crate::operand::{Operand, VregId};
use fcx_registry::OperatorKind;
use hashbrown::{HashMap, HashSet};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum OptLevel {
    O0,
    O1,
    O2,
    O3,
    Os,
}

/// §9's resolution of the fixed-point-bound open question: 8 rounds, chosen
/// rather than derived, recorded here and in DESIGN.md.
pub const MAX_FIXED_POINT_ROUNDS: usize = 8;

pub fn optimize_module(module: &mut HirModule, level: OptLevel) {
    if level == OptLevel::O0 {
        return;
    }
    for func in &mut module.functions {
        optimize_function(func, level);
    }
}

pub fn optimize_function(func: &mut HirFunction, level: OptLevel) {
    match level {
        OptLevel::O0 => {}
        OptLevel::O1 => {
            constant_fold(func);
            dead_code_eliminate(func);
        }
        OptLevel::O2 => {
            constant_fold(func);
            copy_propagate(func);
            dead_code_eliminate(func);
        }
        OptLevel::Os => {
            constant_fold(func);
            copy_propagate(func);
            dead_code_eliminate(func);
        }
        OptLevel::O3 => {
            for round in 0..MAX_FIXED_POINT_ROUNDS {
                let folded = constant_fold(func);
                let propagated = copy_propagate(func);
                let eliminated = dead_code_eliminate(func);
                log::debug!("optimizer round {round} for '{}': changed={}", func.name, folded || propagated || eliminated);
                if !folded && !propagated && !eliminated {
                    break;
                }
            }
        }
    }
}

/// Folds arithmetic/bitwise/shift instructions whose operands are both
/// immediates, in place. Returns whether anything changed.
fn constant_fold(func: &mut HirFunction) -> bool {
    let mut changed = false;
    for block in &mut func.blocks {
        for instr in &mut block.instructions {
            let HirOp::Operator(kind) = instr.op else { continue };
            let Some(folded) = try_fold(kind, &instr.operands) else { continue };
            instr.op = HirOp::Move;
            instr.operands = vec![folded].into();
            changed = true;
        }
    }
    changed
}

fn as_immediate(operand: &Operand) -> Option<i64> {
    match operand {
        Operand::ImmInt(v) => Some(*v),
        Operand::ImmBool(b) => Some(*b as i64),
        _ => None,
    }
}

fn try_fold(kind: OperatorKind, operands: &[Operand]) -> Option<Operand> {
    use OperatorKind::*;
    if operands.len() != 2 {
        return None;
    }
    let a = as_immediate(&operands[0])?;
    let b = as_immediate(&operands[1])?;
    let folded = match kind {
        Add => a.checked_add(b)?,
        Sub => a.checked_sub(b)?,
        Mul => a.checked_mul(b)?,
        Div if b != 0 => a.checked_div(b)?,
        Mod if b != 0 => a.checked_rem(b)?,
        BitAnd => a & b,
        BitOr => a | b,
        BitXor => a ^ b,
        ShiftLeft if (0..64).contains(&b) => a << b,
        ShiftRight if (0..64).contains(&b) => a >> b,
        Equal => (a == b) as i64,
        NotEqual => (a != b) as i64,
        LessThan => (a < b) as i64,
        LessEqual => (a <= b) as i64,
        GreaterThan => (a > b) as i64,
        GreaterEqual => (a >= b) as i64,
        LogicalAnd => ((a != 0) && (b != 0)) as i64,
        LogicalOr => ((a != 0) || (b != 0)) as i64,
        _ => return None,
    };
    Some(Operand::ImmInt(folded))
}

/// Removes instructions whose result vreg is never read and which have no
/// side effect (§4.6: "pure arithmetic and moves"). Iterates to a local
/// fixed point within one call since removing a dead instruction can make
/// its own operands dead in turn.
fn dead_code_eliminate(func: &mut HirFunction) -> bool {
    let mut changed_at_all = false;
    loop {
        let mut used: HashSet<VregId> = HashSet::new();
        for block in &func.blocks {
            for instr in &block.instructions {
                for v in instr.used_vregs() {
                    used.insert(v);
                }
            }
        }
        let mut changed = false;
        for block in &mut func.blocks {
            let before = block.instructions.len();
            block.instructions.retain(|instr| match instr.result {
                Some(vreg) => used.contains(&vreg) || !instr.is_pure(),
                None => true,
            });
            if block.instructions.len() != before {
                changed = true;
            }
        }
        if !changed {
            break;
        }
        changed_at_all = true;
    }
    changed_at_all
}

/// Replaces uses of a vreg that is a direct, unconditional copy of another
/// vreg or immediate with the source operand, within a single block (§4.6:
/// "-O2+ additionally performs copy-propagation across a single block").
fn copy_propagate(func: &mut HirFunction) -> bool {
    let mut changed = false;
    for block in &mut func.blocks {
        let mut copies: HashMap<VregId, Operand> = HashMap::new();
        for instr in &mut block.instructions {
            for operand in &mut instr.operands {
                if let Operand::Vreg(v) = operand {
                    if let Some(replacement) = copies.get(v) {
                        *operand = replacement.clone();
                        changed = true;
                    }
                }
            }
            if let (HirOp::Move, Some(result), [source]) = (&instr.op, instr.result, instr.operands.as_slice()) {
                copies.insert(result, source.clone());
            } else if let Some(result) = instr.result {
                copies.remove(&result);
            }
        }
    }
    changed
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::build_module;
    use fcx_parser::parser::parse;

    fn build(src: &str) -> HirModule {
        let tokens = fcx_lexer::lex(src, 0).expect("lex failed");
        let (block, errors) = parse(tokens);
        assert!(errors.is_empty(), "parse errors: {errors:?}");
        build_module("test", &block).expect("build failed")
    }

    #[test]
    fn folds_constant_addition() {
        let mut module = build("three <=> fn() -> ret 1 + 2;");
        optimize_module(&mut module, OptLevel::O1);
        let func = module.get_function("three").unwrap();
        let has_add = func.blocks.iter().flat_map(|b| &b.instructions).any(|i| matches!(i.op, HirOp::Operator(OperatorKind::Add)));
        assert!(!has_add, "constant addition should have folded away");
    }

    #[test]
    fn dead_code_is_removed() {
        let mut module = build(
            r#"
            unused <=> fn() {
                let x := 1 + 2;
                ret 0;
            }
            "#,
        );
        optimize_module(&mut module, OptLevel::O1);
        let func = module.get_function("unused").unwrap();
        let instr_count: usize = func.blocks.iter().map(|b| b.instructions.len()).sum();
        assert_eq!(instr_count, 1, "only the return should survive DCE");
    }

    #[test]
    fn o3_is_idempotent() {
        let mut module = build("calc <=> fn(x) -> ret x + 1 + 2;");
        optimize_module(&mut module, OptLevel::O3);
        let mut again = module.clone();
        optimize_module(&mut again, OptLevel::O2);
        let func1 = module.get_function("calc").unwrap();
        let func2 = again.get_function("calc").unwrap();
        let count1: usize = func1.blocks.iter().map(|b| b.instructions.len()).sum();
        let count2: usize = func2.blocks.iter().map(|b| b.instructions.len()).sum();
        assert_eq!(count1, count2);
    }
}
