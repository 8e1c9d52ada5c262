//! Renders an [`ast::Block`] back to source text.
//!
//! Every binary/unary/ternary operand is fully parenthesized, so the printed
//! text always reparses to an AST equal up to spans regardless of the
//! printed operator's precedence — this is what the round-trip tests lean on.

use crate::ast::*;

pub fn print_block(block: &Block) -> String {
    let mut out = String::new();
    for stmt in &block.statements {
        print_stmt(stmt, &mut out, 0);
    }
    out
}

fn indent(out: &mut String, depth: usize) {
    for _ in 0..depth {
        out.push_str("    ");
    }
}

fn print_stmt(stmt: &Stmt, out: &mut String, depth: usize) {
    indent(out, depth);
    if stmt.is_public {
        out.push_str("pub ");
    }
    match &stmt.kind {
        StmtKind::Expression(expr) => {
            print_expr(expr, out);
            out.push_str(";\n");
        }
        StmtKind::Let(let_stmt) => {
            out.push_str("let ");
            out.push_str(&let_stmt.name);
            if let Some(ty) = &let_stmt.ty {
                out.push_str(": ");
                out.push_str(ty);
            }
            if let Some(value) = &let_stmt.value {
                out.push_str(" := ");
                print_expr(value, out);
            }
            out.push_str(";\n");
        }
        StmtKind::Function(def) => {
            print_function_def(def, out);
            out.push('\n');
        }
        StmtKind::If(if_stmt) => {
            out.push_str("if (");
            print_expr(&if_stmt.condition, out);
            out.push_str(") {\n");
            print_block_body(&if_stmt.then_branch, out, depth + 1);
            indent(out, depth);
            out.push('}');
            if let Some(else_branch) = &if_stmt.else_branch {
                out.push_str(" else {\n");
                print_block_body(else_branch, out, depth + 1);
                indent(out, depth);
                out.push('}');
            }
            out.push('\n');
        }
        StmtKind::Loop(loop_stmt) => {
            if let Some(cond) = &loop_stmt.condition {
                out.push_str("while (");
                print_expr(cond, out);
                out.push_str(") {\n");
            } else {
                out.push_str("loop {\n");
            }
            print_block_body(&loop_stmt.body, out, depth + 1);
            indent(out, depth);
            out.push_str("}\n");
        }
        StmtKind::Return(value) => {
            out.push_str("ret");
            if let Some(v) = value {
                out.push(' ');
                print_expr(v, out);
            }
            out.push_str(";\n");
        }
        StmtKind::Halt(value) => {
            out.push_str("halt");
            if let Some(v) = value {
                out.push(' ');
                print_expr(v, out);
            }
            out.push_str(";\n");
        }
        StmtKind::Break => out.push_str("break;\n"),
        StmtKind::Continue => out.push_str("continue;\n"),
        StmtKind::Module(module) => {
            out.push_str("mod ");
            out.push_str(&module.name);
            match &module.items {
                Some(items) => {
                    out.push_str(" {\n");
                    for item in items {
                        print_stmt(item, out, depth + 1);
                    }
                    indent(out, depth);
                    out.push_str("}\n");
                }
                None => out.push_str(";\n"),
            }
        }
        StmtKind::Use(use_stmt) => {
            out.push_str("use ");
            out.push_str(&use_stmt.segments.join("::"));
            if use_stmt.glob {
                out.push_str("::*");
            } else if !use_stmt.group.is_empty() {
                out.push_str("::{");
                let rendered: Vec<String> = use_stmt
                    .group
                    .iter()
                    .map(|item| match &item.alias {
                        Some(alias) => format!("{} as {}", item.name, alias),
                        None => item.name.clone(),
                    })
                    .collect();
                out.push_str(&rendered.join(", "));
                out.push('}');
            }
            if let Some(alias) = &use_stmt.alias {
                out.push_str(" as ");
                out.push_str(alias);
            }
            out.push_str(";\n");
        }
    }
}

fn print_block_body(block: &Block, out: &mut String, depth: usize) {
    for stmt in &block.statements {
        print_stmt(stmt, out, depth);
    }
}

fn print_function_def(def: &FunctionDef, out: &mut String) {
    out.push_str(&def.name);
    out.push_str(" <=> fn(");
    out.push_str(&def.params.join(", "));
    out.push(')');
    if let Some(ret) = &def.return_type {
        out.push_str(" -> ");
        out.push_str(ret);
    }
    out.push_str(" {\n");
    print_block_body(&def.body, out, 1);
    out.push('}');
}

fn print_expr(expr: &Expr, out: &mut String) {
    match &*expr.kind {
        ExprKind::Literal(lit) => print_literal(lit, out),
        ExprKind::Identifier(name) => out.push_str(name),
        ExprKind::Binary { symbol, left, right, .. } => {
            out.push('(');
            print_expr(left, out);
            out.push(' ');
            out.push_str(symbol);
            out.push(' ');
            print_expr(right, out);
            out.push(')');
        }
        ExprKind::Unary { symbol, operand, .. } => {
            out.push('(');
            out.push_str(symbol);
            out.push('(');
            print_expr(operand, out);
            out.push_str("))");
        }
        ExprKind::Ternary { cond, then_branch, else_branch } => {
            out.push('(');
            print_expr(cond, out);
            out.push_str(" ? ");
            print_expr(then_branch, out);
            out.push_str(" : ");
            print_expr(else_branch, out);
            out.push(')');
        }
        ExprKind::Call { callee, args } => {
            print_expr(callee, out);
            out.push('(');
            for (i, arg) in args.iter().enumerate() {
                if i > 0 {
                    out.push_str(", ");
                }
                print_expr(arg, out);
            }
            out.push(')');
        }
        ExprKind::Index { base, index } => {
            print_expr(base, out);
            out.push('[');
            print_expr(index, out);
            out.push(']');
        }
        ExprKind::Deref { operand } => {
            out.push_str("(*");
            print_expr(operand, out);
            out.push(')');
        }
        ExprKind::Assignment { symbol, target, value, .. } => {
            print_expr(target, out);
            out.push(' ');
            out.push_str(symbol);
            out.push(' ');
            print_expr(value, out);
        }
        ExprKind::MultiAssignment { targets, value } => {
            for (i, target) in targets.iter().enumerate() {
                if i > 0 {
                    out.push_str(", ");
                }
                print_expr(target, out);
            }
            out.push_str(" := ");
            print_expr(value, out);
        }
        ExprKind::Conditional { cond, then_branch, else_branch } => {
            out.push_str("?(");
            print_expr(cond, out);
            out.push_str(") -> ");
            print_expr(then_branch, out);
            if let Some(else_branch) = else_branch {
                out.push_str(" else ");
                print_expr(else_branch, out);
            }
        }
        ExprKind::FunctionDef(def) => print_function_def(def, out),
        ExprKind::MemoryOp { symbol, args, .. } | ExprKind::AtomicOp { symbol, args, .. } | ExprKind::SyscallOp { symbol, args, .. } => {
            out.push_str(symbol);
            out.push('(');
            for (i, arg) in args.iter().enumerate() {
                if i > 0 {
                    out.push_str(", ");
                }
                print_expr(arg, out);
            }
            out.push(')');
        }
        ExprKind::InlineAsm(asm) => {
            out.push_str("asm% \"");
            out.push_str(&asm.template);
            out.push('"');
        }
    }
}

fn print_literal(lit: &Literal, out: &mut String) {
    match lit {
        Literal::Int(big) => {
            if big.fits_u64() {
                out.push_str(&big.limbs.first().copied().unwrap_or(0).to_string());
            } else {
                // `limbs` is little-endian; print most-significant limb
                // first unpadded, then every lower limb zero-padded to a
                // full 64 bits, or a middle limb of all zeros would vanish
                // from the printed digit string instead of holding its place.
                out.push_str("0x");
                let mut limbs = big.limbs.iter().rev();
                if let Some(top) = limbs.next() {
                    out.push_str(&format!("{top:x}"));
                }
                for limb in limbs {
                    out.push_str(&format!("{limb:016x}"));
                }
            }
        }
        Literal::Float(f) => out.push_str(&f.to_string()),
        Literal::Str(s) => {
            out.push('"');
            out.push_str(s);
            out.push('"');
        }
        Literal::Char(c) => {
            out.push('\'');
            out.push(*c);
            out.push('\'');
        }
        Literal::Bool(b) => out.push_str(if *b { "true" } else { "false" }),
    }
}
