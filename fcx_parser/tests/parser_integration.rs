use fcx_parser::ast::{ExprKind, Literal, StmtKind};
use fcx_parser::parser::parse;

fn parse_source(src: &str) -> fcx_parser::ast::Block {
    let tokens = fcx_lexer::lex(src, 0).expect("lex failed");
    let (block, errors) = parse(tokens);
    assert!(errors.is_empty(), "unexpected parse errors: {errors:?}");
    block
}

#[test]
fn recursive_function_with_compact_if_base_case() {
    let block = parse_source(
        r#"
        factorial <=> fn(n) -> ret 1;
        "#,
    );
    assert_eq!(block.statements.len(), 1);
    assert!(matches!(block.statements[0].kind, StmtKind::Function(_)));
}

#[test]
fn nested_if_else_chain() {
    let block = parse_source(
        r#"
        classify <=> fn(n) {
            ?(n < 0) -> ret 0;
            if (n == 0) {
                ret 1;
            } else {
                ret 2;
            }
        }
        "#,
    );
    let StmtKind::Function(def) = &block.statements[0].kind else { panic!("expected function") };
    assert_eq!(def.body.statements.len(), 2);
    assert!(matches!(def.body.statements[1].kind, StmtKind::If(ref if_stmt) if if_stmt.else_branch.is_some()));
}

#[test]
fn atomic_fetch_add_parses_as_atomic_op() {
    let block = parse_source("let old := counter +% 1;");
    let StmtKind::Let(let_stmt) = &block.statements[0].kind else { panic!("expected let") };
    assert!(matches!(let_stmt.value.as_ref().unwrap().kind.as_ref(), ExprKind::Binary { .. }));
}

#[test]
fn shift_left_outside_syscall_context_stays_arithmetic() {
    let block = parse_source("let x := a << 2;");
    let StmtKind::Let(let_stmt) = &block.statements[0].kind else { panic!("expected let") };
    match let_stmt.value.as_ref().unwrap().kind.as_ref() {
        ExprKind::Binary { op, .. } => assert_eq!(*op, fcx_registry::OperatorKind::ShiftLeft),
        other => panic!("expected binary shift, got {other:?}"),
    }
}

#[test]
fn memory_allocation_call_form() {
    let block = parse_source("let buf := heap>(1024);");
    let StmtKind::Let(let_stmt) = &block.statements[0].kind else { panic!("expected let") };
    assert!(matches!(let_stmt.value.as_ref().unwrap().kind.as_ref(), ExprKind::MemoryOp { .. }));
}

#[test]
fn module_with_nested_use_and_function() {
    let block = parse_source(
        r#"
        mod math {
            use std::ops::{add, sub};
            square <=> fn(x) -> ret x * x;
        }
        "#,
    );
    let StmtKind::Module(module) = &block.statements[0].kind else { panic!("expected module") };
    let items = module.items.as_ref().expect("expected inline module body");
    assert_eq!(items.len(), 2);
    assert!(matches!(items[0].kind, StmtKind::Use(_)));
    assert!(matches!(items[1].kind, StmtKind::Function(_)));
}

#[test]
fn float_literal_round_trips() {
    let block = parse_source("let pi := 3.25;");
    let StmtKind::Let(let_stmt) = &block.statements[0].kind else { panic!("expected let") };
    assert!(matches!(let_stmt.value.as_ref().unwrap().kind.as_ref(), ExprKind::Literal(Literal::Float(v)) if (*v - 3.25).abs() < f64::EPSILON));
}
