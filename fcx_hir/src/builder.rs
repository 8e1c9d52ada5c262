//! Recursive AST walk that builds an [`HirModule`] (§4.5): "expressions emit
//! instructions that compute into a freshly allocated vreg; statements
//! control block structure." Not an SSA builder — a `let`-bound name simply
//! tracks whichever vreg currently holds its value, rebound on assignment;
//! the per-function vreg counter stays monotonic either way, which is all
//! §3's invariants require.

use crate::cpu_features::CpuFeatures;
use crate::function::HirFunction;
use crate::instruction::{HirOp, Instruction};
use crate::module::HirModule;
use crate::operand::{BlockId, Operand, VregId};
use crate::types::TypeClass;
use fcx_common::{FcxError, Span};
use fcx_parser::ast::{self, Expr, ExprKind, Literal, Stmt, StmtKind};
use fcx_registry::OperatorKind;
use hashbrown::HashMap;

/// Builds an [`HirModule`] from a parsed top-level block. Nested function
/// definitions (`name <=> fn(...) { ... }`, as both a statement and an
/// expression) are flattened into sibling module functions; there are no
/// closures in FCx's operator model.
pub fn build_module(name: &str, block: &ast::Block) -> Result<HirModule, FcxError> {
    let mut module = HirModule::new(name);
    module.cpu_features = CpuFeatures::default();
    let mut top = TopState::default();
    for stmt in &block.statements {
        build_top_level_stmt(&mut module, &mut top, stmt)?;
    }
    if let Some(init) = module.functions.iter_mut().find(|f| f.name == "__init__") {
        let current = top.current.expect("__init__ always gets an entry block once built");
        if !init.block(current).has_terminator() {
            init.block_mut(current).push(Instruction::new(HirOp::Return).with_operands(vec![Operand::ImmInt(0)]));
        }
    }
    Ok(module)
}

#[derive(Default, Clone)]
struct Scope {
    vars: HashMap<String, VregId>,
}

/// Threads the implicit `__init__` function's current block and variable
/// scope across successive top-level statements, since each one needs to
/// keep building where the previous one left off rather than restarting at
/// the entry block every time.
#[derive(Default)]
struct TopState {
    scope: Scope,
    current: Option<BlockId>,
}

struct FunctionBuilder<'m> {
    module: &'m mut HirModule,
    func: HirFunction,
    current: BlockId,
    scopes: Vec<Scope>,
    /// (loop header block, loop exit block) stack for `break`/`continue`.
    loops: Vec<(BlockId, BlockId)>,
}

fn build_top_level_stmt(module: &mut HirModule, top: &mut TopState, stmt: &Stmt) -> Result<(), FcxError> {
    match &stmt.kind {
        StmtKind::Function(def) => {
            build_function(module, def)?;
        }
        StmtKind::Module(m) => {
            if let Some(items) = &m.items {
                for item in items {
                    build_top_level_stmt(module, top, item)?;
                }
            }
        }
        StmtKind::Use(_) => {
            // Recorded by the preprocessor/driver layer's module resolution, not HIR.
        }
        StmtKind::Let(_)
        | StmtKind::Expression(_)
        | StmtKind::If(_)
        | StmtKind::Loop(_)
        | StmtKind::Return(_)
        | StmtKind::Halt(_)
        | StmtKind::Break
        | StmtKind::Continue => {
            // A bare top-level statement outside any function is folded into an
            // implicit module initializer, mirroring how the teacher's interpreter
            // treats a bare top-level statement list. `top.current` carries the
            // block the previous top-level statement left off on, so an `if`/
            // `loop` spanning several statements still links up correctly.
            let exists = module.get_function("__init__").is_some();
            if !exists {
                module.add_function(HirFunction::new("__init__", TypeClass::Void));
            }
            let idx = module.functions.iter().position(|f| f.name == "__init__").unwrap();
            let mut func = module.functions.remove(idx);
            if func.blocks.is_empty() {
                func.new_block("entry");
            }
            let current = top.current.unwrap_or_else(|| func.entry_block.unwrap());
            let mut fb = FunctionBuilder { module: &mut *module, func, current, scopes: vec![top.scope.clone()], loops: Vec::new() };
            if !fb.func.block(fb.current).has_terminator() {
                fb.build_stmt(stmt)?;
            }
            top.scope.vars = fb.scopes[0].vars.clone();
            top.current = Some(fb.current);
            let built_func = fb.func;
            module.add_function(built_func);
        }
        _ => {
            return Err(FcxError::lowering("statement not valid at module scope", stmt.span));
        }
    }
    Ok(())
}

fn build_function(module: &mut HirModule, def: &ast::FunctionDef) -> Result<(), FcxError> {
    let return_type = def.return_type.as_deref().and_then(TypeClass::from_name).unwrap_or(TypeClass::I64);
    let mut func = HirFunction::new(def.name.clone(), return_type);
    let entry = func.new_block("entry");
    let mut scope = Scope::default();
    for param in &def.params {
        let vreg = func.add_param(param.clone(), TypeClass::I64);
        scope.vars.insert(param.clone(), vreg);
    }
    let mut fb = FunctionBuilder { module: &mut *module, func, current: entry, scopes: vec![scope], loops: Vec::new() };
    for stmt in &def.body.statements {
        fb.build_stmt(stmt)?;
    }
    // Functions whose body falls off the end without a `ret` get an implicit
    // `ret` of the zero value, matching the teacher's "no naked fall-through" rule.
    if !fb.func.block(fb.current).has_terminator() {
        fb.emit(Instruction::new(HirOp::Return).with_operands(vec![Operand::ImmInt(0)]));
    }
    let built_func = fb.func;
    module.add_function(built_func);
    Ok(())
}

impl<'m> FunctionBuilder<'m> {
    fn emit(&mut self, instr: Instruction) {
        self.func.block_mut(self.current).push(instr);
    }

    fn lookup(&self, name: &str) -> Option<VregId> {
        self.scopes.iter().rev().find_map(|s| s.vars.get(name).copied())
    }

    fn bind(&mut self, name: &str, vreg: VregId) {
        self.scopes.last_mut().expect("at least one scope").vars.insert(name.to_string(), vreg);
    }

    fn push_scope(&mut self) {
        self.scopes.push(Scope::default());
    }

    fn pop_scope(&mut self) {
        self.scopes.pop();
    }

    fn switch_to(&mut self, block: BlockId) {
        self.current = block;
    }

    fn build_stmt(&mut self, stmt: &Stmt) -> Result<(), FcxError> {
        match &stmt.kind {
            StmtKind::Expression(expr) => {
                self.build_expr(expr)?;
            }
            StmtKind::Let(let_stmt) => {
                let value = match &let_stmt.value {
                    Some(v) => self.build_expr(v)?,
                    None => self.materialize(Operand::ImmInt(0), TypeClass::I64),
                };
                self.bind(&let_stmt.name, value);
            }
            StmtKind::Function(def) => {
                build_function(self.module, def)?;
            }
            StmtKind::If(if_stmt) => self.build_if(if_stmt)?,
            StmtKind::Loop(loop_stmt) => self.build_loop(loop_stmt)?,
            StmtKind::Return(value) => {
                let operand = match value {
                    Some(v) => Operand::Vreg(self.build_expr(v)?),
                    None => Operand::ImmInt(0),
                };
                self.emit(Instruction::new(HirOp::Return).with_operands(vec![operand]).with_span(stmt.span));
            }
            StmtKind::Halt(value) => {
                let operand = match value {
                    Some(v) => Operand::Vreg(self.build_expr(v)?),
                    None => Operand::ImmInt(0),
                };
                self.emit(Instruction::new(HirOp::Halt).with_operands(vec![operand]).with_span(stmt.span));
            }
            StmtKind::Break => {
                let (_, exit) = *self.loops.last().ok_or_else(|| FcxError::lowering("break outside loop", stmt.span))?;
                self.emit(Instruction::new(HirOp::Jump).with_targets(vec![exit]));
            }
            StmtKind::Continue => {
                let (header, _) = *self.loops.last().ok_or_else(|| FcxError::lowering("continue outside loop", stmt.span))?;
                self.emit(Instruction::new(HirOp::Jump).with_targets(vec![header]));
            }
            StmtKind::Module(m) => {
                if let Some(items) = &m.items {
                    for item in items {
                        self.build_stmt(item)?;
                    }
                }
            }
            StmtKind::Use(_) => {}
        }
        Ok(())
    }

    fn build_if(&mut self, if_stmt: &ast::IfStmt) -> Result<(), FcxError> {
        let cond = self.build_expr(&if_stmt.condition)?;
        let then_block = self.func.new_block("if.then");
        let else_block = self.func.new_block("if.else");
        let merge_block = self.func.new_block("if.merge");
        self.emit(
            Instruction::new(HirOp::BranchIfNonZero)
                .with_operands(vec![Operand::Vreg(cond)])
                .with_targets(vec![then_block, else_block]),
        );
        self.func.link(self.current, then_block);
        self.func.link(self.current, else_block);

        self.switch_to(then_block);
        self.push_scope();
        for stmt in &if_stmt.then_branch.statements {
            self.build_stmt(stmt)?;
        }
        self.pop_scope();
        if !self.func.block(self.current).has_terminator() {
            self.emit(Instruction::new(HirOp::Jump).with_targets(vec![merge_block]));
            self.func.link(self.current, merge_block);
        }

        self.switch_to(else_block);
        self.push_scope();
        if let Some(else_branch) = &if_stmt.else_branch {
            for stmt in &else_branch.statements {
                self.build_stmt(stmt)?;
            }
        }
        self.pop_scope();
        if !self.func.block(self.current).has_terminator() {
            self.emit(Instruction::new(HirOp::Jump).with_targets(vec![merge_block]));
            self.func.link(self.current, merge_block);
        }

        self.switch_to(merge_block);
        Ok(())
    }

    fn build_loop(&mut self, loop_stmt: &ast::LoopStmt) -> Result<(), FcxError> {
        let header = self.func.new_block("loop.header");
        let body = self.func.new_block("loop.body");
        let exit = self.func.new_block("loop.exit");

        self.emit(Instruction::new(HirOp::Jump).with_targets(vec![header]));
        self.func.link(self.current, header);

        self.switch_to(header);
        match &loop_stmt.condition {
            Some(cond_expr) => {
                let cond = self.build_expr(cond_expr)?;
                self.emit(
                    Instruction::new(HirOp::BranchIfNonZero)
                        .with_operands(vec![Operand::Vreg(cond)])
                        .with_targets(vec![body, exit]),
                );
            }
            None => {
                self.emit(Instruction::new(HirOp::Jump).with_targets(vec![body]));
            }
        }
        self.func.link(header, body);
        self.func.link(header, exit);

        self.loops.push((header, exit));
        self.switch_to(body);
        self.push_scope();
        for stmt in &loop_stmt.body.statements {
            self.build_stmt(stmt)?;
        }
        self.pop_scope();
        if !self.func.block(self.current).has_terminator() {
            self.emit(Instruction::new(HirOp::Jump).with_targets(vec![header]));
            self.func.link(self.current, header);
        }
        self.loops.pop();

        self.switch_to(exit);
        Ok(())
    }

    fn materialize(&mut self, operand: Operand, ty: TypeClass) -> VregId {
        let result = self.func.new_vreg();
        self.emit(Instruction::new(HirOp::Move).with_operands(vec![operand]).with_result(result, ty));
        result
    }

    fn build_expr(&mut self, expr: &Expr) -> Result<VregId, FcxError> {
        match &*expr.kind {
            ExprKind::Literal(lit) => Ok(self.build_literal(lit)),
            ExprKind::Identifier(name) => self
                .lookup(name)
                .ok_or_else(|| FcxError::lowering(format!("use of undeclared name '{name}'"), expr.span)),
            ExprKind::Binary { op, left, right, .. } => self.build_binary(*op, left, right, expr.span),
            ExprKind::Unary { op, operand, .. } => self.build_unary(*op, operand, expr.span),
            ExprKind::Ternary { cond, then_branch, else_branch } => {
                self.build_ternary(cond, then_branch, else_branch, expr.span)
            }
            ExprKind::Call { callee, args } => self.build_call(callee, args, expr.span),
            ExprKind::Index { base, index } => self.build_index(base, index, expr.span),
            ExprKind::Deref { operand } => self.build_deref(operand, expr.span),
            ExprKind::Assignment { op, target, value, .. } => self.build_assignment(*op, target, value, expr.span),
            ExprKind::MultiAssignment { targets, value } => self.build_multi_assignment(targets, value, expr.span),
            ExprKind::Conditional { cond, then_branch, else_branch } => {
                self.build_ternary(cond, then_branch, else_branch.as_ref().unwrap_or(then_branch), expr.span)
            }
            ExprKind::FunctionDef(def) => {
                build_function(self.module, def)?;
                let id = self.module.intern_external(&def.name);
                Ok(self.materialize(Operand::External(id), TypeClass::Ptr(Box::new(TypeClass::Void))))
            }
            ExprKind::MemoryOp { op, args, .. } | ExprKind::AtomicOp { op, args, .. } | ExprKind::SyscallOp { op, args, .. } => {
                self.build_operator_call(*op, args, expr.span)
            }
            ExprKind::InlineAsm(asm) => self.build_inline_asm(asm, expr.span),
        }
    }

    fn build_literal(&mut self, lit: &Literal) -> VregId {
        match lit {
            Literal::Int(big) => {
                if big.fits_u64() {
                    self.materialize(Operand::ImmInt(big.limbs.first().copied().unwrap_or(0) as i64), TypeClass::I64)
                } else {
                    self.materialize(Operand::BigImm(big.clone()), TypeClass::I1024)
                }
            }
            Literal::Float(f) => self.materialize(Operand::ImmFloat(*f), TypeClass::F64),
            Literal::Str(s) => {
                let idx = self.module.intern_string(s);
                self.materialize(Operand::StringRef(idx), TypeClass::Ptr(Box::new(TypeClass::U8)))
            }
            Literal::Char(c) => self.materialize(Operand::ImmInt(*c as i64), TypeClass::I8),
            Literal::Bool(b) => self.materialize(Operand::ImmBool(*b), TypeClass::Bool),
        }
    }

    fn build_binary(&mut self, op: OperatorKind, left: &Expr, right: &Expr, span: Span) -> Result<VregId, FcxError> {
        let lhs = self.build_expr(left)?;
        let rhs = self.build_expr(right)?;
        let result = self.func.new_vreg();
        self.emit(
            Instruction::new(HirOp::Operator(op))
                .with_operands(vec![Operand::Vreg(lhs), Operand::Vreg(rhs)])
                .with_result(result, TypeClass::I64)
                .with_span(span),
        );
        Ok(result)
    }

    fn build_unary(&mut self, op: OperatorKind, operand: &Expr, span: Span) -> Result<VregId, FcxError> {
        let value = self.build_expr(operand)?;
        let result = self.func.new_vreg();
        self.emit(
            Instruction::new(HirOp::Operator(op))
                .with_operands(vec![Operand::Vreg(value)])
                .with_result(result, TypeClass::I64)
                .with_span(span),
        );
        Ok(result)
    }

    fn build_ternary(&mut self, cond: &Expr, then_branch: &Expr, else_branch: &Expr, span: Span) -> Result<VregId, FcxError> {
        let cond_vreg = self.build_expr(cond)?;
        let then_block = self.func.new_block("ternary.then");
        let else_block = self.func.new_block("ternary.else");
        let merge_block = self.func.new_block("ternary.merge");
        let result = self.func.new_vreg();

        self.emit(
            Instruction::new(HirOp::BranchIfNonZero)
                .with_operands(vec![Operand::Vreg(cond_vreg)])
                .with_targets(vec![then_block, else_block])
                .with_span(span),
        );
        self.func.link(self.current, then_block);
        self.func.link(self.current, else_block);

        self.switch_to(then_block);
        let then_value = self.build_expr(then_branch)?;
        self.emit(Instruction::new(HirOp::Move).with_operands(vec![Operand::Vreg(then_value)]).with_result(result, TypeClass::I64));
        self.emit(Instruction::new(HirOp::Jump).with_targets(vec![merge_block]));
        self.func.link(self.current, merge_block);

        self.switch_to(else_block);
        let else_value = self.build_expr(else_branch)?;
        self.emit(Instruction::new(HirOp::Move).with_operands(vec![Operand::Vreg(else_value)]).with_result(result, TypeClass::I64));
        self.emit(Instruction::new(HirOp::Jump).with_targets(vec![merge_block]));
        self.func.link(self.current, merge_block);

        self.switch_to(merge_block);
        Ok(result)
    }

    fn build_call(&mut self, callee: &Expr, args: &[Expr], span: Span) -> Result<VregId, FcxError> {
        let arg_vregs: Vec<Operand> =
            args.iter().map(|a| self.build_expr(a).map(Operand::Vreg)).collect::<Result<_, _>>()?;
        let ExprKind::Identifier(name) = &*callee.kind else {
            return Err(FcxError::lowering("indirect calls are not supported by this pipeline stage", span));
        };
        let result = self.func.new_vreg();
        if self.module.get_function(name).is_some() || *name == self.func.name {
            let mut operands = vec![Operand::StringRef(self.module.intern_string(name))];
            operands.extend(arg_vregs);
            self.emit(Instruction::new(HirOp::Call).with_operands(operands).with_result(result, TypeClass::I64).with_span(span));
        } else {
            let id = self.module.intern_external(name);
            let mut operands = vec![Operand::External(id)];
            operands.extend(arg_vregs);
            self.emit(Instruction::new(HirOp::CallExternal).with_operands(operands).with_result(result, TypeClass::I64).with_span(span));
        }
        Ok(result)
    }

    fn build_index(&mut self, base: &Expr, index: &Expr, span: Span) -> Result<VregId, FcxError> {
        let base_vreg = self.build_expr(base)?;
        let index_vreg = self.build_expr(index)?;
        let addr = self.func.new_vreg();
        self.emit(
            Instruction::new(HirOp::Operator(OperatorKind::Add))
                .with_operands(vec![Operand::Vreg(base_vreg), Operand::Vreg(index_vreg)])
                .with_result(addr, TypeClass::Ptr(Box::new(TypeClass::I64)))
                .with_span(span),
        );
        let result = self.func.new_vreg();
        self.emit(
            Instruction::new(HirOp::Operator(OperatorKind::AtomicRead))
                .with_operands(vec![Operand::Memory { base: addr, offset: 0 }])
                .with_result(result, TypeClass::I64)
                .with_span(span),
        );
        Ok(result)
    }

    fn build_deref(&mut self, operand: &Expr, span: Span) -> Result<VregId, FcxError> {
        let ptr = self.build_expr(operand)?;
        let result = self.func.new_vreg();
        self.emit(
            Instruction::new(HirOp::Operator(OperatorKind::AtomicRead))
                .with_operands(vec![Operand::Memory { base: ptr, offset: 0 }])
                .with_result(result, TypeClass::I64)
                .with_span(span),
        );
        Ok(result)
    }

    fn build_assignment(&mut self, op: OperatorKind, target: &Expr, value: &Expr, span: Span) -> Result<VregId, FcxError> {
        let ExprKind::Identifier(name) = &*target.kind else {
            return Err(FcxError::lowering("assignment target must be a name", span));
        };
        let rhs = self.build_expr(value)?;
        let new_value = if op == OperatorKind::Assign {
            rhs
        } else {
            let current = self
                .lookup(name)
                .ok_or_else(|| FcxError::lowering(format!("assignment to undeclared name '{name}'"), span))?;
            let result = self.func.new_vreg();
            self.emit(
                Instruction::new(HirOp::Operator(op))
                    .with_operands(vec![Operand::Vreg(current), Operand::Vreg(rhs)])
                    .with_result(result, TypeClass::I64)
                    .with_span(span),
            );
            result
        };
        self.bind(name, new_value);
        Ok(new_value)
    }

    fn build_multi_assignment(&mut self, targets: &[Expr], value: &Expr, span: Span) -> Result<VregId, FcxError> {
        let rhs = self.build_expr(value)?;
        for target in targets {
            let ExprKind::Identifier(name) = &*target.kind else {
                return Err(FcxError::lowering("multi-assignment target must be a name", span));
            };
            self.bind(name, rhs);
        }
        Ok(rhs)
    }

    fn build_operator_call(&mut self, op: OperatorKind, args: &[Expr], span: Span) -> Result<VregId, FcxError> {
        let operands: Vec<Operand> =
            args.iter().map(|a| self.build_expr(a).map(Operand::Vreg)).collect::<Result<_, _>>()?;
        let result = self.func.new_vreg();
        self.emit(
            Instruction::new(HirOp::Operator(op))
                .with_operands(operands)
                .with_result(result, TypeClass::I64)
                .with_span(span),
        );
        Ok(result)
    }

    fn build_inline_asm(&mut self, asm: &ast::InlineAsm, span: Span) -> Result<VregId, FcxError> {
        let template_ref = self.module.intern_string(&asm.template);
        let mut operands = vec![Operand::StringRef(template_ref)];
        for input in &asm.inputs {
            operands.push(Operand::Vreg(self.build_expr(&input.value)?));
        }
        let result = self.func.new_vreg();
        self.emit(
            Instruction::new(HirOp::Operator(OperatorKind::InlineAsm))
                .with_operands(operands)
                .with_result(result, TypeClass::I64)
                .with_span(span),
        );
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fcx_parser::parser::parse;

    fn build(src: &str) -> HirModule {
        let tokens = fcx_lexer::lex(src, 0).expect("lex failed");
        let (block, errors) = parse(tokens);
        assert!(errors.is_empty(), "parse errors: {errors:?}");
        build_module("test", &block).expect("build failed")
    }

    #[test]
    fn simple_function_lowers_to_one_block_per_branch() {
        let module = build("add <=> fn(a, b) -> ret a + b;");
        let func = module.get_function("add").expect("function add");
        assert_eq!(func.params.len(), 2);
        assert!(func.blocks.len() >= 1);
    }

    #[test]
    fn if_else_creates_four_blocks() {
        let module = build(
            r#"
            classify <=> fn(n) {
                if (n < 0) {
                    ret 0;
                } else {
                    ret 1;
                }
            }
            "#,
        );
        let func = module.get_function("classify").unwrap();
        assert_eq!(func.blocks.len(), 4);
    }

    #[test]
    fn leaf_function_has_no_calls() {
        let module = build("seven <=> fn() -> ret 7;");
        let func = module.get_function("seven").unwrap();
        assert!(func.is_leaf());
    }

    #[test]
    fn atomic_fetch_add_keeps_operator_kind() {
        let module = build("bump <=> fn(counter) -> ret counter +% 1;");
        let func = module.get_function("bump").unwrap();
        let found = func.blocks.iter().flat_map(|b| &b.instructions).any(|i| {
            matches!(&i.op, HirOp::Operator(OperatorKind::FetchAdd))
        });
        assert!(found, "expected a FetchAdd HIR instruction");
    }
}
