//! The unified block construct.
//!
//! One `{ … }` analyzer serves function bodies, statement blocks and
//! expression blocks; the pushed [`BlockContext`] decides what `return`
//! and `->` mean inside. Scope discipline is unconditional: enter on the
//! way in, exit on the way out, diagnostics or not.

use hexen_language::ast::{Expr, Stmt};

use crate::analyzer::{expr_hint, BlockContext, SemanticAnalyzer};
use crate::diagnostics::DiagnosticKind;
use crate::scope::SymbolInfo;
use crate::types::Type;

impl SemanticAnalyzer {
    pub(crate) fn analyze_block(
        &mut self,
        statements: &[Stmt],
        ctx: BlockContext,
        target: Option<&Type>,
    ) -> Type {
        self.analyze_block_with_bindings(statements, ctx, target, Vec::new())
    }

    /// Blocks that pre-declare names in their scope - function bodies bind
    /// parameters, `for-in` bodies bind the loop variable.
    pub(crate) fn analyze_block_with_bindings(
        &mut self,
        statements: &[Stmt],
        ctx: BlockContext,
        target: Option<&Type>,
        bindings: Vec<SymbolInfo>,
    ) -> Type {
        self.contexts.push(ctx);
        self.symbols.enter_scope();

        for binding in bindings {
            let name = self.interner.resolve(binding.name).to_string();
            if !self.symbols.declare(binding) {
                self.error(
                    DiagnosticKind::Redeclaration,
                    format!("Variable '{}' already declared in this scope", name),
                );
            }
        }

        let result = match ctx {
            BlockContext::Expression => self.analyze_expression_block(statements, target),
            _ => {
                for stmt in statements {
                    self.analyze_statement(stmt);
                }
                Type::Void
            }
        };

        self.symbols.exit_scope();
        self.contexts.pop();
        result
    }

    /// Expression blocks must end with `-> expr` (the block's value) or a
    /// `return` (early function exit, the value comes from the target).
    fn analyze_expression_block(&mut self, statements: &[Stmt], target: Option<&Type>) -> Type {
        let (last, init) = match statements.split_last() {
            Some(split) => split,
            None => {
                self.error(
                    DiagnosticKind::ExpressionBlockMissingAssign,
                    "Expression block must produce a value with '-> expr'",
                );
                return Type::Unknown;
            }
        };

        for stmt in init {
            self.analyze_statement(stmt);
        }

        match last {
            Stmt::AssignStatement { value } => self.analyze_expr(value, target),
            Stmt::ReturnStatement { .. } => {
                self.analyze_statement(last);
                target.cloned().unwrap_or(Type::Unknown)
            }
            other => {
                self.analyze_statement(other);
                self.error(
                    DiagnosticKind::ExpressionBlockMissingAssign,
                    "Expression block must end with '-> expr' or 'return'",
                );
                Type::Unknown
            }
        }
    }

    /// An `->` statement reached through generic statement dispatch - i.e.
    /// not as the tail of an expression block. Inside a producing loop it
    /// yields one element; anywhere else it is misplaced. The nearest
    /// Expression or Function context decides before any Statement or
    /// non-producing loop body in between.
    pub(crate) fn analyze_loose_assign(&mut self, value: &Expr) {
        let mut role = LooseAssignRole::Misplaced;
        for ctx in self.contexts.iter().rev() {
            match ctx {
                BlockContext::Expression => {
                    role = LooseAssignRole::NotLastInExpressionBlock;
                    break;
                }
                BlockContext::LoopBody { producing: true } => {
                    role = LooseAssignRole::LoopYield;
                    break;
                }
                BlockContext::Function => break,
                BlockContext::Statement | BlockContext::LoopBody { producing: false } => {}
            }
        }

        match role {
            LooseAssignRole::LoopYield => self.yield_loop_element_checked(value),
            LooseAssignRole::NotLastInExpressionBlock => {
                self.analyze_expr(value, None);
                self.error(
                    DiagnosticKind::AssignOutsideExpressionBlock,
                    "'->' must be the final statement of an expression block",
                );
            }
            LooseAssignRole::Misplaced => {
                self.analyze_expr(value, None);
                self.error(
                    DiagnosticKind::AssignOutsideExpressionBlock,
                    "'->' outside of an expression block",
                );
            }
        }
    }

    fn yield_loop_element_checked(&mut self, value: &Expr) {
        let idx = match self.loops.iter().rposition(|frame| frame.producing) {
            Some(idx) => idx,
            None => {
                self.error(
                    DiagnosticKind::InternalError,
                    "internal error: producing loop context without a loop frame",
                );
                self.analyze_expr(value, None);
                return;
            }
        };
        let element_target = self.loops[idx].element_target.clone();
        let ty = self.analyze_expr(value, element_target.as_ref());
        match element_target {
            Some(t) => {
                self.coerce_with_context(&ty, &t, "loop element", Some(expr_hint(value)));
            }
            None => self.loops[idx].yielded.push(ty),
        }
    }
}

enum LooseAssignRole {
    LoopYield,
    NotLastInExpressionBlock,
    Misplaced,
}

/// Syntactic all-paths-return: a statement list guarantees a return when
/// any of its statements does; a conditional guarantees one only with a
/// final `else` and every branch returning. Loops never guarantee.
pub(crate) fn always_returns(statements: &[Stmt]) -> bool {
    statements.iter().any(stmt_always_returns)
}

fn stmt_always_returns(stmt: &Stmt) -> bool {
    match stmt {
        Stmt::ReturnStatement { .. } => true,
        Stmt::Block { statements } => always_returns(statements),
        Stmt::ConditionalStatement {
            if_branch,
            else_clauses,
            ..
        } => {
            let has_final_else = else_clauses
                .last()
                .map(|clause| clause.condition.is_none())
                .unwrap_or(false);
            has_final_else
                && always_returns(&if_branch.statements)
                && else_clauses
                    .iter()
                    .all(|clause| always_returns(&clause.branch.statements))
        }
        _ => false,
    }
}
