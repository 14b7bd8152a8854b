//! Conditionals, in statement and expression position.
//!
//! As a statement every branch is an ordinary statement block. As an
//! expression every branch is an expression block; the types of the
//! `->`-producing branches are unified against the target, branches that
//! `return` exit the function early and impose nothing.

use hexen_language::ast::{Block, ElseClause, Expr, Stmt};

use crate::analyzer::{BlockContext, SemanticAnalyzer};
use crate::comptime::adapt_to;
use crate::diagnostics::DiagnosticKind;
use crate::types::Type;

impl SemanticAnalyzer {
    pub(crate) fn analyze_conditional_statement(
        &mut self,
        condition: &Expr,
        if_branch: &Block,
        else_clauses: &[ElseClause],
    ) {
        self.check_condition(condition);
        self.analyze_block(&if_branch.statements, BlockContext::Statement, None);
        for clause in else_clauses {
            if let Some(cond) = &clause.condition {
                self.check_condition(cond);
            }
            self.analyze_block(&clause.branch.statements, BlockContext::Statement, None);
        }
    }

    /// Conditions must be `bool`; `Unknown` stays silent.
    pub(crate) fn check_condition(&mut self, condition: &Expr) {
        let ty = self.analyze_expr(condition, None);
        if !ty.is_unknown() && ty != Type::Bool {
            self.error(
                DiagnosticKind::NonBoolCondition,
                format!("Condition must be of type bool, got {}", ty),
            );
        }
    }

    pub(crate) fn analyze_conditional_expression(
        &mut self,
        condition: &Expr,
        if_branch: &Block,
        else_clauses: &[ElseClause],
        target: Option<&Type>,
    ) -> Type {
        self.check_condition(condition);

        let mut assign_types = Vec::new();
        let mut visit_branch = |this: &mut Self, branch: &Block| {
            let assigns = ends_in_assign(&branch.statements);
            let ty = this.analyze_block(&branch.statements, BlockContext::Expression, target);
            if assigns && !ty.is_unknown() {
                assign_types.push(ty);
            }
        };

        visit_branch(self, if_branch);
        for clause in else_clauses {
            if let Some(cond) = &clause.condition {
                self.check_condition(cond);
            }
            visit_branch(self, &clause.branch);
        }

        let has_final_else = else_clauses
            .last()
            .map(|clause| clause.condition.is_none())
            .unwrap_or(false);
        if !has_final_else && !assign_types.is_empty() {
            self.error(
                DiagnosticKind::MissingElseBranch,
                "Conditional expression needs a final 'else' branch to produce a value on every path",
            );
        }

        self.unify_branches(assign_types, target)
    }

    /// With a target every producing branch must adapt to it; without one
    /// all producing branches must agree exactly (comptime kinds included).
    fn unify_branches(&mut self, branch_types: Vec<Type>, target: Option<&Type>) -> Type {
        if branch_types.is_empty() {
            // Every terminating branch was an early return; the value's
            // type is whatever the context wanted.
            return target.cloned().unwrap_or(Type::Unknown);
        }

        if let Some(t) = target {
            let mut ok = true;
            for bty in &branch_types {
                if adapt_to(bty, t).is_err() {
                    self.error_with(
                        DiagnosticKind::BranchTypeMismatch,
                        format!("Branch type {} is incompatible with target type {}", bty, t),
                        format!("value:{}", t),
                    );
                    ok = false;
                }
            }
            return if ok { t.clone() } else { Type::Unknown };
        }

        let first = &branch_types[0];
        if branch_types.iter().all(|t| t == first) {
            return first.clone();
        }
        self.error(
            DiagnosticKind::BranchTypeMismatch,
            "Conditional branches produce mixed types; add an explicit target type",
        );
        Type::Unknown
    }
}

fn ends_in_assign(statements: &[Stmt]) -> bool {
    matches!(statements.last(), Some(Stmt::AssignStatement { .. }))
}
