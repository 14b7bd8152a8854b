//! Function declarations and call sites.
//!
//! All signatures are registered in a pre-pass before any body is
//! analyzed, so forward references and mutual recursion work regardless
//! of declaration order. Bodies run in a fresh scope with parameters
//! pre-declared and the current return type set for `return` checking.

use hexen_base::Symbol;
use hexen_language::ast::{Expr, Function, Program};

use crate::analyzer::{expr_hint, BlockContext, SemanticAnalyzer};
use crate::block::always_returns;
use crate::comptime::{adapt_to, AdaptError};
use crate::diagnostics::DiagnosticKind;
use crate::scope::{Mutability, SymbolInfo};
use crate::types::Type;

/// One registered parameter.
#[derive(Debug, Clone)]
pub(crate) struct ParamSig {
    pub(crate) name: Symbol,
    pub(crate) ty: Type,
    pub(crate) mutable: bool,
}

/// A registered function signature.
#[derive(Debug, Clone)]
pub(crate) struct FunctionSig {
    pub(crate) params: Vec<ParamSig>,
    pub(crate) return_type: Type,
}

impl SemanticAnalyzer {
    /// Pre-pass: register every function signature before any body runs.
    pub(crate) fn register_functions(&mut self, program: &Program) {
        for function in &program.functions {
            let sym = self.intern(&function.name);
            let mut params = Vec::with_capacity(function.parameters.len());
            for parameter in &function.parameters {
                params.push(ParamSig {
                    name: self.intern(&parameter.name),
                    ty: self.resolve_annotation(&parameter.param_type),
                    mutable: parameter.is_mutable,
                });
            }
            let return_type = self.resolve_annotation(&function.return_type);

            if self.functions.contains_key(&sym) {
                self.error(
                    DiagnosticKind::Redeclaration,
                    format!("Function '{}' already declared", function.name),
                );
                continue;
            }
            self.functions.insert(
                sym,
                FunctionSig {
                    params,
                    return_type,
                },
            );
        }
    }

    pub(crate) fn analyze_function(&mut self, function: &Function) {
        let sym = self.intern(&function.name);
        let sig = match self.functions.get(&sym) {
            Some(sig) => sig.clone(),
            None => return,
        };

        let bindings: Vec<SymbolInfo> = sig
            .params
            .iter()
            .map(|param| {
                let mutability = if param.mutable {
                    Mutability::Mutable
                } else {
                    Mutability::Immutable
                };
                SymbolInfo::new(param.name, param.ty.clone(), mutability)
            })
            .collect();

        self.current_return_type = Some(sig.return_type.clone());
        self.analyze_block_with_bindings(
            &function.body.statements,
            BlockContext::Function,
            None,
            bindings,
        );
        if sig.return_type != Type::Void
            && !sig.return_type.is_unknown()
            && !always_returns(&function.body.statements)
        {
            self.error(
                DiagnosticKind::MissingReturn,
                format!(
                    "Function '{}': not all paths return a value of type {}",
                    function.name, sig.return_type
                ),
            );
        }
        self.current_return_type = None;
    }

    /// Call site: resolve, check arity, analyze each argument with its
    /// parameter type as target, and yield the declared return type.
    pub(crate) fn analyze_call(&mut self, name: &str, arguments: &[Expr]) -> Type {
        let sym = self.intern(name);
        let sig = match self.functions.get(&sym) {
            Some(sig) => sig.clone(),
            None => {
                if self.symbols.lookup(sym).is_some() {
                    self.error(
                        DiagnosticKind::NotAFunction,
                        format!("'{}' is not a function", name),
                    );
                } else {
                    self.error(
                        DiagnosticKind::UndefinedVariable,
                        format!("Undefined function: '{}'", name),
                    );
                }
                for arg in arguments {
                    self.analyze_expr(arg, None);
                }
                return Type::Unknown;
            }
        };

        if arguments.len() != sig.params.len() {
            self.error(
                DiagnosticKind::ArityMismatch,
                format!(
                    "Function '{}' expects {} argument(s), got {}",
                    name,
                    sig.params.len(),
                    arguments.len()
                ),
            );
        }

        for (i, argument) in arguments.iter().enumerate() {
            let param = match sig.params.get(i) {
                Some(param) => param,
                None => {
                    self.analyze_expr(argument, None);
                    continue;
                }
            };
            let ty = self.analyze_expr(argument, Some(&param.ty));
            if let Err(err) = adapt_to(&ty, &param.ty) {
                let param_name = self.interner.resolve(param.name).to_string();
                match err {
                    AdaptError::Truncation => self.error_with(
                        DiagnosticKind::ArgTypeMismatch,
                        format!(
                            "Argument '{}' of '{}': {} value does not fit {} losslessly",
                            param_name, name, ty, param.ty
                        ),
                        format!("{}:{}", expr_hint(argument), param.ty),
                    ),
                    _ => self.error(
                        DiagnosticKind::ArgTypeMismatch,
                        format!(
                            "Argument '{}' of '{}': expected {}, got {}",
                            param_name, name, param.ty, ty
                        ),
                    ),
                }
            }
        }

        sig.return_type
    }
}
