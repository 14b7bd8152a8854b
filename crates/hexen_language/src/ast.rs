//! The Hexen AST as a closed tagged union.
//!
//! Every node kind is a variant with its own fields; there are no
//! string-keyed bags and no optional fields beyond the ones the grammar
//! makes optional. Serialization via serde's internal tagging produces the
//! stable JSON shape tooling consumes: each node is an object with a
//! `"type"` tag (`"val_declaration"`, `"binary_operation"`, …) next to its
//! kind-specific fields.
//!
//! Statements and expressions overlap for three constructs - blocks,
//! conditionals and `for-in` loops appear in both positions with the same
//! tag - so those variants exist in both [`Stmt`] and [`Expr`] and the
//! analyzer funnels them into shared code.

use serde::Serialize;

/// A whole source file: function declarations plus top-level statements.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename = "program")]
pub struct Program {
    pub functions: Vec<Function>,
    pub statements: Vec<Stmt>,
}

/// `func name(params) : ReturnType = { … }`
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename = "function")]
pub struct Function {
    pub name: String,
    pub parameters: Vec<Parameter>,
    pub return_type: TypeAnnotation,
    pub body: Block,
}

/// `[mut] name : T` inside a parameter list.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename = "parameter")]
pub struct Parameter {
    pub name: String,
    pub param_type: TypeAnnotation,
    pub is_mutable: bool,
}

/// The unified `{ … }` construct. Whether it acts as a function body, a
/// statement block or an expression block is decided by the consumer, not
/// recorded in the tree.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename = "block")]
pub struct Block {
    pub statements: Vec<Stmt>,
}

/// One `else if cond { … }` or final `else { … }` arm.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename = "else_clause")]
pub struct ElseClause {
    pub condition: Option<Expr>,
    pub branch: Block,
}

/// `{size: N}` entry of an array type; `None` is the inferred `_` marker.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename = "array_dimension")]
pub struct ArrayDimension {
    pub size: Option<u64>,
}

/// A type annotation: either a bare name (`"i32"`) or a composite
/// `array_type` / `range_type` node.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum TypeAnnotation {
    Name(String),
    Composite(Box<CompositeType>),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CompositeType {
    /// `[N]T`, `[_]T`, `[N][M]T` - outermost dimension first.
    ArrayType {
        element_type: TypeAnnotation,
        dimensions: Vec<ArrayDimension>,
    },
    /// `range[T]`
    RangeType { element_type: TypeAnnotation },
}

impl TypeAnnotation {
    pub fn name(name: impl Into<String>) -> Self {
        TypeAnnotation::Name(name.into())
    }
}

/// Statements.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Stmt {
    /// `val name [: T] = expr`
    ValDeclaration {
        name: String,
        type_annotation: Option<TypeAnnotation>,
        value: Expr,
    },
    /// `mut name : T = expr` - the annotation is grammatically required,
    /// but stays optional in the tree so the analyzer can report it too.
    MutDeclaration {
        name: String,
        type_annotation: Option<TypeAnnotation>,
        value: Expr,
    },
    /// `target = expr`
    AssignmentStatement { target: String, value: Expr },
    /// `-> expr` - produces the value of the enclosing expression block
    /// (or one element of an enclosing loop expression).
    AssignStatement { value: Expr },
    /// `return [expr]`
    ReturnStatement { value: Option<Expr> },
    ConditionalStatement {
        condition: Expr,
        if_branch: Block,
        else_clauses: Vec<ElseClause>,
    },
    WhileLoop {
        condition: Expr,
        body: Block,
        label: Option<String>,
    },
    ForInLoop {
        variable: String,
        variable_type: Option<TypeAnnotation>,
        iterable: Expr,
        body: Block,
        label: Option<String>,
    },
    BreakStatement { label: Option<String> },
    ContinueStatement { label: Option<String> },
    /// `'label loop` - the parser also back-fills the inner loop's own
    /// `label` field.
    LabeledStatement { label: String, statement: Box<Stmt> },
    /// A function call in statement position.
    FunctionCallStatement { function_call: Expr },
    /// A bare `{ … }` statement block.
    Block { statements: Vec<Stmt> },
}

/// Expressions.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Expr {
    /// Non-numeric literal: `true`, `"text"`.
    Literal { value: LiteralValue },
    /// Integer literal - `comptime_int` until context resolves it.
    ComptimeInt { value: i64 },
    /// Float literal - `comptime_float` until context resolves it.
    ComptimeFloat { value: f64 },
    Identifier { name: String },
    BinaryOperation {
        operator: BinaryOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },
    UnaryOperation {
        operator: UnaryOp,
        operand: Box<Expr>,
    },
    /// `expr:T` - the explicit conversion operator.
    ExplicitConversionExpression {
        expression: Box<Expr>,
        target_type: TypeAnnotation,
    },
    FunctionCall {
        function_name: String,
        arguments: Vec<Expr>,
    },
    ArrayLiteral { elements: Vec<Expr> },
    ArrayAccess {
        array: Box<Expr>,
        index: Box<Expr>,
    },
    /// `object.property` - currently only `.length`.
    PropertyAccess {
        object: Box<Expr>,
        property: String,
    },
    /// `a..b`, `a..=b`, optional `:step`, any bound omissible.
    RangeExpr {
        start: Option<Box<Expr>>,
        end: Option<Box<Expr>>,
        step: Option<Box<Expr>>,
        inclusive: bool,
    },
    /// An expression block `{ …; -> value }`.
    Block { statements: Vec<Stmt> },
    /// A conditional in value position.
    ConditionalStatement {
        condition: Box<Expr>,
        if_branch: Block,
        else_clauses: Vec<ElseClause>,
    },
    /// A `for-in` loop in value position - produces an array.
    ForInLoop {
        variable: String,
        variable_type: Option<TypeAnnotation>,
        iterable: Box<Expr>,
        body: Block,
        label: Option<String>,
    },
}

/// Non-numeric literal payloads. Serializes as the bare JSON value.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum LiteralValue {
    Bool(bool),
    String(String),
}

/// Binary operators. Serialized as their source spelling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum BinaryOp {
    #[serde(rename = "+")]
    Add,
    #[serde(rename = "-")]
    Sub,
    #[serde(rename = "*")]
    Mul,
    /// `/` - float division; the result is always floating-point.
    #[serde(rename = "/")]
    FloatDiv,
    /// `\` - integer division; both operands must be integers.
    #[serde(rename = "\\")]
    IntDiv,
    #[serde(rename = "<")]
    Lt,
    #[serde(rename = "<=")]
    Le,
    #[serde(rename = ">")]
    Gt,
    #[serde(rename = ">=")]
    Ge,
    #[serde(rename = "==")]
    Eq,
    #[serde(rename = "!=")]
    Ne,
    #[serde(rename = "&&")]
    And,
    #[serde(rename = "||")]
    Or,
}

impl BinaryOp {
    pub fn is_arithmetic(self) -> bool {
        matches!(
            self,
            BinaryOp::Add | BinaryOp::Sub | BinaryOp::Mul | BinaryOp::FloatDiv | BinaryOp::IntDiv
        )
    }

    pub fn is_comparison(self) -> bool {
        matches!(
            self,
            BinaryOp::Lt | BinaryOp::Le | BinaryOp::Gt | BinaryOp::Ge | BinaryOp::Eq | BinaryOp::Ne
        )
    }

    pub fn is_logical(self) -> bool {
        matches!(self, BinaryOp::And | BinaryOp::Or)
    }

    /// Source spelling, for diagnostics.
    pub fn as_str(self) -> &'static str {
        match self {
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
            BinaryOp::FloatDiv => "/",
            BinaryOp::IntDiv => "\\",
            BinaryOp::Lt => "<",
            BinaryOp::Le => "<=",
            BinaryOp::Gt => ">",
            BinaryOp::Ge => ">=",
            BinaryOp::Eq => "==",
            BinaryOp::Ne => "!=",
            BinaryOp::And => "&&",
            BinaryOp::Or => "||",
        }
    }
}

impl std::fmt::Display for BinaryOp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Unary operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum UnaryOp {
    #[serde(rename = "-")]
    Neg,
    #[serde(rename = "!")]
    Not,
}

impl UnaryOp {
    pub fn as_str(self) -> &'static str {
        match self {
            UnaryOp::Neg => "-",
            UnaryOp::Not => "!",
        }
    }
}

impl std::fmt::Display for UnaryOp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
