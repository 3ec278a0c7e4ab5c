//! Abstract syntax tree for Source programs
//!
//! Interior nodes are held behind `Rc` so that continuation frames can keep a
//! handle on the node they will resume without copying subtrees.

use std::fmt;
use std::rc::Rc;

use crate::lexer::Span;
use crate::value::{CheapClone, SourceString};

#[derive(Debug, Clone)]
pub struct Program {
    pub body: Rc<[Statement]>,
    pub span: Span,
}

// ============ STATEMENTS ============

#[derive(Debug, Clone)]
pub enum Statement {
    VariableDeclaration(Rc<VariableDeclaration>),
    FunctionDeclaration(Rc<Function>),
    Block(Rc<BlockStatement>),
    If(Rc<IfStatement>),
    Return(Rc<ReturnStatement>),
    Expression(Rc<ExpressionStatement>),

    // Parsed so they can be reported, never evaluated
    While(Rc<WhileStatement>),
    DoWhile(Rc<WhileStatement>),
    For(Rc<ForStatement>),
    Break(Span),
    Continue(Span),
    Throw(Rc<ThrowStatement>),
    Try(Rc<TryStatement>),
    Unsupported(UnsupportedStatement),
}

impl CheapClone for Statement {}

impl Statement {
    pub fn span(&self) -> Span {
        match self {
            Statement::VariableDeclaration(d) => d.span,
            Statement::FunctionDeclaration(f) => f.span,
            Statement::Block(b) => b.span,
            Statement::If(i) => i.span,
            Statement::Return(r) => r.span,
            Statement::Expression(e) => e.span,
            Statement::While(w) | Statement::DoWhile(w) => w.span,
            Statement::For(f) => f.span,
            Statement::Break(span) | Statement::Continue(span) => *span,
            Statement::Throw(t) => t.span,
            Statement::Try(t) => t.span,
            Statement::Unsupported(u) => u.span,
        }
    }

    /// Human-readable name of a statement kind the evaluator does not run.
    pub fn unsupported_name(&self) -> Option<&'static str> {
        match self {
            Statement::While(_) => Some("while loop"),
            Statement::DoWhile(_) => Some("do-while loop"),
            Statement::For(_) => Some("for loop"),
            Statement::Break(_) => Some("break statement"),
            Statement::Continue(_) => Some("continue statement"),
            Statement::Throw(_) => Some("throw statement"),
            Statement::Try(_) => Some("try statement"),
            Statement::Unsupported(u) => Some(u.kind),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ExpressionStatement {
    pub expression: Expression,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct BlockStatement {
    pub body: Rc<[Statement]>,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct VariableDeclaration {
    pub kind: VariableKind,
    pub id: Identifier,
    pub init: Expression,
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VariableKind {
    Let,
    Const,
}

impl VariableKind {
    pub fn is_mutable(self) -> bool {
        self == VariableKind::Let
    }
}

/// A function declaration, function expression or arrow function.
///
/// Arrow functions with an expression body are normalized by the parser into
/// a block containing a single `return`.
#[derive(Debug, Clone)]
pub struct Function {
    pub id: Option<Identifier>,
    pub params: Rc<[FunctionParam]>,
    pub body: Rc<BlockStatement>,
    pub is_arrow: bool,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct FunctionParam {
    pub name: Identifier,
    pub is_rest: bool,
}

#[derive(Debug, Clone)]
pub struct IfStatement {
    pub test: Expression,
    pub consequent: Statement,
    pub alternate: Option<Statement>,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct ReturnStatement {
    pub argument: Option<Expression>,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct WhileStatement {
    pub test: Expression,
    pub body: Statement,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct ForStatement {
    pub init: Option<Statement>,
    pub test: Option<Expression>,
    pub update: Option<Expression>,
    pub body: Statement,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct ThrowStatement {
    pub argument: Expression,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct TryStatement {
    pub block: Rc<BlockStatement>,
    pub param: Option<Identifier>,
    pub handler: Option<Rc<BlockStatement>>,
    pub finalizer: Option<Rc<BlockStatement>>,
    pub span: Span,
}

/// `import`, `export`, `class`, `switch`: skipped by the parser, rejected by
/// the evaluator.
#[derive(Debug, Clone)]
pub struct UnsupportedStatement {
    pub kind: &'static str,
    pub span: Span,
}

// ============ EXPRESSIONS ============

#[derive(Debug, Clone)]
pub enum Expression {
    Literal(Literal),
    Identifier(Identifier),
    Unary(Rc<UnaryExpression>),
    Binary(Rc<BinaryExpression>),
    Logical(Rc<LogicalExpression>),
    Conditional(Rc<ConditionalExpression>),
    Call(Rc<CallExpression>),
    Assignment(Rc<AssignmentExpression>),
    Function(Rc<Function>),

    // Parsed so they can be reported, never evaluated
    Array(Rc<ArrayExpression>),
    Object(Rc<ObjectExpression>),
    Member(Rc<MemberExpression>),
    New(Rc<CallExpression>),
    Update(Rc<UpdateExpression>),
    Template(Literal),
    This(Span),
}

impl CheapClone for Expression {}

impl Expression {
    pub fn span(&self) -> Span {
        match self {
            Expression::Literal(l) | Expression::Template(l) => l.span,
            Expression::Identifier(i) => i.span,
            Expression::Unary(u) => u.span,
            Expression::Binary(b) => b.span,
            Expression::Logical(l) => l.span,
            Expression::Conditional(c) => c.span,
            Expression::Call(c) | Expression::New(c) => c.span,
            Expression::Assignment(a) => a.span,
            Expression::Function(f) => f.span,
            Expression::Array(a) => a.span,
            Expression::Object(o) => o.span,
            Expression::Member(m) => m.span,
            Expression::Update(u) => u.span,
            Expression::This(span) => *span,
        }
    }

    /// Human-readable name of an expression kind the evaluator does not run.
    pub fn unsupported_name(&self) -> Option<&'static str> {
        match self {
            Expression::Array(_) => Some("array expression"),
            Expression::Object(_) => Some("object expression"),
            Expression::Member(_) => Some("member access"),
            Expression::New(_) => Some("new expression"),
            Expression::Update(_) => Some("update expression"),
            Expression::Template(_) => Some("template literal"),
            Expression::This(_) => Some("this"),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Identifier {
    pub name: SourceString,
    pub span: Span,
}

impl CheapClone for Identifier {}

#[derive(Debug, Clone)]
pub struct Literal {
    pub value: LiteralValue,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub enum LiteralValue {
    Null,
    Boolean(bool),
    Number(f64),
    String(SourceString),
}

#[derive(Debug, Clone)]
pub struct UnaryExpression {
    pub operator: UnaryOp,
    pub argument: Expression,
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    Not,
    Minus,
    Plus,
    Typeof,
}

#[derive(Debug, Clone)]
pub struct BinaryExpression {
    pub operator: BinaryOp,
    pub left: Expression,
    pub right: Expression,
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    StrictEq,
    StrictNotEq,
    Lt,
    LtEq,
    Gt,
    GtEq,
    /// `==`, rejected at runtime
    Eq,
    /// `!=`, rejected at runtime
    NotEq,
}

#[derive(Debug, Clone)]
pub struct LogicalExpression {
    pub operator: LogicalOp,
    pub left: Expression,
    pub right: Expression,
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogicalOp {
    And,
    Or,
    NullishCoalescing,
}

#[derive(Debug, Clone)]
pub struct ConditionalExpression {
    pub test: Expression,
    pub consequent: Expression,
    pub alternate: Expression,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct CallExpression {
    pub callee: Expression,
    pub arguments: Rc<[Expression]>,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct AssignmentExpression {
    pub operator: AssignmentOp,
    pub target: AssignmentTarget,
    pub value: Expression,
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssignmentOp {
    Assign,
    AddAssign,
    SubAssign,
    MulAssign,
    DivAssign,
    ModAssign,
}

#[derive(Debug, Clone)]
pub enum AssignmentTarget {
    Identifier(Identifier),
    Member(Rc<MemberExpression>),
}

#[derive(Debug, Clone)]
pub struct ArrayExpression {
    pub elements: Vec<Expression>,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct ObjectExpression {
    pub properties: Vec<(SourceString, Expression)>,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct MemberExpression {
    pub object: Expression,
    pub property: MemberProperty,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub enum MemberProperty {
    Identifier(Identifier),
    Computed(Expression),
}

#[derive(Debug, Clone)]
pub struct UpdateExpression {
    pub increment: bool,
    pub prefix: bool,
    pub argument: Expression,
    pub span: Span,
}

impl fmt::Display for UnaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            UnaryOp::Not => "!",
            UnaryOp::Minus => "-",
            UnaryOp::Plus => "+",
            UnaryOp::Typeof => "typeof",
        })
    }
}

impl fmt::Display for BinaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
            BinaryOp::Mod => "%",
            BinaryOp::StrictEq => "===",
            BinaryOp::StrictNotEq => "!==",
            BinaryOp::Lt => "<",
            BinaryOp::LtEq => "<=",
            BinaryOp::Gt => ">",
            BinaryOp::GtEq => ">=",
            BinaryOp::Eq => "==",
            BinaryOp::NotEq => "!=",
        })
    }
}

impl fmt::Display for LogicalOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            LogicalOp::And => "&&",
            LogicalOp::Or => "||",
            LogicalOp::NullishCoalescing => "??",
        })
    }
}

impl fmt::Display for AssignmentOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            AssignmentOp::Assign => "=",
            AssignmentOp::AddAssign => "+=",
            AssignmentOp::SubAssign => "-=",
            AssignmentOp::MulAssign => "*=",
            AssignmentOp::DivAssign => "/=",
            AssignmentOp::ModAssign => "%=",
        })
    }
}
