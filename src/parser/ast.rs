// AST (Abstract Syntax Tree) definitions for the C front end

pub use crate::span::Span;
use std::fmt;

/// Parser-assigned identifier tying a loop or switch to the `break`,
/// `continue`, `case` and `default` statements that target it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LoopLabel(pub u32);

impl fmt::Display for LoopLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "loop.{}", self.0)
    }
}

/// Base types supported by the front end
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BaseType {
    Int,
    Long,
    UnsignedInt,
    UnsignedLong,
    Char,
    SignedChar,
    UnsignedChar,
    Double,
    Void,
}

/// Type descriptor: a base type plus pointer indirection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Type {
    pub base: BaseType,
    pub pointer_depth: usize, // 0 = not pointer, 1 = *, 2 = **, etc.
}

impl Type {
    pub fn new(base: BaseType) -> Self {
        Type {
            base,
            pointer_depth: 0,
        }
    }

    pub fn with_pointer(mut self) -> Self {
        self.pointer_depth += 1;
        self
    }

    pub fn is_pointer(&self) -> bool {
        self.pointer_depth > 0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StorageClass {
    Static,
    Extern,
}

/// Integer literal suffix (`u`, `l`, `ll` and combinations)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct IntSuffix {
    pub unsigned: bool,
    pub long: bool,
}

/// Binary operators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BinaryOp {
    // Arithmetic
    Add,
    Subtract,
    Multiply,
    Divide,
    Remainder,
    // Bitwise
    ShiftLeft,
    ShiftRight,
    BitAnd,
    BitXor,
    BitOr,
    // Comparison
    LessThan,
    LessOrEqual,
    GreaterThan,
    GreaterOrEqual,
    Equal,
    NotEqual,
    // Logical
    And,
    Or,
}

/// Unary operators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UnaryOp {
    Negate,        // -x
    Complement,    // ~x
    Not,           // !x
    Plus,          // +x
    PreIncrement,  // ++x
    PreDecrement,  // --x
    PostIncrement, // x++
    PostDecrement, // x--
    Dereference,   // *x
    AddressOf,     // &x
}

/// Assignment operators; every compound form pairs with a [`BinaryOp`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AssignOp {
    Assign,
    Compound(BinaryOp),
}

/// Top-level program structure
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Program {
    pub declarations: Vec<Declaration>,
    pub span: Span,
}

impl Program {
    pub fn new() -> Self {
        Program::default()
    }

    pub fn functions(&self) -> impl Iterator<Item = &FunctionDecl> {
        self.declarations.iter().filter_map(|decl| match decl {
            Declaration::Function(func) => Some(func),
            Declaration::Variable(_) => None,
        })
    }
}

/// Function or variable declaration, at file scope or inside a block
#[derive(Debug, Clone, PartialEq)]
pub enum Declaration {
    Function(FunctionDecl),
    Variable(VariableDecl),
}

impl Declaration {
    pub fn name(&self) -> &str {
        match self {
            Declaration::Function(func) => &func.name,
            Declaration::Variable(var) => &var.name,
        }
    }

    pub fn span(&self) -> Span {
        match self {
            Declaration::Function(func) => func.span,
            Declaration::Variable(var) => var.span,
        }
    }
}

/// Function parameter
#[derive(Debug, Clone, PartialEq)]
pub struct Param {
    pub name: String,
    pub param_type: Type,
    pub span: Span,
}

/// Function declaration; `body` is `None` for a prototype
#[derive(Debug, Clone, PartialEq)]
pub struct FunctionDecl {
    pub name: String,
    pub params: Vec<Param>,
    pub return_type: Type,
    pub storage: Option<StorageClass>,
    pub body: Option<Block>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct VariableDecl {
    pub name: String,
    pub var_type: Type,
    pub storage: Option<StorageClass>,
    pub init: Option<Expression>,
    pub span: Span,
}

/// Brace-delimited sequence of block items
#[derive(Debug, Clone, PartialEq)]
pub struct Block {
    pub items: Vec<BlockItem>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub enum BlockItem {
    Declaration(Declaration),
    Statement(Statement),
}

/// Initial clause of a `for` loop
#[derive(Debug, Clone, PartialEq)]
pub enum ForInit {
    Declaration(VariableDecl),
    Expression(Expression),
}

/// Statements
#[derive(Debug, Clone, PartialEq)]
pub enum Statement {
    Return {
        expr: Option<Expression>,
        span: Span,
    },
    Expression {
        expr: Expression,
        span: Span,
    },
    If {
        condition: Expression,
        then_branch: Box<Statement>,
        else_branch: Option<Box<Statement>>,
        span: Span,
    },
    Compound(Block),
    While {
        condition: Expression,
        body: Box<Statement>,
        label: LoopLabel,
        span: Span,
    },
    DoWhile {
        body: Box<Statement>,
        condition: Expression,
        label: LoopLabel,
        span: Span,
    },
    For {
        init: Option<ForInit>,
        condition: Option<Expression>,
        post: Option<Expression>,
        body: Box<Statement>,
        label: LoopLabel,
        span: Span,
    },
    Switch {
        control: Expression,
        body: Box<Statement>,
        label: LoopLabel,
        span: Span,
    },
    Case {
        value: Expression,
        body: Box<Statement>,
        switch: LoopLabel,
        span: Span,
    },
    Default {
        body: Box<Statement>,
        switch: LoopLabel,
        span: Span,
    },
    Break {
        target: LoopLabel,
        span: Span,
    },
    Continue {
        target: LoopLabel,
        span: Span,
    },
    Goto {
        target: String,
        span: Span,
    },
    Labeled {
        label: String,
        statement: Box<Statement>,
        span: Span,
    },
    Null {
        span: Span,
    },
}

impl Statement {
    /// Get the source span of this statement
    pub fn span(&self) -> Span {
        match self {
            Statement::Compound(block) => block.span,
            Statement::Return { span, .. }
            | Statement::Expression { span, .. }
            | Statement::If { span, .. }
            | Statement::While { span, .. }
            | Statement::DoWhile { span, .. }
            | Statement::For { span, .. }
            | Statement::Switch { span, .. }
            | Statement::Case { span, .. }
            | Statement::Default { span, .. }
            | Statement::Break { span, .. }
            | Statement::Continue { span, .. }
            | Statement::Goto { span, .. }
            | Statement::Labeled { span, .. }
            | Statement::Null { span } => *span,
        }
    }

    /// Label attached to a loop or switch statement
    pub fn loop_label(&self) -> Option<LoopLabel> {
        match self {
            Statement::While { label, .. }
            | Statement::DoWhile { label, .. }
            | Statement::For { label, .. }
            | Statement::Switch { label, .. } => Some(*label),
            _ => None,
        }
    }
}

/// Expressions
#[derive(Debug, Clone, PartialEq)]
pub enum Expression {
    IntegerConstant {
        value: u64,
        suffix: IntSuffix,
        span: Span,
    },
    FloatConstant {
        value: f64,
        span: Span,
    },
    CharConstant {
        value: u8,
        span: Span,
    },
    StringLiteral {
        value: Vec<u8>,
        span: Span,
    },
    Variable {
        name: String,
        span: Span,
    },
    Unary {
        op: UnaryOp,
        operand: Box<Expression>,
        span: Span,
    },
    Binary {
        op: BinaryOp,
        left: Box<Expression>,
        right: Box<Expression>,
        span: Span,
    },
    Assignment {
        op: AssignOp,
        target: Box<Expression>,
        value: Box<Expression>,
        span: Span,
    },
    Conditional {
        condition: Box<Expression>,
        then_expr: Box<Expression>,
        else_expr: Box<Expression>,
        span: Span,
    },
    FunctionCall {
        name: String,
        args: Vec<Expression>,
        span: Span,
    },
    Cast {
        target_type: Type,
        operand: Box<Expression>,
        span: Span,
    },
}

impl Expression {
    /// Get the source span of this expression
    pub fn span(&self) -> Span {
        match self {
            Expression::IntegerConstant { span, .. }
            | Expression::FloatConstant { span, .. }
            | Expression::CharConstant { span, .. }
            | Expression::StringLiteral { span, .. }
            | Expression::Variable { span, .. }
            | Expression::Unary { span, .. }
            | Expression::Binary { span, .. }
            | Expression::Assignment { span, .. }
            | Expression::Conditional { span, .. }
            | Expression::FunctionCall { span, .. }
            | Expression::Cast { span, .. } => *span,
        }
    }
}
