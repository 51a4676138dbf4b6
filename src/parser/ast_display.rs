//! Deterministic text dump of the AST
//!
//! Every expression prints fully parenthesized, so `1 + 2 * 3` dumps as
//! `(1 + (2 * 3))` and the tree's grouping can be read off directly.
//! Statements that own or target a loop label carry it as a trailing
//! comment in the `/* loop.N */` notation, e.g. `break; /* loop.0 */`.

use std::fmt::{Display, Formatter, Result};

use super::ast::{
    AssignOp, BaseType, BinaryOp, Block, BlockItem, Declaration, Expression, ForInit,
    FunctionDecl, IntSuffix, Param, Program, Statement, StorageClass, Type, UnaryOp,
    VariableDecl,
};

impl Display for Program {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        for decl in &self.declarations {
            writeln!(f, "{decl}")?;
        }
        Ok(())
    }
}

impl Display for Declaration {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        match self {
            Declaration::Function(func) => write!(f, "{func}"),
            Declaration::Variable(var) => write!(f, "{var}"),
        }
    }
}

impl Display for FunctionDecl {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        if let Some(storage) = self.storage {
            write!(f, "{storage} ")?;
        }
        write!(f, "{} {}(", self.return_type, self.name)?;
        if self.params.is_empty() {
            write!(f, "void")?;
        }
        for (i, param) in self.params.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{param}")?;
        }
        write!(f, ")")?;

        match &self.body {
            Some(body) => write!(f, " {}", Indent::new(body).with_indent(0)),
            None => write!(f, ";"),
        }
    }
}

impl Display for Param {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        write!(f, "{} {}", self.param_type, self.name)
    }
}

impl Display for VariableDecl {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        if let Some(storage) = self.storage {
            write!(f, "{storage} ")?;
        }
        write!(f, "{} {}", self.var_type, self.name)?;
        if let Some(init) = &self.init {
            write!(f, " = {init}")?;
        }
        write!(f, ";")
    }
}

impl Display for Type {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        write!(f, "{}", self.base)?;
        for _ in 0..self.pointer_depth {
            write!(f, "*")?;
        }
        Ok(())
    }
}

impl Display for BaseType {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        let name = match self {
            BaseType::Int => "int",
            BaseType::Long => "long",
            BaseType::UnsignedInt => "unsigned int",
            BaseType::UnsignedLong => "unsigned long",
            BaseType::Char => "char",
            BaseType::SignedChar => "signed char",
            BaseType::UnsignedChar => "unsigned char",
            BaseType::Double => "double",
            BaseType::Void => "void",
        };
        f.write_str(name)
    }
}

impl Display for StorageClass {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        match self {
            StorageClass::Static => f.write_str("static"),
            StorageClass::Extern => f.write_str("extern"),
        }
    }
}

impl Display for BinaryOp {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        let symbol = match self {
            BinaryOp::Add => "+",
            BinaryOp::Subtract => "-",
            BinaryOp::Multiply => "*",
            BinaryOp::Divide => "/",
            BinaryOp::Remainder => "%",
            BinaryOp::ShiftLeft => "<<",
            BinaryOp::ShiftRight => ">>",
            BinaryOp::BitAnd => "&",
            BinaryOp::BitXor => "^",
            BinaryOp::BitOr => "|",
            BinaryOp::LessThan => "<",
            BinaryOp::LessOrEqual => "<=",
            BinaryOp::GreaterThan => ">",
            BinaryOp::GreaterOrEqual => ">=",
            BinaryOp::Equal => "==",
            BinaryOp::NotEqual => "!=",
            BinaryOp::And => "&&",
            BinaryOp::Or => "||",
        };
        f.write_str(symbol)
    }
}

impl Display for UnaryOp {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        let symbol = match self {
            UnaryOp::Negate => "-",
            UnaryOp::Complement => "~",
            UnaryOp::Not => "!",
            UnaryOp::Plus => "+",
            UnaryOp::PreIncrement | UnaryOp::PostIncrement => "++",
            UnaryOp::PreDecrement | UnaryOp::PostDecrement => "--",
            UnaryOp::Dereference => "*",
            UnaryOp::AddressOf => "&",
        };
        f.write_str(symbol)
    }
}

impl Display for AssignOp {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        match self {
            AssignOp::Assign => f.write_str("="),
            AssignOp::Compound(op) => write!(f, "{op}="),
        }
    }
}

impl Display for IntSuffix {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        if self.unsigned {
            f.write_str("u")?;
        }
        if self.long {
            f.write_str("l")?;
        }
        Ok(())
    }
}

/// Expressions print fully parenthesized so grouping is explicit
impl Display for Expression {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        match self {
            Expression::IntegerConstant { value, suffix, .. } => write!(f, "{value}{suffix}"),
            Expression::FloatConstant { value, .. } => write!(f, "{value:?}"),
            Expression::CharConstant { value, .. } => {
                write!(f, "'{}'", std::ascii::escape_default(*value))
            }
            Expression::StringLiteral { value, .. } => write!(f, "\"{}\"", value.escape_ascii()),
            Expression::Variable { name, .. } => write!(f, "{name}"),
            Expression::Unary { op, operand, .. } => match op {
                UnaryOp::PostIncrement | UnaryOp::PostDecrement => write!(f, "({operand}{op})"),
                _ => write!(f, "({op}{operand})"),
            },
            Expression::Binary {
                op, left, right, ..
            } => write!(f, "({left} {op} {right})"),
            Expression::Assignment {
                op, target, value, ..
            } => write!(f, "({target} {op} {value})"),
            Expression::Conditional {
                condition,
                then_expr,
                else_expr,
                ..
            } => write!(f, "({condition} ? {then_expr} : {else_expr})"),
            Expression::FunctionCall { name, args, .. } => {
                write!(f, "{name}(")?;
                for (i, arg) in args.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{arg}")?;
                }
                write!(f, ")")
            }
            Expression::Cast {
                target_type,
                operand,
                ..
            } => write!(f, "(({target_type}) {operand})"),
        }
    }
}

impl Display for Statement {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        write!(f, "{}", Indent::new(self).with_indent(0))
    }
}

/// A helper struct to display nodes with indentation
struct Indent<'a, T> {
    node: &'a T,
    indent: usize,
}

impl<'a, T> Indent<'a, T> {
    fn new(node: &'a T) -> Self {
        Self { node, indent: 1 }
    }

    fn with_indent(self, indent: usize) -> Self {
        Self { indent, ..self }
    }
}

fn write_indent(f: &mut Formatter<'_>, depth: usize) -> Result {
    for _ in 0..depth {
        f.write_str("    ")?;
    }
    Ok(())
}

// Blocks open on the current line and close at their own indent
impl<'a> Display for Indent<'a, Block> {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        if self.node.items.is_empty() {
            return write!(f, "{{}}");
        }
        writeln!(f, "{{")?;
        for item in &self.node.items {
            match item {
                BlockItem::Declaration(decl) => {
                    write_indent(f, self.indent + 1)?;
                    writeln!(f, "{decl}")?;
                }
                BlockItem::Statement(stmt) => {
                    write!(f, "{}", Indent::new(stmt).with_indent(self.indent + 1))?;
                }
            }
        }
        write_indent(f, self.indent)?;
        write!(f, "}}")
    }
}

impl<'a> Indent<'a, Statement> {
    fn child<'b>(&self, stmt: &'b Statement) -> Indent<'b, Statement> {
        Indent::new(stmt).with_indent(self.indent + 1)
    }
}

// Statements start at their indent and end with a newline
impl<'a> Display for Indent<'a, Statement> {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        write_indent(f, self.indent)?;
        match self.node {
            Statement::Return { expr: Some(e), .. } => writeln!(f, "return {e};"),
            Statement::Return { expr: None, .. } => writeln!(f, "return;"),
            Statement::Expression { expr, .. } => writeln!(f, "{expr};"),
            Statement::If {
                condition,
                then_branch,
                else_branch,
                ..
            } => {
                writeln!(f, "if ({condition})")?;
                write!(f, "{}", self.child(then_branch))?;
                if let Some(else_branch) = else_branch {
                    write_indent(f, self.indent)?;
                    writeln!(f, "else")?;
                    write!(f, "{}", self.child(else_branch))?;
                }
                Ok(())
            }
            Statement::Compound(block) => {
                writeln!(f, "{}", Indent::new(block).with_indent(self.indent))
            }
            Statement::While {
                condition,
                body,
                label,
                ..
            } => {
                writeln!(f, "while ({condition}) /* {label} */")?;
                write!(f, "{}", self.child(body))
            }
            Statement::DoWhile {
                body,
                condition,
                label,
                ..
            } => {
                writeln!(f, "do /* {label} */")?;
                write!(f, "{}", self.child(body))?;
                write_indent(f, self.indent)?;
                writeln!(f, "while ({condition});")
            }
            Statement::For {
                init,
                condition,
                post,
                body,
                label,
                ..
            } => {
                write!(f, "for (")?;
                match init {
                    Some(ForInit::Declaration(decl)) => write!(f, "{decl}")?,
                    Some(ForInit::Expression(e)) => write!(f, "{e};")?,
                    None => write!(f, ";")?,
                }
                if let Some(condition) = condition {
                    write!(f, " {condition}")?;
                }
                write!(f, ";")?;
                if let Some(post) = post {
                    write!(f, " {post}")?;
                }
                writeln!(f, ") /* {label} */")?;
                write!(f, "{}", self.child(body))
            }
            Statement::Switch {
                control,
                body,
                label,
                ..
            } => {
                writeln!(f, "switch ({control}) /* {label} */")?;
                write!(f, "{}", self.child(body))
            }
            Statement::Case {
                value,
                body,
                switch,
                ..
            } => {
                writeln!(f, "case {value}: /* {switch} */")?;
                write!(f, "{}", self.child(body))
            }
            Statement::Default { body, switch, .. } => {
                writeln!(f, "default: /* {switch} */")?;
                write!(f, "{}", self.child(body))
            }
            Statement::Break { target, .. } => writeln!(f, "break; /* {target} */"),
            Statement::Continue { target, .. } => writeln!(f, "continue; /* {target} */"),
            Statement::Goto { target, .. } => writeln!(f, "goto {target};"),
            Statement::Labeled {
                label, statement, ..
            } => {
                writeln!(f, "{label}:")?;
                write!(f, "{}", Indent::new(&**statement).with_indent(self.indent))
            }
            Statement::Null { .. } => writeln!(f, ";"),
        }
    }
}
