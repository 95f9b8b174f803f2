//! Árbol de sintaxis abstracta.
//!
//! El parser construye el árbol de abajo hacia arriba, el análisis
//! semántico lo anota en su lugar escribiendo [`Expr::resolved`] una sola
//! vez por nodo, y la generación de código lo recorre sin modificarlo.
//! Cada nodo es dueño exclusivo de sus hijos.

use std::fmt::{self, Display};

use crate::{
    lex::{Identifier, Token},
    source::Located,
};

/// Un programa es una secuencia de sentencias.
#[derive(Debug, Default)]
pub struct Program {
    pub statements: Vec<Statement>,
}

#[derive(Debug)]
pub enum Statement {
    /// `x = expr`. La primera asignación a un nombre también lo declara.
    Assignment {
        target: Located<Target>,
        value: Located<Expr>,
    },

    /// Expresión cuyo valor se descarta.
    Expression(Located<Expr>),

    /// `print expr`
    Print(Located<Expr>),

    /// Comentario preservado del código fuente. No tiene efecto alguno.
    Comment(Located<Token>),
}

/// Variable destino de una asignación.
#[derive(Debug)]
pub struct Target {
    pub name: Identifier,
    pub resolved: ResolvedType,
}

impl Target {
    pub fn new(name: Identifier) -> Self {
        Target {
            name,
            resolved: ResolvedType::Unresolved,
        }
    }
}

#[derive(Debug)]
pub struct Expr {
    pub kind: ExprKind,
    pub resolved: ResolvedType,
}

impl Expr {
    pub fn new(kind: ExprKind) -> Self {
        Expr {
            kind,
            resolved: ResolvedType::Unresolved,
        }
    }
}

#[derive(Debug)]
pub enum ExprKind {
    Integer(i64),
    Boolean(bool),
    Str(String),
    Char(char),
    Identifier(Identifier),
    Binary(Box<Located<Expr>>, BinOp, Box<Located<Expr>>),
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum BinOp {
    Add,
    Sub,
    Mul,
    Div,

    /// `=` en posición infija.
    Assign,
}

impl Display for BinOp {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        let symbol = match self {
            BinOp::Add => "+",
            BinOp::Sub => "-",
            BinOp::Mul => "*",
            BinOp::Div => "/",
            BinOp::Assign => "=",
        };

        fmt.write_str(symbol)
    }
}

/// Tipos del lenguaje.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Type {
    Int,
    Bool,
    Str,
    Char,
}

impl Display for Type {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Type::Int => fmt.write_str("int"),
            Type::Bool => fmt.write_str("bool"),
            Type::Str => fmt.write_str("string"),
            Type::Char => fmt.write_str("char"),
        }
    }
}

/// Anotación de tipo que escribe el análisis semántico.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ResolvedType {
    /// Aún no se ha realizado análisis semántico.
    Unresolved,

    /// Tipo concreto.
    Known(Type),

    /// El nodo o alguno de sus descendientes es inválido.
    Invalid,
}

impl ResolvedType {
    /// Obtiene el tipo concreto, si lo hay.
    pub fn known(self) -> Option<Type> {
        match self {
            ResolvedType::Known(typ) => Some(typ),
            _ => None,
        }
    }

    pub fn is_invalid(self) -> bool {
        self == ResolvedType::Invalid
    }
}

impl Display for ResolvedType {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResolvedType::Unresolved => fmt.write_str("<unresolved>"),
            ResolvedType::Known(typ) => typ.fmt(fmt),
            ResolvedType::Invalid => fmt.write_str("<invalid>"),
        }
    }
}

// Impresión de depuración, en forma de árbol indentado
impl Display for Program {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(fmt, "Program:")?;
        for statement in &self.statements {
            statement.write_tree(fmt, 1)?;
        }

        Ok(())
    }
}

impl Statement {
    fn write_tree(&self, fmt: &mut fmt::Formatter<'_>, depth: usize) -> fmt::Result {
        let indent = Indent(depth);
        match self {
            Statement::Assignment { target, value } => {
                writeln!(fmt, "{}Assignment:", indent)?;
                writeln!(
                    fmt,
                    "{}  Identifier: {} ({})",
                    indent,
                    target.as_ref().name,
                    target.as_ref().resolved
                )?;
                writeln!(fmt, "{}  Value:", indent)?;
                value.as_ref().write_tree(fmt, depth + 2)
            }

            Statement::Expression(expr) => {
                writeln!(fmt, "{}ExpressionStatement:", indent)?;
                expr.as_ref().write_tree(fmt, depth + 1)
            }

            Statement::Print(expr) => {
                writeln!(fmt, "{}PrintStatement:", indent)?;
                expr.as_ref().write_tree(fmt, depth + 1)
            }

            Statement::Comment(token) => match token.as_ref() {
                Token::LineComment(text) | Token::BlockComment(text) => {
                    writeln!(fmt, "{}Comment: {:?}", indent, text.trim())
                }

                other => writeln!(fmt, "{}Comment: {}", indent, other),
            },
        }
    }
}

impl Expr {
    fn write_tree(&self, fmt: &mut fmt::Formatter<'_>, depth: usize) -> fmt::Result {
        let indent = Indent(depth);
        match &self.kind {
            ExprKind::Integer(value) => {
                writeln!(fmt, "{}IntegerLiteral: {} ({})", indent, value, self.resolved)
            }

            ExprKind::Boolean(value) => {
                writeln!(fmt, "{}BooleanLiteral: {} ({})", indent, value, self.resolved)
            }

            ExprKind::Str(value) => {
                writeln!(fmt, "{}StringLiteral: {:?} ({})", indent, value, self.resolved)
            }

            ExprKind::Char(value) => {
                writeln!(fmt, "{}CharLiteral: {:?} ({})", indent, value, self.resolved)
            }

            ExprKind::Identifier(name) => {
                writeln!(fmt, "{}IdentifierExpr: {} ({})", indent, name, self.resolved)
            }

            ExprKind::Binary(left, op, right) => {
                writeln!(fmt, "{}BinaryExpr (Op: {}) ({}):", indent, op, self.resolved)?;
                writeln!(fmt, "{}  Left:", indent)?;
                left.val().write_tree(fmt, depth + 2)?;
                writeln!(fmt, "{}  Right:", indent)?;
                right.val().write_tree(fmt, depth + 2)
            }
        }
    }
}

struct Indent(usize);

impl Display for Indent {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(fmt, "{:width$}", "", width = self.0 * 2)
    }
}
