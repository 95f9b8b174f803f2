//! Análisis semántico.
//!
//! Un único recorrido en profundidad resuelve nombres contra la tabla
//! de símbolos y anota cada expresión con su tipo. El análisis nunca se
//! detiene ante un error: se reporta tanto como sea posible en una sola
//! pasada. Un nodo inválido contagia su condición a sus ancestros sin
//! volver a reportar la misma causa.

use std::collections::HashMap;
use thiserror::Error;
use tracing::{debug, trace};

use crate::{
    ast::{BinOp, Expr, ExprKind, Program, ResolvedType, Statement, Type},
    lex::Identifier,
    source::Located,
};

#[non_exhaustive]
#[derive(Error, Debug)]
pub enum SemanticError {
    #[error("Undefined variable `{0}`")]
    Undefined(Identifier),

    #[error("Operator `{0}` expects integer operands, found `{1}` and `{2}`")]
    ExpectedIntegers(BinOp, Type, Type),

    #[error("Division by zero")]
    DivisionByZero,

    #[error("Type mismatch in assignment to `{0}`: expected `{1}`, found `{2}`")]
    TypeMismatch(Identifier, Type, Type),

    #[error("Cannot print an expression of invalid type")]
    InvalidPrint,
}

/// Clase de símbolo.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum SymbolKind {
    Variable,
}

/// Entrada de la tabla de símbolos.
///
/// Un símbolo cuya primera asignación fue inválida queda con tipo
/// [`ResolvedType::Invalid`], lo cual silencia errores en cascada.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Symbol {
    pub kind: SymbolKind,
    pub typ: ResolvedType,
}

/// Un nivel de la tabla de símbolos.
struct Frame {
    parent: Option<usize>,
    symbols: HashMap<Identifier, Symbol>,
}

/// Tabla de símbolos encadenada.
///
/// Los frames viven en una arena y se refieren a su padre por índice.
/// Entrar a un scope apila un frame nuevo y salir lo desapila. La
/// resolución recorre la cadena de padres desde el frame más interno.
pub struct SymbolTable {
    frames: Vec<Frame>,
    current: usize,
}

impl Default for SymbolTable {
    fn default() -> Self {
        SymbolTable {
            frames: vec![Frame {
                parent: None,
                symbols: HashMap::new(),
            }],
            current: 0,
        }
    }
}

impl SymbolTable {
    pub fn enter_scope(&mut self) {
        self.frames.push(Frame {
            parent: Some(self.current),
            symbols: HashMap::new(),
        });

        self.current = self.frames.len() - 1;
    }

    /// Sale del scope actual. El scope global nunca se desapila.
    pub fn exit_scope(&mut self) {
        if let Some(parent) = self.frames[self.current].parent {
            self.frames.truncate(self.current);
            self.current = parent;
        }
    }

    /// Define un símbolo en el scope actual.
    ///
    /// Retorna `false` si el nombre ya existía en este mismo scope,
    /// en cuyo caso la tabla no se modifica.
    pub fn define(&mut self, name: Identifier, symbol: Symbol) -> bool {
        let symbols = &mut self.frames[self.current].symbols;
        if symbols.contains_key(&name) {
            return false;
        }

        symbols.insert(name, symbol);
        true
    }

    /// Resuelve un nombre, del scope más interno hacia afuera.
    pub fn lookup(&self, name: &Identifier) -> Option<&Symbol> {
        let mut frame = Some(self.current);
        while let Some(index) = frame {
            let Frame { parent, symbols } = &self.frames[index];
            if let Some(symbol) = symbols.get(name) {
                return Some(symbol);
            }

            frame = *parent;
        }

        None
    }

    /// Profundidad del scope actual, donde el global es 0.
    pub fn depth(&self) -> usize {
        let mut depth = 0;
        let mut frame = self.frames[self.current].parent;
        while let Some(index) = frame {
            depth += 1;
            frame = self.frames[index].parent;
        }

        depth
    }
}

/// Analiza y anota un programa en su lugar.
///
/// Todas las expresiones quedan con tipo conocido o inválido.
pub fn analyze(program: &mut Program) -> Vec<Located<SemanticError>> {
    let mut analyzer = Analyzer::default();
    for statement in &mut program.statements {
        analyzer.statement(statement);
    }

    debug!(errors = analyzer.errors.len(), "semantic analysis finished");
    analyzer.errors
}

#[derive(Default)]
struct Analyzer {
    scope: SymbolTable,
    errors: Vec<Located<SemanticError>>,
}

impl Analyzer {
    fn statement(&mut self, statement: &mut Statement) {
        match statement {
            Statement::Assignment { target, value } => {
                let value_type = self.expr(value);

                let location = target.location().clone();
                let target = target.val_mut();

                let resolved = match self.scope.lookup(&target.name).copied() {
                    None => {
                        let symbol = Symbol {
                            kind: SymbolKind::Variable,
                            typ: value_type,
                        };

                        trace!(name = %target.name, typ = %value_type, "defining variable");
                        self.scope.define(target.name.clone(), symbol);
                        value_type
                    }

                    Some(symbol) => match (symbol.typ, value_type) {
                        (ResolvedType::Known(declared), ResolvedType::Known(found))
                            if declared != found =>
                        {
                            let error =
                                SemanticError::TypeMismatch(target.name.clone(), declared, found);

                            self.errors.push(Located::at(error, location));
                            ResolvedType::Invalid
                        }

                        (ResolvedType::Known(_), ResolvedType::Known(_)) => value_type,
                        _ => ResolvedType::Invalid,
                    },
                };

                target.resolved = resolved;
            }

            Statement::Expression(expr) => {
                self.expr(expr);
            }

            Statement::Print(expr) => {
                if self.expr(expr).known().is_none() {
                    let location = expr.location().clone();
                    self.errors.push(Located::at(SemanticError::InvalidPrint, location));
                }
            }

            Statement::Comment(_) => (),
        }
    }

    fn expr(&mut self, expr: &mut Located<Expr>) -> ResolvedType {
        let location = expr.location().clone();
        let Expr { kind, resolved } = expr.val_mut();

        let typ = match kind {
            ExprKind::Integer(_) => ResolvedType::Known(Type::Int),
            ExprKind::Boolean(_) => ResolvedType::Known(Type::Bool),
            ExprKind::Str(_) => ResolvedType::Known(Type::Str),
            ExprKind::Char(_) => ResolvedType::Known(Type::Char),

            ExprKind::Identifier(name) => match self.scope.lookup(name) {
                Some(symbol) => symbol.typ,
                None => {
                    let error = SemanticError::Undefined(name.clone());
                    self.errors.push(Located::at(error, location));

                    ResolvedType::Invalid
                }
            },

            ExprKind::Binary(left, op, right) => {
                let left_type = self.expr(left);
                let right_type = self.expr(right);

                let mut typ = match (left_type, right_type) {
                    (ResolvedType::Known(Type::Int), ResolvedType::Known(Type::Int)) => {
                        ResolvedType::Known(Type::Int)
                    }

                    (ResolvedType::Known(left_type), ResolvedType::Known(right_type)) => {
                        let error = SemanticError::ExpectedIntegers(*op, left_type, right_type);
                        self.errors.push(Located::at(error, location.clone()));

                        ResolvedType::Invalid
                    }

                    // Un operando inválido ya fue reportado
                    _ => ResolvedType::Invalid,
                };

                // Solo es posible detectar divisores que son literalmente cero
                if let (BinOp::Div, ExprKind::Integer(0)) = (*op, &right.val().kind) {
                    let location = right.location().clone();
                    self.errors.push(Located::at(SemanticError::DivisionByZero, location));

                    typ = ResolvedType::Invalid;
                }

                typ
            }
        };

        *resolved = typ;
        typ
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn int() -> Symbol {
        Symbol {
            kind: SymbolKind::Variable,
            typ: ResolvedType::Known(Type::Int),
        }
    }

    fn boolean() -> Symbol {
        Symbol {
            kind: SymbolKind::Variable,
            typ: ResolvedType::Known(Type::Bool),
        }
    }

    #[test]
    fn inner_scopes_shadow_outer_ones() {
        let x = Identifier::new("x");
        let mut table = SymbolTable::default();

        assert!(table.define(x.clone(), int()));
        assert!(!table.define(x.clone(), boolean()));

        table.enter_scope();
        assert_eq!(table.depth(), 1);
        assert_eq!(table.lookup(&x), Some(&int()));

        assert!(table.define(x.clone(), boolean()));
        assert_eq!(table.lookup(&x), Some(&boolean()));

        table.exit_scope();
        assert_eq!(table.depth(), 0);
        assert_eq!(table.lookup(&x), Some(&int()));
    }

    #[test]
    fn exiting_a_scope_forgets_its_symbols() {
        let y = Identifier::new("y");
        let mut table = SymbolTable::default();

        table.enter_scope();
        table.enter_scope();
        table.define(y.clone(), int());
        assert_eq!(table.depth(), 2);

        table.exit_scope();
        assert!(table.lookup(&y).is_none());

        // Reentrar no recupera el frame anterior
        table.enter_scope();
        assert!(table.lookup(&y).is_none());
    }

    #[test]
    fn global_scope_is_never_popped() {
        let z = Identifier::new("z");
        let mut table = SymbolTable::default();
        table.define(z.clone(), int());

        table.exit_scope();
        table.exit_scope();

        assert_eq!(table.depth(), 0);
        assert!(table.lookup(&z).is_some());
    }
}
