//! Generación de código ensamblador.
//!
//! El árbol anotado se recorre una sola vez en profundidad. Cada
//! expresión deja su valor en `%rax`; las operaciones binarias evalúan
//! primero el operando derecho, lo preservan en el stack, evalúan el
//! izquierdo y finalmente recuperan el derecho en `%rcx`. Todo el
//! programa se emite como la única función global `main`.

use std::{collections::HashSet, marker::PhantomData};
use thiserror::Error;
use tracing::{debug, trace};

use crate::{
    arch::{Abi, Convention, Reg},
    ast::{BinOp, Expr, ExprKind, Program, ResolvedType, Statement, Type},
    lex::Identifier,
    source::Located,
};

use frame::{Frame, Slot};

pub mod frame;

/// Nombre sin decorar de la rutina de entrada.
const ENTRY: &str = "main";

const PRINT_INT: &str = "print_int";
const PRINT_BOOL: &str = "print_bool";

#[non_exhaustive]
#[derive(Error, Debug)]
pub enum CodegenError {
    #[error("Undefined variable `{0}` during code generation")]
    Undefined(Identifier),

    #[error("Operator `{0}` is not supported by the code generator")]
    UnsupportedOperator(BinOp),

    #[error("Code generation for {0} is not supported")]
    UnsupportedExpression(&'static str),

    #[error("Cannot print a value of type `{0}`")]
    UnprintableType(ResolvedType),
}

/// Emite un listado completo en ensamblador para un programa.
///
/// El programa debe haber pasado por análisis semántico. Los errores no
/// interrumpen la emisión: el valor afectado se sustituye por cero y se
/// continúa, de forma que el listado retornado siempre está completo.
pub fn generate(program: &Program, abi: Abi) -> (String, Vec<Located<CodegenError>>) {
    debug!(%abi, statements = program.statements.len(), "generating code");
    dispatch_abi!(C: abi => Generator::<C>::new().program(program))
}

struct Generator<C> {
    output: String,
    frame: Frame,
    labels: u32,
    errors: Vec<Located<CodegenError>>,
    convention: PhantomData<C>,
}

impl<C: Convention> Generator<C> {
    fn new() -> Self {
        Generator {
            output: String::new(),
            frame: Frame::default(),
            labels: 0,
            errors: Vec::new(),
            convention: PhantomData,
        }
    }

    fn output(&mut self) -> &mut String {
        &mut self.output
    }

    fn program(mut self, program: &Program) -> (String, Vec<Located<CodegenError>>) {
        let entry = C::symbol(ENTRY);
        self.output.push_str(&format!("\t.text\n\t.globl {0}\n{0}:\n", entry));

        // Prólogo, crea un stack frame
        emit!(self, "push", "%rbp");
        emit!(self, "mov", "%rsp, %rbp");

        let reserved = frame::reservation(count_variables(program), C::SCRATCH_SPACE);
        if reserved > 0 {
            emit!(self, "sub", "$0x{:x}, %rsp", reserved);
        }

        for statement in &program.statements {
            self.statement(statement);
        }

        // Epílogo, retorna 0 al llamador
        let exit = self.label();
        self.output.push_str(&format!("{}:\n", exit));

        emit!(self, "xor", "%eax, %eax");
        emit!(self, "mov", "%rbp, %rsp");
        emit!(self, "pop", "%rbp");
        emit!(self, "ret");

        C::postamble(&mut self.output);

        debug!(
            slots = self.frame.size() / frame::SLOT_SIZE,
            errors = self.errors.len(),
            "code generation finished"
        );

        (self.output, self.errors)
    }

    fn statement(&mut self, statement: &Statement) {
        match statement {
            Statement::Assignment { target, value } => {
                self.expr(value);

                let target = target.val();
                let typ = value.val().resolved.known().unwrap_or(Type::Int);

                let (slot, new) = self.frame.allocate(&target.name, typ);
                if new {
                    trace!(name = %target.name, offset = slot.offset(), "allocated stack slot");
                }

                self.store(slot);
            }

            Statement::Expression(expr) => self.expr(expr),

            Statement::Print(expr) => {
                self.expr(expr);

                let helper = match expr.val().resolved {
                    ResolvedType::Known(Type::Int) => PRINT_INT,
                    ResolvedType::Known(Type::Bool) => PRINT_BOOL,
                    other => {
                        let location = expr.location().clone();
                        self.errors
                            .push(Located::at(CodegenError::UnprintableType(other), location));

                        return;
                    }
                };

                emit!(self, "mov", "{}, {}", Reg::Rax, C::first_argument());
                emit!(self, "call", "{}", C::symbol(helper));
            }

            Statement::Comment(_) => (),
        }
    }

    fn expr(&mut self, expr: &Located<Expr>) {
        match &expr.val().kind {
            ExprKind::Integer(value) => {
                let opcode = if i32::try_from(*value).is_ok() {
                    "mov"
                } else {
                    "movabs"
                };

                emit!(self, opcode, "${}, %rax", value);
            }

            ExprKind::Boolean(value) => {
                emit!(self, "movb", "${}, %al", *value as u8);
                emit!(self, "movzbq", "%al, %rax");
            }

            ExprKind::Char(value) => emit!(self, "mov", "${}, %rax", *value as u32),

            ExprKind::Str(_) => self.unsupported(
                CodegenError::UnsupportedExpression("string literals"),
                expr,
            ),

            ExprKind::Identifier(name) => match self.frame.get(name) {
                Some(slot) => self.load(slot),
                None => self.unsupported(CodegenError::Undefined(name.clone()), expr),
            },

            ExprKind::Binary(left, op, right) => self.binary(left, *op, right, expr),
        }
    }

    fn binary(
        &mut self,
        left: &Located<Expr>,
        op: BinOp,
        right: &Located<Expr>,
        expr: &Located<Expr>,
    ) {
        let operation: &[(&str, &str)] = match op {
            BinOp::Add => &[("add", "%rcx, %rax")],
            BinOp::Sub => &[("sub", "%rcx, %rax")],
            BinOp::Mul => &[("imul", "%rcx")],

            // %rdx:%rax / %rcx, el residuo en %rdx se descarta
            BinOp::Div => &[("cqo", ""), ("idiv", "%rcx")],

            BinOp::Assign => {
                return self.unsupported(CodegenError::UnsupportedOperator(op), expr)
            }
        };

        self.expr(right);
        emit!(self, "push", "%rax");
        self.expr(left);
        emit!(self, "pop", "%rcx");

        for (opcode, operands) in operation {
            if operands.is_empty() {
                emit!(self, opcode);
            } else {
                emit!(self, opcode, "{}", operands);
            }
        }
    }

    fn load(&mut self, slot: Slot) {
        match slot.typ() {
            Type::Bool => {
                emit!(self, "movb", "{}, %al", slot);
                emit!(self, "movzbq", "%al, %rax");
            }

            _ => emit!(self, "mov", "{}, %rax", slot),
        }
    }

    fn store(&mut self, slot: Slot) {
        match slot.typ() {
            Type::Bool => emit!(self, "movb", "{}, {}", Reg::Rax.byte(), slot),
            _ => emit!(self, "mov", "{}, {}", Reg::Rax, slot),
        }
    }

    /// Registra un error y carga cero en lugar del valor faltante.
    fn unsupported(&mut self, error: CodegenError, expr: &Located<Expr>) {
        self.errors.push(Located::at(error, expr.location().clone()));
        emit!(self, "mov", "$0, %rax");
    }

    /// Genera una etiqueta única dentro de este listado.
    fn label(&mut self) -> String {
        let label = format!("{}{}.{}", C::LOCAL_LABEL_PREFIX, ENTRY, self.labels);
        self.labels += 1;

        label
    }
}

/// Cantidad de variables distintas que reciben asignación.
fn count_variables(program: &Program) -> usize {
    program
        .statements
        .iter()
        .filter_map(|statement| match statement {
            Statement::Assignment { target, .. } => Some(&target.val().name),
            _ => None,
        })
        .collect::<HashSet<_>>()
        .len()
}
