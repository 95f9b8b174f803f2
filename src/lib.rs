//! Compilador de un lenguaje de expresiones a ensamblador x86-64.
//!
//! # Front end
//! Cada programa deriva de un único archivo de código fuente.
//! Este archivo se somete primero a análisis léxico en [`lex`], de
//! lo cual se obtiene un flujo de tokens. El flujo de tokens se
//! dispone en un AST ([`ast`]) por medio de análisis sintáctico en
//! [`parse`]. El árbol sintáctico es anotado con tipos por análisis
//! semántico en [`semantic`], con lo cual concluyen las fases
//! delanteras del compilador.
//!
//! # Back end
//! En esta sección el compilador deja de ser agnóstico al sistema
//! objetivo. Es aquí donde ocurre generación de código ensamblador y
//! asignación de slots del stack a variables en [`target`], bajo la
//! convención de llamada de alguno de los perfiles de plataforma,
//! concluyendo con ensamblado, enlazado y emisión del ejecutable final
//! en [`link`]. Los aspectos de ensamblado y enlazado se delegan
//! al driver de C de la plataforma.
//!
//! # Errores
//! Ninguna fase se detiene ante el primer error. Cada una acumula
//! tantos errores como le sea posible y el driver decide si continuar
//! con la siguiente. Ver [`error::Diagnostics`].

#[macro_use]
mod macros;

pub mod ast;
pub mod error;
pub mod lex;
pub mod link;
pub mod parse;
pub mod semantic;
pub mod source;

mod arch;
mod codegen;

/// Emisión de código.
///
/// Este módulo reexporta suficientes ítems internos relacionados a generación de código para
/// traducir un AST anotado a ensamblador bajo algún perfil de plataforma.
pub mod target {
    pub use crate::arch::Abi;
    pub use crate::codegen::{generate, CodegenError};
}
