//! Biblioteca de soporte para programas compilados por `exprc`.
//!
//! # Propósito
//! El código emitido por el compilador no realiza E/S por sí mismo.
//! Toda sentencia `print` se traduce a una llamada a una de las
//! funciones preconstruidas de este crate.
//!
//! # Enlazado
//! El compilador emite el punto de entrada `main` directamente, de forma
//! que esta biblioteca se enlaza como cualquier otra biblioteca estática
//! de C. Se espera encontrar `libruntime.a` (o su equivalente) en
//! `lib/<plataforma>/` junto al ejecutable del compilador.
//!
//! # Uso
//! `libruntime` exporta símbolos "unmangled" usando la convención de llamada
//! que use el lenguaje C en la plataforma objetivo. Es decir, el compilador no
//! necesita emitir código Rust para usar la biblioteca, sino que es suficiente
//! con conocer el símbolo de cada función, parámetros esperados y tipo de retorno.
//! Cometer una equivocación en la forma de invocar a una función preconstruida
//! resulta en Comportamiento Indefinido.

pub mod builtin;

mod hosted;

use crate::hosted as sys;
