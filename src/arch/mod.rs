//! Detalles específicos para cada perfil de plataforma.
//!
//! Los tres perfiles soportados comparten ISA (x86-64, sintaxis AT&T)
//! y difieren únicamente en convención de llamada y en nombrado de
//! símbolos. Cada perfil es una implementación de [`Convention`]. En
//! general, debe utilizarse la macro `dispatch_abi!()` para acceder a
//! estas implementaciones a partir de un [`Abi`].

use std::fmt;

mod darwin;
mod sysv;
mod win64;
mod x86_64;

pub use darwin::Darwin;
pub use sysv::SysV;
pub use win64::Win64;
pub use x86_64::Reg;

/// Perfil de plataforma (ABI).
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Abi {
    /// System V AMD64, como en Linux y demás sistemas ELF.
    SysV,

    /// Microsoft x64, para ejecutables PE.
    Win64,

    /// System V con el nombrado de símbolos de Mach-O.
    Darwin,
}

impl Abi {
    /// Perfil de la plataforma en que se ejecuta el compilador.
    pub fn native() -> Self {
        if cfg!(windows) {
            Abi::Win64
        } else if cfg!(target_os = "macos") {
            Abi::Darwin
        } else {
            Abi::SysV
        }
    }
}

impl Default for Abi {
    fn default() -> Self {
        Abi::SysV
    }
}

impl fmt::Display for Abi {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = dispatch_abi!(C: *self => C::NAME);
        formatter.write_str(name)
    }
}

/// Convención de llamada y nombrado de una plataforma.
///
/// Estos parámetros son lo único que el generador de código consulta
/// para decidir la forma del prólogo, el epílogo y las llamadas a
/// funciones externas.
pub trait Convention {
    /// Nombre legible del perfil.
    const NAME: &'static str;

    /// Registros de argumentos enteros, en orden.
    const ARGUMENTS: &'static [Reg];

    /// Bytes de espacio que el llamador debe reservar para el llamado,
    /// además de las locales.
    const SCRATCH_SPACE: u32;

    /// Prefijo de todo símbolo global.
    const SYMBOL_PREFIX: &'static str;

    /// Prefijo de etiquetas locales al ensamblador.
    const LOCAL_LABEL_PREFIX: &'static str = ".L";

    /// Registro donde se coloca el primer argumento.
    fn first_argument() -> Reg {
        Self::ARGUMENTS[0]
    }

    /// Decora un símbolo global.
    fn symbol(name: &str) -> String {
        format!("{}{}", Self::SYMBOL_PREFIX, name)
    }

    /// Directivas tras el último símbolo del listado.
    fn postamble(_output: &mut String) {}
}
