use std::fmt;

/// Registros de propósito general que el generador llega a utilizar.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Reg {
    Rax,
    Rcx,
    Rdx,
    Rsi,
    Rdi,
    R8,
    R9,
}

impl Reg {
    /// Vista de 8 bits del registro.
    pub fn byte(self) -> ByteReg {
        ByteReg(self)
    }
}

impl fmt::Display for Reg {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        use Reg::*;

        let name = match self {
            Rax => "rax",
            Rcx => "rcx",
            Rdx => "rdx",
            Rsi => "rsi",
            Rdi => "rdi",
            R8 => "r8",
            R9 => "r9",
        };

        write!(formatter, "%{}", name)
    }
}

/// Byte bajo de un [`Reg`].
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct ByteReg(Reg);

impl fmt::Display for ByteReg {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        use Reg::*;

        let name = match self.0 {
            Rax => "al",
            Rcx => "cl",
            Rdx => "dl",
            Rsi => "sil",
            Rdi => "dil",
            R8 => "r8b",
            R9 => "r9b",
        };

        write!(formatter, "%{}", name)
    }
}
