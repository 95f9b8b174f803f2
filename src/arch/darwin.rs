use super::{Convention, Reg};

/// System V AMD64 sobre Mach-O.
pub struct Darwin;

impl Convention for Darwin {
    const NAME: &'static str = "darwin";
    const ARGUMENTS: &'static [Reg] = &[Reg::Rdi, Reg::Rsi, Reg::Rdx, Reg::Rcx, Reg::R8, Reg::R9];
    const SCRATCH_SPACE: u32 = 0;

    // Todo símbolo de C lleva un guión bajo en Mach-O
    const SYMBOL_PREFIX: &'static str = "_";

    const LOCAL_LABEL_PREFIX: &'static str = "L";
}
