use super::{Convention, Reg};

/// System V AMD64 sobre ELF.
pub struct SysV;

impl Convention for SysV {
    const NAME: &'static str = "sysv";

    /* La ABI indica que se coloquen los primeros 6 argumentos en los registros %rdi, %rsi, %rdx, %rcx,
     * %r8 y %r9. Si hay más se ponen en el stack en orden inverso.
     */
    const ARGUMENTS: &'static [Reg] = &[Reg::Rdi, Reg::Rsi, Reg::Rdx, Reg::Rcx, Reg::R8, Reg::R9];

    const SCRATCH_SPACE: u32 = 0;
    const SYMBOL_PREFIX: &'static str = "";

    fn postamble(output: &mut String) {
        // Sin esto, ld asume un stack ejecutable
        output.push_str("\t.section .note.GNU-stack,\"\",@progbits\n");
    }
}
