use super::{Convention, Reg};

/// Convención de llamada de Microsoft x64.
pub struct Win64;

impl Convention for Win64 {
    const NAME: &'static str = "win64";
    const ARGUMENTS: &'static [Reg] = &[Reg::Rcx, Reg::Rdx, Reg::R8, Reg::R9];

    // Shadow space para los cuatro argumentos en registro
    const SCRATCH_SPACE: u32 = 32;

    const SYMBOL_PREFIX: &'static str = "";
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reserves_shadow_space() {
        assert_eq!(Win64::SCRATCH_SPACE, 32);
        assert_eq!(Win64::first_argument(), Reg::Rcx);
        assert_eq!(Win64::symbol("main"), "main");
    }
}
