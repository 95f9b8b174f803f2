macro_rules! dispatch_abi {
    ($type:ident: $abi:expr => $expr:expr) => {{
        use crate::arch::{Abi, Darwin, SysV, Win64};

        match $abi {
            Abi::SysV => {
                type $type = SysV;
                $expr
            }

            Abi::Win64 => {
                type $type = Win64;
                $expr
            }

            Abi::Darwin => {
                type $type = Darwin;
                $expr
            }
        }
    }};
}

macro_rules! emit {
    ($context:expr, $opcode:expr) => {
        $context.output().push_str(&format!("\t{}\n", $opcode))
    };

    ($context:expr, $opcode:expr, $($format:tt)*) => {{
        let operands = format!($($format)*);
        $context.output().push_str(&format!("\t{:8}{}\n", $opcode, operands))
    }};
}
