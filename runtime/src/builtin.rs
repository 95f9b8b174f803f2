//! Interfaz pública.
//!
//! Las funciones en este módulo están diseñadas para ser
//! invocadas en la forma descrita en la documentación
//! top-level de este crate. Es necesario que todas sean
//! tanto `#[no_mangle]` como `extern "C"`.

use crate::sys;

/// Imprime un entero con signo de 64 bits, seguido de un salto de línea.
#[no_mangle]
pub extern "C" fn print_int(value: i64) {
    sys::write_line(&render_int(value));
}

/// Imprime `true` o `false`, seguido de un salto de línea.
///
/// Cualquier byte distinto de cero se considera verdadero.
#[no_mangle]
pub extern "C" fn print_bool(value: u8) {
    sys::write_line(render_bool(value));
}

fn render_int(value: i64) -> String {
    value.to_string()
}

fn render_bool(value: u8) -> &'static str {
    if value != 0 {
        "true"
    } else {
        "false"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn integers_render_in_decimal() {
        assert_eq!(render_int(0), "0");
        assert_eq!(render_int(-42), "-42");
        assert_eq!(render_int(i64::MIN), "-9223372036854775808");
    }

    #[test]
    fn booleans_render_as_keywords() {
        assert_eq!(render_bool(0), "false");
        assert_eq!(render_bool(1), "true");
        assert_eq!(render_bool(0xff), "true");
    }
}
