use std::io::{self, Write};

/// Escribe una línea completa a stdout.
///
/// Los errores de E/S se descartan, ya que no hay forma de
/// reportarlos al programa que invocó al builtin.
pub fn write_line(line: &str) {
    let stdout = io::stdout();
    let mut stdout = stdout.lock();

    let _ = writeln!(stdout, "{}", line);
    let _ = stdout.flush();
}
