//! Construcción de ejecutables.
//!
//! Una vez que se ha emitido código ensamblador, este debe ser
//! ensamblado y enlazado contra `libruntime` para producir un binario
//! ejecutable. Ambos pasos se delegan al driver de C de la plataforma.

use std::{
    env,
    io::BufWriter,
    path::{Path, PathBuf},
    process::{Child, ChildStdin, Command, ExitStatus, Stdio},
    str::FromStr,
};

use crate::arch::Abi;
use bitflags::bitflags;
use thiserror::Error;
use tracing::debug;

bitflags! {
    /// Opciones a aplicar durante el enlazado.
    pub struct LinkOptions: u32 {
        /// Remover símbolos de depuración del ejecutable final.
        const STRIP = 0x01;
    }
}

/// Un error de ensamblado o enlazado.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum LinkerError {
    /// Ocurrió un evento de error de E/S durante la invocación
    /// de comandos externos.
    #[error("I/O error")]
    Io(#[from] std::io::Error),

    /// El proceso hijo no expuso su entrada estándar.
    #[error("Linker stdin is not available")]
    NoStdin,

    /// El enlazador inició su ejecución, pero falló en enlazar.
    #[error("Linker exited with status code {0:?}")]
    Failed(ExitStatus),
}

/// Plataforma objetivo.
///
/// Una plataforma fija tanto el perfil de ABI con el que se genera
/// código como el comando y la configuración de `libruntime` con que
/// se enlaza.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Platform {
    Linux,
    Windows,
    MacOs,
}

impl Platform {
    /// Plataforma sobre la que corre el compilador ("hosted").
    pub fn native() -> Self {
        match Abi::native() {
            Abi::Win64 => Platform::Windows,
            Abi::Darwin => Platform::MacOs,
            Abi::SysV => Platform::Linux,
        }
    }

    /// Obtiene el perfil de ABI asociado a esta plataforma.
    pub fn abi(self) -> Abi {
        match self {
            Platform::Linux => Abi::SysV,
            Platform::Windows => Abi::Win64,
            Platform::MacOs => Abi::Darwin,
        }
    }
}

impl FromStr for Platform {
    type Err = ();

    fn from_str(string: &str) -> Result<Self, Self::Err> {
        match string {
            "native" => Ok(Platform::native()),
            "linux" => Ok(Platform::Linux),
            "windows" => Ok(Platform::Windows),
            "macos" => Ok(Platform::MacOs),
            _ => Err(()),
        }
    }
}

/// Instancia del enlazador para un ejecutable definido.
pub struct Linker {
    child: Child,
    stdin: BufWriter<ChildStdin>,
}

impl Linker {
    /// Inicia una instancia del enlazador.
    ///
    /// El enlazador tratará de emitir un ejecutable y escribirlo a
    /// la ruta indicada por `output`.
    pub fn spawn<O>(platform: Platform, output: &O, opts: LinkOptions) -> Result<Self, LinkerError>
    where
        O: AsRef<Path>,
    {
        let params = platform.link_params();
        let library_path = library_path(params.name)?;

        // Para ensamblar el código generado, se hace pipe del mismo al
        // stdin del driver
        let mut command = Command::new(params.command);
        command
            .args(params.extra_args)
            // Ruta de búsqueda de bibliotecas en lib/{platform}
            .arg("-L")
            .arg(&library_path)
            .arg("-o")
            .arg(output.as_ref())
            // Se asume entrada en asm y se enlaza contra libruntime
            .args(["-xassembler", "-", "-lruntime"])
            .args(params.libraries)
            .stdin(Stdio::piped());

        if opts.contains(LinkOptions::STRIP) {
            command.arg("-s");
        }

        debug!(?command, "spawning linker");

        let mut child = command.spawn()?;
        let stdin = child.stdin.take().ok_or(LinkerError::NoStdin)?;

        Ok(Linker {
            child,
            stdin: BufWriter::new(stdin),
        })
    }

    /// Obtiene la entrada estándar del proceso que espera recibir ensamblador.
    pub fn stdin(&mut self) -> &mut BufWriter<ChildStdin> {
        &mut self.stdin
    }

    /// Indica el fin del flujo de código y finaliza el enlazado.
    pub fn finish(mut self) -> Result<(), LinkerError> {
        drop(self.stdin);

        let status = self.child.wait()?;
        if status.success() {
            Ok(())
        } else {
            Err(LinkerError::Failed(status))
        }
    }
}

/// `<directorio del compilador>/lib/<plataforma>`
fn library_path(platform: &str) -> Result<PathBuf, LinkerError> {
    let mut path = env::current_exe()?;
    path.pop();
    path.push("lib");
    path.push(platform);

    Ok(path)
}

/// Información acerca del enlazador requerido para cada plataforma.
struct Parameters {
    /// Nombre de la plataforma.
    ///
    /// Esto se utiliza para examinar el subdirectorio apropiado dentro
    /// de `lib/`.
    name: &'static str,

    /// Comando de enlazado.
    command: &'static str,

    /// Argumentos adicionales que preceden a la entrada.
    extra_args: &'static [&'static str],

    /// Bibliotecas de sistema de las que depende `libruntime`.
    libraries: &'static [&'static str],
}

impl Platform {
    /// Enumera los detalles del comando de enlazado por plataforma.
    fn link_params(self) -> Parameters {
        match self {
            Platform::Linux => Parameters {
                name: "linux",
                command: "cc",
                extra_args: &["-Wl,--gc-sections"],

                // La biblioteca estándar de Rust usa libpthread para hilos,
                // libdl para enlazado lazy en tiempo de ejecución y libm
                libraries: &["-pthread", "-ldl", "-lm"],
            },

            Platform::Windows => Parameters {
                name: "windows",
                command: "x86_64-w64-mingw32-gcc",
                extra_args: &["-Wl,--gc-sections"],
                libraries: &["-lws2_32", "-luserenv", "-lbcrypt", "-lntdll"],
            },

            Platform::MacOs => Parameters {
                name: "macos",
                command: "cc",

                // ld64 no entiende --gc-sections
                extra_args: &["-Wl,-dead_strip"],
                libraries: &[],
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn platforms_map_to_profiles() {
        assert_eq!("linux".parse(), Ok(Platform::Linux));
        assert_eq!("windows".parse::<Platform>().map(Platform::abi), Ok(Abi::Win64));
        assert_eq!("macos".parse::<Platform>().map(Platform::abi), Ok(Abi::Darwin));
        assert_eq!("native".parse(), Ok(Platform::native()));
        assert!("riscv".parse::<Platform>().is_err());
    }
}
