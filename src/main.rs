//! Punto de entrada ("driver").
//!
//! Este módulo orquesta las diferentes fases del proceso de
//! compilación y expone una CLI.

use anyhow::{anyhow, bail, Context};
use clap::{Arg, ArgAction, Command};
use exprc::{
    error::Diagnostics,
    lex::Lexer,
    link::{LinkOptions, Linker, Platform},
    parse, semantic, source,
    source::Located,
    target,
};

use std::{
    error::Error,
    fs::{self, File},
    io::{self, Read, Write},
    process,
};

use tracing::{info, Level};

fn main() -> anyhow::Result<()> {
    // Parsing de CLI
    let args = Command::new("exprc")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Expression language compiler")
        .arg(
            Arg::new("target")
                .short('t')
                .long("target")
                .value_name("PLATFORM")
                .default_value("native")
                .value_parser(["native", "linux", "windows", "macos"])
                .help("Target platform"),
        )
        .arg(
            Arg::new("asm")
                .short('S')
                .action(ArgAction::SetTrue)
                .help("Generate assembly instead of linking"),
        )
        .arg(
            Arg::new("strip")
                .short('s')
                .action(ArgAction::SetTrue)
                .help("Strip executables"),
        )
        .arg(
            Arg::new("dump-tokens")
                .long("dump-tokens")
                .action(ArgAction::SetTrue)
                .help("Print the token stream to stderr"),
        )
        .arg(
            Arg::new("dump-ast")
                .long("dump-ast")
                .action(ArgAction::SetTrue)
                .help("Print the annotated syntax tree to stderr"),
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .action(ArgAction::Count)
                .help("Increase logging verbosity"),
        )
        .arg(
            Arg::new("output")
                .short('o')
                .required(true)
                .value_name("FILE")
                .help("Output file ('-' along with -S for stdout)"),
        )
        .arg(
            Arg::new("input")
                .required(true)
                .value_name("INPUT")
                .help("Source file ('-' for stdin)"),
        )
        .get_matches();

    let level = match args.get_count("verbose") {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };

    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false)
        .with_writer(io::stderr)
        .init();

    // Se extraen argumentos necesarios
    let platform = args
        .get_one::<String>("target")
        .map(String::as_str)
        .unwrap_or("native");

    let platform: Platform = platform
        .parse()
        .map_err(|()| anyhow!("Unknown target platform: {}", platform))?;

    let asm = args.get_flag("asm");
    let output = args
        .get_one::<String>("output")
        .context("No output file given")?;

    let input = args
        .get_one::<String>("input")
        .context("No input file given")?;

    let text = read_input(input)?;

    // Front end
    let (start, stream) = source::consume(&text, input.as_str());
    let tokens: Vec<_> = Lexer::new(start, stream).collect();

    if args.get_flag("dump-tokens") {
        for token in &tokens {
            eprintln!("{}\t{}", token.location(), token.val());
        }
    }

    let (mut program, errors) = parse::parse(tokens);
    check(errors);
    info!(statements = program.statements.len(), "parsed program");

    let errors = semantic::analyze(&mut program);
    if args.get_flag("dump-ast") {
        eprint!("{}", program);
    }

    check(errors);

    // Back end
    let abi = platform.abi();
    info!(?platform, %abi, "emitting assembly");

    let (asm_text, errors) = target::generate(&program, abi);
    check(errors);

    match (asm, output.as_str()) {
        // Salida a stdout sin enlazado
        (true, "-") => io::stdout()
            .write_all(asm_text.as_bytes())
            .context("Failed to emit to stdout")?,

        // Salida a archivo sin enlazado
        (true, path) => {
            let mut file = File::create(path)
                .with_context(|| format!("Failed to open for writing: {}", path))?;

            file.write_all(asm_text.as_bytes())
                .with_context(|| format!("Failed to emit to file: {}", path))?;
        }

        // Salida a stdout con enlazado
        (false, "-") => bail!("Refusing to write executable to stdout"),

        // Salida a archivo con enlazado
        (false, path) => {
            let mut options = LinkOptions::empty();
            if args.get_flag("strip") {
                options |= LinkOptions::STRIP;
            }

            let mut linker = Linker::spawn(platform, &path, options).context("Failed to link")?;
            linker
                .stdin()
                .write_all(asm_text.as_bytes())
                .context("Failed to emit assembly to assembler")?;

            linker
                .finish()
                .with_context(|| format!("Failed to generate executable: {}", path))?;
        }
    };

    Ok(())
}

fn read_input(path: &str) -> anyhow::Result<String> {
    if path == "-" {
        let mut text = String::new();
        io::stdin()
            .read_to_string(&mut text)
            .context("Failed to read from stdin")?;

        Ok(text)
    } else {
        fs::read_to_string(path).with_context(|| format!("Failed to read source file: {}", path))
    }
}

/// Termina el proceso si una fase reportó errores.
fn check<E: 'static + Error>(errors: Vec<Located<E>>) {
    if !errors.is_empty() {
        eprint!("{}", Diagnostics::from(errors));
        process::exit(1);
    }
}
