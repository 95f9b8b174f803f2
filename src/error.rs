//! Presentación de errores al usuario.
//!
//! Toda fase del compilador reporta sus errores como `Located<E>`.
//! [`Diagnostics`] agrupa errores de cualquier tipo con ubicación y los
//! despliega junto a las líneas de código fuente que los originaron.

use crate::source::{Located, Location};
use std::{
    error::Error,
    fmt::{self, Display},
};

mod sealed {
    pub trait Sealed {}
}

/// Un error con ubicación, de tipo borrado.
pub trait LocatedError: sealed::Sealed {
    fn source(&self) -> &dyn Error;
    fn location(&self) -> &Location;
}

/// Lista de errores de una fase.
pub struct Diagnostics {
    errors: Vec<Box<dyn 'static + LocatedError>>,
}

impl Diagnostics {
    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }
}

impl<E: 'static + LocatedError> From<Vec<E>> for Diagnostics {
    fn from(errors: Vec<E>) -> Self {
        let errors = errors
            .into_iter()
            .map(|error| Box::new(error) as Box<dyn LocatedError>)
            .collect();

        Diagnostics { errors }
    }
}

impl Display for Diagnostics {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        let errors = &self.errors;

        if errors.is_empty() {
            return writeln!(fmt, "No errors were reported");
        }

        for error in errors {
            writeln!(fmt, "error: {}", error.source())?;
            excerpt(fmt, error.location())?;
            writeln!(fmt)?;
        }

        let error_or_errors = if errors.len() == 1 { "error" } else { "errors" };
        writeln!(
            fmt,
            "Build failed with {} {}",
            errors.len(),
            error_or_errors
        )
    }
}

/// Despliega las líneas que abarca una ubicación y subraya el rango.
fn excerpt(fmt: &mut fmt::Formatter<'_>, location: &Location) -> fmt::Result {
    writeln!(fmt, " --> {}", location)?;

    let (start, end) = (location.start(), location.end());
    let digits = end.line().to_string().len();
    writeln!(fmt, "{:digits$} |", "", digits = digits)?;

    for line_number in start.line()..=end.line() {
        location.source().with_line(line_number, |line| {
            writeln!(fmt, "{:>digits$} | {}", line_number, line, digits = digits)
        })?;
    }

    // En rangos multilínea solo se subraya a partir del inicio
    let from = start.column();
    let to = if end.line() == start.line() {
        end.column().max(from + 1)
    } else {
        from + 1
    };

    let skip = (from - 1) as usize;
    let highlight = (to - from) as usize;

    writeln!(
        fmt,
        "{:digits$} | {:skip$}{:^<highlight$}",
        "",
        "",
        "",
        digits = digits,
        skip = skip,
        highlight = highlight
    )
}

impl<E: Error> sealed::Sealed for Located<E> {}

impl<E: Error> LocatedError for Located<E> {
    fn source(&self) -> &dyn Error {
        self.val()
    }

    fn location(&self) -> &Location {
        Located::location(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{lex::tokenize, parse::parse};

    #[test]
    fn errors_point_at_source() {
        let (_, errors) = parse(tokenize("x = 1 +\n)\ny = *"));
        let rendered = Diagnostics::from(errors).to_string();

        assert!(rendered.starts_with("error: "));
        assert!(rendered.contains(" --> <input>:2:1"));
        assert!(rendered.contains("2 | )"));
        assert!(rendered.contains(" --> <input>:3:5"));
        assert!(rendered.contains("3 | y = *"));
        assert!(rendered.contains('^'));
        assert!(rendered.ends_with("Build failed with 2 errors\n"));
    }

    #[test]
    fn empty_diagnostics_say_so() {
        let diagnostics = Diagnostics::from(Vec::<Located<crate::parse::ParserError>>::new());
        assert!(diagnostics.is_empty());
        assert_eq!(diagnostics.to_string(), "No errors were reported\n");
    }
}
