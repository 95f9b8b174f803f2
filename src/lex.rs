//! Análisis léxico.
//!
//! # Tokenization
//! Esta es la primera fase del compilador. Descompone un [`InputStream`]
//! (flujo de caracteres) en unidades léxicas denominadas tokens. Los espacios
//! en blanco se descartan durante esta operación. Cada token emitido está
//! asociado a una ubicación en el código fuente original, lo cual permite
//! rastrear errores tanto en los mismos como en constructos más elevados de
//! fases posteriores.
//!
//! # Contenido de un token
//! Operadores, puntuación y palabras clave se identifican por el hecho de
//! lo que son y no incluyen lexemas. Identificadores, numerales, literales
//! y comentarios sí incluyen su texto original. Este lexer no evalúa
//! numerales: solamente los clasifica y conserva su texto, de lo cual se
//! encarga luego el parser.
//!
//! # Comentarios
//! `#` inicia un comentario de línea. `###` abre un comentario de bloque,
//! que se cierra con el siguiente `###`. [`Lexer::next_token()`] descarta
//! comentarios, mientras que [`Lexer::next_token_with_comments()`] y la
//! implementación de [`Iterator`] los preservan para que el parser pueda
//! convertirlos en nodos inertes.
//!
//! # Errores
//! El lexer nunca falla. Un carácter desconocido se emite como
//! [`Token::Illegal`] y un literal sin cerrar se emite con lo que se haya
//! encontrado hasta el fin de la entrada. Las fases posteriores son
//! las responsables de rechazar estos casos.

use crate::source::{self, InputStream, Located, Location};
use std::{
    fmt::{self, Display},
    iter::Peekable,
    rc::Rc,
    str::FromStr,
};

/// Un identificador.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Identifier(Rc<str>);

impl Identifier {
    /// Construye un identificador a partir de su nombre.
    pub fn new(name: &str) -> Self {
        Identifier(Rc::from(name))
    }
}

impl AsRef<str> for Identifier {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Display for Identifier {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt.write_str(&self.0)
    }
}

/// Objeto resultante del análisis léxico.
///
/// Un token contiene suficiente información para describir completamente
/// a una entidad léxica en el programa fuente.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    /// Fin de la entrada.
    Eof,

    /// Identificador.
    Id(Identifier),

    /// Palabra clave.
    Keyword(Keyword),

    /// Numeral decimal.
    Int(String),

    /// Numeral hexadecimal, incluyendo su prefijo `0x`.
    Hex(String),

    /// Numeral octal, incluyendo su cero inicial.
    Octal(String),

    /// Numeral con punto decimal.
    Float(String),

    /// Literal de string, sin comillas.
    Str { text: String, closed: bool },

    /// Literal de carácter, sin comillas.
    Char { text: String, closed: bool },

    /// `=`
    Assign,

    /// `+`
    Plus,

    /// `-`
    Minus,

    /// `*`
    Times,

    /// `/`
    Slash,

    /// `;`
    Semicolon,

    /// `(`
    OpenParen,

    /// `)`
    CloseParen,

    /// `:`
    Colon,

    /// Comentario de línea, sin `#`.
    LineComment(String),

    /// Comentario de bloque, sin delimitadores.
    BlockComment(String),

    /// Carácter desconocido.
    Illegal(char),
}

impl Token {
    /// Determina si este token es alguna clase de comentario.
    pub fn is_comment(&self) -> bool {
        matches!(self, Token::LineComment(_) | Token::BlockComment(_))
    }
}

impl Display for Token {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        use Token::*;

        match self {
            Eof => fmt.write_str("end of input"),
            Id(id) => write!(fmt, "identifier `{}`", id),
            Keyword(keyword) => write!(fmt, "keyword `{}`", keyword),
            Int(text) => write!(fmt, "literal `{}`", text),
            Hex(text) => write!(fmt, "hex literal `{}`", text),
            Octal(text) => write!(fmt, "octal literal `{}`", text),
            Float(text) => write!(fmt, "float literal `{}`", text),
            Str { text, .. } => write!(fmt, "string literal {:?}", text),
            Char { text, .. } => write!(fmt, "char literal '{}'", text),
            Assign => fmt.write_str("`=`"),
            Plus => fmt.write_str("`+`"),
            Minus => fmt.write_str("`-`"),
            Times => fmt.write_str("`*`"),
            Slash => fmt.write_str("`/`"),
            Semicolon => fmt.write_str("`;`"),
            OpenParen => fmt.write_str("`(`"),
            CloseParen => fmt.write_str("`)`"),
            Colon => fmt.write_str("`:`"),
            LineComment(_) => fmt.write_str("line comment"),
            BlockComment(_) => fmt.write_str("block comment"),
            Illegal(c) => write!(fmt, "illegal character {:?}", c),
        }
    }
}

/// Una palabra clave.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Keyword {
    Print,
    True,
    False,
}

impl Display for Keyword {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        let string = match self {
            Keyword::Print => "print",
            Keyword::True  => "true",
            Keyword::False => "false",
        };

        fmt.write_str(string)
    }
}

impl FromStr for Keyword {
    type Err = ();

    fn from_str(string: &str) -> Result<Self, Self::Err> {
        use Keyword::*;

        const KEYWORDS: &[(&str, Keyword)] = &[
            ("print", Print),
            ("true",  True),
            ("false", False),
        ];

        KEYWORDS
            .iter()
            .find(|&&(name, _)| name == string)
            .map(|&(_, keyword)| keyword)
            .ok_or(())
    }
}

/// Máquina de estados para análisis léxico.
///
/// Un lexer puede encontrarse en uno de diversos estados. La
/// salida del lexer, así como su siguiente estado, se define
/// a partir de tanto su estado actual como el siguiente carácter
/// encontrado en el flujo de entrada.
pub struct Lexer<S: Iterator> {
    source: Peekable<S>,
    state: State,
    start: Location,
    last: Location,
    next: Location,
    exhausted: bool,
}

/// Posibles estados del lexer.
enum State {
    /// Estado que ocurre antes de encontrar el inicio de un token.
    Start,

    /// Estado de completitud; siempre emite el token incluido
    /// sin consumir la entrada actual y pasa a [`State::Start`].
    Complete(Token),

    /// Se encontraron uno o dos `#` consecutivos.
    Hash(u8),

    /// Comentario de línea.
    ///
    /// Este estado termina al encontrar `'\n'`, el cual no se consume.
    LineRemark(String),

    /// Comentario de bloque, con la cantidad de `#` de cierre vistos.
    BlockRemark(String, u8),

    /// Término que puede ser un identificador o una palabra clave.
    Word(String),

    /// Se encontró un `0` inicial.
    Zero,

    /// Numeral decimal.
    Decimal(String),

    /// Numeral octal.
    OctalDigits(String),

    /// Numeral hexadecimal.
    HexDigits(String),

    /// Numeral con punto decimal.
    Fraction(String),

    /// Literal delimitado por comillas.
    Quoted(Quote, String),
}

/// Delimitador de un literal entre comillas.
#[derive(Copy, Clone)]
enum Quote {
    Double,
    Single,
}

impl Quote {
    fn delimiter(self) -> char {
        match self {
            Quote::Double => '"',
            Quote::Single => '\'',
        }
    }

    fn literal(self, text: String, closed: bool) -> Token {
        match self {
            Quote::Double => Token::Str { text, closed },
            Quote::Single => Token::Char { text, closed },
        }
    }
}

impl<S: InputStream> Lexer<S> {
    /// Crea un lexer en estado inicial a partir de un flujo.
    pub fn new(start: Location, source: S) -> Self {
        Lexer {
            source: source.peekable(),
            state: State::Start,
            last: start.clone(),
            next: start.clone(),
            start,
            exhausted: false,
        }
    }

    /// Obtiene el siguiente token, descartando comentarios.
    ///
    /// Luego del fin de la entrada, todas las invocaciones
    /// retornan [`Token::Eof`].
    pub fn next_token(&mut self) -> Located<Token> {
        loop {
            let token = self.next_token_with_comments();
            if !token.as_ref().is_comment() {
                break token;
            }
        }
    }

    /// Obtiene el siguiente token, incluyendo comentarios.
    ///
    /// Luego del fin de la entrada, todas las invocaciones
    /// retornan [`Token::Eof`].
    pub fn next_token_with_comments(&mut self) -> Located<Token> {
        let token = self.lex();
        self.state = State::Start;

        let location = match token {
            Token::Eof => self.next.clone(),
            _ => Location::span(self.start.clone(), &self.last),
        };

        Located::at(token, location)
    }

    /// Construye un siguiente token.
    fn lex(&mut self) -> Token {
        use {State::*, Token::*};

        loop {
            let next_char = match self.source.peek() {
                Some((c, location)) => {
                    // La posición de origen se mueve junto a la posición
                    // siguiente siempre que no se haya encontrado una
                    // frontera de token
                    if let Start = self.state {
                        self.start = location.clone();
                    }

                    Some(*c)
                }

                None => None,
            };

            // Switch table principal, determina cambios de estado
            // y de salida del lexer a partir de combinaciones del
            // estado actual y el siguiente carácter
            match (&mut self.state, next_char) {
                (Start, None) => break Eof,

                // Tokens triviales
                (Start, Some('=')) => self.state = Complete(Assign),
                (Start, Some('+')) => self.state = Complete(Plus),
                (Start, Some('-')) => self.state = Complete(Minus),
                (Start, Some('*')) => self.state = Complete(Times),
                (Start, Some('/')) => self.state = Complete(Slash),
                (Start, Some(';')) => self.state = Complete(Semicolon),
                (Start, Some('(')) => self.state = Complete(OpenParen),
                (Start, Some(')')) => self.state = Complete(CloseParen),
                (Start, Some(':')) => self.state = Complete(Colon),

                (Start, Some('#')) => self.state = Hash(1),
                (Start, Some('"')) => self.state = Quoted(Quote::Double, String::new()),
                (Start, Some('\'')) => self.state = Quoted(Quote::Single, String::new()),

                // Numerales
                (Start, Some('0')) => self.state = Zero,
                (Start, Some(c)) if c.is_ascii_digit() => self.state = Decimal(c.to_string()),

                // Identificadores y palabras clave
                (Start, Some(c)) if is_word_start(c) => self.state = Word(c.to_string()),

                // Espacios en blanco y caracteres inesperados
                (Start, Some(c)) if c.is_whitespace() => (),
                (Start, Some(c)) => self.state = Complete(Illegal(c)),

                // Emisión retardada de tokens cualesquiera
                (Complete(token), _) => break std::mem::replace(token, Eof),

                // `###` abre un bloque, cualquier otra cosa es un comentario de línea
                (Hash(count), Some('#')) if *count < 2 => *count += 1,
                (Hash(_), Some('#')) => self.state = BlockRemark(String::new(), 0),
                (Hash(_), None) | (Hash(_), Some('\n')) => break LineComment(String::new()),
                (Hash(_), Some(c)) => self.state = LineRemark(c.to_string()),

                (LineRemark(text), None) | (LineRemark(text), Some('\n')) => {
                    break LineComment(std::mem::take(text))
                }

                (LineRemark(text), Some(c)) => text.push(c),

                (BlockRemark(text, closing), Some('#')) => {
                    *closing += 1;
                    if *closing == 3 {
                        self.state = Complete(BlockComment(std::mem::take(text)));
                    }
                }

                (BlockRemark(text, closing), Some(c)) => {
                    text.extend(std::iter::repeat('#').take(*closing as usize));
                    text.push(c);
                    *closing = 0;
                }

                // Un bloque sin cerrar se extiende hasta el fin de la entrada
                (BlockRemark(text, closing), None) => {
                    text.extend(std::iter::repeat('#').take(*closing as usize));
                    break BlockComment(std::mem::take(text));
                }

                // Extensión de términos
                (Word(word), Some(c)) if is_word_char(c) => word.push(c),

                // Si sigue algo que no puede formar parte del término, ha terminado
                (Word(word), _) => {
                    if let Ok(keyword) = self::Keyword::from_str(word) {
                        break Keyword(keyword);
                    } else {
                        break Id(Identifier::new(word));
                    }
                }

                (Zero, Some(c @ 'x')) | (Zero, Some(c @ 'X')) => {
                    self.state = HexDigits(format!("0{}", c))
                }

                (Zero, Some(c)) if c.is_ascii_digit() => self.state = OctalDigits(format!("0{}", c)),
                (Zero, Some('.')) => self.state = Fraction(String::from("0.")),
                (Zero, _) => break Int(String::from("0")),

                (Decimal(digits), Some(c)) if c.is_ascii_digit() => digits.push(c),
                (Decimal(digits), Some('.')) => {
                    let mut digits = std::mem::take(digits);
                    digits.push('.');
                    self.state = Fraction(digits);
                }

                (Decimal(digits), _) => break Int(std::mem::take(digits)),

                (OctalDigits(digits), Some(c)) if c.is_ascii_digit() => digits.push(c),
                (OctalDigits(digits), _) => break Octal(std::mem::take(digits)),

                (HexDigits(digits), Some(c)) if c.is_ascii_hexdigit() => digits.push(c),
                (HexDigits(digits), _) => break Hex(std::mem::take(digits)),

                (Fraction(digits), Some(c)) if c.is_ascii_digit() => digits.push(c),
                (Fraction(digits), _) => break Float(std::mem::take(digits)),

                (Quoted(quote, text), Some(c)) if c == quote.delimiter() => {
                    let token = quote.literal(std::mem::take(text), true);
                    self.state = Complete(token);
                }

                (Quoted(_, text), Some(c)) => text.push(c),

                // Literal sin cerrar: se emite lo que se tenga
                (Quoted(quote, text), None) => break quote.literal(std::mem::take(text), false),
            }

            // Si no hubo `break`, aquí se consume el carácter que
            // se observó con lookahead anteriormente
            if let Some((_, location)) = self.source.next() {
                self.next = location.after();
                self.last = location;
            }
        }
    }
}

impl<S: InputStream> Iterator for Lexer<S> {
    type Item = Located<Token>;

    /// Emite todos los tokens, comentarios incluidos. El token
    /// [`Token::Eof`] se emite exactamente una vez, al final.
    fn next(&mut self) -> Option<Self::Item> {
        if self.exhausted {
            return None;
        }

        let token = self.next_token_with_comments();
        if let Token::Eof = token.as_ref() {
            self.exhausted = true;
        }

        Some(token)
    }
}

/// Descompone un texto completo en tokens, comentarios incluidos.
///
/// El último token siempre es [`Token::Eof`].
pub fn tokenize(text: &str) -> Vec<Located<Token>> {
    let (start, stream) = source::consume(text, "<input>");
    Lexer::new(start, stream).collect()
}

/// Determina si un carácter puede iniciar un término.
fn is_word_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_'
}

/// Determina si un carácter puede pertenecer a un término.
fn is_word_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}
