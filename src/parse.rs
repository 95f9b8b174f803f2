//! Análisis sintáctico.
//!
//! Las sentencias se reconocen por su primer token (y a lo sumo uno de
//! lookahead). Las expresiones se construyen por precedence climbing
//! (Pratt): cada clase de token que puede iniciar una expresión tiene un
//! handler prefijo y cada operador binario tiene un handler infijo con una
//! precedencia fija.
//!
//! # Errores
//! El parser nunca aborta. Un constructo inválido se descarta, el error se
//! acumula y el ciclo principal avanza al menos un token por iteración, lo
//! cual garantiza terminación ante cualquier entrada.

use std::{collections::VecDeque, iter::Fuse, mem};
use thiserror::Error;

use crate::{
    ast::{BinOp, Expr, ExprKind, Program, Statement, Target},
    lex::{Keyword, Token},
    source::{Located, Location},
};

#[non_exhaustive]
#[derive(Error, Debug)]
pub enum ParserError {
    #[error("No prefix parse function for {0}")]
    NoPrefix(Token),

    #[error("Illegal character {0:?} in input")]
    IllegalChar(char),

    #[error("Expected {0}, found {1} instead")]
    UnexpectedToken(Token, Token),

    #[error("Integer literal `{0}` is out of range or malformed")]
    BadInteger(String),

    #[error("Unterminated string literal")]
    UnterminatedString,

    #[error("Unterminated char literal")]
    UnterminatedChar,

    #[error("Char literals must contain exactly one character, found {0:?}")]
    BadChar(String),
}

/// Nivel de precedencia de un operador. El orden de declaración
/// determina qué tan fuerte se asocia cada nivel.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord)]
enum Precedence {
    Lowest,
    Assign,
    Sum,
    Product,
}

/// Construye un AST a partir de un flujo de tokens.
///
/// Se retorna tanto el programa, posiblemente parcial, como la lista de
/// errores encontrados. Un programa es válido solo si esta lista es vacía.
pub fn parse<I>(tokens: I) -> (Program, Vec<Located<ParserError>>)
where
    I: IntoIterator<Item = Located<Token>>,
{
    let mut parser = Parser::new(tokens.into_iter());
    let program = parser.program();

    (program, parser.errors)
}

struct Parser<I: Iterator<Item = Located<Token>>> {
    tokens: Fuse<I>,
    current: Located<Token>,
    peek: Located<Token>,
    comments: VecDeque<Located<Token>>,
    last_known: Location,
    errors: Vec<Located<ParserError>>,
}

type Parse<T> = Option<T>;

impl<I: Iterator<Item = Located<Token>>> Parser<I> {
    fn new(tokens: I) -> Self {
        let eof = Located::at(Token::Eof, Location::default());
        let mut parser = Parser {
            tokens: tokens.fuse(),
            current: eof.clone(),
            peek: eof,
            comments: VecDeque::new(),
            last_known: Location::default(),
            errors: Vec::new(),
        };

        // Se llenan tanto el token actual como el de lookahead
        parser.advance();
        parser.advance();

        parser
    }

    fn program(&mut self) -> Program {
        let mut statements = Vec::new();

        while *self.current.as_ref() != Token::Eof {
            // Comentarios que preceden a la sentencia actual
            let start = self.current.location().start();
            while let Some(comment) = self.comments.front() {
                if comment.location().start() >= start {
                    break;
                }

                statements.extend(self.comments.pop_front().map(Statement::Comment));
            }

            if let Some(statement) = self.statement() {
                statements.push(statement);
            }

            // Siempre se avanza, aún luego de un error
            self.advance();
        }

        statements.extend(self.comments.drain(..).map(Statement::Comment));
        Program { statements }
    }

    fn statement(&mut self) -> Parse<Statement> {
        match self.current.as_ref() {
            Token::Keyword(Keyword::Print) => self.print_statement(),
            Token::Id(_) if self.peek_is(&Token::Assign) => self.assignment(),
            _ => self.expression_statement(),
        }
    }

    fn print_statement(&mut self) -> Parse<Statement> {
        self.advance();
        let expr = self.expr(Precedence::Lowest)?;
        self.optional_semicolon();

        Some(Statement::Print(expr))
    }

    fn assignment(&mut self) -> Parse<Statement> {
        let (location, token) = self.current.clone().split();
        let name = match token {
            Token::Id(name) => name,
            _ => return self.fail(ParserError::NoPrefix(token), location),
        };

        let target = Located::at(Target::new(name), location);

        self.expect_peek(Token::Assign)?;
        self.advance();

        let value = self.expr(Precedence::Lowest)?;
        self.optional_semicolon();

        Some(Statement::Assignment { target, value })
    }

    fn expression_statement(&mut self) -> Parse<Statement> {
        let expr = self.expr(Precedence::Lowest)?;
        self.optional_semicolon();

        Some(Statement::Expression(expr))
    }

    /// El `;` final es opcional en toda sentencia.
    fn optional_semicolon(&mut self) {
        if self.peek_is(&Token::Semicolon) {
            self.advance();
        }
    }

    /// Núcleo de precedence climbing.
    ///
    /// Al retornar, el token actual es el último de la expresión.
    fn expr(&mut self, min: Precedence) -> Parse<Located<Expr>> {
        let mut left = self.prefix()?;

        while !self.peek_is(&Token::Semicolon) {
            match infix_operator(self.peek.as_ref()) {
                Some((precedence, _)) if min < precedence => {
                    self.advance();
                    left = self.infix(left)?;
                }

                _ => break,
            }
        }

        Some(left)
    }

    fn prefix(&mut self) -> Parse<Located<Expr>> {
        let (location, token) = self.current.clone().split();
        let kind = match token {
            Token::Int(text) => self.integer(&text, &text, 10, &location)?,
            Token::Hex(text) => self.integer(&text, text.get(2..).unwrap_or(""), 16, &location)?,
            Token::Octal(text) => self.integer(&text, text.get(1..).unwrap_or(""), 8, &location)?,

            Token::Keyword(Keyword::True) => ExprKind::Boolean(true),
            Token::Keyword(Keyword::False) => ExprKind::Boolean(false),

            Token::Str { closed: false, .. } => {
                return self.fail(ParserError::UnterminatedString, location)
            }

            Token::Str { text, .. } => ExprKind::Str(text),

            Token::Char { closed: false, .. } => {
                return self.fail(ParserError::UnterminatedChar, location)
            }

            Token::Char { text, .. } => {
                let mut chars = text.chars();
                match (chars.next(), chars.next()) {
                    (Some(c), None) => ExprKind::Char(c),
                    _ => return self.fail(ParserError::BadChar(text), location),
                }
            }

            Token::Id(name) => ExprKind::Identifier(name),
            Token::OpenParen => return self.grouped(),
            Token::Illegal(c) => return self.fail(ParserError::IllegalChar(c), location),

            token => return self.fail(ParserError::NoPrefix(token), location),
        };

        Some(Located::at(Expr::new(kind), location))
    }

    fn infix(&mut self, left: Located<Expr>) -> Parse<Located<Expr>> {
        let (precedence, op) = match infix_operator(self.current.as_ref()) {
            Some(operator) => operator,
            None => {
                let (location, token) = self.current.clone().split();
                return self.fail(ParserError::NoPrefix(token), location);
            }
        };

        self.advance();
        let right = self.expr(precedence)?;

        let location = Location::span(left.location().clone(), right.location());
        let kind = ExprKind::Binary(Box::new(left), op, Box::new(right));

        Some(Located::at(Expr::new(kind), location))
    }

    fn grouped(&mut self) -> Parse<Located<Expr>> {
        self.advance();
        let expr = self.expr(Precedence::Lowest)?;
        self.expect_peek(Token::CloseParen)?;

        Some(expr)
    }

    fn integer(
        &mut self,
        text: &str,
        digits: &str,
        radix: u32,
        location: &Location,
    ) -> Parse<ExprKind> {
        match i64::from_str_radix(digits, radix) {
            Ok(value) => Some(ExprKind::Integer(value)),
            Err(_) => self.fail(
                ParserError::BadInteger(String::from(text)),
                location.clone(),
            ),
        }
    }

    fn peek_is(&self, token: &Token) -> bool {
        self.peek.as_ref() == token
    }

    /// Avanza si el token de lookahead es el esperado, fallando en caso contrario.
    fn expect_peek(&mut self, token: Token) -> Parse<()> {
        if self.peek_is(&token) {
            self.advance();
            Some(())
        } else {
            let (location, found) = self.peek.clone().split();
            self.fail(ParserError::UnexpectedToken(token, found), location)
        }
    }

    /// Desplaza la ventana actual/lookahead en un token.
    ///
    /// Ninguno de los dos lados de la ventana contiene jamás un comentario:
    /// estos se desvían a una cola que el ciclo principal convierte en nodos.
    fn advance(&mut self) {
        let next = self.pull();
        self.current = mem::replace(&mut self.peek, next);
    }

    fn pull(&mut self) -> Located<Token> {
        loop {
            match self.tokens.next() {
                Some(token) if token.as_ref().is_comment() => self.comments.push_back(token),
                Some(token) => {
                    self.last_known = token.location().clone();
                    break token;
                }

                None => break Located::at(Token::Eof, self.last_known.clone()),
            }
        }
    }

    fn fail<T>(&mut self, error: ParserError, location: Location) -> Parse<T> {
        self.errors.push(Located::at(error, location));
        None
    }
}

/// Precedencia y operador asociados a un token en posición infija.
fn infix_operator(token: &Token) -> Option<(Precedence, BinOp)> {
    match token {
        Token::Assign => Some((Precedence::Assign, BinOp::Assign)),
        Token::Plus => Some((Precedence::Sum, BinOp::Add)),
        Token::Minus => Some((Precedence::Sum, BinOp::Sub)),
        Token::Times => Some((Precedence::Product, BinOp::Mul)),
        Token::Slash => Some((Precedence::Product, BinOp::Div)),
        _ => None,
    }
}
