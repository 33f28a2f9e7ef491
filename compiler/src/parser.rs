use log::debug;

use crate::{
    ast::{Expr, Function, Prototype},
    error::{ParseError, ParseResult},
    lexer::Scanner,
    token::{self, Token},
};

/// Name given to the function wrapping a bare top-level expression.
pub const ANON_FUNCTION_NAME: &str = "__anon_expr";

pub struct Parser<I: Iterator<Item = char>> {
    scanner: Scanner<I>,
    current: Token,
}

impl<'a> Parser<std::str::Chars<'a>> {
    pub fn from_source(source: &'a str) -> Self {
        Parser::new(Scanner::from_source(source))
    }
}

impl<I: Iterator<Item = char>> Parser<I> {
    /// Wraps `scanner` and reads the first token.
    pub fn new(scanner: Scanner<I>) -> Self {
        let mut parser = Parser {
            scanner,
            current: Token::Eof,
        };
        parser.next_token();
        parser
    }

    pub fn current(&self) -> Token {
        self.current
    }

    pub fn next_token(&mut self) -> Token {
        self.current = self.scanner.next_token();
        self.current
    }

    fn expect_char(&mut self, c: char, expected: &'static str) -> ParseResult<()> {
        if !self.current.is_char(c) {
            return Err(ParseError::Expected {
                expected,
                found: self.current,
            });
        }
        self.next_token();
        Ok(())
    }

    /// numberexpr ::= number
    pub fn parse_number_expr(&mut self) -> ParseResult<Expr> {
        let expr = Expr::Number(self.scanner.number());
        self.next_token();
        Ok(expr)
    }

    /// Wraps `literal` as a string expression and moves past the current token.
    pub fn parse_string_expr(&mut self, literal: impl Into<String>) -> ParseResult<Expr> {
        let expr = Expr::StringLiteral(literal.into());
        self.next_token();
        Ok(expr)
    }

    /// parenexpr ::= '(' expression ')'
    pub fn parse_paren_expr(&mut self) -> ParseResult<Expr> {
        self.next_token(); // eat '('
        let expr = self.parse_expression()?;
        self.expect_char(')', "')'")?;
        Ok(expr)
    }

    /// identifierexpr
    ///   ::= identifier
    ///   ::= identifier '(' expression* ')'
    pub fn parse_identifier_expr(&mut self) -> ParseResult<Expr> {
        let name = self.scanner.identifier().to_string();
        self.next_token();

        if !self.current.is_char('(') {
            return Ok(Expr::variable(name));
        }

        self.next_token(); // eat '('
        let mut args = Vec::new();
        if !self.current.is_char(')') {
            loop {
                args.push(self.parse_expression()?);

                if self.current.is_char(')') {
                    break;
                }

                if !self.current.is_char(',') {
                    return Err(ParseError::ArgumentList(self.current));
                }
                self.next_token();
            }
        }
        self.next_token(); // eat ')'

        Ok(Expr::call(name, args))
    }

    pub fn parse_primary(&mut self) -> ParseResult<Expr> {
        match self.current {
            Token::Identifier => self.parse_identifier_expr(),
            Token::Number => self.parse_number_expr(),
            Token::Char('(') => self.parse_paren_expr(),
            // Typed declarations are reserved but not yet part of the grammar.
            token @ (Token::Func | Token::TypeKeyword(_)) => Err(ParseError::UnknownToken(token)),
            token => Err(ParseError::UnexpectedToken(token)),
        }
    }

    /// expression ::= primary binoprhs
    pub fn parse_expression(&mut self) -> ParseResult<Expr> {
        let lhs = self.parse_primary()?;
        self.parse_bin_op_rhs(0, lhs)
    }

    /// binoprhs ::= (binop primary)*
    ///
    /// Folds operators binding at least as tightly as `min_precedence` into
    /// `lhs`, left to right.
    pub fn parse_bin_op_rhs(&mut self, min_precedence: i32, mut lhs: Expr) -> ParseResult<Expr> {
        loop {
            let precedence = token::precedence(self.current);
            if precedence < min_precedence {
                return Ok(lhs);
            }

            let Token::Char(op) = self.current else {
                return Ok(lhs);
            };
            self.next_token();

            let mut rhs = self.parse_primary()?;

            // A tighter operator after the rhs takes the rhs as its own lhs.
            let next_precedence = token::precedence(self.current);
            if precedence < next_precedence {
                rhs = self.parse_bin_op_rhs(precedence + 1, rhs)?;
            }

            lhs = Expr::binary(op, lhs, rhs);
        }
    }

    /// prototype ::= identifier '(' identifier* ')'
    pub fn parse_prototype(&mut self) -> ParseResult<Prototype> {
        if self.current != Token::Identifier {
            return Err(ParseError::PrototypeName(self.current));
        }

        let name = self.scanner.identifier().to_string();
        self.next_token();
        self.expect_char('(', "'(' in prototype")?;

        let mut params = Vec::new();
        while self.current == Token::Identifier {
            params.push(self.scanner.identifier().to_string());
            self.next_token();
        }

        self.expect_char(')', "')' in prototype")?;

        debug!("parsed prototype {}({})", name, params.join(" "));
        Ok(Prototype::new(name, params))
    }

    /// definition ::= 'func' prototype expression
    pub fn parse_definition(&mut self) -> ParseResult<Function> {
        self.next_token(); // eat 'func'
        let proto = self.parse_prototype()?;
        let body = self.parse_expression()?;
        Ok(Function { proto, body })
    }

    /// toplevelexpr ::= expression
    pub fn parse_top_level_expr(&mut self) -> ParseResult<Function> {
        let body = self.parse_expression()?;
        debug!("parsed top-level expression");
        Ok(Function {
            proto: Prototype::new(ANON_FUNCTION_NAME, Vec::new()),
            body,
        })
    }
}
