use std::fmt;

use crate::ast::Type;

/// A single lexical unit.
///
/// The identifier text and numeric value are not carried here; they live on
/// the [`Scanner`](crate::lexer::Scanner) and are valid only until the next
/// token is requested.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Token {
    Eof,

    Func,
    /// One of the primitive type keywords (`i32`, `u32`, `char`, ...).
    TypeKeyword(Type),

    Identifier,
    Number,

    /// Any other character, passed through verbatim.
    Char(char),
}

impl Token {
    pub fn is_char(&self, c: char) -> bool {
        matches!(self, Token::Char(ch) if *ch == c)
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Eof => write!(f, "end of input"),
            Token::Func => write!(f, "'func'"),
            Token::TypeKeyword(ty) => write!(f, "'{}'", ty.keyword()),
            Token::Identifier => write!(f, "identifier"),
            Token::Number => write!(f, "number"),
            Token::Char(c) => write!(f, "'{}'", c.escape_debug()),
        }
    }
}

/// Classifies an identifier against the reserved keyword table.
pub fn keyword(ident: &str) -> Option<Token> {
    let token = match ident {
        "func" => Token::Func,
        "i32" => Token::TypeKeyword(Type::I32),
        "u32" => Token::TypeKeyword(Type::U32),
        "char" => Token::TypeKeyword(Type::Char),
        "uchar" => Token::TypeKeyword(Type::UChar),
        "str" => Token::TypeKeyword(Type::Str),
        "f32" => Token::TypeKeyword(Type::F32),
        "uf32" => Token::TypeKeyword(Type::UF32),
        _ => return None,
    };

    Some(token)
}

/// Binding strength of `token` as a binary operator, or -1 when it is not one.
pub fn precedence(token: Token) -> i32 {
    let Token::Char(c) = token else {
        return -1;
    };

    if !c.is_ascii() {
        return -1;
    }

    match c {
        '<' => 10,
        '+' | '-' => 20,
        '*' => 40,
        _ => -1,
    }
}
