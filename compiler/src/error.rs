use inkwell::builder::BuilderError;
use thiserror::Error;

use crate::token::Token;

pub type ParseResult<T> = Result<T, ParseError>;
pub type CodegenResult<T> = Result<T, CodegenError>;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ParseError {
    #[error("Expected {expected}, found {found}")]
    Expected { expected: &'static str, found: Token },

    #[error("Expected ')' or ',' in argument list, found {0}")]
    ArgumentList(Token),

    #[error("Expected function name in prototype, found {0}")]
    PrototypeName(Token),

    #[error("Unknown token {0} when expecting an expression")]
    UnknownToken(Token),

    #[error("Unexpected token {0} when expecting an expression")]
    UnexpectedToken(Token),
}

#[derive(Debug, Error)]
pub enum CodegenError {
    #[error("Unknown variable name '{0}'")]
    UnknownVariable(String),

    #[error("Invalid binary operator '{0}'")]
    InvalidOperator(char),

    #[error("Unknown function referenced '{0}'")]
    UnknownFunction(String),

    #[error("Incorrect arguments passed to '{name}': expected {expected}, found {found}")]
    ArgumentCount {
        name: String,
        expected: usize,
        found: usize,
    },

    #[error("Parameter '{0}' is declared more than once")]
    DuplicateParameter(String),

    #[error("Function '{name}' was declared with {declared} parameters, found {found}")]
    ConflictingDeclaration {
        name: String,
        declared: usize,
        found: usize,
    },

    #[error("Function '{0}' cannot be redefined")]
    Redefinition(String),

    #[error("String literals cannot be lowered to a numeric value")]
    UnsupportedStringLiteral,

    #[error("Call to '{0}' produced no value")]
    VoidCall(String),

    #[error("Function '{0}' failed verification")]
    Verification(String),

    #[error("IR builder failure: {0}")]
    Builder(#[from] BuilderError),
}

#[derive(Debug, Error)]
pub enum CompileError {
    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Codegen(#[from] CodegenError),

    #[error("Failed to write IR: {0}")]
    Emit(String),
}
