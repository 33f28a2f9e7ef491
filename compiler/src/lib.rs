//! Front end for a small expression language.
//!
//! - `lexer` turns characters into tokens on demand.
//! - `parser` builds the AST with precedence climbing over one token of lookahead.
//! - `codegen` lowers the AST to LLVM IR through inkwell.

pub mod ast;
pub mod codegen;
pub mod compile;
pub mod error;
pub mod lexer;
pub mod parser;
pub mod scope;
pub mod token;

pub use codegen::{CodeGen, Lowered};
pub use error::{CodegenError, CompileError, ParseError};
pub use lexer::Scanner;
pub use parser::{ANON_FUNCTION_NAME, Parser};
