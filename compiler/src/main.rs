use std::fs;
use std::io;
use std::path::PathBuf;
use std::process;

use clap::Parser as ArgParse;
use inkwell::context::Context;
use inkwell::values::AnyValue;
use log::{LevelFilter, info};

use exprc::{
    ANON_FUNCTION_NAME, CodeGen, CompileError, Parser, Scanner, compile, lexer, token::Token,
};

#[derive(Debug, ArgParse)]
#[command(author, version, about)]
struct Config {
    /// Source file to read; standard input when omitted
    input: Option<PathBuf>,

    /// Write the module's LLVM IR to this path once input is exhausted
    #[arg(long, value_name = "PATH")]
    emit_ir: Option<PathBuf>,

    /// Name of the generated LLVM module
    #[arg(long, default_value = "exprc")]
    module_name: String,

    /// Suppress the prompt and per-definition IR dumps
    #[arg(short, long)]
    quiet: bool,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

fn report(err: impl Into<CompileError>) {
    eprintln!("> Error: {}", err.into());
}

fn prompt(config: &Config) {
    if !config.quiet {
        eprint!("ready> ");
    }
}

fn handle_definition<I: Iterator<Item = char>>(
    parser: &mut Parser<I>,
    codegen: &mut CodeGen,
    config: &Config,
) {
    let function = match parser.parse_definition() {
        Ok(function) => function,
        Err(err) => {
            report(err);
            // Skip a token to resynchronise.
            parser.next_token();
            return;
        }
    };

    match codegen.lower_function(&function) {
        Ok(llvm_fn) => {
            info!("defined '{}'", function.proto.name);
            if !config.quiet {
                eprintln!("Read function definition:");
                eprintln!("{}", llvm_fn.print_to_string());
            }
        }
        Err(err) => report(err),
    }
}

fn handle_top_level_expression<I: Iterator<Item = char>>(
    parser: &mut Parser<I>,
    codegen: &mut CodeGen,
    config: &Config,
) {
    let function = match parser.parse_top_level_expr() {
        Ok(function) => function,
        Err(err) => {
            report(err);
            parser.next_token();
            return;
        }
    };

    match codegen.lower_function(&function) {
        Ok(llvm_fn) => {
            if !config.quiet {
                eprintln!("Read top-level expression:");
                eprintln!("{}", llvm_fn.print_to_string());
            }
            // Free the reserved name for the next bare expression.
            // SAFETY: `llvm_fn` is not used past this point.
            unsafe { codegen.remove_function(ANON_FUNCTION_NAME) };
        }
        Err(err) => report(err),
    }
}

fn run<I: Iterator<Item = char>>(parser: &mut Parser<I>, codegen: &mut CodeGen, config: &Config) {
    loop {
        match parser.current() {
            Token::Eof => return,
            Token::Char(';') => {
                parser.next_token();
                continue;
            }
            Token::Func => handle_definition(parser, codegen, config),
            _ => handle_top_level_expression(parser, codegen, config),
        }
        prompt(config);
    }
}

fn main() {
    let config = Config::parse();

    let default_level = if config.verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Warn
    };
    env_logger::Builder::new()
        .filter_level(default_level)
        .parse_default_env()
        .init();

    let context = Context::create();
    let mut codegen = CodeGen::new(&context, &config.module_name);

    match &config.input {
        Some(path) => {
            let source = fs::read_to_string(path).unwrap_or_else(|err| {
                eprintln!("> Error: failed to read '{}': {}", path.display(), err);
                process::exit(1);
            });
            info!("compiling {}", path.display());
            let mut parser = Parser::new(Scanner::from_source(&source));
            run(&mut parser, &mut codegen, &config);
        }
        None => {
            prompt(&config);
            let chars = lexer::reader_chars(io::stdin().lock());
            let mut parser = Parser::new(Scanner::new(chars));
            run(&mut parser, &mut codegen, &config);
        }
    }

    if let Some(path) = &config.emit_ir {
        if let Err(err) = compile::write_ir(&codegen, path) {
            report(err);
            process::exit(1);
        }
    }

    if !config.quiet {
        print!("{}", codegen.module_ir());
    }
}
