use std::fmt::Write as _;
use std::str::FromStr;

use anyhow::{Result, bail};

use crate::backend::bytecode;
use crate::{lexer, parser};

/// Which pipeline stage the driver prints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Emit {
    Tokens,
    Ast,
    #[default]
    Bytecode,
}

impl FromStr for Emit {
    type Err = anyhow::Error;

    fn from_str(value: &str) -> Result<Self> {
        match value {
            "tokens" => Ok(Emit::Tokens),
            "ast" => Ok(Emit::Ast),
            "bytecode" => Ok(Emit::Bytecode),
            _ => bail!("Unknown emit target '{value}' (expected tokens, ast or bytecode)"),
        }
    }
}

/// Runs `source` through the pipeline up to `emit` and renders that stage.
pub fn render(source: &str, emit: Emit) -> Result<String> {
    let tokens = lexer::tokenize(source)?;
    if emit == Emit::Tokens {
        let mut listing = String::new();
        for token in &tokens {
            writeln!(listing, "{token}")?;
        }
        return Ok(listing);
    }

    let program = parser::parse_tokens(tokens)?;
    if emit == Emit::Ast {
        return Ok(format!("{program:#?}\n"));
    }

    let code = bytecode::generate(&program)?;
    Ok(bytecode::disassemble(&code))
}
