#![allow(dead_code)]
use std::path::Path;

use cminus::ast::Program;
use cminus::backend::vm::Instruction;
use cminus::fixtures::{Case, load_cases};
use cminus::{lexer, parser};

/// Fixture cases tagged for benchmarking, as (label, source) pairs.
pub fn workloads() -> Vec<(String, String)> {
    let cases = load_cases(Path::new("tests/programs"))
        .unwrap_or_else(|err| panic!("load fixtures: {err:#}"));
    cases
        .iter()
        .filter(|case| case.spec.bench.enabled)
        .map(|case: &Case| {
            let source = case
                .source()
                .unwrap_or_else(|err| panic!("read {}: {err:#}", case.name));
            (case.name.clone(), source)
        })
        .collect()
}

pub fn load_program(source: &str) -> Program {
    let tokens = lexer::tokenize(source).unwrap_or_else(|err| panic!("tokenize: {err}"));
    parser::parse_tokens(tokens).unwrap_or_else(|err| panic!("parse: {err}"))
}

/// Stack code that counts `i` down from `iterations` to zero.
pub fn countdown(iterations: i64) -> Vec<Instruction> {
    vec![
        Instruction::constant(iterations),
        Instruction::assign("i"),
        Instruction::load("i"),
        Instruction::constant(0),
        Instruction::CompareGreater,
        Instruction::JumpIfFalse(5),
        Instruction::load("i"),
        Instruction::constant(1),
        Instruction::Subtract,
        Instruction::assign("i"),
        Instruction::Jump(-9),
        Instruction::Eof,
    ]
}
